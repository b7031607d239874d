//! Call builders shared by unit tests

use callboard_core::{CallRecord, InteractionExchange};

pub(crate) fn call(id: i64, status: &str) -> CallRecord {
    call_with_exchanges(id, status, 0)
}

pub(crate) fn call_with_exchanges(id: i64, status: &str, exchanges: usize) -> CallRecord {
    CallRecord {
        id,
        status: status.to_string(),
        duration: None,
        interaction_log: (0..exchanges)
            .map(|i| InteractionExchange {
                user: format!("pregunta {i}"),
                ai: format!("respuesta {i}"),
                timestamp: 1_710_512_730.0,
            })
            .collect(),
        user_phone: "+520000000000".to_string(),
        start_time: None,
        call_sid: format!("CA{id:04}"),
        user_intent: None,
    }
}

pub(crate) fn sequential(count: i64, status: &str) -> Vec<CallRecord> {
    (1..=count).map(|id| call(id, status)).collect()
}
