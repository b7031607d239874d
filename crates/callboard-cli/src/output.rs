//! Table rendering for command output

use callboard_core::{
    CallRecord,
    utils::{format_duration, format_phone, format_start_time, format_timestamp},
};
use callboard_dashboard::{CallStats, ChartSeries};
use chrono::FixedOffset;
use std::fmt::Write as _;

/// Render the aggregate counters
#[must_use]
pub fn stats_table(stats: &CallStats) -> String {
    format!(
        "{:<20}{}\n{:<20}{}\n{:<20}{}\n{:<20}{:.1}\n",
        "Total calls",
        stats.total,
        "Active",
        stats.active,
        "With interactions",
        stats.with_interactions,
        "Avg interactions",
        stats.avg_interactions,
    )
}

/// Render the call table
#[must_use]
pub fn calls_table(calls: &[CallRecord], offset: FixedOffset) -> String {
    let mut out = format!(
        "{:>8}  {:<10}  {:<17}  {:<20}  {:>8}  {:>12}\n",
        "ID", "STATUS", "PHONE", "STARTED", "DURATION", "INTERACTIONS"
    );

    for call in calls {
        let started = call
            .start_time
            .as_deref()
            .map_or_else(|| "-".to_string(), |s| format_start_time(s, offset));
        let _ = writeln!(
            out,
            "{:>8}  {:<10}  {:<17}  {:<20}  {:>8}  {:>12}",
            call.id,
            call.status,
            format_phone(&call.user_phone),
            started,
            format_duration(call.duration),
            call.interaction_count(),
        );
    }

    let _ = writeln!(out, "\n{} call(s)", calls.len());
    out
}

/// Render one call with its transcript
#[must_use]
pub fn call_detail(call: &CallRecord, offset: FixedOffset) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Call {} ({})", call.id, call.status);
    let _ = writeln!(out, "  Phone:    {}", format_phone(&call.user_phone));
    let _ = writeln!(out, "  SID:      {}", call.call_sid);
    if let Some(start) = &call.start_time {
        let _ = writeln!(out, "  Started:  {}", format_start_time(start, offset));
    }
    let _ = writeln!(out, "  Duration: {}", format_duration(call.duration));
    if let Some(intent) = &call.user_intent {
        let _ = writeln!(out, "  Intent:   {intent}");
    }

    if call.interaction_log.is_empty() {
        out.push_str("\nNo interactions recorded\n");
        return out;
    }

    out.push('\n');
    for exchange in &call.interaction_log {
        let time = format_timestamp(exchange.timestamp, offset);
        let _ = writeln!(out, "[{time}] user: {}", exchange.user);
        let _ = writeln!(out, "{:>10} ai:   {}", "", exchange.ai);
    }
    out
}

/// Render the three chart series as text bars
#[must_use]
pub fn charts_text(charts: &ChartSeries) -> String {
    let mut out = String::from("Status split\n");
    let split = charts.status_split;
    let _ = writeln!(out, "  {:<12}{}", "active", split.active);
    let _ = writeln!(out, "  {:<12}{}", "others", split.others);

    out.push_str("\nRecent interaction volumes\n");
    for volume in &charts.recent_volumes {
        let _ = writeln!(
            out,
            "  #{:<11}{} {}",
            volume.id,
            bar(volume.interactions),
            volume.interactions
        );
    }

    let trend = &charts.volume_trend;
    let _ = writeln!(out, "\nVolume trend (step {})", trend.step);
    for bucket in &trend.buckets {
        let _ = writeln!(out, "  {:<12}{} {}", bucket.label, bar(bucket.count), bucket.count);
    }
    if trend.omitted > 0 {
        let _ = writeln!(out, "  ({} call(s) past the last bucket)", trend.omitted);
    }
    out
}

fn bar(width: usize) -> String {
    "#".repeat(width.min(40))
}
