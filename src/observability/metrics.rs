//! Metrics collection.
//!
//! # Metrics
//! - `lorenzo_submit_attempts_total` (counter): broadcast attempts
//! - `lorenzo_submit_retries_total` (counter): attempts followed by a retry
//! - `lorenzo_submit_outcomes_total` (counter): final outcome by `outcome`
//! - `lorenzo_events_decoded_total` (counter): decoded chain events by `kind`, `status`
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; the embedding application
//!   installs whatever recorder/exporter it uses

pub fn record_submit_attempt() {
    metrics::counter!("lorenzo_submit_attempts_total").increment(1);
}

pub fn record_submit_retry() {
    metrics::counter!("lorenzo_submit_retries_total").increment(1);
}

pub fn record_submit_outcome(outcome: &'static str) {
    metrics::counter!("lorenzo_submit_outcomes_total", "outcome" => outcome).increment(1);
}

pub fn record_event_decoded(kind: &'static str, ok: bool) {
    let status = if ok { "ok" } else { "error" };
    metrics::counter!("lorenzo_events_decoded_total", "kind" => kind, "status" => status)
        .increment(1);
}
