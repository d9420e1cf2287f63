//! Per-stage decode profiling (`decode-timing` feature)
//!
//! Accumulates wall time per named stage and logs the running totals at
//! most once per second.

use std::time::{Duration, Instant};

use log::info;

const REPORT_INTERVAL: Duration = Duration::from_secs(1);

pub struct DecodeTimings {
    start: Instant,
    last_report: Instant,
    /// (stage, accumulated nanoseconds), in first-seen order
    stages: Vec<(&'static str, u128)>,
}

impl Default for DecodeTimings {
    fn default() -> Self {
        Self::new()
    }
}

impl DecodeTimings {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_report: now,
            stages: Vec::new(),
        }
    }

    /// Begin timing the first stage of a decode call.
    pub fn start(&mut self) {
        self.start = Instant::now();
    }

    /// Charge the time since the previous mark to `stage`.
    pub fn measure(&mut self, stage: &'static str) {
        let now = Instant::now();
        self.record(stage, now.duration_since(self.start).as_nanos());

        if now.duration_since(self.last_report) >= REPORT_INTERVAL {
            info!("{}", self.report());
            self.last_report = now;
        }

        self.start = Instant::now();
    }

    fn record(&mut self, stage: &'static str, nanos: u128) {
        match self.stages.iter_mut().find(|(name, _)| *name == stage) {
            Some((_, total)) => *total += nanos,
            None => self.stages.push((stage, nanos)),
        }
    }

    fn report(&self) -> String {
        let total: u128 = self.stages.iter().map(|(_, nanos)| nanos).sum();
        self.stages
            .iter()
            .map(|(name, nanos)| {
                let share = if total == 0 {
                    0.0
                } else {
                    *nanos as f64 / total as f64 * 100.0
                };
                format!("{name}: {:.2}s ({share:.2}%)", *nanos as f64 / 1e9)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
