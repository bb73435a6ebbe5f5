//! Metadata event tracing and provider timings.
//!
//! Trace level 0 is silent, level 1 logs each notification edge indented by
//! the nesting depth of notification events, and level 2 additionally logs how
//! long each provider invocation took. Timing statistics are gathered at every
//! level so `status` output is always available.
//!
//! Timers are exclusive: while a nested provider runs, the enclosing provider's
//! timer is paused, so each class is only charged for its own work.

use serde::Serialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::constants::{MAX_TRACE_LEVEL, TRACE_TARGET};
use crate::core::{MetadataError, Result};

/// Cumulative timing for one metadata class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimingStatistic {
    pub class: String,
    pub invocations: u64,
    #[serde(serialize_with = "serialize_micros")]
    pub total: Duration,
}

fn serialize_micros<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u128(d.as_micros())
}

#[derive(Debug)]
struct RunningTimer {
    class: String,
    accumulated: Duration,
    resumed_at: Instant,
}

/// Event logger kept inside the metadata service.
#[derive(Debug, Default)]
pub struct MetadataLogger {
    trace_level: u8,
    depth: usize,
    timers: Vec<RunningTimer>,
    timings: HashMap<String, (u64, Duration)>,
}

impl MetadataLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trace_level(&self) -> u8 {
        self.trace_level
    }

    /// # Errors
    ///
    /// Returns [`MetadataError::Config`] for levels above 2.
    pub fn set_trace_level(&mut self, level: u8) -> Result<()> {
        if level > MAX_TRACE_LEVEL {
            return Err(MetadataError::Config {
                message: format!("trace level must be between 0 and {MAX_TRACE_LEVEL}, got {level}"),
            });
        }
        self.trace_level = level;
        Ok(())
    }

    pub fn start_event(&mut self) {
        self.depth += 1;
    }

    pub fn stop_event(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Log a message at trace level 1 or above, indented by event depth.
    pub fn log(&self, message: &str) {
        if self.trace_level > 0 {
            let indent = "  ".repeat(self.depth.saturating_sub(1));
            tracing::info!(target: TRACE_TARGET, "{indent}{message}");
        }
    }

    /// Start timing work attributed to `class`, pausing any enclosing timer.
    pub fn start_timer(&mut self, class: &str) {
        let now = Instant::now();
        if let Some(outer) = self.timers.last_mut() {
            outer.accumulated += now - outer.resumed_at;
        }
        self.timers.push(RunningTimer {
            class: class.to_string(),
            accumulated: Duration::ZERO,
            resumed_at: now,
        });
    }

    /// Stop the innermost timer and resume the enclosing one.
    pub fn stop_timer(&mut self) {
        let now = Instant::now();
        let Some(timer) = self.timers.pop() else {
            return;
        };
        let elapsed = timer.accumulated + (now - timer.resumed_at);
        let entry = self.timings.entry(timer.class.clone()).or_default();
        entry.0 += 1;
        entry.1 += elapsed;
        if self.trace_level > 1 {
            self.log(&format!("{} took {}µs", timer.class, elapsed.as_micros()));
        }
        if let Some(outer) = self.timers.last_mut() {
            outer.resumed_at = now;
        }
    }

    /// Timings per class, most expensive first.
    pub fn timings(&self) -> Vec<TimingStatistic> {
        let mut result: Vec<TimingStatistic> = self
            .timings
            .iter()
            .map(|(class, (invocations, total))| TimingStatistic {
                class: class.clone(),
                invocations: *invocations,
                total: *total,
            })
            .collect();
        result.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.class.cmp(&b.class)));
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_level_bounds() {
        let mut logger = MetadataLogger::new();
        assert!(logger.set_trace_level(2).is_ok());
        assert_eq!(logger.trace_level(), 2);
        assert!(logger.set_trace_level(3).is_err());
        assert_eq!(logger.trace_level(), 2);
    }

    #[test]
    fn test_nested_timers_count_invocations() {
        let mut logger = MetadataLogger::new();
        logger.start_timer("outer");
        logger.start_timer("inner");
        logger.stop_timer();
        logger.start_timer("inner");
        logger.stop_timer();
        logger.stop_timer();

        let timings = logger.timings();
        let inner = timings.iter().find(|t| t.class == "inner").unwrap();
        let outer = timings.iter().find(|t| t.class == "outer").unwrap();
        assert_eq!(inner.invocations, 2);
        assert_eq!(outer.invocations, 1);
    }

    #[test]
    fn test_unbalanced_stop_is_ignored() {
        let mut logger = MetadataLogger::new();
        logger.stop_timer();
        logger.stop_event();
        assert!(logger.timings().is_empty());
    }
}
