//! Named wall-clock measurements.
//!
//! ```
//! use mtbdd_bridge::timing::Timings;
//!
//! let mut timings = Timings::new();
//! {
//!     let _guard = timings.scope("build");
//!     // ... work ...
//! }
//! let sum = timings.time("sum", || (0..100).sum::<u32>());
//! assert_eq!(sum, 4950);
//! assert!(timings.get("build").is_some());
//! assert!(timings.get("sum").is_some());
//! ```

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use log::debug;

/// Collected durations, keyed by label.
///
/// Measuring the same label twice adds up the durations.
#[derive(Debug, Clone, Default)]
pub struct Timings {
    durations: BTreeMap<String, Duration>,
}

impl Timings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start measuring `label`. The time is recorded when the guard is dropped.
    pub fn scope(&mut self, label: impl Into<String>) -> ScopeGuard<'_> {
        ScopeGuard {
            timings: self,
            label: label.into(),
            start: Instant::now(),
        }
    }

    /// Run `f`, recording its duration under `label`.
    pub fn time<T>(&mut self, label: impl Into<String>, f: impl FnOnce() -> T) -> T {
        let _guard = self.scope(label);
        f()
    }

    pub fn record(&mut self, label: impl Into<String>, duration: Duration) {
        let label = label.into();
        debug!("{}: {:.3}s", label, duration.as_secs_f64());
        *self.durations.entry(label).or_default() += duration;
    }

    pub fn get(&self, label: &str) -> Option<Duration> {
        self.durations.get(label).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Duration)> + '_ {
        self.durations.iter().map(|(label, &duration)| (label.as_str(), duration))
    }

    pub fn total(&self) -> Duration {
        self.durations.values().sum()
    }
}

pub struct ScopeGuard<'a> {
    timings: &'a mut Timings,
    label: String,
    start: Instant,
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        let label = std::mem::take(&mut self.label);
        self.timings.record(label, self.start.elapsed());
    }
}
