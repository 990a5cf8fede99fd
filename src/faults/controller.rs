//! Runtime-mutable latency and error rate.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::observability::metrics;

/// A consistent pair of fault parameters.
///
/// Both values are accepted as-is. `latency_ms <= 0` means no delay;
/// `error_percent <= 0` never fails and `error_percent >= 100` always fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FaultSettings {
    /// Induced delay per request in milliseconds.
    pub latency_ms: i64,

    /// Probability threshold out of 100 for a synthetic failure.
    pub error_percent: i64,
}

impl FaultSettings {
    /// Delay to apply, if any.
    pub fn delay(&self) -> Option<Duration> {
        u64::try_from(self.latency_ms)
            .ok()
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    /// Whether a draw in `[0, 100)` falls under the error threshold.
    pub fn fails(&self, draw: u32) -> bool {
        i64::from(draw) < self.error_percent
    }
}

/// What fault injection did to a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FaultOutcome {
    pub delayed: bool,
    pub failed: bool,
}

/// Shared owner of the live [`FaultSettings`].
///
/// Readers take a lock-free snapshot; writers swap in a new pair.
#[derive(Debug)]
pub struct FaultController {
    settings: ArcSwap<FaultSettings>,
}

impl FaultController {
    pub fn new(initial: FaultSettings) -> Self {
        metrics::record_fault_settings(&initial);
        Self {
            settings: ArcSwap::from_pointee(initial),
        }
    }

    /// Current settings.
    pub fn snapshot(&self) -> FaultSettings {
        **self.settings.load()
    }

    /// Store a new latency, keeping the current error rate. Returns the new pair.
    pub fn set_latency(&self, latency_ms: i64) -> FaultSettings {
        self.update(|current| FaultSettings {
            latency_ms,
            ..current
        })
    }

    /// Store a new error threshold, keeping the current latency. Returns the new pair.
    pub fn set_error_percent(&self, error_percent: i64) -> FaultSettings {
        self.update(|current| FaultSettings {
            error_percent,
            ..current
        })
    }

    /// Replace both values at once (config reload).
    pub fn replace(&self, settings: FaultSettings) {
        self.settings.store(Arc::new(settings));
        metrics::record_fault_settings(&settings);
    }

    fn update(&self, f: impl Fn(FaultSettings) -> FaultSettings) -> FaultSettings {
        let previous = self.settings.rcu(|current| Arc::new(f(**current)));
        // rcu retries until its closure ran against the pointer it replaced
        let updated = f(*previous);
        metrics::record_fault_settings(&updated);
        updated
    }

    /// Run fault injection for one request.
    ///
    /// Reads the settings once, suspends the calling task for the configured
    /// latency, then draws a single value in `[0, 100)`.
    pub async fn apply<R: Rng + ?Sized>(&self, rng: &mut R) -> FaultOutcome {
        let settings = self.snapshot();

        let delayed = match settings.delay() {
            Some(delay) => {
                tracing::info!(latency_ms = settings.latency_ms, "latency configured");
                tokio::time::sleep(delay).await;
                metrics::record_fault("latency");
                true
            }
            None => false,
        };

        let draw = rng.gen_range(0..100u32);
        let failed = settings.fails(draw);
        if failed {
            tracing::info!(
                error_percent = settings.error_percent,
                draw,
                "injecting failure"
            );
            metrics::record_fault("error");
        }

        FaultOutcome { delayed, failed }
    }
}

impl Default for FaultController {
    fn default() -> Self {
        Self::new(FaultSettings::default())
    }
}
