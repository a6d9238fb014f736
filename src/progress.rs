//! Progress-callback trait for per-unit conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! real-time events as the pipeline elaborates each unit.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a channel, a WebSocket, or a terminal progress bar
//! without the library knowing anything about how the host application
//! communicates. Units are processed strictly sequentially, but the trait is
//! still `Send + Sync` so the same callback can be shared with other tasks
//! (e.g. a UI thread polling alongside the conversion).

use std::sync::Arc;

/// Called by the conversion pipeline as it processes each elaboration unit.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events arrive in unit order: units are elaborated
/// one at a time, never concurrently.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before any unit is elaborated.
    ///
    /// # Arguments
    /// * `total_units` — number of units (selected source pages) to process
    fn on_conversion_start(&self, total_units: usize) {
        let _ = total_units;
    }

    /// Called just before the elaboration request is sent for a unit.
    fn on_unit_start(&self, unit_num: usize, total_units: usize) {
        let _ = (unit_num, total_units);
    }

    /// Called when a unit's elaboration succeeds.
    ///
    /// # Arguments
    /// * `markup_len` — byte length of the returned markup
    fn on_unit_complete(&self, unit_num: usize, total_units: usize, markup_len: usize) {
        let _ = (unit_num, total_units, markup_len);
    }

    /// Called when a unit falls back to its original raw text.
    ///
    /// The conversion continues; the unit renders unstructured. `reason` is a
    /// human-readable description of the elaboration failure.
    fn on_unit_fallback(&self, unit_num: usize, total_units: usize, reason: &str) {
        let _ = (unit_num, total_units, reason);
    }

    /// Called once after all units have been attempted, before typesetting.
    ///
    /// # Arguments
    /// * `elaborated_count` — units that did not fall back
    fn on_conversion_complete(&self, total_units: usize, elaborated_count: usize) {
        let _ = (total_units, elaborated_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        fallbacks: AtomicUsize,
        final_elaborated: AtomicUsize,
    }

    impl ConversionProgressCallback for TrackingCallback {
        fn on_unit_start(&self, _unit_num: usize, _total: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_unit_complete(&self, _unit_num: usize, _total: usize, _markup_len: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_unit_fallback(&self, _unit_num: usize, _total: usize, _reason: &str) {
            self.fallbacks.fetch_add(1, Ordering::SeqCst);
        }

        fn on_conversion_complete(&self, _total: usize, elaborated_count: usize) {
            self.final_elaborated.store(elaborated_count, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_conversion_start(3);
        cb.on_unit_start(1, 3);
        cb.on_unit_complete(1, 3, 42);
        cb.on_unit_fallback(2, 3, "empty response");
        cb.on_conversion_complete(3, 2);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            starts: AtomicUsize::new(0),
            completes: AtomicUsize::new(0),
            fallbacks: AtomicUsize::new(0),
            final_elaborated: AtomicUsize::new(0),
        };

        tracker.on_unit_start(1, 2);
        tracker.on_unit_complete(1, 2, 100);
        tracker.on_unit_start(2, 2);
        tracker.on_unit_fallback(2, 2, "provider timeout");
        tracker.on_conversion_complete(2, 1);

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.fallbacks.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.final_elaborated.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: Arc<dyn ConversionProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_conversion_start(10);
        cb.on_unit_start(1, 10);
        cb.on_unit_complete(1, 10, 512);
    }
}
