// Progress relay: single guarded callback slot fed by the engine's reader task

use std::sync::Mutex;

pub type ProgressCallback = Box<dyn Fn(f32) + Send + Sync>;

/// Forwards percent-complete updates from the engine to whoever registered.
///
/// The callback runs while the slot lock is held, so once `clear_callback`
/// returns no further event reaches the removed callback. A callback must not
/// call back into the relay.
#[derive(Default)]
pub struct ProgressRelay {
    slot: Mutex<Option<ProgressCallback>>,
}

impl ProgressRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_callback<F>(&self, callback: F)
    where
        F: Fn(f32) + Send + Sync + 'static,
    {
        let mut slot = self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(Box::new(callback));
    }

    pub fn clear_callback(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = None;
    }

    pub fn has_callback(&self) -> bool {
        self.slot
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    /// Handle the engine's textual progress, e.g. `" 42.3%"`.
    ///
    /// Unparseable text is logged and dropped. With no callback registered the
    /// event is dropped as well; nothing is buffered.
    pub fn on_progress(&self, text: &str) {
        let Some(percent) = parse_percent(text) else {
            tracing::debug!("[Progress] Ignoring unparseable progress {:?}", text);
            return;
        };
        self.emit(percent);
    }

    pub fn emit(&self, percent: f32) {
        let slot = self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(callback) = slot.as_ref() {
            callback(percent);
        }
    }
}

fn parse_percent(text: &str) -> Option<f32> {
    let value: f32 = text.trim().trim_end_matches('%').trim().parse().ok()?;
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_parse_percent() {
        assert_eq!(parse_percent(" 42.3%"), Some(42.3));
        assert_eq!(parse_percent("100%"), Some(100.0));
        assert_eq!(parse_percent("7"), Some(7.0));
        assert_eq!(parse_percent("N/A"), None);
        assert_eq!(parse_percent(""), None);
        assert_eq!(parse_percent("NaN%"), None);
    }

    #[test]
    fn test_delivers_to_registered_callback() {
        let relay = ProgressRelay::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        relay.set_callback(move |p| sink.lock().unwrap().push(p));

        relay.on_progress("10.0%");
        relay.on_progress("garbage");
        relay.on_progress(" 55.5%");

        assert_eq!(*seen.lock().unwrap(), vec![10.0, 55.5]);
    }

    #[test]
    fn test_drops_events_without_callback() {
        let relay = ProgressRelay::new();
        relay.on_progress("10%");

        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        relay.set_callback(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(count.load(Ordering::SeqCst), 0);

        relay.clear_callback();
        relay.on_progress("20%");
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(!relay.has_callback());
    }

    #[test]
    fn test_no_delivery_after_clear_under_contention() {
        let relay = Arc::new(ProgressRelay::new());
        let emitter = {
            let relay = Arc::clone(&relay);
            std::thread::spawn(move || {
                for i in 0..20_000 {
                    relay.on_progress(&format!("{}%", i % 100));
                }
            })
        };

        for _ in 0..200 {
            let removed = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&removed);
            relay.set_callback(move |_| {
                assert!(!flag.load(Ordering::SeqCst), "event delivered to removed callback");
            });
            relay.clear_callback();
            removed.store(true, Ordering::SeqCst);
        }

        emitter.join().expect("emitter thread panicked");
    }
}
