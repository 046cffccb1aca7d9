use std::sync::atomic::{AtomicBool, Ordering};

// Runtime switches. Explanations can be turned off without touching
// prediction, e.g. when attribution misbehaves on a new artifact.
static EXPLAIN_ENABLED: AtomicBool = AtomicBool::new(true);

pub struct SafetyConfig;

impl SafetyConfig {
    pub fn is_explain_enabled() -> bool {
        EXPLAIN_ENABLED.load(Ordering::Relaxed)
    }

    pub fn set_explain(val: bool) {
        let previous = EXPLAIN_ENABLED.swap(val, Ordering::Relaxed);
        if previous != val {
            log::warn!("Explanations {}", if val { "enabled" } else { "disabled" });
        }
    }
}
