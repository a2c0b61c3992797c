//! Deduplicated engine warnings.
//!
//! The parsing and cascade stages never fail on malformed input; they drop
//! the offending piece and keep going. Each distinct drop is reported once
//! per document load through `tracing`, so a stylesheet with a thousand
//! copies of the same unknown property produces one log line.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Global set of warnings already emitted.
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

fn warned() -> MutexGuard<'static, Option<HashSet<String>>> {
    // A panic while holding the lock leaves the set intact; keep using it.
    WARNED.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Record `key`, returning `true` the first time it is seen.
fn first_sighting(key: String) -> bool {
    warned().get_or_insert_with(HashSet::new).insert(key)
}

/// Report a recoverable problem once per unique `(component, message)` pair.
///
/// # Example
/// ```
/// use koala_common::warning::warn_once;
///
/// warn_once("CSS", "unknown property 'colour'");
/// ```
pub fn warn_once(component: &str, message: &str) {
    if first_sighting(format!("[{component}] {message}")) {
        tracing::warn!(component, "{message}");
    }
}

/// Forget every recorded warning (call when loading a new document).
pub fn clear_warnings() {
    if let Some(set) = warned().as_mut() {
        set.clear();
    }
}
