use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock Unix time in whole seconds.
///
/// The quoting core never calls this itself; `now` is always passed in as an
/// argument so tests can advance time deterministically. Only the server
/// boundary samples the real clock.
pub fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Wall-clock Unix time in milliseconds.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
