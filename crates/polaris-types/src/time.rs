//! Time helpers for wire timestamps

use chrono::Utc;

/// Current time as nanoseconds since the Unix epoch
///
/// The streaming gateway expresses publish and acknowledgement times in
/// nanoseconds; computed from whole seconds plus the subsecond part to stay
/// in range for `i64`.
pub fn nanos_since_epoch() -> i64 {
    let now = Utc::now();
    now.timestamp() * 1_000_000_000 + i64::from(now.timestamp_subsec_nanos())
}
