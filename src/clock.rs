//! Controller time source.
//!
//! Only the controller's own waits go through here (pass delay, cooldown).
//! Symbol timing never does; that lives in the sequencer's hardware clock.

/// Monotonic time and blocking delay for the controller task.
pub trait Clock {
    /// Microseconds since boot, monotonic.
    fn now_us(&self) -> i64;

    /// Suspend the calling task for at least `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

/// Milliseconds left until `deadline_us`, rounded up.
#[inline]
pub fn ms_until(now_us: i64, deadline_us: i64) -> u32 {
    let remaining = deadline_us.saturating_sub(now_us);
    if remaining <= 0 {
        0
    } else {
        ((remaining + 999) / 1000).min(u32::MAX as i64) as u32
    }
}
