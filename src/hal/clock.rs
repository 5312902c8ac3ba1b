//! ESP-IDF time source for the controller.

use esp_idf_svc::hal::delay::FreeRtos;

use crate::clock::Clock;

/// `esp_timer` for timestamps, FreeRTOS delay for waits.
#[derive(Clone, Copy, Debug, Default)]
pub struct EspClock;

impl Clock for EspClock {
    #[inline]
    fn now_us(&self) -> i64 {
        // SAFETY: esp_timer_get_time has no preconditions
        unsafe { esp_idf_svc::sys::esp_timer_get_time() }
    }

    fn delay_ms(&mut self, ms: u32) {
        FreeRtos::delay_ms(ms);
    }
}
