//! UART log output.
//!
//! Drains [`TX_LOG_STREAM`](crate::TX_LOG_STREAM) onto a TX-only UART so the
//! controller never waits on serial I/O.
//!
//! # Hardware Setup
//!
//! ```text
//! ESP32 GPIO17 (U1TXD) ──────▶ USB-UART RX
//!                               └─▶ PC Serial Monitor
//! ```

use crate::logging::{FixedWriter, LogEntry};

#[cfg(target_os = "espidf")]
use crate::logging::LogStream;
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::gpio;
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::peripheral::Peripheral;
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::uart::{self, UartTxDriver};

/// UART configuration for logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UartLoggerConfig {
    pub baud_rate: u32,
    pub tx_pin: u8,
    /// How often dropped-message counts are reported.
    pub drop_report_interval_us: i64,
}

impl Default for UartLoggerConfig {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            tx_pin: 17, // UART1 TX, leaves the UART0 console alone
            drop_report_interval_us: 10_000_000,
        }
    }
}

/// Format a log entry as `[timestamp_us] LEVEL: message\n`.
pub fn format_log_entry(entry: &LogEntry, buf: &mut [u8]) -> usize {
    use core::fmt::Write;

    let mut writer = FixedWriter::new(buf);
    let _ = write!(
        writer,
        "[{:10}] {}: {}\n",
        entry.timestamp_us,
        entry.level.label(),
        entry.text()
    );
    writer.written()
}

/// Format the periodic dropped-messages warning.
pub fn format_drop_report(dropped: u32, buf: &mut [u8]) -> usize {
    use core::fmt::Write;

    let mut writer = FixedWriter::new(buf);
    let _ = write!(writer, "[WARN] log dropped: {}\n", dropped);
    writer.written()
}

/// Initialize a TX-only UART for log output.
#[cfg(target_os = "espidf")]
pub fn init_uart_logger<'d, U: uart::Uart>(
    uart: impl Peripheral<P = U> + 'd,
    tx_pin: impl Peripheral<P = impl gpio::OutputPin> + 'd,
    config: &UartLoggerConfig,
) -> Result<UartTxDriver<'d>, esp_idf_svc::sys::EspError> {
    let uart_config = uart::config::Config::default()
        .baudrate(esp_idf_svc::hal::units::Hertz(config.baud_rate));

    UartTxDriver::new(
        uart,
        tx_pin,
        Option::<gpio::AnyIOPin>::None, // CTS
        Option::<gpio::AnyIOPin>::None, // RTS
        &uart_config,
    )
}

/// Log drain loop (runs on its own thread, never returns).
#[cfg(target_os = "espidf")]
pub fn uart_logger_task(
    uart: &mut UartTxDriver<'_>,
    stream: &LogStream,
    config: &UartLoggerConfig,
) -> ! {
    use esp_idf_svc::hal::delay::FreeRtos;

    let mut format_buf = [0u8; 160];
    let mut last_drop_report = 0i64;

    loop {
        let mut work_done = false;

        while let Some(entry) = stream.drain() {
            let len = format_log_entry(&entry, &mut format_buf);
            let _ = uart.write(&format_buf[..len]);
            work_done = true;
        }

        // SAFETY: esp_timer_get_time has no preconditions
        let now = unsafe { esp_idf_svc::sys::esp_timer_get_time() };
        if now - last_drop_report > config.drop_report_interval_us {
            let dropped = stream.take_dropped();
            if dropped > 0 {
                let len = format_drop_report(dropped, &mut format_buf);
                let _ = uart.write(&format_buf[..len]);
            }
            last_drop_report = now;
        }

        if !work_done {
            FreeRtos::delay_ms(20);
        }
    }
}
