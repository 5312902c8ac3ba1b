//! RustOokOpener - Main entry point
//!
//! On the device:
//! 1. Start the UART log drain thread
//! 2. Resolve board config (+ NVS overrides)
//! 3. Bind the RMT sequencer and status LED
//! 4. Run bursts forever
//!
//! On a host build it runs one burst against the simulated sequencer and
//! prints the resulting log and report.

#[cfg(target_os = "espidf")]
mod firmware {
    use core::convert::Infallible;

    use esp_idf_svc::hal::delay::FreeRtos;
    use esp_idf_svc::hal::gpio::AnyOutputPin;
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;

    use rust_ook_opener::config::nvs::{load_overrides, LoadResult, NvsError};
    use rust_ook_opener::hal::{BoardIndicator, EspClock, RmtSequencer};
    use rust_ook_opener::sequencer::SequencerStats;
    use rust_ook_opener::uart_logger::{init_uart_logger, uart_logger_task, UartLoggerConfig};
    use rust_ook_opener::{
        clock::Clock, tx_error, tx_info, tx_warn, BoardProfile, ConfigError, Diagnostics,
        FaultState, TransmissionController, TransmitConfig, WordFifo, SIGNAL_WORDS,
        TX_LOG_STREAM,
    };

    // Static allocations: the RMT ISR holds &'static references to these.
    static WORD_FIFO: WordFifo = WordFifo::new();
    static SEQUENCER_STATS: SequencerStats = SequencerStats::new();
    static FAULT_STATE: FaultState = FaultState::new();

    const LOG_THREAD_STACK: usize = 4096;

    pub fn run() -> ! {
        esp_idf_svc::sys::link_patches();

        match boot() {
            Ok(never) => match never {},
            Err(e) => halt(e),
        }
    }

    fn boot() -> Result<Infallible, ConfigError> {
        let peripherals = Peripherals::take()?;
        let clock = EspClock;

        let log_config = UartLoggerConfig::default();
        // SAFETY: the log TX pin is reserved for this UART by the board layout
        let log_pin = unsafe { AnyOutputPin::new(log_config.tx_pin as i32) };
        let mut uart = init_uart_logger(peripherals.uart1, log_pin, &log_config)?;
        std::thread::Builder::new()
            .name("log-drain".into())
            .stack_size(LOG_THREAD_STACK)
            .spawn(move || uart_logger_task(&mut uart, &TX_LOG_STREAM, &log_config))
            .map_err(|_| ConfigError::Driver {
                code: esp_idf_svc::sys::ESP_ERR_NO_MEM as i32,
            })?;

        tx_info!(TX_LOG_STREAM, clock.now_us(), "{}", env!("VERSION_STRING"));

        let board = BoardProfile::selected();
        let mut config = TransmitConfig::for_board(board);
        match EspDefaultNvsPartition::take()
            .map_err(NvsError::InitFailed)
            .and_then(load_overrides)
        {
            Ok((overrides, LoadResult::UpToDate)) => {
                config = config.with_overrides(&overrides);
                tx_info!(
                    TX_LOG_STREAM,
                    clock.now_us(),
                    "nvs overrides: repeat={:?} cooldown_ms={:?}",
                    overrides.repeat_count,
                    overrides.cooldown_ms
                );
            }
            Ok((_, LoadResult::FreshInstall)) => {}
            Err(e) => {
                tx_warn!(TX_LOG_STREAM, clock.now_us(), "nvs load failed: {:?}", e);
            }
        }
        tx_info!(TX_LOG_STREAM, clock.now_us(), "board {}", board.name());

        let sequencer =
            RmtSequencer::new(peripherals.rmt.channel0, &WORD_FIFO, &SEQUENCER_STATS);

        // A broken indicator must not keep the latch signal off the air.
        let indicator = BoardIndicator::from_wiring(config.indicator).unwrap_or_else(|e| {
            tx_warn!(TX_LOG_STREAM, clock.now_us(), "indicator init failed: {:?}", e);
            BoardIndicator::None
        });

        let mut controller = TransmissionController::new(
            &config,
            &SIGNAL_WORDS,
            sequencer,
            indicator,
            clock,
            Diagnostics {
                log: &TX_LOG_STREAM,
                fault: &FAULT_STATE,
            },
        )?;

        controller.run()
    }

    /// Configuration errors are fatal: report and park.
    fn halt(error: ConfigError) -> ! {
        tx_error!(TX_LOG_STREAM, EspClock.now_us(), "startup failed: {}", error);
        // The drain thread may not exist yet; the console always does.
        println!("startup failed: {}", error);
        loop {
            FreeRtos::delay_ms(1000);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
mod host {
    use rust_ook_opener::clock::Clock;
    use rust_ook_opener::feedback::NoFeedback;
    use rust_ook_opener::logging::LogStream;
    use rust_ook_opener::uart_logger::format_log_entry;
    use rust_ook_opener::{
        Diagnostics, FaultState, SimulatedSequencer, TransmissionController, TransmitConfig,
        SIGNAL_WORDS,
    };

    /// Virtual clock: waits complete instantly.
    struct VirtualClock(i64);

    impl Clock for VirtualClock {
        fn now_us(&self) -> i64 {
            self.0
        }

        fn delay_ms(&mut self, ms: u32) {
            self.0 += ms as i64 * 1000;
        }
    }

    pub fn run() {
        let log = LogStream::new();
        let fault = FaultState::new();
        let config = TransmitConfig::default();
        let sim: SimulatedSequencer = SimulatedSequencer::new();

        let mut controller = match TransmissionController::new(
            &config,
            &SIGNAL_WORDS,
            sim,
            NoFeedback,
            VirtualClock(0),
            Diagnostics { log: &log, fault: &fault },
        ) {
            Ok(controller) => controller,
            Err(e) => {
                eprintln!("startup failed: {}", e);
                std::process::exit(1);
            }
        };

        let report = controller.run_burst();
        controller.sequencer_mut().drain();
        let air_ticks = controller.sequencer().ticks();

        let mut buf = [0u8; 160];
        while let Some(entry) = log.drain() {
            let len = format_log_entry(&entry, &mut buf);
            print!("{}", String::from_utf8_lossy(&buf[..len]));
        }

        let timing = controller.timing();
        let (fault_code, fault_data) = fault.snapshot();
        println!("{:#?}", report);
        println!("last fault: {} ({})", fault_code.label(), fault_data);
        println!(
            "symbols on air: {} ({} us each, {} ms total)",
            air_ticks,
            timing.period_us(),
            timing.duration_ns(air_ticks) / 1_000_000
        );
    }
}

fn main() {
    #[cfg(target_os = "espidf")]
    firmware::run();

    #[cfg(not(target_os = "espidf"))]
    host::run();
}
