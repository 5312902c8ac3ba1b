//! Global log stream instance.
//!
//! The controller task is the only producer, the UART drain thread the
//! only consumer.

use crate::logging::LogStream;

/// Transmit-path log stream.
pub static TX_LOG_STREAM: LogStream = LogStream::new();
