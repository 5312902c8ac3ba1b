//! NVS overrides for the transmitter, with schema versioning.
//!
//! Only `repeat_count` and `cooldown_ms` can be overridden; pin and symbol
//! rate are fixed by the board profile and the signal.
//!
//! The firmware only reads this namespace. Overrides are provisioned at
//! flash time with ESP-IDF's `nvs_partition_gen.py`, from a CSV such as:
//!
//! ```text
//! key,type,encoding,value
//! ook_tx,namespace,,
//! schema_ver,data,u32,1
//! repeat,data,u32,12
//! cooldown_ms,data,u32,5000
//! ```
//!
//! # Version History
//!
//! - **v1** (current): `repeat`, `cooldown_ms`

#[cfg(target_os = "espidf")]
use core::cmp::Ordering;

#[cfg(target_os = "espidf")]
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};
#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::EspError;

/// Current NVS schema version
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// NVS namespace for transmitter configuration
pub const NVS_NAMESPACE: &str = "ook_tx";

/// Schema version stamp written by the provisioning image
pub const VERSION_KEY: &str = "schema_ver";
pub const REPEAT_KEY: &str = "repeat";
pub const COOLDOWN_KEY: &str = "cooldown_ms";

/// Values persisted on top of the board defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub repeat_count: Option<u32>,
    pub cooldown_ms: Option<u32>,
}

impl ConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.repeat_count.is_none() && self.cooldown_ms.is_none()
    }
}

/// Outcome of a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadResult {
    /// Nothing stored yet, defaults apply
    FreshInstall,
    /// Stored schema matches, overrides loaded
    UpToDate,
}

/// Why loading overrides failed.
#[derive(Debug)]
pub enum NvsError {
    /// Namespace could not be opened
    #[cfg(target_os = "espidf")]
    InitFailed(EspError),
    /// Stored by a newer firmware; keys may mean something else
    TooNew { stored_version: u32 },
    /// Read failed
    #[cfg(target_os = "espidf")]
    IoError(EspError),
    /// Host build: there is no flash
    #[cfg(not(target_os = "espidf"))]
    NotAvailable,
}

#[cfg(target_os = "espidf")]
impl From<EspError> for NvsError {
    fn from(e: EspError) -> Self {
        NvsError::IoError(e)
    }
}

#[cfg(target_os = "espidf")]
fn open(partition: EspDefaultNvsPartition) -> Result<EspNvs<NvsDefault>, NvsError> {
    EspNvs::new(partition, NVS_NAMESPACE, true).map_err(NvsError::InitFailed)
}

/// Load overrides from NVS.
///
/// A fresh partition yields empty overrides. A newer schema is refused so
/// an older firmware never misreads keys it does not know.
#[cfg(target_os = "espidf")]
pub fn load_overrides(
    partition: EspDefaultNvsPartition,
) -> Result<(ConfigOverrides, LoadResult), NvsError> {
    let storage = open(partition)?;

    let stored_version = storage.get_u32(VERSION_KEY)?.unwrap_or(0);

    match stored_version.cmp(&CURRENT_SCHEMA_VERSION) {
        Ordering::Equal => {
            let overrides = ConfigOverrides {
                repeat_count: storage.get_u32(REPEAT_KEY)?,
                cooldown_ms: storage.get_u32(COOLDOWN_KEY)?,
            };
            Ok((overrides, LoadResult::UpToDate))
        }
        // v0 means nothing was ever written; there is no older schema to migrate.
        Ordering::Less => Ok((ConfigOverrides::default(), LoadResult::FreshInstall)),
        Ordering::Greater => Err(NvsError::TooNew { stored_version }),
    }
}

/// Host builds have no NVS.
#[cfg(not(target_os = "espidf"))]
pub fn load_overrides() -> Result<(ConfigOverrides, LoadResult), NvsError> {
    Err(NvsError::NotAvailable)
}
