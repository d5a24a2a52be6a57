use crate::Latch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The store event queue did not accept the event
    QueueFull,
    TooManyRegistrants,
    InvalidSlot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServiceError {
    Config(ConfigError),
    InvalidSlot,
    /// No logical modem with the given instance id
    InvalidModem,
    ReadinessTimeout(Latch),
    ForcedErrorTableFull,
}

impl From<ConfigError> for ServiceError {
    fn from(value: ConfigError) -> Self {
        match value {
            ConfigError::InvalidSlot => ServiceError::InvalidSlot,
            other => ServiceError::Config(other),
        }
    }
}
