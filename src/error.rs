use crate::matrix::BusLine;

/// Errors raised while constructing a bus configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A pin assigned to the named line is not routable. Fatal for the
    /// device's bring-up; pins claimed earlier in the same construction
    /// have been released again.
    InvalidPin(BusLine),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::InvalidPin(line) => write!(f, "invalid pin assigned to {line}"),
        }
    }
}

/// Errors raised while attaching a device to a logical bus.
///
/// None of these are retryable: claimed physical bus ids and callback slots
/// are never given back, so an exhausted pool stays exhausted, and a
/// transport refusal is a boot-time configuration problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AllocError<E> {
    /// The logical bus name exceeds the fixed name capacity.
    NameTooLong,
    /// No physical bus id is available, or no callback slot is free.
    PoolExhausted,
    /// The transport refused bus initialization or device registration.
    Transport(E),
}

impl<E> core::fmt::Display for AllocError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AllocError::NameTooLong => write!(f, "logical bus name exceeds the fixed capacity"),
            AllocError::PoolExhausted => write!(f, "no physical bus or callback slot available"),
            AllocError::Transport(_) => write!(f, "transport rejected the device"),
        }
    }
}
