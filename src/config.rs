//! Per-device pin assignment and its routing procedure.

use crate::{
    error::ConfigError,
    matrix::{BusLine, PinRole, SignalMatrix},
};

/// One device's electrical drive pattern on a shared bus.
///
/// A config claims its pins at construction (reset plus direction) and holds
/// them for the lifetime of the attachment. Any of the three lines may be
/// absent — a write-only display config has no MISO pin, for example.
///
/// Invariant: at most one config is applied on a given bus at any instant.
/// [`apply`](Self::apply) and [`revert`](Self::revert) are register writes
/// only and may be repeated; the [`Bus`](crate::registry::BusRegistry)
/// switching path guarantees the outgoing config is fully reverted before
/// the incoming one drives any shared line.
pub struct BusConfig<M: SignalMatrix> {
    mosi: Option<M::Pin>,
    miso: Option<M::Pin>,
    sclk: Option<M::Pin>,
}

impl<M: SignalMatrix> BusConfig<M> {
    /// Claim the given pins. Fails on the first unroutable pin, releasing
    /// any pin claimed earlier in this call.
    pub fn new(
        matrix: &M,
        mosi: Option<M::Pin>,
        miso: Option<M::Pin>,
        sclk: Option<M::Pin>,
    ) -> Result<Self, ConfigError> {
        if let Some(pin) = mosi {
            if matrix.claim_pin(pin, PinRole::InputOutput).is_err() {
                return Err(ConfigError::InvalidPin(BusLine::Mosi));
            }
        }

        if let Some(pin) = miso {
            if matrix.claim_pin(pin, PinRole::Input).is_err() {
                if let Some(pin) = mosi {
                    matrix.release_pin(pin);
                }
                return Err(ConfigError::InvalidPin(BusLine::Miso));
            }
        }

        if let Some(pin) = sclk {
            if matrix.claim_pin(pin, PinRole::InputOutput).is_err() {
                if let Some(pin) = mosi {
                    matrix.release_pin(pin);
                }
                if let Some(pin) = miso {
                    matrix.release_pin(pin);
                }
                return Err(ConfigError::InvalidPin(BusLine::Sclk));
            }
        }

        Ok(Self { mosi, miso, sclk })
    }

    /// Route the owned pins onto `bus`.
    ///
    /// Driven lines are connected both as driver and as loop-back input;
    /// the hardware samples its own output through the matrix.
    pub fn apply(&self, matrix: &M, bus: M::BusId) {
        if let Some(pin) = self.mosi {
            matrix.connect_out(pin, bus, BusLine::Mosi);
            matrix.connect_in(pin, bus, BusLine::Mosi);
        }

        if let Some(pin) = self.miso {
            matrix.connect_in(pin, bus, BusLine::Miso);
        }

        if let Some(pin) = self.sclk {
            matrix.connect_out(pin, bus, BusLine::Sclk);
            matrix.connect_in(pin, bus, BusLine::Sclk);
        }
    }

    /// Disconnect the owned pins from `bus`.
    ///
    /// Driven pins go back to neutral GPIO routing and every routed input
    /// signal is tied high so the controller never reads a floating line
    /// while the bus is unclaimed.
    pub fn revert(&self, matrix: &M, bus: M::BusId) {
        if let Some(pin) = self.mosi {
            matrix.disconnect_out(pin);
            matrix.tie_in_high(bus, BusLine::Mosi);
        }

        if self.miso.is_some() {
            matrix.tie_in_high(bus, BusLine::Miso);
        }

        if let Some(pin) = self.sclk {
            matrix.disconnect_out(pin);
            matrix.tie_in_high(bus, BusLine::Sclk);
        }
    }

    /// Reset all owned pins to their default state.
    ///
    /// Explicit teardown for callers that construct a config and then fail
    /// bring-up; the arbitration layer itself never releases an attached
    /// device's pins.
    pub fn release(self, matrix: &M) {
        if let Some(pin) = self.mosi {
            matrix.release_pin(pin);
        }
        if let Some(pin) = self.miso {
            matrix.release_pin(pin);
        }
        if let Some(pin) = self.sclk {
            matrix.release_pin(pin);
        }
    }
}

impl<M: SignalMatrix> core::fmt::Debug for BusConfig<M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BusConfig").finish_non_exhaustive()
    }
}
