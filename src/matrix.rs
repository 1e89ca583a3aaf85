//! Hardware signal-routing seam.
//!
//! The platform HAL supplies a [`SignalMatrix`] implementation that programs
//! the chip's pin/signal crossbar (the GPIO matrix on ESP-class parts). The
//! arbitration layer only ever talks to the hardware through this trait, so
//! it stays free of any particular register map.

/// One logical line of a serial bus controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusLine {
    Mosi,
    Miso,
    Sclk,
}

impl core::fmt::Display for BusLine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BusLine::Mosi => write!(f, "MOSI"),
            BusLine::Miso => write!(f, "MISO"),
            BusLine::Sclk => write!(f, "SCLK"),
        }
    }
}

/// Electrical direction a claimed pin is configured for.
///
/// Driven lines are claimed as [`PinRole::InputOutput`] because the
/// controller reads its own output back through the matrix on some parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinRole {
    Input,
    InputOutput,
}

/// The pin identifier does not name a routable pin on this hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidPin;

impl core::fmt::Display for InvalidPin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "pin identifier is not routable on this hardware")
    }
}

/// Pin crossbar primitive supplied by the HAL.
///
/// All methods are plain register writes; [`SignalMatrix::claim_pin`] is the
/// only fallible call. Implementations must be callable from both task and
/// interrupt context — the arbitration layer serializes access itself.
pub trait SignalMatrix {
    /// Opaque identifier for one physical bus controller.
    type BusId: Copy + PartialEq;
    /// Opaque pin identifier.
    type Pin: Copy + PartialEq;

    /// Reset `pin` and configure its direction for `role`.
    fn claim_pin(&self, pin: Self::Pin, role: PinRole) -> Result<(), InvalidPin>;

    /// Reset `pin` back to its power-on default state.
    fn release_pin(&self, pin: Self::Pin);

    /// Route `pin` as the output driver of the controller's `line` signal.
    fn connect_out(&self, pin: Self::Pin, bus: Self::BusId, line: BusLine);

    /// Route `pin` as the input source of the controller's `line` signal.
    fn connect_in(&self, pin: Self::Pin, bus: Self::BusId, line: BusLine);

    /// Detach `pin` from any controller signal, back to plain GPIO routing.
    fn disconnect_out(&self, pin: Self::Pin);

    /// Connect the controller's `line` input to a constant-high level.
    ///
    /// Keeps the controller from sampling a floating input while no
    /// configuration is applied to the bus.
    fn tie_in_high(&self, bus: Self::BusId, line: BusLine);
}
