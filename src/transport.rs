//! Transport driver seam.

use crate::slots::SlotId;

/// Downstream serial transport that owns the actual transfer machinery.
///
/// `B` is the physical bus id type of the [`SignalMatrix`] in use. The
/// arbitration layer calls [`init_bus`](Self::init_bus) once when a logical
/// bus first claims a controller (bring the controller up with no pins
/// attached — routing happens through the matrix), and
/// [`register_device`](Self::register_device) for every attachment.
///
/// Implementor contract: for a device registered with a given [`SlotId`],
/// the transport's transaction callbacks must invoke
/// [`BusRegistry::pre_transfer`] with that id strictly before the
/// transaction is dispatched on the wire, and
/// [`BusRegistry::post_transfer`] on completion. Both are safe to call from
/// interrupt or DMA-completion context.
///
/// [`SignalMatrix`]: crate::matrix::SignalMatrix
/// [`BusRegistry::pre_transfer`]: crate::registry::BusRegistry::pre_transfer
/// [`BusRegistry::post_transfer`]: crate::registry::BusRegistry::post_transfer
pub trait Transport<B: Copy> {
    /// In-flight transaction record passed through the hooks.
    type Transaction;
    /// Transport-specific device parameters (clock rate, mode, CS pin, ...).
    type Params;
    /// Opaque device token consumers use to issue transfers.
    type Handle;
    /// Transport-defined registration failure.
    type Error;

    /// Bring up the physical controller `bus` with no pins attached.
    fn init_bus(&mut self, bus: B) -> Result<(), Self::Error>;

    /// Register a device on `bus`, binding `slot` to its transaction
    /// callbacks.
    fn register_device(
        &mut self,
        bus: B,
        slot: SlotId,
        params: Self::Params,
    ) -> Result<Self::Handle, Self::Error>;
}
