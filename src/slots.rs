//! Fixed-capacity callback interception pool.
//!
//! The downstream transport invokes its transaction pre/post hooks without
//! any caller-supplied context, so every attached device needs a way to be
//! told apart when a hook fires. The original hardware driver generation of
//! this layer solved that with N statically generated entry points; here a
//! single pair of trampoline bodies ([`BusRegistry::pre_transfer`] and
//! [`BusRegistry::post_transfer`]) takes the claimed [`SlotId`] as its
//! captured parameter instead, while the pool keeps the same fixed capacity.
//!
//! Slots are claimed for the lifetime of the owning device's attachment and
//! never recycled; exhaustion is a permanent allocation failure.
//!
//! [`BusRegistry::pre_transfer`]: crate::registry::BusRegistry::pre_transfer
//! [`BusRegistry::post_transfer`]: crate::registry::BusRegistry::post_transfer

use crate::{config::BusConfig, matrix::SignalMatrix};

/// Index of a claimed callback slot.
///
/// Handed to the transport at device registration; the transport's
/// transaction callbacks pass it back into the registry's trampolines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlotId(pub(crate) usize);

impl SlotId {
    /// The array position this slot occupies.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Inner per-transaction hook, invoked by the trampolines outside any
/// critical section. `X` is the transport's transaction type.
pub type TransferHook<X> = fn(&mut X);

/// Caller-supplied inner hooks to forward to after the trampoline work.
pub struct TransferHooks<X> {
    pub pre: Option<TransferHook<X>>,
    pub post: Option<TransferHook<X>>,
}

impl<X> Clone for TransferHooks<X> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<X> Copy for TransferHooks<X> {}

impl<X> Default for TransferHooks<X> {
    fn default() -> Self {
        Self {
            pre: None,
            post: None,
        }
    }
}

/// One claimed binding: a bus arena index (weak back-reference — the
/// registry owns all buses), the device's owned pin config, and the inner
/// hooks.
pub(crate) struct Slot<M: SignalMatrix, X> {
    pub(crate) bus: usize,
    pub(crate) config: BusConfig<M>,
    pub(crate) inner_pre: Option<TransferHook<X>>,
    pub(crate) inner_post: Option<TransferHook<X>>,
}

/// Fixed array of `NS` claimable slot records.
pub(crate) struct SlotPool<M: SignalMatrix, X, const NS: usize> {
    slots: [Option<Slot<M, X>>; NS],
}

impl<M: SignalMatrix, X, const NS: usize> SlotPool<M, X, NS> {
    pub(crate) fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| None),
        }
    }

    /// Bind `slot` to the first free position. `None` when the pool is full.
    pub(crate) fn claim(&mut self, slot: Slot<M, X>) -> Option<SlotId> {
        let idx = self.slots.iter().position(|s| s.is_none())?;
        self.slots[idx] = Some(slot);
        Some(SlotId(idx))
    }

    pub(crate) fn get(&self, id: SlotId) -> Option<&Slot<M, X>> {
        self.slots.get(id.0)?.as_ref()
    }
}
