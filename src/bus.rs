//! One shared physical bus controller and its configuration state machine.

use heapless::String;

use crate::{config::BusConfig, matrix::SignalMatrix, slots::SlotId};

/// Fixed capacity of a logical bus name.
pub const BUS_NAME_CAPACITY: usize = 16;

/// A claimed physical bus controller shared under a logical name.
///
/// State machine: `IDLE` ⇄ `CONFIGURED(slot)`. `IDLE` is initial and
/// re-entered when the current configuration is freed. A switch always
/// reverts the outgoing configuration completely before the incoming one is
/// applied, so two configurations never drive shared lines at the same
/// instant.
pub(crate) struct Bus<M: SignalMatrix> {
    name: String<BUS_NAME_CAPACITY>,
    id: M::BusId,
    current: Option<SlotId>,
}

impl<M: SignalMatrix> Bus<M> {
    pub(crate) fn new(name: String<BUS_NAME_CAPACITY>, id: M::BusId) -> Self {
        Self {
            name,
            id,
            current: None,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn id(&self) -> M::BusId {
        self.id
    }

    pub(crate) fn current(&self) -> Option<SlotId> {
        self.current
    }

    pub(crate) fn is_current(&self, slot: SlotId) -> bool {
        self.current == Some(slot)
    }

    /// Perform one ordered configuration transition.
    ///
    /// Callers have already established that `outgoing` and `incoming`
    /// differ; equality is a no-op one level up and never reaches here.
    pub(crate) fn switch(
        &mut self,
        matrix: &M,
        outgoing: Option<&BusConfig<M>>,
        incoming: Option<(SlotId, &BusConfig<M>)>,
    ) {
        if let Some(config) = outgoing {
            config.revert(matrix, self.id);
        }

        self.current = incoming.map(|(slot, _)| slot);

        if let Some((_, config)) = incoming {
            config.apply(matrix, self.id);
        }
    }
}
