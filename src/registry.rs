#![allow(unsafe_code)]

//! Physical bus pool, logical bus map and device attachment.

use core::cell::UnsafeCell;

use heapless::{String, Vec};

use crate::{
    bus::{BUS_NAME_CAPACITY, Bus},
    config::BusConfig,
    error::AllocError,
    matrix::SignalMatrix,
    slots::{Slot, SlotId, SlotPool, TransferHooks},
    transport::Transport,
};

/// Broker for a small fixed number of physical bus controllers.
///
/// Construct one instance at startup and hand a reference to every device
/// driver. Physical bus ids enter the pool via
/// [`register_bus`](Self::register_bus) during board bring-up; drivers then
/// attach through [`alloc_device`](Self::alloc_device) under a logical bus
/// name, and any number of devices naming the same logical bus share one
/// controller with their pin routing switched transparently per transaction.
///
/// # Const generics
/// - `NB`: number of physical bus controllers the hardware provides
/// - `NS`: callback slot capacity (buses × devices concurrently attached
///   per bus)
///
/// # Concurrency
/// Every entry point runs its state access inside `critical_section::with`,
/// so task-context allocation and interrupt-context transaction hooks may
/// interleave freely, on multi-core targets included. Critical sections are
/// short: routing register writes and pointer updates only. Inner device
/// hooks run outside them.
///
/// Claimed ids, buses and slots are exclusively owned for the process
/// lifetime; there is no give-back path. When transport initialization or
/// registration fails partway through an attachment, the already-claimed id
/// or slot stays claimed — attachment failures are boot-time configuration
/// errors, not conditions to recover from.
pub struct BusRegistry<M, X, const NB: usize, const NS: usize>
where
    M: SignalMatrix,
{
    inner: UnsafeCell<Inner<M, X, NB, NS>>,
}

// Safety: all access to `inner` goes through critical_section::with, which
// serializes task and interrupt context on every supported target.
unsafe impl<M, X, const NB: usize, const NS: usize> Sync for BusRegistry<M, X, NB, NS>
where
    M: SignalMatrix + Send,
    M::BusId: Send,
    M::Pin: Send,
{
}

struct Inner<M, X, const NB: usize, const NS: usize>
where
    M: SignalMatrix,
{
    matrix: M,
    available: Vec<M::BusId, NB>,
    buses: Vec<Bus<M>, NB>,
    slots: SlotPool<M, X, NS>,
}

impl<M, X, const NB: usize, const NS: usize> BusRegistry<M, X, NB, NS>
where
    M: SignalMatrix,
{
    pub fn new(matrix: M) -> Self {
        Self {
            inner: UnsafeCell::new(Inner {
                matrix,
                available: Vec::new(),
                buses: Vec::new(),
                slots: SlotPool::new(),
            }),
        }
    }

    /// Push a physical bus id onto the available pool.
    ///
    /// Returns `false` when the pool already holds the hardware-imposed
    /// maximum of `NB` ids.
    pub fn register_bus(&self, id: M::BusId) -> bool {
        critical_section::with(|_| {
            let inner = unsafe { &mut *self.inner.get() };
            inner.available.push(id).is_ok()
        })
    }

    /// Claim the most recently registered physical bus id outright.
    ///
    /// LIFO order is the documented tie-break: the last-registered id is
    /// handed out first. For consumers that drive a whole controller
    /// themselves (an Ethernet-over-SPI MAC, say) and bypass the shared-bus
    /// machinery. `None` once the pool is empty — ids are never returned.
    pub fn claim_bus(&self) -> Option<M::BusId> {
        critical_section::with(|_| {
            let inner = unsafe { &mut *self.inner.get() };
            inner.available.pop()
        })
    }

    /// Attach a device to the logical bus `name`.
    ///
    /// Lazily claims a physical controller for `name` on first use
    /// (initializing it through `transport`), binds a callback slot to the
    /// bus and `config` together with the caller's inner `hooks`, and
    /// registers the device with the transport. This is the sole entry
    /// point for device drivers on queued-transaction transports.
    pub fn alloc_device<T>(
        &self,
        name: &str,
        config: BusConfig<M>,
        hooks: TransferHooks<X>,
        transport: &mut T,
        params: T::Params,
    ) -> Result<T::Handle, AllocError<T::Error>>
    where
        T: Transport<M::BusId, Transaction = X>,
    {
        let result = critical_section::with(|_| {
            let inner = unsafe { &mut *self.inner.get() };

            let bus_idx = inner.get_or_create(name, transport)?;
            let bus_id = inner.buses[bus_idx].id();

            let slot = inner
                .slots
                .claim(Slot {
                    bus: bus_idx,
                    config,
                    inner_pre: hooks.pre,
                    inner_post: hooks.post,
                })
                .ok_or(AllocError::PoolExhausted)?;

            transport
                .register_device(bus_id, slot, params)
                .map(|handle| (slot, handle))
                .map_err(AllocError::Transport)
        });

        match &result {
            Ok((slot, _)) => {
                log::debug!("bus {}: device attached in slot {}", name, slot.index());
            }
            Err(err) => {
                log::error!("bus {}: device allocation failed: {}", name, err);
            }
        }

        result.map(|(_, handle)| handle)
    }

    /// Transaction pre-hook trampoline.
    ///
    /// Ensures the slot's configuration is applied on its bus (a no-op when
    /// it already is), then forwards to the device's inner pre-hook. Must
    /// run strictly before the transaction is dispatched on the wire; safe
    /// in interrupt and DMA-completion context.
    pub fn pre_transfer(&self, slot: SlotId, transaction: &mut X) {
        let inner_pre = critical_section::with(|_| {
            let inner = unsafe { &mut *self.inner.get() };
            inner.require_config(slot);
            inner.slots.get(slot).and_then(|s| s.inner_pre)
        });

        if let Some(hook) = inner_pre {
            hook(transaction);
        }
    }

    /// Transaction post-hook trampoline.
    ///
    /// Forwards to the device's inner post-hook only. The configuration is
    /// never auto-reverted here — it stays applied until a different
    /// device's pre-hook requires its own, which amortizes reconfiguration
    /// across consecutive transactions of one device.
    pub fn post_transfer(&self, slot: SlotId, transaction: &mut X) {
        let inner_post = critical_section::with(|_| {
            let inner = unsafe { &*self.inner.get() };
            inner.slots.get(slot).and_then(|s| s.inner_post)
        });

        if let Some(hook) = inner_post {
            hook(transaction);
        }
    }

    /// Apply the slot's configuration on its bus ahead of time.
    ///
    /// Equivalent to the switching work of [`pre_transfer`](Self::pre_transfer)
    /// without the inner hook; lets a driver pre-warm routing before a burst.
    pub fn require_config(&self, slot: SlotId) {
        critical_section::with(|_| {
            let inner = unsafe { &mut *self.inner.get() };
            inner.require_config(slot);
        });
    }

    /// Revert the slot's configuration if it is the one currently applied.
    ///
    /// No-op when another configuration already superseded it. The bus
    /// re-enters its idle state with all input signals tied high.
    pub fn free_config(&self, slot: SlotId) {
        critical_section::with(|_| {
            let inner = unsafe { &mut *self.inner.get() };
            inner.free_config(slot);
        });
    }

    /// Run `f` with a reference to the signal matrix.
    ///
    /// Configs are constructed against the registry's own matrix:
    /// `registry.with_matrix(|m| BusConfig::new(m, ..))`.
    pub fn with_matrix<R>(&self, f: impl FnOnce(&M) -> R) -> R {
        critical_section::with(|_| {
            let inner = unsafe { &*self.inner.get() };
            f(&inner.matrix)
        })
    }
}

impl<M, X, const NB: usize, const NS: usize> core::fmt::Debug for BusRegistry<M, X, NB, NS>
where
    M: SignalMatrix,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BusRegistry").finish_non_exhaustive()
    }
}

impl<M, X, const NB: usize, const NS: usize> Inner<M, X, NB, NS>
where
    M: SignalMatrix,
{
    /// Resolve `name` to its bus arena index, claiming a physical id and
    /// initializing the controller on first use.
    fn get_or_create<T>(
        &mut self,
        name: &str,
        transport: &mut T,
    ) -> Result<usize, AllocError<T::Error>>
    where
        T: Transport<M::BusId>,
    {
        if let Some(idx) = self.buses.iter().position(|bus| bus.name() == name) {
            return Ok(idx);
        }

        let mut stored: String<BUS_NAME_CAPACITY> = String::new();
        stored
            .push_str(name)
            .map_err(|_| AllocError::NameTooLong)?;

        let id = self.available.pop().ok_or(AllocError::PoolExhausted)?;

        // A failure past this point leaves `id` claimed; see the type-level
        // docs on the no-give-back policy.
        transport.init_bus(id).map_err(AllocError::Transport)?;

        self.buses
            .push(Bus::new(stored, id))
            .map_err(|_| AllocError::PoolExhausted)?;
        Ok(self.buses.len() - 1)
    }

    fn require_config(&mut self, slot: SlotId) {
        let Inner { matrix, buses, slots, .. } = self;

        let Some(incoming) = slots.get(slot) else {
            return;
        };
        let Some(bus) = buses.get_mut(incoming.bus) else {
            return;
        };

        if bus.is_current(slot) {
            return;
        }

        let outgoing = bus
            .current()
            .and_then(|prev| slots.get(prev))
            .map(|s| &s.config);
        bus.switch(matrix, outgoing, Some((slot, &incoming.config)));
    }

    fn free_config(&mut self, slot: SlotId) {
        let Inner { matrix, buses, slots, .. } = self;

        let Some(record) = slots.get(slot) else {
            return;
        };
        let Some(bus) = buses.get_mut(record.bus) else {
            return;
        };

        if !bus.is_current(slot) {
            return;
        }

        bus.switch(matrix, Some(&record.config), None);
    }
}
