#![allow(unsafe_code)]

//! Exclusive-access patch guard for synchronous transports.
//!
//! Transports that only expose polled transfers have no per-transaction
//! callbacks to intercept, so configuration switching cannot ride along
//! with the transaction queue. Instead the caller brackets every transfer
//! burst with [`PatchLock::request`] / [`PatchLock::release`]: the lock
//! keeps exactly one [`PatchTarget`] patched at a time and skips the
//! unpatch/patch work entirely when the same target requests the bus twice
//! in a row.

use core::cell::UnsafeCell;

use crate::{config::BusConfig, matrix::SignalMatrix};

/// A device's routing hooks for the synchronous path.
pub trait PatchTarget {
    /// Program the hardware routing for this device.
    fn patch(&self);
    /// Un-program it back to a neutral state.
    fn unpatch(&self);
}

/// Binary semaphore seam.
///
/// Starts in the available state and acts as a mutex, not a counted
/// resource. An RTOS port typically wraps its native semaphore; bare-metal
/// builds can use [`SpinSemaphore`].
pub trait RawSemaphore {
    /// Block until the semaphore is available, then take it.
    fn acquire(&self);
    /// Return the semaphore.
    fn release(&self);
}

/// Busy-waiting binary semaphore built on `critical-section`.
pub struct SpinSemaphore {
    taken: UnsafeCell<bool>,
}

// Safety: `taken` is only accessed inside critical sections.
unsafe impl Sync for SpinSemaphore {}

impl SpinSemaphore {
    pub const fn new() -> Self {
        Self {
            taken: UnsafeCell::new(false),
        }
    }
}

impl Default for SpinSemaphore {
    fn default() -> Self {
        Self::new()
    }
}

impl RawSemaphore for SpinSemaphore {
    fn acquire(&self) {
        loop {
            let acquired = critical_section::with(|_| {
                let taken = unsafe { &mut *self.taken.get() };
                if *taken {
                    false
                } else {
                    *taken = true;
                    true
                }
            });
            if acquired {
                return;
            }
            core::hint::spin_loop();
        }
    }

    fn release(&self) {
        critical_section::with(|_| unsafe {
            *self.taken.get() = false;
        });
    }
}

/// Mutual exclusion plus configuration tracking for synchronous transfers.
///
/// Exactly one target is patched at any time. Callers must pair every
/// [`request`](Self::request) with a [`release`](Self::release); a missing
/// release deadlocks every later caller — there is deliberately no safety
/// net, matching the RTOS semaphore discipline this replaces.
pub struct PatchLock<'a, S: RawSemaphore> {
    semaphore: S,
    current: UnsafeCell<Option<&'a dyn PatchTarget>>,
}

// Safety: `current` is only accessed while the semaphore is held.
unsafe impl<'a, S: RawSemaphore + Sync> Sync for PatchLock<'a, S> {}

impl<'a, S: RawSemaphore> PatchLock<'a, S> {
    pub const fn new(semaphore: S) -> Self {
        Self {
            semaphore,
            current: UnsafeCell::new(None),
        }
    }

    /// Acquire the bus and make sure `handle` is the patched target.
    ///
    /// When `handle` is already current (pointer identity), no routing work
    /// happens at all — the cost of reconfiguration is only paid when
    /// ownership actually moves between devices. The semaphore stays held
    /// until [`release`](Self::release).
    pub fn request(&self, handle: &'a dyn PatchTarget) {
        self.semaphore.acquire();

        let current = unsafe { &mut *self.current.get() };

        let same = matches!(
            *current,
            Some(cur) if core::ptr::addr_eq(
                cur as *const dyn PatchTarget,
                handle as *const dyn PatchTarget,
            )
        );
        if same {
            return;
        }

        if let Some(cur) = current.take() {
            cur.unpatch();
        }
        handle.patch();
        *current = Some(handle);
    }

    /// Give the bus back. The target stays patched until the next
    /// [`request`](Self::request) of a different handle.
    pub fn release(&self) {
        self.semaphore.release();
    }
}

impl<'a, S: RawSemaphore> core::fmt::Debug for PatchLock<'a, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PatchLock").finish_non_exhaustive()
    }
}

/// [`PatchTarget`] adapter driving a [`BusConfig`] on a fixed bus.
///
/// Lets a synchronous driver reuse the exact apply/revert routing of the
/// queued-transaction path.
pub struct ConfigPatch<'a, M: SignalMatrix> {
    matrix: &'a M,
    bus: M::BusId,
    config: &'a BusConfig<M>,
}

impl<'a, M: SignalMatrix> ConfigPatch<'a, M> {
    pub fn new(matrix: &'a M, bus: M::BusId, config: &'a BusConfig<M>) -> Self {
        Self {
            matrix,
            bus,
            config,
        }
    }
}

impl<M: SignalMatrix> PatchTarget for ConfigPatch<'_, M> {
    fn patch(&self) {
        self.config.apply(self.matrix, self.bus);
    }

    fn unpatch(&self) {
        self.config.revert(self.matrix, self.bus);
    }
}
