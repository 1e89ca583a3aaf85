//! A `no_std`, no-alloc shared-bus arbitration layer for embedded systems.
//!
//! Several logical devices with mutually incompatible pin-level signaling —
//! a radio transceiver, an Ethernet-over-SPI controller, an e-paper display
//! — can take turns driving a small fixed number of physical serial-bus
//! controllers. The hardware pin routing is reprogrammed transparently and
//! minimally between uses, safely across both task-level code and
//! interrupt/DMA-context transaction callbacks.
//!
//! This layer decides *which pin configuration is active* when a transaction
//! happens, never *when* a device transacts, and does no data-level protocol
//! work.
//!
//! # Features
//!
//! - **Zero heap allocation** - fixed-capacity pools, claimed for the
//!   process lifetime
//! - **Lazy bus sharing** - devices attach under a logical bus name; the
//!   first attachment claims a physical controller
//! - **Minimal reconfiguration** - a configuration stays applied until a
//!   different device's transaction needs its own
//! - **Two transport styles** - callback interception for queued
//!   asynchronous transports, a request/release patch guard for synchronous
//!   ones
//!
//! # Architecture
//!
//! ```text
//! device driver                         transport ISR/DMA context
//!      │                                        │
//!      │ alloc_device("radio", cfg, hooks)      │ pre_transfer(slot)
//!      ▼                                        ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │ BusRegistry                                                 │
//! │   available ids ─── pop (LIFO) ──▶ Bus("radio", id)         │
//! │   slot pool ─── claim ──▶ Slot(bus, BusConfig, inner hooks) │
//! │                                                             │
//! │   require_config: revert outgoing, then apply incoming      │
//! └──────────────────────────┬──────────────────────────────────┘
//!                            │ connect/disconnect/tie-high
//!                            ▼
//!                      SignalMatrix (HAL pin crossbar)
//! ```
//!
//! The registry is constructed once at startup and injected into every
//! device driver. All shared state sits behind `critical-section`, so the
//! trampolines may fire from interrupt context while tasks allocate.
//!
//! # Example
//!
//! ```rust,no_run
//! use embedded_patchbay::prelude::*;
//!
//! // Supplied by the HAL layer in a real build.
//! struct Matrix;
//! impl SignalMatrix for Matrix {
//!     type BusId = u8;
//!     type Pin = u8;
//!     fn claim_pin(&self, _: u8, _: PinRole) -> Result<(), InvalidPin> { Ok(()) }
//!     fn release_pin(&self, _: u8) {}
//!     fn connect_out(&self, _: u8, _: u8, _: BusLine) {}
//!     fn connect_in(&self, _: u8, _: u8, _: BusLine) {}
//!     fn disconnect_out(&self, _: u8) {}
//!     fn tie_in_high(&self, _: u8, _: BusLine) {}
//! }
//!
//! struct Spi;
//! struct Txn;
//! impl Transport<u8> for Spi {
//!     type Transaction = Txn;
//!     type Params = u32; // clock rate
//!     type Handle = usize;
//!     type Error = ();
//!     fn init_bus(&mut self, _: u8) -> Result<(), ()> { Ok(()) }
//!     fn register_device(&mut self, _: u8, _: SlotId, _: u32) -> Result<usize, ()> {
//!         Ok(0)
//!     }
//! }
//!
//! // Two physical controllers, up to four attached devices.
//! let registry: BusRegistry<Matrix, Txn, 2, 4> = BusRegistry::new(Matrix);
//! registry.register_bus(2);
//! registry.register_bus(3);
//!
//! let mut spi = Spi;
//! let config = registry
//!     .with_matrix(|m| BusConfig::new(m, Some(13), Some(12), Some(14)))
//!     .unwrap();
//! let radio = registry
//!     .alloc_device("radio", config, TransferHooks::default(), &mut spi, 4_000_000)
//!     .unwrap();
//! // `radio` is the transport's device handle; the transport's transaction
//! // callbacks call registry.pre_transfer/post_transfer with the SlotId it
//! // received in register_device.
//! # let _ = radio;
//! ```

#![deny(unsafe_code)]
#![no_std]

pub mod bus;
pub mod config;
pub mod error;
pub mod matrix;
pub mod patcher;
pub mod registry;
pub mod slots;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use bus::BUS_NAME_CAPACITY;
pub use config::BusConfig;
pub use error::{AllocError, ConfigError};
pub use matrix::{BusLine, InvalidPin, PinRole, SignalMatrix};
pub use patcher::{ConfigPatch, PatchLock, PatchTarget, RawSemaphore, SpinSemaphore};
pub use registry::BusRegistry;
pub use slots::{SlotId, TransferHook, TransferHooks};
pub use transport::Transport;

pub mod prelude {
    pub use super::{
        AllocError, BusConfig, BusLine, BusRegistry, ConfigError, ConfigPatch, InvalidPin,
        PatchLock, PatchTarget, PinRole, RawSemaphore, SignalMatrix, SlotId, SpinSemaphore,
        TransferHook, TransferHooks, Transport,
    };
}
