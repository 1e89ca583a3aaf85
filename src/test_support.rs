//! Test support utilities - only compiled in test builds.

use core::cell::RefCell;

use heapless::{String, Vec};

use crate::{
    bus::BUS_NAME_CAPACITY,
    matrix::{BusLine, InvalidPin, PinRole, SignalMatrix},
    slots::SlotId,
    transport::Transport,
};

/// Pin-level operation recorded by [`MockMatrix`], in call order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixOp {
    Claim(u8, PinRole),
    Release(u8),
    ConnectOut(u8, u8, BusLine),
    ConnectIn(u8, u8, BusLine),
    DisconnectOut(u8),
    TieInHigh(u8, BusLine),
}

/// Signal matrix with 40 routable pins (0..=39) that records every call.
pub struct MockMatrix {
    ops: RefCell<Vec<MatrixOp, 64>>,
}

impl MockMatrix {
    pub fn new() -> Self {
        Self {
            ops: RefCell::new(Vec::new()),
        }
    }

    /// Drain and return the recorded operations.
    pub fn take_ops(&self) -> Vec<MatrixOp, 64> {
        core::mem::take(&mut self.ops.borrow_mut())
    }

    fn record(&self, op: MatrixOp) {
        self.ops.borrow_mut().push(op).unwrap();
    }
}

impl SignalMatrix for MockMatrix {
    type BusId = u8;
    type Pin = u8;

    fn claim_pin(&self, pin: u8, role: PinRole) -> Result<(), InvalidPin> {
        if pin > 39 {
            return Err(InvalidPin);
        }
        self.record(MatrixOp::Claim(pin, role));
        Ok(())
    }

    fn release_pin(&self, pin: u8) {
        self.record(MatrixOp::Release(pin));
    }

    fn connect_out(&self, pin: u8, bus: u8, line: BusLine) {
        self.record(MatrixOp::ConnectOut(pin, bus, line));
    }

    fn connect_in(&self, pin: u8, bus: u8, line: BusLine) {
        self.record(MatrixOp::ConnectIn(pin, bus, line));
    }

    fn disconnect_out(&self, pin: u8) {
        self.record(MatrixOp::DisconnectOut(pin));
    }

    fn tie_in_high(&self, bus: u8, line: BusLine) {
        self.record(MatrixOp::TieInHigh(bus, line));
    }
}

/// Transaction record the mock transport's hooks mutate.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MockTransaction {
    pub pre_hits: usize,
    pub post_hits: usize,
}

/// Inner pre-hook counting invocations on the transaction.
pub fn mark_pre(transaction: &mut MockTransaction) {
    transaction.pre_hits += 1;
}

/// Inner post-hook counting invocations on the transaction.
pub fn mark_post(transaction: &mut MockTransaction) {
    transaction.post_hits += 1;
}

/// Transport that records controller bring-up and device registrations.
pub struct MockTransport {
    pub initialized: Vec<u8, 4>,
    pub registered: Vec<(u8, SlotId), 8>,
    pub fail_init: bool,
    pub fail_registration: bool,
    next_handle: usize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            initialized: Vec::new(),
            registered: Vec::new(),
            fail_init: false,
            fail_registration: false,
            next_handle: 0,
        }
    }
}

impl Transport<u8> for MockTransport {
    type Transaction = MockTransaction;
    type Params = ();
    type Handle = usize;
    type Error = &'static str;

    fn init_bus(&mut self, bus: u8) -> Result<(), &'static str> {
        if self.fail_init {
            return Err("init refused");
        }
        self.initialized.push(bus).unwrap();
        Ok(())
    }

    fn register_device(
        &mut self,
        bus: u8,
        slot: SlotId,
        _params: (),
    ) -> Result<usize, &'static str> {
        if self.fail_registration {
            return Err("device rejected");
        }
        self.registered.push((bus, slot)).unwrap();
        let handle = self.next_handle;
        self.next_handle += 1;
        Ok(handle)
    }
}

/// Builds a logical bus name for constructing buses directly in tests.
pub fn bus_name(name: &str) -> String<BUS_NAME_CAPACITY> {
    let mut stored = String::new();
    stored.push_str(name).unwrap();
    stored
}
