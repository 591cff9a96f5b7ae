#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use sercom_spi::{
    resolver::BoardOverride, Board, Dopo, DriverError, MuxFunction,
    Occupancy, Pad, PadRoute, Pin, PortControl, ResourceTracker, Samd21Pads,
    SercomSpi, Status,
};

// ---------------------------------------------------------------------------
// Pin table
// ---------------------------------------------------------------------------

use sercom_spi::MuxFunction::{C, D};
use sercom_spi::Pad::{Pad0, Pad1, Pad2, Pad3};

macro_rules! route {
    ($sercom:expr, $pad:expr, $function:expr) => {
        PadRoute { sercom: $sercom, pad: $pad, function: $function }
    };
}

/// Clock candidate: SERCOM2 pad 3.
pub static P0: Pin = Pin::new(0, &[route!(2, Pad3, C)]);
/// MOSI candidate: SERCOM2 pad 2.
pub static P1: Pin = Pin::new(1, &[route!(2, Pad2, C)]);
/// Two pads on SERCOM2; only the second pairs with a pad-3 clock.
pub static P2: Pin =
    Pin::new(2, &[route!(2, Pad1, C), route!(2, Pad2, D)]);
/// Not routable anywhere.
pub static P3: Pin = Pin::new(3, &[]);

pub static PA12: Pin =
    Pin::new(12, &[route!(2, Pad0, C), route!(4, Pad0, D)]);
pub static PA16: Pin =
    Pin::new(16, &[route!(1, Pad0, C), route!(3, Pad0, D)]);
pub static PA17: Pin =
    Pin::new(17, &[route!(1, Pad1, C), route!(3, Pad1, D)]);
pub static PA18: Pin =
    Pin::new(18, &[route!(1, Pad2, C), route!(3, Pad2, D)]);
pub static PA19: Pin =
    Pin::new(19, &[route!(1, Pad3, C), route!(3, Pad3, D)]);
pub static PB10: Pin = Pin::new(42, &[route!(4, Pad2, D)]);
pub static PB11: Pin = Pin::new(43, &[route!(4, Pad3, D)]);
/// Route to an index past the last SERCOM.
pub static PX: Pin = Pin::new(60, &[route!(0xff, Pad3, C)]);

// ---------------------------------------------------------------------------
// Mock SERCOM
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    IoWrite(usize),
    IoRead(usize),
    SyncTransfer(usize),
    DmaWrite(usize),
    DmaRead(usize, u8),
    DmaTransfer(usize),
}

#[derive(Debug, Default)]
pub struct SercomState {
    pub clocked: bool,
    pub initialized: bool,
    pub enabled: bool,
    pub master: bool,
    pub dopo: Option<u8>,
    pub dipo: Option<u8>,
    pub cpha: bool,
    pub cpol: bool,
    pub chsize: u8,
    pub baud: u8,
    pub dummy: u8,
    /// Writes to CTRLA/CTRLB/BAUD, enable and disable included.
    pub register_writes: usize,
    pub init_count: usize,
    pub deinit_count: usize,
    pub fail_init: bool,
    pub fail_baud: bool,
    pub fail_io: bool,
    /// 1-based DMA call that returns an error.
    pub fail_dma_call: Option<usize>,
    pub dma_calls: usize,
    pub calls: Vec<Call>,
}

impl SercomState {
    fn dma_status(&mut self, len: usize) -> Status {
        self.dma_calls += 1;
        if self.fail_dma_call == Some(self.dma_calls) {
            -1
        } else {
            len as Status
        }
    }

    fn io_status(&self, len: usize) -> Status {
        if self.fail_io {
            -5
        } else {
            len as Status
        }
    }
}

pub struct MockSercom<const CHUNK: usize> {
    index: u8,
    state: Rc<RefCell<SercomState>>,
}

impl<const CHUNK: usize> SercomSpi for MockSercom<CHUNK> {
    const MAX_DMA_CHUNK: usize = CHUNK;

    fn index(&self) -> u8 {
        self.index
    }

    fn clock_init(&mut self) {
        self.state.borrow_mut().clocked = true;
    }

    fn init(&mut self) -> Result<(), DriverError> {
        let mut s = self.state.borrow_mut();
        s.init_count += 1;
        if s.fail_init {
            return Err(DriverError(-17));
        }
        s.initialized = true;
        s.cpha = false;
        s.cpol = false;
        s.chsize = 0;
        s.baud = 0;
        Ok(())
    }

    fn deinit(&mut self) {
        let mut s = self.state.borrow_mut();
        s.deinit_count += 1;
        s.initialized = false;
        s.enabled = false;
    }

    fn enable(&mut self) {
        let mut s = self.state.borrow_mut();
        s.register_writes += 1;
        s.enabled = true;
    }

    fn disable(&mut self) {
        let mut s = self.state.borrow_mut();
        s.register_writes += 1;
        s.enabled = false;
    }

    fn wait_for_sync(&mut self) {}

    fn set_master_mode(&mut self) {
        let mut s = self.state.borrow_mut();
        s.register_writes += 1;
        s.master = true;
    }

    fn set_dopo(&mut self, dopo: Dopo) {
        let mut s = self.state.borrow_mut();
        s.register_writes += 1;
        s.dopo = Some(dopo.bits());
    }

    fn set_dipo(&mut self, pad: Pad) {
        let mut s = self.state.borrow_mut();
        s.register_writes += 1;
        s.dipo = Some(pad.bits());
    }

    fn set_baud(&mut self, baud: u8) -> Result<(), DriverError> {
        let mut s = self.state.borrow_mut();
        if s.fail_baud {
            return Err(DriverError(-4));
        }
        s.register_writes += 1;
        s.baud = baud;
        Ok(())
    }

    fn cpha(&self) -> bool {
        self.state.borrow().cpha
    }

    fn set_cpha(&mut self, cpha: bool) {
        let mut s = self.state.borrow_mut();
        s.register_writes += 1;
        s.cpha = cpha;
    }

    fn cpol(&self) -> bool {
        self.state.borrow().cpol
    }

    fn set_cpol(&mut self, cpol: bool) {
        let mut s = self.state.borrow_mut();
        s.register_writes += 1;
        s.cpol = cpol;
    }

    fn chsize(&self) -> u8 {
        self.state.borrow().chsize
    }

    fn set_chsize(&mut self, chsize: u8) {
        let mut s = self.state.borrow_mut();
        s.register_writes += 1;
        s.chsize = chsize;
    }

    fn baud(&self) -> u8 {
        self.state.borrow().baud
    }

    fn write_baud(&mut self, baud: u8) {
        let mut s = self.state.borrow_mut();
        s.register_writes += 1;
        s.baud = baud;
    }

    fn set_dummy_byte(&mut self, byte: u8) {
        self.state.borrow_mut().dummy = byte;
    }

    fn io_write(&mut self, data: &[u8]) -> Status {
        let mut s = self.state.borrow_mut();
        s.calls.push(Call::IoWrite(data.len()));
        s.io_status(data.len())
    }

    fn io_read(&mut self, data: &mut [u8]) -> Status {
        let mut s = self.state.borrow_mut();
        s.calls.push(Call::IoRead(data.len()));
        data.fill(s.dummy);
        s.io_status(data.len())
    }

    fn sync_transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> Status {
        let mut s = self.state.borrow_mut();
        s.calls.push(Call::SyncTransfer(tx.len()));
        // Loopback.
        rx.copy_from_slice(tx);
        s.io_status(tx.len())
    }

    fn dma_write(&mut self, data: &[u8]) -> Status {
        let mut s = self.state.borrow_mut();
        s.calls.push(Call::DmaWrite(data.len()));
        s.dma_status(data.len())
    }

    fn dma_read(&mut self, data: &mut [u8], fill: u8) -> Status {
        let mut s = self.state.borrow_mut();
        s.calls.push(Call::DmaRead(data.len(), fill));
        data.fill(fill);
        s.dma_status(data.len())
    }

    fn dma_transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> Status {
        let mut s = self.state.borrow_mut();
        s.calls.push(Call::DmaTransfer(tx.len()));
        rx.copy_from_slice(tx);
        s.dma_status(tx.len())
    }
}

// ---------------------------------------------------------------------------
// Mock port
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PinState {
    pub output: bool,
    pub pull_off: bool,
    pub function: Option<MuxFunction>,
    pub strong_drive: bool,
}

#[derive(Default)]
pub struct MockPort {
    pub pins: RefCell<HashMap<u8, PinState>>,
    pub resets: RefCell<Vec<u8>>,
}

impl MockPort {
    pub fn pin(&self, pin: u8) -> PinState {
        self.pins.borrow().get(&pin).copied().unwrap_or_default()
    }
}

impl PortControl for MockPort {
    fn set_direction_output(&self, pin: u8) {
        self.pins.borrow_mut().entry(pin).or_default().output = true;
    }

    fn disable_pull(&self, pin: u8) {
        self.pins.borrow_mut().entry(pin).or_default().pull_off = true;
    }

    fn set_function(&self, pin: u8, function: MuxFunction) {
        self.pins.borrow_mut().entry(pin).or_default().function =
            Some(function);
    }

    fn set_strong_drive(&self, pin: u8) {
        self.pins.borrow_mut().entry(pin).or_default().strong_drive = true;
    }

    fn reset_pin(&self, pin: u8) {
        self.pins.borrow_mut().remove(&pin);
        self.resets.borrow_mut().push(pin);
    }
}

// ---------------------------------------------------------------------------
// Mock board
// ---------------------------------------------------------------------------

pub const SERCOM_COUNT: u8 = 6;

pub struct MockBoard<const CHUNK: usize = 65535> {
    pub sercoms: Vec<Rc<RefCell<SercomState>>>,
    pub port: MockPort,
    pub tracker: ResourceTracker<NoopRawMutex>,
    pub overrides: &'static [BoardOverride],
}

impl<const CHUNK: usize> MockBoard<CHUNK> {
    pub fn new() -> Self {
        Self {
            sercoms: (0..SERCOM_COUNT)
                .map(|_| Rc::new(RefCell::new(SercomState::default())))
                .collect(),
            port: MockPort::default(),
            tracker: ResourceTracker::new(),
            overrides: &[],
        }
    }

    pub fn with_overrides(overrides: &'static [BoardOverride]) -> Self {
        Self { overrides, ..Self::new() }
    }

    pub fn state(&self, index: u8) -> std::cell::RefMut<'_, SercomState> {
        self.sercoms[index as usize].borrow_mut()
    }

    pub fn calls(&self, index: u8) -> Vec<Call> {
        self.sercoms[index as usize].borrow().calls.clone()
    }

    pub fn total_inits(&self) -> usize {
        self.sercoms.iter().map(|s| s.borrow().init_count).sum()
    }
}

impl<const CHUNK: usize> Occupancy for MockBoard<CHUNK> {
    fn is_active(&self, sercom: u8) -> bool {
        self.sercoms
            .get(sercom as usize)
            .is_some_and(|state| state.borrow().enabled)
    }
}

impl<const CHUNK: usize> Board for MockBoard<CHUNK> {
    type Sercom = MockSercom<CHUNK>;
    type Port = MockPort;
    type Pads = Samd21Pads;
    type Mutex = NoopRawMutex;

    const SERCOM_COUNT: u8 = SERCOM_COUNT;

    fn sercom(&self, index: u8) -> Option<Self::Sercom> {
        self.sercoms
            .get(index as usize)
            .map(|state| MockSercom { index, state: state.clone() })
    }

    fn port(&self) -> &Self::Port {
        &self.port
    }

    fn resources(&self) -> &ResourceTracker<Self::Mutex> {
        &self.tracker
    }

    fn overrides(&self) -> &'static [BoardOverride] {
        self.overrides
    }
}
