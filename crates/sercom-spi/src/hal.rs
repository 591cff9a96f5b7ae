//! Hardware boundary consumed by the driver.
//!
//! Board crates implement these traits over the chip's register blocks,
//! DMA engine and port controller; the tests implement them over a mock.

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::error::DriverError;
use crate::pads::{Dopo, PadGeometry};
use crate::pin::{MuxFunction, Pad};
use crate::resolver::BoardOverride;
use crate::tracker::ResourceTracker;

/// Status returned by blocking and DMA transfers: the number of bytes moved,
/// or a negative driver error code.
pub type Status = i32;

/// Reports whether a SERCOM is already running (its CTRLA.ENABLE bit).
pub trait Occupancy {
    fn is_active(&self, sercom: u8) -> bool;
}

/// Register-level access to one SERCOM in SPI master mode.
///
/// The CPHA, CPOL, CHSIZE and BAUD setters are enable-protected: they only
/// take effect while the SERCOM is disabled.
pub trait SercomSpi {
    /// Largest length a single DMA call accepts.
    const MAX_DMA_CHUNK: usize = 65535;

    fn index(&self) -> u8;

    /// Connect the core and slow generic clocks to this SERCOM.
    fn clock_init(&mut self);
    /// Reset the SERCOM to the driver's default SPI master settings.
    fn init(&mut self) -> Result<(), DriverError>;
    fn deinit(&mut self);
    fn enable(&mut self);
    fn disable(&mut self);
    fn wait_for_sync(&mut self);

    fn set_master_mode(&mut self);
    fn set_dopo(&mut self, dopo: Dopo);
    fn set_dipo(&mut self, pad: Pad);
    /// Set BAUD through the driver, which fails only if the SERCOM is busy.
    fn set_baud(&mut self, baud: u8) -> Result<(), DriverError>;

    fn cpha(&self) -> bool;
    fn set_cpha(&mut self, cpha: bool);
    fn cpol(&self) -> bool;
    fn set_cpol(&mut self, cpol: bool);
    fn chsize(&self) -> u8;
    fn set_chsize(&mut self, chsize: u8);
    fn baud(&self) -> u8;
    fn write_baud(&mut self, baud: u8);

    /// Byte clocked out while the blocking path reads.
    fn set_dummy_byte(&mut self, byte: u8);

    fn io_write(&mut self, data: &[u8]) -> Status;
    fn io_read(&mut self, data: &mut [u8]) -> Status;
    fn sync_transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> Status;

    fn dma_write(&mut self, data: &[u8]) -> Status;
    fn dma_read(&mut self, data: &mut [u8], fill: u8) -> Status;
    fn dma_transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> Status;
}

/// Generic GPIO primitives of the port controller.
pub trait PortControl {
    fn set_direction_output(&self, pin: u8);
    fn disable_pull(&self, pin: u8);
    fn set_function(&self, pin: u8, function: MuxFunction);
    fn set_strong_drive(&self, pin: u8);
    /// Return a pin to its reset state (input, no mux).
    fn reset_pin(&self, pin: u8);
}

/// Everything a board provides to run SPI buses.
pub trait Board: Occupancy {
    type Sercom: SercomSpi;
    type Port: PortControl;
    type Pads: PadGeometry;
    type Mutex: RawMutex;

    /// Number of SERCOM instances on the chip.
    const SERCOM_COUNT: u8;
    /// Generic clock feeding the SERCOM baud generator.
    const REFERENCE_CLOCK_HZ: u32 = 48_000_000;

    /// Register access for SERCOM `index`.
    fn sercom(&self, index: u8) -> Option<Self::Sercom>;
    fn port(&self) -> &Self::Port;
    fn resources(&self) -> &ResourceTracker<Self::Mutex>;

    /// Fixed pin routings that bypass the general search.
    fn overrides(&self) -> &'static [BoardOverride] {
        &[]
    }
}
