#![no_std]
//! SPI master driver for SERCOM-style serial peripherals.
//!
//! Chips in this family have a handful of identical SERCOM instances, and a
//! pin multiplexer that only lets each pin reach some (instance, pad) pairs.
//! [`Spi::construct`] searches the board's pin table for a free SERCOM that
//! can carry the requested clock, MOSI and MISO pins, programs it, and
//! claims the pins. After that the bus can be reconfigured, shared through
//! an advisory lock, and used for transfers that switch to chunked DMA for
//! longer buffers.
//!
//! Hardware access goes through the traits in [`hal`], so the driver runs
//! unchanged over real registers or a test double.

mod config;
mod error;
pub mod hal;
mod lock;
pub mod pads;
pub mod pin;
pub mod resolver;
mod spi;
mod tracker;
mod transfer;

pub use config::{
    baud_divisor, divisor_frequency, Config, WordSize, DEFAULT_FREQUENCY,
};
pub use error::{DriverError, Error, PinTriple};
pub use hal::{Board, Occupancy, PortControl, SercomSpi, Status};
pub use lock::SpiLock;
pub use pads::{Dopo, PadGeometry, Samd21Pads, Samd51Pads};
pub use pin::{MuxFunction, Pad, PadRoute, Pin};
pub use resolver::{BoardOverride, RouteResolution};
pub use spi::Spi;
pub use tracker::ResourceTracker;
pub use transfer::DMA_THRESHOLD;
