//! Pad-combination validation.
//!
//! A SERCOM in SPI master mode cannot put clock and data-out on arbitrary
//! pads. The allowed placements are encoded by the DOPO field of CTRLA, and
//! each chip family accepts a different subset. The tables here are chip
//! data, supplied through [`PadGeometry`].

use crate::pin::Pad;

/// Data-out pinout: the CTRLA.DOPO routing-configuration code (0..=3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Dopo(u8);

impl Dopo {
    pub const fn new(bits: u8) -> Option<Self> {
        if bits <= 0x3 {
            Some(Self(bits))
        } else {
            None
        }
    }

    pub const fn bits(self) -> u8 {
        self.0
    }
}

/// Which clock/data-out pad placements a SERCOM supports.
pub trait PadGeometry {
    /// Whether SCK may be routed to `pad`.
    fn valid_clock_pad(pad: Pad) -> bool;

    /// DOPO code for a (clock, data-out) pad pair, or `None` when the
    /// hardware cannot route that pair.
    fn dopo(clock: Pad, mosi: Pad) -> Option<Dopo>;

    /// DOPO code for a bus without a data-out pin: the first placement that
    /// puts SCK on `clock`.
    fn clock_only_dopo(clock: Pad) -> Option<Dopo> {
        Pad::ALL.iter().find_map(|&mosi| Self::dopo(clock, mosi))
    }
}

/// SAMD21 / SAMR21 pad table.
pub struct Samd21Pads;

impl PadGeometry for Samd21Pads {
    fn valid_clock_pad(pad: Pad) -> bool {
        matches!(pad, Pad::Pad1 | Pad::Pad3)
    }

    fn dopo(clock: Pad, mosi: Pad) -> Option<Dopo> {
        let bits = match (clock, mosi) {
            (Pad::Pad1, Pad::Pad0) => 0,
            (Pad::Pad3, Pad::Pad2) => 1,
            (Pad::Pad1, Pad::Pad3) => 2,
            (Pad::Pad3, Pad::Pad0) => 3,
            _ => return None,
        };
        Dopo::new(bits)
    }
}

/// SAMD51 / SAME5x pad table. SCK is fixed to pad 1.
pub struct Samd51Pads;

impl PadGeometry for Samd51Pads {
    fn valid_clock_pad(pad: Pad) -> bool {
        pad == Pad::Pad1
    }

    fn dopo(clock: Pad, mosi: Pad) -> Option<Dopo> {
        let bits = match (clock, mosi) {
            (Pad::Pad1, Pad::Pad0) => 0,
            (Pad::Pad1, Pad::Pad3) => 2,
            _ => return None,
        };
        Dopo::new(bits)
    }
}
