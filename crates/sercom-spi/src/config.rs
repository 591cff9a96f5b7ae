//! Bus settings and the SERCOM baud generator arithmetic.

use embedded_hal::spi::{Mode, Phase, Polarity, MODE_0};

/// Rate a freshly constructed bus runs at. SD cards need a slow, quiet
/// clock until they have been switched into SPI mode.
pub const DEFAULT_FREQUENCY: u32 = 250_000;

/// Character size (CTRLB.CHSIZE).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WordSize {
    Eight,
    Nine,
}

impl WordSize {
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            8 => Some(Self::Eight),
            9 => Some(Self::Nine),
            _ => None,
        }
    }

    pub const fn bits(self) -> u8 {
        match self {
            Self::Eight => 8,
            Self::Nine => 9,
        }
    }

    pub(crate) const fn chsize(self) -> u8 {
        self.bits() - 8
    }

    pub(crate) const fn from_chsize(chsize: u8) -> Self {
        if chsize == 1 {
            Self::Nine
        } else {
            Self::Eight
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Requested SCK rate in Hz. The bus runs at the closest rate the baud
    /// generator can produce without exceeding it.
    pub frequency: u32,
    pub mode: Mode,
    pub word_size: WordSize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frequency: DEFAULT_FREQUENCY,
            mode: MODE_0,
            word_size: WordSize::Eight,
        }
    }
}

impl Config {
    /// Build a config from the raw values bindings pass around: polarity
    /// and phase as 0/1, word size in bits. Bit counts other than 9 are
    /// treated as 8.
    pub fn from_raw(frequency: u32, polarity: u8, phase: u8, bits: u8) -> Self {
        Self {
            frequency,
            mode: Mode {
                polarity: if polarity == 0 {
                    Polarity::IdleLow
                } else {
                    Polarity::IdleHigh
                },
                phase: if phase == 0 {
                    Phase::CaptureOnFirstTransition
                } else {
                    Phase::CaptureOnSecondTransition
                },
            },
            word_size: WordSize::from_bits(bits).unwrap_or(WordSize::Eight),
        }
    }

    // CPHA
    pub(crate) fn raw_phase(&self) -> bool {
        match self.mode.phase {
            Phase::CaptureOnSecondTransition => true,
            Phase::CaptureOnFirstTransition => false,
        }
    }

    // CPOL
    pub(crate) fn raw_polarity(&self) -> bool {
        match self.mode.polarity {
            Polarity::IdleLow => false,
            Polarity::IdleHigh => true,
        }
    }
}

/// BAUD register value for `frequency`, rounded so the resulting rate never
/// exceeds the request. Rates below what BAUD can express clamp to 255.
pub const fn baud_divisor(reference_hz: u32, frequency: u32) -> u8 {
    if frequency == 0 {
        return u8::MAX;
    }
    let twice = 2 * frequency as u64;
    let divisor = (reference_hz as u64 + twice - 1) / twice;
    let baud = divisor.saturating_sub(1);
    if baud > u8::MAX as u64 {
        u8::MAX
    } else {
        baud as u8
    }
}

/// SCK rate produced by BAUD register value `baud`.
pub const fn divisor_frequency(reference_hz: u32, baud: u8) -> u32 {
    reference_hz / (2 * (baud as u32 + 1))
}
