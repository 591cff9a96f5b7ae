//! Bookkeeping of claimed pins and SERCOMs across soft resets.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

/// Pins numbered at or above this are not tracked.
pub const MAX_TRACKED_PINS: u8 = 128;
/// SERCOMs indexed at or above this are not tracked.
pub const MAX_TRACKED_SERCOMS: u8 = 32;

#[derive(Default)]
struct Claims {
    pins: u128,
    never_reset_pins: u128,
    sercoms: u32,
    never_reset_sercoms: u32,
}

impl Claims {
    const fn new() -> Self {
        Self { pins: 0, never_reset_pins: 0, sercoms: 0, never_reset_sercoms: 0 }
    }
}

fn pin_bit(pin: u8) -> u128 {
    1u128.checked_shl(pin.into()).unwrap_or(0)
}

fn sercom_bit(index: u8) -> u32 {
    1u32.checked_shl(index.into()).unwrap_or(0)
}

/// Tracks which pins and SERCOMs are claimed, and which of those must
/// survive a soft reset.
///
/// Normally a single static per board, shared by every bus.
pub struct ResourceTracker<M: RawMutex> {
    claims: Mutex<M, RefCell<Claims>>,
}

impl<M: RawMutex> Default for ResourceTracker<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> ResourceTracker<M> {
    pub const fn new() -> Self {
        Self { claims: Mutex::new(RefCell::new(Claims::new())) }
    }

    fn with<R>(&self, f: impl FnOnce(&mut Claims) -> R) -> R {
        self.claims.lock(|claims| f(&mut claims.borrow_mut()))
    }

    /// Claim `pin`. Returns `false` if it is already claimed.
    pub fn try_claim_pin(&self, pin: u8) -> bool {
        let bit = pin_bit(pin);
        self.with(|claims| {
            if claims.pins & bit != 0 {
                return false;
            }
            claims.pins |= bit;
            true
        })
    }

    /// Release `pin`, clearing any never-reset mark.
    pub fn release_pin(&self, pin: u8) {
        let bit = pin_bit(pin);
        self.with(|claims| {
            claims.pins &= !bit;
            claims.never_reset_pins &= !bit;
        });
    }

    pub fn is_pin_claimed(&self, pin: u8) -> bool {
        let bit = pin_bit(pin);
        self.with(|claims| claims.pins & bit != 0)
    }

    pub fn never_reset_pin(&self, pin: u8) {
        let bit = pin_bit(pin);
        self.with(|claims| claims.never_reset_pins |= bit);
    }

    pub fn is_pin_never_reset(&self, pin: u8) -> bool {
        let bit = pin_bit(pin);
        self.with(|claims| claims.never_reset_pins & bit != 0)
    }

    pub fn claim_sercom(&self, index: u8) {
        let bit = sercom_bit(index);
        self.with(|claims| claims.sercoms |= bit);
    }

    /// Release SERCOM `index`, clearing any never-reset mark.
    pub fn release_sercom(&self, index: u8) {
        let bit = sercom_bit(index);
        self.with(|claims| {
            claims.sercoms &= !bit;
            claims.never_reset_sercoms &= !bit;
        });
    }

    pub fn is_sercom_claimed(&self, index: u8) -> bool {
        let bit = sercom_bit(index);
        self.with(|claims| claims.sercoms & bit != 0)
    }

    pub fn never_reset_sercom(&self, index: u8) {
        let bit = sercom_bit(index);
        self.with(|claims| claims.never_reset_sercoms |= bit);
    }

    pub fn is_sercom_never_reset(&self, index: u8) -> bool {
        let bit = sercom_bit(index);
        self.with(|claims| claims.never_reset_sercoms & bit != 0)
    }

    /// Release every claim not marked never-reset.
    ///
    /// The callbacks run after the claims are updated, outside the lock, so
    /// they may touch the hardware (and this tracker) freely.
    pub fn soft_reset(
        &self,
        mut release_pin: impl FnMut(u8),
        mut release_sercom: impl FnMut(u8),
    ) {
        let (pins, sercoms) = self.with(|claims| {
            let pins = claims.pins & !claims.never_reset_pins;
            let sercoms = claims.sercoms & !claims.never_reset_sercoms;
            claims.pins &= !pins;
            claims.sercoms &= !sercoms;
            (pins, sercoms)
        });

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "soft reset releases {=u32} pins, {=u32} sercoms",
            pins.count_ones(),
            sercoms.count_ones()
        );

        (0..MAX_TRACKED_PINS)
            .filter(|&pin| pins & pin_bit(pin) != 0)
            .for_each(&mut release_pin);
        (0..MAX_TRACKED_SERCOMS)
            .filter(|&index| sercoms & sercom_bit(index) != 0)
            .for_each(&mut release_sercom);
    }
}
