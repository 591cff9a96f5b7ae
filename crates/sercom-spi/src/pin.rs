//! Pin capability data: which SERCOM pads a physical pin can be muxed onto.

/// A SERCOM pad slot.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pad {
    Pad0 = 0,
    Pad1 = 1,
    Pad2 = 2,
    Pad3 = 3,
}

impl Pad {
    pub const ALL: [Pad; 4] = [Pad::Pad0, Pad::Pad1, Pad::Pad2, Pad::Pad3];

    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Peripheral multiplexer function (the PMUX value written for a pin).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MuxFunction {
    A = 0,
    B = 1,
    /// SERCOM.
    C = 2,
    /// SERCOM-ALT.
    D = 3,
    E = 4,
    F = 5,
    G = 6,
    H = 7,
    I = 8,
    J = 9,
    K = 10,
    L = 11,
    M = 12,
    N = 13,
}

/// One way a pin can reach a SERCOM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PadRoute {
    /// SERCOM instance index. Indices at or above the board's instance
    /// count mark an unused slot.
    pub sercom: u8,
    pub pad: Pad,
    pub function: MuxFunction,
}

impl PadRoute {
    pub const fn new(sercom: u8, pad: Pad, function: MuxFunction) -> Self {
        Self { sercom, pad, function }
    }
}

/// A physical pin and its ordered SERCOM routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pin {
    pub number: u8,
    pub routes: &'static [PadRoute],
}

impl Pin {
    pub const fn new(number: u8, routes: &'static [PadRoute]) -> Self {
        Self { number, routes }
    }

    /// Routes from this pin onto the given SERCOM, in table order.
    pub fn routes_to(
        &self,
        sercom: u8,
    ) -> impl Iterator<Item = &'static PadRoute> {
        self.routes.iter().filter(move |route| route.sercom == sercom)
    }
}

/// Build a pin number from a port group and a pin within the group,
/// e.g. `pin_number(2, 18)` for PC18.
pub const fn pin_number(group: u8, pin: u8) -> u8 {
    group * 32 + pin
}
