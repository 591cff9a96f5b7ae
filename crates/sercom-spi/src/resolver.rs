//! Pin-to-SERCOM route resolution.
//!
//! Given a clock pin and optional data-out (MOSI) and data-in (MISO) pins,
//! find one free SERCOM that all of them can reach. The search is first-fit:
//! clock routes are tried in pin-table order and the first SERCOM on which
//! every requested signal has a usable pad wins.

use crate::error::{Error, PinTriple};
use crate::hal::Occupancy;
use crate::pads::{Dopo, PadGeometry};
use crate::pin::{pin_number, MuxFunction, Pad, PadRoute, Pin};

/// Pins requested for one bus.
#[derive(Debug, Clone, Copy)]
pub struct Request<'p> {
    pub clock: &'p Pin,
    pub mosi: Option<&'p Pin>,
    pub miso: Option<&'p Pin>,
    pub half_duplex: bool,
}

impl Request<'_> {
    pub fn pins(&self) -> PinTriple {
        PinTriple {
            clock: self.clock.number,
            mosi: self.mosi.map(|pin| pin.number),
            miso: self.miso.map(|pin| pin.number),
        }
    }
}

/// How a single signal reaches the chosen SERCOM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SignalRoute {
    pub pin: u8,
    pub pad: Pad,
    pub function: MuxFunction,
}

impl SignalRoute {
    fn new(pin: u8, route: &PadRoute) -> Self {
        Self { pin, pad: route.pad, function: route.function }
    }
}

/// A SERCOM and the routing for every requested signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RouteResolution {
    pub sercom: u8,
    pub clock: SignalRoute,
    pub mosi: Option<SignalRoute>,
    pub miso: Option<SignalRoute>,
    pub dopo: Dopo,
}

impl RouteResolution {
    /// Data-in pad selector (CTRLA.DIPO). Pad 0 when there is no MISO.
    pub fn dipo(&self) -> Pad {
        self.miso.map_or(Pad::Pad0, |route| route.pad)
    }

    /// The signals that need a pin, clock first.
    pub fn signals(&self) -> impl Iterator<Item = SignalRoute> {
        core::iter::once(self.clock).chain(self.mosi).chain(self.miso)
    }
}

/// A fixed routing for one exact clock/MOSI/MISO pin triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardOverride {
    pub clock: u8,
    pub mosi: u8,
    pub miso: u8,
    pub sercom: u8,
    pub function: MuxFunction,
    pub clock_pad: Pad,
    pub mosi_pad: Pad,
    pub miso_pad: Pad,
}

/// Feather Radiofruit Zigbee (SAMR21): the radio SPI on SERCOM4 through
/// mux F, which no pin table lists.
pub const FEATHER_RADIOFRUIT_ZIGBEE: BoardOverride = BoardOverride {
    clock: pin_number(2, 18),
    mosi: pin_number(1, 30),
    miso: pin_number(2, 19),
    sercom: 4,
    function: MuxFunction::F,
    clock_pad: Pad::Pad3,
    mosi_pad: Pad::Pad2,
    miso_pad: Pad::Pad0,
};

/// Result of the override step that precedes the general search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideLookup {
    Matched(RouteResolution),
    FallThrough,
}

/// Look the exact pin triple up in the board override table.
pub fn lookup_override<G: PadGeometry>(
    overrides: &[BoardOverride],
    request: &Request<'_>,
) -> OverrideLookup {
    let (Some(mosi), Some(miso)) = (request.mosi, request.miso) else {
        return OverrideLookup::FallThrough;
    };

    let entry = overrides.iter().find(|entry| {
        entry.clock == request.clock.number
            && entry.mosi == mosi.number
            && entry.miso == miso.number
    });
    let Some(entry) = entry else {
        return OverrideLookup::FallThrough;
    };
    let Some(dopo) = G::dopo(entry.clock_pad, entry.mosi_pad) else {
        return OverrideLookup::FallThrough;
    };

    let route = |pin, pad| SignalRoute { pin, pad, function: entry.function };
    OverrideLookup::Matched(RouteResolution {
        sercom: entry.sercom,
        clock: route(entry.clock, entry.clock_pad),
        mosi: Some(route(entry.mosi, entry.mosi_pad)),
        miso: Some(route(entry.miso, entry.miso_pad)),
        dopo,
    })
}

/// Find a SERCOM and pad routing for `request`.
///
/// Nothing is claimed here; the caller programs the hardware from the
/// returned resolution.
pub fn resolve<G: PadGeometry, O: Occupancy + ?Sized>(
    occupancy: &O,
    sercom_count: u8,
    overrides: &[BoardOverride],
    request: &Request<'_>,
) -> Result<RouteResolution, Error> {
    if request.half_duplex {
        return Err(Error::HalfDuplexUnsupported);
    }

    if let OverrideLookup::Matched(resolution) =
        lookup_override::<G>(overrides, request)
    {
        return Ok(resolution);
    }

    for clock_route in request.clock.routes {
        let sercom = clock_route.sercom;
        if sercom >= sercom_count || occupancy.is_active(sercom) {
            continue;
        }
        if !G::valid_clock_pad(clock_route.pad) {
            continue;
        }

        // MOSI first: its pad decides DOPO, which only takes a few values.
        let (mosi, dopo) = match request.mosi {
            Some(pin) => {
                let found = pin.routes_to(sercom).find_map(|route| {
                    G::dopo(clock_route.pad, route.pad)
                        .map(|dopo| (SignalRoute::new(pin.number, route), dopo))
                });
                match found {
                    Some((route, dopo)) => (Some(route), dopo),
                    None => continue,
                }
            }
            None => match G::clock_only_dopo(clock_route.pad) {
                Some(dopo) => (None, dopo),
                None => continue,
            },
        };

        // DIPO is independent of the other two pads.
        let miso = match request.miso {
            Some(pin) => match pin.routes_to(sercom).next() {
                Some(route) => Some(SignalRoute::new(pin.number, route)),
                None => continue,
            },
            None => None,
        };

        return Ok(RouteResolution {
            sercom,
            clock: SignalRoute::new(request.clock.number, clock_route),
            mosi,
            miso,
            dopo,
        });
    }

    #[cfg(feature = "defmt")]
    defmt::debug!("no SERCOM route for {:?}", request.pins());

    Err(Error::InvalidPins(request.pins()))
}
