use embedded_hal::spi::{Mode, Phase, Polarity};

use crate::config::{
    baud_divisor, divisor_frequency, Config, WordSize, DEFAULT_FREQUENCY,
};
use crate::error::Error;
use crate::hal::{Board, PortControl, SercomSpi};
use crate::lock::SpiLock;
use crate::pin::Pin;
use crate::resolver::{resolve, Request, RouteResolution, SignalRoute};
use crate::transfer;

/// An SPI master bus on one SERCOM.
///
/// A bus starts out unconstructed. [`construct`](Self::construct) finds a
/// free SERCOM for the pins, programs it for 250 kHz mode 0 and claims the
/// pins; [`deinit`](Self::deinit) gives everything back. Dropping a bus does
/// not deinitialize it, so a bus marked with
/// [`never_reset`](Self::never_reset) keeps running.
///
/// Construction and deinit must not race other calls on the same bus.
pub struct Spi<'b, B: Board> {
    board: &'b B,
    sercom: Option<B::Sercom>,
    /// `None` exactly when the bus is unconstructed.
    clock_pin: Option<u8>,
    mosi_pin: Option<u8>,
    miso_pin: Option<u8>,
    lock: SpiLock,
}

impl<'b, B: Board> Spi<'b, B> {
    /// Create an unconstructed bus.
    pub const fn new(board: &'b B) -> Self {
        Self {
            board,
            sercom: None,
            clock_pin: None,
            mosi_pin: None,
            miso_pin: None,
            lock: SpiLock::new(),
        }
    }

    /// Create a bus and construct it on the given pins.
    pub fn with_pins(
        board: &'b B,
        clock: &Pin,
        mosi: Option<&Pin>,
        miso: Option<&Pin>,
        half_duplex: bool,
    ) -> Result<Self, Error> {
        let mut spi = Self::new(board);
        spi.construct(clock, mosi, miso, half_duplex)?;
        Ok(spi)
    }

    /// Route the pins to a free SERCOM and bring the bus up.
    ///
    /// On error the bus is left unconstructed with nothing claimed.
    pub fn construct(
        &mut self,
        clock: &Pin,
        mosi: Option<&Pin>,
        miso: Option<&Pin>,
        half_duplex: bool,
    ) -> Result<(), Error> {
        // Ensure the bus starts in its deinit state.
        self.deinit();

        let request = Request { clock, mosi, miso, half_duplex };
        let resolution = resolve::<B::Pads, B>(
            self.board,
            B::SERCOM_COUNT,
            self.board.overrides(),
            &request,
        )?;
        // Overrides bypass the occupancy check, so ownership is checked
        // here before anything is touched.
        if self.board.resources().is_sercom_claimed(resolution.sercom) {
            return Err(Error::SercomInUse(resolution.sercom));
        }
        let sercom = self
            .board
            .sercom(resolution.sercom)
            .ok_or(Error::InvalidPins(request.pins()))?;

        self.claim_pins(&resolution)?;
        self.start(sercom, &resolution)
    }

    fn start(
        &mut self,
        mut sercom: B::Sercom,
        resolution: &RouteResolution,
    ) -> Result<(), Error> {
        if let Err(e) = Self::bring_up(&mut sercom, resolution) {
            let resources = self.board.resources();
            resolution
                .signals()
                .for_each(|signal| resources.release_pin(signal.pin));
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "SPI setup on SERCOM{=u8} failed: {}",
                resolution.sercom,
                e
            );
            return Err(e);
        }

        resolution.signals().for_each(|signal| self.setup_pin(&signal));
        self.board.resources().claim_sercom(resolution.sercom);
        self.clock_pin = Some(resolution.clock.pin);
        self.mosi_pin = resolution.mosi.map(|route| route.pin);
        self.miso_pin = resolution.miso.map(|route| route.pin);

        sercom.enable();
        self.sercom = Some(sercom);

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "SPI up on SERCOM{=u8}: {}",
            resolution.sercom,
            resolution
        );

        Ok(())
    }

    fn bring_up(
        sercom: &mut B::Sercom,
        resolution: &RouteResolution,
    ) -> Result<(), Error> {
        sercom.clock_init();
        sercom.init()?;

        // Pads must be set after init(), which loads the driver defaults.
        sercom.set_master_mode();
        sercom.set_dopo(resolution.dopo);
        sercom.set_dipo(resolution.dipo());

        // The driver only checks whether the SERCOM is busy, not the value.
        let baud = baud_divisor(B::REFERENCE_CLOCK_HZ, DEFAULT_FREQUENCY);
        if let Err(e) = sercom.set_baud(baud) {
            sercom.deinit();
            return Err(e.into());
        }
        Ok(())
    }

    /// Claim every pin in the tracker, giving back earlier claims if one is
    /// taken.
    fn claim_pins(&self, resolution: &RouteResolution) -> Result<(), Error> {
        let resources = self.board.resources();
        let mut claimed = heapless::Vec::<u8, 3>::new();
        for signal in resolution.signals() {
            if !resources.try_claim_pin(signal.pin) {
                claimed.iter().for_each(|&pin| resources.release_pin(pin));
                return Err(Error::PinInUse(signal.pin));
            }
            // At most three signals, so this cannot overflow.
            let _ = claimed.push(signal.pin);
        }
        Ok(())
    }

    fn setup_pin(&self, signal: &SignalRoute) {
        let port = self.board.port();
        port.set_direction_output(signal.pin);
        port.disable_pull(signal.pin);
        port.set_function(signal.pin, signal.function);
        port.set_strong_drive(signal.pin);
    }

    fn release_pin(&self, pin: u8) {
        self.board.port().reset_pin(pin);
        self.board.resources().release_pin(pin);
    }

    pub fn is_deinitialized(&self) -> bool {
        self.clock_pin.is_none()
    }

    /// Disable the SERCOM and release it and the pins. A held lock is left
    /// as it is.
    pub fn deinit(&mut self) {
        let Some(mut sercom) = self.sercom.take() else {
            return;
        };
        self.board.resources().release_sercom(sercom.index());

        sercom.disable();
        sercom.deinit();

        let pins =
            [self.clock_pin.take(), self.mosi_pin.take(), self.miso_pin.take()];
        for pin in pins.into_iter().flatten() {
            self.release_pin(pin);
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("SPI on SERCOM{=u8} deinitialized", sercom.index());
    }

    /// Keep the SERCOM and pins claimed across soft resets.
    pub fn never_reset(&self) -> Result<(), Error> {
        let sercom = self.sercom.as_ref().ok_or(Error::Deinitialized)?;
        let resources = self.board.resources();
        resources.never_reset_sercom(sercom.index());
        [self.clock_pin, self.mosi_pin, self.miso_pin]
            .into_iter()
            .flatten()
            .for_each(|pin| resources.never_reset_pin(pin));
        Ok(())
    }

    fn sercom(&self) -> Result<&B::Sercom, Error> {
        self.sercom.as_ref().ok_or(Error::Deinitialized)
    }

    fn sercom_mut(&mut self) -> Result<&mut B::Sercom, Error> {
        self.sercom.as_mut().ok_or(Error::Deinitialized)
    }

    /// Apply `config`.
    ///
    /// When the hardware already matches, nothing is written, so the clock
    /// line is not disturbed. Otherwise the SERCOM is briefly disabled: the
    /// fields are enable-protected.
    pub fn configure(&mut self, config: &Config) -> Result<(), Error> {
        let baud = baud_divisor(B::REFERENCE_CLOCK_HZ, config.frequency);
        let cpha = config.raw_phase();
        let cpol = config.raw_polarity();
        let chsize = config.word_size.chsize();

        let sercom = self.sercom_mut()?;
        if sercom.cpha() == cpha
            && sercom.cpol() == cpol
            && sercom.chsize() == chsize
            && sercom.baud() == baud
        {
            return Ok(());
        }

        sercom.disable();
        sercom.wait_for_sync();

        sercom.set_cpha(cpha);
        sercom.set_cpol(cpol);
        sercom.set_chsize(chsize);
        sercom.write_baud(baud);
        sercom.wait_for_sync();

        sercom.enable();
        sercom.wait_for_sync();

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "SPI reconfigured: baud {=u8}, cpol {=bool}, cpha {=bool}",
            baud,
            cpol,
            cpha
        );

        Ok(())
    }

    /// [`configure`](Self::configure) from raw values: polarity and phase
    /// as 0/1, word size in bits.
    pub fn reconfigure(
        &mut self,
        baudrate: u32,
        polarity: u8,
        phase: u8,
        bits: u8,
    ) -> Result<(), Error> {
        self.configure(&Config::from_raw(baudrate, polarity, phase, bits))
    }

    /// Actual SCK rate, derived from the programmed divisor.
    pub fn frequency(&self) -> Result<u32, Error> {
        let baud = self.sercom()?.baud();
        Ok(divisor_frequency(B::REFERENCE_CLOCK_HZ, baud))
    }

    pub fn phase(&self) -> Result<Phase, Error> {
        Ok(if self.sercom()?.cpha() {
            Phase::CaptureOnSecondTransition
        } else {
            Phase::CaptureOnFirstTransition
        })
    }

    pub fn polarity(&self) -> Result<Polarity, Error> {
        Ok(if self.sercom()?.cpol() {
            Polarity::IdleHigh
        } else {
            Polarity::IdleLow
        })
    }

    pub fn mode(&self) -> Result<Mode, Error> {
        Ok(Mode { polarity: self.polarity()?, phase: self.phase()? })
    }

    pub fn word_size(&self) -> Result<WordSize, Error> {
        Ok(WordSize::from_chsize(self.sercom()?.chsize()))
    }

    /// Index of the SERCOM in use, if constructed.
    pub fn sercom_index(&self) -> Option<u8> {
        self.sercom.as_ref().map(|sercom| sercom.index())
    }

    pub fn try_lock(&self) -> bool {
        if self.is_deinitialized() {
            return false;
        }
        self.lock.try_acquire()
    }

    pub fn has_lock(&self) -> bool {
        self.lock.is_held()
    }

    pub fn unlock(&self) {
        self.lock.release();
    }

    pub async fn write(&mut self, data: &[u8]) -> Result<(), Error> {
        if data.is_empty() {
            return Ok(());
        }
        transfer::write(self.sercom_mut()?, data).await
    }

    /// Read into `data`, clocking out `fill` for every byte.
    pub async fn read(
        &mut self,
        data: &mut [u8],
        fill: u8,
    ) -> Result<(), Error> {
        if data.is_empty() {
            return Ok(());
        }
        transfer::read(self.sercom_mut()?, data, fill).await
    }

    /// Full-duplex transfer of `min(tx.len(), rx.len())` bytes.
    pub async fn transfer(
        &mut self,
        tx: &[u8],
        rx: &mut [u8],
    ) -> Result<(), Error> {
        if tx.is_empty() || rx.is_empty() {
            return Ok(());
        }
        transfer::transfer(self.sercom_mut()?, tx, rx).await
    }
}

impl<B: Board> embedded_hal::spi::ErrorType for Spi<'_, B> {
    type Error = Error;
}

// The `SpiBus` trait represents exclusive ownership over the whole bus.
impl<B: Board> embedded_hal_async::spi::SpiBus for Spi<'_, B> {
    async fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        Spi::read(self, words, 0x00).await
    }

    async fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        Spi::write(self, words).await
    }

    async fn transfer(
        &mut self,
        read: &mut [u8],
        write: &[u8],
    ) -> Result<(), Self::Error> {
        let common = read.len().min(write.len());
        let (read_head, read_tail) = read.split_at_mut(common);
        let (write_head, write_tail) = write.split_at(common);

        Spi::transfer(self, write_head, read_head).await?;
        // At most one of the tails is non-empty.
        Spi::write(self, write_tail).await?;
        Spi::read(self, read_tail, 0x00).await
    }

    async fn transfer_in_place(
        &mut self,
        words: &mut [u8],
    ) -> Result<(), Self::Error> {
        let mut staging = [0u8; 64];
        for chunk in words.chunks_mut(staging.len()) {
            let out = &mut staging[..chunk.len()];
            out.copy_from_slice(chunk);
            Spi::transfer(self, out, chunk).await?;
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
