//! Path selection and chunking for bus transfers.
//!
//! Transfers of [`DMA_THRESHOLD`] bytes or more go through DMA, split into
//! chunks the engine accepts, yielding to other tasks between chunks.
//! Shorter transfers use the blocking descriptor I/O, where DMA setup would
//! cost more than it saves.

use embassy_futures::yield_now;

use crate::error::Error;
use crate::hal::{SercomSpi, Status};

/// Shortest transfer that goes through DMA.
pub const DMA_THRESHOLD: usize = 16;

fn check(status: Status) -> Result<(), Error> {
    if status >= 0 {
        Ok(())
    } else {
        #[cfg(feature = "defmt")]
        defmt::warn!("SPI transfer failed: {=i32}", status);
        Err(Error::Io)
    }
}

fn chunk_len<S: SercomSpi>() -> usize {
    S::MAX_DMA_CHUNK.max(1)
}

pub(crate) async fn write<S: SercomSpi>(
    sercom: &mut S,
    data: &[u8],
) -> Result<(), Error> {
    if data.is_empty() {
        return Ok(());
    }
    if data.len() < DMA_THRESHOLD {
        return check(sercom.io_write(data));
    }

    let mut chunks = data.chunks(chunk_len::<S>()).peekable();
    while let Some(chunk) = chunks.next() {
        check(sercom.dma_write(chunk))?;
        if chunks.peek().is_some() {
            // Multi-part transfer; let other things run before the next chunk.
            yield_now().await;
        }
    }
    Ok(())
}

pub(crate) async fn read<S: SercomSpi>(
    sercom: &mut S,
    data: &mut [u8],
    fill: u8,
) -> Result<(), Error> {
    if data.is_empty() {
        return Ok(());
    }
    if data.len() < DMA_THRESHOLD {
        sercom.set_dummy_byte(fill);
        return check(sercom.io_read(data));
    }

    let mut chunks = data.chunks_mut(chunk_len::<S>()).peekable();
    while let Some(chunk) = chunks.next() {
        check(sercom.dma_read(chunk, fill))?;
        if chunks.peek().is_some() {
            yield_now().await;
        }
    }
    Ok(())
}

/// Full-duplex transfer over the common length of `tx` and `rx`.
pub(crate) async fn transfer<S: SercomSpi>(
    sercom: &mut S,
    tx: &[u8],
    rx: &mut [u8],
) -> Result<(), Error> {
    let len = tx.len().min(rx.len());
    let (tx, rx) = (&tx[..len], &mut rx[..len]);
    if len == 0 {
        return Ok(());
    }
    if len < DMA_THRESHOLD {
        return check(sercom.sync_transfer(tx, rx));
    }

    let n = chunk_len::<S>();
    let mut chunks = tx.chunks(n).zip(rx.chunks_mut(n)).peekable();
    while let Some((out, into)) = chunks.next() {
        check(sercom.dma_transfer(out, into))?;
        if chunks.peek().is_some() {
            yield_now().await;
        }
    }
    Ok(())
}
