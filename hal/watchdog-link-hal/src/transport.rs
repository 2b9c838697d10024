//! Byte transport abstractions
//!
//! The link layer never touches UART or I2C registers. It pulls raw bytes from
//! a [`ByteSource`] and pushes encoded frames into a [`ByteSink`]; the
//! chip-specific driver behind them owns interrupts, DMA and clocking.

use embedded_io::{Read, ReadReady, Write};

/// Non-blocking source of received bytes
pub trait ByteSource {
    /// Error type for receive operations
    type Error;

    /// Number of bytes that can be read right now without blocking
    ///
    /// May under-report; it is a lower bound, not an exact count.
    fn bytes_available(&mut self) -> Result<usize, Self::Error>;

    /// Read a single byte, or `None` if nothing is pending
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error>;

    /// Read up to `buf.len()` pending bytes without blocking
    ///
    /// Returns the number of bytes written into `buf`, which may be zero.
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut n = 0;
        while n < buf.len() {
            match self.read_byte()? {
                Some(byte) => {
                    buf[n] = byte;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }
}

/// Sink for encoded bytes awaiting transmission
pub trait ByteSink {
    /// Error type for transmit operations
    type Error;

    /// Queue as much of `data` as the transport accepts right now
    ///
    /// Returns the number of bytes taken; a short count means the transport is
    /// busy and the rest should be offered again later.
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Adapter exposing an `embedded-io` peripheral as a byte source and sink
///
/// Works with any UART driver that implements the `embedded-io` blocking
/// traits. Reads are only attempted when [`ReadReady`] reports data, so they
/// never block.
#[derive(Debug)]
pub struct IoTransport<T> {
    inner: T,
}

impl<T> IoTransport<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Borrow the wrapped peripheral
    pub fn inner(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Return the wrapped peripheral
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Read + ReadReady> ByteSource for IoTransport<T> {
    type Error = T::Error;

    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        Ok(usize::from(self.inner.read_ready()?))
    }

    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        let mut buf = [0u8; 1];
        match self.read_available(&mut buf)? {
            0 => Ok(None),
            _ => Ok(Some(buf[0])),
        }
    }

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() || !self.inner.read_ready()? {
            return Ok(0);
        }
        self.inner.read(buf)
    }
}

impl<T: Write> ByteSink for IoTransport<T> {
    type Error = T::Error;

    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        if data.is_empty() {
            return Ok(0);
        }
        self.inner.write(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.inner.flush()
    }
}
