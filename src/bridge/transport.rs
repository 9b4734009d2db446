//! Transport abstraction — any byte-oriented channel.
//!
//! Concrete implementations:
//! - UART driver (serial console to the admin host, AS608 sensor link)
//! - in-memory loopbacks in tests
//!
//! Both the enrollment bridge and the AS608 driver are generic over
//! `Transport`.

/// Byte-oriented transport channel.
pub trait Transport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Read up to `buf.len()` bytes into `buf`.
    /// Returns the number of bytes actually read; 0 if nothing is pending
    /// (non-blocking).
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write `data` to the transport.
    /// Returns the number of bytes actually written.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Write all of `data`, retrying short writes.
pub fn write_all<T: Transport>(transport: &mut T, mut data: &[u8]) -> Result<(), T::Error> {
    while !data.is_empty() {
        let n = transport.write(data)?;
        if n == 0 {
            break;
        }
        data = &data[n.min(data.len())..];
    }
    transport.flush()
}

/// A null transport that discards all writes and never reads.
/// Stands in for the console when no admin host is attached.
pub struct NullTransport;

impl Transport for NullTransport {
    type Error = ();

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, ()> {
        Ok(0)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, ()> {
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }
}
