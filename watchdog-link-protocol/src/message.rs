//! Decoded message: header plus a borrowed payload buffer.

use crate::header::Header;

/// A message being assembled by the parser
///
/// The payload buffer belongs to the caller (stack or static storage) and is
/// reused across messages; [`Message::reset`] only clears the bookkeeping.
#[derive(Debug)]
pub struct Message<'a> {
    /// Header of the message; valid once the parser has seen all of it
    pub header: Header,
    data: &'a mut [u8],
    accumulated_data_size: usize,
}

impl<'a> Message<'a> {
    /// Wrap a caller-owned payload buffer
    pub fn new(data: &'a mut [u8]) -> Self {
        Self {
            header: Header::default(),
            data,
            accumulated_data_size: 0,
        }
    }

    /// Clear header and payload count, keeping the buffer
    pub fn reset(&mut self) {
        self.header = Header::default();
        self.accumulated_data_size = 0;
    }

    /// Largest payload this message can hold
    #[inline]
    pub fn data_capacity(&self) -> usize {
        self.data.len()
    }

    /// Payload bytes received so far
    #[inline]
    pub fn accumulated_data_size(&self) -> usize {
        self.accumulated_data_size
    }

    /// Payload received so far
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.accumulated_data_size]
    }

    /// Whole backing buffer, including bytes past the current payload
    pub fn buffer(&self) -> &[u8] {
        self.data
    }

    /// All declared payload bytes have arrived
    pub fn is_complete(&self) -> bool {
        self.accumulated_data_size == usize::from(self.header.payload_length)
    }

    /// Append one payload byte; refuses once the buffer or declared length is
    /// reached
    pub(crate) fn push_payload_byte(&mut self, byte: u8) -> bool {
        let limit = self.data.len().min(usize::from(self.header.payload_length));
        if self.accumulated_data_size >= limit {
            return false;
        }
        self.data[self.accumulated_data_size] = byte;
        self.accumulated_data_size += 1;
        true
    }
}
