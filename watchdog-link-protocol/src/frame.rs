//! Wire frame encoding.
//!
//! Frame format:
//! - END (optional, 1 byte): flushes any line noise before the frame
//! - HEADER (13 bytes before escaping): see [`crate::header`]
//! - PAYLOAD (`payload_length` bytes before escaping)
//! - END (1 byte): closes the frame
//!
//! Header and payload are SLIP-escaped as one continuous byte stream.

use heapless::Vec;

use crate::header::{Header, HEADER_PACKED_SIZE};
use crate::slip::{self, EncodeStatus, END};

/// Largest payload a header can describe
pub const MAX_PAYLOAD_SIZE: usize = u16::MAX as usize;

/// Errors that can occur during frame encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds what a 16-bit length field can describe
    PayloadTooLarge,
    /// Header `payload_length` disagrees with the payload slice
    LengthMismatch,
    /// Output buffer too small for the encoded frame
    BufferTooSmall,
}

/// Build a header for `payload` with a correct parity byte
pub fn header_for(
    payload: &[u8],
    reset_value: u16,
    lower_seq_num: u16,
    lower_op_code: u16,
) -> Result<Header, FrameError> {
    let len = u16::try_from(payload.len()).map_err(|_| FrameError::PayloadTooLarge)?;
    Ok(Header::new(len, reset_value, lower_seq_num, lower_op_code))
}

/// Exact number of wire bytes [`encode_frame`] will produce
pub fn encoded_len(header: &Header, payload: &[u8], leading_end: bool) -> usize {
    usize::from(leading_end) + slip::encoded_len(&header.to_bytes()) + slip::encoded_len(payload) + 1
}

/// Encode a complete frame into `buffer`
///
/// Returns the number of bytes written. Nothing is written when the buffer is
/// too small.
pub fn encode_frame(
    header: &Header,
    payload: &[u8],
    buffer: &mut [u8],
    leading_end: bool,
) -> Result<usize, FrameError> {
    if usize::from(header.payload_length) != payload.len() {
        return Err(FrameError::LengthMismatch);
    }
    if encoded_len(header, payload, leading_end) > buffer.len() {
        return Err(FrameError::BufferTooSmall);
    }

    let mut written = 0;
    if leading_end {
        buffer[0] = END;
        written = 1;
    }

    let header_bytes: [u8; HEADER_PACKED_SIZE] = header.to_bytes();
    let r = slip::encode(&header_bytes, &mut buffer[written..], false);
    written += r.produced;

    let r = slip::encode(payload, &mut buffer[written..], true);
    written += r.produced;
    debug_assert_eq!(r.status, EncodeStatus::InputFinished);

    Ok(written)
}

/// Encode a complete frame into a heapless Vec
pub fn encode_frame_to_vec<const M: usize>(
    header: &Header,
    payload: &[u8],
    leading_end: bool,
) -> Result<Vec<u8, M>, FrameError> {
    let mut vec = Vec::new();
    vec.resize(encoded_len(header, payload, leading_end), 0)
        .map_err(|_| FrameError::BufferTooSmall)?;
    let len = encode_frame(header, payload, &mut vec, leading_end)?;
    vec.truncate(len);
    Ok(vec)
}
