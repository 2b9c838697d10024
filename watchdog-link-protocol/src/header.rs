//! Message header and its packed wire layout.
//!
//! All multi-byte fields are little-endian:
//!
//! ```text
//! ┌──────────────┬────────┬─────────────┬─────────────┬─────────┬─────────┐
//! │ MAGIC        │ PARITY │ PAYLOAD LEN │ RESET VALUE │ SEQ LO  │ OPCODE  │
//! │ 4B           │ 1B     │ 2B          │ 2B          │ 2B      │ 2B      │
//! └──────────────┴────────┴─────────────┴─────────────┴─────────┴─────────┘
//! ```
//!
//! PARITY is the bitwise NOT of the wrapping 8-bit sum of every other header
//! byte, magic included.

/// Header synchronization word
pub const HEADER_MAGIC: u32 = 0x21B0_0B11;

/// Magic as it appears on the wire
pub const MAGIC_BYTES: [u8; MAGIC_SIZE] = HEADER_MAGIC.to_le_bytes();

/// Size of the magic field in bytes
pub const MAGIC_SIZE: usize = 4;

/// Size of a packed header on the wire, magic included
pub const HEADER_PACKED_SIZE: usize = 13;

const PARITY_OFFSET: usize = 4;

/// Errors from [`Header::from_bytes`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeaderError {
    /// First four bytes are not [`HEADER_MAGIC`]
    BadMagic,
    /// Stored parity does not match the other header bytes
    BadParity,
}

/// Parsed message header
///
/// The magic word is checked on parse but not kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Header {
    pub parity: u8,
    /// Number of payload bytes following the header
    pub payload_length: u16,
    pub reset_value: u16,
    /// Lower 16 bits of the sender's sequence number
    pub lower_seq_num: u16,
    /// Lower 16 bits of the opcode
    pub lower_op_code: u16,
}

impl Header {
    /// Build a header with a correct parity byte
    pub const fn new(
        payload_length: u16,
        reset_value: u16,
        lower_seq_num: u16,
        lower_op_code: u16,
    ) -> Self {
        let mut header = Self {
            parity: 0,
            payload_length,
            reset_value,
            lower_seq_num,
            lower_op_code,
        };
        header.parity = header.compute_parity();
        header
    }

    /// Parity this header should carry
    pub const fn compute_parity(&self) -> u8 {
        let bytes = self.to_bytes();
        let mut sum: u8 = 0;
        let mut i = 0;
        while i < HEADER_PACKED_SIZE {
            if i != PARITY_OFFSET {
                sum = sum.wrapping_add(bytes[i]);
            }
            i += 1;
        }
        !sum
    }

    /// Whether the stored parity matches the other fields
    pub const fn parity_is_valid(&self) -> bool {
        self.parity == self.compute_parity()
    }

    /// Recompute and store the parity byte
    pub fn seal(&mut self) {
        self.parity = self.compute_parity();
    }

    /// Pack into wire order, writing the stored parity as-is
    pub const fn to_bytes(&self) -> [u8; HEADER_PACKED_SIZE] {
        let len = self.payload_length.to_le_bytes();
        let reset = self.reset_value.to_le_bytes();
        let seq = self.lower_seq_num.to_le_bytes();
        let op = self.lower_op_code.to_le_bytes();
        [
            MAGIC_BYTES[0],
            MAGIC_BYTES[1],
            MAGIC_BYTES[2],
            MAGIC_BYTES[3],
            self.parity,
            len[0],
            len[1],
            reset[0],
            reset[1],
            seq[0],
            seq[1],
            op[0],
            op[1],
        ]
    }

    /// Unpack from wire order without checking magic or parity
    pub const fn from_bytes_unchecked(bytes: &[u8; HEADER_PACKED_SIZE]) -> Self {
        Self {
            parity: bytes[PARITY_OFFSET],
            payload_length: u16::from_le_bytes([bytes[5], bytes[6]]),
            reset_value: u16::from_le_bytes([bytes[7], bytes[8]]),
            lower_seq_num: u16::from_le_bytes([bytes[9], bytes[10]]),
            lower_op_code: u16::from_le_bytes([bytes[11], bytes[12]]),
        }
    }

    /// Unpack from wire order, validating magic and parity
    pub fn from_bytes(bytes: &[u8; HEADER_PACKED_SIZE]) -> Result<Self, HeaderError> {
        if bytes[..MAGIC_SIZE] != MAGIC_BYTES {
            return Err(HeaderError::BadMagic);
        }

        let header = Self::from_bytes_unchecked(bytes);
        if !header.parity_is_valid() {
            return Err(HeaderError::BadParity);
        }
        Ok(header)
    }
}
