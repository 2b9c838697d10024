//! Message parsing state machine (MPSM)
//!
//! Consumes decoded bytes one at a time and assembles them into a
//! [`Message`]:
//!
//! ```text
//! SeekingMagic ──magic──▶ AccumulatingHeader ──parity ok──▶ HeaderValid
//!      ▲                        │                               │
//!      │ reset()                │ parity bad                    ▼
//!      │                        ▼                      AccumulatingPayload
//!      └──────────────── Done(status) ◀───── all payload bytes ──┘
//! ```
//!
//! A terminal state is sticky: every further byte is ignored and the same
//! status is reported again until [`Mpsm::reset`] is called.

use crate::header::{Header, HEADER_PACKED_SIZE, MAGIC_BYTES, MAGIC_SIZE};
use crate::message::Message;
use crate::ring_buffer::RingBuffer;

/// Result of feeding a byte to the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProcessStatus {
    /// More bytes are needed
    InProgress,
    /// Header and payload complete; the message is ready
    DoneValid,
    /// Header parity mismatch; the message is discarded
    DoneBadParityHeader,
    /// Header declares more payload than the message buffer holds
    DonePayloadTooLarge,
}

impl ProcessStatus {
    /// Parser has reached a terminal state
    pub const fn is_done(self) -> bool {
        !matches!(self, ProcessStatus::InProgress)
    }

    /// Terminal state that did not produce a message
    pub const fn is_error(self) -> bool {
        matches!(
            self,
            ProcessStatus::DoneBadParityHeader | ProcessStatus::DonePayloadTooLarge
        )
    }
}

/// Externally visible parser phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    SeekingMagic,
    AccumulatingHeader,
    /// Header accepted, no payload byte seen yet
    HeaderValid,
    AccumulatingPayload,
    Done(ProcessStatus),
}

/// Byte-at-a-time message parser
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Mpsm {
    phase: Phase,
    header_buf: [u8; HEADER_PACKED_SIZE],
    /// Magic bytes matched while seeking, then header bytes collected
    header_len: usize,
}

impl Default for Mpsm {
    fn default() -> Self {
        Self::new()
    }
}

impl Mpsm {
    pub const fn new() -> Self {
        Self {
            phase: Phase::SeekingMagic,
            header_buf: [0; HEADER_PACKED_SIZE],
            header_len: 0,
        }
    }

    /// Return to magic search, dropping any partial header
    pub fn reset(&mut self) {
        self.phase = Phase::SeekingMagic;
        self.header_len = 0;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Parser is partway through a header or payload
    pub fn is_mid_message(&self) -> bool {
        matches!(
            self.phase,
            Phase::AccumulatingHeader | Phase::HeaderValid | Phase::AccumulatingPayload
        )
    }

    /// Feed one byte
    pub fn process(&mut self, msg: &mut Message<'_>, byte: u8) -> ProcessStatus {
        match self.phase {
            Phase::SeekingMagic => {
                self.seek_magic(byte);
                ProcessStatus::InProgress
            }
            Phase::AccumulatingHeader => {
                self.header_buf[self.header_len] = byte;
                self.header_len += 1;
                if self.header_len < HEADER_PACKED_SIZE {
                    return ProcessStatus::InProgress;
                }
                self.finish_header(msg)
            }
            Phase::HeaderValid | Phase::AccumulatingPayload => {
                self.phase = Phase::AccumulatingPayload;
                // Capacity was checked against the declared length when the
                // header was accepted, so this cannot be refused
                let pushed = msg.push_payload_byte(byte);
                debug_assert!(pushed);
                if msg.is_complete() {
                    self.done(ProcessStatus::DoneValid)
                } else {
                    ProcessStatus::InProgress
                }
            }
            Phase::Done(status) => status,
        }
    }

    /// Feed bytes until the parser reaches a terminal state
    ///
    /// Returns the number of bytes consumed and the last status. Bytes after
    /// the one that completed the message are left unconsumed.
    pub fn process_bytes(&mut self, msg: &mut Message<'_>, bytes: &[u8]) -> (usize, ProcessStatus) {
        if let Phase::Done(status) = self.phase {
            return (0, status);
        }

        for (i, &byte) in bytes.iter().enumerate() {
            let status = self.process(msg, byte);
            if status.is_done() {
                return (i + 1, status);
            }
        }
        (bytes.len(), ProcessStatus::InProgress)
    }

    /// Drain `buffer` into the parser until it is empty or a terminal state
    /// is reached
    pub fn process_ring<const N: usize>(
        &mut self,
        msg: &mut Message<'_>,
        buffer: &mut RingBuffer<N>,
    ) -> ProcessStatus {
        if let Phase::Done(status) = self.phase {
            return status;
        }

        while let Some(byte) = buffer.dequeue() {
            let status = self.process(msg, byte);
            if status.is_done() {
                return status;
            }
        }
        ProcessStatus::InProgress
    }

    fn seek_magic(&mut self, byte: u8) {
        // Magic bytes are pairwise distinct, so after a mismatch the only
        // possible restart point is the first magic byte
        if byte == MAGIC_BYTES[self.header_len] {
            self.header_len += 1;
        } else if byte == MAGIC_BYTES[0] {
            self.header_len = 1;
        } else {
            self.header_len = 0;
        }

        if self.header_len == MAGIC_SIZE {
            self.header_buf[..MAGIC_SIZE].copy_from_slice(&MAGIC_BYTES);
            self.phase = Phase::AccumulatingHeader;
        }
    }

    fn finish_header(&mut self, msg: &mut Message<'_>) -> ProcessStatus {
        let header = Header::from_bytes_unchecked(&self.header_buf);
        if !header.parity_is_valid() {
            return self.done(ProcessStatus::DoneBadParityHeader);
        }
        if usize::from(header.payload_length) > msg.data_capacity() {
            return self.done(ProcessStatus::DonePayloadTooLarge);
        }

        msg.header = header;
        if header.payload_length == 0 {
            return self.done(ProcessStatus::DoneValid);
        }
        self.phase = Phase::HeaderValid;
        ProcessStatus::InProgress
    }

    fn done(&mut self, status: ProcessStatus) -> ProcessStatus {
        self.phase = Phase::Done(status);
        status
    }
}
