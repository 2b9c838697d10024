//! Receive endpoint
//!
//! Raw bytes from the transport land in a ring buffer; [`LinkRx::poll`]
//! drains them through the SLIP decoder into the message parser and reports
//! one event per call.

use watchdog_link_hal::ByteSource;
use watchdog_link_protocol::slip::{DecodedByte, Decoder};
use watchdog_link_protocol::{Message, Mpsm, Phase, ProcessStatus, RingBuffer, RingBufferError};

use crate::config::LinkConfig;
use crate::error::LinkError;
use crate::stats::{DropReason, LinkHealth, LinkStats};

/// Bytes pulled from the transport per read call
const RX_CHUNK_SIZE: usize = 32;

/// Outcome of a [`LinkRx::poll`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxEvent {
    /// No complete message yet (buffer drained or poll budget spent)
    Idle,
    /// A valid message is in the caller's [`Message`]
    Message,
    /// A frame was discarded; the caller's [`Message`] has been reset
    Dropped(DropReason),
}

/// Receive side of the link
///
/// Borrows the receive ring buffer for its whole life; the buffer itself is
/// created once at startup by the owner of the link.
pub struct LinkRx<'b, const N: usize> {
    buffer: &'b mut RingBuffer<N>,
    slip: Decoder,
    mpsm: Mpsm,
    stats: LinkStats,
    config: LinkConfig,
}

impl<'b, const N: usize> LinkRx<'b, N> {
    pub fn new(buffer: &'b mut RingBuffer<N>, config: LinkConfig) -> Self {
        Self {
            buffer,
            slip: Decoder::new(),
            mpsm: Mpsm::new(),
            stats: LinkStats::new(),
            config,
        }
    }

    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }

    pub fn health(&self) -> LinkHealth {
        self.stats.health(self.config.max_consecutive_drops)
    }

    /// Bytes waiting to be parsed
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Store one received byte, as done from the UART interrupt
    ///
    /// Uses the reserve/commit pair so the byte is only visible to the parser
    /// once fully written. A full buffer drops the byte and counts an overflow.
    pub fn receive_byte(&mut self, byte: u8) -> Result<(), RingBufferError> {
        let result = self.buffer.reserve_tail().map(|slot| *slot = byte);
        let result = result.and_then(|()| self.buffer.commit_tail());
        if let Err(_e) = result {
            self.stats.rx_overflows = self.stats.rx_overflows.saturating_add(1);
            #[cfg(feature = "defmt")]
            defmt::warn!("RX buffer overflow: {:?}", _e);
        }
        result
    }

    /// Pull whatever the transport has pending, up to the free buffer space
    ///
    /// Bytes that do not fit are left in the transport for the next call.
    pub fn fill_from<S: ByteSource>(&mut self, source: &mut S) -> Result<usize, LinkError<S::Error>> {
        let mut chunk = [0u8; RX_CHUNK_SIZE];
        let mut total = 0;

        while !self.buffer.is_full() {
            let want = self.buffer.free().min(RX_CHUNK_SIZE);
            let n = source
                .read_available(&mut chunk[..want])
                .map_err(LinkError::Transport)?;
            if n == 0 {
                break;
            }
            let stored = self.buffer.enqueue_slice(&chunk[..n]);
            debug_assert_eq!(stored, n);
            total += stored;
        }

        #[cfg(feature = "defmt")]
        if total > 0 {
            defmt::trace!("RX: {} bytes", total);
        }
        Ok(total)
    }

    /// Parse buffered bytes into `msg`
    ///
    /// Handles at most `max_bytes_per_poll` bytes. After a
    /// [`RxEvent::Message`], `msg` stays intact until the next call, which
    /// starts a fresh message. After any terminal parser status the rest of
    /// the current SLIP frame is skipped.
    pub fn poll(&mut self, msg: &mut Message<'_>) -> RxEvent {
        if let Phase::Done(_) = self.mpsm.phase() {
            self.restart(msg);
        }

        for _ in 0..self.config.max_bytes_per_poll {
            let Some(byte) = self.buffer.dequeue() else {
                break;
            };

            match self.slip.decode_byte(byte) {
                DecodedByte::Data(b) => match self.mpsm.process(msg, b) {
                    ProcessStatus::InProgress => {}
                    ProcessStatus::DoneValid => {
                        self.slip.discard_frame();
                        self.stats.record_received();
                        #[cfg(feature = "defmt")]
                        defmt::trace!(
                            "RX message: opcode={=u16:#x} seq={=u16} len={=u16}",
                            msg.header.lower_op_code,
                            msg.header.lower_seq_num,
                            msg.header.payload_length
                        );
                        return RxEvent::Message;
                    }
                    ProcessStatus::DoneBadParityHeader => {
                        self.slip.discard_frame();
                        return self.drop_frame(msg, DropReason::BadParityHeader);
                    }
                    ProcessStatus::DonePayloadTooLarge => {
                        self.slip.discard_frame();
                        return self.drop_frame(msg, DropReason::PayloadTooLarge);
                    }
                },
                DecodedByte::Pending | DecodedByte::Skipped => {}
                DecodedByte::EndOfFrame => {
                    if self.mpsm.is_mid_message() {
                        return self.drop_frame(msg, DropReason::TruncatedFrame);
                    }
                    // Inter-frame END or noise-only frame: restart magic search
                    self.mpsm.reset();
                }
                DecodedByte::Malformed => {
                    return self.drop_frame(msg, DropReason::MalformedEscape);
                }
            }
        }

        RxEvent::Idle
    }

    fn drop_frame(&mut self, msg: &mut Message<'_>, reason: DropReason) -> RxEvent {
        self.stats.record_drop(reason);
        #[cfg(feature = "defmt")]
        defmt::warn!("RX frame dropped: {:?}", reason);
        self.restart(msg);
        RxEvent::Dropped(reason)
    }

    fn restart(&mut self, msg: &mut Message<'_>) {
        self.mpsm.reset();
        msg.reset();
    }
}
