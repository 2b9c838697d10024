//! Transmit endpoint
//!
//! Outgoing messages are framed and SLIP-encoded straight into the transmit
//! ring buffer; [`LinkTx::drain_to`] hands queued bytes to the transport.

use watchdog_link_hal::ByteSink;
use watchdog_link_protocol::frame::{self, FrameError};
use watchdog_link_protocol::slip::{self, EncodeStatus, END};
use watchdog_link_protocol::{Header, RingBuffer};

use crate::config::LinkConfig;
use crate::error::LinkError;
use crate::stats::LinkStats;

/// Scratch size for encoding and draining
const TX_CHUNK_SIZE: usize = 32;

/// Transmit side of the link
pub struct LinkTx<'b, const N: usize> {
    buffer: &'b mut RingBuffer<N>,
    config: LinkConfig,
    stats: LinkStats,
    next_seq: u16,
}

impl<'b, const N: usize> LinkTx<'b, N> {
    pub fn new(buffer: &'b mut RingBuffer<N>, config: LinkConfig) -> Self {
        Self {
            buffer,
            config,
            stats: LinkStats::new(),
            next_seq: 0,
        }
    }

    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }

    /// Bytes waiting for the transport
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Sequence number the next queued message will carry
    pub fn next_seq(&self) -> u16 {
        self.next_seq
    }

    /// Frame a message and queue it for transmission
    ///
    /// The whole frame is queued or nothing is: when the buffer lacks room the
    /// call fails with [`FrameError::BufferTooSmall`] and can be retried after
    /// draining. Returns the sequence number used.
    pub fn queue(&mut self, lower_op_code: u16, reset_value: u16, payload: &[u8]) -> Result<u16, FrameError> {
        let seq = self.next_seq;
        let header = frame::header_for(payload, reset_value, seq, lower_op_code)?;
        self.enqueue_frame(&header, payload)?;
        self.next_seq = seq.wrapping_add(1);
        Ok(seq)
    }

    /// Queue an already-built header and payload unchanged
    ///
    /// Used for replies that must echo a sequence number; the sequence
    /// counter is not advanced.
    pub fn queue_header(&mut self, header: &Header, payload: &[u8]) -> Result<(), FrameError> {
        self.enqueue_frame(header, payload)
    }

    /// Write queued bytes to the transport
    ///
    /// Stops early when the sink takes fewer bytes than offered. Returns the
    /// number of bytes handed over.
    pub fn drain_to<S: ByteSink>(&mut self, sink: &mut S) -> Result<usize, LinkError<S::Error>> {
        let mut chunk = [0u8; TX_CHUNK_SIZE];
        let mut total = 0;

        loop {
            let n = self.buffer.peek_all_ordered(&mut chunk);
            if n == 0 {
                break;
            }
            let written = sink.write_bytes(&chunk[..n]).map_err(LinkError::Transport)?;
            self.buffer.consume(written);
            total += written;
            if written < n {
                break;
            }
        }

        if total > 0 {
            sink.flush().map_err(LinkError::Transport)?;
        }
        Ok(total)
    }

    /// Queue a message and push as much as possible to the transport
    pub fn send<S: ByteSink>(
        &mut self,
        sink: &mut S,
        lower_op_code: u16,
        reset_value: u16,
        payload: &[u8],
    ) -> Result<u16, LinkError<S::Error>> {
        let seq = self.queue(lower_op_code, reset_value, payload)?;
        self.drain_to(sink)?;
        Ok(seq)
    }

    fn enqueue_frame(&mut self, header: &Header, payload: &[u8]) -> Result<(), FrameError> {
        if usize::from(header.payload_length) != payload.len() {
            return Err(FrameError::LengthMismatch);
        }

        let needed = frame::encoded_len(header, payload, self.config.emit_leading_end);
        if needed > self.buffer.free() {
            self.stats.tx_rejected = self.stats.tx_rejected.saturating_add(1);
            #[cfg(feature = "defmt")]
            defmt::warn!("TX buffer full: need {} bytes, {} free", needed, self.buffer.free());
            return Err(FrameError::BufferTooSmall);
        }

        if self.config.emit_leading_end {
            self.push(&[END]);
        }
        self.encode_into_buffer(&header.to_bytes(), false);
        self.encode_into_buffer(payload, true);

        self.stats.messages_sent = self.stats.messages_sent.saturating_add(1);
        #[cfg(feature = "defmt")]
        defmt::trace!(
            "TX queued: opcode={=u16:#x} seq={=u16} wire={} bytes",
            header.lower_op_code,
            header.lower_seq_num,
            needed
        );
        Ok(())
    }

    fn encode_into_buffer(&mut self, mut input: &[u8], end_of_message: bool) {
        let mut scratch = [0u8; TX_CHUNK_SIZE];
        loop {
            let r = slip::encode(input, &mut scratch, end_of_message);
            self.push(&scratch[..r.produced]);
            input = &input[r.consumed..];
            if r.status == EncodeStatus::InputFinished {
                break;
            }
        }
    }

    fn push(&mut self, bytes: &[u8]) {
        // Space was reserved up front from the exact encoded length
        let stored = self.buffer.enqueue_slice(bytes);
        debug_assert_eq!(stored, bytes.len());
    }
}
