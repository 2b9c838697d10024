//! Rover Watchdog Link Protocol
//!
//! Framing and parsing for the serial link between the watchdog
//! microcontroller and the companion processor. Messages are length-prefixed,
//! carry a parity-checked header, and are delimited on the wire with SLIP
//! byte stuffing.
//!
//! # Wire Format
//!
//! ```text
//! ┌─────┬──────────────────────────────────────────────┬─────┐
//! │ END │ SLIP-escaped( HEADER 13B │ PAYLOAD 0–65535B ) │ END │
//! └─────┴──────────────────────────────────────────────┴─────┘
//! ```
//!
//! The leading END is optional. See [`header`] for the header layout.
//!
//! # Components
//!
//! - [`RingBuffer`] - fixed-capacity byte queue for both link directions
//! - [`slip`] - escaping/unescaping with explicit output-full signaling
//! - [`Mpsm`] - incremental header/payload parser filling a [`Message`]
//! - [`frame`] - whole-frame encoder for outgoing messages
//!
//! Nothing in this crate allocates, blocks, or panics on malformed input.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod frame;
pub mod header;
pub mod message;
pub mod mpsm;
pub mod ring_buffer;
pub mod slip;

pub use frame::{encode_frame, encode_frame_to_vec, FrameError};
pub use header::{Header, HeaderError, HEADER_MAGIC, HEADER_PACKED_SIZE};
pub use message::Message;
pub use mpsm::{Mpsm, Phase, ProcessStatus};
pub use ring_buffer::{RingBuffer, RingBufferError};
