//! Board-agnostic link endpoints for the rover watchdog link
//!
//! This crate ties the protocol pieces to a byte transport:
//!
//! - Receive endpoint: transport → ring buffer → SLIP decoder → message parser
//! - Transmit endpoint: message → frame encoder → ring buffer → transport
//! - Link statistics and health tracking
//! - Link configuration and its postcard persistence
//!
//! ```text
//!  ByteSource ──► LinkRx ──► Message<'_> ──► application
//!                                               │
//!  ByteSink  ◄── LinkTx ◄───────────────────────┘
//! ```
//!
//! Both endpoints borrow ring buffers owned by the caller, so the whole link
//! runs without allocation.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod link;
pub mod stats;

pub use config::{ConfigError, LinkConfig, CONFIG_VERSION};
pub use error::LinkError;
pub use link::{LinkRx, LinkTx, RxEvent};
pub use stats::{DropReason, LinkHealth, LinkStats};
