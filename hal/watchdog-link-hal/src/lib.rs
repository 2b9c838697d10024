//! Watchdog Link Hardware Abstraction Layer
//!
//! This crate defines the transport seam between the link layer and the
//! chip-specific serial drivers (UART, I2C). The link layer only sees bytes;
//! registers, interrupts and clocking stay behind these traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  watchdog-link-core (LinkRx / LinkTx)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  watchdog-link-hal (this crate - traits)│
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  UART / I2C driver (embedded-io, ...)   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`transport::ByteSource`] - non-blocking receive
//! - [`transport::ByteSink`] - transmit with short-write reporting
//! - [`transport::IoTransport`] - adapter for `embedded-io` peripherals

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod transport;

// Re-export key traits at crate root for convenience
pub use transport::{ByteSink, ByteSource, IoTransport};
