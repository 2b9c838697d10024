//! Receive and transmit endpoints

pub mod rx;
pub mod tx;

pub use rx::{LinkRx, RxEvent};
pub use tx::LinkTx;
