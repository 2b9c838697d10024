//! Link error type

use watchdog_link_protocol::FrameError;

/// Errors from link operations that touch the transport
///
/// `E` is the transport's own error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<E> {
    /// The byte source or sink failed
    Transport(E),
    /// Outgoing message could not be framed or queued
    Frame(FrameError),
}

impl<E> From<FrameError> for LinkError<E> {
    fn from(e: FrameError) -> Self {
        LinkError::Frame(e)
    }
}
