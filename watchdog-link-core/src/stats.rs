//! Link statistics and health tracking
//!
//! Counts delivered and dropped messages and decides when the link should be
//! reported as degraded. The application decides what a degraded link means
//! (retry, reset the companion, raise a fault).

/// Why a received frame never reached the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DropReason {
    /// Header parity did not match
    BadParityHeader,
    /// Header declared more payload than the message buffer holds
    PayloadTooLarge,
    /// SLIP escape followed by an invalid byte
    MalformedEscape,
    /// Frame ended before the declared header/payload was complete
    TruncatedFrame,
}

/// Link condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkHealth {
    /// Frames are getting through
    Ok,
    /// Too many consecutive drops; carries the most recent reason
    Degraded(DropReason),
}

/// Running link counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    /// Valid messages handed to the application
    pub messages_received: u32,
    /// Messages queued for transmission
    pub messages_sent: u32,
    pub parity_errors: u32,
    pub oversized_payloads: u32,
    pub malformed_frames: u32,
    pub truncated_frames: u32,
    /// Bytes lost because the receive buffer was full
    pub rx_overflows: u32,
    /// Messages refused because the transmit buffer was full
    pub tx_rejected: u32,
    consecutive_drops: u8,
    last_drop: Option<DropReason>,
}

impl LinkStats {
    pub const fn new() -> Self {
        Self {
            messages_received: 0,
            messages_sent: 0,
            parity_errors: 0,
            oversized_payloads: 0,
            malformed_frames: 0,
            truncated_frames: 0,
            rx_overflows: 0,
            tx_rejected: 0,
            consecutive_drops: 0,
            last_drop: None,
        }
    }

    /// Record a message delivered to the application
    pub fn record_received(&mut self) {
        self.messages_received = self.messages_received.saturating_add(1);
        self.consecutive_drops = 0;
    }

    /// Record a dropped frame
    pub fn record_drop(&mut self, reason: DropReason) {
        let counter = match reason {
            DropReason::BadParityHeader => &mut self.parity_errors,
            DropReason::PayloadTooLarge => &mut self.oversized_payloads,
            DropReason::MalformedEscape => &mut self.malformed_frames,
            DropReason::TruncatedFrame => &mut self.truncated_frames,
        };
        *counter = counter.saturating_add(1);
        self.consecutive_drops = self.consecutive_drops.saturating_add(1);
        self.last_drop = Some(reason);
    }

    /// Total frames dropped for any reason
    pub fn frames_dropped(&self) -> u32 {
        self.parity_errors
            .saturating_add(self.oversized_payloads)
            .saturating_add(self.malformed_frames)
            .saturating_add(self.truncated_frames)
    }

    /// Drops since the last delivered message
    pub fn consecutive_drops(&self) -> u8 {
        self.consecutive_drops
    }

    /// Check link health against a consecutive-drop threshold
    pub fn health(&self, max_consecutive_drops: u8) -> LinkHealth {
        match self.last_drop {
            Some(reason) if self.consecutive_drops >= max_consecutive_drops => {
                LinkHealth::Degraded(reason)
            }
            _ => LinkHealth::Ok,
        }
    }
}
