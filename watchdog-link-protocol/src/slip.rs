//! SLIP byte stuffing (RFC 1055 framing tokens).
//!
//! Frames on the wire are delimited by [`END`]. Payload bytes equal to `END`
//! or [`ESC`] are replaced by two-byte escape sequences:
//!
//! ```text
//! END (0xC0) -> ESC ESC_END (0xDB 0xDC)
//! ESC (0xDB) -> ESC ESC_ESC (0xDB 0xDD)
//! ```
//!
//! Both directions work on caller-provided slices and report how far they got,
//! so a frame can be produced or consumed across several calls.

/// Frame delimiter
pub const END: u8 = 0xC0;

/// Escape marker
pub const ESC: u8 = 0xDB;

/// Escaped substitute for `END`
pub const ESC_END: u8 = 0xDC;

/// Escaped substitute for `ESC`
pub const ESC_ESC: u8 = 0xDD;

/// Outcome of an [`encode`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeStatus {
    /// Every input byte was consumed (and the END written, if requested)
    InputFinished,
    /// Output ran out of room; drain it and call again with the rest
    OutputFull,
}

/// Progress report from [`encode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncodeResult {
    /// Input bytes consumed
    pub consumed: usize,
    /// Output bytes written
    pub produced: usize,
    pub status: EncodeStatus,
}

/// Number of wire bytes `input` occupies once escaped (without delimiters)
pub fn encoded_len(input: &[u8]) -> usize {
    input
        .iter()
        .map(|&b| if b == END || b == ESC { 2 } else { 1 })
        .sum()
}

/// Escape `input` into `output`
///
/// When `end_of_message` is set, a trailing [`END`] is written once all of
/// `input` has been consumed. An escape pair is never split: if the next
/// byte's encoded form does not fit, encoding stops with
/// [`EncodeStatus::OutputFull`] before it. The same is true for the trailing
/// `END`, so the caller retries with the remaining (possibly empty) input.
pub fn encode(input: &[u8], output: &mut [u8], end_of_message: bool) -> EncodeResult {
    let mut consumed = 0;
    let mut produced = 0;

    for &byte in input {
        let escaped = match byte {
            END => Some(ESC_END),
            ESC => Some(ESC_ESC),
            _ => None,
        };
        let needed = if escaped.is_some() { 2 } else { 1 };
        if output.len() - produced < needed {
            return EncodeResult {
                consumed,
                produced,
                status: EncodeStatus::OutputFull,
            };
        }

        match escaped {
            Some(sub) => {
                output[produced] = ESC;
                output[produced + 1] = sub;
            }
            None => output[produced] = byte,
        }
        produced += needed;
        consumed += 1;
    }

    if end_of_message {
        if produced == output.len() {
            return EncodeResult {
                consumed,
                produced,
                status: EncodeStatus::OutputFull,
            };
        }
        output[produced] = END;
        produced += 1;
    }

    EncodeResult {
        consumed,
        produced,
        status: EncodeStatus::InputFinished,
    }
}

/// Outcome of a decode call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeStatus {
    /// An unescaped END was consumed; the output holds one whole frame
    FrameComplete,
    /// Input ran out before the frame ended
    InputExhausted,
    /// Output has no room for the next decoded byte
    OutputFull,
    /// ESC followed by an invalid byte; the partial frame must be discarded
    Malformed,
}

/// Progress report from a decode call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecodeResult {
    /// Input bytes consumed
    pub consumed: usize,
    /// Output bytes written
    pub produced: usize,
    pub status: DecodeStatus,
}

/// Result of feeding one wire byte to a [`Decoder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodedByte {
    /// A payload byte
    Data(u8),
    /// ESC received, waiting for its partner
    Pending,
    /// Byte dropped while resynchronizing after a malformed frame
    Skipped,
    /// Unescaped END: the current frame is over
    EndOfFrame,
    /// Bad escape sequence; the decoder now discards until the next END
    Malformed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum DecodeState {
    #[default]
    Normal,
    Escaped,
    Discarding,
}

/// Streaming SLIP decoder
///
/// Holds the only state that has to survive between chunks: whether the last
/// byte seen was an ESC, and whether the current frame is being discarded.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Decoder {
    state: DecodeState,
}

impl Decoder {
    pub const fn new() -> Self {
        Self {
            state: DecodeState::Normal,
        }
    }

    /// Forget any pending escape or discard state
    pub fn reset(&mut self) {
        self.state = DecodeState::Normal;
    }

    /// Skip the rest of the current frame, up to and including the next END
    pub fn discard_frame(&mut self) {
        self.state = DecodeState::Discarding;
    }

    /// True when an ESC has been consumed but its partner has not arrived
    pub fn is_mid_escape(&self) -> bool {
        self.state == DecodeState::Escaped
    }

    /// True while skipping a malformed or abandoned frame
    pub fn is_discarding(&self) -> bool {
        self.state == DecodeState::Discarding
    }

    /// Feed one wire byte
    pub fn decode_byte(&mut self, byte: u8) -> DecodedByte {
        match (self.state, byte) {
            (_, END) => {
                // END always closes the frame, even right after ESC
                let was_escaped = self.state == DecodeState::Escaped;
                self.state = DecodeState::Normal;
                if was_escaped {
                    DecodedByte::Malformed
                } else {
                    DecodedByte::EndOfFrame
                }
            }
            (DecodeState::Discarding, _) => DecodedByte::Skipped,
            (DecodeState::Normal, ESC) => {
                self.state = DecodeState::Escaped;
                DecodedByte::Pending
            }
            (DecodeState::Normal, b) => DecodedByte::Data(b),
            (DecodeState::Escaped, ESC_END) => {
                self.state = DecodeState::Normal;
                DecodedByte::Data(END)
            }
            (DecodeState::Escaped, ESC_ESC) => {
                self.state = DecodeState::Normal;
                DecodedByte::Data(ESC)
            }
            (DecodeState::Escaped, _) => {
                self.state = DecodeState::Discarding;
                DecodedByte::Malformed
            }
        }
    }

    fn yields_data(&self, byte: u8) -> bool {
        match self.state {
            DecodeState::Normal => byte != END && byte != ESC,
            DecodeState::Escaped => byte == ESC_END || byte == ESC_ESC,
            DecodeState::Discarding => false,
        }
    }

    /// Decode wire bytes from `input` into `output`, stopping after one frame
    ///
    /// A trailing ESC is consumed and remembered, so the next call continues
    /// the escape sequence. On [`DecodeStatus::Malformed`] the bytes written
    /// so far belong to a broken frame and must be dropped.
    pub fn decode(&mut self, input: &[u8], output: &mut [u8]) -> DecodeResult {
        let mut consumed = 0;
        let mut produced = 0;

        for &byte in input {
            if produced == output.len() && self.yields_data(byte) {
                return DecodeResult {
                    consumed,
                    produced,
                    status: DecodeStatus::OutputFull,
                };
            }
            consumed += 1;

            match self.decode_byte(byte) {
                DecodedByte::Data(b) => {
                    output[produced] = b;
                    produced += 1;
                }
                DecodedByte::Pending | DecodedByte::Skipped => {}
                DecodedByte::EndOfFrame => {
                    return DecodeResult {
                        consumed,
                        produced,
                        status: DecodeStatus::FrameComplete,
                    };
                }
                DecodedByte::Malformed => {
                    return DecodeResult {
                        consumed,
                        produced,
                        status: DecodeStatus::Malformed,
                    };
                }
            }
        }

        DecodeResult {
            consumed,
            produced,
            status: DecodeStatus::InputExhausted,
        }
    }
}

/// Decode a single frame from `input` without carrying state
///
/// A dangling ESC is left unconsumed (`consumed` stops before it), whether
/// decoding stopped for lack of input or lack of output, so the caller can
/// present it again together with its partner byte.
pub fn decode(input: &[u8], output: &mut [u8]) -> DecodeResult {
    let mut decoder = Decoder::new();
    let mut result = decoder.decode(input, output);
    if decoder.is_mid_escape() {
        result.consumed -= 1;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_escapes_special_bytes() {
        let input = [0x01, END, 0x02, ESC, 0x03];
        let mut out = [0u8; 16];
        let r = encode(&input, &mut out, true);

        assert_eq!(r.status, EncodeStatus::InputFinished);
        assert_eq!(r.consumed, 5);
        assert_eq!(
            &out[..r.produced],
            &[0x01, 0xDB, 0xDC, 0x02, 0xDB, 0xDD, 0x03, 0xC0]
        );

        let mut decoded = [0u8; 16];
        let d = decode(&out[..r.produced], &mut decoded);
        assert_eq!(d.status, DecodeStatus::FrameComplete);
        assert_eq!(d.consumed, r.produced);
        assert_eq!(&decoded[..d.produced], &input);
    }

    #[test]
    fn test_encode_without_end() {
        let mut out = [0u8; 8];
        let r = encode(&[1, 2, 3], &mut out, false);
        assert_eq!(r.status, EncodeStatus::InputFinished);
        assert_eq!(&out[..r.produced], &[1, 2, 3]);
    }

    #[test]
    fn test_encode_never_splits_escape_pair() {
        let mut out = [0u8; 2];
        let r = encode(&[0x01, END], &mut out, true);
        assert_eq!(r.status, EncodeStatus::OutputFull);
        assert_eq!(r.consumed, 1);
        assert_eq!(r.produced, 1);
        assert_eq!(out[0], 0x01);
    }

    #[test]
    fn test_encode_trailing_end_needs_room() {
        let mut out = [0u8; 2];
        let r = encode(&[0x01, 0x02], &mut out, true);
        assert_eq!(r.status, EncodeStatus::OutputFull);
        assert_eq!(r.consumed, 2);
        assert_eq!(r.produced, 2);

        // Retry with the (now empty) remainder emits just the END
        let mut out2 = [0u8; 1];
        let r2 = encode(&[], &mut out2, true);
        assert_eq!(r2.status, EncodeStatus::InputFinished);
        assert_eq!(out2, [END]);
    }

    #[test]
    fn test_encoded_len() {
        assert_eq!(encoded_len(&[]), 0);
        assert_eq!(encoded_len(&[0x01, END, ESC, 0x02]), 6);
    }

    #[test]
    fn test_decode_stops_at_end() {
        let wire = [0x01, 0x02, END, 0x03, END];
        let mut out = [0u8; 8];
        let r = decode(&wire, &mut out);
        assert_eq!(r.status, DecodeStatus::FrameComplete);
        assert_eq!(r.consumed, 3);
        assert_eq!(&out[..r.produced], &[0x01, 0x02]);
    }

    #[test]
    fn test_decode_leading_end_is_empty_frame() {
        let mut out = [0u8; 4];
        let r = decode(&[END, 0x05], &mut out);
        assert_eq!(r.status, DecodeStatus::FrameComplete);
        assert_eq!(r.consumed, 1);
        assert_eq!(r.produced, 0);
    }

    #[test]
    fn test_stateless_decode_leaves_dangling_escape() {
        let mut out = [0u8; 4];
        let r = decode(&[0x01, ESC], &mut out);
        assert_eq!(r.status, DecodeStatus::InputExhausted);
        assert_eq!(r.consumed, 1);
        assert_eq!(&out[..r.produced], &[0x01]);

        let r = decode(&[ESC, ESC_END, END], &mut out);
        assert_eq!(r.status, DecodeStatus::FrameComplete);
        assert_eq!(&out[..r.produced], &[END]);
    }

    #[test]
    fn test_stateless_decode_output_full_after_escape() {
        let wire = [0x01, 0x02, ESC, ESC_END, END];
        let mut out = [0u8; 2];
        let r = decode(&wire, &mut out);
        assert_eq!(r.status, DecodeStatus::OutputFull);
        assert_eq!(r.consumed, 2);
        assert_eq!(out, [0x01, 0x02]);

        let r = decode(&wire[r.consumed..], &mut out);
        assert_eq!(r.status, DecodeStatus::FrameComplete);
        assert_eq!(&out[..r.produced], &[END]);
    }

    #[test]
    fn test_decoder_carries_escape_across_calls() {
        let mut decoder = Decoder::new();
        let mut out = [0u8; 4];

        let r = decoder.decode(&[0x01, ESC], &mut out);
        assert_eq!(r.status, DecodeStatus::InputExhausted);
        assert_eq!(r.consumed, 2);
        assert!(decoder.is_mid_escape());

        let r = decoder.decode(&[ESC_ESC, END], &mut out[1..]);
        assert_eq!(r.status, DecodeStatus::FrameComplete);
        assert_eq!(&out[..2], &[0x01, ESC]);
    }

    #[test]
    fn test_end_after_escape_terminates_frame() {
        let mut decoder = Decoder::new();
        let mut out = [0u8; 4];
        let r = decoder.decode(&[0x01, ESC, END, 0x02], &mut out);
        assert_eq!(r.status, DecodeStatus::Malformed);
        assert_eq!(r.consumed, 3);
        // Resynchronized at the END: the next byte starts a fresh frame
        assert!(!decoder.is_discarding());
        assert_eq!(decoder.decode_byte(0x02), DecodedByte::Data(0x02));
    }

    #[test]
    fn test_bad_escape_discards_until_end() {
        let mut decoder = Decoder::new();
        let mut out = [0u8; 8];
        let r = decoder.decode(&[0x01, ESC, 0x55, 0x02, 0x03, END, 0x04, END], &mut out);
        assert_eq!(r.status, DecodeStatus::Malformed);
        assert_eq!(r.consumed, 3);
        assert!(decoder.is_discarding());

        let r = decoder.decode(&[0x02, 0x03, END], &mut out);
        assert_eq!(r.status, DecodeStatus::FrameComplete);
        assert_eq!(r.produced, 0);

        let r = decoder.decode(&[0x04, END], &mut out);
        assert_eq!(r.status, DecodeStatus::FrameComplete);
        assert_eq!(&out[..r.produced], &[0x04]);
    }

    #[test]
    fn test_decode_output_full() {
        let mut decoder = Decoder::new();
        let mut out = [0u8; 2];
        let r = decoder.decode(&[1, 2, 3, END], &mut out);
        assert_eq!(r.status, DecodeStatus::OutputFull);
        assert_eq!(r.consumed, 2);

        // ESC does not need output room; its partner does
        let mut decoder = Decoder::new();
        let r = decoder.decode(&[1, 2, ESC, ESC_END], &mut out);
        assert_eq!(r.status, DecodeStatus::OutputFull);
        assert_eq!(r.consumed, 3);
        assert!(decoder.is_mid_escape());
    }

    #[test]
    fn test_decode_end_fits_in_full_output() {
        let mut out = [0u8; 2];
        let r = decode(&[1, 2, END], &mut out);
        assert_eq!(r.status, DecodeStatus::FrameComplete);
        assert_eq!(r.consumed, 3);
    }

    proptest! {
        #[test]
        fn prop_roundtrip(data in prop::collection::vec(any::<u8>(), 0..256)) {
            let mut wire = [0u8; 513];
            let e = encode(&data, &mut wire, true);
            prop_assert_eq!(e.status, EncodeStatus::InputFinished);
            prop_assert_eq!(e.produced, encoded_len(&data) + 1);

            let mut out = [0u8; 256];
            let d = decode(&wire[..e.produced], &mut out);
            prop_assert_eq!(d.status, DecodeStatus::FrameComplete);
            prop_assert_eq!(d.consumed, e.produced);
            prop_assert_eq!(&out[..d.produced], &data[..]);
        }

        #[test]
        fn prop_chunked_encode_matches_single_pass(
            data in prop::collection::vec(any::<u8>(), 0..128),
            chunk in 2usize..8,
        ) {
            let mut single = [0u8; 257];
            let s = encode(&data, &mut single, true);

            let mut wire = [0u8; 257];
            let mut produced = 0;
            let mut consumed = 0;
            loop {
                let end = (produced + chunk).min(wire.len());
                let r = encode(&data[consumed..], &mut wire[produced..end], true);
                consumed += r.consumed;
                produced += r.produced;
                if r.status == EncodeStatus::InputFinished {
                    break;
                }
            }
            prop_assert_eq!(&wire[..produced], &single[..s.produced]);
        }

        #[test]
        fn prop_byte_split_decode(data in prop::collection::vec(any::<u8>(), 1..64), split in 0usize..130) {
            let mut wire = [0u8; 129];
            let e = encode(&data, &mut wire, true);
            // Keep the closing END in the second chunk
            let split = split.min(e.produced - 1);

            let mut decoder = Decoder::new();
            let mut out = [0u8; 64];
            let a = decoder.decode(&wire[..split], &mut out);
            let b = decoder.decode(&wire[split..e.produced], &mut out[a.produced..]);
            prop_assert_eq!(b.status, DecodeStatus::FrameComplete);
            prop_assert_eq!(&out[..a.produced + b.produced], &data[..]);
        }
    }
}
