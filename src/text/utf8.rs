//! Streaming UTF-8 decoding with replacement.
//!
//! Bytes are fed one at a time through a small state machine. A rejected
//! sequence produces U+FFFD; if the rejected byte was not the first of its
//! sequence it is examined again as a possible lead byte, so one bad byte never
//! swallows the character that follows it.

use log::trace;

pub const REPLACEMENT: char = '\u{FFFD}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Accept,
    Reject,
    /// Waiting for this many plain continuation bytes (80..=BF).
    Need(u8),
    /// After E0: second byte must be A0..=BF.
    E0,
    /// After ED: second byte must be 80..=9F (no surrogates).
    Ed,
    /// After F0: second byte must be 90..=BF.
    F0,
    /// After F4: second byte must be 80..=8F (max U+10FFFF).
    F4,
}

/// Result of feeding one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Char(char),
    Invalid,
    Pending,
}

/// Byte-at-a-time decoder.
#[derive(Debug, Clone)]
pub struct Utf8Decoder {
    state: State,
    codepoint: u32,
}

impl Default for Utf8Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self {
            state: State::Accept,
            codepoint: 0,
        }
    }

    /// True when the decoder sits between characters.
    pub fn is_idle(&self) -> bool {
        matches!(self.state, State::Accept | State::Reject)
    }

    pub fn feed(&mut self, byte: u8) -> Step {
        let next = match self.state {
            State::Accept | State::Reject => self.lead(byte),
            State::Need(n) => self.continuation(byte, 0x80..=0xBF, n - 1),
            State::E0 => self.continuation(byte, 0xA0..=0xBF, 1),
            State::Ed => self.continuation(byte, 0x80..=0x9F, 1),
            State::F0 => self.continuation(byte, 0x90..=0xBF, 2),
            State::F4 => self.continuation(byte, 0x80..=0x8F, 2),
        };
        self.state = next;

        match next {
            State::Accept => match char::from_u32(self.codepoint) {
                Some(c) => Step::Char(c),
                None => Step::Invalid,
            },
            State::Reject => Step::Invalid,
            _ => Step::Pending,
        }
    }

    fn lead(&mut self, byte: u8) -> State {
        match byte {
            0x00..=0x7F => {
                self.codepoint = byte as u32;
                State::Accept
            }
            0xC2..=0xDF => {
                self.codepoint = (byte & 0x1F) as u32;
                State::Need(1)
            }
            0xE0 | 0xED | 0xE1..=0xEC | 0xEE..=0xEF => {
                self.codepoint = (byte & 0x0F) as u32;
                match byte {
                    0xE0 => State::E0,
                    0xED => State::Ed,
                    _ => State::Need(2),
                }
            }
            0xF0..=0xF4 => {
                self.codepoint = (byte & 0x07) as u32;
                match byte {
                    0xF0 => State::F0,
                    0xF4 => State::F4,
                    _ => State::Need(3),
                }
            }
            _ => State::Reject,
        }
    }

    fn continuation(
        &mut self,
        byte: u8,
        range: std::ops::RangeInclusive<u8>,
        remaining: u8,
    ) -> State {
        if !range.contains(&byte) {
            return State::Reject;
        }
        self.codepoint = (self.codepoint << 6) | (byte & 0x3F) as u32;
        if remaining == 0 {
            State::Accept
        } else {
            State::Need(remaining)
        }
    }
}

/// Iterator over the characters of `bytes`, substituting U+FFFD for every
/// maximal invalid subsequence.
pub struct DecodeLossy<'a> {
    bytes: &'a [u8],
    pos: usize,
    decoder: Utf8Decoder,
}

pub fn decode_lossy(bytes: &[u8]) -> DecodeLossy<'_> {
    DecodeLossy {
        bytes,
        pos: 0,
        decoder: Utf8Decoder::new(),
    }
}

impl Iterator for DecodeLossy<'_> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        while let Some(&byte) = self.bytes.get(self.pos) {
            let was_idle = self.decoder.is_idle();
            self.pos += 1;

            match self.decoder.feed(byte) {
                Step::Char(c) => return Some(c),
                Step::Pending => {}
                Step::Invalid => {
                    trace!("invalid utf-8 byte {:#04x} at offset {}", byte, self.pos - 1);
                    if !was_idle {
                        // the byte may start the next sequence
                        self.pos -= 1;
                    }
                    return Some(REPLACEMENT);
                }
            }
        }

        if !self.decoder.is_idle() {
            trace!("utf-8 sequence truncated at end of input");
            self.decoder = Utf8Decoder::new();
            return Some(REPLACEMENT);
        }
        None
    }
}
