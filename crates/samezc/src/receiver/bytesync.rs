//! Byte synchronization
//!
//! SAME bytes are sent least significant bit first. The
//! `ByteSync` searches the bit stream for four bytes of the
//! preamble. Once it finds them, every eight bits which follow
//! are one byte.
//!
//! An unknown bit means the tone has stopped or become
//! unreadable. Any partial byte is discarded and the search
//! for the preamble begins again.

use super::symsync::Bit;
use crate::waveform;

/// One received byte
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RawByte {
    /// Byte value
    pub value: u8,

    /// Lifetime sample index of the byte's first bit
    pub timestamp: u64,
}

/// Byte synchronizer output
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ByteEvent {
    /// Acquired byte sync on four preamble bytes
    ///
    /// The timestamp is the sync word's last bit.
    Synced(u64),

    /// A byte, after sync
    Byte(RawByte),

    /// Lost byte sync on an unknown bit
    Break(u64),
}

/// Byte synchronizer
#[derive(Clone, Debug, Default)]
pub struct ByteSync {
    state: State,
}

impl ByteSync {
    /// New byte synchronizer, searching for sync
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard all state and search for sync
    pub fn reset(&mut self) {
        self.state = State::default();
    }

    /// True if byte sync is held
    pub fn is_synced(&self) -> bool {
        matches!(self.state, State::Locked { .. })
    }

    /// Process one bit
    pub fn input(&mut self, bit: &Bit) -> Option<ByteEvent> {
        let value = match bit.value {
            Some(value) => value as u32,
            None => {
                let was_synced = self.is_synced();
                self.reset();
                return if was_synced {
                    Some(ByteEvent::Break(bit.timestamp))
                } else {
                    None
                };
            }
        };

        match self.state {
            State::Search {
                ref mut word,
                ref mut count,
            } => {
                *word = (*word >> 1) | (value << 31);
                *count = count.saturating_add(1);
                if *count >= 32 && *word == SYNC_WORD_LSB_FIRST {
                    self.state = State::Locked {
                        byte: 0,
                        count: 0,
                        timestamp: 0,
                    };
                    Some(ByteEvent::Synced(bit.timestamp))
                } else {
                    None
                }
            }
            State::Locked {
                ref mut byte,
                ref mut count,
                ref mut timestamp,
            } => {
                if *count == 0 {
                    *timestamp = bit.timestamp;
                }
                *byte = (*byte >> 1) | ((value as u8) << 7);
                *count += 1;
                if *count == 8 {
                    let out = RawByte {
                        value: *byte,
                        timestamp: *timestamp,
                    };
                    *byte = 0;
                    *count = 0;
                    Some(ByteEvent::Byte(out))
                } else {
                    None
                }
            }
        }
    }
}

// Preamble sync word, as it appears in a shift register which
// receives bits least significant bit first
//
// The preamble byte is symmetric under this shift, so this is
// the same value as the sync word.
const SYNC_WORD_LSB_FIRST: u32 = waveform::PREAMBLE_SYNC_WORD;

#[derive(Clone, Debug, PartialEq, Eq)]
enum State {
    // Search for the sync word
    //
    // Holds the last 32 bits, with the newest in the MSb, and
    // the number of bits received since the last reset.
    Search { word: u32, count: u32 },

    // Read bytes
    //
    // Holds the partial byte, its bit count, and the time of
    // its first bit
    Locked { byte: u8, count: u32, timestamp: u64 },
}

impl Default for State {
    fn default() -> Self {
        State::Search { word: 0, count: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::waveform::bytes_to_bits;

    // Feed bytes as bits, one bit per sample index
    fn run(sync: &mut ByteSync, bits: &[Option<bool>], t0: u64) -> Vec<ByteEvent> {
        bits.iter()
            .enumerate()
            .filter_map(|(i, &value)| {
                sync.input(&Bit {
                    value,
                    timestamp: t0 + i as u64,
                })
            })
            .collect()
    }

    fn known(bytes: &[u8]) -> Vec<Option<bool>> {
        bytes_to_bits(bytes).into_iter().map(Some).collect()
    }

    #[test]
    fn test_sync_and_bytes() {
        let mut sync = ByteSync::new();
        let mut bits = known(&[0x00, 0xab, 0xab, 0xab, 0xab, 0xab, b'Z', b'C']);
        bits.push(None);

        let out = run(&mut sync, &bits, 100);
        assert_eq!(
            out,
            vec![
                ByteEvent::Synced(100 + 39),
                ByteEvent::Byte(RawByte {
                    value: 0xab,
                    timestamp: 140
                }),
                ByteEvent::Byte(RawByte {
                    value: b'Z',
                    timestamp: 148
                }),
                ByteEvent::Byte(RawByte {
                    value: b'C',
                    timestamp: 156
                }),
                ByteEvent::Break(164),
            ]
        );
        assert!(!sync.is_synced());
    }

    #[test]
    fn test_needs_full_word() {
        // bits which are not preamble never sync
        let mut sync = ByteSync::new();
        let out = run(&mut sync, &known(&[0x00, 0xff, 0x55, 0xaa, 0xba]), 0);
        assert!(out.is_empty());

        // an unknown bit restarts the search
        let mut bits = known(&[0xab, 0xab]);
        bits.push(None);
        bits.extend(known(&[0xab, 0xab]));
        let out = run(&mut ByteSync::new(), &bits, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_unknown_discards_partial_byte() {
        let mut sync = ByteSync::new();
        let mut bits = known(&[0xab, 0xab, 0xab, 0xab]);
        bits.extend(known(&[b'N'])[0..5].iter());
        bits.push(None);
        bits.extend(known(&[b'N']));

        let out = run(&mut sync, &bits, 0);
        assert_eq!(out, vec![ByteEvent::Synced(31), ByteEvent::Break(37)]);
    }
}
