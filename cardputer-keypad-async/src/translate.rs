//! Chord to terminal byte sequence translation.
//!
//! Translation looks at the whole chord held after a press, not at the key that
//! went down. Every supported combination is spelled out in the table; there is
//! no general modifier resolver. Alt is the one exception: it is masked off
//! before the lookup and turns into an ESC prefix, the way terminals encode Meta.

use heapless::Vec;
use log::debug;

use crate::keys::Scancode;

const ESC: u8 = 0x1B;

/// Longest sequence the table may hold (`ESC [ 1 ; 2 A`).
pub const MAX_SEQUENCE: usize = 6;

/// Longest translator output: a table sequence plus the Alt prefix.
pub const MAX_OUTPUT: usize = MAX_SEQUENCE + 1;

/// One table entry: an exact chord and the bytes it sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping {
    pub chord: Scancode,
    pub bytes: &'static [u8],
}

const fn key(chord: Scancode, bytes: &'static [u8]) -> Mapping {
    Mapping { chord, bytes }
}

const fn shift(chord: Scancode, bytes: &'static [u8]) -> Mapping {
    key(Scancode::SHIFT.union(chord), bytes)
}

const fn ctrl(chord: Scancode, code: &'static [u8]) -> Mapping {
    key(Scancode::CTRL.union(chord), code)
}

/// The stock US-style terminal layout.
pub static DEFAULT_TABLE: &[Mapping] = &[
    // Row 1
    key(Scancode::BACKTICK, b"`"),
    key(Scancode::DIGIT_1, b"1"),
    key(Scancode::DIGIT_2, b"2"),
    key(Scancode::DIGIT_3, b"3"),
    key(Scancode::DIGIT_4, b"4"),
    key(Scancode::DIGIT_5, b"5"),
    key(Scancode::DIGIT_6, b"6"),
    key(Scancode::DIGIT_7, b"7"),
    key(Scancode::DIGIT_8, b"8"),
    key(Scancode::DIGIT_9, b"9"),
    key(Scancode::DIGIT_0, b"0"),
    key(Scancode::UNDERSCORE, b"_"),
    key(Scancode::EQUAL, b"="),
    key(Scancode::BACKSPACE, b"\x08"),
    // Row 2
    key(Scancode::TAB, b"\t"),
    key(Scancode::Q, b"q"),
    key(Scancode::W, b"w"),
    key(Scancode::E, b"e"),
    key(Scancode::R, b"r"),
    key(Scancode::T, b"t"),
    key(Scancode::Y, b"y"),
    key(Scancode::U, b"u"),
    key(Scancode::I, b"i"),
    key(Scancode::O, b"o"),
    key(Scancode::P, b"p"),
    key(Scancode::BRACE_LEFT, b"["),
    key(Scancode::BRACE_RIGHT, b"]"),
    key(Scancode::BACKSLASH, b"\\"),
    // Row 3
    key(Scancode::A, b"a"),
    key(Scancode::S, b"s"),
    key(Scancode::D, b"d"),
    key(Scancode::F, b"f"),
    key(Scancode::G, b"g"),
    key(Scancode::H, b"h"),
    key(Scancode::J, b"j"),
    key(Scancode::K, b"k"),
    key(Scancode::L, b"l"),
    key(Scancode::SEMICOLON, b";"),
    key(Scancode::QUOTE, b"'"),
    key(Scancode::ENTER, b"\n"),
    // Row 4
    key(Scancode::Z, b"z"),
    key(Scancode::X, b"x"),
    key(Scancode::C, b"c"),
    key(Scancode::V, b"v"),
    key(Scancode::B, b"b"),
    key(Scancode::N, b"n"),
    key(Scancode::M, b"m"),
    key(Scancode::COMMA, b","),
    key(Scancode::PERIOD, b"."),
    key(Scancode::SLASH, b"/"),
    key(Scancode::SPACE, b" "),
    // Cursor keys
    key(Scancode::UP, b"\x1b[A"),
    key(Scancode::DOWN, b"\x1b[B"),
    key(Scancode::RIGHT, b"\x1b[C"),
    key(Scancode::LEFT, b"\x1b[D"),
    key(Scancode::ESC, b"\x1b"),
    // Shift, row 1
    shift(Scancode::BACKTICK, b"~"),
    shift(Scancode::DIGIT_1, b"!"),
    shift(Scancode::DIGIT_2, b"@"),
    shift(Scancode::DIGIT_3, b"#"),
    shift(Scancode::DIGIT_4, b"$"),
    shift(Scancode::DIGIT_5, b"%"),
    shift(Scancode::DIGIT_6, b"^"),
    shift(Scancode::DIGIT_7, b"&"),
    shift(Scancode::DIGIT_8, b"*"),
    shift(Scancode::DIGIT_9, b"("),
    shift(Scancode::DIGIT_0, b")"),
    shift(Scancode::UNDERSCORE, b"-"),
    shift(Scancode::EQUAL, b"+"),
    shift(Scancode::BACKSPACE, b"\x08"),
    // Shift, row 2
    shift(Scancode::TAB, b"\x1b[Z"),
    shift(Scancode::Q, b"Q"),
    shift(Scancode::W, b"W"),
    shift(Scancode::E, b"E"),
    shift(Scancode::R, b"R"),
    shift(Scancode::T, b"T"),
    shift(Scancode::Y, b"Y"),
    shift(Scancode::U, b"U"),
    shift(Scancode::I, b"I"),
    shift(Scancode::O, b"O"),
    shift(Scancode::P, b"P"),
    shift(Scancode::BRACE_LEFT, b"{"),
    shift(Scancode::BRACE_RIGHT, b"}"),
    shift(Scancode::BACKSLASH, b"|"),
    // Shift, row 3
    shift(Scancode::A, b"A"),
    shift(Scancode::S, b"S"),
    shift(Scancode::D, b"D"),
    shift(Scancode::F, b"F"),
    shift(Scancode::G, b"G"),
    shift(Scancode::H, b"H"),
    shift(Scancode::J, b"J"),
    shift(Scancode::K, b"K"),
    shift(Scancode::L, b"L"),
    shift(Scancode::SEMICOLON, b":"),
    shift(Scancode::QUOTE, b"\""),
    shift(Scancode::ENTER, b"\n"),
    // Shift, row 4
    shift(Scancode::Z, b"Z"),
    shift(Scancode::X, b"X"),
    shift(Scancode::C, b"C"),
    shift(Scancode::V, b"V"),
    shift(Scancode::B, b"B"),
    shift(Scancode::N, b"N"),
    shift(Scancode::M, b"M"),
    shift(Scancode::COMMA, b"<"),
    shift(Scancode::PERIOD, b">"),
    shift(Scancode::SLASH, b"?"),
    shift(Scancode::SPACE, b" "),
    // Shift, cursor keys
    shift(Scancode::UP, b"\x1b[1;2A"),
    shift(Scancode::DOWN, b"\x1b[1;2B"),
    shift(Scancode::RIGHT, b"\x1b[1;2C"),
    shift(Scancode::LEFT, b"\x1b[1;2D"),
    // C0 control codes
    ctrl(Scancode::SHIFT.union(Scancode::DIGIT_2), b"\x00"), // NUL
    ctrl(Scancode::A, b"\x01"),                              // SOH
    ctrl(Scancode::B, b"\x02"),                              // STX
    ctrl(Scancode::C, b"\x03"),                              // ETX
    ctrl(Scancode::D, b"\x04"),                              // EOT
    ctrl(Scancode::E, b"\x05"),                              // ENQ
    ctrl(Scancode::F, b"\x06"),                              // ACK
    ctrl(Scancode::G, b"\x07"),                              // BEL
    ctrl(Scancode::H, b"\x08"),                              // BS
    ctrl(Scancode::I, b"\x09"),                              // HT
    ctrl(Scancode::J, b"\x0A"),                              // LF
    ctrl(Scancode::K, b"\x0B"),                              // VT
    ctrl(Scancode::L, b"\x0C"),                              // FF
    ctrl(Scancode::M, b"\x0D"),                              // CR
    ctrl(Scancode::N, b"\x0E"),                              // SO
    ctrl(Scancode::O, b"\x0F"),                              // SI
    ctrl(Scancode::P, b"\x10"),                              // DLE
    ctrl(Scancode::Q, b"\x11"),                              // DC1
    ctrl(Scancode::R, b"\x12"),                              // DC2
    ctrl(Scancode::S, b"\x13"),                              // DC3
    ctrl(Scancode::T, b"\x14"),                              // DC4
    ctrl(Scancode::U, b"\x15"),                              // NAK
    ctrl(Scancode::V, b"\x16"),                              // SYN
    ctrl(Scancode::W, b"\x17"),                              // ETB
    ctrl(Scancode::X, b"\x18"),                              // CAN
    ctrl(Scancode::Y, b"\x19"),                              // EM
    ctrl(Scancode::Z, b"\x1A"),                              // SUB
    ctrl(Scancode::BRACE_LEFT, b"\x1B"),                     // ESC
    ctrl(Scancode::BACKSLASH, b"\x1C"),                      // FS
    ctrl(Scancode::BRACE_RIGHT, b"\x1D"),                    // GS
    ctrl(Scancode::SHIFT.union(Scancode::DIGIT_6), b"\x1E"), // RS
    ctrl(Scancode::UNDERSCORE, b"\x1F"),                     // US
];

/// Looks chords up in a translation table.
#[derive(Debug, Clone, Copy)]
pub struct Translator {
    table: &'static [Mapping],
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE)
    }
}

impl Translator {
    /// Creates a translator over `table`. Sequences longer than
    /// [`MAX_SEQUENCE`] are never emitted.
    pub const fn new(table: &'static [Mapping]) -> Self {
        Self { table }
    }

    /// Returns the bytes `chord` sends, or `None` if the chord is not mapped.
    ///
    /// A chord made only of modifiers never sends anything.
    pub fn translate(&self, chord: Scancode) -> Option<Vec<u8, MAX_OUTPUT>> {
        if !chord.has_character_key() {
            return None;
        }
        let lookup = chord.difference(Scancode::ALT);
        let mapping = self.table.iter().find(|mapping| mapping.chord == lookup)?;
        if mapping.bytes.len() > MAX_SEQUENCE {
            debug!("Sequence for {chord:?} is too long, skipping");
            return None;
        }

        let mut out = Vec::new();
        if chord.contains(Scancode::ALT) {
            out.push(ESC).ok()?;
        }
        out.extend_from_slice(mapping.bytes).ok()?;
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(chord: Scancode) -> Option<Vec<u8, MAX_OUTPUT>> {
        Translator::default().translate(chord)
    }

    #[test]
    fn plain_and_shifted_letters() {
        assert_eq!(bytes(Scancode::A).unwrap(), b"a");
        assert_eq!(bytes(Scancode::SHIFT | Scancode::A).unwrap(), b"A");
        assert_eq!(bytes(Scancode::SHIFT | Scancode::DIGIT_9).unwrap(), b"(");
        assert_eq!(bytes(Scancode::ENTER).unwrap(), b"\n");
        assert_eq!(bytes(Scancode::COMMA).unwrap(), b",");
        assert_eq!(bytes(Scancode::SHIFT | Scancode::COMMA).unwrap(), b"<");
        assert_eq!(bytes(Scancode::SHIFT | Scancode::PERIOD).unwrap(), b">");
        assert_eq!(bytes(Scancode::SHIFT | Scancode::SLASH).unwrap(), b"?");
    }

    #[test]
    fn ctrl_letters_map_to_c0_codes() {
        assert_eq!(bytes(Scancode::CTRL | Scancode::C).unwrap(), b"\x03");
        assert_eq!(bytes(Scancode::CTRL | Scancode::Z).unwrap(), b"\x1a");
        assert_eq!(
            bytes(Scancode::CTRL | Scancode::SHIFT | Scancode::DIGIT_2).unwrap(),
            b"\x00"
        );
        assert_eq!(bytes(Scancode::CTRL | Scancode::UNDERSCORE).unwrap(), b"\x1f");
    }

    #[test]
    fn alt_prefixes_escape() {
        assert_eq!(bytes(Scancode::ALT | Scancode::A).unwrap(), b"\x1ba");
        assert_eq!(
            bytes(Scancode::ALT | Scancode::SHIFT | Scancode::UP).unwrap(),
            b"\x1b\x1b[1;2A"
        );
        assert_eq!(bytes(Scancode::ALT), None);
    }

    #[test]
    fn cursor_keys_send_ansi_sequences() {
        assert_eq!(bytes(Scancode::UP).unwrap(), b"\x1b[A");
        assert_eq!(bytes(Scancode::LEFT).unwrap(), b"\x1b[D");
        assert_eq!(bytes(Scancode::SHIFT | Scancode::RIGHT).unwrap(), b"\x1b[1;2C");
        assert_eq!(bytes(Scancode::SHIFT | Scancode::TAB).unwrap(), b"\x1b[Z");
    }

    #[test]
    fn unmapped_chords_send_nothing() {
        assert_eq!(bytes(Scancode::A | Scancode::S), None);
        assert_eq!(bytes(Scancode::SHIFT), None);
        assert_eq!(bytes(Scancode::empty()), None);
        assert_eq!(bytes(Scancode::OPT | Scancode::A), None);
    }

    #[test]
    fn default_table_has_no_duplicate_or_oversized_entries() {
        for (i, a) in DEFAULT_TABLE.iter().enumerate() {
            assert!(!a.bytes.is_empty() && a.bytes.len() <= MAX_SEQUENCE);
            assert!(!a.chord.contains(Scancode::ALT));
            for b in &DEFAULT_TABLE[i + 1..] {
                assert_ne!(a.chord, b.chord, "{:?} is mapped twice", a.chord);
            }
        }
    }

    #[test]
    fn custom_tables_replace_the_default() {
        static TABLE: &[Mapping] = &[
            Mapping {
                chord: Scancode::CTRL.union(Scancode::M),
                bytes: b"\n",
            },
            Mapping {
                chord: Scancode::FN,
                bytes: b"?",
            },
        ];
        let translator = Translator::new(TABLE);
        assert_eq!(translator.translate(Scancode::CTRL | Scancode::M).unwrap(), b"\n");
        assert_eq!(translator.translate(Scancode::A), None);
        assert_eq!(translator.translate(Scancode::FN), None);
    }
}
