//! The key set: one bit per physical switch of the Cardputer matrix.
//!
//! Bit positions follow the order in which the scanner assembles its
//! accumulator: the address state scanned first ends up in the highest seven
//! bits, the one scanned last in bits 0-6, and sense line `n` of a state is bit
//! `n` of its group. See [`matrix_bit`].
//!
//! The 56 primitive keys are the only flags of [`Scancode`]. Convenience keys
//! such as the arrows are chords of a primitive key and `FN`; they are plain
//! associated constants and never appear in the flag list.

use bitflags::{bitflags, Flags};

/// Number of address states the decoder cycles through.
pub const GROUPS: usize = 8;

/// Number of sense lines sampled per address state.
pub const SENSE_LINES: usize = 7;

/// Number of addressable switches.
pub const KEY_COUNT: usize = GROUPS * SENSE_LINES;

/// Returns the bit a switch occupies given the index of its address state in
/// the scan order and the sense line it is wired to.
pub const fn matrix_bit(state: usize, line: usize) -> u32 {
    (SENSE_LINES * (GROUPS - 1 - state) + line) as u32
}

bitflags! {
    /// A set of keys, either a chord (everything held) or a delta (what changed).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct Scancode: u64 {
        // Row 1
        const BACKTICK = 1 << 0;
        const DIGIT_1 = 1 << 1;
        const DIGIT_2 = 1 << 2;
        const DIGIT_3 = 1 << 3;
        const DIGIT_4 = 1 << 4;
        const DIGIT_5 = 1 << 5;
        const DIGIT_6 = 1 << 6;
        const DIGIT_7 = 1 << 7;
        const DIGIT_8 = 1 << 8;
        const DIGIT_9 = 1 << 9;
        const DIGIT_0 = 1 << 10;
        const UNDERSCORE = 1 << 11;
        const EQUAL = 1 << 12;
        const BACKSPACE = 1 << 13;
        // Row 2
        const TAB = 1 << 14;
        const Q = 1 << 15;
        const W = 1 << 16;
        const E = 1 << 17;
        const R = 1 << 18;
        const T = 1 << 19;
        const Y = 1 << 20;
        const U = 1 << 21;
        const I = 1 << 22;
        const O = 1 << 23;
        const P = 1 << 24;
        const BRACE_LEFT = 1 << 25;
        const BRACE_RIGHT = 1 << 26;
        const BACKSLASH = 1 << 27;
        // Row 3
        const FN = 1 << 28;
        const SHIFT = 1 << 29;
        const A = 1 << 30;
        const S = 1 << 31;
        const D = 1 << 32;
        const F = 1 << 33;
        const G = 1 << 34;
        const H = 1 << 35;
        const J = 1 << 36;
        const K = 1 << 37;
        const L = 1 << 38;
        const SEMICOLON = 1 << 39;
        const QUOTE = 1 << 40;
        const ENTER = 1 << 41;
        // Row 4
        const CTRL = 1 << 42;
        const OPT = 1 << 43;
        const ALT = 1 << 44;
        const Z = 1 << 45;
        const X = 1 << 46;
        const C = 1 << 47;
        const V = 1 << 48;
        const B = 1 << 49;
        const N = 1 << 50;
        const M = 1 << 51;
        const COMMA = 1 << 52;
        const PERIOD = 1 << 53;
        const SLASH = 1 << 54;
        const SPACE = 1 << 55;
    }
}

// Every primitive key must own exactly one bit, and no bit may be shared.
const _: () = {
    let flags = <Scancode as Flags>::FLAGS;
    assert!(flags.len() == KEY_COUNT);
    let mut seen = 0u64;
    let mut i = 0;
    while i < flags.len() {
        let bits = flags[i].value().bits();
        assert!(bits.count_ones() == 1, "key constant spans more than one bit");
        assert!(seen & bits == 0, "two key constants share a bit");
        seen |= bits;
        i += 1;
    }
};

impl Scancode {
    /// Keys that produce no character when pressed on their own.
    pub const MODIFIERS: Self = Self::CTRL
        .union(Self::FN)
        .union(Self::OPT)
        .union(Self::SHIFT)
        .union(Self::ALT);

    /// Fn + `` ` ``.
    pub const ESC: Self = Self::FN.union(Self::BACKTICK);
    /// Fn + Backspace.
    pub const DEL: Self = Self::FN.union(Self::BACKSPACE);
    /// Fn + `;`.
    pub const UP: Self = Self::FN.union(Self::SEMICOLON);
    /// Fn + `.`.
    pub const DOWN: Self = Self::FN.union(Self::PERIOD);
    /// Fn + `,`.
    pub const LEFT: Self = Self::FN.union(Self::COMMA);
    /// Fn + `/`.
    pub const RIGHT: Self = Self::FN.union(Self::SLASH);

    /// Fn + `1`.
    pub const F1: Self = Self::FN.union(Self::DIGIT_1);
    /// Fn + `2`.
    pub const F2: Self = Self::FN.union(Self::DIGIT_2);
    /// Fn + `3`.
    pub const F3: Self = Self::FN.union(Self::DIGIT_3);
    /// Fn + `4`.
    pub const F4: Self = Self::FN.union(Self::DIGIT_4);
    /// Fn + `5`.
    pub const F5: Self = Self::FN.union(Self::DIGIT_5);
    /// Fn + `6`.
    pub const F6: Self = Self::FN.union(Self::DIGIT_6);
    /// Fn + `7`.
    pub const F7: Self = Self::FN.union(Self::DIGIT_7);
    /// Fn + `8`.
    pub const F8: Self = Self::FN.union(Self::DIGIT_8);
    /// Fn + `9`.
    pub const F9: Self = Self::FN.union(Self::DIGIT_9);
    /// Fn + `0`.
    pub const F10: Self = Self::FN.union(Self::DIGIT_0);
    /// Fn + `_`.
    pub const F11: Self = Self::FN.union(Self::UNDERSCORE);
    /// Fn + `=`.
    pub const F12: Self = Self::FN.union(Self::EQUAL);

    /// Returns `true` if the set holds at least one key outside [`Self::MODIFIERS`].
    pub const fn has_character_key(self) -> bool {
        !self.difference(Self::MODIFIERS).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPOSITES: [Scancode; 18] = [
        Scancode::ESC,
        Scancode::DEL,
        Scancode::UP,
        Scancode::DOWN,
        Scancode::LEFT,
        Scancode::RIGHT,
        Scancode::F1,
        Scancode::F2,
        Scancode::F3,
        Scancode::F4,
        Scancode::F5,
        Scancode::F6,
        Scancode::F7,
        Scancode::F8,
        Scancode::F9,
        Scancode::F10,
        Scancode::F11,
        Scancode::F12,
    ];

    #[test]
    fn named_keys_cover_every_matrix_bit_once() {
        let mut seen = 0u64;
        for (name, key) in Scancode::all().iter_names() {
            assert_eq!(key.bits().count_ones(), 1, "{name} is not a single bit");
            assert_eq!(seen & key.bits(), 0, "{name} reuses a bit");
            seen |= key.bits();
        }
        assert_eq!(seen, (1u64 << KEY_COUNT) - 1);
    }

    #[test]
    fn composites_are_fn_chords_of_distinct_keys() {
        for (i, a) in COMPOSITES.iter().enumerate() {
            assert_eq!(a.bits().count_ones(), 2);
            assert!(a.contains(Scancode::FN));
            for b in &COMPOSITES[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn matrix_bit_places_first_state_highest() {
        assert_eq!(matrix_bit(0, 0), 49);
        assert_eq!(matrix_bit(0, 6), 55);
        assert_eq!(matrix_bit(GROUPS - 1, 0), 0);
        assert_eq!(matrix_bit(GROUPS - 1, 6), 6);
    }

    #[test]
    fn modifiers_alone_have_no_character() {
        assert!(!Scancode::MODIFIERS.has_character_key());
        assert!(!(Scancode::SHIFT | Scancode::CTRL).has_character_key());
        assert!((Scancode::SHIFT | Scancode::A).has_character_key());
    }
}
