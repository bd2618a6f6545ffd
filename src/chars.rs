//! Character classification
//!
//! All classes the scanner cares about are ASCII, so classification is a
//! single lookup in a table built at compile time. Anything outside ASCII
//! belongs to no class.

use crate::error::Radix;

/// Bitfield flags for character classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterFlags(u16);

impl CharacterFlags {
    /// Whitespace characters (space, tab)
    pub const WHITESPACE: Self = Self(1 << 0);
    /// Characters allowed in a bare key
    pub const BARE_KEY: Self = Self(1 << 1);
    /// Characters opening a quoted key or string
    pub const QUOTE: Self = Self(1 << 2);
    /// Decimal digits
    pub const DIGIT: Self = Self(1 << 3);
    /// Hexadecimal digits
    pub const HEX_DIGIT: Self = Self(1 << 4);
    /// Octal digits
    pub const OCT_DIGIT: Self = Self(1 << 5);
    /// Binary digits
    pub const BIN_DIGIT: Self = Self(1 << 6);
    /// Control characters other than tab
    pub const CONTROL: Self = Self(1 << 7);

    /// Creates empty flags
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Checks if any of the given flags are set
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    /// Returns the union of two flag sets
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl std::ops::BitOr for CharacterFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

/// Character lookup table for O(1) character classification
#[derive(Debug, Clone)]
pub struct CharacterTable([CharacterFlags; 128]);

impl CharacterTable {
    /// Creates a new character table with compile-time initialization
    pub const fn new() -> Self {
        let mut table = [CharacterFlags::empty(); 128];
        let mut i = 0;

        while i < 128 {
            let ch = i as u8;
            let mut flags = CharacterFlags::empty();

            if ch == b' ' || ch == b'\t' {
                flags = flags.union(CharacterFlags::WHITESPACE);
            }

            match ch {
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' => {
                    flags = flags.union(CharacterFlags::BARE_KEY);
                }
                b'"' | b'\'' => flags = flags.union(CharacterFlags::QUOTE),
                _ => {}
            }

            if ch.is_ascii_digit() {
                flags = flags.union(CharacterFlags::DIGIT);
            }
            if ch.is_ascii_hexdigit() {
                flags = flags.union(CharacterFlags::HEX_DIGIT);
            }
            if ch >= b'0' && ch <= b'7' {
                flags = flags.union(CharacterFlags::OCT_DIGIT);
            }
            if ch == b'0' || ch == b'1' {
                flags = flags.union(CharacterFlags::BIN_DIGIT);
            }

            // 0x00-0x08, 0x0A-0x1F and DEL
            if (ch < 0x20 && ch != b'\t') || ch == 0x7F {
                flags = flags.union(CharacterFlags::CONTROL);
            }

            table[i] = flags;
            i += 1;
        }

        Self(table)
    }

    /// Returns the flags for a character
    #[inline(always)]
    pub const fn get_flags(&self, ch: char) -> CharacterFlags {
        if (ch as u32) < 128 {
            self.0[ch as usize]
        } else {
            CharacterFlags::empty()
        }
    }

    /// Tests if a character has any of the given flags
    #[inline(always)]
    pub const fn test_character(&self, ch: char, flags: CharacterFlags) -> bool {
        self.get_flags(ch).intersects(flags)
    }
}

impl Default for CharacterTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Global character table instance
pub static CHARACTER_TABLE: CharacterTable = CharacterTable::new();

/// Space or tab
#[inline(always)]
pub fn is_whitespace(ch: char) -> bool {
    CHARACTER_TABLE.test_character(ch, CharacterFlags::WHITESPACE)
}

/// Letters, digits, `-` and `_`
#[inline(always)]
pub fn is_bare_key(ch: char) -> bool {
    CHARACTER_TABLE.test_character(ch, CharacterFlags::BARE_KEY)
}

/// A character that starts a key: a bare-key character or a quote
#[inline(always)]
pub fn is_key_start(ch: char) -> bool {
    CHARACTER_TABLE.test_character(ch, CharacterFlags::BARE_KEY | CharacterFlags::QUOTE)
}

#[inline(always)]
pub fn is_digit(ch: char) -> bool {
    CHARACTER_TABLE.test_character(ch, CharacterFlags::DIGIT)
}

#[inline(always)]
pub fn is_hex_digit(ch: char) -> bool {
    CHARACTER_TABLE.test_character(ch, CharacterFlags::HEX_DIGIT)
}

#[inline(always)]
pub fn is_oct_digit(ch: char) -> bool {
    CHARACTER_TABLE.test_character(ch, CharacterFlags::OCT_DIGIT)
}

#[inline(always)]
pub fn is_bin_digit(ch: char) -> bool {
    CHARACTER_TABLE.test_character(ch, CharacterFlags::BIN_DIGIT)
}

/// Tests a character against the digit class of a prefixed base
#[inline(always)]
pub fn is_radix_digit(ch: char, radix: Radix) -> bool {
    match radix {
        Radix::Hexadecimal => is_hex_digit(ch),
        Radix::Octal => is_oct_digit(ch),
        Radix::Binary => is_bin_digit(ch),
    }
}

/// Control characters 0x00-0x08, 0x0A-0x1F and 0x7F (tab is not one)
#[inline(always)]
pub fn is_control(ch: char) -> bool {
    CHARACTER_TABLE.test_character(ch, CharacterFlags::CONTROL)
}

/// Valid Unicode scalar values: 0x0-0xD7FF and 0xE000-0x10FFFF
#[inline(always)]
pub fn is_unicode_scalar(value: u32) -> bool {
    value <= 0xD7FF || (0xE000..=0x10FFFF).contains(&value)
}
