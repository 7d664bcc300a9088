use std::fmt;
use std::sync::LazyLock;

/// Sentinel in the inverse table for characters outside the alphabet.
const NOT_A_SYMBOL: u8 = 0xFF;

/// An encoding alphabet: an ordered set of ASCII symbols plus an optional
/// padding character.
///
/// The symbol count must be a power of two in {16, 32, 64}, so every symbol
/// carries a whole number of bits (4, 5, or 6). The inverse lookup is a flat
/// 128-entry table; anything at or above 0x80 is never in an alphabet.
///
/// Alphabets are immutable after construction and safe to share across
/// threads.
#[derive(Debug, Clone)]
pub struct Alphabet {
    symbols: Vec<u8>,
    inverse: [u8; 128],
    padding: Option<u8>,
    bits_per_symbol: u32,
}

/// Errors raised while constructing an [`Alphabet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlphabetError {
    /// The symbol count is not 16, 32, or 64
    InvalidLength(usize),
    /// A symbol is outside the ASCII range
    NonAsciiSymbol(char),
    /// The same character appears twice
    DuplicateSymbol(char),
    /// The padding character is outside the ASCII range
    NonAsciiPadding(char),
    /// The padding character is also a symbol
    PaddingCollision(char),
}

impl fmt::Display for AlphabetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlphabetError::InvalidLength(len) => {
                write!(f, "alphabet must have 16, 32, or 64 symbols, got {}", len)
            }
            AlphabetError::NonAsciiSymbol(c) => {
                write!(f, "symbol '{}' is outside the ASCII range", c.escape_default())
            }
            AlphabetError::DuplicateSymbol(c) => {
                write!(f, "duplicate symbol in alphabet: '{}'", c.escape_default())
            }
            AlphabetError::NonAsciiPadding(c) => {
                write!(f, "padding '{}' is outside the ASCII range", c.escape_default())
            }
            AlphabetError::PaddingCollision(c) => {
                write!(f, "padding '{}' collides with an alphabet symbol", c.escape_default())
            }
        }
    }
}

impl std::error::Error for AlphabetError {}

impl Alphabet {
    /// Creates a new alphabet from a string of symbols and an optional
    /// padding character.
    ///
    /// # Errors
    ///
    /// Returns an error if the symbol count is not 16, 32, or 64, if any
    /// character is non-ASCII or repeated, or if the padding character
    /// collides with a symbol.
    pub fn new(symbols: &str, padding: Option<char>) -> Result<Self, AlphabetError> {
        let count = symbols.chars().count();
        if !matches!(count, 16 | 32 | 64) {
            return Err(AlphabetError::InvalidLength(count));
        }

        let mut table = Vec::with_capacity(count);
        let mut inverse = [NOT_A_SYMBOL; 128];
        for (i, c) in symbols.chars().enumerate() {
            if !c.is_ascii() {
                return Err(AlphabetError::NonAsciiSymbol(c));
            }
            let b = c as u8;
            if inverse[b as usize] != NOT_A_SYMBOL {
                return Err(AlphabetError::DuplicateSymbol(c));
            }
            inverse[b as usize] = i as u8;
            table.push(b);
        }

        let padding = match padding {
            Some(c) if !c.is_ascii() => return Err(AlphabetError::NonAsciiPadding(c)),
            Some(c) if inverse[c as usize] != NOT_A_SYMBOL => {
                return Err(AlphabetError::PaddingCollision(c));
            }
            Some(c) => Some(c as u8),
            None => None,
        };

        Ok(Alphabet {
            symbols: table,
            inverse,
            padding,
            // 16 -> 4, 32 -> 5, 64 -> 6
            bits_per_symbol: count.trailing_zeros(),
        })
    }

    /// Returns the base (radix) of the alphabet: 16, 32, or 64.
    pub fn base(&self) -> usize {
        self.symbols.len()
    }

    /// Returns the number of bits each symbol carries (4, 5, or 6).
    pub fn bits_per_symbol(&self) -> u32 {
        self.bits_per_symbol
    }

    /// Returns the padding character, if any.
    pub fn padding(&self) -> Option<u8> {
        self.padding
    }

    /// Bytes per encoding group: the smallest byte count that maps to whole
    /// symbols (lcm(8, bits) / 8).
    pub fn group_bytes(&self) -> usize {
        match self.bits_per_symbol {
            4 => 1,
            5 => 5,
            _ => 3,
        }
    }

    /// Symbols per encoding group (lcm(8, bits) / bits).
    pub fn group_symbols(&self) -> usize {
        match self.bits_per_symbol {
            4 => 2,
            5 => 8,
            _ => 4,
        }
    }

    /// Maps a symbol index to its character. Callers guarantee the index is
    /// below [`base`](Self::base).
    pub(crate) fn symbol(&self, index: usize) -> u8 {
        self.symbols[index]
    }

    /// Maps a character back to its symbol index, or `None` if the character
    /// is not in the alphabet (including anything at or above 0x80).
    pub(crate) fn index_of(&self, byte: u8) -> Option<u8> {
        if byte >= 0x80 {
            return None;
        }
        match self.inverse[byte as usize] {
            NOT_A_SYMBOL => None,
            index => Some(index),
        }
    }

    pub(crate) fn is_padding(&self, byte: u8) -> bool {
        self.padding == Some(byte)
    }
}

/// Standard Base64 (RFC 4648 §4) with `=` padding.
pub static BASE64: LazyLock<Alphabet> = LazyLock::new(|| {
    Alphabet::new(
        "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/",
        Some('='),
    )
    .expect("builtin base64 alphabet is valid")
});

/// URL-safe Base64 (RFC 4648 §5, `-` and `_`) with `=` padding.
pub static BASE64_URL: LazyLock<Alphabet> = LazyLock::new(|| {
    Alphabet::new(
        "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_",
        Some('='),
    )
    .expect("builtin base64url alphabet is valid")
});

/// Standard Base32 (RFC 4648 §6) with `=` padding.
pub static BASE32: LazyLock<Alphabet> = LazyLock::new(|| {
    Alphabet::new("ABCDEFGHIJKLMNOPQRSTUVWXYZ234567", Some('='))
        .expect("builtin base32 alphabet is valid")
});

/// Z-Base32 (human-oriented ordering), no padding.
pub static ZBASE32: LazyLock<Alphabet> = LazyLock::new(|| {
    Alphabet::new("ybndrfg8ejkmcpqxot1uwisza345h769", None)
        .expect("builtin z-base32 alphabet is valid")
});

/// Lowercase hexadecimal, no padding.
pub static BASE16_LOWER: LazyLock<Alphabet> = LazyLock::new(|| {
    Alphabet::new("0123456789abcdef", None).expect("builtin base16 alphabet is valid")
});

/// Uppercase hexadecimal, no padding.
pub static BASE16_UPPER: LazyLock<Alphabet> = LazyLock::new(|| {
    Alphabet::new("0123456789ABCDEF", None).expect("builtin base16 alphabet is valid")
});
