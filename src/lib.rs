//! Binary-to-text codec engine.
//!
//! Reversible power-of-two base encodings (Base16, Base32, Z-Base32, Base64,
//! Base64-URL, and custom 16/32/64-symbol alphabets), a chunked block
//! transform for pipeline use, and a fixed-width hex codec for unsigned
//! integers.

mod alphabet;
mod chunked;
mod config;
pub mod hex;
mod transform;

pub use alphabet::{
    Alphabet, AlphabetError, BASE16_LOWER, BASE16_UPPER, BASE32, BASE64, BASE64_URL, ZBASE32,
};
pub use chunked::{
    Progress, decode, decode_into, encode, encode_into, measure_decoded_len, measure_encoded_len,
};
pub use config::{AlphabetConfig, AlphabetRegistry, RegistryError};
pub use transform::{BlockTransform, DecodeTransform, EncodeTransform, TransformError};
