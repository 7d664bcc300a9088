//! Core bit-packing codec: fixed-size group encoding and decoding for
//! power-of-two alphabets (RFC 4648 style).
//!
//! Input bytes are packed MSB-first into contiguous B-bit fields, one field
//! per output symbol. A final partial group zero-fills the low bits of its
//! last field on encode; those filler bits are discarded on decode.

use crate::alphabet::Alphabet;

/// How far a partial conversion got: source units read and destination units
/// written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    /// Source units (bytes or characters) consumed
    pub consumed: usize,
    /// Destination units written
    pub produced: usize,
}

/// Returns the exact encoded length in characters for `byte_count` input
/// bytes.
///
/// Padded alphabets always emit whole symbol groups; unpadded alphabets emit
/// `ceil(bits / bits_per_symbol)` characters for the trailing partial group.
pub fn measure_encoded_len(byte_count: usize, alphabet: &Alphabet) -> usize {
    let gb = alphabet.group_bytes();
    let gs = alphabet.group_symbols();
    let bits = alphabet.bits_per_symbol() as usize;

    let whole = byte_count / gb;
    let rem = byte_count % gb;
    let mut len = whole * gs;
    if rem > 0 {
        len += if alphabet.padding().is_some() {
            gs
        } else {
            (rem * 8).div_ceil(bits)
        };
    }
    len
}

/// Returns the exact decoded length in bytes for the given encoded text.
///
/// Counts only characters that belong to the alphabet; everything else is
/// ignored, matching the decoder's skip policy. A padding character ends the
/// count.
pub fn measure_decoded_len(text: &str, alphabet: &Alphabet) -> usize {
    measure_decoded_bytes(text.as_bytes(), alphabet)
}

pub(crate) fn measure_decoded_bytes(text: &[u8], alphabet: &Alphabet) -> usize {
    let gs = alphabet.group_symbols();
    let gb = alphabet.group_bytes();
    let bits = alphabet.bits_per_symbol() as usize;

    let mut symbols = 0usize;
    for &b in text {
        if alphabet.is_padding(b) {
            break;
        }
        if alphabet.index_of(b).is_some() {
            symbols += 1;
        }
    }
    (symbols / gs) * gb + (symbols % gs) * bits / 8
}

/// Encodes `data` into `out`, writing as many complete symbol groups as fit.
///
/// The final partial group (with its padding, if the alphabet has any) is
/// written only once every whole group fits. When `out` is undersized the
/// call stops at a group boundary and reports how far it got instead of
/// overflowing; callers re-present the unconsumed tail.
pub fn encode_into(data: &[u8], out: &mut [u8], alphabet: &Alphabet) -> Progress {
    let gb = alphabet.group_bytes();
    let gs = alphabet.group_symbols();
    let bits = alphabet.bits_per_symbol() as usize;
    let mask = (1u64 << bits) - 1;

    let whole = data.len() / gb;
    let groups = whole.min(out.len() / gs);

    let mut consumed = 0;
    let mut produced = 0;
    for chunk in data[..groups * gb].chunks_exact(gb) {
        let mut acc = 0u64;
        for &byte in chunk {
            acc = (acc << 8) | u64::from(byte);
        }
        let mut shift = gb * 8;
        for slot in &mut out[produced..produced + gs] {
            shift -= bits;
            *slot = alphabet.symbol(((acc >> shift) & mask) as usize);
        }
        consumed += gb;
        produced += gs;
    }

    // Trailing partial group, only after every whole group has been written.
    let tail = &data[whole * gb..];
    if groups == whole && !tail.is_empty() {
        let data_symbols = (tail.len() * 8).div_ceil(bits);
        let total_symbols = if alphabet.padding().is_some() {
            gs
        } else {
            data_symbols
        };
        if out.len() - produced >= total_symbols {
            let mut acc = 0u64;
            for &byte in tail {
                acc = (acc << 8) | u64::from(byte);
            }
            // zero-fill the low bits of the last partial field
            let mut shift = data_symbols * bits;
            acc <<= shift - tail.len() * 8;
            for slot in &mut out[produced..produced + data_symbols] {
                shift -= bits;
                *slot = alphabet.symbol(((acc >> shift) & mask) as usize);
            }
            produced += data_symbols;
            if let Some(pad) = alphabet.padding() {
                for slot in &mut out[produced..produced + (total_symbols - data_symbols)] {
                    *slot = pad;
                }
                produced += total_symbols - data_symbols;
            }
            consumed += tail.len();
        }
    }

    Progress { consumed, produced }
}

/// Encodes `data` to a string, allocating the exact output length up front.
pub fn encode(data: &[u8], alphabet: &Alphabet) -> String {
    let mut out = vec![0u8; measure_encoded_len(data.len(), alphabet)];
    let progress = encode_into(data, &mut out, alphabet);
    debug_assert_eq!(progress.consumed, data.len());
    debug_assert_eq!(progress.produced, out.len());
    String::from_utf8(out).expect("alphabet symbols are ASCII")
}

/// Unpacks `indices.len()` symbol values of `bits` each into whole bytes,
/// MSB-first, discarding any low-order filler bits. Returns the byte count
/// written. `out` must hold `indices.len() * bits / 8` bytes.
pub(crate) fn decode_quantum(indices: &[u8], bits: usize, out: &mut [u8]) -> usize {
    let total_bits = indices.len() * bits;
    let bytes = total_bits / 8;
    let mut acc = 0u64;
    for &v in indices {
        acc = (acc << bits) | u64::from(v);
    }
    for (i, slot) in out[..bytes].iter_mut().enumerate() {
        *slot = ((acc >> (total_bits - 8 * (i + 1))) & 0xFF) as u8;
    }
    bytes
}

fn decode_inner(src: &[u8], out: &mut [u8], alphabet: &Alphabet, flush_tail: bool) -> Progress {
    let gs = alphabet.group_symbols();
    let gb = alphabet.group_bytes();
    let bits = alphabet.bits_per_symbol() as usize;

    let mut group = [0u8; 8];
    let mut have = 0usize;
    let mut consumed = 0usize;
    let mut produced = 0usize;

    for (pos, &b) in src.iter().enumerate() {
        if alphabet.is_padding(b) {
            // Padding closes the final group. Each character the final group
            // is short of drops the bits it would have carried.
            let bytes = have * bits / 8;
            if out.len() - produced < bytes {
                return Progress { consumed, produced };
            }
            produced += decode_quantum(&group[..have], bits, &mut out[produced..]);
            let mut end = pos;
            while end < src.len() && alphabet.is_padding(src[end]) {
                end += 1;
            }
            return Progress { consumed: end, produced };
        }
        // Out-of-alphabet characters (whitespace, separators, bytes >= 0x80)
        // are skipped and do not count toward group boundaries.
        let Some(v) = alphabet.index_of(b) else {
            continue;
        };
        group[have] = v;
        have += 1;
        if have == gs {
            if out.len() - produced < gb {
                return Progress { consumed, produced };
            }
            produced += decode_quantum(&group[..gs], bits, &mut out[produced..]);
            have = 0;
            consumed = pos + 1;
        }
    }

    if have == 0 {
        // Nothing pending; trailing skipped characters are spent.
        consumed = src.len();
    } else if flush_tail {
        let bytes = have * bits / 8;
        if out.len() - produced >= bytes {
            produced += decode_quantum(&group[..have], bits, &mut out[produced..]);
            consumed = src.len();
        }
    }
    Progress { consumed, produced }
}

/// Decodes encoded text into `out`, one whole symbol group at a time.
///
/// A trailing partial group without padding stays unconsumed so a later call
/// can complete it; a padding run terminates the stream and shortens the
/// final group. When `out` is undersized the call stops at a group boundary
/// and reports partial progress.
pub fn decode_into(text: &[u8], out: &mut [u8], alphabet: &Alphabet) -> Progress {
    decode_inner(text, out, alphabet, false)
}

/// Decodes encoded text to bytes.
///
/// Characters outside the alphabet are silently skipped, so whitespace and
/// separators embedded in the text are tolerated. This also means a corrupt
/// symbol is dropped rather than rejected; callers that need strict
/// validation should compare against [`measure_decoded_len`] expectations.
pub fn decode(text: &str, alphabet: &Alphabet) -> Vec<u8> {
    let src = text.as_bytes();
    let mut out = vec![0u8; measure_decoded_bytes(src, alphabet)];
    let progress = decode_inner(src, &mut out, alphabet, true);
    out.truncate(progress.produced);
    out
}
