//! Chunked block-transform adapters over the core codec.
//!
//! These expose encode/decode through a fixed-input/fixed-output block
//! interface so the codec can sit in a transform pipeline (after a cipher,
//! before a framing layer) that feeds arbitrary chunk sizes. Leftover units
//! that do not complete a group are carried across calls in fixed inline
//! storage, so chunk boundaries never have to align with group boundaries.

use std::fmt;

use crate::alphabet::Alphabet;
use crate::chunked;

/// A chunked transform with fixed input/output unit sizes.
///
/// Callers feed arbitrary-size chunks through
/// [`transform_block`](Self::transform_block) and finish the stream with one
/// [`transform_final_block`](Self::transform_final_block) call, which also
/// resets the transform for reuse.
pub trait BlockTransform {
    /// Smallest input unit that maps to whole output units.
    fn input_block_size(&self) -> usize;
    /// Output units produced per input block.
    fn output_block_size(&self) -> usize;
    /// Whether one call may process several blocks at once.
    fn can_transform_multiple_blocks(&self) -> bool {
        true
    }
    /// Whether the instance may be reused for another stream after
    /// [`transform_final_block`](Self::transform_final_block).
    fn can_reuse_transform(&self) -> bool {
        true
    }
    /// Processes a chunk, returning the bytes written to `output`.
    ///
    /// # Errors
    ///
    /// Fails without writing anything if `output` cannot hold every whole
    /// block this chunk completes.
    fn transform_block(&mut self, input: &[u8], output: &mut [u8])
    -> Result<usize, TransformError>;
    /// Processes the last chunk, flushing any carried units, and resets the
    /// transform. The output is sized exactly; no trailing capacity games.
    fn transform_final_block(&mut self, input: &[u8]) -> Vec<u8>;
}

/// Errors raised by block transform calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformError {
    /// The output buffer cannot hold the blocks this call would produce
    OutputTooSmall { required: usize, available: usize },
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformError::OutputTooSmall {
                required,
                available,
            } => {
                write!(
                    f,
                    "output buffer too small: need {} bytes, have {}",
                    required, available
                )
            }
        }
    }
}

impl std::error::Error for TransformError {}

/// Block transform that encodes bytes to alphabet symbols.
///
/// Input blocks are `group_bytes` wide, output blocks `group_symbols`. Up to
/// `group_bytes - 1` leftover bytes ride along between calls in inline
/// storage.
pub struct EncodeTransform<'a> {
    alphabet: &'a Alphabet,
    carry: [u8; 4],
    carry_len: usize,
}

impl<'a> EncodeTransform<'a> {
    pub fn new(alphabet: &'a Alphabet) -> Self {
        EncodeTransform {
            alphabet,
            carry: [0; 4],
            carry_len: 0,
        }
    }
}

impl BlockTransform for EncodeTransform<'_> {
    fn input_block_size(&self) -> usize {
        self.alphabet.group_bytes()
    }

    fn output_block_size(&self) -> usize {
        self.alphabet.group_symbols()
    }

    fn transform_block(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<usize, TransformError> {
        let gb = self.alphabet.group_bytes();
        let gs = self.alphabet.group_symbols();

        let groups = (self.carry_len + input.len()) / gb;
        let required = groups * gs;
        if output.len() < required {
            return Err(TransformError::OutputTooSmall {
                required,
                available: output.len(),
            });
        }

        let mut read = 0;
        let mut written = 0;

        if self.carry_len > 0 {
            let take = (gb - self.carry_len).min(input.len());
            let mut group = [0u8; 5];
            group[..self.carry_len].copy_from_slice(&self.carry[..self.carry_len]);
            group[self.carry_len..self.carry_len + take].copy_from_slice(&input[..take]);
            if self.carry_len + take < gb {
                // Still not a whole group; keep carrying.
                self.carry[..self.carry_len + take].copy_from_slice(&group[..self.carry_len + take]);
                self.carry_len += take;
                return Ok(0);
            }
            let progress = chunked::encode_into(&group[..gb], &mut output[..gs], self.alphabet);
            written += progress.produced;
            read = take;
            self.carry_len = 0;
        }

        let usable = (input.len() - read) / gb * gb;
        let progress =
            chunked::encode_into(&input[read..read + usable], &mut output[written..], self.alphabet);
        written += progress.produced;
        read += progress.consumed;

        let rest = &input[read..];
        self.carry[..rest.len()].copy_from_slice(rest);
        self.carry_len = rest.len();

        Ok(written)
    }

    fn transform_final_block(&mut self, input: &[u8]) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.carry_len + input.len());
        data.extend_from_slice(&self.carry[..self.carry_len]);
        data.extend_from_slice(input);
        self.carry_len = 0;
        chunked::encode(&data, self.alphabet).into_bytes()
    }
}

/// Block transform that decodes alphabet symbols back to bytes.
///
/// Input blocks are `group_symbols` wide, output blocks `group_bytes`.
/// Characters outside the alphabet are skipped as in [`decode`](crate::decode); a
/// padding character ends the stream, and everything after it is ignored
/// until the transform is reset by `transform_final_block`.
pub struct DecodeTransform<'a> {
    alphabet: &'a Alphabet,
    // pending symbol values for the current group; full groups flush inline
    carry: [u8; 8],
    carry_len: usize,
    finished: bool,
}

impl<'a> DecodeTransform<'a> {
    pub fn new(alphabet: &'a Alphabet) -> Self {
        DecodeTransform {
            alphabet,
            carry: [0; 8],
            carry_len: 0,
            finished: false,
        }
    }

    /// Decoded bytes this chunk will produce, given the current carry.
    fn measure(&self, input: &[u8], flush_tail: bool) -> usize {
        let gs = self.alphabet.group_symbols();
        let gb = self.alphabet.group_bytes();
        let bits = self.alphabet.bits_per_symbol() as usize;

        let mut symbols = self.carry_len;
        let mut padded = false;
        for &b in input {
            if self.alphabet.is_padding(b) {
                padded = true;
                break;
            }
            if self.alphabet.index_of(b).is_some() {
                symbols += 1;
            }
        }
        let mut bytes = (symbols / gs) * gb;
        if padded || flush_tail {
            bytes += (symbols % gs) * bits / 8;
        }
        bytes
    }

    /// Runs the group loop, writing into `out`. The caller guarantees `out`
    /// holds what [`measure`](Self::measure) reported.
    fn drain(&mut self, input: &[u8], out: &mut [u8], flush_tail: bool) -> usize {
        let gs = self.alphabet.group_symbols();
        let bits = self.alphabet.bits_per_symbol() as usize;

        let mut written = 0;
        for &b in input {
            if self.alphabet.is_padding(b) {
                written +=
                    chunked::decode_quantum(&self.carry[..self.carry_len], bits, &mut out[written..]);
                self.carry_len = 0;
                self.finished = true;
                break;
            }
            let Some(v) = self.alphabet.index_of(b) else {
                continue;
            };
            self.carry[self.carry_len] = v;
            self.carry_len += 1;
            if self.carry_len == gs {
                written += chunked::decode_quantum(&self.carry[..gs], bits, &mut out[written..]);
                self.carry_len = 0;
            }
        }

        if flush_tail && self.carry_len > 0 {
            written +=
                chunked::decode_quantum(&self.carry[..self.carry_len], bits, &mut out[written..]);
            self.carry_len = 0;
        }
        written
    }
}

impl BlockTransform for DecodeTransform<'_> {
    fn input_block_size(&self) -> usize {
        self.alphabet.group_symbols()
    }

    fn output_block_size(&self) -> usize {
        self.alphabet.group_bytes()
    }

    fn transform_block(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<usize, TransformError> {
        if self.finished {
            return Ok(0);
        }
        let required = self.measure(input, false);
        if output.len() < required {
            return Err(TransformError::OutputTooSmall {
                required,
                available: output.len(),
            });
        }
        Ok(self.drain(input, output, false))
    }

    fn transform_final_block(&mut self, input: &[u8]) -> Vec<u8> {
        if self.finished {
            self.finished = false;
            self.carry_len = 0;
            return Vec::new();
        }
        let mut out = vec![0u8; self.measure(input, true)];
        let written = self.drain(input, &mut out, true);
        out.truncate(written);
        self.finished = false;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::{BASE32, BASE64, ZBASE32};
    use crate::chunked::{decode, encode};

    #[test]
    fn test_encode_transform_block_sizes() {
        let transform = EncodeTransform::new(&BASE64);
        assert_eq!(transform.input_block_size(), 3);
        assert_eq!(transform.output_block_size(), 4);
        assert!(transform.can_transform_multiple_blocks());
        assert!(transform.can_reuse_transform());

        let transform = DecodeTransform::new(&BASE32);
        assert_eq!(transform.input_block_size(), 8);
        assert_eq!(transform.output_block_size(), 5);
    }

    #[test]
    fn test_encode_transform_misaligned_chunks() {
        let data = b"The quick brown fox jumps over the lazy dog";
        let expected = encode(data, &BASE64);

        // Chunk sizes deliberately avoid the 3-byte group size.
        for chunk_size in [1, 2, 4, 5, 7, 11] {
            let mut transform = EncodeTransform::new(&BASE64);
            let mut result = Vec::new();
            let mut buf = [0u8; 64];
            let mut chunks = data.chunks(chunk_size).peekable();
            while let Some(chunk) = chunks.next() {
                if chunks.peek().is_some() {
                    let n = transform.transform_block(chunk, &mut buf).unwrap();
                    result.extend_from_slice(&buf[..n]);
                } else {
                    result.extend_from_slice(&transform.transform_final_block(chunk));
                }
            }
            assert_eq!(
                String::from_utf8(result).unwrap(),
                expected,
                "chunk size {} diverged",
                chunk_size
            );
        }
    }

    #[test]
    fn test_encode_transform_base32_carry() {
        // Base32 carries up to 4 bytes between calls.
        let data = b"carry me across group boundaries";
        let expected = encode(data, &BASE32);

        let mut transform = EncodeTransform::new(&BASE32);
        let mut result = Vec::new();
        let mut buf = [0u8; 64];
        let n = transform.transform_block(&data[..3], &mut buf).unwrap();
        assert_eq!(n, 0); // 3 bytes is less than a 5-byte group
        let n = transform.transform_block(&data[3..9], &mut buf).unwrap();
        result.extend_from_slice(&buf[..n]);
        result.extend_from_slice(&transform.transform_final_block(&data[9..]));
        assert_eq!(String::from_utf8(result).unwrap(), expected);
    }

    #[test]
    fn test_decode_transform_misaligned_chunks() {
        let data: Vec<u8> = (0u8..=255).collect();
        let encoded = encode(&data, &BASE64);
        let text = encoded.as_bytes();

        for chunk_size in [1, 3, 5, 7, 13] {
            let mut transform = DecodeTransform::new(&BASE64);
            let mut result = Vec::new();
            let mut buf = [0u8; 256];
            let mut chunks = text.chunks(chunk_size).peekable();
            while let Some(chunk) = chunks.next() {
                if chunks.peek().is_some() {
                    let n = transform.transform_block(chunk, &mut buf).unwrap();
                    result.extend_from_slice(&buf[..n]);
                } else {
                    result.extend_from_slice(&transform.transform_final_block(chunk));
                }
            }
            assert_eq!(result, data, "chunk size {} diverged", chunk_size);
        }
    }

    #[test]
    fn test_decode_transform_skips_whitespace() {
        let mut transform = DecodeTransform::new(&BASE64);
        let mut buf = [0u8; 32];
        let n = transform
            .transform_block(b"SGVs bG8s\nIFdv", &mut buf)
            .unwrap();
        let mut result = buf[..n].to_vec();
        result.extend_from_slice(&transform.transform_final_block(b"cmxk IQ=="));
        assert_eq!(result, b"Hello, World!");
    }

    #[test]
    fn test_decode_transform_ignores_input_after_padding() {
        let mut transform = DecodeTransform::new(&BASE64);
        let mut buf = [0u8; 32];
        let n = transform.transform_block(b"eg==", &mut buf).unwrap();
        assert_eq!(&buf[..n], &[122]);
        // Stream is closed; further blocks decode to nothing.
        let n = transform.transform_block(b"SGVs", &mut buf).unwrap();
        assert_eq!(n, 0);
        assert_eq!(transform.transform_final_block(b""), Vec::<u8>::new());
    }

    #[test]
    fn test_transform_reuse_after_final_block() {
        let mut transform = EncodeTransform::new(&ZBASE32);
        let first = transform.transform_final_block(&[244]);
        let second = transform.transform_final_block(&[244]);
        assert_eq!(first, second);

        let mut transform = DecodeTransform::new(&BASE64);
        let first = transform.transform_final_block(b"eg==");
        let second = transform.transform_final_block(b"eg==");
        assert_eq!(first, vec![122]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_transform_output_too_small() {
        let mut transform = EncodeTransform::new(&BASE64);
        let mut buf = [0u8; 3];
        let err = transform.transform_block(b"abc", &mut buf).unwrap_err();
        assert_eq!(
            err,
            TransformError::OutputTooSmall {
                required: 4,
                available: 3
            }
        );
        // Nothing was consumed; a properly sized call still works.
        let mut buf = [0u8; 4];
        let n = transform.transform_block(b"abc", &mut buf).unwrap();
        assert_eq!(n, 4);
        assert_eq!(decode(std::str::from_utf8(&buf).unwrap(), &BASE64), b"abc");
    }

    #[test]
    fn test_decode_transform_output_too_small() {
        let mut transform = DecodeTransform::new(&BASE64);
        let mut buf = [0u8; 2];
        let err = transform.transform_block(b"SGVs", &mut buf).unwrap_err();
        assert_eq!(
            err,
            TransformError::OutputTooSmall {
                required: 3,
                available: 2
            }
        );
    }
}
