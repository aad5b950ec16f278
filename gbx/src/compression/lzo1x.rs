//! LZO1X decompression
//!
//! Decoder for the LZO1X-1 stream format used for GBX bodies. Every input and
//! back-reference access is bounds checked; the output may never grow past the
//! declared length.
//!
//! Stream grammar, by opcode byte `t`:
//! - first byte > 17: literal run of `t - 17` bytes
//! - `t < 16` after a match: M1 match, 2 bytes (3 after a literal run)
//! - `16 <= t < 32`: M4 match, distance up to 48 KiB; distance 0 ends the stream
//! - `32 <= t < 64`: M3 match, distance up to 16 KiB
//! - `t >= 64`: M2 match, distance up to 2 KiB
//!
//! The low two bits of the byte two positions before the end of each match give the
//! number of trailing literals (0 to 3) copied before the next opcode.

use crate::error::{Error, Result};

const CODEC: &str = "lzo1x";

/// Decompress an LZO1X stream that must produce exactly `expected_len` bytes
///
/// # Arguments
/// * `input` - Compressed bytes, including the end-of-stream marker
/// * `expected_len` - Declared uncompressed length
///
/// # Returns
/// The decompressed bytes
pub fn decompress_lzo1x(input: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let mut decoder = Decoder {
        input,
        ip: 0,
        out: Vec::with_capacity(expected_len),
        expected_len,
    };
    decoder.run()?;

    if decoder.ip != input.len() {
        return Err(corrupt(format!(
            "{} trailing bytes after end of stream",
            input.len() - decoder.ip
        )));
    }

    if decoder.out.len() != expected_len {
        return Err(Error::CompressedSizeMismatch {
            expected: expected_len,
            actual: decoder.out.len(),
        });
    }

    Ok(decoder.out)
}

/// Position in the decoding state machine
#[derive(Debug, Clone, Copy)]
enum Step {
    /// Expecting a literal run or a match opcode
    Literal,
    /// Just after a literal run; short opcodes are 3-byte matches
    FirstLiteralRun,
    /// Decoding the match opcode `t`
    Match(usize),
    /// Copy `t` trailing literals, then read the next match opcode
    MatchNext(usize),
}

struct Decoder<'a> {
    input: &'a [u8],
    ip: usize,
    out: Vec<u8>,
    expected_len: usize,
}

impl Decoder<'_> {
    fn run(&mut self) -> Result<()> {
        let mut step = Step::Literal;

        if let Some(&first) = self.input.first()
            && first > 17
        {
            self.ip = 1;
            let t = (first - 17) as usize;
            if t < 4 {
                step = Step::MatchNext(t);
            } else {
                self.copy_literals(t)?;
                step = Step::FirstLiteralRun;
            }
        }

        loop {
            step = match step {
                Step::Literal => {
                    let mut t = self.next()? as usize;
                    if t >= 16 {
                        Step::Match(t)
                    } else {
                        if t == 0 {
                            t = 15 + self.extended_length()?;
                        }
                        self.copy_literals(t + 3)?;
                        Step::FirstLiteralRun
                    }
                }
                Step::FirstLiteralRun => {
                    let t = self.next()? as usize;
                    if t >= 16 {
                        Step::Match(t)
                    } else {
                        let distance = 0x801 + (t >> 2) + ((self.next()? as usize) << 2);
                        self.copy_match(distance, 3)?;
                        self.match_done()
                    }
                }
                Step::Match(t) => {
                    if t >= 64 {
                        let distance = 1 + ((t >> 2) & 7) + ((self.next()? as usize) << 3);
                        self.copy_match(distance, (t >> 5) + 1)?;
                    } else if t >= 32 {
                        let mut len = t & 31;
                        if len == 0 {
                            len = 31 + self.extended_length()?;
                        }
                        let distance = 1 + self.short_distance()?;
                        self.copy_match(distance, len + 2)?;
                    } else if t >= 16 {
                        let high = (t & 8) << 11;
                        let mut len = t & 7;
                        if len == 0 {
                            len = 7 + self.extended_length()?;
                        }
                        let distance = high + self.short_distance()?;
                        if distance == 0 {
                            return Ok(());
                        }
                        self.copy_match(distance + 0x4000, len + 2)?;
                    } else {
                        let distance = 1 + (t >> 2) + ((self.next()? as usize) << 2);
                        self.copy_match(distance, 2)?;
                    }
                    self.match_done()
                }
                Step::MatchNext(t) => {
                    self.copy_literals(t)?;
                    Step::Match(self.next()? as usize)
                }
            };
        }
    }

    fn next(&mut self) -> Result<u8> {
        let byte = *self
            .input
            .get(self.ip)
            .ok_or_else(|| corrupt(format!("input overrun at {}", self.ip)))?;
        self.ip += 1;
        Ok(byte)
    }

    /// Run of zero bytes (255 each) terminated by a non-zero byte
    fn extended_length(&mut self) -> Result<usize> {
        let mut len = 0usize;
        loop {
            let byte = self.next()?;
            if byte != 0 {
                return Ok(len + byte as usize);
            }
            len += 255;
        }
    }

    /// Two-byte little-endian distance field, low two bits reserved for the literal count
    fn short_distance(&mut self) -> Result<usize> {
        let b0 = self.next()? as usize;
        let b1 = self.next()? as usize;
        Ok((b0 >> 2) + (b1 << 6))
    }

    fn match_done(&self) -> Step {
        // ip >= 2 here: every match consumes at least an opcode and one more byte
        let t = (self.input[self.ip - 2] & 3) as usize;
        if t == 0 {
            Step::Literal
        } else {
            Step::MatchNext(t)
        }
    }

    fn reserve(&self, n: usize) -> Result<()> {
        let actual = self.out.len() + n;
        if actual > self.expected_len {
            return Err(Error::CompressedSizeMismatch {
                expected: self.expected_len,
                actual,
            });
        }
        Ok(())
    }

    fn copy_literals(&mut self, n: usize) -> Result<()> {
        let end = self.ip + n;
        if end > self.input.len() {
            return Err(corrupt(format!(
                "literal run of {n} bytes overruns input at {}",
                self.ip
            )));
        }
        self.reserve(n)?;
        self.out.extend_from_slice(&self.input[self.ip..end]);
        self.ip = end;
        Ok(())
    }

    fn copy_match(&mut self, distance: usize, len: usize) -> Result<()> {
        if distance > self.out.len() {
            return Err(corrupt(format!(
                "match distance {distance} exceeds {} decoded bytes",
                self.out.len()
            )));
        }
        self.reserve(len)?;
        // Byte-wise: source and destination may overlap
        let start = self.out.len() - distance;
        for i in 0..len {
            let byte = self.out[start + i];
            self.out.push(byte);
        }
        Ok(())
    }
}

fn corrupt(reason: String) -> Error {
    Error::CorruptCompressedData {
        codec: CODEC,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_only() {
        let data = [22, b'h', b'e', b'l', b'l', b'o', 0x11, 0, 0];
        assert_eq!(decompress_lzo1x(&data, 5).unwrap(), b"hello");
    }

    #[test]
    fn test_m3_overlapping_match() {
        let data = [20, b'a', b'b', b'c', 39, 8, 0, 0x11, 0, 0];
        assert_eq!(decompress_lzo1x(&data, 12).unwrap(), b"abcabcabcabc");
    }

    #[test]
    fn test_m2_match_after_literal_run() {
        let data = [21, b'a', b'b', b'c', b'd', 108, 0, 0x11, 0, 0];
        assert_eq!(decompress_lzo1x(&data, 8).unwrap(), b"abcdabcd");
    }

    #[test]
    fn test_long_literal_run() {
        // opcode 0 + extension byte: 15 + 5 + 3 = 23 literals
        let mut data = vec![0u8, 5];
        data.extend(b'a'..b'a' + 23);
        data.extend_from_slice(&[0x11, 0, 0]);
        let out = decompress_lzo1x(&data, 23).unwrap();
        assert_eq!(out.len(), 23);
        assert_eq!(out[22], b'a' + 22);
    }

    #[test]
    fn test_far_m4_match_then_m1_after_match() {
        let literals: Vec<u8> = (0..20_000u32)
            .map(|i| (i.wrapping_mul(2_654_435_761) >> 24) as u8)
            .collect();

        // 20000 literals: opcode 0, 78 zero bytes, then 92 (15 + 78 * 255 + 92 + 3)
        let mut data = vec![0u8; 79];
        data.push(92);
        data.extend_from_slice(&literals);
        // M4: length 5, distance 0x4000 + 1616, two trailing literals
        data.extend_from_slice(&[16 | 3, (16 << 2) | 2, 25]);
        data.extend_from_slice(b"xy");
        // M1 after a match: length 2, distance 3
        data.extend_from_slice(&[2 << 2, 0]);
        data.extend_from_slice(&[0x11, 0, 0]);

        let mut expected = literals.clone();
        expected.extend_from_within(2000..2005);
        expected.extend_from_slice(b"xy");
        let n = expected.len();
        expected.extend_from_within(n - 3..n - 1);

        let out = decompress_lzo1x(&data, expected.len()).unwrap();
        assert_eq!(out.len(), 20_009);
        assert_eq!(out, expected);
    }

    #[test]
    fn test_empty_stream() {
        assert!(decompress_lzo1x(&[0x11, 0, 0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_declared_length_too_large() {
        let data = [22, b'h', b'e', b'l', b'l', b'o', 0x11, 0, 0];
        assert!(matches!(
            decompress_lzo1x(&data, 6),
            Err(Error::CompressedSizeMismatch {
                expected: 6,
                actual: 5
            })
        ));
    }

    #[test]
    fn test_output_overrun_is_size_mismatch() {
        let data = [20, b'a', b'b', b'c', 39, 8, 0, 0x11, 0, 0];
        assert!(matches!(
            decompress_lzo1x(&data, 4),
            Err(Error::CompressedSizeMismatch { expected: 4, .. })
        ));
    }

    #[test]
    fn test_truncated_input() {
        let data = [22, b'h', b'e', b'l'];
        assert!(matches!(
            decompress_lzo1x(&data, 5),
            Err(Error::CorruptCompressedData { codec: "lzo1x", .. })
        ));
    }

    #[test]
    fn test_match_before_output_start() {
        // M2 match with distance 4 but only 3 bytes decoded
        let data = [20, b'a', b'b', b'c', 108, 0, 0x11, 0, 0];
        assert!(matches!(
            decompress_lzo1x(&data, 7),
            Err(Error::CorruptCompressedData { .. })
        ));
    }

    #[test]
    fn test_trailing_input_rejected() {
        let data = [22, b'h', b'e', b'l', b'l', b'o', 0x11, 0, 0, 0xFF];
        assert!(matches!(
            decompress_lzo1x(&data, 5),
            Err(Error::CorruptCompressedData { .. })
        ));
    }
}
