//! 128-bit binary decimal carried as 32 hex characters.
//!
//! Layout (four little-endian 32-bit words `w0..w3`):
//! - `w0`, `w1`, `w2`: 96-bit unsigned mantissa, least-significant word first
//! - `w3` bits 16..=23: power-of-ten scale, 0..=28
//! - `w3` bit 31: sign, set for negative values
//!
//! Every other bit of `w3` must be zero.

use super::DecodeError;

/// Number of hex characters in an encoded value.
pub const HEX_TOKEN_LEN: usize = 32;

const MAX_SCALE: u32 = 28;
const SIGN_MASK: u32 = 0x8000_0000;
const SCALE_MASK: u32 = 0x00FF_0000;
const SCALE_SHIFT: u32 = 16;
const MANTISSA_BITS: u32 = 96;

pub fn is_hex_token(s: &str) -> bool {
    s.len() == HEX_TOKEN_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Decode a 32-hex token into its numeric value.
pub fn decode_hex(token: &str) -> Result<f64, DecodeError> {
    let words = hex_to_words(token).ok_or(DecodeError::UnrecognizedEncoding)?;
    words_to_f64(words)
}

fn hex_to_words(token: &str) -> Option<[u32; 4]> {
    if !is_hex_token(token) {
        return None;
    }

    let mut bytes = [0u8; HEX_TOKEN_LEN / 2];
    hex::decode_to_slice(token, &mut bytes).ok()?;

    let mut words = [0u32; 4];
    for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
        *word = u32::from_le_bytes(chunk.try_into().ok()?);
    }
    Some(words)
}

fn words_to_f64(words: [u32; 4]) -> Result<f64, DecodeError> {
    let flags = words[3];
    if flags & !(SIGN_MASK | SCALE_MASK) != 0 {
        return Err(DecodeError::InvalidDecimal);
    }
    let scale = (flags & SCALE_MASK) >> SCALE_SHIFT;
    if scale > MAX_SCALE {
        return Err(DecodeError::InvalidDecimal);
    }

    let mantissa = u128::from(words[0]) | u128::from(words[1]) << 32 | u128::from(words[2]) << 64;

    // Split before narrowing so the integer part is exact.
    let divisor = 10u128.pow(scale);
    let whole = mantissa / divisor;
    let fraction = mantissa % divisor;
    let magnitude = whole as f64 + fraction as f64 / divisor as f64;

    Ok(if flags & SIGN_MASK != 0 { -magnitude } else { magnitude })
}

/// Encode `(-1)^negative * mantissa / 10^scale` as an uppercase 32-hex token.
///
/// Returns `None` when the mantissa needs more than 96 bits or the scale is
/// above 28.
pub fn encode_hex(mantissa: u128, scale: u32, negative: bool) -> Option<String> {
    if mantissa >> MANTISSA_BITS != 0 || scale > MAX_SCALE {
        return None;
    }

    let mut flags = scale << SCALE_SHIFT;
    if negative {
        flags |= SIGN_MASK;
    }
    let words = [mantissa as u32, (mantissa >> 32) as u32, (mantissa >> 64) as u32, flags];
    let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();

    Some(hex::encode_upper(bytes))
}
