//! Decoding of the `Value` field of a raw reading payload.
//!
//! The upstream producer writes the same quantity in one of three shapes:
//!
//! - a JSON number: `{"Value": 12.5}`
//! - a 32-hex binary decimal, quoted or bare: `{"Value": "39300000000000000000000000000200"}`
//! - a decimal string: `{"Value": "12.5"}`
//!
//! Anything else is a decode failure. Failures never panic; callers that only
//! care about success use [`decode`], diagnostics use [`try_decode`].

pub mod fixed_point;
pub mod normalize;

use serde_json::Value;

const VALUE_FIELD: &str = "Value";

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeError {
    #[error("payload has no Value field")]
    MissingField,
    #[error("payload is not a well-formed JSON object")]
    MalformedEnvelope,
    #[error("Value is neither a number, a hex decimal nor a decimal string")]
    UnrecognizedEncoding,
    #[error("hex token is not a valid binary decimal")]
    InvalidDecimal,
}

impl DecodeError {
    /// Stable snake_case label, used as a log field and table row name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::MalformedEnvelope => "malformed_envelope",
            Self::UnrecognizedEncoding => "unrecognized_encoding",
            Self::InvalidDecimal => "invalid_decimal",
        }
    }
}

/// The `Value` field after classification.
///
/// Classification order is fixed: number, then hex token, then decimal text.
/// A string that is both a valid hex token and a valid decimal (32 digits) is
/// therefore always `Hex`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EncodedValue<'a> {
    Number(f64),
    Hex(&'a str),
    DecimalText(&'a str),
}

impl<'a> EncodedValue<'a> {
    pub fn classify(value: &'a Value) -> Result<Self, DecodeError> {
        match value {
            Value::Null => Err(DecodeError::MissingField),
            Value::Number(n) => n.as_f64().map(Self::Number).ok_or(DecodeError::UnrecognizedEncoding),
            Value::String(s) => {
                let trimmed = s.trim();
                if fixed_point::is_hex_token(trimmed) {
                    Ok(Self::Hex(trimmed))
                } else {
                    Ok(Self::DecimalText(trimmed))
                }
            }
            Value::Bool(_) | Value::Array(_) | Value::Object(_) => Err(DecodeError::UnrecognizedEncoding),
        }
    }

    pub fn to_f64(self) -> Result<f64, DecodeError> {
        match self {
            Self::Number(v) => Ok(v),
            Self::Hex(token) => fixed_point::decode_hex(token),
            Self::DecimalText(text) => text
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or(DecodeError::UnrecognizedEncoding),
        }
    }
}

/// Decode a raw payload, reporting why it failed.
pub fn try_decode(raw_json: &str) -> Result<f64, DecodeError> {
    let normalized = normalize::quote_bare_hex_value(raw_json);
    let envelope: Value =
        serde_json::from_str(&normalized).map_err(|_| DecodeError::MalformedEnvelope)?;
    let fields = envelope.as_object().ok_or(DecodeError::MalformedEnvelope)?;
    let value = fields.get(VALUE_FIELD).ok_or(DecodeError::MissingField)?;

    EncodedValue::classify(value)?.to_f64()
}

/// Decode a raw payload; `None` on any failure.
pub fn decode(raw_json: &str) -> Option<f64> {
    try_decode(raw_json).ok()
}
