use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

/// A bare 32-hex token written directly after `"Value":` and followed by
/// either another field or the end of the object.
static BARE_HEX_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"("Value"\s*:\s*)([A-Fa-f0-9]{32})(\s*[,}])"#).expect("static regex must compile")
});

/// Quote unquoted hex `Value` tokens so the payload becomes valid JSON.
///
/// Returns the input unchanged (borrowed) when nothing needs rewriting.
pub fn quote_bare_hex_value(raw: &str) -> Cow<'_, str> {
    BARE_HEX_VALUE.replace_all(raw, r#"${1}"${2}"${3}"#)
}
