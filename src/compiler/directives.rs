//! Data directives: `address`, `print`, `hexcode` and `float`
//!
//! `setreg` is a pseudo-instruction and lives in the opcode table; label
//! definitions are handled by the driver. Everything here produces either
//! a new location counter or raw 32-bit words.

use crate::compiler::{ErrorKind, LabelTable};
use byteorder::{ByteOrder, LittleEndian};
use regex::Regex;
use std::sync::LazyLock;

static PRINT_STRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)^print\s+"(.*)"$"#).unwrap());

/// Parse the argument of an `address` directive: hex digits, optionally
/// behind `$` or `0x`.
pub fn parse_address(argument: &str) -> Result<u32, ErrorKind> {
    let text = argument.trim();
    let digits = text
        .strip_prefix('$')
        .or_else(|| text.strip_prefix("0x"))
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u32::from_str_radix(digits, 16).map_err(|_| ErrorKind::InvalidAddress {
        value: text.to_string(),
    })
}

/// Encode a whole `print` line into words. The string is unescaped,
/// encoded as ISO-8859-1, zero-padded to a multiple of four bytes and
/// chunked into little-endian words. Both passes call this; pass 1 keeps
/// only the word count.
pub fn print_words(line: &str) -> Result<Vec<u32>, ErrorKind> {
    let captures = PRINT_STRING
        .captures(line.trim())
        .ok_or(ErrorKind::MalformedPrint)?;
    let text = unescape(captures.get(1).unwrap().as_str());

    let mut bytes: Vec<u8> = text.chars().map(latin1_byte).collect();
    while bytes.len() % 4 != 0 {
        bytes.push(0);
    }
    Ok(bytes.chunks(4).map(LittleEndian::read_u32).collect())
}

/// Encode a `hexcode` argument into one word. Accepts `$`-hex, `0x`-hex,
/// a `:label` reference, a decimal, or a bare label. Hex arguments longer
/// than eight digits keep their low eight.
pub fn hexcode_word(argument: &str, labels: &LabelTable) -> Result<u32, ErrorKind> {
    let text = argument.trim();
    if let Some(digits) = text.strip_prefix('$') {
        return hex_low8(digits);
    }
    if let Some(digits) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return hex_low8(digits);
    }
    if let Some(label) = text.strip_prefix(':') {
        return labels.get(label).ok_or_else(|| ErrorKind::UnresolvedLabel {
            label: label.to_string(),
        });
    }
    if let Ok(value) = text.parse::<i32>() {
        return Ok(value as u32);
    }
    labels.get(text).ok_or_else(|| ErrorKind::InvalidLiteral {
        value: text.to_string(),
    })
}

/// Encode a `float` argument into its IEEE-754 single-precision bits.
pub fn float_word(argument: &str) -> Result<u32, ErrorKind> {
    let text = argument.trim();
    let number = text.strip_prefix('$').unwrap_or(text);
    number
        .parse::<f32>()
        .map(f32::to_bits)
        .map_err(|_| ErrorKind::InvalidLiteral {
            value: text.to_string(),
        })
}

fn hex_low8(digits: &str) -> Result<u32, ErrorKind> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ErrorKind::InvalidLiteral {
            value: digits.to_string(),
        });
    }
    let digits = if digits.len() > 8 {
        &digits[digits.len() - 8..]
    } else {
        digits
    };
    u32::from_str_radix(digits, 16).map_err(|_| ErrorKind::InvalidLiteral {
        value: digits.to_string(),
    })
}

fn latin1_byte(c: char) -> u8 {
    if (c as u32) <= 0xFF { c as u8 } else { b'?' }
}

// Only `\n`, `\t` and `\"` are escapes; any other backslash pair is
// passed through unchanged.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
