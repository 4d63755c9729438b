//! Single-operand parsing
//!
//! One textual operand can be a register, a hex or decimal number, or a
//! label. Candidates are tried in a fixed priority order; the first form
//! that matches wins. In an immediate context a leading `$` always means
//! hexadecimal; elsewhere `$t0` is still a register and `$BEEF` is hex.

use crate::compiler::registers;
use crate::compiler::{ErrorKind, LabelTable};
use regex::Regex;
use std::sync::LazyLock;

static MEM_OPERAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(-?\$?\w+)\s*\(\s*(\$?\w+)\s*\)$").unwrap());

static LABEL_SHAPED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z_]\w*$").unwrap());

/// Parse one operand into a 32-bit value. The value is returned signed but
/// is assembled as an unsigned bit pattern.
pub fn parse_operand(
    operand: &str,
    labels: &LabelTable,
    immediate_context: bool,
) -> Result<i32, ErrorKind> {
    let operand = operand.trim();

    // 1. In an immediate context a leading `$` forces hexadecimal.
    if immediate_context {
        if let Some(digits) = operand.strip_prefix('$') {
            return parse_hex(digits).ok_or_else(|| invalid(operand));
        }
    }

    // 2. Register, tolerating stray label sigils around the name.
    if let Some(register) = register_lookup(operand) {
        return Ok(register as i32);
    }

    // 3. `0x`-prefixed hexadecimal.
    if operand.starts_with("0x") || operand.starts_with("0X") {
        return parse_hex(&operand[2..]).ok_or_else(|| invalid(operand));
    }

    // 4. `$`-prefixed hexadecimal outside an immediate context. The full
    // spelling was already tried as a register above.
    if let Some(digits) = operand.strip_prefix('$') {
        return parse_hex(digits).ok_or_else(|| invalid(operand));
    }

    // 5. Decimal.
    if let Ok(value) = operand.parse::<i32>() {
        return Ok(value);
    }

    // 6. Label, bare or wrapped in `:` sigils.
    if let Some(address) = label_lookup(operand, labels) {
        return Ok(address as i32);
    }

    if LABEL_SHAPED.is_match(strip_colons(operand)) {
        Err(ErrorKind::UnresolvedLabel {
            label: strip_colons(operand).to_string(),
        })
    } else {
        Err(invalid(operand))
    }
}

/// Parse a memory operand of the form `offset(base)` into `(imm, rs)`.
/// The offset may be `$`-hex, `0x`-hex, decimal, or a label.
pub fn parse_mem_operand(operand: &str, labels: &LabelTable) -> Result<(i32, u32), ErrorKind> {
    let operand = operand.trim();
    let captures = MEM_OPERAND
        .captures(operand)
        .ok_or_else(|| ErrorKind::InvalidMemoryOperand {
            operand: operand.to_string(),
        })?;
    let offset_text = captures.get(1).unwrap().as_str();
    let base_text = captures.get(2).unwrap().as_str();

    let imm = if let Some(digits) = offset_text.strip_prefix('$') {
        parse_hex(digits).ok_or_else(|| invalid(offset_text))?
    } else if offset_text.starts_with("0x") || offset_text.starts_with("0X") {
        parse_hex(&offset_text[2..]).ok_or_else(|| invalid(offset_text))?
    } else if let Ok(value) = offset_text.parse::<i32>() {
        value
    } else {
        label_lookup(offset_text, labels).map(|a| a as i32).ok_or_else(
            || ErrorKind::UnresolvedLabel {
                label: offset_text.to_string(),
            },
        )?
    };

    let rs = parse_operand(base_text, labels, false)? as u32;
    Ok((imm, rs))
}

fn invalid(operand: &str) -> ErrorKind {
    ErrorKind::InvalidOperand {
        operand: operand.to_string(),
    }
}

fn parse_hex(digits: &str) -> Option<i32> {
    u32::from_str_radix(digits, 16).ok().map(|v| v as i32)
}

// A register operand may carry a stray `:` or `;` from sloppy label
// editing. One leading sigil (plus any trailing ones) or one trailing
// sigil is ignored; anything that still misses the table is not a
// register.
fn register_lookup(operand: &str) -> Option<u32> {
    if let Some(register) = registers::gpr(operand) {
        return Some(register);
    }
    let cleaned = if operand.starts_with([':', ';']) {
        operand[1..].trim_end_matches([':', ';'])
    } else if operand.ends_with([':', ';']) {
        &operand[..operand.len() - 1]
    } else {
        return None;
    };
    registers::gpr(cleaned)
}

fn label_lookup(operand: &str, labels: &LabelTable) -> Option<u32> {
    labels
        .get(operand)
        .or_else(|| labels.get(strip_colons(operand)))
}

fn strip_colons(operand: &str) -> &str {
    let operand = operand.strip_prefix(':').unwrap_or(operand);
    operand.strip_suffix(':').unwrap_or(operand)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> LabelTable {
        let mut table = LabelTable::new();
        table.insert("start", 0x0010_0000);
        table
    }

    #[test]
    fn immediate_context_dollar_is_hex() {
        let table = labels();
        assert_eq!(parse_operand("$10", &table, true), Ok(0x10));
        // `t0` is not a hex digit string, so `$t0` cannot be an immediate.
        assert!(parse_operand("$t0", &table, true).is_err());
    }

    #[test]
    fn register_priority() {
        let table = labels();
        assert_eq!(parse_operand("t0", &table, false), Ok(8));
        assert_eq!(parse_operand("$t0", &table, false), Ok(8));
        assert_eq!(parse_operand("31", &table, false), Ok(31));
    }

    #[test]
    fn hex_forms() {
        let table = labels();
        assert_eq!(parse_operand("0x10", &table, false), Ok(16));
        assert_eq!(parse_operand("$BEEF", &table, false), Ok(0xBEEF));
        assert_eq!(
            parse_operand("$DEADBEEF", &table, true),
            Ok(0xDEADBEEFu32 as i32)
        );
    }

    #[test]
    fn decimal_and_negative() {
        let table = labels();
        assert_eq!(parse_operand("100", &table, false), Ok(100));
        assert_eq!(parse_operand("-4", &table, false), Ok(-4));
    }

    #[test]
    fn labels_with_sigils() {
        let table = labels();
        assert_eq!(parse_operand("start", &table, false), Ok(0x0010_0000));
        assert_eq!(parse_operand(":start", &table, false), Ok(0x0010_0000));
        assert_eq!(parse_operand("START:", &table, false), Ok(0x0010_0000));
        assert!(matches!(
            parse_operand(":nowhere", &table, false),
            Err(ErrorKind::UnresolvedLabel { .. })
        ));
    }

    #[test]
    fn stray_sigil_on_register() {
        let table = labels();
        assert_eq!(parse_operand(":t0", &table, false), Ok(8));
        assert_eq!(parse_operand("t0:", &table, false), Ok(8));
    }

    #[test]
    fn memory_operands() {
        let table = labels();
        assert_eq!(parse_mem_operand("0x10(t1)", &table), Ok((16, 9)));
        assert_eq!(parse_mem_operand("$20(sp)", &table), Ok((32, 29)));
        assert_eq!(parse_mem_operand("-4(sp)", &table), Ok((-4, 29)));
        assert_eq!(parse_mem_operand("start(zero)", &table), Ok((0x0010_0000, 0)));
        assert!(parse_mem_operand("t0", &table).is_err());
    }
}
