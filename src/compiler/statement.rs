//! [Statement] struct: a stripped source line split into mnemonic and operands

use crate::compiler::ErrorKind;

/// An instruction or pseudo-instruction line, split at the first run of
/// whitespace and then on commas.
#[derive(Debug, Clone)]
pub struct Statement<'a> {
    mnemonic: &'a str,
    operands: Vec<&'a str>,
}

impl<'a> Statement<'a> {
    pub fn parse(line: &'a str) -> Statement<'a> {
        let line = line.trim();
        let (mnemonic, rest) = match line.find(char::is_whitespace) {
            Some(split) => (&line[..split], line[split..].trim_start()),
            None => (line, ""),
        };
        let operands = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split(',').map(str::trim).collect()
        };
        Statement { mnemonic, operands }
    }

    pub fn mnemonic(&self) -> &'a str {
        self.mnemonic
    }

    pub fn n_operands(&self) -> usize {
        self.operands.len()
    }

    /// Get the operand at the given index, or a missing-operand error
    /// naming the mnemonic.
    pub fn operand(&self, index: usize) -> Result<&'a str, ErrorKind> {
        self.operands
            .get(index)
            .copied()
            .ok_or_else(|| ErrorKind::MissingOperand {
                mnemonic: self.mnemonic.to_string(),
                expected: index + 1,
                found: self.operands.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_mnemonic_and_operands() {
        let stmt = Statement::parse("addiu t0, t0, 1");
        assert_eq!(stmt.mnemonic(), "addiu");
        assert_eq!(stmt.n_operands(), 3);
        assert_eq!(stmt.operand(1).unwrap(), "t0");
        assert_eq!(stmt.operand(2).unwrap(), "1");
    }

    #[test]
    fn no_operands() {
        let stmt = Statement::parse("syscall");
        assert_eq!(stmt.mnemonic(), "syscall");
        assert_eq!(stmt.n_operands(), 0);
        assert!(stmt.operand(0).is_err());
    }

    #[test]
    fn memory_operand_stays_whole() {
        let stmt = Statement::parse("lw t0, 0x10(t1)");
        assert_eq!(stmt.operand(1).unwrap(), "0x10(t1)");
    }
}
