//! Per-family instruction encoders
//!
//! Every encoder returns the words a statement assembles to, most often
//! exactly one. The two pseudo-instructions are the exception: `setreg`
//! expands to a `lui`/`ori` pair and `b` to an unconditional `beq`.

use crate::compiler::opcodes::{Family, OpInfo};
use crate::compiler::operands::{parse_mem_operand, parse_operand};
use crate::compiler::registers;
use crate::compiler::statement::Statement;
use crate::compiler::{ErrorKind, LabelTable};

const OP_LUI: u32 = 0x0F;
const OP_ORI: u32 = 0x0D;
const OP_BEQ: u32 = 0x04;

/// Assemble one statement at the given address.
pub fn encode(
    stmt: &Statement,
    info: &OpInfo,
    labels: &LabelTable,
    address: u32,
) -> Result<Vec<u32>, ErrorKind> {
    let word = match info.family {
        Family::R => {
            // `jr rs` and friends take a single register.
            if stmt.n_operands() == 1 {
                let rs = gpr(stmt, 0, labels)?;
                r_word(info.opcode, rs, 0, 0, 0, info.funct)
            } else {
                let rd = gpr(stmt, 0, labels)?;
                let rs = gpr(stmt, 1, labels)?;
                let rt = gpr(stmt, 2, labels)?;
                r_word(info.opcode, rs, rt, rd, 0, info.funct)
            }
        }
        Family::RJalr => match stmt.n_operands() {
            1 => r_word(0, gpr(stmt, 0, labels)?, 0, 31, 0, info.funct),
            2 => {
                let rd = gpr(stmt, 0, labels)?;
                let rs = gpr(stmt, 1, labels)?;
                r_word(0, rs, 0, rd, 0, info.funct)
            }
            found => {
                return Err(ErrorKind::WrongOperandCount {
                    mnemonic: stmt.mnemonic().to_string(),
                    found,
                    expected: vec![1, 2],
                });
            }
        },
        Family::RShift | Family::RShiftPlus32 => {
            let rd = gpr(stmt, 0, labels)?;
            let rt = gpr(stmt, 1, labels)?;
            let shamt = imm(stmt, 2, labels)? & 0x1F;
            r_word(0, 0, rt, rd, shamt, info.funct)
        }
        Family::RShiftV => {
            let rd = gpr(stmt, 0, labels)?;
            let rt = gpr(stmt, 1, labels)?;
            let rs = gpr(stmt, 2, labels)?;
            r_word(0, rs, rt, rd, 0, info.funct)
        }
        Family::RMultDiv => match stmt.n_operands() {
            2 => {
                let rs = gpr(stmt, 0, labels)?;
                let rt = gpr(stmt, 1, labels)?;
                r_word(info.opcode, rs, rt, 0, 0, info.funct)
            }
            3 => {
                let rd = gpr(stmt, 0, labels)?;
                let rs = gpr(stmt, 1, labels)?;
                let rt = gpr(stmt, 2, labels)?;
                r_word(info.opcode, rs, rt, rd, 0, info.funct)
            }
            found => {
                return Err(ErrorKind::WrongOperandCount {
                    mnemonic: stmt.mnemonic().to_string(),
                    found,
                    expected: vec![2, 3],
                });
            }
        },
        Family::RMfhiMflo => r_word(0, 0, 0, gpr(stmt, 0, labels)?, 0, info.funct),
        Family::RMthiMtlo => r_word(0, gpr(stmt, 0, labels)?, 0, 0, 0, info.funct),
        Family::RSyscallBreak | Family::RSync => {
            let code = if stmt.n_operands() == 0 {
                0
            } else {
                imm(stmt, 0, labels)? & 0xF_FFFF
            };
            (code << 6) | info.funct
        }
        Family::REret => (0x10 << 26) | (1 << 25) | 0x18,
        Family::I => encode_i(stmt, info, labels)?,
        Family::ILdSd => {
            let rt = gpr(stmt, 0, labels)?;
            let (offset, rs) = parse_mem_operand(stmt.operand(1)?, labels)?;
            i_word(info.opcode, rs, rt, offset as u32)
        }
        Family::IBranch | Family::IBranchLikely => {
            let rs = gpr(stmt, 0, labels)?;
            let rt = gpr(stmt, 1, labels)?;
            let offset = branch_offset(stmt.operand(2)?, labels, address)?;
            i_word(info.opcode, rs, rt, offset)
        }
        Family::IBranchRsZero => {
            let rs = gpr(stmt, 0, labels)?;
            let offset = branch_offset(stmt.operand(1)?, labels, address)?;
            i_word(info.opcode, rs, 0, offset)
        }
        Family::IBranchRsRtFmt => {
            let rs = gpr(stmt, 0, labels)?;
            let offset = branch_offset(stmt.operand(1)?, labels, address)?;
            i_word(info.opcode, rs, info.rt_field, offset)
        }
        Family::Cop0Mov => {
            let rt = gpr(stmt, 0, labels)?;
            let rd = gpr(stmt, 1, labels)?;
            (info.opcode << 26) | (info.cop_op << 21) | (rt << 16) | (rd << 11)
        }
        Family::IFpuLs => {
            let ft = fpr(stmt, 0)?;
            let (offset, rs) = parse_mem_operand(stmt.operand(1)?, labels)?;
            i_word(info.opcode, rs, ft, offset as u32)
        }
        Family::FpuMov => encode_fpu_mov(stmt, info, labels)?,
        Family::FpuR => {
            let fd = fpr(stmt, 0)?;
            let fs = fpr(stmt, 1)?;
            let ft = fpr(stmt, 2)?;
            fpu_word(info.fmt, ft, fs, fd, info.funct)
        }
        Family::FpuRUn => {
            let fd = fpr(stmt, 0)?;
            let fs = fpr(stmt, 1)?;
            // The EE square root reads its operand from ft; when source
            // and destination coincide the register moves to the ft slot.
            if fd == fs && stmt.mnemonic().eq_ignore_ascii_case("sqrt.s") {
                fpu_word(info.fmt, fd, 0, fd, info.funct)
            } else {
                fpu_word(info.fmt, 0, fs, fd, info.funct)
            }
        }
        Family::FpuCvt => {
            let fd = fpr(stmt, 0)?;
            let fs = fpr(stmt, 1)?;
            fpu_word(info.fmt, 0, fs, fd, info.funct)
        }
        Family::FpuCmp => {
            let fs = fpr(stmt, 0)?;
            let ft = fpr(stmt, 1)?;
            fpu_word(info.fmt, ft, fs, 0, info.funct)
        }
        Family::FpuBranch => {
            let offset = branch_offset(stmt.operand(0)?, labels, address)?;
            (info.opcode << 26) | (info.fmt << 21) | (info.cc_bit << 16) | offset
        }
        Family::J => {
            let target = parse_operand(stmt.operand(0)?, labels, false)? as u32;
            (info.opcode << 26) | ((target >> 2) & 0x03FF_FFFF)
        }
        Family::Custom => info.custom,
        Family::PseudoSetReg => {
            let rd = gpr(stmt, 0, labels)?;
            let value = parse_operand(stmt.operand(1)?, labels, true)? as u32;
            return Ok(vec![
                i_word(OP_LUI, 0, rd, value >> 16),
                i_word(OP_ORI, rd, rd, value & 0xFFFF),
            ]);
        }
        Family::PseudoBranch => {
            let offset = branch_offset(stmt.operand(0)?, labels, address)?;
            i_word(OP_BEQ, 0, 0, offset)
        }
    };
    Ok(vec![word])
}

// opcode | rs | rt | rd | shamt | funct
fn r_word(opcode: u32, rs: u32, rt: u32, rd: u32, shamt: u32, funct: u32) -> u32 {
    (opcode << 26) | (rs << 21) | (rt << 16) | (rd << 11) | ((shamt & 0x1F) << 6) | funct
}

// opcode | rs | rt | imm16
fn i_word(opcode: u32, rs: u32, rt: u32, imm: u32) -> u32 {
    (opcode << 26) | (rs << 21) | (rt << 16) | (imm & 0xFFFF)
}

// 0x11 | fmt | ft | fs | fd | funct
fn fpu_word(fmt: u32, ft: u32, fs: u32, fd: u32, funct: u32) -> u32 {
    (0x11 << 26) | (fmt << 21) | (ft << 16) | (fs << 11) | (fd << 6) | funct
}

fn encode_i(stmt: &Statement, info: &OpInfo, labels: &LabelTable) -> Result<u32, ErrorKind> {
    if stmt.n_operands() >= 3 {
        let rt = gpr(stmt, 0, labels)?;
        let rs = gpr(stmt, 1, labels)?;
        let value = imm(stmt, 2, labels)?;
        return Ok(i_word(info.opcode, rs, rt, value));
    }
    let rt = gpr(stmt, 0, labels)?;
    let second = stmt.operand(1)?;
    if second.contains('(') {
        let (offset, rs) = parse_mem_operand(second, labels)?;
        Ok(i_word(info.opcode, rs, rt, offset as u32))
    } else {
        // `lui rt, imm` and other two-operand forms leave rs at zero.
        let value = parse_operand(second, labels, true)? as u32;
        Ok(i_word(info.opcode, 0, rt, value))
    }
}

fn encode_fpu_mov(stmt: &Statement, info: &OpInfo, labels: &LabelTable) -> Result<u32, ErrorKind> {
    let first = stmt.operand(0)?;
    let second = stmt.operand(1)?;
    let (gpr_text, fpr_text) = match (registers::is_fpr(first), registers::is_fpr(second)) {
        (false, true) => (first, second),
        (true, false) => (second, first),
        _ => {
            return Err(ErrorKind::RegisterClassMismatch {
                first: first.to_string(),
                second: second.to_string(),
            });
        }
    };
    let rt = parse_operand(gpr_text, labels, false)? as u32 & 0x1F;
    let fs = registers::fpr(fpr_text).ok_or_else(|| ErrorKind::InvalidOperand {
        operand: fpr_text.to_string(),
    })?;
    Ok((info.opcode << 26) | (info.cop_op << 21) | (rt << 16) | (fs << 11))
}

// The offset counts words from the branch instruction itself and must fit
// a signed 16-bit field.
fn branch_offset(target_text: &str, labels: &LabelTable, address: u32) -> Result<u32, ErrorKind> {
    let target = parse_operand(target_text, labels, false)? as u32;
    let offset = (i64::from(target) - i64::from(address)) / 4;
    if !(-32768..=32767).contains(&offset) {
        return Err(ErrorKind::BranchOutOfRange { offset });
    }
    Ok((offset as u32) & 0xFFFF)
}

fn gpr(stmt: &Statement, index: usize, labels: &LabelTable) -> Result<u32, ErrorKind> {
    parse_operand(stmt.operand(index)?, labels, false).map(|v| v as u32 & 0x1F)
}

fn imm(stmt: &Statement, index: usize, labels: &LabelTable) -> Result<u32, ErrorKind> {
    parse_operand(stmt.operand(index)?, labels, true).map(|v| v as u32)
}

fn fpr(stmt: &Statement, index: usize) -> Result<u32, ErrorKind> {
    let operand = stmt.operand(index)?;
    registers::fpr(operand).ok_or_else(|| ErrorKind::InvalidOperand {
        operand: operand.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::opcodes::lookup;

    fn one(line: &str, labels: &LabelTable, address: u32) -> u32 {
        let words = all(line, labels, address);
        assert_eq!(words.len(), 1);
        words[0]
    }

    fn all(line: &str, labels: &LabelTable, address: u32) -> Vec<u32> {
        let stmt = Statement::parse(line);
        let info = lookup(stmt.mnemonic()).expect("unknown mnemonic in test");
        encode(&stmt, &info, labels, address).expect("encoding failed in test")
    }

    fn no_labels() -> LabelTable {
        LabelTable::new()
    }

    #[test]
    fn r_type() {
        let labels = no_labels();
        assert_eq!(one("add t0, t1, t2", &labels, 0), 0x012A_4020);
        assert_eq!(one("jr ra", &labels, 0), 0x03E0_0008);
        assert_eq!(one("jalr t0", &labels, 0), 0x0100_F809);
        assert_eq!(one("jalr t1, t0", &labels, 0), 0x0100_4809);
    }

    #[test]
    fn shifts() {
        let labels = no_labels();
        assert_eq!(one("sll t0, t1, 2", &labels, 0), 0x0009_4080);
        assert_eq!(one("sllv t0, t1, t2", &labels, 0), 0x0149_4004);
        // dsll32 keeps the raw shift amount; the funct carries the +32.
        assert_eq!(one("dsll32 t0, t1, 2", &labels, 0), 0x0009_40BC);
    }

    #[test]
    fn mult_div_forms() {
        let labels = no_labels();
        assert_eq!(one("mult t0, t1", &labels, 0), 0x0109_0018);
        assert_eq!(one("mult t2, t0, t1", &labels, 0), 0x0109_5018);
        let stmt = Statement::parse("mult t0");
        let info = lookup("mult").unwrap();
        assert!(matches!(
            encode(&stmt, &info, &labels, 0),
            Err(ErrorKind::WrongOperandCount { .. })
        ));
    }

    #[test]
    fn hi_lo_and_system() {
        let labels = no_labels();
        assert_eq!(one("mfhi t0", &labels, 0), 0x0000_4010);
        assert_eq!(one("mtlo t0", &labels, 0), 0x0100_0013);
        assert_eq!(one("syscall", &labels, 0), 0x0000_000C);
        assert_eq!(one("break 5", &labels, 0), 0x0000_014D);
        assert_eq!(one("eret", &labels, 0), 0x4200_0018);
    }

    #[test]
    fn i_type() {
        let labels = no_labels();
        assert_eq!(one("addiu s0, v0, 0x10", &labels, 0), 0x2450_0010);
        assert_eq!(one("lui t0, $1234", &labels, 0), 0x3C08_1234);
        assert_eq!(one("ori t0, t0, $5678", &labels, 0), 0x3508_5678);
        assert_eq!(one("lw t0, 0x10(t1)", &labels, 0), 0x8D28_0010);
        assert_eq!(one("sw t0, -4(sp)", &labels, 0), 0xAFA8_FFFC);
        assert_eq!(one("sq t0, 0(t1)", &labels, 0), 0x7D28_0000);
    }

    #[test]
    fn branches() {
        let mut labels = LabelTable::new();
        labels.insert("loop", 0x0010_0000);
        assert_eq!(one("beq t0, t1, :loop", &labels, 0x0010_0008), 0x1109_FFFE);
        assert_eq!(one("bne t0, t1, :loop", &labels, 0x0010_0008), 0x1509_FFFE);
        assert_eq!(one("blez t0, :loop", &labels, 0x0010_0008), 0x1900_FFFE);
        assert_eq!(one("bgezal t0, :loop", &labels, 0x0010_0008), 0x0511_FFFE);
        assert_eq!(one("b :loop", &labels, 0x0010_0004), 0x1000_FFFF);
    }

    #[test]
    fn branch_out_of_range() {
        let mut labels = LabelTable::new();
        labels.insert("far", 0x0012_0000);
        let stmt = Statement::parse("b :far");
        let info = lookup("b").unwrap();
        assert!(matches!(
            encode(&stmt, &info, &labels, 0x0010_0000),
            Err(ErrorKind::BranchOutOfRange { .. })
        ));
    }

    #[test]
    fn jumps() {
        let labels = no_labels();
        assert_eq!(one("j $00100000", &labels, 0), 0x0804_0000);
        assert_eq!(one("jal $00100000", &labels, 0), 0x0C04_0000);
    }

    #[test]
    fn cop0_moves() {
        let labels = no_labels();
        assert_eq!(one("mfc0 t0, 12", &labels, 0), 0x4008_6000);
        assert_eq!(one("mtc0 t0, 12", &labels, 0), 0x4088_6000);
    }

    #[test]
    fn fpu() {
        let labels = no_labels();
        assert_eq!(one("add.s f1, f2, f3", &labels, 0), 0x4603_1040);
        assert_eq!(one("c.lt.s f1, f2", &labels, 0), 0x4602_0834);
        assert_eq!(one("cvt.s.w f1, f2", &labels, 0), 0x4680_1060);
        assert_eq!(one("lwc1 f2, 0x10(t1)", &labels, 0), 0xC522_0010);
        assert_eq!(one("mfc1 t0, f2", &labels, 0), 0x4408_1000);
        assert_eq!(one("mtc1 f2, t0", &labels, 0), 0x4488_1000);
    }

    #[test]
    fn fpu_mov_rejects_same_class() {
        let labels = no_labels();
        let stmt = Statement::parse("mfc1 t0, t1");
        let info = lookup("mfc1").unwrap();
        assert!(matches!(
            encode(&stmt, &info, &labels, 0),
            Err(ErrorKind::RegisterClassMismatch { .. })
        ));
    }

    #[test]
    fn sqrt_same_register_moves_to_ft() {
        let labels = no_labels();
        // fd == fs: the register lands in ft and fs is cleared.
        assert_eq!(one("sqrt.s f4, f4", &labels, 0), 0x4604_0104);
        // Distinct registers use the plain unary layout.
        assert_eq!(one("sqrt.s f4, f5", &labels, 0), 0x4600_2904);
        assert_eq!(one("abs.s f4, f4", &labels, 0), 0x4600_2105);
    }

    #[test]
    fn pseudo_expansion() {
        let labels = no_labels();
        assert_eq!(
            all("setreg t0, $DEADBEEF", &labels, 0),
            vec![0x3C08_DEAD, 0x3508_BEEF]
        );
        assert_eq!(one("nop", &labels, 0), 0x0000_0000);
    }

    #[test]
    fn unknown_operands_are_reported() {
        let labels = no_labels();
        let stmt = Statement::parse("beq t0, t1, :nowhere");
        let info = lookup("beq").unwrap();
        assert!(matches!(
            encode(&stmt, &info, &labels, 0),
            Err(ErrorKind::UnresolvedLabel { .. })
        ));
    }
}
