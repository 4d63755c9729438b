//! Mnemonic table for the Emotion Engine core and COP1
//!
//! Every mnemonic maps to an [OpInfo] record: its encoding family plus the
//! fixed fields the encoder needs (primary opcode, funct, fmt, rt field,
//! condition bit, or a complete custom word). Field layout follows the MIPS
//! convention `opcode[31:26] rs[25:21] rt[20:16] rd[15:11] shamt[10:6]
//! funct[5:0]`.

/// How a mnemonic's operands are arranged and assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// `rd, rs, rt` (or `rs` alone, as in `jr`)
    R,
    /// `rs` or `rd, rs`; rd defaults to 31
    RJalr,
    /// `rd, rt, shamt`
    RShift,
    /// `rd, rt, shamt`; the funct already encodes the +32 shift
    RShiftPlus32,
    /// `rd, rt, rs` with the shift amount in rs
    RShiftV,
    /// `rs, rt` or `rd, rs, rt`
    RMultDiv,
    /// `rd`
    RMfhiMflo,
    /// `rs`
    RMthiMtlo,
    /// optional 20-bit code in bits 6..25
    RSyscallBreak,
    /// optional 20-bit code in bits 6..25
    RSync,
    /// no operands, fixed word
    REret,
    /// `rt, rs, imm` / `rt, imm` (lui) / `rt, offset(base)`
    I,
    /// `rt, offset(base)` with the 64/128-bit opcodes
    ILdSd,
    /// `rs, rt, target`
    IBranch,
    /// `rs, rt, target`, likely form
    IBranchLikely,
    /// `rs, target` with rt fixed to zero
    IBranchRsZero,
    /// `rs, target` with rt taken from the table
    IBranchRsRtFmt,
    /// `rt, rd` against COP0
    Cop0Mov,
    /// `ft, offset(base)`
    IFpuLs,
    /// one GPR and one FPR in either order
    FpuMov,
    /// `fd, fs, ft`
    FpuR,
    /// `fd, fs`
    FpuRUn,
    /// `fd, fs` conversion
    FpuCvt,
    /// `fs, ft`
    FpuCmp,
    /// `target`
    FpuBranch,
    /// `target`, absolute 26-bit region jump
    J,
    /// no operands, emit the custom word verbatim
    Custom,
    /// `rd, value`, expands to `lui` + `ori`
    PseudoSetReg,
    /// `target`, expands to `beq zero, zero, target`
    PseudoBranch,
}

/// Static description of one mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpInfo {
    pub family: Family,
    pub opcode: u32,
    pub funct: u32,
    pub fmt: u32,
    pub cop_op: u32,
    pub rt_field: u32,
    pub cc_bit: u32,
    pub custom: u32,
}

// Single-precision, word, long and double COP1 formats.
pub const FMT_S: u32 = 0x10;
pub const FMT_D: u32 = 0x11;
pub const FMT_W: u32 = 0x14;
pub const FMT_L: u32 = 0x15;
// rs field value selecting the BC1 condition branches.
pub const FMT_BC: u32 = 0x08;

impl OpInfo {
    fn blank(family: Family) -> OpInfo {
        OpInfo {
            family,
            opcode: 0,
            funct: 0,
            fmt: 0,
            cop_op: 0,
            rt_field: 0,
            cc_bit: 0,
            custom: 0,
        }
    }

    fn r(funct: u32) -> OpInfo {
        OpInfo {
            funct,
            ..OpInfo::blank(Family::R)
        }
    }

    fn blank_with(family: Family, funct: u32) -> OpInfo {
        OpInfo {
            funct,
            ..OpInfo::blank(family)
        }
    }

    fn shift(funct: u32) -> OpInfo {
        OpInfo {
            funct,
            ..OpInfo::blank(Family::RShift)
        }
    }

    fn shift32(funct: u32) -> OpInfo {
        OpInfo {
            funct,
            ..OpInfo::blank(Family::RShiftPlus32)
        }
    }

    fn shift_v(funct: u32) -> OpInfo {
        OpInfo {
            funct,
            ..OpInfo::blank(Family::RShiftV)
        }
    }

    fn mult_div(opcode: u32, funct: u32) -> OpInfo {
        OpInfo {
            opcode,
            funct,
            ..OpInfo::blank(Family::RMultDiv)
        }
    }

    fn i(opcode: u32) -> OpInfo {
        OpInfo {
            opcode,
            ..OpInfo::blank(Family::I)
        }
    }

    fn ld_sd(opcode: u32) -> OpInfo {
        OpInfo {
            opcode,
            ..OpInfo::blank(Family::ILdSd)
        }
    }

    fn branch(family: Family, opcode: u32) -> OpInfo {
        OpInfo {
            opcode,
            ..OpInfo::blank(family)
        }
    }

    fn branch_rt(rt_field: u32) -> OpInfo {
        OpInfo {
            opcode: 0x01,
            rt_field,
            ..OpInfo::blank(Family::IBranchRsRtFmt)
        }
    }

    fn jump(opcode: u32) -> OpInfo {
        OpInfo {
            opcode,
            ..OpInfo::blank(Family::J)
        }
    }

    fn cop0_mov(cop_op: u32) -> OpInfo {
        OpInfo {
            opcode: 0x10,
            cop_op,
            ..OpInfo::blank(Family::Cop0Mov)
        }
    }

    fn fpu_ls(opcode: u32) -> OpInfo {
        OpInfo {
            opcode,
            ..OpInfo::blank(Family::IFpuLs)
        }
    }

    fn fpu_mov(cop_op: u32) -> OpInfo {
        OpInfo {
            opcode: 0x11,
            cop_op,
            ..OpInfo::blank(Family::FpuMov)
        }
    }

    fn fpu_r(funct: u32) -> OpInfo {
        OpInfo {
            opcode: 0x11,
            fmt: FMT_S,
            funct,
            ..OpInfo::blank(Family::FpuR)
        }
    }

    fn fpu_un(funct: u32) -> OpInfo {
        OpInfo {
            opcode: 0x11,
            fmt: FMT_S,
            funct,
            ..OpInfo::blank(Family::FpuRUn)
        }
    }

    fn fpu_cvt(funct: u32, fmt: u32) -> OpInfo {
        OpInfo {
            opcode: 0x11,
            fmt,
            funct,
            ..OpInfo::blank(Family::FpuCvt)
        }
    }

    fn fpu_cmp(funct: u32) -> OpInfo {
        OpInfo {
            opcode: 0x11,
            fmt: FMT_S,
            funct,
            ..OpInfo::blank(Family::FpuCmp)
        }
    }

    fn fpu_branch(cc_bit: u32) -> OpInfo {
        OpInfo {
            opcode: 0x11,
            fmt: FMT_BC,
            cc_bit,
            ..OpInfo::blank(Family::FpuBranch)
        }
    }

    fn custom(custom: u32) -> OpInfo {
        OpInfo {
            custom,
            ..OpInfo::blank(Family::Custom)
        }
    }
}

/// Look up a mnemonic, case-insensitively.
pub fn lookup(mnemonic: &str) -> Option<OpInfo> {
    let mnemonic = mnemonic.to_ascii_lowercase();
    let info = match mnemonic.as_str() {
        // Integer arithmetic and logic
        "add" => OpInfo::r(0x20),
        "addu" => OpInfo::r(0x21),
        "sub" => OpInfo::r(0x22),
        "subu" => OpInfo::r(0x23),
        "and" => OpInfo::r(0x24),
        "or" => OpInfo::r(0x25),
        "xor" => OpInfo::r(0x26),
        "nor" => OpInfo::r(0x27),
        "slt" => OpInfo::r(0x2A),
        "sltu" => OpInfo::r(0x2B),
        "dadd" => OpInfo::r(0x2C),
        "daddu" => OpInfo::r(0x2D),
        "dsub" => OpInfo::r(0x2E),
        "dsubu" => OpInfo::r(0x2F),
        "movz" => OpInfo::r(0x0A),
        "movn" => OpInfo::r(0x0B),
        "jr" => OpInfo::r(0x08),
        "jalr" => OpInfo {
            funct: 0x09,
            ..OpInfo::blank(Family::RJalr)
        },

        // Shifts
        "sll" => OpInfo::shift(0x00),
        "srl" => OpInfo::shift(0x02),
        "sra" => OpInfo::shift(0x03),
        "dsll" => OpInfo::shift(0x38),
        "dsrl" => OpInfo::shift(0x3A),
        "dsra" => OpInfo::shift(0x3B),
        "dsll32" => OpInfo::shift32(0x3C),
        "dsrl32" => OpInfo::shift32(0x3E),
        "dsra32" => OpInfo::shift32(0x3F),
        "sllv" => OpInfo::shift_v(0x04),
        "srlv" => OpInfo::shift_v(0x06),
        "srav" => OpInfo::shift_v(0x07),
        "dsllv" => OpInfo::shift_v(0x14),
        "dsrlv" => OpInfo::shift_v(0x16),
        "dsrav" => OpInfo::shift_v(0x17),

        // Multiply and divide
        "mult" => OpInfo::mult_div(0x00, 0x18),
        "multu" => OpInfo::mult_div(0x00, 0x19),
        "div" => OpInfo::mult_div(0x00, 0x1A),
        "divu" => OpInfo::mult_div(0x00, 0x1B),
        "madd" => OpInfo::mult_div(0x1C, 0x00),
        "maddu" => OpInfo::mult_div(0x1C, 0x01),
        "mfhi" => OpInfo::blank_with(Family::RMfhiMflo, 0x10),
        "mflo" => OpInfo::blank_with(Family::RMfhiMflo, 0x12),
        "mthi" => OpInfo::blank_with(Family::RMthiMtlo, 0x11),
        "mtlo" => OpInfo::blank_with(Family::RMthiMtlo, 0x13),

        // System
        "syscall" => OpInfo::blank_with(Family::RSyscallBreak, 0x0C),
        "break" => OpInfo::blank_with(Family::RSyscallBreak, 0x0D),
        "sync" => OpInfo::blank_with(Family::RSync, 0x0F),
        "eret" => OpInfo::blank(Family::REret),

        // Immediate arithmetic
        "addi" => OpInfo::i(0x08),
        "addiu" => OpInfo::i(0x09),
        "slti" => OpInfo::i(0x0A),
        "sltiu" => OpInfo::i(0x0B),
        "andi" => OpInfo::i(0x0C),
        "ori" => OpInfo::i(0x0D),
        "xori" => OpInfo::i(0x0E),
        "lui" => OpInfo::i(0x0F),
        "daddi" => OpInfo::i(0x18),
        "daddiu" => OpInfo::i(0x19),

        // Memory
        "lb" => OpInfo::i(0x20),
        "lh" => OpInfo::i(0x21),
        "lwl" => OpInfo::i(0x22),
        "lw" => OpInfo::i(0x23),
        "lbu" => OpInfo::i(0x24),
        "lhu" => OpInfo::i(0x25),
        "lwr" => OpInfo::i(0x26),
        "lwu" => OpInfo::i(0x27),
        "sb" => OpInfo::i(0x28),
        "sh" => OpInfo::i(0x29),
        "swl" => OpInfo::i(0x2A),
        "sw" => OpInfo::i(0x2B),
        "swr" => OpInfo::i(0x2E),
        "lq" => OpInfo::ld_sd(0x1E),
        "sq" => OpInfo::ld_sd(0x1F),
        "ld" => OpInfo::ld_sd(0x37),
        "sd" => OpInfo::ld_sd(0x3F),

        // Branches
        "beq" => OpInfo::branch(Family::IBranch, 0x04),
        "bne" => OpInfo::branch(Family::IBranch, 0x05),
        "beql" => OpInfo::branch(Family::IBranchLikely, 0x14),
        "bnel" => OpInfo::branch(Family::IBranchLikely, 0x15),
        "blez" => OpInfo::branch(Family::IBranchRsZero, 0x06),
        "bgtz" => OpInfo::branch(Family::IBranchRsZero, 0x07),
        "blezl" => OpInfo::branch(Family::IBranchRsZero, 0x16),
        "bgtzl" => OpInfo::branch(Family::IBranchRsZero, 0x17),
        "bltz" => OpInfo::branch_rt(0x00),
        "bgez" => OpInfo::branch_rt(0x01),
        "bltzl" => OpInfo::branch_rt(0x02),
        "bgezl" => OpInfo::branch_rt(0x03),
        "bltzal" => OpInfo::branch_rt(0x10),
        "bgezal" => OpInfo::branch_rt(0x11),

        // Jumps
        "j" => OpInfo::jump(0x02),
        "jal" => OpInfo::jump(0x03),

        // COP0
        "mfc0" => OpInfo::cop0_mov(0x00),
        "mtc0" => OpInfo::cop0_mov(0x04),

        // COP1 moves and memory
        "mfc1" => OpInfo::fpu_mov(0x00),
        "mtc1" => OpInfo::fpu_mov(0x04),
        "lwc1" => OpInfo::fpu_ls(0x31),
        "swc1" => OpInfo::fpu_ls(0x39),

        // Single-precision arithmetic
        "add.s" => OpInfo::fpu_r(0x00),
        "sub.s" => OpInfo::fpu_r(0x01),
        "mul.s" => OpInfo::fpu_r(0x02),
        "div.s" => OpInfo::fpu_r(0x03),
        "madd.s" => OpInfo::fpu_r(0x1C),
        "msub.s" => OpInfo::fpu_r(0x1D),
        "max.s" => OpInfo::fpu_r(0x28),
        "min.s" => OpInfo::fpu_r(0x29),
        "rsqrt.s" => OpInfo::fpu_r(0x16),
        "sqrt.s" => OpInfo::fpu_un(0x04),
        "abs.s" => OpInfo::fpu_un(0x05),
        "mov.s" => OpInfo::fpu_un(0x06),
        "neg.s" => OpInfo::fpu_un(0x07),

        // Conversions: funct selects the target format, fmt the source
        "cvt.s.d" => OpInfo::fpu_cvt(0x20, FMT_D),
        "cvt.s.w" => OpInfo::fpu_cvt(0x20, FMT_W),
        "cvt.s.l" => OpInfo::fpu_cvt(0x20, FMT_L),
        "cvt.d.s" => OpInfo::fpu_cvt(0x21, FMT_S),
        "cvt.d.w" => OpInfo::fpu_cvt(0x21, FMT_W),
        "cvt.d.l" => OpInfo::fpu_cvt(0x21, FMT_L),
        "cvt.w.s" => OpInfo::fpu_cvt(0x24, FMT_S),
        "cvt.w.d" => OpInfo::fpu_cvt(0x24, FMT_D),
        "cvt.l.s" => OpInfo::fpu_cvt(0x25, FMT_S),
        "cvt.l.d" => OpInfo::fpu_cvt(0x25, FMT_D),

        // Compares and condition branches
        "c.f.s" => OpInfo::fpu_cmp(0x30),
        "c.eq.s" => OpInfo::fpu_cmp(0x32),
        "c.lt.s" => OpInfo::fpu_cmp(0x34),
        "c.le.s" => OpInfo::fpu_cmp(0x36),
        "bc1f" => OpInfo::fpu_branch(0),
        "bc1t" => OpInfo::fpu_branch(1),

        // Fixed words and pseudo-instructions
        "nop" => OpInfo::custom(0x0000_0000),
        "b" => OpInfo::blank(Family::PseudoBranch),
        "setreg" => OpInfo::blank(Family::PseudoSetReg),

        _ => return None,
    };
    Some(info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(lookup("ADDIU"), lookup("addiu"));
        assert_eq!(lookup("Sqrt.S"), lookup("sqrt.s"));
        assert!(lookup("frobnicate").is_none());
    }

    #[test]
    fn families() {
        assert_eq!(lookup("add").unwrap().family, Family::R);
        assert_eq!(lookup("dsll32").unwrap().family, Family::RShiftPlus32);
        assert_eq!(lookup("lq").unwrap().family, Family::ILdSd);
        assert_eq!(lookup("bgezal").unwrap().rt_field, 0x11);
        assert_eq!(lookup("bc1t").unwrap().cc_bit, 1);
        assert_eq!(lookup("setreg").unwrap().family, Family::PseudoSetReg);
    }
}
