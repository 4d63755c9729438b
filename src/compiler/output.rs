//! Output line formatting

/// Which textual format the compiler emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// `ADDRESS WORD`, one pair per line.
    Ps2,
    /// PCSX2 patch lines: `patch=1,EE,ADDRESS,extended,WORD`.
    Pnach,
}

/// Render one emitted word. A single-character `format_char` other than
/// `-` replaces the first digit of the address, which lets users force a
/// patch-region nibble.
pub fn format_line(address: u32, word: u32, mode: OutputMode, format_char: &str) -> String {
    let mut addr = format!("{:08X}", address);
    if format_char.chars().count() == 1 && format_char != "-" {
        addr.replace_range(0..1, format_char);
    }
    match mode {
        OutputMode::Ps2 => format!("{} {:08X}", addr, word),
        OutputMode::Pnach => format!("patch=1,EE,{},extended,{:08X}", addr, word),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ps2_lines() {
        assert_eq!(
            format_line(0x0010_0000, 0x2450_0010, OutputMode::Ps2, "-"),
            "00100000 24500010"
        );
    }

    #[test]
    fn pnach_lines() {
        assert_eq!(
            format_line(0x0010_0000, 0, OutputMode::Pnach, "-"),
            "patch=1,EE,00100000,extended,00000000"
        );
    }

    #[test]
    fn format_char_overrides_first_digit() {
        assert_eq!(
            format_line(0x0010_0000, 0, OutputMode::Pnach, "2"),
            "patch=1,EE,20100000,extended,00000000"
        );
        assert_eq!(
            format_line(0x0010_0000, 0, OutputMode::Ps2, "E"),
            "E0100000 00000000"
        );
        // Multi-character strings leave the address alone.
        assert_eq!(
            format_line(0x0010_0000, 0, OutputMode::Ps2, "20"),
            "00100000 00000000"
        );
    }
}
