//! A two-pass assembler for the PlayStation 2 Emotion Engine, targeting
//! cheat-device listings:
//! - raw `ADDRESS WORD` pairs
//! - PCSX2 pnach patch lines

pub mod compiler;
pub mod logging;
