//! Register name tables for the Emotion Engine GPR and FPR banks

use std::collections::HashMap;
use std::sync::LazyLock;

/// Conventional GPR names, in index order.
pub const GPR_NAMES: [&str; 32] = [
    "zero", "at", "v0", "v1", "a0", "a1", "a2", "a3", "t0", "t1", "t2", "t3", "t4", "t5", "t6",
    "t7", "s0", "s1", "s2", "s3", "s4", "s5", "s6", "s7", "t8", "t9", "k0", "k1", "gp", "sp", "fp",
    "ra",
];

// Every GPR is reachable by three spellings: bare name, dollar-prefixed
// name, and its decimal index. Keys are stored lowercase.
static GPRS: LazyLock<HashMap<String, u32>> = LazyLock::new(|| {
    let mut table = HashMap::new();
    for (index, name) in GPR_NAMES.iter().enumerate() {
        let index = index as u32;
        table.insert(name.to_string(), index);
        table.insert(format!("${}", name), index);
        table.insert(index.to_string(), index);
    }
    table
});

static FPRS: LazyLock<HashMap<String, u32>> = LazyLock::new(|| {
    let mut table = HashMap::new();
    for index in 0..32u32 {
        table.insert(format!("f{}", index), index);
        table.insert(format!("$f{}", index), index);
    }
    table
});

/// Look up a GPR by any of its registered spellings, case-insensitively.
pub fn gpr(name: &str) -> Option<u32> {
    GPRS.get(&name.to_ascii_lowercase()).copied()
}

/// Look up an FPR (`f0`..`f31`, with or without a leading `$`).
pub fn fpr(name: &str) -> Option<u32> {
    FPRS.get(&name.to_ascii_lowercase()).copied()
}

/// Whether an operand names an FPR rather than a GPR or a value.
pub fn is_fpr(name: &str) -> bool {
    fpr(name).is_some()
}
