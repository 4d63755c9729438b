//! Two-pass compiler for a small Emotion Engine assembly dialect
//!
//! The first pass resolves labels and tracks the location counter, while
//! the second pass encodes instructions and renders the output listing.
//!
//! Comments come in three forms: `//` and `#` run to the end of the line
//! (a `#` inside a double-quoted string is literal), `/* ... */` may span
//! lines. Labels are defined with `name:` at the start of a line and may
//! be followed by an instruction on the same line; references may be bare
//! or `:`-prefixed. Other files are spliced in with `import "path"`.
//!
//! Besides the machine instructions, the dialect knows the directives
//! - `address <hex>`: move the location counter (no output)
//! - `print "<text>"`: emit the string as little-endian words
//! - `hexcode <value>`: emit one raw word
//! - `float <number>`: emit an IEEE-754 single
//! - `setreg <rd>, <value>`: load a 32-bit value via `lui`/`ori`
//!
//! Compilation never stops at the first broken line. Each error becomes a
//! [Diagnostic] and the affected line simply emits nothing, so one run
//! surfaces as many problems as possible. Errors found in pass 1
//! (duplicate labels, bad `address` values, malformed `print` strings)
//! abort before pass 2 since the label table cannot be trusted.

pub mod comments;
pub mod directives;
pub mod encode;
pub mod opcodes;
pub mod operands;
pub mod output;
pub mod preprocessor;
pub mod registers;
pub mod statement;

use regex::Regex;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use comments::CommentStripper;
use output::OutputMode;
use preprocessor::{DiskIo, SourceLine, TextIo};
use statement::Statement;

static LABEL_DEF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\w+):\s*(.*)$").unwrap());

const INSTRUCTION_BYTES: u32 = 4;

/// Label spellings map to absolute addresses, case-insensitively. A second
/// definition of a name is an error, not a redefinition.
#[derive(Debug, Default)]
pub struct LabelTable {
    map: HashMap<String, u32>,
}

impl LabelTable {
    pub fn new() -> LabelTable {
        LabelTable::default()
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.map.get(&name.to_ascii_lowercase()).copied()
    }

    /// Returns false when the label already existed; the first definition
    /// is kept.
    pub fn insert(&mut self, name: &str, address: u32) -> bool {
        match self.map.entry(name.to_ascii_lowercase()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(address);
                true
            }
        }
    }
}

/// Why a line failed to compile.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    ImportDepthExceeded { depth: usize },
    DuplicateLabel { label: String },
    InvalidAddress { value: String },
    MalformedPrint,
    UnknownMnemonic { mnemonic: String },
    MissingOperand { mnemonic: String, expected: usize, found: usize },
    WrongOperandCount { mnemonic: String, found: usize, expected: Vec<usize> },
    InvalidOperand { operand: String },
    InvalidMemoryOperand { operand: String },
    UnresolvedLabel { label: String },
    InvalidLiteral { value: String },
    BranchOutOfRange { offset: i64 },
    RegisterClassMismatch { first: String, second: String },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::ImportDepthExceeded { depth } => {
                write!(f, "import depth {} exceeds the maximum of {}", depth, preprocessor::MAX_IMPORT_DEPTH)
            }
            ErrorKind::DuplicateLabel { label } => {
                write!(f, "label \"{}\" is already defined", label)
            }
            ErrorKind::InvalidAddress { value } => {
                write!(f, "invalid address value \"{}\"", value)
            }
            ErrorKind::MalformedPrint => {
                write!(f, "malformed print directive, expected print \"<text>\"")
            }
            ErrorKind::UnknownMnemonic { mnemonic } => {
                write!(f, "unknown instruction \"{}\"", mnemonic)
            }
            ErrorKind::MissingOperand { mnemonic, expected, found } => write!(
                f,
                "\"{}\" needs at least {} operand(s), found {}",
                mnemonic, expected, found
            ),
            ErrorKind::WrongOperandCount { mnemonic, found, expected } => write!(
                f,
                "invalid operand count for \"{}\": found {}, expected {:?}",
                mnemonic, found, expected
            ),
            ErrorKind::InvalidOperand { operand } => {
                write!(f, "invalid operand \"{}\"", operand)
            }
            ErrorKind::InvalidMemoryOperand { operand } => {
                write!(f, "invalid memory operand \"{}\", expected offset(base)", operand)
            }
            ErrorKind::UnresolvedLabel { label } => {
                write!(f, "unresolved label \"{}\"", label)
            }
            ErrorKind::InvalidLiteral { value } => {
                write!(f, "invalid literal \"{}\"", value)
            }
            ErrorKind::BranchOutOfRange { offset } => {
                write!(f, "branch offset {} out of range", offset)
            }
            ErrorKind::RegisterClassMismatch { first, second } => write!(
                f,
                "expected one general-purpose and one floating-point register, got \"{}\" and \"{}\"",
                first, second
            ),
        }
    }
}

impl std::error::Error for ErrorKind {}

/// One diagnostic, pinned to the line that produced it.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    /// File the line came from.
    pub file: String,
    /// 1-based line number within `file`.
    pub line: usize,
    /// 0-based position in the expanded line sequence.
    pub global_index: usize,
    /// Address the line would have occupied.
    pub address: u32,
    /// The machine word that was being built, if any.
    pub attempted: Option<u32>,
    /// The line as written, before comment stripping.
    pub line_text: String,
    /// Whether the line came from the top-level input.
    pub from_main_input: bool,
}

impl Diagnostic {
    /// The attempted machine code as eight hex digits, or `N/A`.
    pub fn attempted_data(&self) -> String {
        match self.attempted {
            Some(word) => format!("{:08X}", word),
            None => "N/A".to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} (in {}, address {:08X}, data {})",
            self.kind,
            self.file,
            self.address,
            self.attempted_data()
        )?;
        write!(f, "{}\t{}", self.line, self.line_text)
    }
}

impl std::error::Error for Diagnostic {}

/// Everything one `compile` call produces.
#[derive(Debug)]
pub struct CompilationResult {
    pub success: bool,
    /// The listing, lines joined with `\n`. Partial output survives a
    /// failed compile.
    pub output: String,
    pub errors: Vec<Diagnostic>,
    /// Deduplicated 1-based line numbers of top-level-input errors, in
    /// first-encounter order.
    pub error_line_numbers: Vec<usize>,
}

impl CompilationResult {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

/// Compile `input_lines` into the selected output format, reading imports
/// from disk. `current_file_path` names the input in diagnostics and
/// anchors relative imports.
pub fn compile(
    input_lines: &[String],
    current_file_path: Option<&Path>,
    mode: OutputMode,
    address_format_char: &str,
) -> CompilationResult {
    compile_with_io(input_lines, current_file_path, mode, address_format_char, &DiskIo)
}

/// [compile], but with imports going through the given [TextIo].
pub fn compile_with_io(
    input_lines: &[String],
    current_file_path: Option<&Path>,
    mode: OutputMode,
    address_format_char: &str,
    io: &dyn TextIo,
) -> CompilationResult {
    let file_name = current_file_path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<input>".to_string());
    let directory = current_file_path.and_then(Path::parent);

    let mut global_index = 0;
    let lines = match preprocessor::expand(input_lines, &file_name, directory, &mut global_index, 0, io)
    {
        Ok(lines) => lines,
        Err(kind) => {
            // Preprocessing failures are fatal; neither pass runs.
            let diagnostic = Diagnostic {
                kind,
                file: file_name,
                line: 0,
                global_index: 0,
                address: 0,
                attempted: None,
                line_text: String::new(),
                from_main_input: true,
            };
            return CompilationResult {
                success: false,
                output: String::new(),
                errors: vec![diagnostic],
                error_line_numbers: Vec::new(),
            };
        }
    };

    let mut driver = Driver::new(mode, address_format_char);
    driver.first_pass(&lines);
    if driver.errors.is_empty() {
        driver.second_pass(&lines);
    }
    driver.finish()
}

struct Driver<'a> {
    mode: OutputMode,
    format_char: &'a str,
    labels: LabelTable,
    address: u32,
    stripper: CommentStripper,
    output: Vec<String>,
    errors: Vec<Diagnostic>,
}

impl<'a> Driver<'a> {
    fn new(mode: OutputMode, format_char: &'a str) -> Driver<'a> {
        Driver {
            mode,
            format_char,
            labels: LabelTable::new(),
            address: 0,
            stripper: CommentStripper::new(),
            output: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Build the label table and size every line. Both passes walk the
    /// same lines with the same comment state so their location counters
    /// agree.
    fn first_pass(&mut self, lines: &[SourceLine]) {
        self.stripper.reset();
        self.address = 0;

        for line in lines {
            let stripped = self.stripper.strip(&line.text);
            let body = self.take_labels(&stripped, line, true);
            if body.is_empty() {
                continue;
            }

            let keyword = leading_keyword(body);
            match keyword.as_str() {
                "address" => {
                    let argument = body[keyword.len()..].trim();
                    match directives::parse_address(argument) {
                        Ok(address) => self.address = address,
                        Err(kind) => self.error(line, kind),
                    }
                }
                "print" => match directives::print_words(body) {
                    Ok(words) => self.address += INSTRUCTION_BYTES * words.len() as u32,
                    Err(kind) => self.error(line, kind),
                },
                "setreg" => self.address += 2 * INSTRUCTION_BYTES,
                _ => self.address += INSTRUCTION_BYTES,
            }
        }
    }

    /// Encode every line and render the listing. A failed line records a
    /// diagnostic and leaves the location counter where it was.
    fn second_pass(&mut self, lines: &[SourceLine]) {
        self.stripper.reset();
        self.address = 0;

        for line in lines {
            let stripped = self.stripper.strip(&line.text);
            let body = self.take_labels(&stripped, line, false);
            if body.is_empty() {
                continue;
            }

            match self.emit_line(body) {
                Ok(words) => {
                    for word in words {
                        self.output.push(output::format_line(
                            self.address,
                            word,
                            self.mode,
                            self.format_char,
                        ));
                        self.address += INSTRUCTION_BYTES;
                    }
                }
                Err(kind) => self.error(line, kind),
            }
        }
    }

    fn emit_line(&mut self, body: &str) -> Result<Vec<u32>, ErrorKind> {
        let keyword = leading_keyword(body);
        let argument = body[keyword.len()..].trim();
        match keyword.as_str() {
            "address" => {
                self.address = directives::parse_address(argument)?;
                Ok(Vec::new())
            }
            "print" => directives::print_words(body),
            "hexcode" => directives::hexcode_word(argument, &self.labels).map(|w| vec![w]),
            "float" => directives::float_word(argument).map(|w| vec![w]),
            _ => {
                let stmt = Statement::parse(body);
                let info =
                    opcodes::lookup(stmt.mnemonic()).ok_or_else(|| ErrorKind::UnknownMnemonic {
                        mnemonic: stmt.mnemonic().to_string(),
                    })?;
                encode::encode(&stmt, &info, &self.labels, self.address)
            }
        }
    }

    /// Peel `name:` definitions off the front of a line and return what
    /// follows them. Definitions are only recorded in pass 1.
    fn take_labels<'t>(&mut self, text: &'t str, line: &SourceLine, define: bool) -> &'t str {
        let mut rest = text;
        while let Some(captures) = LABEL_DEF.captures(rest) {
            if define {
                let name = captures.get(1).unwrap().as_str();
                if !self.labels.insert(name, self.address) {
                    self.error(
                        line,
                        ErrorKind::DuplicateLabel {
                            label: name.to_string(),
                        },
                    );
                }
            }
            rest = captures.get(2).unwrap().as_str();
        }
        rest
    }

    fn error(&mut self, line: &SourceLine, kind: ErrorKind) {
        self.errors.push(Diagnostic {
            kind,
            file: line.file.clone(),
            line: line.line,
            global_index: line.index,
            address: self.address,
            attempted: None,
            line_text: line.text.clone(),
            from_main_input: line.from_main_input,
        });
    }

    fn finish(self) -> CompilationResult {
        let mut error_line_numbers = Vec::new();
        for diagnostic in &self.errors {
            if diagnostic.from_main_input && !error_line_numbers.contains(&diagnostic.line) {
                error_line_numbers.push(diagnostic.line);
            }
        }
        CompilationResult {
            success: self.errors.is_empty(),
            output: self.output.join("\n"),
            errors: self.errors,
            error_line_numbers,
        }
    }
}

// Directive names are recognised case-insensitively at the start of a
// line; everything else is an instruction mnemonic.
fn leading_keyword(body: &str) -> String {
    body.split_whitespace()
        .next()
        .unwrap_or("")
        .to_ascii_lowercase()
}
