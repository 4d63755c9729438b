//! `import` expansion
//!
//! Turns the raw lines of the top-level input into one flat sequence of
//! [SourceLine]s by splicing in imported files depth-first. Each line
//! remembers where it came from so diagnostics can point at the right
//! file and line. File access goes through the [TextIo] trait; imports
//! are read as ISO-8859-1.

use crate::compiler::ErrorKind;
use regex::Regex;
use std::io;
use std::path::{MAIN_SEPARATOR_STR, Path, PathBuf};
use std::sync::LazyLock;

/// Imports nested deeper than this fail the whole compile.
pub const MAX_IMPORT_DEPTH: usize = 10;

static IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)^\s*import\s+"([^"]+)""#).unwrap());

/// One logical input line after import expansion.
#[derive(Debug, Clone)]
pub struct SourceLine {
    pub text: String,
    /// Originating file, as it will appear in diagnostics.
    pub file: String,
    /// 1-based line number within `file`.
    pub line: usize,
    /// 0-based position in the expanded sequence.
    pub index: usize,
    /// Whether the line came from the top-level input rather than an import.
    pub from_main_input: bool,
}

/// The compiler's only window onto the file system.
pub trait TextIo {
    fn read_lines(&self, path: &Path) -> io::Result<Vec<String>>;
    fn exists(&self, path: &Path) -> bool;
}

/// [TextIo] backed by the real file system.
pub struct DiskIo;

impl TextIo for DiskIo {
    fn read_lines(&self, path: &Path) -> io::Result<Vec<String>> {
        let bytes = std::fs::read(path)?;
        Ok(decode_latin1_lines(&bytes))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Decode raw bytes as ISO-8859-1 and split them into lines.
pub fn decode_latin1_lines(bytes: &[u8]) -> Vec<String> {
    let text: String = bytes.iter().map(|&b| b as char).collect();
    text.split('\n')
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect()
}

/// Expand one file's lines, recursing into imports. `global_index` runs
/// across the whole expansion.
pub fn expand(
    lines: &[String],
    file_name: &str,
    directory: Option<&Path>,
    global_index: &mut usize,
    depth: usize,
    io: &dyn TextIo,
) -> Result<Vec<SourceLine>, ErrorKind> {
    if depth > MAX_IMPORT_DEPTH {
        return Err(ErrorKind::ImportDepthExceeded { depth });
    }

    let mut expanded = Vec::new();
    for (line_index, raw) in lines.iter().enumerate() {
        let captures = match IMPORT.captures(raw) {
            Some(captures) => captures,
            None => {
                expanded.push(source_line(raw.clone(), file_name, line_index, global_index, depth));
                continue;
            }
        };

        let original = captures.get(1).unwrap().as_str();
        let resolved = resolve(original, directory);
        let imported = if io.exists(&resolved) {
            io.read_lines(&resolved).ok()
        } else {
            None
        };
        match imported {
            Some(imported_lines) => {
                let imported_name = resolved.display().to_string();
                let sub = expand(
                    &imported_lines,
                    &imported_name,
                    resolved.parent(),
                    global_index,
                    depth + 1,
                    io,
                )?;
                expanded.extend(sub);
            }
            None => {
                // Missing imports do not stop the compile; the marker line
                // is a comment and assembles to nothing.
                let marker = format!("// Import failed (not found): {}", original);
                expanded.push(source_line(marker, file_name, line_index, global_index, depth));
            }
        }
    }
    Ok(expanded)
}

fn source_line(
    text: String,
    file_name: &str,
    line_index: usize,
    global_index: &mut usize,
    depth: usize,
) -> SourceLine {
    let line = SourceLine {
        text,
        file: file_name.to_string(),
        line: line_index + 1,
        index: *global_index,
        from_main_input: depth == 0,
    };
    *global_index += 1;
    line
}

fn resolve(original: &str, directory: Option<&Path>) -> PathBuf {
    let native = original.replace('\\', MAIN_SEPARATOR_STR);
    match directory {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(&native),
        _ => PathBuf::from(&native),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FakeIo {
        files: HashMap<PathBuf, Vec<String>>,
    }

    impl FakeIo {
        fn new(entries: &[(&str, &str)]) -> FakeIo {
            let files = entries
                .iter()
                .map(|(path, body)| {
                    let lines = body.lines().map(str::to_string).collect();
                    (PathBuf::from(path), lines)
                })
                .collect();
            FakeIo { files }
        }
    }

    impl TextIo for FakeIo {
        fn read_lines(&self, path: &Path) -> io::Result<Vec<String>> {
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
        }

        fn exists(&self, path: &Path) -> bool {
            self.files.contains_key(path)
        }
    }

    fn expand_main(lines: &[&str], io: &dyn TextIo) -> Vec<SourceLine> {
        let lines: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        let mut index = 0;
        expand(&lines, "main.asm", None, &mut index, 0, io).unwrap()
    }

    #[test]
    fn flat_input_is_tagged() {
        let io = FakeIo::new(&[]);
        let lines = expand_main(&["nop", "sync"], &io);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "nop");
        assert_eq!(lines[0].line, 1);
        assert_eq!(lines[1].index, 1);
        assert!(lines[1].from_main_input);
    }

    #[test]
    fn imports_are_spliced_depth_first() {
        let io = FakeIo::new(&[("lib.asm", "nop\nnop")]);
        let lines = expand_main(&["sync", "import \"lib.asm\"", "eret"], &io);
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["sync", "nop", "nop", "eret"]);
        assert_eq!(lines[1].file, "lib.asm");
        assert_eq!(lines[1].line, 1);
        assert!(!lines[1].from_main_input);
        // The global index keeps counting across files.
        let indices: Vec<usize> = lines.iter().map(|l| l.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn missing_import_becomes_marker_comment() {
        let io = FakeIo::new(&[]);
        let lines = expand_main(&["import \"gone.asm\""], &io);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "// Import failed (not found): gone.asm");
        assert!(lines[0].from_main_input);
    }

    #[test]
    fn nested_imports_resolve_relative_to_importer() {
        let io = FakeIo::new(&[
            ("lib/a.asm", "import \"b.asm\""),
            ("lib/b.asm", "nop"),
        ]);
        let lines = expand_main(&["import \"lib/a.asm\""], &io);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "nop");
    }

    #[test]
    fn import_cycle_hits_the_depth_cap() {
        let io = FakeIo::new(&[("loop.asm", "import \"loop.asm\"")]);
        let lines: Vec<String> = vec!["import \"loop.asm\"".to_string()];
        let mut index = 0;
        let result = expand(&lines, "main.asm", None, &mut index, 0, &io);
        assert!(matches!(result, Err(ErrorKind::ImportDepthExceeded { .. })));
    }
}
