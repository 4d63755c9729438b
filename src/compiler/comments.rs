//! Line-level comment removal
//!
//! Three comment forms are recognised: `//` and `#` run to the end of the
//! line, `/* ... */` may span lines. A `#` (or any other starter) inside a
//! double-quoted string is literal; a backslash escapes the character after
//! it, so `\"` does not toggle string state. Block-comment state carries
//! from line to line and must be reset between passes.

/// Strips comments from consecutive lines of one source, carrying the
/// open-block state across calls.
pub struct CommentStripper {
    in_block_comment: bool,
}

impl CommentStripper {
    pub fn new() -> CommentStripper {
        CommentStripper {
            in_block_comment: false,
        }
    }

    /// Forget any open block comment. Called at the start of each pass.
    pub fn reset(&mut self) {
        self.in_block_comment = false;
    }

    /// Remove comments from one line and return the trimmed remainder.
    pub fn strip(&mut self, line: &str) -> String {
        let chars: Vec<char> = line.chars().collect();
        let mut kept = String::new();
        let mut in_string = false;
        let mut i = 0;

        while i < chars.len() {
            if self.in_block_comment {
                if chars[i] == '*' && chars.get(i + 1) == Some(&'/') {
                    self.in_block_comment = false;
                    i += 2;
                } else {
                    i += 1;
                }
                continue;
            }

            let c = chars[i];
            if c == '\\' {
                kept.push(c);
                if let Some(&escaped) = chars.get(i + 1) {
                    kept.push(escaped);
                }
                i += 2;
                continue;
            }
            if c == '"' {
                in_string = !in_string;
                kept.push(c);
                i += 1;
                continue;
            }
            if !in_string {
                if c == '/' && chars.get(i + 1) == Some(&'*') {
                    self.in_block_comment = true;
                    i += 2;
                    continue;
                }
                if (c == '/' && chars.get(i + 1) == Some(&'/')) || c == '#' {
                    break;
                }
            }
            kept.push(c);
            i += 1;
        }

        kept.trim().to_string()
    }
}

impl Default for CommentStripper {
    fn default() -> Self {
        CommentStripper::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_one(line: &str) -> String {
        CommentStripper::new().strip(line)
    }

    #[test]
    fn line_comments() {
        assert_eq!(strip_one("nop // trailing"), "nop");
        assert_eq!(strip_one("nop # trailing"), "nop");
        assert_eq!(strip_one("// whole line"), "");
        assert_eq!(strip_one("  addiu t0, t0, 1  "), "addiu t0, t0, 1");
    }

    #[test]
    fn hash_inside_string_is_literal() {
        assert_eq!(strip_one(r#"print "a#b""#), r#"print "a#b""#);
        assert_eq!(strip_one(r#"print "a#b" # note"#), r#"print "a#b""#);
        assert_eq!(strip_one(r##"print "a\"#b""##), r##"print "a\"#b""##);
    }

    #[test]
    fn block_comment_within_line() {
        assert_eq!(strip_one("add /* x */ t0, t1, t2"), "add  t0, t1, t2");
        assert_eq!(strip_one("nop /* open"), "nop");
    }

    #[test]
    fn block_comment_across_lines() {
        let mut stripper = CommentStripper::new();
        assert_eq!(stripper.strip("nop /* begin"), "nop");
        assert_eq!(stripper.strip("still inside"), "");
        assert_eq!(stripper.strip("end */ sync"), "sync");
        assert_eq!(stripper.strip("nop"), "nop");
    }

    #[test]
    fn reset_clears_block_state() {
        let mut stripper = CommentStripper::new();
        stripper.strip("/* open");
        stripper.reset();
        assert_eq!(stripper.strip("nop"), "nop");
    }
}
