//! Text manipulation utilities for front-end literals.

use crate::base::SourceLocation;
use crate::errors::{ErrorKind, Result};

/// Strip the common indentation from a multi-line string literal.
///
/// `text` is the raw content between the literal's delimiters and `location`
/// points at the opening delimiter. A blank first line (the newline right
/// after the opening delimiter) and a blank last line are dropped. The
/// indentation of the first non-blank line is the required prefix for every
/// other non-blank line.
///
/// # Example
/// ```
/// use sdl::base::{SourceLocation, normalize_multiline};
///
/// let loc = SourceLocation::new("schema.sdl", 1, 1);
/// let text = "\n    first\n      second\n    ";
/// assert_eq!(normalize_multiline(text, &loc).unwrap(), "first\n  second");
/// ```
pub fn normalize_multiline(text: &str, location: &SourceLocation) -> Result<String> {
    let mut lines: Vec<&str> = text.split('\n').collect();

    let mut first_line_offset = 0;
    if lines.first().is_some_and(|line| line.trim().is_empty()) && lines.len() > 1 {
        lines.remove(0);
        first_line_offset = 1;
    }
    if lines.len() > 1 && lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }

    let Some(first_content) = lines.iter().find(|line| !line.trim().is_empty()) else {
        return Ok(String::new());
    };
    let indent_len = first_content.len() - first_content.trim_start().len();
    let indent = &first_content[..indent_len];

    let mut result = Vec::with_capacity(lines.len());
    for (index, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            result.push("");
            continue;
        }
        match line.strip_prefix(indent) {
            Some(rest) => result.push(rest.trim_end_matches('\r')),
            None => {
                let line_number = location.line + (index + first_line_offset) as u32;
                return Err(ErrorKind::InvalidMultilineString { line: line_number }.at(location));
            }
        }
    }

    Ok(result.join("\n"))
}
