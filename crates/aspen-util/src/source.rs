//! Source text helpers.
//!
//! The pipeline works over the source as a slice of Unicode scalar values.
//! Lines and columns are 1-based and count scalar values, not bytes; tabs
//! are not expanded.

use std::fmt::Write;

/// Returns the text of the 1-based `line`, without its terminating newline.
///
/// Lines past the end of the source come back empty.
pub fn line_text(source: &[char], line: u32) -> String {
    source
        .split(|&c| c == '\n')
        .nth(line as usize - 1)
        .map(|chars| chars.iter().collect())
        .unwrap_or_default()
}

/// Renders one diagnostic with a caret-pointed excerpt:
///
/// ```text
/// error: unexpected token "@".
///
///     3 | let x@ i64 = 1;
///              ^-- here.
/// ```
pub fn render(source: &[char], message: &str, line: u32, col: u32) -> String {
    let mut out = String::new();
    let _ = write!(out, "error: {message}\n\n");

    let number = line.to_string();
    let text = line_text(source, line);
    let _ = writeln!(out, "    {number} | {text}");

    // The caret lands under `col`: 4 spaces, the line number, " | " and then
    // col - 1 columns of text precede it.
    let padding = col as usize + number.len() + 6;
    out.extend(std::iter::repeat(' ').take(padding));
    out.push_str("^-- here.\n");

    out
}
