//! Substitution-value extraction: verbatim argument text, member names, line
//! numbers, and file paths.
//!
//! Argument text is the exact source slice of the supplied expression.
//! Trivia *inside* the expression span (comments, newlines, spacing) is
//! preserved verbatim; only trivia hugging the argument boundary is trimmed,
//! so a host may hand spans that include comma/parenthesis padding.

use crate::diagnostics::{SourceFile, Span};
use crate::line_map::LineMap;

/// Exact source text of a supplied argument expression.
///
/// Trims outer whitespace on both ends, leading comments, and a trailing
/// block comment; everything interior stays untouched. Returns an empty
/// string for an out-of-range span.
#[must_use]
pub fn expression_text<'a>(file: &'a SourceFile, span: Span) -> &'a str {
    let Some(raw) = file.slice(span.start, span.end) else {
        return "";
    };
    trim_outer_trivia(raw)
}

/// The 1-based reported line of the call site's first token, after `#line`
/// remapping. `None` when the offset is outside the file.
#[must_use]
pub fn line_number(file: &SourceFile, line_map: &LineMap, offset: usize) -> Option<u32> {
    let physical = file.line_col(offset)?.line;
    let physical = u32::try_from(physical).ok()?;
    Some(line_map.map(physical).line)
}

/// The reported path of the call site: the active `#line "file"` remap target
/// if one is in force, otherwise the physical file path.
#[must_use]
pub fn file_path(file: &SourceFile, line_map: &LineMap, offset: usize) -> String {
    let mapped = file
        .line_col(offset)
        .and_then(|loc| u32::try_from(loc.line).ok())
        .map(|physical| line_map.map(physical));
    match mapped.and_then(|location| location.path) {
        Some(path) => path,
        None => file.path.display().to_string(),
    }
}

fn trim_outer_trivia(text: &str) -> &str {
    let mut current = text;
    loop {
        let trimmed = current.trim_start();
        if let Some(rest) = strip_leading_comment(trimmed) {
            current = rest;
            continue;
        }
        current = trimmed;
        break;
    }
    loop {
        let trimmed = current.trim_end();
        if let Some(rest) = strip_trailing_block_comment(trimmed) {
            current = rest;
            continue;
        }
        current = trimmed;
        break;
    }
    current
}

fn strip_leading_comment(text: &str) -> Option<&str> {
    if let Some(rest) = text.strip_prefix("//") {
        let end = rest.find('\n')?;
        return Some(&rest[end + 1..]);
    }
    if let Some(rest) = text.strip_prefix("/*") {
        let end = rest.find("*/")?;
        return Some(&rest[end + 2..]);
    }
    None
}

/// Strip a trailing `/* ... */` only when its opener is past the last `*/`
/// before it, i.e. the comment is genuinely boundary trivia and not the tail
/// of interior text.
fn strip_trailing_block_comment(text: &str) -> Option<&str> {
    let body = text.strip_suffix("*/")?;
    let open = body.rfind("/*")?;
    if body[open..].contains("*/") {
        return None;
    }
    Some(&text[..open])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{FileId, SourceFile};
    use crate::line_map::LineDirective;
    use std::path::PathBuf;

    fn file(source: &str) -> SourceFile {
        SourceFile::new(FileId(0), PathBuf::from("src/program.cm"), source.to_string())
    }

    fn full_span(source: &str) -> Span {
        Span::new(0, source.len())
    }

    #[test]
    fn interior_comments_and_line_structure_survive_verbatim() {
        let argument = "123 /* comment */ +\n   5";
        let file = file(argument);
        assert_eq!(expression_text(&file, full_span(argument)), argument);
    }

    #[test]
    fn outer_whitespace_is_trimmed() {
        let source = "  123 + 5  ";
        let file = file(source);
        assert_eq!(expression_text(&file, full_span(source)), "123 + 5");
    }

    #[test]
    fn boundary_comments_are_trimmed_but_interior_ones_kept() {
        let source = " /* lead */ a /* mid */ b /* tail */ ";
        let file = file(source);
        assert_eq!(
            expression_text(&file, full_span(source)),
            "a /* mid */ b"
        );
    }

    #[test]
    fn string_literal_spelling_is_preserved() {
        let source = "\"v\"";
        let file = file(source);
        assert_eq!(expression_text(&file, full_span(source)), "\"v\"");
    }

    #[test]
    fn out_of_range_span_yields_empty_text() {
        let file = file("abc");
        assert_eq!(expression_text(&file, Span::new(1, 99)), "");
    }

    #[test]
    fn line_number_uses_physical_numbering_without_directives() {
        let file = file("a();\nb();\nc();\n");
        let map = LineMap::default();
        assert_eq!(line_number(&file, &map, 5), Some(2));
        assert_eq!(line_number(&file, &map, 999), None);
    }

    #[test]
    fn line_number_honors_line_directives() {
        // Physical layout: line 1 code, line 2 directive, line 3 code.
        let file = file("a();\n#line 30 \"abc\"\nb();\n");
        let map = LineMap::new(vec![LineDirective::map(2, 30, Some("abc"))]);
        let offset_of_b = file.source.find("b()").unwrap();
        assert_eq!(line_number(&file, &map, offset_of_b), Some(30));
        assert_eq!(file_path(&file, &map, offset_of_b), "abc");
    }

    #[test]
    fn file_path_defaults_to_the_physical_file() {
        let file = file("a();\n");
        let map = LineMap::default();
        assert_eq!(file_path(&file, &map, 0), "src/program.cm");
    }
}
