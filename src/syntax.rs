use lazy_static::lazy_static;
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;

lazy_static! {
    static ref SYNTAX_SET: SyntaxSet = SyntaxSet::load_defaults_newlines();
    static ref THEME_SET: ThemeSet = ThemeSet::load_defaults();
}

/// Highlight one C++ signature for inline terminal output. Falls back to
/// plain text if the grammar is missing or the line does not parse.
pub fn highlight_cpp_code(code: &str) -> String {
    let syntax = SYNTAX_SET
        .find_syntax_by_extension("cpp")
        .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text());
    let mut h = HighlightLines::new(syntax, &THEME_SET.themes["base16-ocean.dark"]);

    // Scope labels are single signatures; the grammar wants the newline
    let line = format!("{}\n", code);
    let Ok(ranges) = h.highlight_line(&line, &SYNTAX_SET) else {
        return code.to_string();
    };
    let escaped = syntect::util::as_24_bit_terminal_escaped(&ranges, false);
    escaped.trim_end().to_string()
}
