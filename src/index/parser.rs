//! Parser for Doxygen's client-side search data files.
//!
//! Fragment files (`functions_b.js` and friends) hold a single declaration,
//! `var searchData = [ ... ];`, whose elements are
//! `['key', ['Display', ['url', 0|1, 'scope'], ...]]`. `searchdata.js`
//! declares the section table as two small object literals. Display and
//! scope strings are HTML-escaped on disk and unescaped here.

use super::types::{Entry, SectionRow, SectionTable, Target};
use std::fmt;

/// Parse failure with the byte offset it occurred at.
#[derive(Debug)]
pub struct ParseError {
    pub offset: usize,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte {}", self.message, self.offset)
    }
}

impl std::error::Error for ParseError {}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Cursor { src, pos: 0 }
    }

    fn bytes(&self) -> &'a [u8] {
        self.src.as_bytes()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes().get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        loop {
            match self.peek() {
                Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => self.pos += 1,
                // A leading byte-order mark is tolerated.
                Some(0xef) if self.bytes()[self.pos..].starts_with(b"\xef\xbb\xbf") => {
                    self.pos += 3
                }
                _ => break,
            }
        }
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, byte: u8, what: &str) -> Result<(), ParseError> {
        if self.eat(byte) {
            Ok(())
        } else {
            Err(self.err(what.to_string()))
        }
    }

    fn err(&self, message: String) -> ParseError {
        ParseError {
            offset: self.pos,
            message,
        }
    }

    /// `[A-Za-z_][A-Za-z0-9_]*`
    fn parse_ident(&mut self) -> Result<&'a str, ParseError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || b == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.pos == start || self.bytes()[start].is_ascii_digit() {
            return Err(self.err("expected an identifier".to_string()));
        }
        Ok(&self.src[start..self.pos])
    }

    /// Single- or double-quoted string with backslash escapes.
    fn parse_string(&mut self) -> Result<String, ParseError> {
        let quote = match self.peek() {
            Some(q @ (b'\'' | b'"')) => q,
            _ => return Err(self.err("expected a string literal".to_string())),
        };
        self.pos += 1;

        let mut out = String::new();
        let mut start = self.pos;
        loop {
            match self.peek() {
                None => return Err(self.err("unterminated string literal".to_string())),
                Some(b) if b == quote => {
                    out.push_str(&self.src[start..self.pos]);
                    self.pos += 1;
                    return Ok(out);
                }
                Some(b'\\') => {
                    out.push_str(&self.src[start..self.pos]);
                    self.pos += 1;
                    match self.peek() {
                        None => {
                            return Err(self.err("unterminated string literal".to_string()));
                        }
                        Some(b'n') => out.push('\n'),
                        Some(b't') => out.push('\t'),
                        Some(b'r') => out.push('\r'),
                        // \' \" \\ and any other ASCII byte: keep the
                        // escaped character itself.
                        Some(other) if other.is_ascii() => out.push(other as char),
                        // A multibyte character after a backslash keeps the
                        // backslash; the character is copied on the next pass.
                        Some(_) => {
                            out.push('\\');
                            start = self.pos;
                            continue;
                        }
                    }
                    self.pos += 1;
                    start = self.pos;
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn parse_int(&mut self) -> Result<u32, ParseError> {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.err("expected a number".to_string()));
        }
        self.src[start..self.pos]
            .parse::<u32>()
            .map_err(|_| self.err("number out of range".to_string()))
    }
}

/// Parse one fragment file into its ordered entries.
pub fn parse_fragment(source: &str) -> Result<Vec<Entry>, ParseError> {
    let mut cur = Cursor::new(source);
    cur.skip_ws();
    skip_declaration_preamble(&mut cur)?;
    cur.skip_ws();
    cur.expect(b'[', "expected '[' to open the search data array")?;

    let mut entries = Vec::new();
    cur.skip_ws();
    if !cur.eat(b']') {
        loop {
            entries.push(parse_entry(&mut cur)?);
            cur.skip_ws();
            if cur.eat(b',') {
                cur.skip_ws();
                if cur.eat(b']') {
                    break;
                }
                continue;
            }
            cur.expect(b']', "expected ',' or ']' after an entry")?;
            break;
        }
    }

    cur.skip_ws();
    let _ = cur.eat(b';');
    cur.skip_ws();
    if !cur.at_end() {
        return Err(cur.err("trailing data after the search data array".to_string()));
    }
    Ok(entries)
}

/// Consume an optional `var searchData =` preamble.
fn skip_declaration_preamble(cur: &mut Cursor) -> Result<(), ParseError> {
    if cur.peek() != Some(b'v') {
        return Ok(());
    }
    let ident = cur.parse_ident()?;
    if ident != "var" {
        return Err(cur.err(format!("expected 'var', found '{}'", ident)));
    }
    cur.skip_ws();
    cur.parse_ident()?;
    cur.skip_ws();
    cur.expect(b'=', "expected '=' after declaration name")?;
    Ok(())
}

fn parse_entry(cur: &mut Cursor) -> Result<Entry, ParseError> {
    cur.expect(b'[', "expected '[' to open an entry")?;
    cur.skip_ws();
    let key = cur.parse_string()?;
    cur.skip_ws();
    cur.expect(b',', "expected ',' after an entry key")?;
    cur.skip_ws();
    cur.expect(b'[', "expected '[' to open an entry body")?;
    cur.skip_ws();
    let display = unescape_html(&cur.parse_string()?);

    let mut targets = Vec::new();
    loop {
        cur.skip_ws();
        if cur.eat(b']') {
            break;
        }
        cur.expect(b',', "expected ',' before a link target")?;
        cur.skip_ws();
        targets.push(parse_target(cur)?);
    }
    if targets.is_empty() {
        return Err(cur.err(format!("entry '{}' has no link targets", key)));
    }

    cur.skip_ws();
    cur.expect(b']', "expected ']' to close an entry")?;
    Ok(Entry {
        key,
        display,
        targets,
    })
}

fn parse_target(cur: &mut Cursor) -> Result<Target, ParseError> {
    cur.expect(b'[', "expected '[' to open a link target")?;
    cur.skip_ws();
    let url = cur.parse_string()?;
    cur.skip_ws();
    cur.expect(b',', "expected ',' after a target url")?;
    cur.skip_ws();
    let local = match cur.parse_int()? {
        0 => false,
        1 => true,
        other => {
            return Err(cur.err(format!("target flag must be 0 or 1, found {}", other)));
        }
    };
    cur.skip_ws();
    cur.expect(b',', "expected ',' after a target flag")?;
    cur.skip_ws();
    let scope = unescape_html(&cur.parse_string()?);
    cur.skip_ws();
    cur.expect(b']', "expected ']' to close a link target")?;
    Ok(Target { url, local, scope })
}

/// Parse `searchdata.js`: the section names plus, per section, the string
/// of first characters that have a fragment file.
pub fn parse_section_table(source: &str) -> Result<SectionTable, ParseError> {
    let mut cur = Cursor::new(source);
    let mut names: Vec<(u32, String)> = Vec::new();
    let mut contents: Vec<(u32, String)> = Vec::new();

    loop {
        cur.skip_ws();
        if cur.at_end() {
            break;
        }
        let keyword = cur.parse_ident()?;
        if keyword != "var" {
            return Err(cur.err(format!("expected 'var', found '{}'", keyword)));
        }
        cur.skip_ws();
        let ident = cur.parse_ident()?.to_string();
        cur.skip_ws();
        cur.expect(b'=', "expected '=' after declaration name")?;
        let pairs = parse_index_object(&mut cur)?;
        match ident.as_str() {
            "indexSectionsWithContent" => contents = pairs,
            "indexSectionNames" => names = pairs,
            // Other declarations (search result labels etc.) are not ours.
            _ => {}
        }
        cur.skip_ws();
        let _ = cur.eat(b';');
    }

    if names.is_empty() {
        return Err(ParseError {
            offset: 0,
            message: "no indexSectionNames declaration found".to_string(),
        });
    }

    names.sort_by_key(|(idx, _)| *idx);
    let rows = names
        .into_iter()
        .map(|(idx, name)| {
            let buckets = contents
                .iter()
                .find(|(i, _)| *i == idx)
                .map(|(_, s)| s.clone())
                .unwrap_or_default();
            SectionRow { name, buckets }
        })
        .collect();
    Ok(SectionTable { rows })
}

/// `{ 0: "value", 1: "value" }`, integer keys optionally quoted.
fn parse_index_object(cur: &mut Cursor) -> Result<Vec<(u32, String)>, ParseError> {
    cur.skip_ws();
    cur.expect(b'{', "expected '{' to open an index table")?;
    let mut pairs = Vec::new();
    cur.skip_ws();
    if cur.eat(b'}') {
        return Ok(pairs);
    }
    loop {
        cur.skip_ws();
        let idx = if matches!(cur.peek(), Some(b'\'' | b'"')) {
            let raw = cur.parse_string()?;
            raw.parse::<u32>()
                .map_err(|_| cur.err(format!("expected a numeric section id, found '{}'", raw)))?
        } else {
            cur.parse_int()?
        };
        cur.skip_ws();
        cur.expect(b':', "expected ':' after a section id")?;
        cur.skip_ws();
        let value = cur.parse_string()?;
        pairs.push((idx, value));
        cur.skip_ws();
        if cur.eat(b',') {
            cur.skip_ws();
            if cur.eat(b'}') {
                break;
            }
            continue;
        }
        cur.expect(b'}', "expected ',' or '}' in an index table")?;
        break;
    }
    Ok(pairs)
}

/// Decode the HTML entities Doxygen writes into display and scope strings.
/// Unknown entities and stray ampersands are kept verbatim.
pub fn unescape_html(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        // Entities are short; a distant ';' is not one.
        let decoded = rest.find(';').filter(|&semi| semi < 10).and_then(|semi| {
            let entity = &rest[1..semi];
            let c = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ if entity.starts_with("#x") || entity.starts_with("#X") => {
                    u32::from_str_radix(&entity[2..], 16)
                        .ok()
                        .and_then(char::from_u32)
                }
                _ if entity.starts_with('#') => {
                    entity[1..].parse::<u32>().ok().and_then(char::from_u32)
                }
                _ => None,
            };
            c.map(|c| (c, semi))
        });

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
