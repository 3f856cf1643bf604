//! Structural wikitext stripping.
//!
//! Reduces markup to its readable content:
//! - comments, templates, tables and invisible extension tags are dropped
//! - `[[target|display]]` keeps `display`, `[[target]]` keeps `target`
//! - `[url text]` keeps `text`
//! - bold/italic quotes, heading equals signs, list bullets, rules and
//!   behaviour switches are removed
//! - character references are decoded
//!
//! The scanner works on bytes. Every delimiter it looks for is ASCII, so cut
//! points always fall on UTF-8 boundaries.

use lazy_static::lazy_static;
use regex::Regex;

use super::Stage;

/// Extension tags whose content is never rendered as article prose.
const INVISIBLE_TAGS: &[&str] = &[
    "ref",
    "references",
    "gallery",
    "math",
    "chem",
    "timeline",
    "score",
    "graph",
    "imagemap",
    "inputbox",
    "categorytree",
    "templatedata",
    "syntaxhighlight",
    "source",
];

/// URL schemes that start an external link in single brackets.
const URL_SCHEMES: &[&str] = &["http://", "https://", "ftp://", "ftps://", "mailto:", "//"];

lazy_static! {
    static ref RE_INVISIBLE: Vec<(Regex, Regex)> = INVISIBLE_TAGS
        .iter()
        .map(|tag| {
            let single = Regex::new(&format!(r"(?i)<{tag}(?:\s[^>]*)?/>")).unwrap();
            let paired =
                Regex::new(&format!(r"(?is)<{tag}(?:\s[^>]*[^/>])?>.*?</{tag}\s*>")).unwrap();
            (single, paired)
        })
        .collect();

    static ref RE_BEHAVIOUR_SWITCH: Regex = Regex::new(r"__[A-Z]+__").unwrap();

    static ref RE_HORIZONTAL_RULE: Regex = Regex::new(r"^-{4,}\s*$").unwrap();
}

/// Stage 1: structural markup strip.
#[derive(Debug, Clone, Copy, Default)]
pub struct StripMarkup;

impl Stage for StripMarkup {
    fn name(&self) -> &'static str {
        "strip-markup"
    }

    fn apply(&self, text: &str) -> String {
        strip_markup(text)
    }
}

/// Convert wikitext to readable text.
pub fn strip_markup(text: &str) -> String {
    let text = remove_comments(text);
    let text = remove_invisible_tags(&text);
    let text = remove_balanced(&text, "{{", "}}");
    let text = remove_balanced(&text, "{|", "|}");
    let text = strip_inline(&text);
    let text = strip_lines(&text);
    RE_BEHAVIOUR_SWITCH.replace_all(&text, "").into_owned()
}

/// Remove `<!-- ... -->`. An unterminated comment swallows the rest.
fn remove_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("<!--") {
        out.push_str(&rest[..start]);
        match rest[start + 4..].find("-->") {
            Some(end) => rest = &rest[start + 4 + end + 3..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

fn remove_invisible_tags(text: &str) -> String {
    let mut text = text.to_string();
    for (single, paired) in RE_INVISIBLE.iter() {
        if single.is_match(&text) {
            text = single.replace_all(&text, "").into_owned();
        }
        if paired.is_match(&text) {
            text = paired.replace_all(&text, "").into_owned();
        }
    }
    text
}

/// Drop every balanced `open ... close` span in one pass.
///
/// Each opener records where it started in the output; its closer truncates
/// back to that point. Openers still pending at the end stay literal, and a
/// closer with nothing open is copied through.
fn remove_balanced(text: &str, open: &str, close: &str) -> String {
    let bytes = text.as_bytes();
    let (open, close) = (open.as_bytes(), close.as_bytes());
    let mut out = Vec::with_capacity(bytes.len());
    let mut starts: Vec<usize> = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i..].starts_with(open) {
            starts.push(out.len());
            out.extend_from_slice(open);
            i += open.len();
        } else if bytes[i..].starts_with(close) {
            match starts.pop() {
                Some(start) => out.truncate(start),
                None => out.extend_from_slice(close),
            }
            i += close.len();
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    into_string(out)
}

/// An internal link whose closing `]]` has not been seen yet.
struct OpenLink {
    /// Output offset where the link's text begins
    start: usize,
    /// A leading `:` was skipped
    colon: bool,
    /// Target text split off at the first `|`
    target: Option<Vec<u8>>,
}

/// Links, external links, bold/italic quotes and character references.
///
/// Link text is written straight to the output. The first `|` of a link moves
/// the target written so far out of the way, so closing a link costs nothing
/// and nesting depth costs heap rather than call stack.
fn strip_inline(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut links: Vec<OpenLink> = Vec::new();
    // No external link opening before this offset can be closed
    let mut unclosed_until = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i..].starts_with(b"[[") {
            i += 2;
            let colon = bytes.get(i) == Some(&b':');
            if colon {
                i += 1;
            }
            links.push(OpenLink {
                start: out.len(),
                colon,
                target: None,
            });
            continue;
        }
        if bytes[i..].starts_with(b"]]") {
            if links.pop().is_none() {
                out.extend_from_slice(b"]]");
            }
            i += 2;
            continue;
        }

        match bytes[i] {
            b'|' => {
                match links.last_mut() {
                    Some(link) if link.target.is_none() => {
                        link.target = Some(out.split_off(link.start));
                    }
                    _ => out.push(b'|'),
                }
                i += 1;
            }
            b'[' if i >= unclosed_until && starts_with_url(&text[i + 1..]) => {
                match external_link_end(&text[i + 1..]) {
                    Ok(len) => {
                        let inner = &text[i + 1..i + 1 + len];
                        if let Some((_, label)) = inner.split_once(' ') {
                            // a label holds no `]`, so this recurses one level at most
                            out.extend_from_slice(strip_inline(label.trim()).as_bytes());
                        }
                        i += len + 2;
                    }
                    Err(line_len) => {
                        unclosed_until = i + 1 + line_len;
                        out.push(b'[');
                        i += 1;
                    }
                }
            }
            b'\'' if bytes[i..].starts_with(b"''") => {
                let run = bytes[i..].iter().take_while(|&&b| b == b'\'').count();
                // '''' is an apostrophe followed by bold; more than five leaves the excess
                let literal = match run {
                    4 => 1,
                    n if n > 5 => n - 5,
                    _ => 0,
                };
                out.extend(std::iter::repeat(b'\'').take(literal));
                i += run;
            }
            b'&' => match decode_entity(&text[i..]) {
                Some((c, len)) => {
                    let mut utf8 = [0u8; 4];
                    out.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
                    i += len;
                }
                None => {
                    out.push(b'&');
                    i += 1;
                }
            },
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    if links.is_empty() {
        return into_string(out);
    }
    // Unclosed links stay literal. Their starts are non-decreasing.
    let mut literal = Vec::with_capacity(out.len() + 2 * links.len());
    let mut copied = 0;
    for link in links {
        literal.extend_from_slice(&out[copied..link.start]);
        literal.extend_from_slice(b"[[");
        if link.colon {
            literal.push(b':');
        }
        if let Some(target) = link.target {
            literal.extend_from_slice(&target);
            literal.push(b'|');
        }
        copied = link.start;
    }
    literal.extend_from_slice(&out[copied..]);
    into_string(literal)
}

/// Byte length of an external link body up to its `]`.
///
/// External links end with the line. `Err` carries the distance to the end
/// of the line when nothing closes the link.
fn external_link_end(text: &str) -> Result<usize, usize> {
    match text.find(&[']', '\n'][..]) {
        Some(pos) if text.as_bytes()[pos] == b']' => Ok(pos),
        Some(pos) => Err(pos),
        None => Err(text.len()),
    }
}

fn starts_with_url(text: &str) -> bool {
    let bytes = text.as_bytes();
    URL_SCHEMES.iter().any(|scheme| {
        bytes.len() >= scheme.len() && bytes[..scheme.len()].eq_ignore_ascii_case(scheme.as_bytes())
    })
}

/// Decode a character reference at the start of `text`.
///
/// Returns the character and the byte length of the reference.
fn decode_entity(text: &str) -> Option<(char, usize)> {
    let end = text.bytes().take(12).position(|b| b == b';')?;
    let body = &text[1..end];
    let c = if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix(&['x', 'X'][..]) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        };
        char::from_u32(code)?
    } else {
        named_entity(body)?
    };
    Some((c, end + 1))
}

fn named_entity(name: &str) -> Option<char> {
    Some(match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{00A0}',
        "ensp" => '\u{2002}',
        "emsp" => '\u{2003}',
        "thinsp" => '\u{2009}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "minus" => '\u{2212}',
        "hellip" => '\u{2026}',
        "laquo" => '\u{00AB}',
        "raquo" => '\u{00BB}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        "times" => '\u{00D7}',
        "deg" => '\u{00B0}',
        "copy" => '\u{00A9}',
        "reg" => '\u{00AE}',
        "middot" => '\u{00B7}',
        "bull" => '\u{2022}',
        _ => return None,
    })
}

/// Headings, list bullets and horizontal rules.
fn strip_lines(text: &str) -> String {
    text.lines()
        .map(|line| {
            let line = line.trim_end();
            if RE_HORIZONTAL_RULE.is_match(line) {
                return "";
            }
            if line.len() > 1 && line.starts_with('=') && line.ends_with('=') {
                return line.trim_matches('=').trim();
            }
            line.trim_start_matches(&['*', '#', ':', ';'][..]).trim_start()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn into_string(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}
