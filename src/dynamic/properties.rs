//! Parser for the flat `key=value` property list served by the remote source.
//!
//! Follows the usual `.properties` rules:
//! - `#` and `!` start comment lines
//! - key and value are separated by `=`, `:` or whitespace
//! - a trailing odd backslash continues the logical line
//! - `\t \n \r \f \uXXXX` escapes; any other escaped char stands for itself

use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PropertiesError {
    #[error("malformed \\uxxxx escape on line {0}")]
    MalformedUnicode(usize),
}

/// Parse a property list. Later duplicates replace earlier ones.
pub fn parse_properties(input: &str) -> Result<BTreeMap<String, String>, PropertiesError> {
    let mut props = BTreeMap::new();
    let mut lines = input.lines().enumerate();

    while let Some((idx, raw)) = lines.next() {
        let line = raw.trim_start_matches(is_blank);
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let mut logical = line.to_string();
        while continues(&logical) {
            logical.pop();
            match lines.next() {
                Some((_, next)) => logical.push_str(next.trim_start_matches(is_blank)),
                None => break,
            }
        }

        let line_no = idx + 1;
        let (key, value) = split_key_value(&logical);
        props.insert(unescape(key, line_no)?, unescape(value, line_no)?);
    }

    Ok(props)
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => return (&line[..i], line[i + 1..].trim_start_matches(is_blank)),
            c if is_blank(c) => {
                let rest = line[i..].trim_start_matches(is_blank);
                let rest = rest.strip_prefix(|c: char| c == '=' || c == ':').unwrap_or(rest);
                return (&line[..i], rest.trim_start_matches(is_blank));
            }
            _ => {}
        }
    }
    (line, "")
}

fn unescape(raw: &str, line: usize) -> Result<String, PropertiesError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let unit = read_utf16_unit(&mut chars, line)?;
                if (0xD800..0xDC00).contains(&unit) {
                    // High surrogate; pair it with a following \uXXXX if present.
                    let mut ahead = chars.clone();
                    if ahead.next() == Some('\\') && ahead.next() == Some('u') {
                        let low = read_utf16_unit(&mut ahead, line)?;
                        if let Some(Ok(ch)) = char::decode_utf16([unit, low]).next() {
                            out.push(ch);
                            chars = ahead;
                            continue;
                        }
                    }
                    out.push(char::REPLACEMENT_CHARACTER);
                } else {
                    out.push(char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER));
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

fn read_utf16_unit(chars: &mut std::str::Chars<'_>, line: usize) -> Result<u16, PropertiesError> {
    let hex: String = chars.by_ref().take(4).collect();
    if hex.len() != 4 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(PropertiesError::MalformedUnicode(line));
    }
    u16::from_str_radix(&hex, 16).map_err(|_| PropertiesError::MalformedUnicode(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separators_and_comments() {
        let props = parse_properties(
            "# comment\n\
             ! also a comment\n\
             \n\
             a=1\n\
             b : 2\n\
             c 3\n\
             d\n\
             \x20\x20e = spaced value  \n",
        )
        .unwrap();

        assert_eq!(props.len(), 5);
        assert_eq!(props["a"], "1");
        assert_eq!(props["b"], "2");
        assert_eq!(props["c"], "3");
        assert_eq!(props["d"], "");
        assert_eq!(props["e"], "spaced value  ");
    }

    #[test]
    fn test_line_continuation() {
        let props = parse_properties("list = a,\\\n    b,\\\n    c\nnext=x\n").unwrap();
        assert_eq!(props["list"], "a,b,c");
        assert_eq!(props["next"], "x");
    }

    #[test]
    fn test_escaped_backslash_does_not_continue() {
        let props = parse_properties("path=C:\\\\\nnext=x\n").unwrap();
        assert_eq!(props["path"], "C:\\");
        assert_eq!(props["next"], "x");
    }

    #[test]
    fn test_escapes() {
        let props = parse_properties(
            "key\\=with\\:sep=tab\\there\nuni=caf\\u00e9\nemoji=\\ud83d\\ude00\n",
        )
        .unwrap();
        assert_eq!(props["key=with:sep"], "tab\there");
        assert_eq!(props["uni"], "café");
        assert_eq!(props["emoji"], "😀");
    }

    #[test]
    fn test_malformed_unicode() {
        assert_eq!(
            parse_properties("ok=1\nbad=\\u12G4\n"),
            Err(PropertiesError::MalformedUnicode(2))
        );
    }

    #[test]
    fn test_unicode_escape_requires_four_hex_digits() {
        assert_eq!(
            parse_properties("k=\\u+041\n"),
            Err(PropertiesError::MalformedUnicode(1))
        );
        assert_eq!(
            parse_properties("k=\\u-041\n"),
            Err(PropertiesError::MalformedUnicode(1))
        );
        assert_eq!(
            parse_properties("a=1\nk=\\u12"),
            Err(PropertiesError::MalformedUnicode(2))
        );
    }

    #[test]
    fn test_duplicates_last_wins() {
        let props = parse_properties("a=1\na=2\n").unwrap();
        assert_eq!(props["a"], "2");
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_properties("").unwrap().is_empty());
        assert!(parse_properties("# only comments\n").unwrap().is_empty());
    }
}
