//! Parser for serialized string lists
//!
//! Trainer executions store their hyperparameters as the `str()` of a
//! Python list, e.g. `['batch_size=256', "optimizer='adam'"]`. This module
//! reads a list or tuple of string literals in that syntax.

use crate::{Error, Result};

/// Parse a Python list (or tuple) literal whose items are all strings.
///
/// Supports single and double quotes, `u`/`r` string prefixes, the usual
/// backslash escapes and a trailing comma.
///
/// # Errors
///
/// Returns [`Error::ParseError`] if the input is not such a literal.
///
/// # Example
///
/// ```rust
/// use bench_overview::results::parse_string_list;
///
/// let items = parse_string_list(r#"['batch_size=256', "lr=0.1",]"#)?;
/// assert_eq!(items, vec!["batch_size=256", "lr=0.1"]);
/// # Ok::<(), bench_overview::Error>(())
/// ```
pub fn parse_string_list(input: &str) -> Result<Vec<String>> {
    let mut parser = Parser::new(input);
    let items = parser.list()?;
    parser.skip_whitespace();
    if let Some(c) = parser.peek() {
        return Err(parser.error(&format!("unexpected '{c}' after end of list")));
    }
    Ok(items)
}

struct Parser<'a> {
    input: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, message: &str) -> Error {
        Error::ParseError(format!("{message} at offset {} in {:?}", self.pos, self.input))
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn list(&mut self) -> Result<Vec<String>> {
        self.skip_whitespace();
        let close = match self.next() {
            Some('[') => ']',
            Some('(') => ')',
            _ => return Err(self.error("expected '[' or '('")),
        };

        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok(items);
            }
            items.push(self.string()?);
            self.skip_whitespace();
            match self.next() {
                Some(',') => {}
                Some(c) if c == close => return Ok(items),
                _ => return Err(self.error(&format!("expected ',' or '{close}'"))),
            }
        }
    }

    fn string(&mut self) -> Result<String> {
        let mut raw = false;
        while let Some(prefix) = self.peek().filter(|c| matches!(*c, 'u' | 'U' | 'r' | 'R')) {
            raw |= matches!(prefix, 'r' | 'R');
            self.pos += 1;
        }

        let quote = match self.next() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(self.error("expected string literal")),
        };

        let mut value = String::new();
        loop {
            match self.next() {
                None | Some('\n') => return Err(self.error("unterminated string literal")),
                Some(c) if c == quote => return Ok(value),
                Some('\\') if raw => {
                    // Raw strings keep the backslash but still cannot end on an escaped quote
                    value.push('\\');
                    if let Some(c) = self.next() {
                        value.push(c);
                    }
                }
                Some('\\') => self.escape(&mut value)?,
                Some(c) => value.push(c),
            }
        }
    }

    fn escape(&mut self, value: &mut String) -> Result<()> {
        let Some(c) = self.next() else {
            return Err(self.error("unterminated escape sequence"));
        };
        match c {
            '\n' => {}
            '\\' | '\'' | '"' => value.push(c),
            'n' => value.push('\n'),
            'r' => value.push('\r'),
            't' => value.push('\t'),
            '0' => value.push('\0'),
            'a' => value.push('\u{07}'),
            'b' => value.push('\u{08}'),
            'f' => value.push('\u{0C}'),
            'v' => value.push('\u{0B}'),
            'x' => value.push(self.code_point(2)?),
            'u' => value.push(self.code_point(4)?),
            'U' => value.push(self.code_point(8)?),
            other => {
                value.push('\\');
                value.push(other);
            }
        }
        Ok(())
    }

    fn code_point(&mut self, digits: usize) -> Result<char> {
        let end = self.pos + digits;
        if end > self.chars.len() {
            return Err(self.error("truncated escape sequence"));
        }
        let hex: String = self.chars[self.pos..end].iter().collect();
        let code = u32::from_str_radix(&hex, 16)
            .map_err(|_| self.error(&format!("invalid escape digits '{hex}'")))?;
        let c = char::from_u32(code).ok_or_else(|| self.error("invalid code point"))?;
        self.pos = end;
        Ok(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_list() {
        assert!(parse_string_list("[]").unwrap().is_empty());
        assert!(parse_string_list("  ( ) ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_mixed_quotes() {
        let items = parse_string_list(r#"['a=1', "b='x'", 'c="y"']"#).unwrap();
        assert_eq!(items, vec!["a=1", "b='x'", "c=\"y\""]);
    }

    #[test]
    fn test_parse_tuple_and_trailing_comma() {
        assert_eq!(parse_string_list("('a=1',)").unwrap(), vec!["a=1"]);
        assert_eq!(parse_string_list("['a=1', ]").unwrap(), vec!["a=1"]);
    }

    #[test]
    fn test_parse_escapes() {
        let items = parse_string_list(r"['it\'s', 'tab\there', '\x41é', 'keep\d']").unwrap();
        assert_eq!(items, vec!["it's", "tab\there", "Aé", "keep\\d"]);
    }

    #[test]
    fn test_parse_prefixed_strings() {
        let items = parse_string_list(r"[u'a=1', r'b=\n']").unwrap();
        assert_eq!(items, vec!["a=1", "b=\\n"]);
    }

    #[test]
    fn test_parse_errors() {
        for input in [
            "",
            "batch_size=256",
            "['a'",
            "['a' 'b']",
            "[1, 2]",
            "['a'] extra",
            "['unterminated]",
            "['bad \\x4']",
        ] {
            let err = parse_string_list(input).unwrap_err();
            assert!(matches!(err, Error::ParseError(_)), "input {input:?}");
        }
    }
}
