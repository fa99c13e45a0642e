//! # Restricted Literal Parsing
//!
//! Database drivers frequently hand back numbers, flags and arrays as text. This
//! module turns such text into typed JSON values without evaluating anything: it
//! only understands numbers, booleans, the null literal, quoted strings, and
//! bracketed lists or parenthesized tuples of those. Anything else is rejected.

use serde_json::{Number, Value};
use std::iter::Peekable;
use std::str::Chars;

/// Nesting limit for lists and tuples.
const MAX_DEPTH: usize = 32;

/// Parses `text` as a literal, returning `None` if it is anything else.
pub fn try_parse_literal(text: &str) -> Option<Value> {
    let mut parser = LiteralParser {
        chars: text.trim().chars().peekable(),
        depth: 0,
    };
    let value = parser.value()?;
    parser.skip_whitespace();
    match parser.chars.next() {
        None => Some(value),
        Some(_) => None,
    }
}

/// Coerces a database value: strings that parse as literals become typed values,
/// everything else is returned unchanged.
pub fn coerce_value(value: Value) -> Value {
    match value {
        Value::String(s) => try_parse_literal(&s).unwrap_or(Value::String(s)),
        other => other,
    }
}

struct LiteralParser<'a> {
    chars: Peekable<Chars<'a>>,
    depth: usize,
}

impl LiteralParser<'_> {
    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
    }

    fn value(&mut self) -> Option<Value> {
        self.skip_whitespace();
        match *self.chars.peek()? {
            '\'' | '"' => self.string().map(Value::String),
            '[' => self.sequence('[', ']'),
            '(' => self.sequence('(', ')'),
            c if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => self.number(),
            c if c.is_ascii_alphabetic() => self.keyword(),
            _ => None,
        }
    }

    fn keyword(&mut self) -> Option<Value> {
        let mut word = String::new();
        while let Some(c) = self.chars.next_if(|c| c.is_ascii_alphanumeric() || *c == '_') {
            word.push(c);
        }
        match word.as_str() {
            "True" | "true" => Some(Value::Bool(true)),
            "False" | "false" => Some(Value::Bool(false)),
            "None" | "null" => Some(Value::Null),
            _ => None,
        }
    }

    fn number(&mut self) -> Option<Value> {
        let mut raw = String::new();
        if let Some(sign) = self.chars.next_if(|c| *c == '-' || *c == '+') {
            raw.push(sign);
        }
        let mut is_float = false;
        while let Some(c) = self
            .chars
            .next_if(|c| c.is_ascii_digit() || matches!(*c, '.' | 'e' | 'E' | '_'))
        {
            match c {
                '_' => continue,
                '.' | 'e' | 'E' => is_float = true,
                _ => {}
            }
            raw.push(c);
            // Exponent sign.
            if matches!(c, 'e' | 'E') {
                if let Some(sign) = self.chars.next_if(|c| *c == '-' || *c == '+') {
                    raw.push(sign);
                }
            }
        }
        if !raw.chars().any(|c| c.is_ascii_digit()) {
            return None;
        }
        if is_float {
            let parsed: f64 = raw.parse().ok()?;
            Number::from_f64(parsed).map(Value::Number)
        } else {
            // Leading zeros are not an integer literal ("007", zip codes).
            let digits = raw.trim_start_matches(['-', '+']);
            if digits.len() > 1 && digits.starts_with('0') {
                return None;
            }
            let parsed: i64 = raw.parse().ok()?;
            Some(Value::Number(parsed.into()))
        }
    }

    fn string(&mut self) -> Option<String> {
        let quote = self.chars.next()?;
        let mut out = String::new();
        loop {
            match self.chars.next()? {
                c if c == quote => return Some(out),
                '\\' => match self.chars.next()? {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    '0' => out.push('\0'),
                    c @ ('\\' | '\'' | '"') => out.push(c),
                    other => {
                        out.push('\\');
                        out.push(other);
                    }
                },
                '\n' => return None,
                c => out.push(c),
            }
        }
    }

    /// Parses `[a, b]`, `(a, b)`, `(a,)` and `()`. A parenthesized single value
    /// without a trailing comma is the value itself, not a tuple.
    fn sequence(&mut self, open: char, close: char) -> Option<Value> {
        if self.depth >= MAX_DEPTH {
            return None;
        }
        self.depth += 1;
        self.chars.next_if_eq(&open)?;

        let mut items = Vec::new();
        let mut saw_comma = false;
        loop {
            self.skip_whitespace();
            if self.chars.next_if_eq(&close).is_some() {
                break;
            }
            items.push(self.value()?);
            self.skip_whitespace();
            if self.chars.next_if_eq(&',').is_some() {
                saw_comma = true;
                continue;
            }
            self.chars.next_if_eq(&close)?;
            break;
        }
        self.depth -= 1;

        if open == '(' && items.len() == 1 && !saw_comma {
            return items.pop();
        }
        Some(Value::Array(items))
    }
}
