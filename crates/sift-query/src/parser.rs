//! SQL fragment parser.
//!
//! Search filters describe their predicates as small SQL `WHERE` fragments
//! with positional placeholders:
//!
//! ```text
//! "Title" = ?
//! ("Title" != ? OR "Title" IS NULL)
//! "Status" IN (?, ?, ?)
//! MATCH ("Body") AGAINST (?)
//! ```
//!
//! [`parse_fragment`] tokenises a fragment, parses it with `AND` binding
//! tighter than `OR` (parentheses group), and substitutes the placeholders
//! with the supplied values in order. Operator text is carried through
//! verbatim; turning it into an [`Op`](crate::Op) is the engine's job.

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;
use std::vec::IntoIter;

use tracing::{debug, trace};

use crate::value::Value;

/// Logical connector following a term in its fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    And,
    Or,
}

/// One comparison from a fragment, with its placeholder already substituted.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTerm {
    /// Field name from the quoted identifier.
    pub field: String,
    /// Operator text, upper-cased with single spaces (`"NOT LIKE"`).
    pub operator: String,
    /// Substituted literal. `(?, ?)` placeholders produce a list.
    pub value: Value,
    /// The connector that followed this term, if any.
    pub connector: Option<Connector>,
}

/// Parsed shape of a fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Term(ParsedTerm),
    /// Terms joined by `AND`.
    All(Vec<Condition>),
    /// Terms joined by `OR`.
    Any(Vec<Condition>),
}

impl Condition {
    /// The terms of this condition in fragment order.
    pub fn terms(&self) -> Vec<&ParsedTerm> {
        let mut out = Vec::new();
        self.collect_terms(&mut out);
        out
    }

    fn collect_terms<'a>(&'a self, out: &mut Vec<&'a ParsedTerm>) {
        match self {
            Condition::Term(term) => out.push(term),
            Condition::All(children) | Condition::Any(children) => {
                children.iter().for_each(|c| c.collect_terms(out))
            }
        }
    }

    /// Returns `true` if the condition contains a disjunction anywhere.
    pub fn has_disjunction(&self) -> bool {
        match self {
            Condition::Term(_) => false,
            Condition::Any(_) => true,
            Condition::All(children) => children.iter().any(Condition::has_disjunction),
        }
    }

    fn set_trailing_connector(&mut self, connector: Connector) {
        match self {
            Condition::Term(term) => term.connector = Some(connector),
            Condition::All(children) | Condition::Any(children) => {
                if let Some(last) = children.last_mut() {
                    last.set_trailing_connector(connector);
                }
            }
        }
    }
}

/// Parses a fragment, substituting `params` for its placeholders.
///
/// Returns `None` for fragments that do not parse; callers skip those.
/// Excess params are ignored and missing ones read as null.
///
/// # Example
///
/// ```
/// use sift_query::{parse_fragment, Value};
///
/// let condition = parse_fragment(r#""Title" != ? OR "Title" IS NULL"#, vec![Value::from("x")])
///     .unwrap();
/// let terms = condition.terms();
/// assert_eq!(terms.len(), 2);
/// assert_eq!(terms[0].operator, "!=");
/// assert_eq!(terms[1].operator, "IS");
/// assert_eq!(terms[1].value, Value::Null);
/// ```
pub fn parse_fragment(fragment: &str, params: Vec<Value>) -> Option<Condition> {
    let supplied = params.len();
    let result = tokenize(fragment).and_then(|tokens| {
        let mut parser = Parser {
            tokens: tokens.into_iter().peekable(),
            params: params.into_iter(),
            consumed: 0,
        };
        let condition = parser.parse_or()?;
        match parser.tokens.next() {
            None => Ok((condition, parser.consumed)),
            Some(token) => Err(ParseError::Unexpected(token.to_string())),
        }
    });

    match result {
        Ok((condition, consumed)) => {
            trace!(fragment, consumed, supplied, "sift.parse");
            if consumed < supplied {
                debug!(
                    fragment,
                    ignored = supplied - consumed,
                    "sift.parse.excess_params"
                );
            }
            Some(condition)
        }
        Err(error) => {
            debug!(fragment, %error, "sift.parse.skip");
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// A `"quoted"` identifier.
    Ident(String),
    /// A bare word: keyword or operator word.
    Word(String),
    /// A comparison symbol.
    Symbol(&'static str),
    Placeholder,
    LParen,
    RParen,
    Comma,
    Dot,
}

impl Token {
    fn is_word(&self, keyword: &str) -> bool {
        matches!(self, Token::Word(w) if w.eq_ignore_ascii_case(keyword))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(name) => write!(f, "\"{name}\""),
            Token::Word(word) => write!(f, "{word}"),
            Token::Symbol(sym) => write!(f, "{sym}"),
            Token::Placeholder => write!(f, "?"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Dot => write!(f, "."),
        }
    }
}

#[derive(Debug)]
enum ParseError {
    BadCharacter(char),
    BadIdentifier(String),
    Unterminated,
    Unexpected(String),
    MissingOperator(String),
    End,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::BadCharacter(c) => write!(f, "unexpected character '{c}'"),
            ParseError::BadIdentifier(name) => write!(f, "invalid field name \"{name}\""),
            ParseError::Unterminated => write!(f, "unterminated quoted identifier"),
            ParseError::Unexpected(token) => write!(f, "unexpected token '{token}'"),
            ParseError::MissingOperator(field) => write!(f, "no operator after \"{field}\""),
            ParseError::End => write!(f, "unexpected end of fragment"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars: Peekable<CharIndices<'_>> = input.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        let token = match c {
            c if c.is_whitespace() => continue,
            '"' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some((_, '"')) => break,
                        Some((_, ch)) => name.push(ch),
                        None => return Err(ParseError::Unterminated),
                    }
                }
                let valid = !name.is_empty()
                    && name
                        .chars()
                        .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
                if !valid {
                    return Err(ParseError::BadIdentifier(name));
                }
                Token::Ident(name)
            }
            '?' => Token::Placeholder,
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            '.' => Token::Dot,
            '=' => Token::Symbol("="),
            '!' => match chars.next_if(|&(_, ch)| ch == '=') {
                Some(_) => Token::Symbol("!="),
                None => return Err(ParseError::BadCharacter('!')),
            },
            '<' => {
                if chars.next_if(|&(_, ch)| ch == '=').is_some() {
                    Token::Symbol("<=")
                } else if chars.next_if(|&(_, ch)| ch == '>').is_some() {
                    Token::Symbol("<>")
                } else {
                    Token::Symbol("<")
                }
            }
            '>' => match chars.next_if(|&(_, ch)| ch == '=') {
                Some(_) => Token::Symbol(">="),
                None => Token::Symbol(">"),
            },
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut end = start + c.len_utf8();
                while let Some((i, ch)) =
                    chars.next_if(|&(_, ch)| ch.is_ascii_alphanumeric() || ch == '_')
                {
                    end = i + ch.len_utf8();
                }
                Token::Word(input[start..end].to_string())
            }
            other => return Err(ParseError::BadCharacter(other)),
        };
        tokens.push(token);
    }

    Ok(tokens)
}

enum Placeholder {
    One,
    Many(usize),
    Null,
}

struct Parser {
    tokens: Peekable<IntoIter<Token>>,
    params: IntoIter<Value>,
    consumed: usize,
}

impl Parser {
    fn parse_or(&mut self) -> Result<Condition, ParseError> {
        let mut children = vec![self.parse_and()?];
        while self.tokens.next_if(|t| t.is_word("OR")).is_some() {
            if let Some(last) = children.last_mut() {
                last.set_trailing_connector(Connector::Or);
            }
            children.push(self.parse_and()?);
        }
        Ok(if children.len() == 1 {
            children.remove(0)
        } else {
            Condition::Any(children)
        })
    }

    fn parse_and(&mut self) -> Result<Condition, ParseError> {
        let mut children = vec![self.parse_primary()?];
        while self.tokens.next_if(|t| t.is_word("AND")).is_some() {
            if let Some(last) = children.last_mut() {
                last.set_trailing_connector(Connector::And);
            }
            children.push(self.parse_primary()?);
        }
        Ok(if children.len() == 1 {
            children.remove(0)
        } else {
            Condition::All(children)
        })
    }

    fn parse_primary(&mut self) -> Result<Condition, ParseError> {
        if self.tokens.next_if_eq(&Token::LParen).is_some() {
            let inner = self.parse_or()?;
            self.expect(Token::RParen)?;
            return Ok(inner);
        }
        self.parse_term().map(Condition::Term)
    }

    fn parse_term(&mut self) -> Result<ParsedTerm, ParseError> {
        let full_text = self.tokens.next_if(|t| t.is_word("MATCH")).is_some();
        let field = if full_text {
            self.expect(Token::LParen)?;
            let field = self.parse_field()?;
            self.expect(Token::RParen)?;
            field
        } else {
            self.parse_field()?
        };

        let mut words = Vec::new();
        while let Some(token) = self.tokens.next_if(|t| match t {
            Token::Word(_) => !t.is_word("NULL"),
            Token::Symbol(_) => true,
            _ => false,
        }) {
            words.push(token.to_string().to_ascii_uppercase());
        }
        if words.is_empty() {
            return Err(ParseError::MissingOperator(field));
        }

        let value = match self.parse_placeholder()? {
            Placeholder::Null => Value::Null,
            Placeholder::One => self.next_param(),
            // MATCH (...) AGAINST (?) takes a single value.
            Placeholder::Many(1) if full_text => self.next_param(),
            Placeholder::Many(count) => Value::List((0..count).map(|_| self.next_param()).collect()),
        };

        Ok(ParsedTerm {
            field,
            operator: words.join(" "),
            value,
            connector: None,
        })
    }

    /// `"Field"`, or `"Table"."Field"` where the last name wins.
    fn parse_field(&mut self) -> Result<String, ParseError> {
        let mut field = self.expect_ident()?;
        while self.tokens.next_if_eq(&Token::Dot).is_some() {
            field = self.expect_ident()?;
        }
        Ok(field)
    }

    fn parse_placeholder(&mut self) -> Result<Placeholder, ParseError> {
        match self.tokens.next() {
            Some(Token::Placeholder) => Ok(Placeholder::One),
            Some(token) if token.is_word("NULL") => Ok(Placeholder::Null),
            Some(Token::LParen) => {
                let mut count = 0;
                loop {
                    self.expect(Token::Placeholder)?;
                    count += 1;
                    match self.tokens.next() {
                        Some(Token::Comma) => continue,
                        Some(Token::RParen) => break,
                        Some(other) => return Err(ParseError::Unexpected(other.to_string())),
                        None => return Err(ParseError::End),
                    }
                }
                Ok(Placeholder::Many(count))
            }
            Some(other) => Err(ParseError::Unexpected(other.to_string())),
            None => Err(ParseError::End),
        }
    }

    fn next_param(&mut self) -> Value {
        match self.params.next() {
            Some(value) => {
                self.consumed += 1;
                value
            }
            None => Value::Null,
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        match self.tokens.next() {
            Some(token) if token == expected => Ok(()),
            Some(other) => Err(ParseError::Unexpected(other.to_string())),
            None => Err(ParseError::End),
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.tokens.next() {
            Some(Token::Ident(name)) => Ok(name),
            Some(other) => Err(ParseError::Unexpected(other.to_string())),
            None => Err(ParseError::End),
        }
    }
}
