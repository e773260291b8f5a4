use std::{fmt, iter::Peekable, str::CharIndices};

use super::{CmpOp, ConstraintError};

/// The three kinds of brackets delimiting a list of values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Bracket {
    Paren,
    Square,
    Curly,
}

impl Bracket {
    fn open(self) -> char {
        match self {
            Bracket::Paren => '(',
            Bracket::Square => '[',
            Bracket::Curly => '{',
        }
    }

    fn close(self) -> char {
        match self {
            Bracket::Paren => ')',
            Bracket::Square => ']',
            Bracket::Curly => '}',
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) enum Token {
    Ident(String),
    Int(usize),
    Cmp(CmpOp),
    Percent,
    Comma,
    Open(Bracket),
    Close(Bracket),
    And,
    Or,
    Not,
    In,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(name) => write!(f, "identifier `{name}`"),
            Token::Int(n) => write!(f, "integer `{n}`"),
            Token::Cmp(op) => write!(f, "`{op}`"),
            Token::Percent => write!(f, "`%`"),
            Token::Comma => write!(f, "`,`"),
            Token::Open(b) => write!(f, "`{}`", b.open()),
            Token::Close(b) => write!(f, "`{}`", b.close()),
            Token::And => write!(f, "`and`"),
            Token::Or => write!(f, "`or`"),
            Token::Not => write!(f, "`not`"),
            Token::In => write!(f, "`in`"),
        }
    }
}

/// A token with its byte span in the source string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct Spanned {
    pub(super) token: Token,
    pub(super) start: usize,
    pub(super) end: usize,
}

/// Split a constraint string into tokens, skipping whitespace.
pub(super) fn tokenize(text: &str) -> Result<Vec<Spanned>, ConstraintError> {
    let mut lexer = Lexer {
        text,
        chars: text.char_indices().peekable(),
    };
    let mut tokens = Vec::new();
    while let Some(spanned) = lexer.next_token()? {
        tokens.push(spanned);
    }
    Ok(tokens)
}

struct Lexer<'a> {
    text: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn next_token(&mut self) -> Result<Option<Spanned>, ConstraintError> {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
        let Some((start, c)) = self.chars.next() else {
            return Ok(None);
        };
        let token = match c {
            '%' => Token::Percent,
            ',' => Token::Comma,
            '(' => Token::Open(Bracket::Paren),
            '[' => Token::Open(Bracket::Square),
            '{' => Token::Open(Bracket::Curly),
            ')' => Token::Close(Bracket::Paren),
            ']' => Token::Close(Bracket::Square),
            '}' => Token::Close(Bracket::Curly),
            '<' if self.eat('=') => Token::Cmp(CmpOp::LtE),
            '<' => Token::Cmp(CmpOp::Lt),
            '>' if self.eat('=') => Token::Cmp(CmpOp::GtE),
            '>' => Token::Cmp(CmpOp::Gt),
            '=' if self.eat('=') => Token::Cmp(CmpOp::Eq),
            '!' if self.eat('=') => Token::Cmp(CmpOp::NotEq),
            c if c.is_ascii_digit() => {
                let literal = self.take_while(start, |c| c.is_ascii_digit());
                let n = literal
                    .parse()
                    .map_err(|_| ConstraintError::IntegerTooLarge(literal.to_string()))?;
                Token::Int(n)
            }
            c if c.is_alphabetic() || c == '_' => {
                match self.take_while(start, |c| c.is_alphanumeric() || c == '_') {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    "in" => Token::In,
                    name => Token::Ident(name.to_string()),
                }
            }
            found => {
                return Err(ConstraintError::UnexpectedChar {
                    found,
                    offset: start,
                })
            }
        };
        let end = self.offset();
        Ok(Some(Spanned { token, start, end }))
    }

    fn eat(&mut self, expected: char) -> bool {
        self.chars.next_if(|&(_, c)| c == expected).is_some()
    }

    /// Consume characters while `pred` holds and return the slice from `start`.
    fn take_while(&mut self, start: usize, pred: impl Fn(char) -> bool) -> &'a str {
        while self.chars.next_if(|&(_, c)| pred(c)).is_some() {}
        let (text, end) = (self.text, self.offset());
        &text[start..end]
    }

    fn offset(&mut self) -> usize {
        self.chars
            .peek()
            .map_or(self.text.len(), |&(offset, _)| offset)
    }
}
