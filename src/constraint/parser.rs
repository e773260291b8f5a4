//! Recursive descent parser for conjunctions of comparisons.
//!
//! Parsing happens in two stages. Each comparison is first read into a small
//! expression tree ([Operand]s joined by [Relation]s), accepting a slightly
//! larger language than what we support. The tree is then classified into an
//! [AtomicConstraint], so that e.g. `3 % x == 1` is reported as "not
//! understood" rather than as a syntax error. A comparison wrapped in
//! parentheses, `(x == 1) and y == 2`, is the same as the bare comparison.

use smallvec::SmallVec;

use super::{
    lexer::{tokenize, Bracket, Spanned, Token},
    AtomicConstraint, CmpOp, CompileError, ConstraintError, ConstraintSet, UnsupportedFeature,
};

pub(super) fn parse(text: &str) -> Result<ConstraintSet, CompileError> {
    let tokens = tokenize(text)?;
    if tokens.iter().any(|s| s.token == Token::Or) {
        return Err(UnsupportedFeature::Disjunction.into());
    }
    let mut parser = Parser {
        text,
        tokens,
        pos: 0,
    };
    let mut constraints = Vec::new();
    while !parser.at_end() {
        let start = parser.pos;
        let comparison = parser.comparison()?;
        let source = parser.source(start);
        constraints.push(comparison.classify(source)?);
        if !parser.at_end() {
            parser.expect(&Token::And)?;
            if parser.at_end() {
                return Err(ConstraintError::UnexpectedEnd.into());
            }
        }
    }
    Ok(ConstraintSet::new(constraints))
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Operand {
    Name(String),
    Int(usize),
    Mod(Box<Operand>, Box<Operand>),
    Seq(Vec<Operand>),
    Nested(Box<Comparison>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Relation {
    Cmp(CmpOp),
    In,
    NotIn,
}

/// An operand followed by any number of `relation operand` pairs.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Comparison {
    left: Operand,
    rest: Vec<(Relation, Operand)>,
}

impl Comparison {
    /// A comparison without any relation is just its operand.
    fn into_operand(self) -> Operand {
        if self.rest.is_empty() {
            self.left
        } else {
            Operand::Nested(Box::new(self))
        }
    }

    fn classify(mut self, source: &str) -> Result<AtomicConstraint, CompileError> {
        let not_understood = || ConstraintError::NotUnderstood(source.to_string());
        if self.rest.is_empty() {
            if let Operand::Nested(inner) = self.left {
                return inner.classify(source);
            }
        }
        if self.rest.len() > 1 {
            return Err(UnsupportedFeature::OperatorChaining.into());
        }
        let (relation, right) = self.rest.pop().ok_or_else(not_understood)?;

        let constraint = match relation {
            Relation::Cmp(op) => match (self.left, right) {
                // item op num
                (Operand::Name(item), Operand::Int(bound)) => {
                    AtomicConstraint::Ordering { item, op, bound }
                }
                // num op item
                (Operand::Int(bound), Operand::Name(item)) => AtomicConstraint::Ordering {
                    item,
                    op: op.flip(),
                    bound,
                },
                // item % mod op rem
                (Operand::Mod(lhs, rhs), Operand::Int(remainder)) => match (*lhs, *rhs) {
                    (Operand::Name(_), Operand::Int(0)) => {
                        return Err(ConstraintError::ZeroModulus(source.to_string()).into())
                    }
                    (Operand::Name(item), Operand::Int(modulus)) => AtomicConstraint::Modulo {
                        item,
                        modulus,
                        op,
                        remainder,
                    },
                    _ => return Err(not_understood().into()),
                },
                _ => return Err(not_understood().into()),
            },
            Relation::In | Relation::NotIn => {
                let (Operand::Name(item), Operand::Seq(elements)) = (self.left, right) else {
                    return Err(not_understood().into());
                };
                let values = elements
                    .into_iter()
                    .map(|e| match e {
                        Operand::Int(n) => Ok(n),
                        _ => Err(not_understood()),
                    })
                    .collect::<Result<SmallVec<_>, _>>()?;
                AtomicConstraint::Membership {
                    item,
                    positive: relation == Relation::In,
                    values,
                }
            }
        };
        Ok(constraint)
    }
}

struct Parser<'a> {
    text: &'a str,
    tokens: Vec<Spanned>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn advance(&mut self) -> Result<Spanned, ConstraintError> {
        let spanned = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or(ConstraintError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(spanned)
    }

    fn eat(&mut self, expected: &Token) -> bool {
        let found = self.peek() == Some(expected);
        if found {
            self.pos += 1;
        }
        found
    }

    fn expect(&mut self, expected: &Token) -> Result<(), ConstraintError> {
        let spanned = self.advance()?;
        if &spanned.token == expected {
            Ok(())
        } else {
            Err(unexpected(&spanned))
        }
    }

    /// The source text covered by the tokens from `start` up to the current
    /// position.
    fn source(&self, start: usize) -> &'a str {
        let text = self.text;
        match (self.tokens.get(start), self.tokens[..self.pos].last()) {
            (Some(first), Some(last)) if start < self.pos => &text[first.start..last.end],
            _ => "",
        }
    }

    fn comparison(&mut self) -> Result<Comparison, ConstraintError> {
        let left = self.operand()?;
        let mut rest = Vec::new();
        while let Some(relation) = self.relation()? {
            rest.push((relation, self.operand()?));
        }
        Ok(Comparison { left, rest })
    }

    fn relation(&mut self) -> Result<Option<Relation>, ConstraintError> {
        let relation = match self.peek() {
            Some(&Token::Cmp(op)) => Relation::Cmp(op),
            Some(Token::In) => Relation::In,
            Some(Token::Not) => {
                self.pos += 1;
                self.expect(&Token::In)?;
                return Ok(Some(Relation::NotIn));
            }
            _ => return Ok(None),
        };
        self.pos += 1;
        Ok(Some(relation))
    }

    fn operand(&mut self) -> Result<Operand, ConstraintError> {
        let mut lhs = self.primary()?;
        while self.eat(&Token::Percent) {
            let rhs = self.primary()?;
            lhs = Operand::Mod(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn primary(&mut self) -> Result<Operand, ConstraintError> {
        let spanned = self.advance()?;
        match spanned.token {
            Token::Ident(name) => Ok(Operand::Name(name)),
            Token::Int(n) => Ok(Operand::Int(n)),
            Token::Open(bracket) => self.group(bracket),
            _ => Err(unexpected(&spanned)),
        }
    }

    /// Parse the inside of a bracketed group, after the opening bracket.
    ///
    /// A parenthesised single element without a trailing comma is a grouping,
    /// not a one-element tuple: `(x % 2)` is the operand `x % 2` and
    /// `(x == 1)` the comparison `x == 1`.
    fn group(&mut self, bracket: Bracket) -> Result<Operand, ConstraintError> {
        let mut elements = Vec::new();
        let mut has_comma = false;
        while !self.eat(&Token::Close(bracket)) {
            elements.push(self.comparison()?.into_operand());
            if self.eat(&Token::Comma) {
                has_comma = true;
            } else {
                self.expect(&Token::Close(bracket))?;
                break;
            }
        }
        if bracket == Bracket::Paren && !has_comma && elements.len() == 1 {
            return Ok(elements.swap_remove(0));
        }
        Ok(Operand::Seq(elements))
    }
}

fn unexpected(spanned: &Spanned) -> ConstraintError {
    ConstraintError::UnexpectedToken {
        found: spanned.token.to_string(),
        offset: spanned.start,
    }
}
