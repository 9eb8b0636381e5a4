use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::iter::FromIterator;
use std::num::ParseFloatError;

use thiserror::Error;
use tracing::debug;

use crate::lexer::{LexError, Scanner, Span, Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("no value for key '{0}'")]
    Missing(String),
    #[error("{0}")]
    Other(String),
}

/// Resolves variable names to values while an expression is evaluated.
pub trait Lookup {
    fn lookup(&self, name: &str) -> Result<f64, LookupError>;
}

impl<S: BuildHasher> Lookup for HashMap<String, f64, S> {
    fn lookup(&self, name: &str) -> Result<f64, LookupError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| LookupError::Missing(name.into()))
    }
}

impl Lookup for BTreeMap<String, f64> {
    fn lookup(&self, name: &str) -> Result<f64, LookupError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| LookupError::Missing(name.into()))
    }
}

/// Variable table with an optional parent that is consulted on a miss.
#[derive(Debug, Clone, Default)]
pub struct Context<'a> {
    parent: Option<&'a Context<'a>>,
    scope: HashMap<String, f64>,
}

impl<'a> Context<'a> {
    pub fn new() -> Self {
        Context {
            parent: None,
            scope: HashMap::new(),
        }
    }

    pub fn with_parent(ctx: &'a Context<'a>) -> Self {
        Context {
            parent: Some(ctx),
            scope: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        if let Some(x) = self.scope.get(key) {
            return Some(*x);
        }

        self.parent.and_then(|p| p.get(key))
    }

    pub fn set(&mut self, key: &str, val: f64) {
        self.scope.insert(key.into(), val);
    }

    /// Names visible from this context, own scope first.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.scope.keys().map(|k| k.as_str()).collect();
        names.sort();

        if let Some(p) = self.parent {
            for name in p.names() {
                if !self.scope.contains_key(name) {
                    names.push(name);
                }
            }
        }

        names
    }
}

impl Lookup for Context<'_> {
    fn lookup(&self, name: &str) -> Result<f64, LookupError> {
        self.get(name)
            .ok_or_else(|| LookupError::Missing(name.into()))
    }
}

impl From<HashMap<String, f64>> for Context<'_> {
    fn from(scope: HashMap<String, f64>) -> Self {
        Context {
            parent: None,
            scope,
        }
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Context<'_> {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let scope = iter.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Context {
            parent: None,
            scope,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Unbound {
    #[error("no variable lookup is bound")]
    NoLookup,
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error(transparent)]
    Lexical(#[from] LexError),
    #[error("'{text}' is not a valid number")]
    NumeralFormat {
        text: String,
        span: Span,
        #[source]
        source: ParseFloatError,
    },
    #[error("expected token type {expected} but found {found}")]
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
        span: Span,
    },
    #[error("cannot resolve variable '{name}': {reason}")]
    UnboundVariable {
        name: String,
        span: Span,
        reason: Unbound,
    },
    #[error("parentheses nested deeper than {limit}")]
    NestingTooDeep { limit: usize, span: Span },
}

impl EvalError {
    pub fn span(&self) -> Span {
        match self {
            EvalError::Lexical(err) => err.span,
            EvalError::NumeralFormat { span, .. }
            | EvalError::UnexpectedToken { span, .. }
            | EvalError::UnboundVariable { span, .. }
            | EvalError::NestingTooDeep { span, .. } => *span,
        }
    }
}

/// Evaluates an arithmetic expression while parsing it:
///
/// ```text
/// expression := term (('+' | '-') term)*
/// term       := factor (('*' | '/') factor)*
/// factor     := NUMBER | VARIABLE | '(' expression ')'
/// ```
///
/// Division follows IEEE semantics, so `1/0` is infinity and `0/0` is NaN.
/// Parentheses may nest at most [`Evaluator::MAX_DEPTH`] levels deep.
pub struct Evaluator<'a> {
    scanner: Scanner<'a>,
    lookup: Option<&'a dyn Lookup>,
    depth: usize,
}

impl<'a> Evaluator<'a> {
    pub const MAX_DEPTH: usize = 256;

    pub fn new(input: &'a str) -> Self {
        let mut scanner = Scanner::new(input);
        scanner.scan();

        Evaluator {
            scanner,
            lookup: None,
            depth: 0,
        }
    }

    pub fn bind(&mut self, lookup: &'a dyn Lookup) {
        self.lookup = Some(lookup);
    }

    pub fn with_lookup(mut self, lookup: &'a dyn Lookup) -> Self {
        self.bind(lookup);
        self
    }

    pub fn input(&self) -> &'a str {
        self.scanner.input()
    }

    #[tracing::instrument(level = "debug", skip(self), fields(input = self.scanner.input()), err)]
    pub fn evaluate(mut self) -> Result<f64, EvalError> {
        if let Some(err) = self.scanner.last_error() {
            return Err((*err).into());
        }

        let result = self.expression()?;
        self.eat(TokenKind::EndOfInput)?;
        Ok(result)
    }

    fn current(&self) -> Token<'a> {
        self.scanner.current_token()
    }

    fn eat(&mut self, kind: TokenKind) -> Result<Token<'a>, EvalError> {
        let token = self.current();

        if token.kind != kind {
            return Err(EvalError::UnexpectedToken {
                expected: kind,
                found: token.kind,
                span: token.span,
            });
        }

        self.scanner.scan();

        match self.scanner.last_error() {
            Some(err) => Err((*err).into()),
            None => Ok(token),
        }
    }

    fn resolve(&self, token: Token<'a>) -> Result<f64, EvalError> {
        let unbound = |reason| EvalError::UnboundVariable {
            name: token.text.into(),
            span: token.span,
            reason,
        };

        let lookup = self.lookup.ok_or_else(|| unbound(Unbound::NoLookup))?;
        let value = lookup
            .lookup(token.text)
            .map_err(|err| unbound(Unbound::Lookup(err)))?;

        debug!(name = token.text, value, "resolved variable");
        Ok(value)
    }

    fn expression(&mut self) -> Result<f64, EvalError> {
        if self.current().kind == TokenKind::EndOfInput {
            return Ok(0.0);
        }

        let mut result = self.term()?;

        while self.current().kind.is_additive() {
            let op = self.eat(self.current().kind)?;
            let rhs = self.term()?;

            result = match op.kind {
                TokenKind::Plus => result + rhs,
                _ => result - rhs,
            };
        }

        Ok(result)
    }

    fn term(&mut self) -> Result<f64, EvalError> {
        let mut result = self.factor()?;

        while self.current().kind.is_multiplicative() {
            let op = self.eat(self.current().kind)?;
            let rhs = self.factor()?;

            result = match op.kind {
                TokenKind::Multiply => result * rhs,
                _ => result / rhs,
            };
        }

        Ok(result)
    }

    fn factor(&mut self) -> Result<f64, EvalError> {
        let token = self.current();

        match token.kind {
            TokenKind::LeftParen => {
                if self.depth == Self::MAX_DEPTH {
                    return Err(EvalError::NestingTooDeep {
                        limit: Self::MAX_DEPTH,
                        span: token.span,
                    });
                }

                self.depth += 1;
                self.eat(TokenKind::LeftParen)?;
                let result = self.expression()?;
                self.eat(TokenKind::RightParen)?;
                self.depth -= 1;
                Ok(result)
            }
            TokenKind::Variable => {
                self.eat(TokenKind::Variable)?;
                self.resolve(token)
            }
            _ => {
                self.eat(TokenKind::Number)?;
                token
                    .text
                    .parse()
                    .map_err(|source| EvalError::NumeralFormat {
                        text: token.text.into(),
                        span: token.span,
                        source,
                    })
            }
        }
    }
}
