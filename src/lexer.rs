use std::fmt;

use thiserror::Error;
use tracing::trace;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    Number,
    Variable,
    Plus,
    Minus,
    Multiply,
    Divide,
    LeftParen,
    RightParen,
    EndOfInput,
    Invalid,
}

impl TokenKind {
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Number => "NUM",
            TokenKind::Variable => "VAR",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Multiply => "MULTI",
            TokenKind::Divide => "DIV",
            TokenKind::LeftParen => "LPAREN",
            TokenKind::RightParen => "RPAREN",
            TokenKind::EndOfInput => "EOF",
            TokenKind::Invalid => "INVALID",
        }
    }

    pub fn is_additive(self) -> bool {
        match self {
            TokenKind::Plus | TokenKind::Minus => true,
            _ => false,
        }
    }

    pub fn is_multiplicative(self) -> bool {
        match self {
            TokenKind::Multiply | TokenKind::Divide => true,
            _ => false,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Byte range `[start, end)` of a token within the scanned input.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default, Hash)]
pub struct Span(pub usize, pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub span: Span,
}

impl<'a> Token<'a> {
    fn end(at: usize) -> Self {
        Token {
            kind: TokenKind::EndOfInput,
            text: "",
            span: Span(at, at),
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            TokenKind::EndOfInput => write!(f, "{}", self.kind),
            kind => write!(f, "{} {}", kind, self.text),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("'{ch}' is not acceptable for the scanner")]
pub struct LexError {
    pub ch: char,
    pub span: Span,
}

/// Pull-based tokenizer. Holds a single lookahead token which is replaced on
/// every call to [`Scanner::scan`].
///
/// Only the space character counts as whitespace. Numbers are any run of
/// digits and dots; whether the run is a valid numeral is left to whoever
/// consumes the token.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
    current: Token<'a>,
    error: Option<LexError>,
}

impl<'a> Scanner<'a> {
    const DIGITS: &'static str = "0123456789.";
    const IDENTS: &'static str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz_";

    /// The current token is `Invalid` with empty text until the first scan.
    pub fn new(input: &'a str) -> Self {
        Scanner {
            input,
            pos: 0,
            current: Token {
                kind: TokenKind::Invalid,
                text: "",
                span: Span(0, 0),
            },
            error: None,
        }
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn current_token(&self) -> Token<'a> {
        self.current
    }

    pub fn last_error(&self) -> Option<&LexError> {
        self.error.as_ref()
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_spaces(&mut self) {
        while self.peek() == Some(' ') {
            self.pos += 1;
        }
    }

    fn take_while(&mut self, accept: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !accept(c) {
                break;
            }

            self.pos += c.len_utf8();
        }
    }

    fn is_ident_char(c: char) -> bool {
        Self::IDENTS.contains(c) || c.is_ascii_digit()
    }

    /// Classifies the next token. Returns `false` at end of input, or when
    /// the next character starts no token (see [`Scanner::last_error`]).
    pub fn scan(&mut self) -> bool {
        self.error = None;

        if self.current.kind == TokenKind::EndOfInput {
            return false;
        }

        self.skip_spaces();

        let c = match self.peek() {
            Some(c) => c,
            None => {
                self.current = Token::end(self.input.len());
                trace!("reached end of input");
                return false;
            }
        };

        let begin = self.pos;

        let kind = if Self::IDENTS.contains(c) {
            self.take_while(Self::is_ident_char);
            TokenKind::Variable
        } else if Self::DIGITS.contains(c) {
            self.take_while(|c| Self::DIGITS.contains(c));
            TokenKind::Number
        } else {
            let kind = match c {
                '+' => TokenKind::Plus,
                '-' => TokenKind::Minus,
                '*' => TokenKind::Multiply,
                '/' => TokenKind::Divide,
                '(' => TokenKind::LeftParen,
                ')' => TokenKind::RightParen,
                c => {
                    let span = Span(begin, begin + c.len_utf8());

                    self.current = Token {
                        kind: TokenKind::Invalid,
                        text: &self.input[span.0..span.1],
                        span,
                    };
                    self.error = Some(LexError { ch: c, span });
                    trace!(ch = %c, at = begin, "unrecognized character");
                    return false;
                }
            };

            self.pos += 1;
            kind
        };

        self.current = Token {
            kind,
            text: &self.input[begin..self.pos],
            span: Span(begin, self.pos),
        };

        trace!(kind = %kind, text = self.current.text, "scanned token");
        true
    }
}

/// Iterator over the tokens of a [`Scanner`], ending at end of input or
/// after yielding the first lexical error.
#[derive(Debug, Clone)]
pub struct Tokens<'a>(Scanner<'a>);

impl<'a> Scanner<'a> {
    pub fn tokens(self) -> Tokens<'a> {
        Tokens(self)
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<Token<'a>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        let scanner = &mut self.0;

        if scanner.error.is_some() {
            return None;
        }

        if scanner.scan() {
            Some(Ok(scanner.current))
        } else {
            scanner.error.map(Err)
        }
    }
}

/// Collects every token of `input`, stopping at the first lexical error.
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, LexError> {
    Scanner::new(input).tokens().collect()
}
