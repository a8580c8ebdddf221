use std::fmt::{Display, Formatter};
use std::iter::Peekable;
use std::num::ParseIntError;
use std::str::Chars;
use thiserror::Error;

use crate::diag::{Position, Span};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum TokenKind {
    /// Identifiers, phoneme glyphs, feature labels. Any run of letters,
    /// digits, and non-reserved non-ASCII characters, so IPA material
    /// (ʃ, õ, ˈ, combining diacritics) lexes as a single token.
    Ident(String),
    IntLit(i64),

    // Keywords
    KwImport,
    KwFrom,
    KwLang,
    KwTrait,
    KwClass,
    KwEncodes,
    KwAnnotates,
    KwSeries,

    // Statement leads and punctuation
    At,
    Dollar,
    Minus,
    Plus,
    Star,
    Lt,
    Gt,
    Equals,
    Slash,
    Underscore,
    Hash,
    Pipe,
    Comma,
    Colon,
    Dot,
    DotDot,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,

    Eof,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Ident(name) => write!(f, "`{name}`"),
            TokenKind::IntLit(value) => write!(f, "{value}"),
            TokenKind::KwImport => write!(f, "import"),
            TokenKind::KwFrom => write!(f, "from"),
            TokenKind::KwLang => write!(f, "lang"),
            TokenKind::KwTrait => write!(f, "trait"),
            TokenKind::KwClass => write!(f, "class"),
            TokenKind::KwEncodes => write!(f, "encodes"),
            TokenKind::KwAnnotates => write!(f, "annotates"),
            TokenKind::KwSeries => write!(f, "series"),
            TokenKind::At => write!(f, "@"),
            TokenKind::Dollar => write!(f, "$"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Lt => write!(f, "<"),
            TokenKind::Gt => write!(f, ">"),
            TokenKind::Equals => write!(f, "="),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::Underscore => write!(f, "_"),
            TokenKind::Hash => write!(f, "#"),
            TokenKind::Pipe => write!(f, "|"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Colon => write!(f, ":"),
            TokenKind::Dot => write!(f, "."),
            TokenKind::DotDot => write!(f, ".."),
            TokenKind::LBrace => write!(f, "{{"),
            TokenKind::RBrace => write!(f, "}}"),
            TokenKind::LBracket => write!(f, "["),
            TokenKind::RBracket => write!(f, "]"),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::Eof => write!(f, "EOF"),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum LexError {
    #[error("Unexpected character: {0}")]
    UnexpectedCharacter(char, Span),

    #[error("Invalid integer: {0}")]
    InvalidInteger(ParseIntError, Span),

    #[error("Unterminated transcription")]
    UnterminatedTranscription(Span),
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedCharacter(_, span) => *span,
            LexError::InvalidInteger(_, span) => *span,
            LexError::UnterminatedTranscription(span) => *span,
        }
    }
}

impl PartialEq for LexError {
    fn eq(&self, other: &Self) -> bool {
        // ParseIntError carries no public state worth distinguishing.
        match (self, other) {
            (LexError::UnexpectedCharacter(a, s1), LexError::UnexpectedCharacter(b, s2)) => {
                a == b && s1 == s2
            }
            (LexError::InvalidInteger(_, s1), LexError::InvalidInteger(_, s2)) => s1 == s2,
            (LexError::UnterminatedTranscription(s1), LexError::UnterminatedTranscription(s2)) => {
                s1 == s2
            }
            _ => false,
        }
    }
}

/// ASCII characters the lexer claims for punctuation or statement structure.
/// Everything else that is not whitespace may appear inside an identifier.
fn is_reserved(ch: char) -> bool {
    matches!(
        ch,
        '@' | '$'
            | '-'
            | '+'
            | '*'
            | '<'
            | '>'
            | '='
            | '/'
            | '_'
            | '#'
            | '|'
            | ','
            | ':'
            | '.'
            | '{'
            | '}'
            | '['
            | ']'
            | '('
            | ')'
    )
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || (!ch.is_ascii() && !ch.is_whitespace() && !is_reserved(ch))
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_alphanumeric() || (!ch.is_ascii() && !ch.is_whitespace() && !is_reserved(ch))
}

pub struct Lexer<'a> {
    source: Peekable<Chars<'a>>,
    pos: Position,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source: source.chars().peekable(),
            pos: Position::origin(),
        }
    }

    fn advance(&mut self) {
        if let Some(ch) = self.source.next() {
            self.pos.offset += 1;
            if ch == '\n' {
                self.pos.line += 1;
                self.pos.column = 1;
            } else {
                self.pos.column += 1;
            }
        }
    }

    pub(crate) fn peek_char(&mut self) -> Option<char> {
        self.source.peek().copied()
    }

    fn peek_line_comment(&mut self) -> bool {
        let mut iter = self.source.clone();
        matches!((iter.next(), iter.next()), (Some('/'), Some('/')))
    }

    /// Skips whitespace (including newlines) and `//` line comments.
    pub(crate) fn skip_trivia(&mut self) {
        loop {
            while let Some(&ch) = self.source.peek()
                && ch.is_whitespace()
            {
                self.advance();
            }

            if self.peek_line_comment() {
                while let Some(&ch) = self.source.peek()
                    && ch != '\n'
                {
                    self.advance();
                }
                continue;
            }

            break;
        }
    }

    /// Raw-text capture for the parser: skips horizontal whitespace, then
    /// consumes characters up to (not including) a newline or one of the
    /// `stops`. Returns the trimmed text with its span.
    pub(crate) fn take_text_until(&mut self, stops: &[char]) -> (String, Span) {
        while let Some(&ch) = self.source.peek()
            && (ch == ' ' || ch == '\t')
        {
            self.advance();
        }

        let start = self.pos;
        let mut text = String::new();
        while let Some(&ch) = self.source.peek() {
            if ch == '\n' || stops.contains(&ch) {
                break;
            }
            text.push(ch);
            self.advance();
        }
        let end = self.pos;
        let trimmed = text.trim_end();
        (trimmed.to_string(), Span::new(start, end))
    }

    /// Raw-text capture for slash-delimited transcriptions. The opening
    /// delimiter has already been consumed as a token; this reads up to and
    /// including the closing delimiter, failing at end of line or input.
    pub(crate) fn take_delimited(&mut self, delim: char) -> Result<(String, Span), LexError> {
        let start = self.pos;
        let mut text = String::new();
        loop {
            match self.source.peek() {
                Some(&ch) if ch == delim => {
                    self.advance();
                    return Ok((text, Span::new(start, self.pos)));
                }
                Some(&'\n') | None => {
                    return Err(LexError::UnterminatedTranscription(Span::new(
                        start, self.pos,
                    )));
                }
                Some(&ch) => {
                    text.push(ch);
                    self.advance();
                }
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia();

        let start = self.pos;
        let kind = match self.source.peek() {
            Some(&ch) if is_ident_start(ch) => {
                let mut ident = String::new();
                while let Some(&ch) = self.source.peek()
                    && is_ident_continue(ch)
                {
                    ident.push(ch);
                    self.advance();
                }
                match ident.as_str() {
                    "import" => TokenKind::KwImport,
                    "from" => TokenKind::KwFrom,
                    "lang" => TokenKind::KwLang,
                    "trait" => TokenKind::KwTrait,
                    "class" => TokenKind::KwClass,
                    "encodes" => TokenKind::KwEncodes,
                    "annotates" => TokenKind::KwAnnotates,
                    "series" => TokenKind::KwSeries,
                    _ => TokenKind::Ident(ident),
                }
            }
            Some(&ch) if ch.is_ascii_digit() => {
                let mut digits = String::new();
                while let Some(&ch) = self.source.peek()
                    && ch.is_ascii_digit()
                {
                    digits.push(ch);
                    self.advance();
                }
                let value = digits
                    .parse::<i64>()
                    .map_err(|e| LexError::InvalidInteger(e, Span::new(start, self.pos)))?;
                TokenKind::IntLit(value)
            }
            Some(&'.') => {
                self.advance();
                if matches!(self.source.peek(), Some(&'.')) {
                    self.advance();
                    TokenKind::DotDot
                } else {
                    TokenKind::Dot
                }
            }
            Some(&ch) => {
                let kind = match ch {
                    '@' => TokenKind::At,
                    '$' => TokenKind::Dollar,
                    '-' => TokenKind::Minus,
                    '+' => TokenKind::Plus,
                    '*' => TokenKind::Star,
                    '<' => TokenKind::Lt,
                    '>' => TokenKind::Gt,
                    '=' => TokenKind::Equals,
                    '/' => TokenKind::Slash,
                    '_' => TokenKind::Underscore,
                    '#' => TokenKind::Hash,
                    '|' => TokenKind::Pipe,
                    ',' => TokenKind::Comma,
                    ':' => TokenKind::Colon,
                    '{' => TokenKind::LBrace,
                    '}' => TokenKind::RBrace,
                    '[' => TokenKind::LBracket,
                    ']' => TokenKind::RBracket,
                    '(' => TokenKind::LParen,
                    ')' => TokenKind::RParen,
                    _ => {
                        self.advance();
                        return Err(LexError::UnexpectedCharacter(
                            ch,
                            Span::new(start, self.pos),
                        ));
                    }
                };
                self.advance();
                kind
            }
            None => TokenKind::Eof,
        };

        Ok(Token {
            kind,
            span: Span::new(start, self.pos),
        })
    }
}

#[cfg(test)]
#[path = "tests/t_lexer.rs"]
mod tests;
