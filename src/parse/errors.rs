use thiserror::Error;

use crate::diag::Span;
use crate::lexer::{LexError, Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("Expected statement, found: {0}")]
    ExpectedStatement(Token),

    #[error("Expected {0}, found: {1}")]
    ExpectedToken(TokenKind, Token),

    #[error("Expected identifier, found: {0}")]
    ExpectedIdent(Token),

    #[error("Expected integer, found: {0}")]
    ExpectedInt(Token),

    #[error("Expected import names (`*` or a parenthesized list), found: {0}")]
    ExpectedImportNames(Token),

    #[error("Invalid import path: `{0}`")]
    InvalidImportPath(String, Span),

    #[error("Expected a transcription between slashes, found: {0}")]
    ExpectedTranscription(Token),

    #[error("Unterminated word body")]
    UnterminatedWordBody(Span),

    #[error("Expected a pattern element, found: {0}")]
    ExpectedPattern(Token),

    #[error("Empty pattern `[]` cannot be combined with other source elements")]
    EmptyPatternInSequence(Span),

    #[error("Expected a `+` or `-` feature modifier, found: {0}")]
    ExpectedModifier(Token),

    #[error("Expected a base or at least one feature modifier in `[]`")]
    EmptyCategory(Span),

    #[error("A target may only modify features; category bases are not allowed")]
    CategoryInTarget(Span),

    #[error("Environment needs exactly one `_` placeholder")]
    EnvironmentGap(Span),

    #[error("`#` may only anchor the start or end of an environment")]
    MisplacedAnchor(Span),
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::Lex(e) => e.span(),
            ParseError::ExpectedStatement(token) => token.span,
            ParseError::ExpectedToken(_, token) => token.span,
            ParseError::ExpectedIdent(token) => token.span,
            ParseError::ExpectedInt(token) => token.span,
            ParseError::ExpectedImportNames(token) => token.span,
            ParseError::InvalidImportPath(_, span) => *span,
            ParseError::ExpectedTranscription(token) => token.span,
            ParseError::UnterminatedWordBody(span) => *span,
            ParseError::ExpectedPattern(token) => token.span,
            ParseError::EmptyPatternInSequence(span) => *span,
            ParseError::ExpectedModifier(token) => token.span,
            ParseError::EmptyCategory(span) => *span,
            ParseError::CategoryInTarget(span) => *span,
            ParseError::EnvironmentGap(span) => *span,
            ParseError::MisplacedAnchor(span) => *span,
        }
    }
}
