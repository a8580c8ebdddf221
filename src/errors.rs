//! Errors and warnings recorded into a [`Module`](crate::module::Module)
//! during compilation and snapshotting.
//!
//! The compiler never propagates these; every variant is a record with a
//! message and the span of the offending source.

use thiserror::Error;

use crate::diag::Span;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("Parse error: {message}")]
    Parse { message: String, span: Span },

    // Reference errors
    #[error("Unknown language: {0}")]
    UnknownLanguage(String, Span),

    #[error("Unknown trait: {0}")]
    UnknownTrait(String, Span),

    #[error("Unknown feature: {0}")]
    UnknownFeature(String, Span),

    #[error("`{label}` is not a feature of trait {trait_name}")]
    NotAFeatureOfTrait {
        label: String,
        trait_name: String,
        span: Span,
    },

    #[error("Unknown phoneme: {0}")]
    UnknownPhoneme(String, Span),

    #[error("No class or series named {0}")]
    UnknownSoundEntity(String, Span),

    #[error("Import failed: {message}")]
    ImportFailed { message: String, span: Span },

    #[error("Imported module has no member named {0}")]
    ImportNameNotFound(String, Span),

    // Uniqueness errors
    #[error("A language with id {0} is already defined")]
    DuplicateLanguage(String, Span),

    #[error("A trait named {0} is already defined")]
    DuplicateTrait(String, Span),

    #[error("The feature label {0} already names a feature")]
    DuplicateLabel(String, Span),

    #[error("{0} already names a class, series, or phoneme")]
    NameCollision(String, Span),

    #[error("A word glossed {0} is already defined")]
    DuplicateWord(String, Span),

    #[error("A wildcard import cannot be combined with named imports")]
    WildcardWithNamed(Span),

    // Shape errors
    #[error("Expected {expected} feature(s), found {found}")]
    FeatureArity {
        expected: usize,
        found: usize,
        span: Span,
    },

    #[error("Invalid time range: {start} does not precede {end}")]
    InvertedRange { start: i64, end: i64, span: Span },

    #[error("Trait {trait_name} already has a default feature")]
    MultipleDefaults { trait_name: String, span: Span },

    #[error("Trait {0} must declare at least one feature")]
    EmptyTrait(String, Span),

    // Context errors
    #[error("This cannot be defined before a milestone")]
    NoMilestone(Span),

    // Transcription errors
    #[error("Cannot transcribe `{rest}` (offset {offset})")]
    Transcription {
        offset: usize,
        rest: String,
        span: Span,
    },

    /// An error re-emitted from an imported module. `span` points at the
    /// import statement; `source_span` at the offending source inside
    /// `source_name`.
    #[error("In imported module {source_name}: {message}")]
    Imported {
        source_name: String,
        message: String,
        span: Span,
        source_span: Span,
    },
}

impl CompileError {
    pub fn span(&self) -> Span {
        match self {
            CompileError::Parse { span, .. } => *span,
            CompileError::UnknownLanguage(_, span) => *span,
            CompileError::UnknownTrait(_, span) => *span,
            CompileError::UnknownFeature(_, span) => *span,
            CompileError::NotAFeatureOfTrait { span, .. } => *span,
            CompileError::UnknownPhoneme(_, span) => *span,
            CompileError::UnknownSoundEntity(_, span) => *span,
            CompileError::ImportFailed { span, .. } => *span,
            CompileError::ImportNameNotFound(_, span) => *span,
            CompileError::DuplicateLanguage(_, span) => *span,
            CompileError::DuplicateTrait(_, span) => *span,
            CompileError::DuplicateLabel(_, span) => *span,
            CompileError::NameCollision(_, span) => *span,
            CompileError::DuplicateWord(_, span) => *span,
            CompileError::WildcardWithNamed(span) => *span,
            CompileError::FeatureArity { span, .. } => *span,
            CompileError::InvertedRange { span, .. } => *span,
            CompileError::MultipleDefaults { span, .. } => *span,
            CompileError::EmptyTrait(_, span) => *span,
            CompileError::NoMilestone(span) => *span,
            CompileError::Transcription { span, .. } => *span,
            CompileError::Imported { span, .. } => *span,
        }
    }
}

/// Warnings never suppress output. The only source today is snapshot-time
/// feature modifications that resolve to no inventoried phoneme.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileWarning {
    #[error("No phoneme in class {class_name} carries the modified features of {glyph}")]
    UnmatchedModification {
        glyph: String,
        class_name: String,
        span: Span,
    },
}

impl CompileWarning {
    pub fn span(&self) -> Span {
        match self {
            CompileWarning::UnmatchedModification { span, .. } => *span,
        }
    }
}
