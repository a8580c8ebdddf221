//! Parsed statement tree.
//!
//! Everything here is surface syntax: names are unresolved strings with
//! spans, and pattern elements are raw text that the compiler later resolves
//! through the sound-entity namespace.

use crate::diag::Span;

/// A source name with its span. Used for identifiers, labels, glyph runs,
/// and captured raw text alike.
#[derive(Debug, Clone, PartialEq)]
pub struct Name {
    pub text: String,
    pub span: Span,
}

impl Name {
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Name {
            text: text.into(),
            span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Import(ImportStmt),
    Language(LanguageStmt),
    Milestone(MilestoneStmt),
    Trait(TraitStmt),
    Class(ClassStmt),
    Series(SeriesStmt),
    Word(WordStmt),
    Change(ChangeStmt),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Import(stmt) => stmt.span,
            Stmt::Language(stmt) => stmt.span,
            Stmt::Milestone(stmt) => stmt.span,
            Stmt::Trait(stmt) => stmt.span,
            Stmt::Class(stmt) => stmt.span,
            Stmt::Series(stmt) => stmt.span,
            Stmt::Word(stmt) => stmt.span,
            Stmt::Change(stmt) => stmt.span,
        }
    }
}

// -----------------------------------------------------------------------------
// Imports
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ImportStmt {
    pub names: Vec<ImportName>,
    pub path: ImportPath,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportName {
    pub kind: ImportNameKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportNameKind {
    Wildcard,
    Named(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportPath {
    pub kind: ImportPathKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportPathKind {
    /// `@scope/rest/of/path`
    Scoped { scope: String, path: String },
    /// Relative or absolute filesystem-style path.
    Local { path: String, absolute: bool },
}

// -----------------------------------------------------------------------------
// Languages and milestones
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct LanguageStmt {
    pub id: Name,
    pub parent: Option<Name>,
    /// Display name (raw text to end of line); defaults to the id.
    pub name: Option<Name>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MilestoneStmt {
    pub time: Option<TimeExpr>,
    pub language: Option<Name>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeExpr {
    pub kind: TimeExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeExprKind {
    Instant(i64),
    Range(i64, i64),
}

// -----------------------------------------------------------------------------
// Phonology declarations
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TraitStmt {
    pub name: Name,
    pub features: Vec<FeatureDecl>,
    pub span: Span,
}

/// One feature of a trait: synonymous labels joined by `|`, with an optional
/// `*` default marker.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureDecl {
    pub labels: Vec<Name>,
    pub default: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassStmt {
    pub name: Name,
    pub encodes: Vec<Name>,
    pub annotates: Vec<Name>,
    pub phonemes: Vec<PhonemeDecl>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhonemeDecl {
    pub glyph: Name,
    pub features: Vec<Name>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStmt {
    pub name: Name,
    pub kind: SeriesDeclKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SeriesDeclKind {
    List(Vec<Name>),
    Category(CategoryExpr),
}

/// `[Base+feat-feat]` — an inline phoneme predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryExpr {
    pub base: Option<Name>,
    pub modifiers: Vec<ModifierExpr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModifierExpr {
    pub positive: bool,
    pub label: Name,
    pub span: Span,
}

// -----------------------------------------------------------------------------
// Words
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct WordStmt {
    pub gloss: Name,
    /// Raw transcription text between slashes, e.g. `ˈwæ.ter`.
    pub pronunciation: Name,
    pub definitions: Vec<DefinitionDecl>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionDecl {
    pub pos: Option<Name>,
    pub text: String,
    pub span: Span,
}

// -----------------------------------------------------------------------------
// Sound changes
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ChangeStmt {
    pub source: SourceExpr,
    pub target: TargetExpr,
    pub environment: Option<EnvironmentExpr>,
    pub description: Option<Name>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceExpr {
    pub kind: SourceExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SourceExprKind {
    /// `[]` — matches the gap between phonemes.
    Empty,
    Pattern(Vec<PatternExpr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatternExpr {
    pub kind: PatternExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PatternExprKind {
    /// Unresolved ident: a class, a series, or a phoneme glyph run.
    Text(String),
    Category(CategoryExpr),
    /// `.` — syllable boundary; parsed, ignored by the engine.
    Boundary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetExpr {
    pub kind: TargetExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TargetExprKind {
    /// `[]` — deletion.
    Empty,
    /// Glyph runs to be segmented against the inventory.
    Text(Vec<Name>),
    /// `[+feat-feat]` — feature modification.
    Modification(Vec<ModifierExpr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentExpr {
    pub before: Vec<PatternExpr>,
    pub after: Vec<PatternExpr>,
    pub anchor_start: bool,
    pub anchor_end: bool,
    pub span: Span,
}
