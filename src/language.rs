use crate::diag::Span;
use crate::phonology::LanguageId;

/// A node in the language family tree.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageDef {
    /// Short identifier, unique within a module (e.g. `OEng`).
    pub id: String,
    /// Display name; defaults to the id.
    pub name: String,
    pub parent: Option<LanguageId>,
    pub milestones: Vec<Milestone>,
    pub definition_site: Span,
}

/// A point on a language's timeline, recorded whenever a milestone statement
/// completes the driver context. `ends == None` means open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Milestone {
    pub starts: i64,
    pub ends: Option<i64>,
    pub language: LanguageId,
}
