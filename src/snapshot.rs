//! The snapshot builder: a language's lexicon at a chosen point in time,
//! with every applicable sound change folded over each word.

use crate::diag::Span;
use crate::errors::{CompileError, CompileWarning};
use crate::module::Module;
use crate::phonology::{ChangeId, LanguageId};
use crate::word::Word;

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// `None` when the requested language does not exist (recorded as an
    /// error).
    pub language: Option<LanguageId>,
    pub time: i64,
    pub words: Vec<Word>,
    /// The applied changes, in application order.
    pub sound_changes: Vec<ChangeId>,
    pub errors: Vec<CompileError>,
    pub warnings: Vec<CompileWarning>,
    pub ok: bool,
}

impl Snapshot {
    pub fn word(&self, gloss: &str) -> Option<&Word> {
        self.words.iter().find(|word| word.gloss == gloss)
    }
}

impl Module {
    /// Builds the lexicon of `language` at `time`.
    ///
    /// Sound changes whose window has opened by `time` are applied in
    /// `(start, declaration index)` order to every word inherited from the
    /// language or its ancestors and alive at `time`. Words are folded
    /// immutably; each change that alters a word extends its etymology.
    pub fn snapshot(&self, language: &str, time: i64) -> Snapshot {
        let mut errors = self.errors.clone();
        let mut warnings = self.warnings.clone();

        let Some(language_id) = self.find_language(language) else {
            errors.push(CompileError::UnknownLanguage(
                language.to_string(),
                Span::default(),
            ));
            return Snapshot {
                language: None,
                time,
                words: Vec::new(),
                sound_changes: Vec::new(),
                ok: false,
                errors,
                warnings,
            };
        };

        let mut changes: Vec<ChangeId> = (0..self.sound_changes.len())
            .map(|i| ChangeId(i as u32))
            .filter(|&id| self.sound_changes[id.index()].tag.time.start <= time)
            .collect();
        changes.sort_by_key(|&id| self.sound_changes[id.index()].tag.order_key());

        let selected: Vec<&Word> = self
            .words
            .values()
            .filter(|word| {
                self.is_ancestor(language_id, word.tag.language) && word.tag.time.contains(time)
            })
            .collect();

        let mut words = Vec::with_capacity(selected.len());
        for word in selected {
            let mut current = word.clone();
            for &id in &changes {
                let change = &self.sound_changes[id.index()];
                if let Some(next) = change.apply(self, &current, id, &mut warnings) {
                    current = next;
                }
            }
            words.push(current);
        }

        Snapshot {
            language: Some(language_id),
            time,
            words,
            sound_changes: changes,
            ok: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

#[cfg(test)]
#[path = "tests/t_snapshot.rs"]
mod tests;
