//! Sound changes and the rewrite engine.
//!
//! A change is `source > target / environment`, stamped with the tag that
//! was current when it was declared. Matching walks a word's phoneme
//! sequence; rewriting resolves the target against each match and splices
//! the result in, left to right.

use crate::diag::Span;
use crate::errors::CompileWarning;
use crate::module::Module;
use crate::phonology::{Category, ChangeId, Modifier, PhonemeId};
use crate::tag::Tag;
use crate::word::Word;

#[derive(Debug, Clone, PartialEq)]
pub struct SoundChange {
    pub source: ChangeSource,
    pub target: ChangeTarget,
    pub environment: Option<Environment>,
    pub description: Option<String>,
    pub tag: Tag,
    pub definition_site: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChangeSource {
    /// Matches the gap between phonemes (and at either edge).
    Empty,
    Pattern(Vec<Segment>),
}

/// One position of a pattern: a specific phoneme or a category predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Phoneme(PhonemeId),
    Category(Category),
}

impl Segment {
    pub fn matches(&self, module: &Module, phoneme: PhonemeId) -> bool {
        match self {
            Segment::Phoneme(expected) => *expected == phoneme,
            Segment::Category(category) => category.matches(module, phoneme),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChangeTarget {
    Empty,
    Phonemes(Vec<PhonemeId>),
    Modification(Vec<Modifier>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    pub before: Vec<Segment>,
    pub after: Vec<Segment>,
    pub anchor_start: bool,
    pub anchor_end: bool,
}

impl SoundChange {
    /// Whether this change rewrites `word`: the tags overlap in time and at
    /// least one source match passes the environment.
    pub fn applies(&self, module: &Module, word: &Word) -> bool {
        self.tag.overlaps(&word.tag) && !self.find_matches(module, &word.phonemes).is_empty()
    }

    /// Applies this change to `word` if applicable. Returns the derived
    /// word, or `None` when nothing matched or the rewrite was the
    /// identity. The input word is never touched.
    pub fn apply(
        &self,
        module: &Module,
        word: &Word,
        id: ChangeId,
        warnings: &mut Vec<CompileWarning>,
    ) -> Option<Word> {
        if !self.tag.overlaps(&word.tag) {
            return None;
        }
        let ranges = self.find_matches(module, &word.phonemes);
        if ranges.is_empty() {
            return None;
        }

        let mut out = word.phonemes.clone();
        let mut offset: isize = 0;
        // Matches may overlap at discovery time; the rewrite consumes them
        // left to right and drops any match that starts inside an already
        // replaced region.
        let mut consumed = 0usize;
        for &(start, end) in &ranges {
            if start < consumed {
                continue;
            }
            let replacement = self.resolve_target(module, &word.phonemes[start..end], warnings);
            let at = (start as isize + offset) as usize;
            let upto = (end as isize + offset) as usize;
            out.splice(at..upto, replacement.iter().copied());
            offset += replacement.len() as isize - (end - start) as isize;
            consumed = end.max(start);
        }

        if out == word.phonemes {
            return None;
        }
        Some(word.derive(out, id))
    }

    /// All source match ranges `[start, end)` that pass the environment,
    /// ascending. An empty source yields a zero-width match at every gap.
    fn find_matches(&self, module: &Module, phonemes: &[PhonemeId]) -> Vec<(usize, usize)> {
        let candidates: Vec<(usize, usize)> = match &self.source {
            ChangeSource::Empty => (0..=phonemes.len()).map(|i| (i, i)).collect(),
            ChangeSource::Pattern(segments) => {
                let k = segments.len();
                if phonemes.len() < k {
                    Vec::new()
                } else {
                    (0..=phonemes.len() - k)
                        .filter(|&i| {
                            segments
                                .iter()
                                .zip(&phonemes[i..i + k])
                                .all(|(segment, &phoneme)| segment.matches(module, phoneme))
                        })
                        .map(|i| (i, i + k))
                        .collect()
                }
            }
        };

        candidates
            .into_iter()
            .filter(|&(start, end)| self.environment_allows(module, phonemes, start, end))
            .collect()
    }

    /// Tests the environment around the candidate range. `before` is
    /// right-justified against the range start, `after` left-justified
    /// against its end; running off either edge fails silently.
    fn environment_allows(
        &self,
        module: &Module,
        phonemes: &[PhonemeId],
        start: usize,
        end: usize,
    ) -> bool {
        let Some(env) = &self.environment else {
            return true;
        };

        if start < env.before.len() || end + env.after.len() > phonemes.len() {
            return false;
        }
        if env.anchor_start && start != env.before.len() {
            return false;
        }
        if env.anchor_end && end + env.after.len() != phonemes.len() {
            return false;
        }

        let before_ok = env
            .before
            .iter()
            .zip(&phonemes[start - env.before.len()..start])
            .all(|(segment, &phoneme)| segment.matches(module, phoneme));
        let after_ok = env
            .after
            .iter()
            .zip(&phonemes[end..end + env.after.len()])
            .all(|(segment, &phoneme)| segment.matches(module, phoneme));

        before_ok && after_ok
    }

    fn resolve_target(
        &self,
        module: &Module,
        matched: &[PhonemeId],
        warnings: &mut Vec<CompileWarning>,
    ) -> Vec<PhonemeId> {
        match &self.target {
            ChangeTarget::Empty => Vec::new(),
            ChangeTarget::Phonemes(phonemes) => phonemes.clone(),
            ChangeTarget::Modification(modifiers) => matched
                .iter()
                .map(|&phoneme| self.modify(module, phoneme, modifiers, warnings))
                .collect(),
        }
    }

    /// Applies feature modifiers to a copy of the phoneme's feature map,
    /// then re-resolves the result against the phoneme's class inventory.
    /// The first declared phoneme with the exact feature map wins; with no
    /// match the original phoneme survives and a warning is recorded.
    fn modify(
        &self,
        module: &Module,
        phoneme: PhonemeId,
        modifiers: &[Modifier],
        warnings: &mut Vec<CompileWarning>,
    ) -> PhonemeId {
        let def = module.phoneme(phoneme);
        let mut features = def.features.clone();

        for modifier in modifiers {
            let owner = module.feature(modifier.feature).owner;
            // Modifiers for traits the phoneme does not encode are inert.
            let Some(&current) = features.get(&owner) else {
                continue;
            };
            if modifier.positive {
                features.insert(owner, modifier.feature);
            } else {
                let trait_def = module.trait_def(owner);
                let replacement = if current == trait_def.default {
                    trait_def
                        .features
                        .iter()
                        .copied()
                        .find(|&feature| feature != modifier.feature)
                } else {
                    Some(trait_def.default)
                };
                if let Some(replacement) = replacement {
                    features.insert(owner, replacement);
                }
            }
        }

        let class = module.class(def.class);
        for &candidate in &class.phonemes {
            if module.phoneme(candidate).features == features {
                return candidate;
            }
        }

        warnings.push(CompileWarning::UnmatchedModification {
            glyph: def.glyph.clone(),
            class_name: class.name.clone(),
            span: self.definition_site,
        });
        phoneme
    }
}

#[cfg(test)]
#[path = "tests/t_change.rs"]
mod tests;
