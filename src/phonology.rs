//! Phonological value types: traits, features, classes, phonemes, series,
//! and the inline category predicate.
//!
//! Mutually-referential entities (trait↔feature, class↔phoneme) live in
//! arena vectors on [`Module`](crate::module::Module) and refer to each
//! other through copyable ids, so back-references never need shared
//! mutability: an entity is allocated first and its children filled in
//! afterwards.

use indexmap::IndexMap;

use crate::diag::Span;
use crate::module::Module;

macro_rules! entity_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

entity_id!(TraitId);
entity_id!(FeatureId);
entity_id!(ClassId);
entity_id!(PhonemeId);
entity_id!(SeriesId);
entity_id!(LanguageId);

/// Index of a sound change in its module's `sound_changes` list.
entity_id!(ChangeId);

/// A named phonological dimension, e.g. *Voice* or *Place*.
///
/// `default` is fixed after all features are collected: the explicitly
/// marked feature, or the first declared one.
#[derive(Debug, Clone, PartialEq)]
pub struct TraitDef {
    pub name: String,
    pub features: Vec<FeatureId>,
    pub default: FeatureId,
    pub definition_site: Span,
}

/// One value of a trait. Labels are synonyms; the first is canonical.
/// Labels are unique across *all* traits in a module.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureDef {
    pub labels: Vec<(String, Span)>,
    pub owner: TraitId,
}

impl FeatureDef {
    pub fn label(&self) -> &str {
        &self.labels[0].0
    }
}

/// A set of phonemes sharing the same trait skeleton. Each member phoneme
/// specifies one feature per entry of `encodes`, positionally.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub name: String,
    pub encodes: Vec<TraitId>,
    /// Reserved: parsed and stored, never populated or consumed.
    pub annotates: Vec<String>,
    pub phonemes: Vec<PhonemeId>,
    pub definition_site: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhonemeDef {
    pub glyph: String,
    pub class: ClassId,
    pub features: IndexMap<TraitId, FeatureId>,
    /// Module-wide declaration index; strictly increasing. Breaks ties in
    /// the transcription matcher's inventory order.
    pub index: u32,
    pub definition_site: Span,
}

/// A named grouping of phonemes, by explicit list or by predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesDef {
    pub name: String,
    pub kind: SeriesKind,
    pub definition_site: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SeriesKind {
    List(Vec<PhonemeId>),
    Category(Category),
}

/// An inline predicate over phonemes: an optional base class or series
/// narrowed by signed feature modifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub base: Option<CategoryBase>,
    pub modifiers: Vec<Modifier>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CategoryBase {
    Class(ClassId),
    Series(SeriesId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Modifier {
    pub feature: FeatureId,
    pub positive: bool,
}

impl Modifier {
    /// Whether a phoneme satisfies this modifier: its feature for the
    /// modifier's trait equals the modifier's feature (positive), or does
    /// not (negative). A phoneme that does not encode the trait at all
    /// fails a positive modifier and passes a negative one.
    pub fn matches(&self, module: &Module, phoneme: PhonemeId) -> bool {
        let owner = module.feature(self.feature).owner;
        let has = module.phoneme(phoneme).features.get(&owner) == Some(&self.feature);
        has == self.positive
    }
}

impl Category {
    /// Category membership per the base (class roster, series list, or a
    /// category series applied recursively) plus every modifier.
    pub fn matches(&self, module: &Module, phoneme: PhonemeId) -> bool {
        let in_base = match self.base {
            None => true,
            Some(CategoryBase::Class(class)) => {
                module.class(class).phonemes.contains(&phoneme)
            }
            Some(CategoryBase::Series(series)) => match &module.series_def(series).kind {
                SeriesKind::List(members) => members.contains(&phoneme),
                SeriesKind::Category(category) => category.matches(module, phoneme),
            },
        };

        in_base
            && self
                .modifiers
                .iter()
                .all(|modifier| modifier.matches(module, phoneme))
    }
}

#[cfg(test)]
#[path = "tests/t_phonology.rs"]
mod tests;
