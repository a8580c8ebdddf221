//! Copies entities from a compiled module into the importing one.
//!
//! Entities carry id references into their home module's arenas, so an
//! import is a deep copy with id remapping. Each copier memoizes what it
//! has brought over and pulls dependencies first: a class imports the
//! traits it encodes, a list series its phonemes (and through them their
//! classes), a word its phonemes and language. Name clashes against the
//! importing module are recorded as errors; where the clashing entity is of
//! the same kind, references are remapped onto it so compilation can
//! proceed.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::diag::Span;
use crate::errors::CompileError;
use crate::language::Milestone;
use crate::module::{Module, SoundEntity};
use crate::phonology::{
    Category, CategoryBase, ClassId, FeatureId, LanguageId, Modifier, PhonemeId, SeriesId,
    SeriesKind, TraitId,
};
use crate::word::Word;

pub(crate) struct Importer<'a> {
    src: &'a Module,
    import_span: Span,
    traits: HashMap<u32, TraitId>,
    features: HashMap<u32, FeatureId>,
    classes: HashMap<u32, ClassId>,
    series: HashMap<u32, SeriesId>,
    languages: HashMap<u32, LanguageId>,
    phonemes: HashMap<u32, PhonemeId>,
}

impl<'a> Importer<'a> {
    pub(crate) fn new(src: &'a Module, import_span: Span) -> Self {
        Importer {
            src,
            import_span,
            traits: HashMap::new(),
            features: HashMap::new(),
            classes: HashMap::new(),
            series: HashMap::new(),
            languages: HashMap::new(),
            phonemes: HashMap::new(),
        }
    }

    /// Imports one named entity. Returns false when the source module has
    /// nothing by that name.
    pub(crate) fn import_named(&mut self, dst: &mut Module, name: &str) -> bool {
        if let Some(id) = self.src.find_trait(name) {
            self.import_trait(dst, id);
        } else if let Some((entity, _)) = self.src.get_sound_entity(name) {
            match entity {
                SoundEntity::Class(id) => {
                    self.import_class(dst, id);
                }
                SoundEntity::Series(id) => {
                    self.import_series(dst, id);
                }
                SoundEntity::Phoneme(id) => {
                    self.import_phoneme(dst, id);
                }
            }
        } else if let Some(id) = self.src.find_language(name) {
            self.import_language(dst, id);
        } else if self.src.words.contains_key(name) {
            self.import_word(dst, name);
        } else {
            return false;
        }
        true
    }

    /// Imports every entity of the source module, in declaration order.
    pub(crate) fn import_all(&mut self, dst: &mut Module) {
        for id in self.src.trait_ids().collect::<Vec<_>>() {
            self.import_trait(dst, id);
        }
        for id in self.src.class_ids().collect::<Vec<_>>() {
            self.import_class(dst, id);
        }
        for id in self.src.series_ids().collect::<Vec<_>>() {
            self.import_series(dst, id);
        }
        for id in self.src.language_ids().collect::<Vec<_>>() {
            self.import_language(dst, id);
        }
        for gloss in self.src.words.keys().cloned().collect::<Vec<_>>() {
            self.import_word(dst, &gloss);
        }
    }

    fn import_trait(&mut self, dst: &mut Module, old: TraitId) -> TraitId {
        if let Some(&mapped) = self.traits.get(&old.0) {
            return mapped;
        }
        let def = self.src.trait_def(old);

        if let Some(existing) = dst.find_trait(&def.name) {
            dst.errors.push(CompileError::DuplicateTrait(
                def.name.clone(),
                self.import_span,
            ));
            self.traits.insert(old.0, existing);
            // Map the source features onto the existing trait by label so
            // dependents can still resolve.
            for &feature in &def.features {
                let label = self.src.feature(feature).label();
                if let Some(mapped) = dst.find_label(label) {
                    self.features.insert(feature.0, mapped);
                }
            }
            return existing;
        }

        let new_id = dst.alloc_trait(def.name.clone(), self.import_span);
        self.traits.insert(old.0, new_id);

        for &feature in &def.features {
            let feature_def = self.src.feature(feature);
            for (label, _) in &feature_def.labels {
                if dst.find_label(label).is_some() {
                    dst.errors
                        .push(CompileError::DuplicateLabel(label.clone(), self.import_span));
                }
            }
            let new_feature = dst.add_feature(new_id, feature_def.labels.clone());
            self.features.insert(feature.0, new_feature);
        }

        if let Some(&default) = self.features.get(&def.default.0) {
            dst.set_trait_default(new_id, default);
        }
        new_id
    }

    fn import_feature(&mut self, dst: &mut Module, old: FeatureId) -> Option<FeatureId> {
        let owner = self.src.feature(old).owner;
        self.import_trait(dst, owner);
        self.features.get(&old.0).copied()
    }

    fn import_class(&mut self, dst: &mut Module, old: ClassId) -> Option<ClassId> {
        if let Some(&mapped) = self.classes.get(&old.0) {
            return Some(mapped);
        }
        let def = self.src.class(old);

        let encodes: Vec<TraitId> = def
            .encodes
            .iter()
            .map(|&id| self.import_trait(dst, id))
            .collect();

        match dst.get_sound_entity(&def.name) {
            Some((SoundEntity::Class(existing), _)) => {
                dst.errors.push(CompileError::NameCollision(
                    def.name.clone(),
                    self.import_span,
                ));
                self.classes.insert(old.0, existing);
                return Some(existing);
            }
            Some(_) => {
                dst.errors.push(CompileError::NameCollision(
                    def.name.clone(),
                    self.import_span,
                ));
                return None;
            }
            None => {}
        }

        let new_id = dst.alloc_class(
            def.name.clone(),
            encodes,
            def.annotates.clone(),
            self.import_span,
        );
        self.classes.insert(old.0, new_id);

        for &phoneme in &def.phonemes {
            let phoneme_def = self.src.phoneme(phoneme);
            if dst.get_sound_entity(&phoneme_def.glyph).is_some() {
                dst.errors.push(CompileError::NameCollision(
                    phoneme_def.glyph.clone(),
                    self.import_span,
                ));
                continue;
            }
            let features: IndexMap<TraitId, FeatureId> = phoneme_def
                .features
                .iter()
                .filter_map(|(&trait_id, &feature_id)| {
                    let trait_id = self.traits.get(&trait_id.0).copied()?;
                    let feature_id = self.features.get(&feature_id.0).copied()?;
                    Some((trait_id, feature_id))
                })
                .collect();
            let new_phoneme =
                dst.add_phoneme(phoneme_def.glyph.clone(), new_id, features, self.import_span);
            self.phonemes.insert(phoneme.0, new_phoneme);
        }

        Some(new_id)
    }

    fn import_phoneme(&mut self, dst: &mut Module, old: PhonemeId) -> Option<PhonemeId> {
        if let Some(&mapped) = self.phonemes.get(&old.0) {
            return Some(mapped);
        }
        let def = self.src.phoneme(old);
        self.import_class(dst, def.class)?;
        if let Some(&mapped) = self.phonemes.get(&old.0) {
            return Some(mapped);
        }
        // The class mapped onto an existing one; fall back to the glyph.
        dst.find_phoneme(&def.glyph)
    }

    fn import_series(&mut self, dst: &mut Module, old: SeriesId) -> Option<SeriesId> {
        if let Some(&mapped) = self.series.get(&old.0) {
            return Some(mapped);
        }
        let def = self.src.series_def(old);

        let kind = match &def.kind {
            SeriesKind::List(members) => {
                let members = members.to_vec();
                SeriesKind::List(
                    members
                        .iter()
                        .filter_map(|&id| self.import_phoneme(dst, id))
                        .collect(),
                )
            }
            SeriesKind::Category(category) => {
                let category = category.clone();
                SeriesKind::Category(self.import_category(dst, &category)?)
            }
        };

        match dst.get_sound_entity(&def.name) {
            Some((SoundEntity::Series(existing), _)) => {
                dst.errors.push(CompileError::NameCollision(
                    def.name.clone(),
                    self.import_span,
                ));
                self.series.insert(old.0, existing);
                return Some(existing);
            }
            Some(_) => {
                dst.errors.push(CompileError::NameCollision(
                    def.name.clone(),
                    self.import_span,
                ));
                return None;
            }
            None => {}
        }

        let new_id = dst.add_series(def.name.clone(), kind, self.import_span);
        self.series.insert(old.0, new_id);
        Some(new_id)
    }

    fn import_category(&mut self, dst: &mut Module, category: &Category) -> Option<Category> {
        let base = match category.base {
            None => None,
            Some(CategoryBase::Class(id)) => {
                Some(CategoryBase::Class(self.import_class(dst, id)?))
            }
            Some(CategoryBase::Series(id)) => {
                Some(CategoryBase::Series(self.import_series(dst, id)?))
            }
        };
        let modifiers = category
            .modifiers
            .iter()
            .filter_map(|modifier| {
                Some(Modifier {
                    feature: self.import_feature(dst, modifier.feature)?,
                    positive: modifier.positive,
                })
            })
            .collect();
        Some(Category { base, modifiers })
    }

    fn import_language(&mut self, dst: &mut Module, old: LanguageId) -> Option<LanguageId> {
        if let Some(&mapped) = self.languages.get(&old.0) {
            return Some(mapped);
        }
        let def = self.src.language(old);

        let parent = match def.parent {
            Some(parent) => Some(self.import_language(dst, parent)?),
            None => None,
        };

        let new_id = if let Some(existing) = dst.find_language(&def.id) {
            dst.errors.push(CompileError::DuplicateLanguage(
                def.id.clone(),
                self.import_span,
            ));
            existing
        } else {
            dst.add_language(
                def.id.clone(),
                def.name.clone(),
                parent,
                self.import_span,
            )
        };
        self.languages.insert(old.0, new_id);

        // A language brings its history along.
        for milestone in def.milestones.clone() {
            dst.add_milestone(Milestone {
                starts: milestone.starts,
                ends: milestone.ends,
                language: new_id,
            });
        }

        Some(new_id)
    }

    fn import_word(&mut self, dst: &mut Module, gloss: &str) {
        let Some(word) = self.src.words.get(gloss) else {
            return;
        };
        let word = word.clone();

        if dst.words.contains_key(gloss) {
            dst.errors.push(CompileError::DuplicateWord(
                gloss.to_string(),
                self.import_span,
            ));
            return;
        }
        let Some(language) = self.import_language(dst, word.tag.language) else {
            return;
        };

        let mut phonemes = Vec::new();
        for &phoneme in &word.phonemes {
            match self.import_phoneme(dst, phoneme) {
                Some(mapped) => phonemes.push(mapped),
                None => {
                    dst.errors.push(CompileError::UnknownPhoneme(
                        self.src.phoneme(phoneme).glyph.clone(),
                        self.import_span,
                    ));
                    return;
                }
            }
        }

        let tag = dst.next_tag(language, word.tag.time);
        dst.words.insert(
            gloss.to_string(),
            Word {
                gloss: gloss.to_string(),
                phonemes,
                definitions: word.definitions.clone(),
                tag,
                definition_site: self.import_span,
                etymology: Vec::new(),
            },
        );
    }
}
