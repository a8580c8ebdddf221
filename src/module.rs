//! The compilation unit: every entity declared or imported by one source
//! text, plus the errors and warnings recorded along the way.

use indexmap::IndexMap;

use crate::change::SoundChange;
use crate::diag::{self, Span};
use crate::errors::{CompileError, CompileWarning};
use crate::language::{LanguageDef, Milestone};
use crate::phonology::{
    ClassDef, ClassId, FeatureDef, FeatureId, LanguageId, PhonemeDef, PhonemeId, SeriesDef,
    SeriesId, SeriesKind, TraitDef, TraitId,
};
use crate::tag::{Tag, TimeRange};
use crate::word::Word;

/// A name in the shared sound namespace: classes, series, and phoneme
/// glyphs conflict with each other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SoundEntity {
    Class(ClassId),
    Series(SeriesId),
    Phoneme(PhonemeId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub source_name: String,
    /// The compiled source text, kept for diagnostic rendering.
    source: String,

    languages: Vec<LanguageDef>,
    languages_by_id: IndexMap<String, LanguageId>,

    traits: Vec<TraitDef>,
    traits_by_name: IndexMap<String, TraitId>,

    features: Vec<FeatureDef>,
    /// Feature labels are unique across all traits.
    labels: IndexMap<String, FeatureId>,

    classes: Vec<ClassDef>,
    classes_by_name: IndexMap<String, ClassId>,

    series: Vec<SeriesDef>,
    series_by_name: IndexMap<String, SeriesId>,

    phonemes: Vec<PhonemeDef>,
    phonemes_by_glyph: IndexMap<String, PhonemeId>,

    pub words: IndexMap<String, Word>,
    pub milestones: Vec<Milestone>,
    pub sound_changes: Vec<SoundChange>,
    pub errors: Vec<CompileError>,
    pub warnings: Vec<CompileWarning>,

    next_phoneme_index: u32,
    next_tag_index: u32,
}

impl Module {
    pub fn new(source_name: impl Into<String>, source: impl Into<String>) -> Self {
        Module {
            source_name: source_name.into(),
            source: source.into(),
            languages: Vec::new(),
            languages_by_id: IndexMap::new(),
            traits: Vec::new(),
            traits_by_name: IndexMap::new(),
            features: Vec::new(),
            labels: IndexMap::new(),
            classes: Vec::new(),
            classes_by_name: IndexMap::new(),
            series: Vec::new(),
            series_by_name: IndexMap::new(),
            phonemes: Vec::new(),
            phonemes_by_glyph: IndexMap::new(),
            words: IndexMap::new(),
            milestones: Vec::new(),
            sound_changes: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            next_phoneme_index: 0,
            next_tag_index: 0,
        }
    }

    // -------------------------------------------------------------------------
    // Arena accessors
    // -------------------------------------------------------------------------

    pub fn language(&self, id: LanguageId) -> &LanguageDef {
        &self.languages[id.index()]
    }

    pub fn trait_def(&self, id: TraitId) -> &TraitDef {
        &self.traits[id.index()]
    }

    pub fn feature(&self, id: FeatureId) -> &FeatureDef {
        &self.features[id.index()]
    }

    pub fn class(&self, id: ClassId) -> &ClassDef {
        &self.classes[id.index()]
    }

    pub fn series_def(&self, id: SeriesId) -> &SeriesDef {
        &self.series[id.index()]
    }

    pub fn phoneme(&self, id: PhonemeId) -> &PhonemeDef {
        &self.phonemes[id.index()]
    }

    // -------------------------------------------------------------------------
    // Name lookups
    // -------------------------------------------------------------------------

    pub fn find_language(&self, id: &str) -> Option<LanguageId> {
        self.languages_by_id.get(id).copied()
    }

    pub fn find_trait(&self, name: &str) -> Option<TraitId> {
        self.traits_by_name.get(name).copied()
    }

    pub fn find_label(&self, label: &str) -> Option<FeatureId> {
        self.labels.get(label).copied()
    }

    pub fn find_class(&self, name: &str) -> Option<ClassId> {
        self.classes_by_name.get(name).copied()
    }

    pub fn find_series(&self, name: &str) -> Option<SeriesId> {
        self.series_by_name.get(name).copied()
    }

    pub fn find_phoneme(&self, glyph: &str) -> Option<PhonemeId> {
        self.phonemes_by_glyph.get(glyph).copied()
    }

    /// Consults the shared class/series/phoneme namespace in that order and
    /// returns the variant along with its definition site.
    pub fn get_sound_entity(&self, name: &str) -> Option<(SoundEntity, Span)> {
        if let Some(id) = self.find_class(name) {
            return Some((SoundEntity::Class(id), self.class(id).definition_site));
        }
        if let Some(id) = self.find_series(name) {
            return Some((SoundEntity::Series(id), self.series_def(id).definition_site));
        }
        if let Some(id) = self.find_phoneme(name) {
            return Some((SoundEntity::Phoneme(id), self.phoneme(id).definition_site));
        }
        None
    }

    /// Whether `name` names anything importable: a language, trait, class,
    /// series, phoneme, or word.
    pub fn has_entity(&self, name: &str) -> bool {
        self.languages_by_id.contains_key(name)
            || self.traits_by_name.contains_key(name)
            || self.classes_by_name.contains_key(name)
            || self.series_by_name.contains_key(name)
            || self.phonemes_by_glyph.contains_key(name)
            || self.words.contains_key(name)
    }

    /// The features of a named trait, in declaration order.
    pub fn get_features(&self, trait_name: &str) -> Option<&[FeatureId]> {
        self.find_trait(trait_name)
            .map(|id| self.trait_def(id).features.as_slice())
    }

    /// The phonemes grouped under a named class or series. For a category
    /// series, the whole inventory is filtered through the predicate.
    pub fn get_phonemes(&self, name: &str) -> Option<Vec<PhonemeId>> {
        match self.get_sound_entity(name)? {
            (SoundEntity::Class(id), _) => Some(self.class(id).phonemes.clone()),
            (SoundEntity::Series(id), _) => match &self.series_def(id).kind {
                SeriesKind::List(members) => Some(members.clone()),
                SeriesKind::Category(category) => Some(
                    self.all_phonemes()
                        .filter(|&p| category.matches(self, p))
                        .collect(),
                ),
            },
            (SoundEntity::Phoneme(id), _) => Some(vec![id]),
        }
    }

    pub fn all_phonemes(&self) -> impl Iterator<Item = PhonemeId> + '_ {
        (0..self.phonemes.len()).map(|i| PhonemeId(i as u32))
    }

    pub fn trait_ids(&self) -> impl Iterator<Item = TraitId> + '_ {
        (0..self.traits.len()).map(|i| TraitId(i as u32))
    }

    pub fn class_ids(&self) -> impl Iterator<Item = ClassId> + '_ {
        (0..self.classes.len()).map(|i| ClassId(i as u32))
    }

    pub fn series_ids(&self) -> impl Iterator<Item = SeriesId> + '_ {
        (0..self.series.len()).map(|i| SeriesId(i as u32))
    }

    pub fn language_ids(&self) -> impl Iterator<Item = LanguageId> + '_ {
        (0..self.languages.len()).map(|i| LanguageId(i as u32))
    }

    /// The full inventory ordered for the transcription matcher: glyph
    /// length descending, declaration index ascending.
    pub fn list_phonemes(&self) -> Vec<PhonemeId> {
        let mut ids: Vec<PhonemeId> = self.all_phonemes().collect();
        ids.sort_by_key(|&id| {
            let def = self.phoneme(id);
            (std::cmp::Reverse(def.glyph.chars().count()), def.index)
        });
        ids
    }

    /// `(glyph, id)` pairs in matcher order.
    pub fn matcher_inventory(&self) -> Vec<(&str, PhonemeId)> {
        self.list_phonemes()
            .into_iter()
            .map(|id| (self.phoneme(id).glyph.as_str(), id))
            .collect()
    }

    /// Whether `ancestor` is `language` itself or a transitive parent.
    pub fn is_ancestor(&self, language: LanguageId, ancestor: LanguageId) -> bool {
        if language == ancestor {
            return true;
        }
        match self.language(language).parent {
            Some(parent) => self.is_ancestor(parent, ancestor),
            None => false,
        }
    }

    pub fn render_word(&self, word: &Word) -> String {
        word.phonemes
            .iter()
            .map(|&id| self.phoneme(id).glyph.as_str())
            .collect()
    }

    /// Renders one of this module's recorded errors as an annotated source
    /// snippet.
    pub fn format_error(&self, error: &CompileError) -> String {
        diag::format_error(&self.source, &self.source_name, error.span(), error)
    }

    // -------------------------------------------------------------------------
    // Construction (driver and importer only)
    // -------------------------------------------------------------------------

    pub(crate) fn add_language(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        parent: Option<LanguageId>,
        definition_site: Span,
    ) -> LanguageId {
        let id = id.into();
        let language_id = LanguageId(self.languages.len() as u32);
        self.languages.push(LanguageDef {
            id: id.clone(),
            name: name.into(),
            parent,
            milestones: Vec::new(),
            definition_site,
        });
        self.languages_by_id.insert(id, language_id);
        language_id
    }

    /// Allocates a trait with no features yet; they are appended during the
    /// trait's own declaration and the default is fixed afterwards.
    pub(crate) fn alloc_trait(&mut self, name: impl Into<String>, definition_site: Span) -> TraitId {
        let name = name.into();
        let trait_id = TraitId(self.traits.len() as u32);
        self.traits.push(TraitDef {
            name: name.clone(),
            features: Vec::new(),
            default: FeatureId(0),
            definition_site,
        });
        self.traits_by_name.insert(name, trait_id);
        trait_id
    }

    /// Appends a feature to a trait. Labels not already claimed by another
    /// feature are registered in the global label map; the caller is
    /// responsible for reporting clashes.
    pub(crate) fn add_feature(
        &mut self,
        owner: TraitId,
        labels: Vec<(String, Span)>,
    ) -> FeatureId {
        let feature_id = FeatureId(self.features.len() as u32);
        for (label, _) in &labels {
            if !self.labels.contains_key(label) {
                self.labels.insert(label.clone(), feature_id);
            }
        }
        self.features.push(FeatureDef { labels, owner });
        self.traits[owner.index()].features.push(feature_id);
        feature_id
    }

    pub(crate) fn set_trait_default(&mut self, owner: TraitId, default: FeatureId) {
        self.traits[owner.index()].default = default;
    }

    pub(crate) fn alloc_class(
        &mut self,
        name: impl Into<String>,
        encodes: Vec<TraitId>,
        annotates: Vec<String>,
        definition_site: Span,
    ) -> ClassId {
        let name = name.into();
        let class_id = ClassId(self.classes.len() as u32);
        self.classes.push(ClassDef {
            name: name.clone(),
            encodes,
            annotates,
            phonemes: Vec::new(),
            definition_site,
        });
        self.classes_by_name.insert(name, class_id);
        class_id
    }

    /// Adds a phoneme under a class, assigning the next module-wide index.
    pub(crate) fn add_phoneme(
        &mut self,
        glyph: impl Into<String>,
        class: ClassId,
        features: IndexMap<TraitId, FeatureId>,
        definition_site: Span,
    ) -> PhonemeId {
        let glyph = glyph.into();
        let phoneme_id = PhonemeId(self.phonemes.len() as u32);
        let index = self.next_phoneme_index;
        self.next_phoneme_index += 1;
        self.phonemes.push(PhonemeDef {
            glyph: glyph.clone(),
            class,
            features,
            index,
            definition_site,
        });
        self.phonemes_by_glyph.insert(glyph, phoneme_id);
        self.classes[class.index()].phonemes.push(phoneme_id);
        phoneme_id
    }

    pub(crate) fn add_series(
        &mut self,
        name: impl Into<String>,
        kind: SeriesKind,
        definition_site: Span,
    ) -> SeriesId {
        let name = name.into();
        let series_id = SeriesId(self.series.len() as u32);
        self.series.push(SeriesDef {
            name: name.clone(),
            kind,
            definition_site,
        });
        self.series_by_name.insert(name, series_id);
        series_id
    }

    /// Appends a milestone to the module and to its language, skipping
    /// exact `(starts, ends, language)` duplicates.
    pub(crate) fn add_milestone(&mut self, milestone: Milestone) {
        if !self.milestones.contains(&milestone) {
            self.milestones.push(milestone);
        }
        let language = &mut self.languages[milestone.language.index()];
        if !language.milestones.contains(&milestone) {
            language.milestones.push(milestone);
        }
    }

    /// Materializes a tag from the driver context, consuming the next
    /// module-wide tag index.
    pub(crate) fn next_tag(&mut self, language: LanguageId, time: TimeRange) -> Tag {
        let index = self.next_tag_index;
        self.next_tag_index += 1;
        Tag {
            time,
            language,
            index,
        }
    }
}

#[cfg(test)]
#[path = "tests/t_module.rs"]
mod tests;
