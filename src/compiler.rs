//! The statement-walking compiler driver.
//!
//! `compile_module` parses a source text and folds its statements, in
//! document order, into a [`Module`]. Errors are recorded in the module and
//! never raised; a parse failure records a single error and stops.

use indexmap::IndexMap;

use crate::ast;
use crate::change::{ChangeSource, ChangeTarget, Environment, Segment, SoundChange};
use crate::diag::Span;
use crate::errors::CompileError;
use crate::import::Importer;
use crate::language::Milestone;
use crate::matcher::match_phonemes;
use crate::module::{Module, SoundEntity};
use crate::parse::Parser;
use crate::phonology::{Category, CategoryBase, FeatureId, LanguageId, Modifier, PhonemeId, TraitId};
use crate::resolver::Resolve;
use crate::tag::{Tag, TimeRange};
use crate::word::{Definition, Word};

/// Characters the transcription matcher never sees: syllable separators and
/// stress marks.
const SEPARATORS: [char; 3] = ['.', 'ˈ', 'ˌ'];

pub fn compile_module(source: &str, source_name: &str, resolver: &impl Resolve) -> Module {
    let mut module = Module::new(source_name, source);

    let program = match Parser::new(source).and_then(|mut parser| parser.parse()) {
        Ok(program) => program,
        Err(error) => {
            module.errors.push(CompileError::Parse {
                message: error.to_string(),
                span: error.span(),
            });
            return module;
        }
    };

    let mut compiler = Compiler {
        module,
        resolver,
        language: None,
        time: None,
    };
    for stmt in program.stmts {
        if !compiler.compile_stmt(stmt) {
            break;
        }
    }
    compiler.module
}

/// Per-compilation state: the module under construction and the ambient
/// language × time context set by milestone statements.
struct Compiler<'r, R: Resolve> {
    module: Module,
    resolver: &'r R,
    language: Option<LanguageId>,
    time: Option<TimeRange>,
}

impl<R: Resolve> Compiler<'_, R> {
    /// Dispatches one statement. The returned flag is reserved for fatal
    /// aborts; every handler currently continues.
    fn compile_stmt(&mut self, stmt: ast::Stmt) -> bool {
        match stmt {
            ast::Stmt::Import(stmt) => self.compile_import(stmt),
            ast::Stmt::Language(stmt) => self.compile_language(stmt),
            ast::Stmt::Milestone(stmt) => self.compile_milestone(stmt),
            ast::Stmt::Trait(stmt) => self.compile_trait(stmt),
            ast::Stmt::Class(stmt) => self.compile_class(stmt),
            ast::Stmt::Series(stmt) => self.compile_series(stmt),
            ast::Stmt::Word(stmt) => self.compile_word(stmt),
            ast::Stmt::Change(stmt) => self.compile_change(stmt),
        }
        true
    }

    fn error(&mut self, error: CompileError) {
        self.module.errors.push(error);
    }

    /// Materializes a tag if the context has both a language and a time
    /// window. Callers must treat `None` as "no milestone yet".
    fn current_tag(&mut self) -> Option<Tag> {
        let language = self.language?;
        let time = self.time?;
        Some(self.module.next_tag(language, time))
    }

    // -------------------------------------------------------------------------
    // Imports
    // -------------------------------------------------------------------------

    fn compile_import(&mut self, stmt: ast::ImportStmt) {
        let resolved = match &stmt.path.kind {
            ast::ImportPathKind::Scoped { scope, path } => {
                self.resolver.resolve_scoped(scope, path)
            }
            ast::ImportPathKind::Local { path, absolute } => {
                self.resolver.resolve_local(path, *absolute)
            }
        };

        let imported = match resolved {
            Ok(module) => module,
            Err(message) => {
                self.error(CompileError::ImportFailed {
                    message,
                    span: stmt.path.span,
                });
                return;
            }
        };

        // Re-emit the imported module's diagnostics, attributed to both the
        // import statement and the original source.
        for error in &imported.errors {
            self.module.errors.push(CompileError::Imported {
                source_name: imported.source_name.clone(),
                message: error.to_string(),
                span: stmt.span,
                source_span: error.span(),
            });
        }
        self.module.warnings.extend(imported.warnings.iter().cloned());

        let wildcard = stmt
            .names
            .iter()
            .any(|name| name.kind == ast::ImportNameKind::Wildcard);
        let named: Vec<&ast::ImportName> = stmt
            .names
            .iter()
            .filter(|name| matches!(name.kind, ast::ImportNameKind::Named(_)))
            .collect();

        if wildcard && !named.is_empty() {
            // Recorded as an error, but the wildcard still imports.
            self.error(CompileError::WildcardWithNamed(stmt.span));
        }

        let mut importer = Importer::new(&imported, stmt.span);
        if wildcard {
            importer.import_all(&mut self.module);
        } else {
            for name in named {
                let ast::ImportNameKind::Named(text) = &name.kind else {
                    continue;
                };
                if !importer.import_named(&mut self.module, text) {
                    self.module
                        .errors
                        .push(CompileError::ImportNameNotFound(text.clone(), name.span));
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Languages and milestones
    // -------------------------------------------------------------------------

    fn compile_language(&mut self, stmt: ast::LanguageStmt) {
        if self.module.find_language(&stmt.id.text).is_some() {
            self.error(CompileError::DuplicateLanguage(
                stmt.id.text.clone(),
                stmt.id.span,
            ));
            return;
        }

        let parent = match &stmt.parent {
            Some(parent) => match self.module.find_language(&parent.text) {
                Some(id) => Some(id),
                None => {
                    self.error(CompileError::UnknownLanguage(
                        parent.text.clone(),
                        parent.span,
                    ));
                    None
                }
            },
            None => None,
        };

        let name = stmt
            .name
            .as_ref()
            .map(|name| name.text.clone())
            .unwrap_or_else(|| stmt.id.text.clone());

        self.module
            .add_language(stmt.id.text, name, parent, stmt.span);
    }

    fn compile_milestone(&mut self, stmt: ast::MilestoneStmt) {
        if let Some(time) = &stmt.time {
            match time.kind {
                ast::TimeExprKind::Instant(start) => {
                    self.time = Some(TimeRange::instant(start));
                }
                ast::TimeExprKind::Range(start, end) => {
                    if start >= end {
                        self.error(CompileError::InvertedRange {
                            start,
                            end,
                            span: time.span,
                        });
                    } else {
                        self.time = Some(TimeRange::range(start, end));
                    }
                }
            }
        }

        if let Some(language) = &stmt.language {
            match self.module.find_language(&language.text) {
                Some(id) => self.language = Some(id),
                None => self.error(CompileError::UnknownLanguage(
                    language.text.clone(),
                    language.span,
                )),
            }
        }

        if let (Some(language), Some(time)) = (self.language, self.time) {
            self.module.add_milestone(Milestone {
                starts: time.start,
                ends: time.end,
                language,
            });
        }
    }

    // -------------------------------------------------------------------------
    // Phonology declarations
    // -------------------------------------------------------------------------

    fn compile_trait(&mut self, stmt: ast::TraitStmt) {
        if self.module.find_trait(&stmt.name.text).is_some() {
            self.error(CompileError::DuplicateTrait(
                stmt.name.text.clone(),
                stmt.name.span,
            ));
            return;
        }

        // A trait with no features would have no default to resolve against.
        if stmt.features.is_empty() {
            self.error(CompileError::EmptyTrait(
                stmt.name.text.clone(),
                stmt.name.span,
            ));
            return;
        }

        let trait_id = self.module.alloc_trait(stmt.name.text.clone(), stmt.span);

        let mut default: Option<FeatureId> = None;
        let mut first: Option<FeatureId> = None;

        for decl in &stmt.features {
            // One label names one feature, across every trait in the module.
            for label in &decl.labels {
                if self.module.find_label(&label.text).is_some() {
                    self.error(CompileError::DuplicateLabel(
                        label.text.clone(),
                        label.span,
                    ));
                }
            }
            let labels = decl
                .labels
                .iter()
                .map(|label| (label.text.clone(), label.span))
                .collect();
            let feature_id = self.module.add_feature(trait_id, labels);
            first.get_or_insert(feature_id);

            if decl.default {
                if default.is_some() {
                    self.error(CompileError::MultipleDefaults {
                        trait_name: stmt.name.text.clone(),
                        span: decl.span,
                    });
                } else {
                    default = Some(feature_id);
                }
            }
        }

        if let Some(default) = default.or(first) {
            self.module.set_trait_default(trait_id, default);
        }
    }

    fn compile_class(&mut self, stmt: ast::ClassStmt) {
        if self.module.get_sound_entity(&stmt.name.text).is_some() {
            self.error(CompileError::NameCollision(
                stmt.name.text.clone(),
                stmt.name.span,
            ));
            return;
        }

        let mut encodes: Vec<TraitId> = Vec::new();
        for name in &stmt.encodes {
            match self.module.find_trait(&name.text) {
                Some(id) => encodes.push(id),
                None => {
                    self.error(CompileError::UnknownTrait(name.text.clone(), name.span));
                    return;
                }
            }
        }

        let annotates = stmt
            .annotates
            .iter()
            .map(|name| name.text.clone())
            .collect();
        let class_id = self
            .module
            .alloc_class(stmt.name.text.clone(), encodes.clone(), annotates, stmt.span);

        for decl in &stmt.phonemes {
            if self.module.get_sound_entity(&decl.glyph.text).is_some() {
                self.error(CompileError::NameCollision(
                    decl.glyph.text.clone(),
                    decl.glyph.span,
                ));
                continue;
            }

            if decl.features.len() != encodes.len() {
                self.error(CompileError::FeatureArity {
                    expected: encodes.len(),
                    found: decl.features.len(),
                    span: decl.span,
                });
            }

            let mut features: IndexMap<TraitId, FeatureId> = IndexMap::new();
            for (&trait_id, label) in encodes.iter().zip(&decl.features) {
                match self.module.find_label(&label.text) {
                    Some(feature_id) if self.module.feature(feature_id).owner == trait_id => {
                        features.insert(trait_id, feature_id);
                    }
                    Some(_) => {
                        self.error(CompileError::NotAFeatureOfTrait {
                            label: label.text.clone(),
                            trait_name: self.module.trait_def(trait_id).name.clone(),
                            span: label.span,
                        });
                    }
                    None => {
                        self.error(CompileError::UnknownFeature(
                            label.text.clone(),
                            label.span,
                        ));
                    }
                }
            }

            self.module
                .add_phoneme(decl.glyph.text.clone(), class_id, features, decl.span);
        }
    }

    fn compile_series(&mut self, stmt: ast::SeriesStmt) {
        if self.module.get_sound_entity(&stmt.name.text).is_some() {
            self.error(CompileError::NameCollision(
                stmt.name.text.clone(),
                stmt.name.span,
            ));
            return;
        }

        let kind = match &stmt.kind {
            ast::SeriesDeclKind::List(glyphs) => {
                let mut members = Vec::new();
                for glyph in glyphs {
                    match self.module.find_phoneme(&glyph.text) {
                        Some(id) => members.push(id),
                        None => self.error(CompileError::UnknownPhoneme(
                            glyph.text.clone(),
                            glyph.span,
                        )),
                    }
                }
                crate::phonology::SeriesKind::List(members)
            }
            ast::SeriesDeclKind::Category(expr) => {
                let Some(category) = self.compile_category(expr) else {
                    return;
                };
                crate::phonology::SeriesKind::Category(category)
            }
        };

        self.module.add_series(stmt.name.text.clone(), kind, stmt.span);
    }

    fn compile_category(&mut self, expr: &ast::CategoryExpr) -> Option<Category> {
        let base = match &expr.base {
            None => None,
            Some(name) => match self.module.get_sound_entity(&name.text) {
                Some((SoundEntity::Class(id), _)) => Some(CategoryBase::Class(id)),
                Some((SoundEntity::Series(id), _)) => Some(CategoryBase::Series(id)),
                _ => {
                    self.error(CompileError::UnknownSoundEntity(
                        name.text.clone(),
                        name.span,
                    ));
                    return None;
                }
            },
        };

        Some(Category {
            base,
            modifiers: self.compile_modifiers(&expr.modifiers),
        })
    }

    fn compile_modifiers(&mut self, exprs: &[ast::ModifierExpr]) -> Vec<Modifier> {
        let mut modifiers = Vec::new();
        for expr in exprs {
            match self.module.find_label(&expr.label.text) {
                Some(feature) => modifiers.push(Modifier {
                    feature,
                    positive: expr.positive,
                }),
                None => self.error(CompileError::UnknownFeature(
                    expr.label.text.clone(),
                    expr.label.span,
                )),
            }
        }
        modifiers
    }

    // -------------------------------------------------------------------------
    // Words
    // -------------------------------------------------------------------------

    fn compile_word(&mut self, stmt: ast::WordStmt) {
        let Some(tag) = self.current_tag() else {
            self.error(CompileError::NoMilestone(stmt.span));
            return;
        };

        if self.module.words.contains_key(&stmt.gloss.text) {
            self.error(CompileError::DuplicateWord(
                stmt.gloss.text.clone(),
                stmt.gloss.span,
            ));
            return;
        }

        let Some(phonemes) =
            self.transcribe(&stmt.pronunciation.text, stmt.pronunciation.span)
        else {
            return;
        };

        let definitions = stmt
            .definitions
            .iter()
            .map(|decl| Definition {
                pos: decl.pos.as_ref().map(|pos| pos.text.clone()),
                text: decl.text.clone(),
            })
            .collect();

        let word = Word {
            gloss: stmt.gloss.text.clone(),
            phonemes,
            definitions,
            tag,
            definition_site: stmt.span,
            etymology: Vec::new(),
        };
        self.module.words.insert(stmt.gloss.text, word);
    }

    /// Segments transcription text against the current inventory, ignoring
    /// syllable separators and stress marks.
    fn transcribe(&mut self, text: &str, span: Span) -> Option<Vec<PhonemeId>> {
        let filtered: String = text
            .chars()
            .filter(|ch| !SEPARATORS.contains(ch) && !ch.is_whitespace())
            .collect();

        let result = {
            let inventory = self.module.matcher_inventory();
            match_phonemes(&filtered, &inventory)
                .map(|matches| matches.into_iter().map(|m| m.phoneme).collect::<Vec<_>>())
        };

        match result {
            Ok(phonemes) => Some(phonemes),
            Err(error) => {
                self.error(CompileError::Transcription {
                    offset: error.offset,
                    rest: error.rest,
                    span,
                });
                None
            }
        }
    }

    // -------------------------------------------------------------------------
    // Sound changes
    // -------------------------------------------------------------------------

    fn compile_change(&mut self, stmt: ast::ChangeStmt) {
        let Some(tag) = self.current_tag() else {
            self.error(CompileError::NoMilestone(stmt.span));
            return;
        };

        let source = match &stmt.source.kind {
            ast::SourceExprKind::Empty => ChangeSource::Empty,
            ast::SourceExprKind::Pattern(elements) => {
                let Some(segments) = self.compile_segments(elements) else {
                    return;
                };
                ChangeSource::Pattern(segments)
            }
        };

        let target = match &stmt.target.kind {
            ast::TargetExprKind::Empty => ChangeTarget::Empty,
            ast::TargetExprKind::Text(names) => {
                let mut phonemes = Vec::new();
                for name in names {
                    let Some(mut ids) = self.transcribe(&name.text, name.span) else {
                        return;
                    };
                    phonemes.append(&mut ids);
                }
                ChangeTarget::Phonemes(phonemes)
            }
            ast::TargetExprKind::Modification(exprs) => {
                ChangeTarget::Modification(self.compile_modifiers(exprs))
            }
        };

        let environment = match &stmt.environment {
            None => None,
            Some(env) => {
                let Some(before) = self.compile_segments(&env.before) else {
                    return;
                };
                let Some(after) = self.compile_segments(&env.after) else {
                    return;
                };
                Some(Environment {
                    before,
                    after,
                    anchor_start: env.anchor_start,
                    anchor_end: env.anchor_end,
                })
            }
        };

        self.module.sound_changes.push(SoundChange {
            source,
            target,
            environment,
            description: stmt.description.map(|name| name.text),
            tag,
            definition_site: stmt.span,
        });
    }

    /// Resolves pattern elements to segments. Bare text resolves through
    /// the sound-entity namespace first (a class or series becomes a
    /// base-only category), then falls back to transcription. Syllable
    /// boundaries are dropped.
    fn compile_segments(&mut self, elements: &[ast::PatternExpr]) -> Option<Vec<Segment>> {
        let mut segments = Vec::new();
        for element in elements {
            match &element.kind {
                ast::PatternExprKind::Boundary => {}
                ast::PatternExprKind::Category(expr) => {
                    let category = self.compile_category(expr)?;
                    segments.push(Segment::Category(category));
                }
                ast::PatternExprKind::Text(text) => match self.module.get_sound_entity(text) {
                    Some((SoundEntity::Phoneme(id), _)) => segments.push(Segment::Phoneme(id)),
                    Some((SoundEntity::Class(id), _)) => {
                        segments.push(Segment::Category(Category {
                            base: Some(CategoryBase::Class(id)),
                            modifiers: Vec::new(),
                        }));
                    }
                    Some((SoundEntity::Series(id), _)) => {
                        segments.push(Segment::Category(Category {
                            base: Some(CategoryBase::Series(id)),
                            modifiers: Vec::new(),
                        }));
                    }
                    None => {
                        let ids = self.transcribe(text, element.span)?;
                        segments.extend(ids.into_iter().map(Segment::Phoneme));
                    }
                },
            }
        }
        Some(segments)
    }
}

#[cfg(test)]
#[path = "tests/t_compiler.rs"]
mod tests;

#[cfg(test)]
#[path = "tests/t_import.rs"]
mod import_tests;
