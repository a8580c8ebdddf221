use indoc::indoc;

use super::*;

fn parse_source(source: &str) -> Program {
    let mut parser = Parser::new(source).expect("failed to lex");
    parser.parse().expect("failed to parse")
}

fn parse_err(source: &str) -> ParseError {
    let mut parser = match Parser::new(source) {
        Ok(parser) => parser,
        Err(error) => return error,
    };
    parser.parse().expect_err("expected a parse error")
}

fn only_stmt(source: &str) -> Stmt {
    let mut program = parse_source(source);
    assert_eq!(program.stmts.len(), 1, "expected exactly one statement");
    program.stmts.remove(0)
}

#[test]
fn test_parse_language_forms() {
    let program = parse_source(indoc! {"
        lang OEng : Old English
        lang AmEng < OEng : American English
        lang RP < OEng
    "});

    let Stmt::Language(first) = &program.stmts[0] else {
        panic!("expected a language statement");
    };
    assert_eq!(first.id.text, "OEng");
    assert!(first.parent.is_none());
    assert_eq!(first.name.as_ref().unwrap().text, "Old English");

    let Stmt::Language(second) = &program.stmts[1] else {
        panic!("expected a language statement");
    };
    assert_eq!(second.parent.as_ref().unwrap().text, "OEng");
    assert_eq!(second.name.as_ref().unwrap().text, "American English");

    let Stmt::Language(third) = &program.stmts[2] else {
        panic!("expected a language statement");
    };
    assert!(third.name.is_none());
}

#[test]
fn test_parse_milestone_instant_with_language() {
    let Stmt::Milestone(stmt) = only_stmt("@ 1350, ON") else {
        panic!("expected a milestone");
    };
    assert_eq!(stmt.time.unwrap().kind, TimeExprKind::Instant(1350));
    assert_eq!(stmt.language.unwrap().text, "ON");
}

#[test]
fn test_parse_milestone_range() {
    let Stmt::Milestone(stmt) = only_stmt("@ -500..1500") else {
        panic!("expected a milestone");
    };
    assert_eq!(stmt.time.unwrap().kind, TimeExprKind::Range(-500, 1500));
    assert!(stmt.language.is_none());
}

#[test]
fn test_parse_milestone_language_only() {
    let Stmt::Milestone(stmt) = only_stmt("@ ON") else {
        panic!("expected a milestone");
    };
    assert!(stmt.time.is_none());
    assert_eq!(stmt.language.unwrap().text, "ON");
}

#[test]
fn test_parse_trait_with_synonyms_and_default() {
    let Stmt::Trait(stmt) = only_stmt("trait Manner { stop, flap | tap, *lateral_fricative }")
    else {
        panic!("expected a trait");
    };
    assert_eq!(stmt.name.text, "Manner");
    assert_eq!(stmt.features.len(), 3);

    assert_eq!(stmt.features[0].labels[0].text, "stop");
    assert!(!stmt.features[0].default);

    let synonyms: Vec<&str> = stmt.features[1]
        .labels
        .iter()
        .map(|label| label.text.as_str())
        .collect();
    assert_eq!(synonyms, vec!["flap", "tap"]);

    assert_eq!(stmt.features[2].labels[0].text, "lateral_fricative");
    assert!(stmt.features[2].default);
}

#[test]
fn test_parse_class() {
    let Stmt::Class(stmt) = only_stmt(indoc! {"
        class C encodes (Voice Place Manner) {
            p = voiceless bilabial stop,
            tʃ = voiceless palatal affricate,
        }
    "}) else {
        panic!("expected a class");
    };

    assert_eq!(stmt.name.text, "C");
    let encodes: Vec<&str> = stmt.encodes.iter().map(|name| name.text.as_str()).collect();
    assert_eq!(encodes, vec!["Voice", "Place", "Manner"]);

    assert_eq!(stmt.phonemes.len(), 2);
    assert_eq!(stmt.phonemes[1].glyph.text, "tʃ");
    assert_eq!(stmt.phonemes[1].features.len(), 3);
}

#[test]
fn test_parse_series_list() {
    let Stmt::Series(stmt) = only_stmt("series F = { i, e, æ }") else {
        panic!("expected a series");
    };
    let SeriesDeclKind::List(glyphs) = &stmt.kind else {
        panic!("expected a list series");
    };
    let glyphs: Vec<&str> = glyphs.iter().map(|name| name.text.as_str()).collect();
    assert_eq!(glyphs, vec!["i", "e", "æ"]);
}

#[test]
fn test_parse_series_category() {
    let Stmt::Series(stmt) = only_stmt("series Plosives = [C+stop-voiced]") else {
        panic!("expected a series");
    };
    let SeriesDeclKind::Category(category) = &stmt.kind else {
        panic!("expected a category series");
    };
    assert_eq!(category.base.as_ref().unwrap().text, "C");
    assert_eq!(category.modifiers.len(), 2);
    assert!(category.modifiers[0].positive);
    assert_eq!(category.modifiers[0].label.text, "stop");
    assert!(!category.modifiers[1].positive);
    assert_eq!(category.modifiers[1].label.text, "voiced");
}

#[test]
fn test_parse_word_without_body() {
    let Stmt::Word(stmt) = only_stmt("- I /ek/") else {
        panic!("expected a word");
    };
    assert_eq!(stmt.gloss.text, "I");
    assert_eq!(stmt.pronunciation.text, "ek");
    assert!(stmt.definitions.is_empty());
}

#[test]
fn test_parse_word_with_definitions() {
    let Stmt::Word(stmt) = only_stmt(indoc! {"
        - water /ˈwæ.ter/ {
            noun. liquid that forms the seas, lakes, rivers, and rain
            verb. pour or sprinkle water over a plant or area
        }
    "}) else {
        panic!("expected a word");
    };

    assert_eq!(stmt.pronunciation.text, "ˈwæ.ter");
    assert_eq!(stmt.definitions.len(), 2);
    assert_eq!(stmt.definitions[0].pos.as_ref().unwrap().text, "noun");
    assert_eq!(
        stmt.definitions[0].text,
        "liquid that forms the seas, lakes, rivers, and rain"
    );
    assert_eq!(stmt.definitions[1].pos.as_ref().unwrap().text, "verb");
}

#[test]
fn test_parse_definition_without_pos() {
    let Stmt::Word(stmt) = only_stmt(indoc! {"
        - water /water/ {
            wet stuff
        }
    "}) else {
        panic!("expected a word");
    };
    assert!(stmt.definitions[0].pos.is_none());
    assert_eq!(stmt.definitions[0].text, "wet stuff");
}

#[test]
fn test_parse_change_simple() {
    let Stmt::Change(stmt) = only_stmt("$ k > ʃ") else {
        panic!("expected a sound change");
    };
    let SourceExprKind::Pattern(elements) = &stmt.source.kind else {
        panic!("expected a pattern source");
    };
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].kind, PatternExprKind::Text("k".to_string()));

    let TargetExprKind::Text(names) = &stmt.target.kind else {
        panic!("expected a literal target");
    };
    assert_eq!(names[0].text, "ʃ");
    assert!(stmt.environment.is_none());
    assert!(stmt.description.is_none());
}

#[test]
fn test_parse_change_with_environment_and_description() {
    let Stmt::Change(stmt) =
        only_stmt("$ [C+alveolar+stop] > [+flap] / V_V : alveolar stops lenite")
    else {
        panic!("expected a sound change");
    };

    let SourceExprKind::Pattern(elements) = &stmt.source.kind else {
        panic!("expected a pattern source");
    };
    let PatternExprKind::Category(category) = &elements[0].kind else {
        panic!("expected a category");
    };
    assert_eq!(category.base.as_ref().unwrap().text, "C");

    let TargetExprKind::Modification(modifiers) = &stmt.target.kind else {
        panic!("expected a modification target");
    };
    assert_eq!(modifiers[0].label.text, "flap");

    let env = stmt.environment.unwrap();
    assert_eq!(env.before.len(), 1);
    assert_eq!(env.after.len(), 1);
    assert!(!env.anchor_start && !env.anchor_end);

    assert_eq!(stmt.description.unwrap().text, "alveolar stops lenite");
}

#[test]
fn test_parse_change_deletion_with_end_anchor() {
    let Stmt::Change(stmt) = only_stmt("$ k > [] / _#") else {
        panic!("expected a sound change");
    };
    assert_eq!(stmt.target.kind, TargetExprKind::Empty);

    let env = stmt.environment.unwrap();
    assert!(env.before.is_empty());
    assert!(env.after.is_empty());
    assert!(!env.anchor_start);
    assert!(env.anchor_end);
}

#[test]
fn test_parse_change_empty_source() {
    let Stmt::Change(stmt) = only_stmt("$ [] > e / k_t") else {
        panic!("expected a sound change");
    };
    assert_eq!(stmt.source.kind, SourceExprKind::Empty);
}

#[test]
fn test_parse_environment_boundary_marker() {
    let Stmt::Change(stmt) = only_stmt("$ k > t / a._") else {
        panic!("expected a sound change");
    };
    let env = stmt.environment.unwrap();
    assert_eq!(env.before.len(), 2);
    assert_eq!(env.before[1].kind, PatternExprKind::Boundary);
}

#[test]
fn test_parse_import_wildcard_scoped() {
    let Stmt::Import(stmt) = only_stmt("import * from @core/ipa") else {
        panic!("expected an import");
    };
    assert_eq!(stmt.names.len(), 1);
    assert_eq!(stmt.names[0].kind, ImportNameKind::Wildcard);
    assert_eq!(
        stmt.path.kind,
        ImportPathKind::Scoped {
            scope: "core".to_string(),
            path: "ipa".to_string(),
        }
    );
}

#[test]
fn test_parse_import_named_local() {
    let Stmt::Import(stmt) = only_stmt("import (C, V) from ./lib/consonants") else {
        panic!("expected an import");
    };
    assert_eq!(stmt.names.len(), 2);
    assert_eq!(stmt.names[0].kind, ImportNameKind::Named("C".to_string()));
    assert_eq!(
        stmt.path.kind,
        ImportPathKind::Local {
            path: "./lib/consonants".to_string(),
            absolute: false,
        }
    );
}

#[test]
fn test_parse_import_absolute_path() {
    let Stmt::Import(stmt) = only_stmt("import * from /usr/share/ipa") else {
        panic!("expected an import");
    };
    assert_eq!(
        stmt.path.kind,
        ImportPathKind::Local {
            path: "/usr/share/ipa".to_string(),
            absolute: true,
        }
    );
}

#[test]
fn test_parse_error_environment_without_gap() {
    assert!(matches!(
        parse_err("$ k > t / a"),
        ParseError::EnvironmentGap(_)
    ));
}

#[test]
fn test_parse_error_empty_pattern_in_sequence() {
    assert!(matches!(
        parse_err("$ k [] > t"),
        ParseError::EmptyPatternInSequence(_)
    ));
}

#[test]
fn test_parse_error_category_base_in_target() {
    assert!(matches!(
        parse_err("$ k > [C+stop]"),
        ParseError::CategoryInTarget(_)
    ));
}

#[test]
fn test_parse_error_statement_lead() {
    assert!(matches!(
        parse_err("42"),
        ParseError::ExpectedStatement(_)
    ));
}
