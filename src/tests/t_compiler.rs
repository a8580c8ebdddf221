use indoc::indoc;

use super::*;
use crate::resolver::MockResolver;

fn compile(source: &str) -> Module {
    compile_module(source, "test", &MockResolver::default())
}

fn compile_ok(source: &str) -> Module {
    let module = compile(source);
    assert_eq!(module.errors, vec![]);
    module
}

const INVENTORY: &str = indoc! {"
    trait Voice { *voiceless, voiced }
    trait Place { bilabial, alveolar, velar }
    trait Manner { stop, fricative }

    class C encodes (Voice Place Manner) {
        p = voiceless bilabial stop,
        k = voiceless velar stop,
        s = voiceless alveolar fricative,
    }

    trait Height { *mid, low }

    class V encodes (Height) {
        a = low,
        e = mid,
    }
"};

#[test]
fn test_compile_full_description() {
    let module = compile_ok(indoc! {"
        trait Voice { *voiceless, voiced }
        trait Place { bilabial, velar }
        trait Manner { stop }

        class C encodes (Voice Place Manner) {
            p = voiceless bilabial stop,
            k = voiceless velar stop,
        }

        trait Height { *mid, low }

        class V encodes (Height) {
            a = low,
            e = mid,
        }

        lang ON : Old Norse

        @ 1000, ON

        - I /ek/ {
            pron. first person singular
        }

        $ k > p : a toy shift
    "});

    assert!(module.find_language("ON").is_some());
    assert_eq!(module.words.len(), 1);
    assert_eq!(module.sound_changes.len(), 1);
    assert_eq!(
        module.sound_changes[0].description.as_deref(),
        Some("a toy shift")
    );
    assert_eq!(module.milestones.len(), 1);

    let word = &module.words["I"];
    assert_eq!(module.render_word(word), "ek");
    assert_eq!(word.definitions[0].pos.as_deref(), Some("pron"));
    assert_eq!(word.tag.time.start, 1000);
}

#[test]
fn test_parse_failure_records_one_error_and_stops() {
    let module = compile("lang\nlang ON : Old Norse\n");

    assert_eq!(module.errors.len(), 1);
    assert!(matches!(module.errors[0], CompileError::Parse { .. }));
    assert!(module.find_language("ON").is_none());
}

#[test]
fn test_word_before_milestone_is_an_error() {
    let source = format!("{INVENTORY}\nlang ON\n- I /ek/\n");
    let module = compile(&source);

    assert!(matches!(module.errors[0], CompileError::NoMilestone(_)));
    assert!(module.words.is_empty());
}

#[test]
fn test_change_before_milestone_is_an_error() {
    let source = format!("{INVENTORY}\n$ k > p\n");
    let module = compile(&source);

    assert!(matches!(module.errors[0], CompileError::NoMilestone(_)));
    assert!(module.sound_changes.is_empty());
}

#[test]
fn test_milestone_with_unknown_language() {
    let module = compile("@ 1000, Nope\n");
    assert!(matches!(
        module.errors[0],
        CompileError::UnknownLanguage(_, _)
    ));
}

#[test]
fn test_inverted_time_range() {
    let module = compile("lang ON\n@ 1500..1000, ON\n");
    assert!(matches!(
        module.errors[0],
        CompileError::InvertedRange {
            start: 1500,
            end: 1000,
            ..
        }
    ));
}

#[test]
fn test_duplicate_language_id() {
    let module = compile("lang ON\nlang ON : Again\n");
    assert!(matches!(
        module.errors[0],
        CompileError::DuplicateLanguage(_, _)
    ));
}

#[test]
fn test_duplicate_trait_name() {
    let module = compile("trait Voice { a1, b1 }\ntrait Voice { c1 }\n");
    assert!(matches!(
        module.errors[0],
        CompileError::DuplicateTrait(_, _)
    ));
}

#[test]
fn test_feature_label_unique_across_traits() {
    let module = compile("trait Voice { voiced, voiceless }\ntrait Sonority { voiced }\n");
    assert!(matches!(
        module.errors[0],
        CompileError::DuplicateLabel(_, _)
    ));
}

#[test]
fn test_multiple_default_features() {
    let module = compile("trait Voice { *voiced, *voiceless }\n");
    assert!(matches!(
        module.errors[0],
        CompileError::MultipleDefaults { .. }
    ));
    // The first marked feature stays the default.
    let trait_id = module.find_trait("Voice").unwrap();
    let default = module.trait_def(trait_id).default;
    assert_eq!(module.feature(default).label(), "voiced");
}

#[test]
fn test_trait_without_features_is_an_error() {
    let module = compile("trait Voice { }\n");

    assert!(matches!(module.errors[0], CompileError::EmptyTrait(_, _)));
    assert!(module.find_trait("Voice").is_none());
}

#[test]
fn test_format_error_renders_annotated_snippet() {
    let module = compile("@ 1000, Nope\n");
    let rendered = module.format_error(&module.errors[0]);

    assert!(rendered.starts_with("test (1:9) Unknown language: Nope\n"));
    assert!(rendered.contains("1 | @ 1000, Nope"));
    assert!(rendered.contains("^^^^"));
}

#[test]
fn test_unknown_encoded_trait_aborts_class() {
    let module = compile("class C encodes (Tone) { p = high }\n");

    assert!(matches!(module.errors[0], CompileError::UnknownTrait(_, _)));
    assert!(module.find_class("C").is_none());
}

#[test]
fn test_feature_arity_mismatch_still_records_phoneme() {
    let source = indoc! {"
        trait Voice { *voiceless, voiced }
        trait Place { bilabial, velar }

        class C encodes (Voice Place) {
            p = voiceless,
        }
    "};
    let module = compile(source);

    assert!(matches!(
        module.errors[0],
        CompileError::FeatureArity {
            expected: 2,
            found: 1,
            ..
        }
    ));
    // The phoneme exists with the features that did resolve.
    let phoneme = module.find_phoneme("p").unwrap();
    assert_eq!(module.phoneme(phoneme).features.len(), 1);
}

#[test]
fn test_feature_from_wrong_trait() {
    let source = indoc! {"
        trait Voice { *voiceless, voiced }
        trait Place { bilabial, velar }

        class C encodes (Voice Place) {
            p = voiceless voiced,
        }
    "};
    let module = compile(source);

    assert!(matches!(
        module.errors[0],
        CompileError::NotAFeatureOfTrait { .. }
    ));
}

#[test]
fn test_sound_namespace_is_shared() {
    let source = format!("{INVENTORY}\nseries C = {{ p, k }}\n");
    let module = compile(&source);

    assert!(matches!(
        module.errors[0],
        CompileError::NameCollision(_, _)
    ));
    assert!(module.find_series("C").is_none());
}

#[test]
fn test_duplicate_phoneme_glyph_is_skipped() {
    let source = indoc! {"
        trait Voice { *voiceless, voiced }

        class C encodes (Voice) {
            p = voiceless,
            p = voiced,
        }
    "};
    let module = compile(source);

    assert!(matches!(
        module.errors[0],
        CompileError::NameCollision(_, _)
    ));
    let class = module.find_class("C").unwrap();
    assert_eq!(module.class(class).phonemes.len(), 1);
}

#[test]
fn test_duplicate_word_gloss() {
    let source = format!("{INVENTORY}\nlang ON\n@ 1000, ON\n- I /e/\n- I /a/\n");
    let module = compile(&source);

    assert!(matches!(module.errors[0], CompileError::DuplicateWord(_, _)));
    assert_eq!(module.render_word(&module.words["I"]), "e");
}

#[test]
fn test_untranscribable_word_is_skipped() {
    let source = format!("{INVENTORY}\nlang ON\n@ 1000, ON\n- I /exe/\n");
    let module = compile(&source);

    match &module.errors[0] {
        CompileError::Transcription { offset, rest, .. } => {
            assert_eq!(*offset, 1);
            assert_eq!(rest, "xe");
        }
        other => panic!("expected a transcription error, got {other:?}"),
    }
    assert!(module.words.is_empty());
}

#[test]
fn test_unknown_phoneme_in_list_series_is_skipped() {
    let source = format!("{INVENTORY}\nseries F = {{ e, x }}\n");
    let module = compile(&source);

    assert!(matches!(
        module.errors[0],
        CompileError::UnknownPhoneme(_, _)
    ));
    assert_eq!(module.get_phonemes("F").unwrap().len(), 1);
}

#[test]
fn test_unknown_category_base_aborts_series() {
    let source = format!("{INVENTORY}\nseries X = [Nope+voiced]\n");
    let module = compile(&source);

    assert!(matches!(
        module.errors[0],
        CompileError::UnknownSoundEntity(_, _)
    ));
    assert!(module.find_series("X").is_none());
}

#[test]
fn test_time_context_persists_across_milestones() {
    let source = format!(
        "{INVENTORY}\nlang ON\nlang EI < ON\n@ 1000, ON\n- I /ek/\n@ EI\n- you /pa/\n"
    );
    let module = compile_ok(&source);

    // The second milestone changed only the language; the time carried over.
    let you = &module.words["you"];
    assert_eq!(you.tag.time.start, 1000);
    assert_eq!(you.tag.language, module.find_language("EI").unwrap());
}

#[test]
fn test_tag_indexes_strictly_increase() {
    let source = format!("{INVENTORY}\nlang ON\n@ 1000, ON\n- I /ek/\n$ k > p\n$ p > k\n");
    let module = compile_ok(&source);

    let word_index = module.words["I"].tag.index;
    let first = module.sound_changes[0].tag.index;
    let second = module.sound_changes[1].tag.index;
    assert!(word_index < first && first < second);
}

#[test]
fn test_syllable_and_stress_marks_ignored_in_transcription() {
    let source = format!("{INVENTORY}\nlang ON\n@ 1000, ON\n- water /ˈpa.se/\n");
    let module = compile_ok(&source);

    assert_eq!(module.render_word(&module.words["water"]), "pase");
}
