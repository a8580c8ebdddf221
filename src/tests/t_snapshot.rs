use indoc::indoc;

use super::*;
use crate::compiler::compile_module;
use crate::matcher::match_phonemes;
use crate::resolver::MockResolver;

const BASE: &str = indoc! {"
    trait Voice { *voiceless, voiced }
    trait Place { bilabial, alveolar, palatal, velar }
    trait Manner { stop, fricative, affricate, nasal }

    class C encodes (Voice Place Manner) {
        p = voiceless bilabial stop,
        b = voiced bilabial stop,
        t = voiceless alveolar stop,
        d = voiced alveolar stop,
        k = voiceless velar stop,
        c = voiceless palatal stop,
        s = voiceless alveolar fricative,
        ʃ = voiceless palatal fricative,
        tʃ = voiceless palatal affricate,
        n = voiced alveolar nasal,
    }

    trait Height { *mid, high, low }
    trait Backness { front, central, back }

    class V encodes (Height Backness) {
        a = low central,
        e = mid front,
        i = high front,
        o = mid back,
        u = high back,
    }

    lang ON : Old Norse
    lang EI < ON : Early Icelandic
    lang IC < EI : Icelandic
"};

fn compile(source: &str) -> Module {
    let module = compile_module(source, "test", &MockResolver::default());
    assert_eq!(module.errors, vec![]);
    module
}

fn fixture(extra: &str) -> Module {
    compile(&format!("{BASE}\n{extra}\n"))
}

fn rendered(module: &Module, snapshot: &Snapshot, gloss: &str) -> String {
    module.render_word(snapshot.word(gloss).expect("word missing from snapshot"))
}

#[test]
fn test_snapshot_renders_declared_word() {
    let module = fixture("@ 1350, ON\n- I /ek/");
    let snapshot = module.snapshot("ON", 1350);

    assert!(snapshot.ok);
    assert_eq!(rendered(&module, &snapshot, "I"), "ek");
    assert!(snapshot.sound_changes.is_empty());
}

#[test]
fn test_rule_applies_from_its_time_onward() {
    let module = fixture("@ 1350, ON\n- I /ek/\n@ 1500, ON\n$ k > ʃ");

    let early = module.snapshot("ON", 1400);
    assert_eq!(rendered(&module, &early, "I"), "ek");
    assert!(early.sound_changes.is_empty());

    let late = module.snapshot("ON", 1600);
    assert_eq!(rendered(&module, &late, "I"), "eʃ");
    assert_eq!(late.sound_changes.len(), 1);
}

#[test]
fn test_words_follow_the_language_tree() {
    let module = fixture("@ 2000, IC\n- also /otʃo/");

    // A word of a descendant never surfaces in the ancestor.
    assert!(module.snapshot("EI", 1900).word("also").is_none());
    assert!(module.snapshot("ON", 2100).word("also").is_none());

    let own = module.snapshot("IC", 2000);
    assert_eq!(rendered(&module, &own, "also"), "otʃo");
}

#[test]
fn test_ancestor_words_are_inherited() {
    let module = fixture("@ 1350, ON\n- I /ek/");

    let inherited = module.snapshot("IC", 1400);
    assert_eq!(rendered(&module, &inherited, "I"), "ek");
}

#[test]
fn test_word_selection_respects_time_window() {
    let module = fixture("@ 1000..1300, ON\n- I /ek/");

    assert!(module.snapshot("ON", 999).word("I").is_none());
    assert!(module.snapshot("ON", 1000).word("I").is_some());
    assert!(module.snapshot("ON", 1300).word("I").is_some());
    assert!(module.snapshot("ON", 1301).word("I").is_none());
}

#[test]
fn test_chained_rules_apply_in_declaration_order() {
    let module = fixture("@ 1350, ON\n- I /ek/\n@ 1500, ON\n$ k > ʃ\n$ ʃ > tʃ");
    let snapshot = module.snapshot("ON", 1600);

    assert_eq!(rendered(&module, &snapshot, "I"), "etʃ");

    // Both rules start at 1500; declaration order breaks the tie.
    let word = snapshot.word("I").unwrap();
    assert_eq!(word.etymology.len(), 2);
    assert_eq!(module.render_word(&word.etymology[0].word), "ek");
    assert_eq!(module.render_word(&word.etymology[1].word), "eʃ");
}

#[test]
fn test_anchored_deletion_in_snapshot() {
    let module = fixture("@ 1350, ON\n- x /kak/\n@ 1500, ON\n$ k > [] / _#");
    let snapshot = module.snapshot("ON", 1600);

    assert_eq!(rendered(&module, &snapshot, "x"), "ka");
}

#[test]
fn test_feature_modification_rewrites_to_class_member() {
    let module = fixture("@ 1350, ON\n- x /ke/\n@ 1500, ON\n$ [C+velar] > [+palatal]");
    let snapshot = module.snapshot("ON", 1600);

    assert_eq!(rendered(&module, &snapshot, "x"), "ce");
    assert!(snapshot.warnings.is_empty());
}

#[test]
fn test_unresolvable_modification_warns_but_snapshot_is_ok() {
    // No voiceless velar fricative exists, so the modification cannot
    // land on any phoneme.
    let module = fixture("@ 1350, ON\n- x /ke/\n@ 1500, ON\n$ [C+velar] > [+fricative]");
    let snapshot = module.snapshot("ON", 1600);

    assert!(snapshot.ok);
    assert_eq!(rendered(&module, &snapshot, "x"), "ke");
    assert!(matches!(
        snapshot.warnings[0],
        CompileWarning::UnmatchedModification { .. }
    ));
}

#[test]
fn test_change_is_not_selected_before_its_start() {
    let module = fixture("@ 1000..1200, ON\n- x /ka/\n@ 1500, EI\n$ k > ʃ");

    // At 1100 the word is alive but the change has not started.
    let snapshot = module.snapshot("EI", 1100);
    assert!(snapshot.sound_changes.is_empty());
    assert_eq!(rendered(&module, &snapshot, "x"), "ka");
}

#[test]
fn test_snapshot_does_not_mutate_the_module() {
    let module = fixture("@ 1350, ON\n- I /ek/\n@ 1500, ON\n$ k > ʃ");
    let before = module.words["I"].clone();

    let _ = module.snapshot("ON", 1600);

    assert_eq!(module.words["I"], before);
    assert!(module.warnings.is_empty());
}

#[test]
fn test_unknown_language_snapshot() {
    let module = fixture("@ 1350, ON\n- I /ek/");
    let snapshot = module.snapshot("XX", 1400);

    assert!(!snapshot.ok);
    assert!(snapshot.language.is_none());
    assert!(snapshot.words.is_empty());
    assert!(matches!(
        snapshot.errors[0],
        CompileError::UnknownLanguage(_, _)
    ));
}

#[test]
fn test_compile_is_deterministic() {
    let source = format!("{BASE}\n@ 1350, ON\n- I /ek/\n@ 1500, ON\n$ k > ʃ\n");
    let resolver = MockResolver::default();

    let first = compile_module(&source, "test", &resolver);
    let second = compile_module(&source, "test", &resolver);

    assert_eq!(first, second);
}

#[test]
fn test_transcription_round_trip() {
    let module = fixture("@ 1350, ON\n- water /otʃe/\n- hand /tʃatʃ/");

    let inventory = module.matcher_inventory();
    for word in module.words.values() {
        let text = module.render_word(word);
        let matches = match_phonemes(&text, &inventory).expect("round trip failed");
        let phonemes: Vec<_> = matches.into_iter().map(|m| m.phoneme).collect();
        assert_eq!(phonemes, word.phonemes);
    }
}

#[test]
fn test_etymology_counts_only_changes_that_altered_the_word() {
    // The second rule has nothing left to match once the first has run.
    let module = fixture("@ 1350, ON\n- I /ek/\n@ 1500, ON\n$ k > ʃ\n$ d > t");
    let snapshot = module.snapshot("ON", 1600);

    let word = snapshot.word("I").unwrap();
    assert_eq!(word.etymology.len(), 1);
    assert_eq!(snapshot.sound_changes.len(), 2);
}
