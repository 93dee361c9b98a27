use std::sync::Arc;

use layered_clinical::{Assertion, Experiencer, Polarity, Span, Temporality, TokenAlignmentError, TokenIndex};

use super::support::{entities, sentence};
use crate::{assert_context, build_rule_table, ContextEngine, CueCategory, CueRuleDef, Direction, RuleTable};

fn assertions(text: &str, phrases: &[(&str, &str)], table: &RuleTable) -> Vec<Assertion> {
    let entities = entities(text, phrases);
    assert_context(text, &entities, &sentence(text), table)
        .annotated
        .into_iter()
        .map(|(_, assertion)| assertion)
        .collect()
}

#[test]
fn test_denies_negates_following_finding() {
    let text = "Patient denies chest pain.";
    let table = build_rule_table(vec![CueRuleDef::literal(
        "denies",
        CueCategory::Negation,
        Direction::Forward,
        5,
    )])
    .unwrap();

    let found = assertions(text, &[("chest pain", "sign_symptom")], &table);
    assert_eq!(found[0].polarity, Polarity::Negated);
    assert_eq!(found[0].experiencer, Experiencer::Patient);
}

#[test]
fn test_terminator_stops_family_cue() {
    let text = "No family history of diabetes but reports hypertension.";
    let table = build_rule_table(vec![
        CueRuleDef::literal("family history of", CueCategory::Family, Direction::Forward, 3),
        CueRuleDef::terminator("but"),
    ])
    .unwrap();

    let found = assertions(
        text,
        &[("diabetes", "disorder"), ("hypertension", "disorder")],
        &table,
    );
    assert_eq!(found[0].experiencer, Experiencer::Family);
    assert_eq!(found[1].experiencer, Experiencer::Patient);
}

#[test]
fn test_terminator_blocks_even_within_scope() {
    let text = "No family history of diabetes but reports hypertension.";
    let wide = |terminate: bool| {
        let mut defs = vec![CueRuleDef::literal(
            "family history of",
            CueCategory::Family,
            Direction::Forward,
            10,
        )];
        if terminate {
            defs.push(CueRuleDef::terminator("but"));
        }
        build_rule_table(defs).unwrap()
    };
    let phrases = [("diabetes", "disorder"), ("hypertension", "disorder")];

    let unblocked = assertions(text, &phrases, &wide(false));
    assert_eq!(unblocked[1].experiencer, Experiencer::Family);

    let blocked = assertions(text, &phrases, &wide(true));
    assert_eq!(blocked[1].experiencer, Experiencer::Patient);
}

#[test]
fn test_six_intervening_tokens_exceed_scope_of_five() {
    let text = "Patient denies ever having had any other recent cough.";
    let table = build_rule_table(vec![CueRuleDef::literal(
        "denies",
        CueCategory::Negation,
        Direction::Forward,
        5,
    )])
    .unwrap();

    let found = assertions(text, &[("cough", "sign_symptom")], &table);
    assert_eq!(found[0].polarity, Polarity::Positive);
}

#[test]
fn test_category_and_terminator_on_one_rule() {
    let text = "History of asthma no pneumonia.";
    let table = build_rule_table(vec![
        CueRuleDef::literal("history of", CueCategory::Historical, Direction::Forward, 10),
        CueRuleDef {
            terminator: true,
            ..CueRuleDef::literal("no", CueCategory::Negation, Direction::Forward, 10)
        },
    ])
    .unwrap();

    let found = assertions(text, &[("asthma", "disorder"), ("pneumonia", "disorder")], &table);
    assert_eq!(found[0].temporality, Temporality::Past);
    assert_eq!(found[0].polarity, Polarity::Positive);
    assert_eq!(found[1].temporality, Temporality::Present);
    assert_eq!(found[1].polarity, Polarity::Negated);
}

#[test]
fn test_clinical_defaults() {
    let table = RuleTable::clinical_defaults().unwrap();

    let found = assertions("Patient denies chest pain.", &[("chest pain", "sign_symptom")], &table);
    assert_eq!(found[0].polarity, Polarity::Negated);

    let found = assertions("Mother has diabetes.", &[("diabetes", "disorder")], &table);
    assert_eq!(found[0].experiencer, Experiencer::Family);

    let found = assertions("Fever was ruled out.", &[("Fever", "sign_symptom")], &table);
    assert_eq!(found[0].polarity, Polarity::Negated);

    let found = assertions("Possible pneumonia on imaging.", &[("pneumonia", "disorder")], &table);
    assert_eq!(found[0].to_string(), "Assertion(Uncertain)");

    let found = assertions("Return if chest pain recurs.", &[("chest pain", "sign_symptom")], &table);
    assert_eq!(found[0].temporality, Temporality::Future);

    let found = assertions("Patient reports cough.", &[("cough", "sign_symptom")], &table);
    assert!(found[0].is_default());
}

#[test]
fn test_output_follows_input_order_and_inputs_stay_untouched() {
    let text = "No family history of diabetes but reports hypertension.";
    let table = RuleTable::clinical_defaults().unwrap();
    let input = entities(text, &[("diabetes", "disorder"), ("hypertension", "disorder")]);

    let outcome = assert_context(text, &input, &sentence(text), &table);
    let spans: Vec<Span> = outcome.annotated.iter().map(|(e, _)| e.span).collect();
    assert_eq!(spans, vec![input[0].span, input[1].span]);
    assert!(input.iter().all(|e| e.assertion.is_none()));

    for (entity, assertion) in &outcome.annotated {
        assert_eq!(entity.assertion, Some(*assertion));
    }
}

#[test]
fn test_asserting_twice_gives_same_result() {
    let text = "Patient denies chest pain but reports cough.";
    let engine = ContextEngine::new(Arc::new(RuleTable::clinical_defaults().unwrap()));
    let input = entities(text, &[("chest pain", "sign_symptom"), ("cough", "sign_symptom")]);
    let tokens = sentence(text);

    let first = engine.assert_context(text, &input, &tokens);
    let second = engine.assert_context(text, &input, &tokens);
    assert_eq!(first, second);

    let reannotated: Vec<_> = first.annotated.iter().map(|(e, _)| e.clone()).collect();
    let third = engine.assert_context(text, &reannotated, &tokens);
    assert_eq!(first, third);
}

#[test]
fn test_misaligned_entity_keeps_default_assertion() {
    let text = "No fever. Denies cough.";
    let table = RuleTable::clinical_defaults().unwrap();
    let input = entities(text, &[("fever", "sign_symptom"), ("cough", "sign_symptom")]);
    let second_sentence = TokenIndex::new(
        Span::new(10, 23),
        vec![Span::new(10, 16), Span::new(17, 22), Span::new(22, 23)],
    )
    .unwrap();

    let outcome = assert_context(text, &input, &second_sentence, &table);

    assert!(outcome.annotated[0].1.is_default());
    assert_eq!(outcome.annotated[1].1.polarity, Polarity::Negated);
    assert_eq!(
        outcome.errors,
        vec![TokenAlignmentError::OutsideSentence {
            span: Span::new(3, 8),
            sentence: Span::new(10, 23),
        }]
    );
}

#[test]
fn test_shared_table_serves_many_engines() {
    let table = Arc::new(RuleTable::clinical_defaults().unwrap());
    let engines: Vec<ContextEngine> = (0..3).map(|_| ContextEngine::new(table.clone())).collect();

    let text = "Patient denies chest pain.";
    let input = entities(text, &[("chest pain", "sign_symptom")]);
    let handles: Vec<_> = engines
        .into_iter()
        .map(|engine| {
            let input = input.clone();
            std::thread::spawn(move || engine.assert_context(text, &input, &sentence(text)))
        })
        .collect();

    for handle in handles {
        let outcome = handle.join().unwrap();
        assert_eq!(outcome.annotated[0].1.polarity, Polarity::Negated);
    }
    assert_eq!(Arc::strong_count(&table), 1);
}
