use serde_json::json;

use branch_spec::{
    Answers, Condition, EvaluationError, Navigation, Operator, QuestionRegistry, QuestionSpec,
    QuestionType, Rule, RuleSet, SurveySpec, Traversal, TraversalState, evaluate_rules,
    next_step, walk,
};

fn fixture(name: &str) -> &'static str {
    match name {
        "branching_survey" => include_str!("../tests/fixtures/branching_survey.json"),
        _ => panic!("unknown fixture {}", name),
    }
}

/// A (single select) → B (short text) → C (single select); A="No" jumps to C.
fn abc() -> (QuestionRegistry, RuleSet) {
    let registry = QuestionRegistry::new(vec![
        QuestionSpec::new("A", QuestionType::SingleSelect).with_options(["Yes", "No"]),
        QuestionSpec::new("B", QuestionType::TextQuestionShort),
        QuestionSpec::new("C", QuestionType::SingleSelect).with_options(["Left", "Right"]),
    ])
    .unwrap();
    let mut rules = RuleSet::new();
    rules.push(
        "A",
        Rule::new(
            "r1",
            vec![Condition::new("c1", "A", "No", Operator::And)],
            "C",
        ),
    );
    (registry, rules)
}

fn jump(id: &str) -> Navigation {
    Navigation::Jump {
        question_id: id.into(),
    }
}

fn next(id: &str) -> Navigation {
    Navigation::Next {
        question_id: id.into(),
    }
}

#[test]
fn answering_no_jumps_over_b() {
    let (registry, rules) = abc();
    let answers = Answers::new().with("A", ["No"]);
    assert_eq!(next_step(&registry, &rules, "A", &answers).unwrap(), jump("C"));
}

#[test]
fn answering_yes_continues_to_b() {
    let (registry, rules) = abc();
    let answers = Answers::new().with("A", ["Yes"]);
    assert_eq!(next_step(&registry, &rules, "A", &answers).unwrap(), next("B"));
}

#[test]
fn deleted_target_is_dangling_and_falls_back() {
    let (registry, rules) = abc();
    let registry = registry.without("C");
    let answers = Answers::new().with("A", ["No"]);

    assert_eq!(
        evaluate_rules(&registry, &rules, "A", &answers),
        Err(EvaluationError::DanglingTarget {
            rule_id: "r1".into(),
            target: "C".into()
        })
    );
    assert_eq!(next_step(&registry, &rules, "A", &answers).unwrap(), next("B"));
}

#[test]
fn last_question_ends_the_form() {
    let (registry, rules) = abc();
    let answers = Answers::new();
    assert_eq!(
        next_step(&registry, &rules, "C", &answers).unwrap(),
        Navigation::End
    );
}

#[test]
fn unknown_current_question_is_an_error() {
    let (registry, rules) = abc();
    assert_eq!(
        next_step(&registry, &rules, "Z", &Answers::new()),
        Err(EvaluationError::UnknownQuestion("Z".into()))
    );
}

#[test]
fn first_matching_rule_wins() {
    let registry = QuestionRegistry::new(vec![
        QuestionSpec::new("q", QuestionType::MultiSelect).with_options(["a", "b"]),
        QuestionSpec::new("x", QuestionType::Number),
        QuestionSpec::new("y", QuestionType::Number),
        QuestionSpec::new("z", QuestionType::Number),
    ])
    .unwrap();
    let mut rules = RuleSet::new();
    rules.push(
        "q",
        Rule::new("r1", vec![Condition::new("c", "q", "a", Operator::And)], "y"),
    );
    rules.push(
        "q",
        Rule::new("r2", vec![Condition::new("c", "q", "b", Operator::And)], "z"),
    );
    let both = Answers::new().with("q", ["a", "b"]);
    assert_eq!(next_step(&registry, &rules, "q", &both).unwrap(), jump("y"));

    let only_b = Answers::new().with("q", ["b"]);
    assert_eq!(next_step(&registry, &rules, "q", &only_b).unwrap(), jump("z"));
}

#[test]
fn unanswered_later_source_does_not_fire() {
    let registry = QuestionRegistry::new(vec![
        QuestionSpec::new("first", QuestionType::Dropdown).with_options(["1", "2"]),
        QuestionSpec::new("middle", QuestionType::Date),
        QuestionSpec::new("later", QuestionType::Dropdown).with_options(["go"]),
    ])
    .unwrap();
    let mut rules = RuleSet::new();
    rules.push(
        "first",
        Rule::new(
            "r1",
            vec![Condition::new("c", "later", "go", Operator::And)],
            "later",
        ),
    );
    let answers = Answers::new().with("first", ["1"]);
    assert_eq!(
        next_step(&registry, &rules, "first", &answers).unwrap(),
        next("middle")
    );
}

#[test]
fn mixed_chain_is_folded_left_to_right() {
    let registry = QuestionRegistry::new(vec![
        QuestionSpec::new("q", QuestionType::MultiSelect).with_options(["p", "q", "r"]),
        QuestionSpec::new("skipped", QuestionType::Statement),
        QuestionSpec::new("target", QuestionType::Statement),
    ])
    .unwrap();
    // p=true, q=true, r=false
    let answers = Answers::new().with("q", ["p", "q"]);

    let chain = |second: Operator, third: Operator| {
        let mut rules = RuleSet::new();
        rules.push(
            "q",
            Rule::new(
                "r",
                vec![
                    Condition::new("c0", "q", "p", Operator::And),
                    Condition::new("c1", "q", "q", second),
                    Condition::new("c2", "q", "r", third),
                ],
                "target",
            ),
        );
        rules
    };

    // (true AND true) OR false = true
    let and_or = chain(Operator::And, Operator::Or);
    assert_eq!(
        next_step(&registry, &and_or, "q", &answers).unwrap(),
        jump("target")
    );
    // (true OR true) AND false = false
    let or_and = chain(Operator::Or, Operator::And);
    assert_eq!(
        next_step(&registry, &or_and, "q", &answers).unwrap(),
        next("skipped")
    );
}

#[test]
fn backward_target_is_ignored() {
    let (registry, _) = abc();
    let mut rules = RuleSet::new();
    rules.push(
        "B",
        Rule::new(
            "back",
            vec![Condition::new("c1", "A", "No", Operator::And)],
            "A",
        ),
    );
    let answers = Answers::new().with("A", ["No"]);
    assert!(matches!(
        evaluate_rules(&registry, &rules, "B", &answers),
        Err(EvaluationError::BackwardTarget { .. })
    ));
    assert_eq!(next_step(&registry, &rules, "B", &answers).unwrap(), next("C"));
}

#[test]
fn evaluation_is_repeatable() {
    let (registry, rules) = abc();
    let answers = Answers::new().with("A", ["No"]);
    let first = next_step(&registry, &rules, "A", &answers).unwrap();
    for _ in 0..5 {
        assert_eq!(next_step(&registry, &rules, "A", &answers).unwrap(), first);
    }
}

#[test]
fn traversal_moves_forward_until_end() {
    let (registry, rules) = abc();
    let mut traversal = Traversal::start(&registry, &rules);
    assert_eq!(traversal.current(), Some("A"));

    let answers = Answers::new().with("A", ["No"]);
    traversal.advance(&answers).unwrap();
    assert_eq!(traversal.current(), Some("C"));
    assert_eq!(traversal.advance(&answers).unwrap(), &TraversalState::AtEnd);
    assert!(traversal.is_finished());
    // Advancing past the end stays at the end.
    assert_eq!(traversal.advance(&answers).unwrap(), &TraversalState::AtEnd);
}

/// A → B → G (group header) → C; A="No" jumps to the header.
fn jump_into_group(tail: &[QuestionSpec]) -> (QuestionRegistry, RuleSet) {
    let mut questions = vec![
        QuestionSpec::new("A", QuestionType::SingleSelect).with_options(["Yes", "No"]),
        QuestionSpec::new("B", QuestionType::TextQuestionShort),
        QuestionSpec::new("G", QuestionType::QuestionGroup),
    ];
    questions.extend_from_slice(tail);
    let registry = QuestionRegistry::new(questions).unwrap();
    let mut rules = RuleSet::new();
    rules.push(
        "A",
        Rule::new(
            "to-group",
            vec![Condition::new("c1", "A", "No", Operator::And)],
            "G",
        ),
    );
    (registry, rules)
}

#[test]
fn jump_to_group_header_lands_on_its_first_question() {
    let (registry, rules) = jump_into_group(&[QuestionSpec::new("C", QuestionType::Statement)]);
    let answers = Answers::new().with("A", ["No"]);

    assert_eq!(next_step(&registry, &rules, "A", &answers).unwrap(), jump("G"));

    let mut traversal = Traversal::start(&registry, &rules);
    traversal.advance(&answers).unwrap();
    assert_eq!(
        traversal.state(),
        &TraversalState::AtQuestion {
            question_id: "C".into()
        }
    );
    assert_eq!(walk(&registry, &rules, &answers).unwrap(), vec!["A", "C"]);
}

#[test]
fn jump_to_trailing_group_header_ends_the_form() {
    let (registry, rules) = jump_into_group(&[]);
    let answers = Answers::new().with("A", ["No"]);

    let mut traversal = Traversal::start(&registry, &rules);
    assert_eq!(traversal.advance(&answers).unwrap(), &TraversalState::AtEnd);
    assert_eq!(walk(&registry, &rules, &answers).unwrap(), vec!["A"]);
}

#[test]
fn walk_follows_fixture_rules() {
    let survey: SurveySpec =
        serde_json::from_str(fixture("branching_survey")).expect("deserialize");

    let raw = json!({ "visited": "No", "channels": ["Friend"], "favorite": "Mug" });
    let answers = Answers::from_json(&survey.questions, &raw).unwrap();
    assert_eq!(
        walk(&survey.questions, &survey.rules, &answers).unwrap(),
        vec!["visited", "channels", "score", "closing"]
    );

    let raw = json!({ "visited": "Yes", "channels": ["Radio"] });
    let answers = Answers::from_json(&survey.questions, &raw).unwrap();
    assert_eq!(
        walk(&survey.questions, &survey.rules, &answers).unwrap(),
        vec![
            "visited",
            "visit_notes",
            "channels",
            "favorite",
            "score",
            "closing"
        ]
    );
}

#[test]
fn empty_registry_walk_is_empty() {
    let registry = QuestionRegistry::default();
    let rules = RuleSet::new();
    assert!(walk(&registry, &rules, &Answers::new()).unwrap().is_empty());
}

#[test]
fn navigation_serializes_with_kind_tag() {
    let value = serde_json::to_value(jump("C")).unwrap();
    assert_eq!(value, json!({ "kind": "jump", "question_id": "C" }));
    assert_eq!(
        serde_json::to_value(Navigation::End).unwrap(),
        json!({ "kind": "end" })
    );
}
