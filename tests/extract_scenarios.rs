use forecast_harness::extract::{
    binary_probability_or_sentinel, extract_percentiles, parse_binary_probability,
    parse_multiple_choice, PERCENTILE_KEYS,
};
use forecast_harness::{clean_line, parse_answer, ExtractError, Prediction, Question, QuestionType};

const BINARY_RESPONSE: &str = r#"Analysis:
(a) About 14 months remain until resolution.
(b) Status quo: the launch has not happened.
(c) No: funding slips again.
(d) Yes: the vehicle is already on the pad.

Probability calibration
My first instinct was Probability: 55% but the base rate is lower.

Checklist:
- status quo weighted: yes

**Probability: 38%**"#;

const NUMERIC_RESPONSE: &str = r#"Analysis:
Historical counts range from 40 to 90 per year.

Distribution:
Percentile 1: 20
Percentile 5: 31
• Percentile 10 – 38
Percentile 20: 45
Percentile 40: 55
Percentile 60: 62
I lean slightly higher on the tail.
Percentile 80: 71
Percentile 90: 1,020
Percentile 90: 80
Percentile 95: 88
Percentile 99: 104
Percentile 99.9: 140"#;

#[test]
fn binary_last_declared_probability_wins() {
    let p = parse_binary_probability(BINARY_RESPONSE).unwrap();
    assert!((p - 0.38).abs() < 1e-9);
}

#[test]
fn binary_conflicting_lines() {
    let p = parse_binary_probability("Probability: 20%\n...\nProbability: 80%").unwrap();
    assert!((p - 0.80).abs() < 1e-9);
}

#[test]
fn binary_without_probability_line_returns_sentinel() {
    assert_eq!(binary_probability_or_sentinel("I cannot say."), -1.0);
}

#[test]
fn multiple_choice_scenarios() {
    let v = parse_multiple_choice("Probabilities: [10, 20, 70]", Some(3)).unwrap();
    assert_eq!(v.len(), 3);
    for (got, want) in v.iter().zip([0.10, 0.20, 0.70]) {
        assert!((got - want).abs() < 1e-12);
    }
    assert!((v.iter().sum::<f64>() - 1.0).abs() < 1e-12);

    let err = parse_multiple_choice("Probabilities: [1,2]", Some(3)).unwrap_err();
    assert_eq!(
        err,
        ExtractError::LengthMismatch {
            expected: 3,
            actual: 2
        }
    );
}

#[test]
fn multiple_choice_outputs_are_always_on_the_simplex() {
    let inputs = [
        "Probabilities: [0, 0, 0]",
        "Probabilities: [100, 0, 0]",
        "Probabilities: [0.2, 0.2, 0.2]",
        "Probabilities: [33.3, 33.3, 33.3]",
        "Probabilities: [0.999, 0.0001, 0.5]",
        "Probabilities: [5, 0.5, 94.5]",
    ];
    for input in inputs {
        let v = parse_multiple_choice(input, Some(3)).unwrap();
        assert_eq!(v.len(), 3, "{input}");
        assert!(v.iter().all(|p| *p > 0.0 && *p < 1.0), "{input}: {v:?}");
        assert!((v.iter().sum::<f64>() - 1.0).abs() < 1e-12, "{input}: {v:?}");
    }
}

#[test]
fn percentile_basic_scenario() {
    let dist =
        extract_percentiles("Distribution:\nPercentile 10: 5\nPercentile 50: 20\nPercentile 90: 100")
            .unwrap();
    let entries: Vec<(u8, f64)> = dist.iter().collect();
    assert_eq!(entries, vec![(10, 5.0), (50, 20.0), (90, 100.0)]);
}

#[test]
fn percentile_bulleted_mixed_case_scenario() {
    let dist = extract_percentiles("Distribution:\n• Percentile 25 - 42.5").unwrap();
    assert_eq!(dist.iter().collect::<Vec<_>>(), vec![(25, 42.5)]);
}

#[test]
fn percentile_full_response() {
    let dist = extract_percentiles(NUMERIC_RESPONSE).unwrap();
    assert_eq!(dist.len(), 10);
    assert_eq!(dist.get(10), Some(38.0));
    assert_eq!(dist.get(90), Some(80.0));
    assert!(dist.is_monotonic());
    assert!(dist.keys().all(|k| PERCENTILE_KEYS.contains(&k)));
}

#[test]
fn normalizer_is_a_fixed_point() {
    for line in NUMERIC_RESPONSE.lines().chain(BINARY_RESPONSE.lines()) {
        let once = clean_line(line);
        assert_eq!(clean_line(&once), once);
    }
}

#[test]
fn dispatcher_selects_extractor_by_question_type() {
    let binary = Question::new(QuestionType::Binary);
    assert!(matches!(
        parse_answer(BINARY_RESPONSE, &binary),
        Ok(Prediction::Binary(_))
    ));

    let numeric = Question::new(QuestionType::Numeric);
    assert!(matches!(
        parse_answer(NUMERIC_RESPONSE, &numeric),
        Ok(Prediction::Percentiles(_))
    ));

    let mc = Question::multiple_choice("Which?", ["a", "b", "c"]);
    let err = parse_answer(NUMERIC_RESPONSE, &mc).unwrap_err();
    assert!(err.is_not_found());

    let err = parse_answer(BINARY_RESPONSE, &numeric).unwrap_err();
    assert!(err.is_not_found());
}
