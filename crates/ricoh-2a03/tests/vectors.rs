//! Hand-checked instruction vectors in the `SingleStepTests` JSON format.

mod common;

use common::TestCase;

const VECTORS: &str = include_str!("data/vectors.json");

#[test]
fn vectors_match() {
    let tests: Vec<TestCase> = serde_json::from_str(VECTORS).expect("vectors parse");
    assert!(!tests.is_empty());

    let failures: Vec<String> = tests
        .iter()
        .filter_map(|test| {
            let errors = common::run(test);
            (!errors.is_empty()).then(|| format!("  FAIL [{}]: {}", test.name, errors.join(", ")))
        })
        .collect();

    assert!(failures.is_empty(), "\n{}", failures.join("\n"));
}
