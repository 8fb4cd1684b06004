//! Property-Based Tests for the sanitizer front end
//!
//! These tests verify:
//! - Problem name round-trips (to_string -> parse)
//! - Allow-list validation accepts exactly the known names
//! - Output pair derivation and overwrite-answer parsing

use proptest::prelude::*;
use std::collections::BTreeSet;
use std::path::Path;

use sanitizer::output::{CHECK_SUFFIX, STRUCTURE_SUFFIX};
use sanitizer::{OutputPlan, OverwriteAnswer, Problem, SanitizerError, SolvableProblems};

// =============================================================================
// Problem Enum Property Tests
// =============================================================================

/// Strategy for generating valid Problem variants
fn problem_strategy() -> impl Strategy<Value = Problem> {
    prop_oneof![
        Just(Problem::LowercasedFile),
        Just(Problem::MissingEqualsSign),
        Just(Problem::OrphanMFile),
        Just(Problem::UppercasedFile),
    ]
}

/// Strategy for strings that are not problem names
fn unknown_name_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z]{1,20}".prop_filter("must not be a problem name", |s| s.parse::<Problem>().is_err())
}

proptest! {
    /// Problem: to_string -> parse round-trip is identity
    #[test]
    fn problem_roundtrip(problem in problem_strategy()) {
        let parsed: Problem = problem.to_string().parse().expect("Should parse");
        prop_assert_eq!(problem, parsed);
    }

    /// Validation collapses duplicates into the set of named kinds
    #[test]
    fn validate_accepts_known_names(problems in prop::collection::vec(problem_strategy(), 0..12)) {
        let names: Vec<String> = problems.iter().map(|p| p.to_string()).collect();
        let set = SolvableProblems::all().validate(&names).expect("known names are valid");
        let expected: BTreeSet<Problem> = problems.into_iter().collect();
        prop_assert_eq!(set, expected);
    }

    /// Any unknown name is reported alone, whatever valid names surround it
    #[test]
    fn validate_reports_exactly_unknown_names(
        known in prop::collection::vec(problem_strategy(), 0..6),
        unknown in unknown_name_strategy(),
    ) {
        let mut names: Vec<String> = known.iter().map(|p| p.to_string()).collect();
        names.push(unknown.clone());
        match SolvableProblems::all().validate(&names) {
            Err(SanitizerError::UnknownProblem(values)) => prop_assert_eq!(values, vec![unknown]),
            other => prop_assert!(false, "expected UnknownProblem, got {:?}", other),
        }
    }

    /// Both output paths share the prefix and differ only by suffix
    #[test]
    fn output_pair_shares_prefix(prefix in "[a-zA-Z0-9_./-]{1,40}") {
        let plan = OutputPlan::from_prefix(Path::new(&prefix)).expect("non-empty prefix is valid");
        prop_assert_eq!(
            plan.structure.to_str().unwrap(),
            format!("{prefix}{STRUCTURE_SUFFIX}")
        );
        prop_assert_eq!(plan.check.to_str().unwrap(), format!("{prefix}{CHECK_SUFFIX}"));
        prop_assert_ne!(plan.structure, plan.check);
    }

    /// Only empty, y, Y, n and N are answers; everything else re-prompts
    #[test]
    fn overwrite_answer_grammar(line in ".{0,4}") {
        let answer = OverwriteAnswer::parse(&line);
        match line.as_str() {
            "" | "y" | "Y" => prop_assert_eq!(answer, Some(OverwriteAnswer::Accepted)),
            "n" | "N" => prop_assert_eq!(answer, Some(OverwriteAnswer::Declined)),
            _ => prop_assert_eq!(answer, None),
        }
    }
}
