//! Property-based tests for the engine's behavioural invariants: clones
//! replay identical transcripts, a decided parser is indistinguishable from
//! a fresh one, and exhausted drains stay exhausted.

use proptest::prelude::*;

use trickle::text::{character, literal};
use trickle::{
    recursive, Alternate, BoxedParser, MatchResult, Parser, Quantifier, Sequence, TakeTill,
};

/// A step of a parse, flattened for comparison.
#[derive(Clone, Debug, Eq, PartialEq)]
enum Step {
    Pending,
    Matched {
        values: Vec<String>,
        remaining: Vec<char>,
    },
    Failed(String),
}

fn describe(step: MatchResult<char, String>) -> Step {
    match step {
        MatchResult::Undecided => Step::Pending,
        MatchResult::Matched(mut output) => Step::Matched {
            values: output.drain_values(),
            remaining: output.drain_remaining(),
        },
        MatchResult::Failed(error) => Step::Failed(error.to_string()),
    }
}

/// Feed the whole input then finish, recording every step. Decisive steps
/// leave the parser fresh, so feeding past them is well-defined.
fn transcript(parser: &mut dyn Parser<char, String>, input: &str) -> Vec<Step> {
    let mut steps: Vec<Step> = input.chars().map(|c| describe(parser.feed(c))).collect();
    steps.push(describe(parser.finish()));
    steps
}

/// A zoo of parser shapes covering every combinator.
fn grammars() -> Vec<BoxedParser<char, String>> {
    vec![
        Box::new(character('a', Quantifier::Any, "letters")),
        Box::new(character('b', Quantifier::Exactly(3), "triple")),
        Box::new(literal("ab/", "ab/")),
        Box::new(Sequence::new(
            "item",
            vec![
                Box::new(character('a', Quantifier::Optional, "head")),
                Box::new(character('b', Quantifier::More, "run")),
                Box::new(character('a', Quantifier::None, "tail")),
            ],
        )),
        Box::new(Alternate::new(
            "greedy",
            vec![
                Box::new(literal("ab", "short")),
                Box::new(literal("abab", "long")),
            ],
        )),
        Box::new(TakeTill::new(
            "until",
            Box::new(character('a', Quantifier::Exactly(2), "pair")),
            Box::new(literal("b", "stop")),
        )),
        recursive(|nested| {
            let wrapped = Sequence::new(
                "wrapped",
                vec![
                    Box::new(literal("(", "open")),
                    nested,
                    Box::new(literal(")", "close")),
                ],
            );
            Box::new(Alternate::new(
                "nested",
                vec![
                    Box::new(wrapped),
                    Box::new(character('a', Quantifier::More, "letters")),
                ],
            ))
        }),
    ]
}

proptest! {
    #[test]
    fn clones_replay_identical_transcripts(input in "[abcd/()]{0,12}") {
        for parser in grammars() {
            let mut original = parser;
            let mut duplicate = original.clone();
            prop_assert_eq!(
                transcript(original.as_mut(), &input),
                transcript(duplicate.as_mut(), &input)
            );
        }
    }

    #[test]
    fn a_decided_parser_replays_like_a_fresh_one(input in "[abcd/()]{0,12}") {
        for parser in grammars() {
            let mut reused = parser;
            let first = transcript(reused.as_mut(), &input);
            let second = transcript(reused.as_mut(), &input);
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn exhausted_drains_stay_empty(input in "[ab]{0,10}") {
        let mut parser = character('a', Quantifier::Any, "letters");
        let mut decided = None;
        for c in input.chars() {
            if let MatchResult::Matched(output) = parser.feed(c) {
                decided = Some(output);
                break;
            }
        }
        let mut output = match decided {
            Some(output) => output,
            None => parser.finish().into_output().unwrap(),
        };
        while output.next_value().is_some() {}
        while output.next_remaining().is_some() {}
        prop_assert!(output.next_value().is_none());
        prop_assert!(output.next_remaining().is_none());
    }

    #[test]
    fn any_quantifier_collects_the_leading_run(input in "[ab]{1,10}") {
        let mut parser = character('a', Quantifier::Any, "letters");
        let leading: String = input.chars().take_while(|c| *c == 'a').collect();
        let mut decided = None;
        for c in input.chars() {
            if let MatchResult::Matched(output) = parser.feed(c) {
                decided = Some(output);
                break;
            }
        }
        let mut output = match decided {
            Some(output) => output,
            None => parser.finish().into_output().unwrap(),
        };
        prop_assert_eq!(output.drain_values().concat(), leading);
        let spilled = output.drain_remaining();
        match input.chars().find(|c| *c != 'a') {
            Some(first_reject) => prop_assert_eq!(spilled, vec![first_reject]),
            None => prop_assert!(spilled.is_empty()),
        }
    }
}
