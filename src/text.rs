//! Character-stream helpers: the `char` → `String` instantiation of the
//! engine that text grammars use.

use std::rc::Rc;

use crate::{Aggregator, MatchResult, Parser, PredicateParser, Quantifier};

/// The value pipeline for character input: each matched character becomes a
/// one-character string, runs concatenate, and error messages show the text
/// as is.
pub fn strings() -> Aggregator<char, String> {
    Aggregator::new(
        |c: &char| c.to_string(),
        |a: String, b: String| a + &b,
        |s: &String| s.clone(),
    )
}

/// A parser matching one fixed character under a quantifier.
pub fn character(expected: char, quantifier: Quantifier, name: &str) -> PredicateParser<char, String> {
    PredicateParser::matching(expected, quantifier, strings(), name)
}

/// A parser matching a fixed string, one character at a time.
///
/// This is a predicate parser whose predicate tracks how far into the
/// pattern it has matched, quantified to exactly the pattern length.
pub fn literal(pattern: &str, name: &str) -> PredicateParser<char, String> {
    assert!(!pattern.is_empty(), "a literal needs at least one character");
    let pattern: Rc<[char]> = pattern.chars().collect();
    let length = pattern.len();
    let factory = move || -> Box<dyn FnMut(&char) -> bool> {
        let pattern = Rc::clone(&pattern);
        let mut index = 0;
        Box::new(move |candidate: &char| {
            if index == pattern.len() {
                return true;
            }
            let expected = pattern[index];
            index += 1;
            expected == *candidate
        })
    };
    PredicateParser::new(factory, Quantifier::Exactly(length), strings(), name)
}

/// Feed every character of `input` in order and return the first decisive
/// step, or [`Undecided`](MatchResult::Undecided) if the parser is still
/// waiting after the whole string. A test and demo convenience.
pub fn feed_str<P>(parser: &mut P, input: &str) -> MatchResult<char, String>
where
    P: Parser<char, String> + ?Sized,
{
    for c in input.chars() {
        match parser.feed(c) {
            MatchResult::Undecided => continue,
            decided => return decided,
        }
    }
    MatchResult::Undecided
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_matches_its_pattern() {
        let mut parser = literal("abcd", "abcd");
        for c in "abc".chars() {
            assert!(parser.feed(c).is_undecided());
        }
        let mut output = parser.feed('d').into_output().expect("should match");
        assert_eq!(output.next_value(), Some(String::from("abcd")));
        assert_eq!(output.next_value(), None);
        assert_eq!(output.next_remaining(), None);
    }

    #[test]
    fn literal_rejects_a_divergent_character() {
        let mut parser = literal("abcd", "abcd");
        assert!(parser.feed('a').is_undecided());
        let error = parser.feed('x').into_error().expect("should fail");
        assert_eq!(error.to_string(), "Insufficient tokens\n  at abcd");
    }

    #[test]
    fn character_counts_its_run() {
        let mut parser = character('a', Quantifier::More, "letters");
        assert!(feed_str(&mut parser, "aaaa").is_undecided());
        let mut output = parser.feed('b').into_output().expect("should match");
        assert_eq!(output.next_value(), Some(String::from("aaaa")));
        assert_eq!(output.next_remaining(), Some('b'));
        assert_eq!(output.next_remaining(), None);
    }
}
