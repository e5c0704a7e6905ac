//! Trickle: a streaming, incremental parser combinator library for Rust
//!
//! The goal of this library is to provide parser combinators that:
//!
//! * consume input one token at a time, with no materialised input slice,
//! * keep every alternative alive until the input decides between them,
//! * carry unconsumed lookahead tokens across combinator boundaries, and
//! * report one of *undecided*, *matched*, or *failed* on every step.
//!
//! A parser tree is assembled once, then driven by feeding tokens:
//!
//! ```
//! use trickle::{MatchResult, Parser, Quantifier};
//! use trickle::text::character;
//!
//! let mut letters = character('a', Quantifier::More, "letters");
//! assert!(letters.feed('a').is_undecided());
//! assert!(letters.feed('a').is_undecided());
//!
//! // A rejecting token decides the repetition and is carried as lookahead.
//! let mut output = letters.feed('b').into_output().unwrap();
//! assert_eq!(output.next_value(), Some(String::from("aa")));
//! assert_eq!(output.next_remaining(), Some('b'));
//! assert_eq!(output.next_remaining(), None);
//! ```
//!
//! Input can also end without a deciding token; [`Parser::finish`] tells the
//! parser no more tokens are coming:
//!
//! ```
//! use trickle::{Parser, Quantifier};
//! use trickle::text::character;
//!
//! let mut letters = character('a', Quantifier::More, "letters");
//! letters.feed('a');
//! let mut output = letters.finish().into_output().unwrap();
//! assert_eq!(output.next_value(), Some(String::from("a")));
//! assert_eq!(output.next_remaining(), None);
//! ```

use thiserror::Error;

pub mod impls;
pub mod text;

pub use crate::impls::{
    recursive, AggregatedOutput, Aggregator, Alternate, BufferedOutput, Definition, Lazy,
    ParseOutput, PredicateFactory, PredicateParser, Sequence, TakeTill,
};

// ----------- The parser contract ------------

/// A boxed parser node, the form combinators hold their children in.
pub type BoxedParser<S, T> = Box<dyn Parser<S, T>>;

/// A streaming parser over input tokens `S`, producing output values `T`.
///
/// Parsers are mutable state machines: each [`feed`](Parser::feed) advances
/// the parse by exactly one token, and [`finish`](Parser::finish) signals end
/// of input. A parser is in one of three phases: *fresh* (nothing fed since
/// the last reset), *in progress*, or *decided*. Once `feed` or `finish`
/// returns [`Matched`](MatchResult::Matched) or
/// [`Failed`](MatchResult::Failed) the parser has already reset itself, so
/// the caller sees it fresh again.
///
/// ```
/// use trickle::{Parser, Quantifier};
/// use trickle::text::character;
///
/// let mut digit = character('1', Quantifier::Once, "digit");
/// assert!(digit.feed('1').into_output().is_some());
/// // Decided and therefore fresh again; the same parse repeats.
/// assert!(digit.feed('1').into_output().is_some());
/// ```
pub trait Parser<S, T> {
    /// Deliver one token.
    fn feed(&mut self, token: S) -> MatchResult<S, T>;

    /// Signal end of input. Parsers that accept an empty or unbounded
    /// suffix commit here; parsers still short of their minimum fail.
    fn finish(&mut self) -> MatchResult<S, T>;

    /// Return to the fresh state, discarding all progress, buffers, and
    /// any stateful predicates (which are regenerated, not rewound).
    fn reset(&mut self);

    /// A deep structural copy in the fresh state, sharing no mutable
    /// state with `self`.
    fn clone_boxed(&self) -> BoxedParser<S, T>;

    /// The parser's name, as recorded in error traces.
    fn name(&self) -> &str;
}

impl<S: 'static, T: 'static> Clone for BoxedParser<S, T> {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

// ----------- Step results ------------

/// The outcome of feeding one token (or the end-of-input signal) to a parser.
#[derive(Debug)]
pub enum MatchResult<S, T> {
    /// The parser cannot decide yet; feed more input.
    Undecided,
    /// The parse succeeded; the output owns all produced values and any
    /// lookahead tokens the parser consumed but did not use.
    Matched(ParseOutput<S, T>),
    /// The parse failed.
    Failed(ParseError),
}

impl<S, T> MatchResult<S, T> {
    pub fn is_undecided(&self) -> bool {
        matches!(self, MatchResult::Undecided)
    }

    /// The output of a successful parse, if this step was one.
    pub fn into_output(self) -> Option<ParseOutput<S, T>> {
        match self {
            MatchResult::Matched(output) => Some(output),
            _ => None,
        }
    }

    /// The error of a failed parse, if this step was one.
    pub fn into_error(self) -> Option<ParseError> {
        match self {
            MatchResult::Failed(error) => Some(error),
            _ => None,
        }
    }
}

// ----------- Repetition policies ------------

/// How often a predicate parser's predicate must hold.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Quantifier {
    /// The token must *not* match; a matching token is an error. The parser
    /// succeeds on the first non-matching token, spilling it as remaining.
    None,
    /// Zero or one match.
    Optional,
    /// Exactly one match.
    Once,
    /// Exactly `n` matches. Meaningful for n ≥ 2; n = 1 behaves as [`Once`].
    ///
    /// [`Once`]: Quantifier::Once
    Exactly(usize),
    /// One or more matches.
    More,
    /// Zero or more matches.
    Any,
}

impl Quantifier {
    /// Whether `count` matches meet the minimum this policy requires.
    pub(crate) fn is_satisfied(self, count: usize) -> bool {
        match self {
            Quantifier::Once | Quantifier::More => count >= 1,
            Quantifier::Exactly(n) => count >= n,
            Quantifier::None | Quantifier::Optional | Quantifier::Any => true,
        }
    }

    /// Whether a parser that just reached `count` matches must emit now.
    pub(crate) fn is_complete(self, count: usize) -> bool {
        match self {
            Quantifier::Once | Quantifier::Optional => true,
            Quantifier::Exactly(n) => count >= n,
            Quantifier::None | Quantifier::More | Quantifier::Any => false,
        }
    }
}

// ----------- Errors ------------

/// The behavioural category of a parse failure.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ErrorKind {
    /// A `None`-quantified predicate saw the token it exists to reject.
    #[error("Unexpected {0}")]
    Unexpected(String),
    /// A predicate parser was decided with fewer matches than its
    /// quantifier's minimum.
    #[error("Insufficient tokens")]
    BelowMinimum,
    /// A combinator ran out of input while an inner parser was undecided.
    #[error("Insufficient Tokens")]
    Exhausted,
    /// A take-till parser reached end of input without its terminator
    /// matching.
    #[error("Insufficient Tokens: Not Terminated")]
    Unterminated,
}

/// A parse failure: a description plus the stack of parser names the error
/// passed through on its way out, innermost first.
///
/// ```
/// use trickle::{ErrorKind, ParseError};
///
/// let mut error = ParseError::new(ErrorKind::BelowMinimum, "digit");
/// error.record("item");
/// assert_eq!(error.to_string(), "Insufficient tokens\n  at digit\n  at item");
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("{}", render(.kind, .trace))]
pub struct ParseError {
    kind: ErrorKind,
    trace: Vec<String>,
}

impl ParseError {
    pub fn new(kind: ErrorKind, name: &str) -> Self {
        ParseError {
            kind,
            trace: vec![name.to_string()],
        }
    }

    /// Append the name of a combinator the error is propagating through.
    pub fn record(&mut self, name: &str) {
        self.trace.push(name.to_string());
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// The names recorded so far, innermost first.
    pub fn trace(&self) -> &[String] {
        &self.trace
    }
}

fn render(kind: &ErrorKind, trace: &[String]) -> String {
    let mut rendered = kind.to_string();
    for name in trace {
        rendered.push_str("\n  at ");
        rendered.push_str(name);
    }
    rendered
}
