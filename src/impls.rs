//! Implementations of the parser contract: the parse outputs, the predicate
//! leaf, and the combinators.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::mem;
use std::rc::{Rc, Weak};

use crate::MatchResult::{Failed, Matched, Undecided};
use crate::{BoxedParser, ErrorKind, MatchResult, ParseError, Parser, Quantifier};

// ----------- Parse outputs ---------------

/// What a successful parse hands back: a finite stream of produced values
/// and a finite stream of unconsumed lookahead tokens.
///
/// Both streams drain destructively and independently. *Remaining* tokens
/// are tokens the parser received but did not logically use, either because
/// it over-read to decide a longest match or because a rejecting token
/// terminated a repetition; an enclosing combinator re-feeds them to
/// whatever parser comes next.
#[derive(Debug)]
pub enum ParseOutput<S, T> {
    /// At most one spill token and one value; what a predicate parser emits.
    Token { token: Option<S>, value: Option<T> },
    /// Raw tokens a combinator buffered but never routed to a child.
    Queue(VecDeque<S>),
    /// The layered outputs of a completed combinator.
    Aggregated(AggregatedOutput<S, T>),
    /// A winning branch's output plus the tokens that arrived after it
    /// committed.
    Buffered(BufferedOutput<S, T>),
}

impl<S, T> ParseOutput<S, T> {
    /// An output with nothing to drain.
    pub fn empty() -> Self {
        ParseOutput::Token {
            token: None,
            value: None,
        }
    }

    /// The next produced value, until the output is exhausted.
    pub fn next_value(&mut self) -> Option<T> {
        match self {
            ParseOutput::Token { value, .. } => value.take(),
            ParseOutput::Queue(_) => None,
            ParseOutput::Aggregated(aggregated) => aggregated.next_value(),
            ParseOutput::Buffered(buffered) => buffered.next_value(),
        }
    }

    /// The next unconsumed token, until the output is exhausted.
    pub fn next_remaining(&mut self) -> Option<S> {
        match self {
            ParseOutput::Token { token, .. } => token.take(),
            ParseOutput::Queue(tokens) => tokens.pop_front(),
            ParseOutput::Aggregated(aggregated) => aggregated.next_remaining(),
            ParseOutput::Buffered(buffered) => buffered.next_remaining(),
        }
    }

    /// Drain every produced value into a vector.
    pub fn drain_values(&mut self) -> Vec<T> {
        let mut values = Vec::new();
        while let Some(value) = self.next_value() {
            values.push(value);
        }
        values
    }

    /// Drain every unconsumed token into a vector.
    pub fn drain_remaining(&mut self) -> Vec<S> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_remaining() {
            tokens.push(token);
        }
        tokens
    }
}

/// The composite output of Sequence and TakeTill: a stack of prior inner
/// outputs, the final inner output, and a queue of values already drained
/// from the prior outputs.
///
/// Values come out in production order: the drained queue first, then the
/// final output. Remaining tokens come out newest-first: the final output,
/// then the stack from the top down. The newest spill is closest to the
/// unread input, so an outer consumer must see it first.
#[derive(Debug)]
pub struct AggregatedOutput<S, T> {
    layers: Vec<ParseOutput<S, T>>,
    last: Box<ParseOutput<S, T>>,
    values: VecDeque<T>,
}

impl<S, T> AggregatedOutput<S, T> {
    pub fn new(layers: Vec<ParseOutput<S, T>>, last: ParseOutput<S, T>, values: VecDeque<T>) -> Self {
        AggregatedOutput {
            layers,
            last: Box::new(last),
            values,
        }
    }

    fn next_value(&mut self) -> Option<T> {
        if let Some(value) = self.values.pop_front() {
            return Some(value);
        }
        self.last.next_value()
    }

    fn next_remaining(&mut self) -> Option<S> {
        if let Some(token) = self.last.next_remaining() {
            return Some(token);
        }
        while let Some(top) = self.layers.last_mut() {
            if let Some(token) = top.next_remaining() {
                return Some(token);
            }
            self.layers.pop();
        }
        None
    }
}

/// An inner output plus a waitlist of tokens fed after the producing branch
/// had already committed. Alternation wraps its winner in this so that
/// tokens spent deciding the other branches are preserved as lookahead.
#[derive(Debug)]
pub struct BufferedOutput<S, T> {
    inner: Box<ParseOutput<S, T>>,
    waitlist: VecDeque<S>,
}

impl<S, T> BufferedOutput<S, T> {
    pub fn new(inner: ParseOutput<S, T>) -> Self {
        BufferedOutput {
            inner: Box::new(inner),
            waitlist: VecDeque::new(),
        }
    }

    fn push(&mut self, token: S) {
        self.waitlist.push_back(token);
    }

    fn next_value(&mut self) -> Option<T> {
        self.inner.next_value()
    }

    fn next_remaining(&mut self) -> Option<S> {
        if let Some(token) = self.inner.next_remaining() {
            return Some(token);
        }
        self.waitlist.pop_front()
    }
}

/// Pull the next token out of a drive buffer: the top of the result stack
/// first, exhausted layers popped as they empty, the raw input queue last.
fn next_buffered<S, T>(layers: &mut Vec<ParseOutput<S, T>>, input: &mut VecDeque<S>) -> Option<S> {
    while let Some(top) = layers.last_mut() {
        if let Some(token) = top.next_remaining() {
            return Some(token);
        }
        layers.pop();
    }
    input.pop_front()
}

// ----------- Value aggregation ---------------

/// The value pipeline of a predicate parser: how a matched token becomes a
/// value, how consecutive values combine, and how a value prints inside an
/// error message. The fold must be associative.
pub struct Aggregator<S, T> {
    convert: Rc<dyn Fn(&S) -> T>,
    fold: Rc<dyn Fn(T, T) -> T>,
    render: Rc<dyn Fn(&T) -> String>,
}

impl<S, T> Aggregator<S, T> {
    pub fn new(
        convert: impl Fn(&S) -> T + 'static,
        fold: impl Fn(T, T) -> T + 'static,
        render: impl Fn(&T) -> String + 'static,
    ) -> Self {
        Aggregator {
            convert: Rc::new(convert),
            fold: Rc::new(fold),
            render: Rc::new(render),
        }
    }

    fn apply(&self, token: &S) -> T {
        (self.convert)(token)
    }

    fn combine(&self, accumulated: T, value: T) -> T {
        (self.fold)(accumulated, value)
    }

    fn display(&self, value: &T) -> String {
        (self.render)(value)
    }
}

impl<S, T> Clone for Aggregator<S, T> {
    fn clone(&self) -> Self {
        Aggregator {
            convert: Rc::clone(&self.convert),
            fold: Rc::clone(&self.fold),
            render: Rc::clone(&self.render),
        }
    }
}

// ----------- Predicate parsers ---------------

/// A factory producing fresh predicate closures. Predicates may carry
/// mutable state (a string matcher tracks its position), so resetting a
/// parser regenerates the predicate rather than rewinding it, and cloning
/// a parser captures the factory rather than the live closure.
pub type PredicateFactory<S> = Rc<dyn Fn() -> Box<dyn FnMut(&S) -> bool>>;

/// The leaf parser: matches a run of tokens against a stateful predicate
/// under a [`Quantifier`], folding matched tokens into a single value.
pub struct PredicateParser<S, T> {
    factory: PredicateFactory<S>,
    predicate: Box<dyn FnMut(&S) -> bool>,
    quantifier: Quantifier,
    count: usize,
    accumulated: Option<T>,
    values: Aggregator<S, T>,
    name: String,
}

impl<S, T> PredicateParser<S, T> {
    pub fn new(
        factory: impl Fn() -> Box<dyn FnMut(&S) -> bool> + 'static,
        quantifier: Quantifier,
        values: Aggregator<S, T>,
        name: &str,
    ) -> Self {
        let factory: PredicateFactory<S> = Rc::new(factory);
        let predicate = factory();
        PredicateParser {
            factory,
            predicate,
            quantifier,
            count: 0,
            accumulated: None,
            values,
            name: name.to_string(),
        }
    }

    /// A predicate parser matching one fixed token by equality.
    pub fn matching(token: S, quantifier: Quantifier, values: Aggregator<S, T>, name: &str) -> Self
    where
        S: Clone + PartialEq + 'static,
    {
        Self::new(
            move || {
                let expected = token.clone();
                Box::new(move |candidate: &S| *candidate == expected)
            },
            quantifier,
            values,
            name,
        )
    }
}

impl<S: 'static, T: 'static> PredicateParser<S, T> {
    fn fail(&mut self, kind: ErrorKind) -> MatchResult<S, T> {
        let error = ParseError::new(kind, &self.name);
        self.reset();
        Failed(error)
    }
}

impl<S: 'static, T: 'static> Parser<S, T> for PredicateParser<S, T> {
    fn feed(&mut self, token: S) -> MatchResult<S, T> {
        if (self.predicate)(&token) {
            let value = self.values.apply(&token);
            self.count += 1;
            if let Quantifier::None = self.quantifier {
                let shown = self.values.display(&value);
                return self.fail(ErrorKind::Unexpected(shown));
            }
            self.accumulated = Some(match self.accumulated.take() {
                Some(accumulated) => self.values.combine(accumulated, value),
                None => value,
            });
            if self.quantifier.is_complete(self.count) {
                let output = ParseOutput::Token {
                    token: None,
                    value: self.accumulated.take(),
                };
                self.reset();
                return Matched(output);
            }
            return Undecided;
        }
        if !self.quantifier.is_satisfied(self.count) {
            return self.fail(ErrorKind::BelowMinimum);
        }
        // The rejecting token is lookahead the next parser must see.
        let output = ParseOutput::Token {
            token: Some(token),
            value: self.accumulated.take(),
        };
        self.reset();
        Matched(output)
    }

    fn finish(&mut self) -> MatchResult<S, T> {
        if !self.quantifier.is_satisfied(self.count) {
            return self.fail(ErrorKind::BelowMinimum);
        }
        let output = ParseOutput::Token {
            token: None,
            value: self.accumulated.take(),
        };
        self.reset();
        Matched(output)
    }

    fn reset(&mut self) {
        self.count = 0;
        self.accumulated = None;
        self.predicate = (self.factory)();
    }

    fn clone_boxed(&self) -> BoxedParser<S, T> {
        Box::new(PredicateParser {
            factory: Rc::clone(&self.factory),
            predicate: (self.factory)(),
            quantifier: self.quantifier,
            count: 0,
            accumulated: None,
            values: self.values.clone(),
            name: self.name.clone(),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ----------- Alternation ---------------

/// The union of several parsers, all run in parallel on every token.
///
/// The greedy rule: within one dispatch, branches are fed in declaration
/// order, and the last branch to move from undecided to matched replaces
/// the current winner. A shorter match decides on an earlier token, so the
/// surviving winner is the longest match. Tokens that arrive after the
/// winner committed, while later branches are still deciding, are preserved
/// on the winner's waitlist and come back out as remaining.
pub struct Alternate<S, T> {
    branches: Vec<BoxedParser<S, T>>,
    completed: Vec<bool>,
    winner: Option<BufferedOutput<S, T>>,
    error: Option<ParseError>,
    name: String,
}

impl<S, T> Alternate<S, T> {
    pub fn new(name: &str, branches: Vec<BoxedParser<S, T>>) -> Self {
        let completed = vec![false; branches.len()];
        Alternate {
            branches,
            completed,
            winner: None,
            error: None,
            name: name.to_string(),
        }
    }
}

impl<S: Clone + 'static, T: 'static> Alternate<S, T> {
    fn settle(&mut self) -> MatchResult<S, T> {
        if let Some(winner) = self.winner.take() {
            self.reset();
            return Matched(ParseOutput::Buffered(winner));
        }
        if let Some(mut error) = self.error.take() {
            error.record(&format!("{} (alt)", self.name));
            self.reset();
            return Failed(error);
        }
        // No branch matched and none errored: nothing was ever fed.
        let error = ParseError::new(ErrorKind::Exhausted, &self.name);
        self.reset();
        Failed(error)
    }
}

impl<S: Clone + 'static, T: 'static> Parser<S, T> for Alternate<S, T> {
    fn feed(&mut self, token: S) -> MatchResult<S, T> {
        // A winner chosen on an earlier token must keep the tokens spent
        // deciding the remaining branches.
        if let Some(winner) = &mut self.winner {
            winner.push(token.clone());
        }
        let mut all_decided = true;
        for (branch, done) in self.branches.iter_mut().zip(self.completed.iter_mut()) {
            if *done {
                continue;
            }
            match branch.feed(token.clone()) {
                Undecided => all_decided = false,
                Matched(output) => {
                    *done = true;
                    self.winner = Some(BufferedOutput::new(output));
                }
                Failed(error) => {
                    *done = true;
                    self.error = Some(error);
                }
            }
        }
        if all_decided {
            self.settle()
        } else {
            Undecided
        }
    }

    fn finish(&mut self) -> MatchResult<S, T> {
        for (branch, done) in self.branches.iter_mut().zip(self.completed.iter_mut()) {
            if *done {
                continue;
            }
            match branch.finish() {
                // A branch with no opinion at end of input simply loses.
                Undecided => {}
                Matched(output) => {
                    *done = true;
                    self.winner = Some(BufferedOutput::new(output));
                }
                Failed(error) => {
                    *done = true;
                    self.error = Some(error);
                }
            }
        }
        self.settle()
    }

    fn reset(&mut self) {
        self.winner = None;
        self.error = None;
        for (branch, done) in self.branches.iter_mut().zip(self.completed.iter_mut()) {
            branch.reset();
            *done = false;
        }
    }

    fn clone_boxed(&self) -> BoxedParser<S, T> {
        Box::new(Alternate::new(&self.name, self.branches.clone()))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ----------- Sequencing ---------------

/// The concatenation of parsers, threading each parser's lookahead spill
/// into the next.
///
/// Tokens flow through a stack of completed inner outputs: the parser at
/// the cursor drains the most recent spill first, then older spills, then
/// the raw input queue at the bottom. An inner output pushed on the stack
/// can itself spill further, so no token is re-buffered at the sequence
/// level.
pub struct Sequence<S, T> {
    parsers: Vec<BoxedParser<S, T>>,
    index: usize,
    input: VecDeque<S>,
    layers: Vec<ParseOutput<S, T>>,
    values: VecDeque<T>,
    name: String,
}

impl<S, T> Sequence<S, T> {
    pub fn new(name: &str, parsers: Vec<BoxedParser<S, T>>) -> Self {
        assert!(!parsers.is_empty(), "a sequence needs at least one parser");
        Sequence {
            parsers,
            index: 0,
            input: VecDeque::new(),
            layers: Vec::new(),
            values: VecDeque::new(),
            name: name.to_string(),
        }
    }
}

impl<S: 'static, T: 'static> Sequence<S, T> {
    fn drive(&mut self, at_end: bool) -> MatchResult<S, T> {
        loop {
            let mut from_finish = false;
            let step = match next_buffered(&mut self.layers, &mut self.input) {
                Some(token) => self.parsers[self.index].feed(token),
                None if at_end => {
                    from_finish = true;
                    self.parsers[self.index].finish()
                }
                None => return Undecided,
            };
            match step {
                Undecided => {
                    if from_finish {
                        // End of input with the cursor parser still undecided.
                        let error = ParseError::new(ErrorKind::Exhausted, &self.name);
                        self.reset();
                        return Failed(error);
                    }
                }
                Failed(mut error) => {
                    error.record(&self.name);
                    self.reset();
                    return Failed(error);
                }
                Matched(mut output) => {
                    self.index += 1;
                    if self.index == self.parsers.len() {
                        let assembled = self.assemble(output);
                        self.reset();
                        return Matched(assembled);
                    }
                    while let Some(value) = output.next_value() {
                        self.values.push_back(value);
                    }
                    self.layers.push(output);
                }
            }
        }
    }

    fn assemble(&mut self, last: ParseOutput<S, T>) -> ParseOutput<S, T> {
        let mut stack = Vec::with_capacity(self.layers.len() + 1);
        // Unrouted raw input drains after every spill above it.
        stack.push(ParseOutput::Queue(mem::take(&mut self.input)));
        stack.append(&mut self.layers);
        ParseOutput::Aggregated(AggregatedOutput::new(
            stack,
            last,
            mem::take(&mut self.values),
        ))
    }
}

impl<S: 'static, T: 'static> Parser<S, T> for Sequence<S, T> {
    fn feed(&mut self, token: S) -> MatchResult<S, T> {
        self.input.push_back(token);
        self.drive(false)
    }

    fn finish(&mut self) -> MatchResult<S, T> {
        self.drive(true)
    }

    fn reset(&mut self) {
        for parser in &mut self.parsers {
            parser.reset();
        }
        self.index = 0;
        self.input.clear();
        self.layers.clear();
        self.values.clear();
    }

    fn clone_boxed(&self) -> BoxedParser<S, T> {
        Box::new(Sequence::new(&self.name, self.parsers.clone()))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ----------- Repeat-until ---------------

/// Repeat a body parser until a terminator parser matches, then emit every
/// value the body runs produced.
///
/// The terminator is matched independently of the body at every offset of a
/// sliding window: each incoming token opens a fresh terminator clone, and
/// the pool of live clones advances together. A clone that diverges is
/// evicted; the first to match wins and pins the boundary, so with an
/// ambiguous terminator the earliest offset and shortest match win. Tokens
/// the window cannot still need are released to the body in order. The
/// body's own lookahead spill is discarded at the boundary, and the
/// terminator's produced values are discarded too; only its remaining
/// tokens survive into the output.
pub struct TakeTill<S, T> {
    body: BoxedParser<S, T>,
    terminator: BoxedParser<S, T>,
    pool: VecDeque<(usize, BoxedParser<S, T>)>,
    window: VecDeque<S>,
    input: VecDeque<S>,
    layers: Vec<ParseOutput<S, T>>,
    values: VecDeque<T>,
    body_done: bool,
    name: String,
}

impl<S, T> TakeTill<S, T> {
    pub fn new(name: &str, body: BoxedParser<S, T>, terminator: BoxedParser<S, T>) -> Self {
        TakeTill {
            body,
            terminator,
            pool: VecDeque::new(),
            window: VecDeque::new(),
            input: VecDeque::new(),
            layers: Vec::new(),
            values: VecDeque::new(),
            body_done: true,
            name: name.to_string(),
        }
    }
}

impl<S: Clone + 'static, T: 'static> TakeTill<S, T> {
    /// Advance every live terminator clone by one step. Returns the winning
    /// output (if any) and the window span to keep back from the body.
    fn scan(&mut self, token: Option<&S>) -> (Option<ParseOutput<S, T>>, usize) {
        let mut winner = None;
        let mut keep = 0;
        let mut index = 0;
        while index < self.pool.len() {
            let step = {
                let (_, clone) = &mut self.pool[index];
                match token {
                    Some(token) => clone.feed(token.clone()),
                    None => clone.finish(),
                }
            };
            match step {
                Matched(output) => {
                    keep = self.pool[index].0 + 1;
                    winner = Some(output);
                    break;
                }
                Failed(_) => {
                    self.pool.remove(index);
                }
                Undecided => {
                    let entry = &mut self.pool[index];
                    entry.0 += 1;
                    keep = keep.max(entry.0);
                    index += 1;
                }
            }
        }
        (winner, keep)
    }

    /// Release every window token the terminator pool no longer needs to
    /// the body, driving the body through its own spill like a sequence.
    fn release(&mut self, keep: usize) -> Result<(), ParseError> {
        let surplus = self.window.len().saturating_sub(keep);
        for _ in 0..surplus {
            if let Some(token) = self.window.pop_front() {
                self.input.push_back(token);
            }
        }
        loop {
            let token = match next_buffered(&mut self.layers, &mut self.input) {
                Some(token) => token,
                None => return Ok(()),
            };
            match self.body.feed(token) {
                Undecided => self.body_done = false,
                Matched(output) => {
                    self.body_done = true;
                    self.absorb(output);
                }
                Failed(mut error) => {
                    error.record(&self.name);
                    self.reset();
                    return Err(error);
                }
            }
        }
    }

    fn absorb(&mut self, mut output: ParseOutput<S, T>) {
        while let Some(value) = output.next_value() {
            self.values.push_back(value);
        }
        self.layers.push(output);
    }

    /// A terminator matched: commit any half-done body run, discard the
    /// terminator's values, and assemble the final output.
    fn terminate(&mut self, mut winner: ParseOutput<S, T>) -> MatchResult<S, T> {
        if !self.body_done {
            match self.body.finish() {
                Undecided => {
                    let error = ParseError::new(ErrorKind::Exhausted, &self.name);
                    self.reset();
                    return Failed(error);
                }
                Failed(mut error) => {
                    error.record(&self.name);
                    self.reset();
                    return Failed(error);
                }
                Matched(output) => self.absorb(output),
            }
        }
        while winner.next_value().is_some() {}
        let assembled = ParseOutput::Aggregated(AggregatedOutput::new(
            Vec::new(),
            winner,
            mem::take(&mut self.values),
        ));
        self.reset();
        Matched(assembled)
    }
}

impl<S: Clone + 'static, T: 'static> Parser<S, T> for TakeTill<S, T> {
    fn feed(&mut self, token: S) -> MatchResult<S, T> {
        self.window.push_back(token.clone());
        // Every token opens a possible terminator start.
        self.pool.push_back((0, self.terminator.clone_boxed()));
        let (winner, keep) = self.scan(Some(&token));
        if let Err(error) = self.release(keep) {
            return Failed(error);
        }
        match winner {
            Some(winner) => self.terminate(winner),
            None => Undecided,
        }
    }

    fn finish(&mut self) -> MatchResult<S, T> {
        let (winner, keep) = self.scan(None);
        let winner = match winner {
            Some(winner) => winner,
            None => {
                let error = ParseError::new(ErrorKind::Unterminated, &self.name);
                self.reset();
                return Failed(error);
            }
        };
        if let Err(error) = self.release(keep) {
            return Failed(error);
        }
        self.terminate(winner)
    }

    fn reset(&mut self) {
        self.body.reset();
        self.pool.clear();
        self.window.clear();
        self.input.clear();
        self.layers.clear();
        self.values.clear();
        self.body_done = true;
    }

    fn clone_boxed(&self) -> BoxedParser<S, T> {
        Box::new(TakeTill::new(
            &self.name,
            self.body.clone_boxed(),
            self.terminator.clone_boxed(),
        ))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ----------- Deferred instantiation ---------------

/// The shared slot a [`Lazy`] parser resolves through. The slot holds a
/// template of the full parser; every `Lazy` targeting it clones the
/// template on first use.
pub type Definition<S, T> = Rc<RefCell<Option<BoxedParser<S, T>>>>;

/// A deferred parser: a weak handle to a [`Definition`] plus an instance
/// cloned from it on first use. Because the handle is non-owning, a parser
/// tree can refer back to an ancestor without creating an ownership cycle;
/// use [`recursive`] to tie the knot safely.
pub struct Lazy<S, T> {
    definition: Weak<RefCell<Option<BoxedParser<S, T>>>>,
    instance: Option<BoxedParser<S, T>>,
}

impl<S: 'static, T: 'static> Lazy<S, T> {
    pub fn new(definition: &Definition<S, T>) -> Self {
        Lazy {
            definition: Rc::downgrade(definition),
            instance: None,
        }
    }

    fn instance(&mut self) -> &mut BoxedParser<S, T> {
        let definition = &self.definition;
        self.instance.get_or_insert_with(|| {
            let slot = definition
                .upgrade()
                .expect("lazy parser used after its definition was dropped");
            let template = slot.borrow();
            template
                .as_ref()
                .expect("lazy parser used before its definition was installed")
                .clone_boxed()
        })
    }
}

impl<S: 'static, T: 'static> Parser<S, T> for Lazy<S, T> {
    fn feed(&mut self, token: S) -> MatchResult<S, T> {
        self.instance().feed(token)
    }

    fn finish(&mut self) -> MatchResult<S, T> {
        self.instance().finish()
    }

    fn reset(&mut self) {
        self.instance = None;
    }

    fn clone_boxed(&self) -> BoxedParser<S, T> {
        Box::new(Lazy {
            definition: self.definition.clone(),
            instance: None,
        })
    }

    fn name(&self) -> &str {
        match &self.instance {
            Some(parser) => parser.name(),
            None => "lazy",
        }
    }
}

/// The root returned by [`recursive`]: delegates to the built parser while
/// keeping the definition slot alive, so the weak handles inside the tree
/// stay valid for exactly as long as some root exists.
struct Anchor<S, T> {
    parser: BoxedParser<S, T>,
    definition: Definition<S, T>,
}

impl<S: 'static, T: 'static> Parser<S, T> for Anchor<S, T> {
    fn feed(&mut self, token: S) -> MatchResult<S, T> {
        self.parser.feed(token)
    }

    fn finish(&mut self) -> MatchResult<S, T> {
        self.parser.finish()
    }

    fn reset(&mut self) {
        self.parser.reset();
    }

    fn clone_boxed(&self) -> BoxedParser<S, T> {
        Box::new(Anchor {
            parser: self.parser.clone_boxed(),
            definition: Rc::clone(&self.definition),
        })
    }

    fn name(&self) -> &str {
        self.parser.name()
    }
}

/// Build a self-referential parser.
///
/// The closure receives a placeholder parser standing for the whole
/// definition and returns the definition built around it. Recursing through
/// the placeholder instantiates a fresh copy of the definition, so grammars
/// of unbounded nesting need only one node per active depth.
///
/// ```
/// use trickle::{recursive, Alternate, Parser, Quantifier, Sequence};
/// use trickle::text::{character, literal};
///
/// // nested ::= '(' nested ')' | 'a'+
/// let mut nested = recursive(|nested| {
///     let wrapped = Sequence::new(
///         "wrapped",
///         vec![
///             Box::new(literal("(", "open")),
///             nested,
///             Box::new(literal(")", "close")),
///         ],
///     );
///     Box::new(Alternate::new(
///         "nested",
///         vec![
///             Box::new(wrapped),
///             Box::new(character('a', Quantifier::More, "letters")),
///         ],
///     ))
/// });
/// for token in "((aa)".chars() {
///     assert!(nested.feed(token).is_undecided());
/// }
/// let mut output = nested.feed(')').into_output().unwrap();
/// assert_eq!(output.drain_values(), ["(", "(", "aa", ")", ")"]);
/// ```
pub fn recursive<S, T, F>(build: F) -> BoxedParser<S, T>
where
    S: 'static,
    T: 'static,
    F: FnOnce(BoxedParser<S, T>) -> BoxedParser<S, T>,
{
    let definition: Definition<S, T> = Rc::new(RefCell::new(None));
    let parser = build(Box::new(Lazy::new(&definition)));
    *definition.borrow_mut() = Some(parser.clone_boxed());
    Box::new(Anchor { parser, definition })
}
