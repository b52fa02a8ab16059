use crate::ast::{Quantifier, RegexNode};
use crate::error::MatchError;

/// Budget for a single search. Both limits are off by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchOptions {
    /// Maximum number of instructions executed, `None` for no limit.
    pub step_limit: Option<u64>,
    /// Maximum number of pending backtrack entries, `None` for no limit.
    pub depth_limit: Option<usize>,
}

impl MatchOptions {
    /// No step limit and no depth limit.
    pub fn unlimited() -> Self {
        MatchOptions::default()
    }

    pub fn step_limit(mut self, limit: u64) -> Self {
        self.step_limit = Some(limit);
        self
    }

    pub fn depth_limit(mut self, limit: Option<usize>) -> Self {
        self.depth_limit = limit;
        self
    }
}

/// A run of characters in the input, in char offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub len: usize,
}

impl Span {
    fn between(start: usize, end: usize) -> Self {
        Span {
            start,
            len: end - start,
        }
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Record of how a successful match went, shaped like the AST it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchTrace {
    /// A literal, dot or class consumed one character.
    Char(Span),
    Group {
        span: Span,
        body: Box<MatchTrace>,
    },
    /// One repetition per element of the sequence.
    Seq {
        span: Span,
        items: Vec<Repetition>,
    },
    Alt {
        branch: usize,
        body: Box<MatchTrace>,
    },
}

impl MatchTrace {
    pub fn span(&self) -> Span {
        match self {
            MatchTrace::Char(span)
            | MatchTrace::Group { span, .. }
            | MatchTrace::Seq { span, .. } => *span,
            MatchTrace::Alt { body, .. } => body.span(),
        }
    }
}

/// The iterations a quantified element went through, in order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Repetition {
    pub span: Span,
    pub iterations: Vec<MatchTrace>,
}

/// Runs `ast` against `text`, anchored at offset 0.
///
/// Compiles a throwaway [`Program`]; callers that match repeatedly should
/// keep the program instead.
pub fn run(
    ast: &RegexNode,
    text: &[char],
    options: &MatchOptions,
) -> Result<Option<MatchTrace>, MatchError> {
    Program::compile(ast.clone()).run(text, options)
}

/// One step of a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Inst {
    /// Consume one character accepted by a `Literal`, `Dot` or
    /// `CharClass` leaf.
    Char(RegexNode),
    /// Enter the first branch, leaving the others as backtrack entries.
    Alt(Vec<usize>),
    Jump(usize),
    /// Reset the iteration counter of a quantified element.
    RepeatStart(usize),
    /// Decide between one more iteration (the body follows) and `exit`.
    RepeatLoop {
        slot: usize,
        quantifier: Quantifier,
        exit: usize,
    },
    /// End of an iteration body; `head` is the matching `RepeatLoop`.
    RepeatNext { slot: usize, head: usize },
    Match,
}

/// A pattern flattened into instructions for the backtracking machine.
///
/// Each element of a sequence, quantified or not, runs through a
/// `RepeatStart`/`RepeatLoop`/`RepeatNext` loop so that every iteration
/// shows up in the trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    ast: RegexNode,
    insts: Vec<Inst>,
    slots: usize,
}

impl Program {
    pub fn compile(ast: RegexNode) -> Self {
        let mut program = Program {
            ast,
            insts: Vec::new(),
            slots: 0,
        };
        let ast = program.ast.clone();
        program.emit(&ast);
        program.insts.push(Inst::Match);
        program
    }

    pub fn ast(&self) -> &RegexNode {
        &self.ast
    }

    fn push(&mut self, inst: Inst) -> usize {
        self.insts.push(inst);
        self.insts.len() - 1
    }

    fn emit(&mut self, node: &RegexNode) {
        match node {
            RegexNode::Seq(items) => {
                for (item, quantifier) in items {
                    let slot = self.slots;
                    self.slots += 1;
                    self.push(Inst::RepeatStart(slot));
                    let head = self.push(Inst::RepeatLoop {
                        slot,
                        quantifier: *quantifier,
                        exit: 0,
                    });
                    self.emit(item);
                    self.push(Inst::RepeatNext { slot, head });
                    let end = self.insts.len();
                    if let Inst::RepeatLoop { exit, .. } = &mut self.insts[head] {
                        *exit = end;
                    }
                }
            }
            RegexNode::Alt(branches) => {
                let alt = self.push(Inst::Alt(Vec::new()));
                let mut starts = Vec::with_capacity(branches.len());
                let mut jumps = Vec::with_capacity(branches.len());
                for branch in branches {
                    starts.push(self.insts.len());
                    self.emit(branch);
                    jumps.push(self.push(Inst::Jump(0)));
                }
                let end = self.insts.len();
                for jump in jumps {
                    self.insts[jump] = Inst::Jump(end);
                }
                self.insts[alt] = Inst::Alt(starts);
            }
            RegexNode::Group { node, .. } => self.emit(node),
            leaf => {
                self.push(Inst::Char(leaf.clone()));
            }
        }
    }

    /// Runs the program against `text`, anchored at offset 0.
    ///
    /// Returns `Ok(None)` when there is no match; an error only when the
    /// search ran out of budget first. Native stack use depends on the
    /// nesting of the pattern, never on the length of `text`.
    pub fn run(&self, text: &[char], options: &MatchOptions) -> Result<Option<MatchTrace>, MatchError> {
        let mut search = Search {
            program: self,
            text,
            choices: Vec::new(),
            stack: Vec::new(),
            counters: vec![Counter::default(); self.slots],
            steps: 0,
            options: *options,
        };
        let Some(matched_end) = search.run()? else {
            return Ok(None);
        };

        let mut replay = Replay {
            choices: search.choices.iter(),
        };
        let trace = replay.node(&self.ast, 0);
        debug_assert_eq!(trace.span().end(), matched_end);
        debug_assert!(replay.choices.next().is_none());
        Ok(Some(trace))
    }
}

/// A decision taken during the search. Only the decisions on the path
/// that finally succeeded remain in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Branch(usize),
    Iterate,
    Stop,
}

/// Iteration state of one quantified element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Counter {
    count: u32,
    /// Where the current iteration started.
    start: usize,
}

/// Backtrack stack entry.
#[derive(Debug, Clone, Copy)]
enum StackEntry {
    /// Try `branch` of the `Alt` at `pc`.
    Branch {
        pc: usize,
        branch: usize,
        pos: usize,
        log_len: usize,
    },
    /// Stop repeating and continue at `exit`.
    Stop {
        exit: usize,
        pos: usize,
        log_len: usize,
    },
    /// Undo a counter update.
    Restore { slot: usize, counter: Counter },
}

struct Search<'p, 't> {
    program: &'p Program,
    text: &'t [char],
    choices: Vec<Choice>,
    stack: Vec<StackEntry>,
    counters: Vec<Counter>,
    steps: u64,
    options: MatchOptions,
}

impl Search<'_, '_> {
    fn check_limits(&mut self) -> Result<(), MatchError> {
        self.steps += 1;
        if let Some(limit) = self.options.step_limit {
            if self.steps > limit {
                return Err(MatchError::StepLimitExceeded { limit });
            }
        }
        if let Some(limit) = self.options.depth_limit {
            if self.stack.len() > limit {
                return Err(MatchError::DepthLimitExceeded { limit });
            }
        }
        Ok(())
    }

    /// Main dispatch loop. Returns the end offset of the match.
    fn run(&mut self) -> Result<Option<usize>, MatchError> {
        let program = self.program;
        let text = self.text;
        let (mut pc, mut pos) = (0, 0);
        loop {
            self.check_limits()?;
            let next = match &program.insts[pc] {
                Inst::Char(leaf) => match text.get(pos) {
                    Some(&c) if leaf.accepts(c) => Some((pc + 1, pos + 1)),
                    _ => None,
                },
                Inst::Alt(starts) => Some(self.enter_branch(pc, starts, 0, pos)),
                Inst::Jump(target) => Some((*target, pos)),
                Inst::RepeatStart(slot) => {
                    self.set_counter(*slot, Counter { count: 0, start: pos });
                    Some((pc + 1, pos))
                }
                Inst::RepeatLoop {
                    slot,
                    quantifier,
                    exit,
                } => {
                    let count = self.counters[*slot].count;
                    if quantifier.allows_more(count) {
                        // Greedy: the shorter alternative waits on the stack.
                        if count >= quantifier.min {
                            self.stack.push(StackEntry::Stop {
                                exit: *exit,
                                pos,
                                log_len: self.choices.len(),
                            });
                        }
                        self.choices.push(Choice::Iterate);
                        Some((pc + 1, pos))
                    } else if count >= quantifier.min {
                        self.choices.push(Choice::Stop);
                        Some((*exit, pos))
                    } else {
                        None
                    }
                }
                Inst::RepeatNext { slot, head } => {
                    let Inst::RepeatLoop {
                        quantifier, exit, ..
                    } = &program.insts[*head]
                    else {
                        unreachable!("RepeatNext at {pc} does not point at a loop head");
                    };
                    let Counter { count, start } = self.counters[*slot];
                    let count = count + 1;
                    self.set_counter(*slot, Counter { count, start: pos });
                    if pos == start && count >= quantifier.min {
                        // An empty iteration would repeat forever.
                        self.choices.push(Choice::Stop);
                        Some((*exit, pos))
                    } else {
                        Some((*head, pos))
                    }
                }
                Inst::Match => return Ok(Some(pos)),
            };
            match next.or_else(|| self.backtrack()) {
                Some((next_pc, next_pos)) => (pc, pos) = (next_pc, next_pos),
                None => return Ok(None),
            }
        }
    }

    /// Logs `branch` of the `Alt` at `pc` and leaves the next branch, if
    /// any, on the stack.
    fn enter_branch(&mut self, pc: usize, starts: &[usize], branch: usize, pos: usize) -> (usize, usize) {
        if branch + 1 < starts.len() {
            self.stack.push(StackEntry::Branch {
                pc,
                branch: branch + 1,
                pos,
                log_len: self.choices.len(),
            });
        }
        self.choices.push(Choice::Branch(branch));
        (starts[branch], pos)
    }

    fn set_counter(&mut self, slot: usize, counter: Counter) {
        self.stack.push(StackEntry::Restore {
            slot,
            counter: self.counters[slot],
        });
        self.counters[slot] = counter;
    }

    /// Pops the stack up to the most recent choice point and resumes it.
    fn backtrack(&mut self) -> Option<(usize, usize)> {
        let program = self.program;
        while let Some(entry) = self.stack.pop() {
            match entry {
                StackEntry::Restore { slot, counter } => self.counters[slot] = counter,
                StackEntry::Branch {
                    pc,
                    branch,
                    pos,
                    log_len,
                } => {
                    self.choices.truncate(log_len);
                    let Inst::Alt(starts) = &program.insts[pc] else {
                        unreachable!("branch entry for {pc} does not point at an alternation");
                    };
                    return Some(self.enter_branch(pc, starts, branch, pos));
                }
                StackEntry::Stop { exit, pos, log_len } => {
                    self.choices.truncate(log_len);
                    self.choices.push(Choice::Stop);
                    return Some((exit, pos));
                }
            }
        }
        None
    }
}

/// Rebuilds the trace by walking the AST again and reading the choices
/// the search left behind, in the order it made them.
struct Replay<'c> {
    choices: std::slice::Iter<'c, Choice>,
}

impl Replay<'_> {
    fn node(&mut self, node: &RegexNode, pos: usize) -> MatchTrace {
        match node {
            RegexNode::Seq(items) => {
                let mut end = pos;
                let mut repetitions = Vec::with_capacity(items.len());
                for (item, _) in items {
                    let repetition = self.repetition(item, end);
                    end = repetition.span.end();
                    repetitions.push(repetition);
                }
                MatchTrace::Seq {
                    span: Span::between(pos, end),
                    items: repetitions,
                }
            }
            RegexNode::Alt(branches) => {
                let Some(&Choice::Branch(branch)) = self.choices.next() else {
                    unreachable!("alternation without a recorded branch");
                };
                let body = self.node(&branches[branch], pos);
                MatchTrace::Alt {
                    branch,
                    body: Box::new(body),
                }
            }
            RegexNode::Group { node, .. } => {
                let body = self.node(node, pos);
                MatchTrace::Group {
                    span: body.span(),
                    body: Box::new(body),
                }
            }
            RegexNode::Dot | RegexNode::CharClass { .. } | RegexNode::Literal(_) => {
                MatchTrace::Char(Span { start: pos, len: 1 })
            }
        }
    }

    fn repetition(&mut self, node: &RegexNode, pos: usize) -> Repetition {
        let mut iterations = Vec::new();
        let mut end = pos;
        loop {
            match self.choices.next() {
                Some(Choice::Iterate) => {
                    let iteration = self.node(node, end);
                    end = iteration.span().end();
                    iterations.push(iteration);
                }
                Some(Choice::Stop) => break,
                other => unreachable!("unexpected choice {other:?} inside a repetition"),
            }
        }
        Repetition {
            span: Span::between(pos, end),
            iterations,
        }
    }
}
