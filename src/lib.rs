//! A backtracking regex engine whose capture lists follow PCRE's
//! conventions: group numbering by opening parenthesis, last iteration
//! wins, and unmatched groups trimmed from the end or reported as empty
//! strings before the last matched group.
//!
//! ```
//! let matcher = rewind_regex::compile("((a))|((b))").unwrap();
//! let caps = matcher.captures("b").unwrap();
//! assert_eq!(caps.into_vec(), vec![
//!     Some("b".to_string()),
//!     Some(String::new()),
//!     Some(String::new()),
//!     Some("b".to_string()),
//!     Some("b".to_string()),
//! ]);
//! ```

pub mod ast;
pub mod error;
pub mod matcher;
pub mod parser;
pub mod resolver;

use std::ops::Index;

use log::{debug, trace, warn};

use crate::ast::RegexNode;
pub use crate::error::{CompileError, MatchError};
use crate::matcher::Program;
pub use crate::matcher::MatchOptions;

/// Compile `pattern` with the default [`MatchOptions`].
pub fn compile(pattern: &str) -> Result<Matcher, CompileError> {
    MatcherBuilder::new(pattern).build()
}

/// One-shot match of `pattern` against the start of `input`.
pub fn is_match(input: &str, pattern: &str) -> Result<bool, CompileError> {
    Ok(compile(pattern)?.is_match(input))
}

/// A compiled pattern. Cheap to share: matching only reads the program.
#[derive(Debug, Clone)]
pub struct Matcher {
    pattern: String,
    program: Program,
    group_count: usize,
    options: MatchOptions,
}

impl Matcher {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn ast(&self) -> &RegexNode {
        self.program.ast()
    }

    /// Number of capturing groups in the pattern.
    pub fn group_count(&self) -> usize {
        self.group_count
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// Match against the start of `text` using the options this matcher
    /// was built with.
    ///
    /// A search that runs out of budget is reported as no match; use
    /// [`Matcher::try_captures`] to tell the two apart.
    pub fn captures(&self, text: &str) -> Option<Captures> {
        match self.try_captures(text, &self.options) {
            Ok(captures) => captures,
            Err(err) => {
                self.gave_up(&err);
                None
            }
        }
    }

    /// Match against the start of `text` with a per-call budget.
    pub fn try_captures(
        &self,
        text: &str,
        options: &MatchOptions,
    ) -> Result<Option<Captures>, MatchError> {
        let chars: Vec<char> = text.chars().collect();
        let Some(match_trace) = self.program.run(&chars, options)? else {
            trace!("`{}` does not match {:?}", self.pattern, text);
            return Ok(None);
        };
        let groups = resolver::resolve(self.program.ast(), &match_trace, &chars);
        trace!("`{}` matched {:?}: {:?}", self.pattern, text, groups);
        Ok(Some(Captures { groups }))
    }

    /// Like [`Matcher::captures`], a search that runs out of budget counts
    /// as no match and is logged.
    pub fn is_match(&self, text: &str) -> bool {
        self.try_is_match(text, &self.options).unwrap_or_else(|err| {
            self.gave_up(&err);
            false
        })
    }

    pub fn try_is_match(&self, text: &str, options: &MatchOptions) -> Result<bool, MatchError> {
        let chars: Vec<char> = text.chars().collect();
        Ok(self.program.run(&chars, options)?.is_some())
    }

    fn gave_up(&self, err: &MatchError) {
        warn!("giving up on `{}`: {}", self.pattern, err);
    }

    /// Length in bytes of the match at the start of `text`.
    pub fn match_len(&self, text: &str) -> Option<usize> {
        self.captures(text).map(|caps| caps.whole().len())
    }
}

/// Builds a [`Matcher`] with non-default search limits.
///
/// ```
/// use rewind_regex::MatcherBuilder;
///
/// let matcher = MatcherBuilder::new("(x+x+)+y").step_limit(10_000).build().unwrap();
/// assert!(matcher.captures(&"x".repeat(25)).is_none());
/// ```
#[derive(Debug, Clone)]
pub struct MatcherBuilder {
    pattern: String,
    options: MatchOptions,
}

impl MatcherBuilder {
    pub fn new(pattern: &str) -> Self {
        MatcherBuilder {
            pattern: pattern.to_string(),
            options: MatchOptions::default(),
        }
    }

    /// Give up after `limit` node visits.
    pub fn step_limit(mut self, limit: u64) -> Self {
        self.options.step_limit = Some(limit);
        self
    }

    /// Give up when more than `limit` backtrack entries are pending.
    /// `None` removes the limit.
    pub fn depth_limit(mut self, limit: Option<usize>) -> Self {
        self.options.depth_limit = limit;
        self
    }

    pub fn options(mut self, options: MatchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Result<Matcher, CompileError> {
        let ast = parser::Parser::new(&self.pattern).parse()?;
        let group_count = ast.group_count();
        debug!("compiled `{}` with {} capture groups", self.pattern, group_count);
        Ok(Matcher {
            pattern: self.pattern,
            program: Program::compile(ast),
            group_count,
            options: self.options,
        })
    }
}

/// Result of a successful match. Entry 0 is the whole match; entry `i`
/// is capture group `i`. Groups after the last one that matched are
/// left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captures {
    groups: Vec<Option<String>>,
}

impl Captures {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&str> {
        self.groups.get(i)?.as_deref()
    }

    /// The text matched by the whole pattern.
    pub fn whole(&self) -> &str {
        self.get(0).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        self.groups.iter().map(Option::as_deref)
    }

    pub fn into_vec(self) -> Vec<Option<String>> {
        self.groups
    }
}

impl Index<usize> for Captures {
    type Output = str;

    fn index(&self, i: usize) -> &str {
        self.get(i)
            .unwrap_or_else(|| panic!("no capture group at index {i}"))
    }
}
