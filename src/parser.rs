use crate::ast::{Quantifier, RegexNode};
use crate::error::CompileError;

/// Deepest group nesting the parser accepts. Compiling, replaying and
/// resolving all recurse once per level.
pub const MAX_NESTING: usize = 256;

/// Parser for regular expressions.
///
/// The `Parser` struct holds the pattern and the current byte position.
/// It also hands out group IDs for capturing groups, in the order their
/// opening parentheses appear.
pub struct Parser<'a> {
    pub pattern: &'a str,
    pub pos: usize,
    next_group_id: usize,
    open_groups: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given pattern.
    pub fn new(pattern: &'a str) -> Self {
        Self {
            pattern,
            pos: 0,
            next_group_id: 1,
            open_groups: 0,
        }
    }

    /// Allocate a new group ID for capturing groups.
    fn alloc_group_id(&mut self) -> usize {
        let id = self.next_group_id;
        self.next_group_id += 1;
        id
    }

    /// Peek at the next character in the pattern without advancing.
    fn peek(&self) -> Option<char> {
        self.pattern[self.pos..].chars().next()
    }

    /// Advance the parser by one character and return it.
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    /// Expect a specific character and advance if it matches.
    fn expect(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn unsupported(&self, position: usize) -> CompileError {
        CompileError::UnsupportedSyntax {
            pattern: self.pattern.to_string(),
            position,
        }
    }

    /// Entry point for parsing a regex pattern.
    ///
    /// The whole pattern must be consumed.
    ///
    /// Example:
    /// - Pattern: `a|b` → Alt([Seq([a]), Seq([b])])
    pub fn parse(&mut self) -> Result<RegexNode, CompileError> {
        let node = self.parse_alt()?;
        if self.pos < self.pattern.len() {
            return Err(self.unsupported(self.pos));
        }
        Ok(node)
    }

    /// Parse alternation (`|`) in the pattern.
    ///
    /// Example:
    /// - Pattern: `a|b|c` → Alt([Seq([a]), Seq([b]), Seq([c])])
    /// - Pattern: `abc`   → Seq([a, b, c])
    fn parse_alt(&mut self) -> Result<RegexNode, CompileError> {
        let mut branches = vec![self.parse_seq()?];
        while self.expect('|') {
            branches.push(self.parse_seq()?);
        }
        if branches.len() == 1 {
            Ok(branches.swap_remove(0))
        } else {
            Ok(RegexNode::Alt(branches))
        }
    }

    /// Parse a sequence of atoms, each with its quantifier.
    ///
    /// A `)` only ends the sequence while a group is open; at the top
    /// level it is an ordinary character.
    fn parse_seq(&mut self) -> Result<RegexNode, CompileError> {
        let mut items = Vec::new();
        while let Some(ch) = self.peek() {
            if ch == '|' || (ch == ')' && self.open_groups > 0) {
                break;
            }
            let atom = self.parse_atom()?;
            let quantifier = self.parse_quantifier()?;
            items.push((atom, quantifier));
        }
        Ok(RegexNode::Seq(items))
    }

    /// Parse a single atom: group, char class, escape, dot or literal.
    ///
    /// Examples:
    /// - Pattern: `(abc)`   → Group { id: Some(n), node: Seq([a, b, c]) }
    /// - Pattern: `(?:abc)` → Group { id: None, node: Seq([a, b, c]) }
    /// - Pattern: `[abc]`   → CharClass { chars: ['a','b','c'], negated: false }
    /// - Pattern: `\.`      → Literal('.')
    /// - Pattern: `.`       → Dot
    fn parse_atom(&mut self) -> Result<RegexNode, CompileError> {
        let start = self.pos;
        match self.peek() {
            Some('(') => {
                if self.open_groups >= MAX_NESTING {
                    return Err(self.unsupported(start));
                }
                self.advance();
                let id = if self.pattern[self.pos..].starts_with("?:") {
                    self.pos += 2;
                    None
                } else {
                    Some(self.alloc_group_id())
                };
                self.open_groups += 1;
                let node = self.parse_alt()?;
                self.open_groups -= 1;
                if !self.expect(')') {
                    return Err(self.unsupported(self.pos));
                }
                Ok(RegexNode::Group {
                    id,
                    node: Box::new(node),
                })
            }
            Some('[') => self.parse_char_class(),
            Some('\\') => {
                // Any escaped char is a literal.
                self.advance();
                self.advance()
                    .map(RegexNode::Literal)
                    .ok_or_else(|| self.unsupported(start))
            }
            Some('.') => {
                self.advance();
                Ok(RegexNode::Dot)
            }
            Some('*' | '+' | '?' | ']' | '|') | None => Err(self.unsupported(start)),
            Some(c) => {
                self.advance();
                Ok(RegexNode::Literal(c))
            }
        }
    }

    /// Parse a character class, e.g. `[abc]` or `[^abc]`.
    ///
    /// Examples:
    /// - Pattern: `[abc]`  → CharClass { chars: ['a','b','c'], negated: false }
    /// - Pattern: `[^xyz]` → CharClass { chars: ['x','y','z'], negated: true }
    /// - Pattern: `[\]]`   → CharClass { chars: [']'], negated: false }
    fn parse_char_class(&mut self) -> Result<RegexNode, CompileError> {
        self.advance(); // consume '['
        let negated = self.expect('^');
        let mut chars = Vec::new();
        loop {
            let at = self.pos;
            let member = match self.advance() {
                Some(']') => break,
                Some('\\') => self.advance().ok_or_else(|| self.unsupported(at))?,
                Some('^') | None => return Err(self.unsupported(at)),
                Some(c) => c,
            };
            if !chars.contains(&member) {
                chars.push(member);
            }
        }
        Ok(RegexNode::CharClass { chars, negated })
    }

    /// Parse the quantifier following an atom, if any.
    ///
    /// Examples:
    /// - `*` → {0,}, `+` → {1,}, `?` → {0,1}
    /// - `{3}` → {3,3}, `{2,}` → {2,}, `{2,5}` → {2,5}
    /// - `{,2}`, `{}`, `{a}` → no quantifier; the braces are read as literals
    fn parse_quantifier(&mut self) -> Result<Quantifier, CompileError> {
        let quantifier = match self.peek() {
            Some('*') => Quantifier::ZERO_OR_MORE,
            Some('+') => Quantifier::ONE_OR_MORE,
            Some('?') => Quantifier::ZERO_OR_ONE,
            Some('{') => return self.parse_braces(),
            _ => return Ok(Quantifier::ONCE),
        };
        self.advance();
        Ok(quantifier)
    }

    fn parse_braces(&mut self) -> Result<Quantifier, CompileError> {
        let start = self.pos;
        self.advance(); // consume '{'
        let Some(min) = self.parse_number()? else {
            self.pos = start;
            return Ok(Quantifier::ONCE);
        };
        let max = if self.expect(',') {
            self.parse_number()?
        } else {
            Some(min)
        };
        if !self.expect('}') {
            self.pos = start;
            return Ok(Quantifier::ONCE);
        }
        if max.is_some_and(|max| max < min) {
            return Err(CompileError::InvalidRepetition {
                pattern: self.pattern.to_string(),
                position: start,
            });
        }
        Ok(Quantifier { min, max })
    }

    /// Parse a run of ASCII digits. Returns `None` when there are none.
    fn parse_number(&mut self) -> Result<Option<u32>, CompileError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        if start == self.pos {
            return Ok(None);
        }
        self.pattern[start..self.pos]
            .parse()
            .map(Some)
            .map_err(|_| CompileError::InvalidRepetition {
                pattern: self.pattern.to_string(),
                position: start,
            })
    }
}
