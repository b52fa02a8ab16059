#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegexNode {
    Seq(Vec<(RegexNode, Quantifier)>),
    Alt(Vec<RegexNode>),
    /// `id` is `None` for `(?:...)`.
    Group {
        id: Option<usize>,
        node: Box<RegexNode>,
    },
    Dot,
    CharClass {
        chars: Vec<char>,
        negated: bool,
    },
    Literal(char),
}

impl RegexNode {
    /// Number of capture groups reachable inside this node, counting
    /// every branch of an alternation.
    pub fn group_count(&self) -> usize {
        match self {
            RegexNode::Seq(items) => items.iter().map(|(n, _)| n.group_count()).sum(),
            RegexNode::Alt(branches) => branches.iter().map(RegexNode::group_count).sum(),
            RegexNode::Group { id, node } => usize::from(id.is_some()) + node.group_count(),
            RegexNode::Dot | RegexNode::CharClass { .. } | RegexNode::Literal(_) => 0,
        }
    }

    /// Whether `c` is accepted by a single-character node.
    pub(crate) fn accepts(&self, c: char) -> bool {
        match self {
            RegexNode::Dot => true,
            RegexNode::Literal(l) => *l == c,
            RegexNode::CharClass { chars, negated } => chars.contains(&c) != *negated,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantifier {
    pub min: u32,
    /// `None` means unbounded.
    pub max: Option<u32>,
}

impl Quantifier {
    pub const ONCE: Quantifier = Quantifier { min: 1, max: Some(1) };
    pub const ZERO_OR_MORE: Quantifier = Quantifier { min: 0, max: None };
    pub const ONE_OR_MORE: Quantifier = Quantifier { min: 1, max: None };
    pub const ZERO_OR_ONE: Quantifier = Quantifier { min: 0, max: Some(1) };

    pub fn allows_more(&self, count: u32) -> bool {
        self.max.map_or(true, |max| count < max)
    }
}

impl Default for Quantifier {
    fn default() -> Self {
        Quantifier::ONCE
    }
}
