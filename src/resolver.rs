use crate::ast::RegexNode;
use crate::matcher::{MatchTrace, Span};

/// Turns a successful trace into the capture list: whole match first,
/// then one entry per capture group, trimmed by [`trim`].
pub fn resolve(ast: &RegexNode, trace: &MatchTrace, text: &[char]) -> Vec<Option<String>> {
    let mut spans = vec![Some(trace.span())];
    collect(ast, trace, &mut spans);
    assert_eq!(
        spans.len(),
        ast.group_count() + 1,
        "capture list does not fit the pattern"
    );

    let mut entries: Vec<Option<String>> = spans
        .into_iter()
        .map(|span| span.map(|span| text[span.start..span.end()].iter().collect()))
        .collect();
    trim(&mut entries);
    entries
}

/// Drops every entry after the last present one and turns the absent
/// entries before it into empty strings. Entry 0 is always kept.
pub fn trim(entries: &mut Vec<Option<String>>) {
    let keep = entries.iter().rposition(Option::is_some).map_or(0, |last| last + 1);
    entries.truncate(keep);
    for entry in entries.iter_mut().skip(1) {
        entry.get_or_insert_with(String::new);
    }
}

/// Appends the span of every capture group inside `node`, in group order.
/// Groups that did not take part in the match are `None`.
fn collect(node: &RegexNode, trace: &MatchTrace, out: &mut Vec<Option<Span>>) {
    match (node, trace) {
        (RegexNode::Seq(items), MatchTrace::Seq { items: repetitions, .. }) => {
            assert_eq!(items.len(), repetitions.len(), "sequence trace has wrong length");
            for ((item, _), repetition) in items.iter().zip(repetitions) {
                // Only the last iteration reports its groups.
                match repetition.iterations.last() {
                    Some(last) => collect(item, last, out),
                    None => absent(out, item.group_count()),
                }
            }
        }
        (RegexNode::Alt(branches), MatchTrace::Alt { branch, body }) => {
            let (before, rest) = branches.split_at(*branch);
            let Some((taken, after)) = rest.split_first() else {
                unreachable!("branch {branch} out of range");
            };
            absent(out, before.iter().map(RegexNode::group_count).sum());
            collect(taken, body, out);
            absent(out, after.iter().map(RegexNode::group_count).sum());
        }
        (RegexNode::Group { id, node }, MatchTrace::Group { span, body }) => {
            if let Some(id) = id {
                debug_assert_eq!(out.len(), *id, "group {id} resolved out of order");
                out.push(Some(*span));
            }
            collect(node, body, out);
        }
        (RegexNode::Dot | RegexNode::CharClass { .. } | RegexNode::Literal(_), MatchTrace::Char(_)) => {}
        (node, trace) => unreachable!("trace {trace:?} does not fit node {node:?}"),
    }
}

fn absent(out: &mut Vec<Option<Span>>, count: usize) {
    out.extend(std::iter::repeat(None).take(count));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{run, MatchOptions};
    use crate::parser::Parser;
    use pretty_assertions::assert_eq;

    fn resolved(pattern: &str, text: &str) -> Vec<Option<String>> {
        let ast = Parser::new(pattern).parse().unwrap();
        let chars: Vec<char> = text.chars().collect();
        let trace = run(&ast, &chars, &MatchOptions::default()).unwrap().unwrap();
        resolve(&ast, &trace, &chars)
    }

    fn strings(entries: &[&str]) -> Vec<Option<String>> {
        entries.iter().map(|s| Some(s.to_string())).collect()
    }

    #[test]
    fn trim_drops_trailing_and_fills_interior() {
        let mut entries = vec![Some("ab".to_string()), None, Some("b".to_string()), None, None];
        trim(&mut entries);
        assert_eq!(entries, strings(&["ab", "", "b"]));

        let mut entries = vec![Some("ab".to_string()), None, None];
        trim(&mut entries);
        assert_eq!(entries, strings(&["ab"]));
    }

    #[test]
    fn last_iteration_wins() {
        assert_eq!(resolved("(a|b)*", "ab"), strings(&["ab", "b"]));
        assert_eq!(resolved("((a))*b", "aaab"), strings(&["aaab", "a", "a"]));
    }

    #[test]
    fn earlier_iterations_do_not_leak() {
        // Group 1 only matched in the first iteration.
        assert_eq!(resolved("(?:(a)|(b))*", "ab"), strings(&["ab", "", "b"]));
    }

    #[test]
    fn untaken_branches_keep_later_indices_stable() {
        assert_eq!(resolved("(?:(a)|(b))(c)", "ac"), strings(&["ac", "a", "", "c"]));
        assert_eq!(resolved("((a))|((b))", "b"), strings(&["b", "", "", "b", "b"]));
    }

    #[test]
    fn zero_iterations_pad_nested_groups() {
        assert_eq!(resolved("(((a)))*(b)", "b"), strings(&["b", "", "", "", "b"]));
        assert_eq!(resolved("(a)*b", "b"), strings(&["b"]));
    }

    #[test]
    fn empty_match_inside_group_is_present() {
        assert_eq!(resolved("(a*)b", "b"), strings(&["b", ""]));
    }
}
