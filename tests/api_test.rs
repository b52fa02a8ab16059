// api_test.rs - Integration tests for the compile/match facade.

use pretty_assertions::assert_eq;
use rewind_regex::{compile, CompileError, MatchError, MatchOptions, MatcherBuilder};

const PATTERNS: &[&str] = &[
    "a*b",
    "(a|b)*c",
    "((a))|((b))",
    "(a)?(b)?(c)?d",
    "(?:(x)|(y))+z",
    r#""(?:[^"\\]|\\.)*""#,
];

const INPUTS: &[&str] = &["", "b", "abc", "aabbc", "d", "cd", "xyz", "yxz", r#""q\"""#];

// === compile ===

#[test]
fn unsupported_syntax_reports_position() {
    for (pattern, position) in [("(a", 2), ("a\\", 1), ("[ab", 3), ("a+*", 2), ("(?:a|b", 6)] {
        let err = compile(pattern).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnsupportedSyntax {
                pattern: pattern.to_string(),
                position
            }
        );
    }
}

#[test]
fn compile_error_message() {
    let err = compile("(a").unwrap_err();
    assert_eq!(err.to_string(), "unsupported regex syntax in `(a` at byte 2");
}

#[test]
fn deep_nesting_is_rejected() {
    let pattern = format!("{}a{}", "(".repeat(1000), ")".repeat(1000));
    assert!(matches!(
        compile(&pattern),
        Err(CompileError::UnsupportedSyntax { position: 256, .. })
    ));
    let pattern = format!("{}a{}", "(".repeat(200), ")".repeat(200));
    assert_eq!(compile(&pattern).unwrap().captures("a").unwrap().len(), 201);
}

#[test]
fn inverted_bounds_are_rejected() {
    assert!(matches!(
        compile("a{5,1}"),
        Err(CompileError::InvalidRepetition { position: 1, .. })
    ));
}

#[test]
fn group_count_is_static() {
    assert_eq!(compile("abc").unwrap().group_count(), 0);
    assert_eq!(compile("((a))|((b))").unwrap().group_count(), 4);
    assert_eq!(compile("(?:(a)(?:b))*").unwrap().group_count(), 1);
}

// === properties ===

#[test]
fn repeated_matches_are_identical() {
    for pattern in PATTERNS {
        let matcher = compile(pattern).unwrap();
        for input in INPUTS {
            assert_eq!(matcher.captures(input), matcher.captures(input), "{pattern} :: {input}");
        }
    }
}

#[test]
fn patterns_without_groups_yield_one_entry() {
    for pattern in ["a*b", "[^x]+", "(?:ab|c)*d", "x{2,}"] {
        let matcher = compile(pattern).unwrap();
        for input in ["b", "aab", "abcd", "xxx", "ccd"] {
            if let Some(caps) = matcher.captures(input) {
                assert_eq!(caps.len(), 1, "{pattern} :: {input}");
            }
        }
    }
}

#[test]
fn group_index_does_not_depend_on_branch() {
    let matcher = compile("(a)|(b)|(c)").unwrap();
    assert_eq!(matcher.captures("a").unwrap().get(1), Some("a"));
    assert_eq!(matcher.captures("b").unwrap().get(2), Some("b"));
    assert_eq!(matcher.captures("c").unwrap().get(3), Some("c"));
}

#[test]
fn captures_are_trimmed() {
    for pattern in PATTERNS {
        let matcher = compile(pattern).unwrap();
        for input in INPUTS {
            let Some(caps) = matcher.captures(input) else {
                continue;
            };
            assert!(caps.len() <= matcher.group_count() + 1);
            assert!(caps.iter().all(|group| group.is_some()), "{pattern} :: {input}");
        }
    }
}

#[test]
fn close_paren_ends_the_innermost_group() {
    let matcher = compile("(a))").unwrap();
    assert_eq!(matcher.group_count(), 1);
    assert_eq!(matcher.captures("a)").unwrap().into_vec(), vec![
        Some("a)".to_string()),
        Some("a".to_string()),
    ]);
    assert!(!matcher.is_match("a"));
}

#[test]
fn trailing_unmatched_groups_are_dropped() {
    let matcher = compile("(a)?(b)?(c)?d").unwrap();
    assert_eq!(matcher.captures("d").unwrap().len(), 1);
    assert_eq!(matcher.captures("bd").unwrap().into_vec(), vec![
        Some("bd".to_string()),
        Some(String::new()),
        Some("b".to_string()),
    ]);
}

// === budgets ===

#[test]
fn catastrophic_pattern_terminates_under_a_budget() {
    let matcher = MatcherBuilder::new("(x+x+)+y")
        .step_limit(200_000)
        .build()
        .unwrap();
    let input = "x".repeat(25);
    assert_eq!(matcher.captures(&input), None);
    assert_eq!(
        matcher.try_captures(&input, matcher.options()),
        Err(MatchError::StepLimitExceeded { limit: 200_000 })
    );
}

#[test]
fn small_catastrophic_input_fails_without_budget() {
    let matcher = compile("(x+x+)+y").unwrap();
    let input = "x".repeat(8);
    assert_eq!(
        matcher.try_captures(&input, &MatchOptions::unlimited()),
        Ok(None)
    );
    let caps = matcher.captures(&format!("{input}y")).unwrap();
    assert_eq!(caps.whole(), "xxxxxxxxy");
}

#[test]
fn per_call_options_override_builder() {
    let matcher = compile("a*").unwrap();
    let input = "a".repeat(200);
    let tight = MatchOptions::default().depth_limit(Some(10));
    assert_eq!(
        matcher.try_captures(&input, &tight),
        Err(MatchError::DepthLimitExceeded { limit: 10 })
    );
    assert_eq!(matcher.match_len(&input), Some(200));
}

#[test]
fn exhausted_search_is_not_a_match() {
    let matcher = MatcherBuilder::new("(a|aa)+b").step_limit(50).build().unwrap();
    let input = "a".repeat(30);
    assert!(!matcher.is_match(&input));
    assert_eq!(
        matcher.try_is_match(&input, matcher.options()),
        Err(MatchError::StepLimitExceeded { limit: 50 })
    );
    assert_eq!(matcher.try_is_match("aab", matcher.options()), Ok(true));
}

#[test]
fn default_options_have_no_limits() {
    assert_eq!(MatchOptions::default(), MatchOptions::unlimited());
    assert_eq!(compile("a").unwrap().options().depth_limit, None);
}

#[test]
fn long_inputs_match_with_default_options() {
    let run = "a".repeat(150_000);
    assert_eq!(compile("a*").unwrap().match_len(&run), Some(150_000));
    assert!(compile("a*").unwrap().is_match(&run));

    let mixed: String = "x€y".repeat(40_000);
    assert_eq!(compile(".*").unwrap().match_len(&mixed), Some(mixed.len()));

    let pairs = format!("{}c", "ab".repeat(60_000));
    let caps = compile("(?:ab)*c").unwrap().captures(&pairs).unwrap();
    assert_eq!(caps.len(), 1);
    assert_eq!(caps.whole().len(), 120_001);

    let caps = compile("(ab)*c").unwrap().captures(&pairs).unwrap();
    assert_eq!(caps.get(1), Some("ab"));
}

// === sharing ===

#[test]
fn concurrent_matches_share_one_matcher() {
    let matcher = compile("((a)|(b))+c").unwrap();
    let expected = matcher.captures("abac");
    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..100 {
                    assert_eq!(matcher.captures("abac"), expected);
                }
            });
        }
    });
    assert_eq!(
        expected.unwrap().into_vec(),
        vec![
            Some("abac".to_string()),
            Some("a".to_string()),
            Some("a".to_string()),
        ]
    );
}
