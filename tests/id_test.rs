//! Tests for identifier parsing, relations and ordering

use rstest::rstest;

use hierfix::domain::{IdScheme, NodeId};

fn id(text: &str) -> NodeId {
    IdScheme::default().parse(text).expect("valid id")
}

#[rstest]
#[case("gen.0", "gen.0.3", true)]
#[case("gen", "gen.7", true)]
#[case("gen.0", "gen.0.3.1", false)]
#[case("gen.1", "gen.0.3", false)]
#[case("gen.0.3", "gen.0", false)]
#[case("gen.0", "gen.0", false)]
fn given_two_ids_when_checking_parent_then_requires_direct_prefix(
    #[case] parent: &str,
    #[case] child: &str,
    #[case] expected: bool,
) {
    assert_eq!(id(parent).is_parent_of(&id(child)), expected);
}

#[rstest]
#[case("gen", "gen.0.1.2", true)]
#[case("gen.0", "gen.0.1.2", true)]
#[case("gen.0.1", "gen.0.1.2", true)]
#[case("gen.0.1.2", "gen.0.1.2", false)]
#[case("gen.0.1.2.0", "gen.0.1.2", false)]
#[case("gen.0.2", "gen.0.1.2", false)]
fn given_two_ids_when_checking_ancestor_then_never_self(
    #[case] ancestor: &str,
    #[case] descendant: &str,
    #[case] expected: bool,
) {
    assert_eq!(id(ancestor).is_ancestor_of(&id(descendant)), expected);
}

#[test]
fn given_different_prefixes_when_relating_then_prefix_is_ignored() {
    assert!(id("gen").is_parent_of(&id("other.4")));
    assert!(id("x.1").is_ancestor_of(&id("gen.1.0.0")));
}

#[test]
fn given_ids_when_sorting_then_numeric_segment_order() {
    let mut ids = vec![
        id("gen.10"),
        id("gen.2"),
        id("gen.0.1"),
        id("gen"),
        id("gen.0"),
        id("gen.2.0"),
    ];
    ids.sort();

    let sorted: Vec<&str> = ids.iter().map(NodeId::as_str).collect();
    assert_eq!(
        sorted,
        vec!["gen", "gen.0", "gen.0.1", "gen.2", "gen.2.0", "gen.10"]
    );
}

#[rstest]
#[case("gen.-1")]
#[case("gen.+1")]
#[case("gen.1.+0")]
#[case("gen. 1")]
#[case("gen.99999999999999999999999")]
#[case("gen.a")]
#[case("gen.1.")]
#[case("   ")]
fn given_malformed_text_when_parsing_then_errors(#[case] text: &str) {
    assert!(IdScheme::default().parse(text).is_err());
}

#[test]
fn given_custom_separator_when_parsing_then_splits_literally() {
    // '|' is a regex metacharacter and must be matched literally
    let scheme = IdScheme::new("|", "g", "g").unwrap();
    let parsed = scheme.parse("g|4|2").unwrap();
    assert_eq!(parsed.segments(), &[4, 2]);
    assert!(scheme.parse("g|4.2").is_err());
}
