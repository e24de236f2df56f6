//! Parsing the serialized form of a tree yields the same tree.

use yamlsync::document::parser::parse_document;
use yamlsync::document::serializer::stringify;

fn assert_round_trip(text: &str) {
    let tree = parse_document(text).unwrap();
    for indent in [2, 4] {
        let serialized = stringify(&tree, indent);
        let reparsed = parse_document(&serialized)
            .unwrap_or_else(|err| panic!("{}\n---\n{}", err, serialized));
        assert_eq!(reparsed, tree, "indent {}:\n{}", indent, serialized);
    }
}

#[test]
fn test_company_round_trip() {
    assert_round_trip(
        "\
company:
  name: Acme Corp
  founded: 1999
  public: false
  revenue: 12.5
  departments:
    engineering:
      team_lead: Alice
      technologies: [Rust, Go]
      members:
        - Bob
        - name: Carol
          role: staff
",
    );
}

#[test]
fn test_awkward_strings_round_trip() {
    assert_round_trip(
        r#"
empty: ""
looks_numeric: "42"
looks_bool: "yes"
reserved: "null"
colon: "a: b"
hash: "x #y"
dash: "- item"
padded: "  spaced  "
multiline: "one\ntwo"
unicode: "café ☕"
quote: 'it''s'
line_sep: "a\u2028b"
para_sep: "a\u2029b"
"a\u2028key": 1
"#,
    );
}

#[test]
fn test_nested_and_empty_collections_round_trip() {
    assert_round_trip("grid: [[1, 2], [3, []]]\nmeta: {}\nlist: []\n");
    assert_round_trip("- a\n- - b\n  - {c: 1, d: [e]}\n");
}

#[test]
fn test_special_numbers_round_trip() {
    assert_round_trip("big: 9007199254740993\nneg: -3\ninf: .inf\nwhole: 2.0\n");
}

#[test]
fn test_integers_beyond_i64_round_trip_exactly() {
    assert_round_trip("id: 18446744073709551615\nmin: -9223372036854775808\n");

    let tree = parse_document("id: 18446744073709551615\n").unwrap();
    assert_eq!(stringify(&tree, 2), "id: 18446744073709551615\n");
    assert_eq!(
        tree.to_json_pretty().unwrap(),
        "{\n  \"id\": 18446744073709551615\n}"
    );
}

#[test]
fn test_key_order_is_preserved() {
    let tree = parse_document("zeta: 1\nalpha: 2\nmid: 3\n").unwrap();
    assert_eq!(stringify(&tree, 2), "zeta: 1\nalpha: 2\nmid: 3\n");
}
