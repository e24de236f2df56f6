use yamlsync::document::parser::parse_document;
use yamlsync::document::path::LogicalPath;
use yamlsync::sync::linemap::build_line_map;
use yamlsync::sync::resolver::{find_path, find_range, Position};

// The leading blank line puts `lead: Alice` on line 6.
const SCENARIO: &str = "
company:
  name: Acme
  departments:
    engineering:
      lead: Alice
      members:
        - Bob
        - Carol
";

fn path(s: &str) -> LogicalPath {
    LogicalPath::parse(s).unwrap()
}

fn backward(text: &str, line: usize, column: usize) -> Option<LogicalPath> {
    let tree = parse_document(text).unwrap();
    let map = build_line_map(text, &tree);
    find_path(text, &tree, &map, Position::new(line, column))
}

#[test]
fn test_scenario_backward() {
    assert_eq!(
        backward(SCENARIO, 6, 5),
        Some(path("company.departments.engineering.lead"))
    );
}

#[test]
fn test_scenario_forward_item() {
    let range = find_range(
        SCENARIO,
        &path("company.departments.engineering.members[1]"),
        None,
    )
    .unwrap();
    assert_eq!(range.start_line, 9);
    assert_eq!(range.end_line, 9);
    assert_eq!(range.anchor_column, 9);
}

#[test]
fn test_section_range_spans_children() {
    let range = find_range(SCENARIO, &path("company.departments"), None).unwrap();
    assert_eq!((range.start_line, range.end_line), (4, 9));
    assert_eq!(range.anchor_column, 3);
    assert_eq!(range.line_count(), 6);
    assert!(range.contains_line(7));
    assert!(!range.contains_line(3));
}

#[test]
fn test_leaf_resolves_single_line() {
    let range = find_range(SCENARIO, &path("company.departments.engineering"), Some("lead")).unwrap();
    assert_eq!((range.start_line, range.end_line), (6, 6));
    assert_eq!(range.anchor_column, 7);
}

#[test]
fn test_misses_are_none() {
    assert!(find_range(SCENARIO, &LogicalPath::root(), None).is_none());
    assert!(find_range(SCENARIO, &path("company.missing"), None).is_none());
    assert!(find_range(SCENARIO, &path("company.departments.engineering.members[5]"), None).is_none());
}

#[test]
fn test_backward_on_blank_line_uses_line_above() {
    let text = "a:\n  b: 1\n\n  c: 2\n";
    assert_eq!(backward(text, 3, 1), Some(path("a.b")));
}

#[test]
fn test_backward_before_any_mapping_is_none() {
    let text = "# comment\n\na: 1\n";
    assert_eq!(backward(text, 1, 1), None);
}

#[test]
fn test_same_key_name_in_different_sections() {
    let text = "\
sales:
  lead: Dana
engineering:
  lead: Alice
";
    assert_eq!(backward(text, 2, 3), Some(path("sales.lead")));
    assert_eq!(backward(text, 4, 3), Some(path("engineering.lead")));
    let range = find_range(text, &path("engineering"), Some("lead")).unwrap();
    assert_eq!(range.start_line, 4);
}

#[test]
fn test_quoted_keys_resolve() {
    let text = "\"team name\": Core\n'lead': Alice\n";
    assert_eq!(find_range(text, &path("lead"), None).map(|r| r.start_line), Some(2));
}
