//! Every mapped line must resolve forward to a range starting on that line.

use yamlsync::document::parser::parse_document;
use yamlsync::document::path::LogicalPath;
use yamlsync::sync::linemap::build_line_map;
use yamlsync::sync::resolver::find_range;

const COMPANY: &str = "\
# Company overview
company:
  name: Acme Corp
  founded: 1999

  departments:
    sales:
      team_lead: Dana
      regions:
        - EMEA
        - APAC
    engineering:
      team_lead: Alice
      technologies:
        - name: Rust
          since: 2020
        - name: Go
      members:
      - Bob
      - Carol
  strategy:
    goals: [growth, retention]
    budget: {q1: 10, q2: 20}
";

fn assert_sound(text: &str) {
    let tree = parse_document(text).unwrap();
    let map = build_line_map(text, &tree);
    assert!(!map.is_empty());

    for (line, path) in map.iter() {
        let range = find_range(text, path, None)
            .unwrap_or_else(|| panic!("{} (line {}) did not resolve", path, line));
        assert_eq!(range.start_line, line, "forward mismatch for {}", path);
    }
}

#[test]
fn test_company_document_is_sound() {
    assert_sound(COMPANY);
}

#[test]
fn test_nested_sequences_are_sound() {
    assert_sound("matrix:\n  - - 1\n    - 2\n  - - 3\nafter: true\n");
}

#[test]
fn test_repeated_key_names_are_sound() {
    assert_sound("a:\n  name: one\n  child:\n    name: two\nb:\n  name: three\n");
}

#[test]
fn test_expected_entries() {
    let tree = parse_document(COMPANY).unwrap();
    let map = build_line_map(COMPANY, &tree);
    let path = |s: &str| LogicalPath::parse(s).unwrap();

    assert_eq!(map.get(1), None);
    assert_eq!(map.get(2), Some(&path("company")));
    assert_eq!(map.get(5), None);
    assert_eq!(map.get(10), Some(&path("company.departments.sales.regions[0]")));
    assert_eq!(
        map.get(15),
        Some(&path("company.departments.engineering.technologies[0]"))
    );
    assert_eq!(
        map.get(16),
        Some(&path("company.departments.engineering.technologies[0].since"))
    );
    assert_eq!(map.get(20), Some(&path("company.departments.engineering.members[1]")));
    assert_eq!(map.get(22), Some(&path("company.strategy.goals")));
}

#[test]
fn test_flow_collections_map_only_their_key() {
    let tree = parse_document(COMPANY).unwrap();
    let map = build_line_map(COMPANY, &tree);

    assert!(map
        .iter()
        .all(|(_, path)| !path.to_string().starts_with("company.strategy.goals[")));
}
