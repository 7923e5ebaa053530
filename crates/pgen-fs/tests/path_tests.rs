use pgen_fs::NormalizedPath;
use rstest::rstest;

#[rstest]
#[case("a/b/../c", "a/c")]
#[case("./a/./b/", "a/b")]
#[case("../../x", "../../x")]
#[case("a/../../b", "../b")]
#[case("/usr//local/../lib", "/usr/lib")]
#[case("", ".")]
#[case("C:\\proj\\src\\..\\inc", "C:/proj/inc")]
fn test_clean(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(NormalizedPath::new(input).clean().as_str(), expected);
}

#[rstest]
#[case("/ws/p1", "/ws/p1/aaa/bbb", "../..")]
#[case("/ws/p1/aaa/bbb", "/ws/p1", "aaa/bbb")]
#[case("/ws/p1", "/ws/p1/out", "..")]
#[case("/ws/p2/inc", "/ws/p1", "../p2/inc")]
#[case("a/b", "a", "b")]
fn test_relative_to(#[case] target: &str, #[case] base: &str, #[case] expected: &str) {
    let rel = NormalizedPath::new(target).relative_to(&NormalizedPath::new(base));
    assert_eq!(rel.as_str(), expected);
}

#[test]
fn test_default_is_empty() {
    assert_eq!(NormalizedPath::default().as_str(), "");
    assert_eq!(NormalizedPath::default(), NormalizedPath::new(""));
}

#[test]
fn test_relative_to_mixed_kinds_returns_target() {
    let rel = NormalizedPath::new("inc").relative_to(&NormalizedPath::new("/abs"));
    assert_eq!(rel.as_str(), "inc");
}

#[test]
fn test_components_include_drive() {
    let path = NormalizedPath::new("C:/work/src");
    let parts: Vec<&str> = path.components().collect();
    assert_eq!(parts, vec!["C:", "work", "src"]);
}

#[test]
fn test_join_keeps_leading_parents() {
    let base = NormalizedPath::new("../../");
    assert_eq!(base.join("project_2/inc").as_str(), "../../project_2/inc");
}

#[test]
fn test_display_matches_as_str() {
    let path = NormalizedPath::new("src\\main.c");
    assert_eq!(path.to_string(), "src/main.c");
}
