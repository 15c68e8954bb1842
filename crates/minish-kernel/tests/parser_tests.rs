//! End-to-end parse tests over the public API, covering quoting and the
//! operator grammar together.

use std::path::PathBuf;

use rstest::rstest;

use minish_kernel::parser::parse;

#[rstest]
#[case("ls", vec!["ls"])]
#[case("ls -la /tmp", vec!["ls", "-la", "/tmp"])]
#[case("echo 'hello world'", vec!["echo", "hello world"])]
#[case("echo \"a | b\"", vec!["echo", "a | b"])]
#[case("grep 'a>b' file", vec!["grep", "a>b", "file"])]
fn single_stage_argv(#[case] line: &str, #[case] expected: Vec<&str>) {
    let p = parse(line).unwrap();
    assert_eq!(p.stages.len(), 1);
    assert_eq!(p.stages[0].argv, expected);
    assert!(!p.background);
}

#[rstest]
#[case("a | b", 2)]
#[case("a|b|c", 3)]
#[case("a  |  b |c| d", 4)]
fn stage_counts(#[case] line: &str, #[case] count: usize) {
    assert_eq!(parse(line).unwrap().stages.len(), count);
}

#[rstest]
#[case("sleep 10 &")]
#[case("sleep 10&")]
#[case("a | b &")]
fn ampersand_marks_background(#[case] line: &str) {
    assert!(parse(line).unwrap().background);
}

#[test]
fn quoted_operators_are_words() {
    let p = parse("echo '|' \"&\" '<' '>'").unwrap();
    assert_eq!(p.stages.len(), 1);
    assert_eq!(p.stages[0].argv, vec!["echo", "|", "&", "<", ">"]);
    assert!(!p.background);
}

#[test]
fn redirections_attach_at_the_endpoints() {
    let p = parse("sort < input.txt | head -3 > output.txt").unwrap();
    assert_eq!(p.stages[0].input, Some(PathBuf::from("input.txt")));
    let out = p.stages[1].output.as_ref().unwrap();
    assert_eq!(out.path, PathBuf::from("output.txt"));
    assert!(!out.append);
}

#[test]
fn append_redirect_sets_the_flag() {
    let p = parse("echo done >> log.txt").unwrap();
    assert!(p.stages[0].output.as_ref().unwrap().append);
}

#[test]
fn operators_bind_without_whitespace() {
    let p = parse("echo hi>out.txt").unwrap();
    assert_eq!(p.stages[0].argv, vec!["echo", "hi"]);
    assert_eq!(
        p.stages[0].output.as_ref().unwrap().path,
        PathBuf::from("out.txt")
    );
}

#[rstest]
#[case("echo >")]
#[case("cat <")]
#[case("a > | b")]
fn dangling_redirect_is_rejected(#[case] line: &str) {
    assert!(parse(line).is_err());
}

#[test]
fn unterminated_quote_is_rejected() {
    assert!(parse("echo 'oops").is_err());
    assert!(parse("echo \"oops").is_err());
}
