//! Declarative suite loading tests

use std::path::Path;

use notewright_harness::flows;
use notewright_harness::Suite;

#[test]
fn shipped_spec_matches_the_builtin_suite() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../specs/note_app.yaml");
    let suite = Suite::from_file(&path).unwrap();

    let from_yaml = suite.plan().unwrap();
    let builtin = flows::note_app_suite().plan().unwrap();
    assert_eq!(from_yaml, builtin);
}

#[test]
fn load_all_walks_the_directory_in_path_order() {
    let dir = tempfile::tempdir().unwrap();

    std::fs::write(
        dir.path().join("b_login.yaml"),
        "name: login\ntests:\n  - name: opens\n    steps: []\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("a_front.yml"),
        "name: front\ntests:\n  - name: shows\n    steps: []\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("notes.txt"), "not a spec").unwrap();

    let suites = Suite::load_all(dir.path()).unwrap();
    let names: Vec<_> = suites.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["front", "login"]);
}

#[test]
fn malformed_spec_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.yaml");
    std::fs::write(&path, "name: broken\ntests: 42\n").unwrap();

    let err = Suite::from_file(&path).unwrap_err();
    assert!(err.to_string().contains("broken.yaml"));
}
