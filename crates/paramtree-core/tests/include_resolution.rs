//! Include resolution against the including file's directory and the
//! working directory.
//!
//! Everything lives in one test because it changes the process working
//! directory.

use std::env;
use std::fs;

use paramtree_core::{LoadOptions, ParamError, ParamTree};

#[test]
fn test_include_resolution_order() {
    let dir = tempfile::tempdir().unwrap();
    let conf = dir.path().join("conf");
    fs::create_dir(&conf).unwrap();

    fs::write(conf.join("main.params"), "include shared.params\nlocal = yes\n").unwrap();
    fs::write(conf.join("both.params"), "include dup.params\n").unwrap();
    fs::write(dir.path().join("shared.params"), "shared.from = cwd\n").unwrap();
    fs::write(dir.path().join("dup.params"), "which = cwd\n").unwrap();
    fs::write(conf.join("dup.params"), "which = sibling\n").unwrap();

    let previous = env::current_dir().unwrap();
    env::set_current_dir(dir.path()).unwrap();

    // Not next to main.params, found relative to the working directory.
    let tree = ParamTree::from_file(conf.join("main.params")).unwrap();
    assert_eq!(tree.root().get("shared.from").unwrap(), "cwd");
    assert_eq!(tree.root().get("local").unwrap(), "yes");

    // Sibling of the including file wins when both exist.
    let tree = ParamTree::from_file(conf.join("both.params")).unwrap();
    assert_eq!(tree.root().get("which").unwrap(), "sibling");

    // Without the fallback the include fails with the sibling path.
    let mut strict = ParamTree::new();
    let err = strict
        .root_mut()
        .parse_file(conf.join("main.params"), LoadOptions::default().with_cwd_fallback(false))
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(
        err.innermost(),
        ParamError::NotFound { path } if path == &conf.join("shared.params")
    ));
    assert!(matches!(err, ParamError::At { line_number: 1, .. }));

    // Neither location has it.
    fs::write(conf.join("broken.params"), "include nowhere.params\n").unwrap();
    let err = ParamTree::from_file(conf.join("broken.params")).unwrap_err();
    assert!(matches!(
        err.innermost(),
        ParamError::NotFound { path } if path.as_os_str() == "nowhere.params"
    ));

    env::set_current_dir(previous).unwrap();
}

#[test]
fn test_absolute_include_ignores_parent_directory() {
    let outer = tempfile::tempdir().unwrap();
    let inner = tempfile::tempdir().unwrap();
    let target = inner.path().join("abs.params");
    fs::write(&target, "abs = 1\n").unwrap();
    fs::write(
        outer.path().join("main.params"),
        format!("include {}\n", target.display()),
    )
    .unwrap();

    let tree = ParamTree::from_file(outer.path().join("main.params")).unwrap();
    assert_eq!(tree.root().get("abs").unwrap(), "1");
}

#[test]
fn test_nested_include_errors_carry_every_location() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("inner.params"), "ok = 1\nthis is bad\n").unwrap();
    fs::write(dir.path().join("outer.params"), "# top\ninclude inner.params\n").unwrap();

    let err = ParamTree::from_file(dir.path().join("outer.params")).unwrap_err();
    let ParamError::At { line_number, source, .. } = &err else {
        panic!("expected location, got {err:?}");
    };
    assert_eq!(*line_number, 2);
    assert!(matches!(source.as_ref(), ParamError::At { line_number: 2, .. }));
    assert!(matches!(err.innermost(), ParamError::Syntax { .. }));
}

#[test]
fn test_fail_on_existing_spans_includes() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("base.params"), "x = 1\n").unwrap();
    fs::write(dir.path().join("main.params"), "include base.params\nx = 2\n").unwrap();

    let mut lenient = ParamTree::new();
    lenient
        .root_mut()
        .parse_file(dir.path().join("main.params"), LoadOptions::default())
        .unwrap();
    assert_eq!(lenient.root().get("x").unwrap(), "2");

    let mut strict = ParamTree::new();
    let err = strict
        .root_mut()
        .parse_file(dir.path().join("main.params"), LoadOptions::strict())
        .unwrap_err();
    assert!(matches!(err.innermost(), ParamError::DuplicateKey { .. }));
}
