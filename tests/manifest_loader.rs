use std::fs;

use argbind::manifest::{load_specification, ManifestError, SpecManifest};
use argbind::spec::{ArgValue, NamedArgs, OptionKind};

const PUSH: &str = r#"
description = "git push"

[[entry]]
kind = "literal"
value = "push"

[[entry]]
kind = "flag"
name = "force"
aliases = ["f"]
max_times = 2

[[entry]]
kind = "flag_or_value"
name = "force_with_lease"
inline = true

[[entry]]
kind = "value"
name = "push_option"
aliases = ["o"]
repeatable = true
inline = true

[[entry]]
kind = "metadata"
name = "timeout"
types = ["integer", "float"]

[[entry]]
kind = "operand"
name = "repository"

[[entry]]
kind = "operand"
name = "refspecs"
repeatable = true
"#;

#[test]
fn load_from_file_and_bind() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("push.toml");
    fs::write(&path, PUSH).unwrap();

    let spec = load_specification(&path).unwrap();
    let named = NamedArgs::new()
        .set("f", 2)
        .set("force_with_lease", "main")
        .set("o", vec!["ci.skip", "merge"])
        .set("timeout", 10);
    let bound = spec
        .bind(&["origin".into(), "main".into(), "v1".into()], &named)
        .unwrap();

    assert_eq!(
        bound.tokens(),
        [
            "push",
            "--force",
            "--force",
            "--force-with-lease=main",
            "--push-option=ci.skip",
            "--push-option=merge",
            "origin",
            "main",
            "v1"
        ]
    );
    assert_eq!(bound.operand("refspecs"), Some(&ArgValue::from(vec!["main", "v1"])));
    assert!(bound.execution_options().unwrap().timeout.is_some());
}

#[test]
fn manifest_types_are_enforced() {
    let spec = SpecManifest::parse(PUSH)
        .unwrap()
        .into_specification()
        .unwrap();
    let err = spec
        .bind_named(&NamedArgs::new().set("timeout", "soon"))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Option 'timeout' must be Integer or Float, but was String"
    );
}

#[test]
fn manifest_kinds_map_to_option_kinds() {
    let spec = SpecManifest::parse(PUSH)
        .unwrap()
        .into_specification()
        .unwrap();
    assert!(matches!(
        spec.option("f").map(|d| &d.kind),
        Some(OptionKind::Flag { max_times: Some(2), .. })
    ));
    assert!(matches!(
        spec.option("timeout").map(|d| &d.kind),
        Some(OptionKind::Metadata)
    ));
}

#[test]
fn operand_defaults_come_from_toml() {
    let text = r#"
[[entry]]
kind = "operand"
name = "rev"
default = "HEAD"
"#;
    let spec = SpecManifest::parse(text)
        .unwrap()
        .into_specification()
        .unwrap();
    let bound = spec.bind_named(&NamedArgs::new()).unwrap();
    assert_eq!(bound.tokens(), ["HEAD"]);
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_specification(&dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, ManifestError::ReadError { .. }));
}

#[test]
fn contradictory_modifiers_are_definition_errors() {
    let text = r#"
[[entry]]
kind = "value"
name = "pathspec"
inline = true
as_operand = true
"#;
    let err = SpecManifest::parse(text)
        .unwrap()
        .into_specification()
        .unwrap_err();
    assert!(matches!(err, ManifestError::Definition(_)));
    assert!(err.to_string().contains("inline cannot be combined with as_operand"));
}
