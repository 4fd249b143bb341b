//! End-to-end bind scenarios against specifications built in code.

use argbind::spec::{
    ArgValue, BindError, CustomTokens, NamedArgs, Operand, Opt, Specification, ValueType,
};

fn tokens(bound: &argbind::spec::BoundArgs) -> Vec<&str> {
    bound.tokens().iter().map(String::as_str).collect()
}

fn commit_spec() -> Specification {
    Specification::builder()
        .literal("commit")
        .flag(Opt::new("all").alias("a"))
        .flag(Opt::new("force"))
        .value(Opt::new("branch").inline())
        .flag_or_value(Opt::new("gpg_sign").alias("S").inline().negatable())
        .flag(Opt::new("verify").negatable())
        .value(Opt::new("message").alias("m"))
        .key_value(Opt::new("trailers").as_flag("--trailer"))
        .metadata(Opt::new("timeout").types([ValueType::Integer, ValueType::Float]))
        .operand(Operand::new("paths").repeatable().separator("--"))
        .build()
        .unwrap()
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[test]
fn simple_flags() {
    let spec = Specification::builder()
        .flag(Opt::new("force"))
        .value(Opt::new("branch").inline())
        .build()
        .unwrap();
    let bound = spec
        .bind_named(&NamedArgs::new().set("force", true).set("branch", "main"))
        .unwrap();
    assert_eq!(tokens(&bound), vec!["--force", "--branch=main"]);
}

#[test]
fn short_negatable_flag_negates_to_long_form() {
    let spec = Specification::builder()
        .flag(Opt::new("f").negatable())
        .build()
        .unwrap();
    let bound = spec.bind_named(&NamedArgs::new().set("f", false)).unwrap();
    assert_eq!(tokens(&bound), vec!["--no-f"]);
}

#[test]
fn key_value_repetition() {
    let spec = Specification::builder()
        .key_value(Opt::new("trailers").as_flag("--trailer"))
        .build()
        .unwrap();
    let trailers: ArgValue = vec![("Signed-off-by".to_string(), vec!["John", "Jane"])]
        .into_iter()
        .collect();
    let bound = spec
        .bind_named(&NamedArgs::new().set("trailers", trailers))
        .unwrap();
    assert_eq!(
        tokens(&bound),
        vec![
            "--trailer",
            "Signed-off-by=John",
            "--trailer",
            "Signed-off-by=Jane"
        ]
    );
}

#[test]
fn conflicting_options_are_named() {
    let spec = Specification::builder()
        .flag(Opt::new("all"))
        .flag(Opt::new("patch"))
        .conflicts(["all", "patch"])
        .build()
        .unwrap();
    let err = spec
        .bind_named(&NamedArgs::new().set("all", true).set("patch", true))
        .unwrap_err();
    assert_eq!(
        err,
        BindError::Conflict {
            first: "all".into(),
            second: "patch".into()
        }
    );
    assert!(err.to_string().contains("all"));
    assert!(err.to_string().contains("patch"));
}

#[test]
fn leading_and_trailing_with_repeatable() {
    let spec = Specification::builder()
        .operand(Operand::new("a").default("A"))
        .operand(Operand::new("middle").repeatable())
        .operand(Operand::new("b").required())
        .build()
        .unwrap();

    let bound = spec.bind(&["x".into()], &NamedArgs::new()).unwrap();
    assert_eq!(bound.operand("a"), Some(&ArgValue::from("A")));
    assert_eq!(bound.operand("middle"), Some(&ArgValue::List(vec![])));
    assert_eq!(bound.operand("b"), Some(&ArgValue::from("x")));
    assert_eq!(tokens(&bound), vec!["A", "x"]);

    let bound = spec
        .bind(&["x".into(), "y".into()], &NamedArgs::new())
        .unwrap();
    assert_eq!(bound.operand("a"), Some(&ArgValue::from("x")));
    assert_eq!(bound.operand("middle"), Some(&ArgValue::List(vec![])));
    assert_eq!(bound.operand("b"), Some(&ArgValue::from("y")));

    let bound = spec
        .bind(&["x".into(), "m".into(), "y".into()], &NamedArgs::new())
        .unwrap();
    assert_eq!(bound.operand("middle"), Some(&ArgValue::from(vec!["m"])));
    assert_eq!(tokens(&bound), vec!["x", "m", "y"]);
}

// =============================================================================
// PROPERTIES
// =============================================================================

#[test]
fn output_follows_declaration_order_not_caller_order() {
    let spec = commit_spec();
    let named = NamedArgs::new()
        .set("message", "msg")
        .set("all", true)
        .set("force", true);
    let bound = spec.bind(&["a.txt".into()], &named).unwrap();
    assert_eq!(
        tokens(&bound),
        vec!["commit", "--all", "--force", "--message", "msg", "--", "a.txt"]
    );
}

#[test]
fn aliases_render_identically() {
    let spec = commit_spec();
    let via_long = spec
        .bind_named(&NamedArgs::new().set("message", "x"))
        .unwrap();
    let via_short = spec.bind_named(&NamedArgs::new().set("m", "x")).unwrap();
    assert_eq!(via_long.tokens(), via_short.tokens());

    let via_long = spec
        .bind_named(&NamedArgs::new().set("gpg_sign", "KEY"))
        .unwrap();
    let via_short = spec.bind_named(&NamedArgs::new().set("S", "KEY")).unwrap();
    assert_eq!(via_long.tokens(), via_short.tokens());
}

#[test]
fn binding_twice_is_deterministic() {
    let spec = commit_spec();
    let named = NamedArgs::new().set("branch", "main").set("verify", false);
    let first = spec.bind_named(&named).unwrap();
    let second = spec.bind_named(&named).unwrap();
    assert_eq!(first.tokens(), second.tokens());
}

#[test]
fn nil_contributes_no_tokens() {
    let spec = commit_spec();
    let named = NamedArgs::new()
        .set("all", ArgValue::Nil)
        .set("branch", ArgValue::Nil)
        .set("gpg_sign", ArgValue::Nil)
        .set("message", ArgValue::Nil)
        .set("trailers", ArgValue::Nil)
        .set("timeout", ArgValue::Nil);
    let bound = spec.bind_named(&named).unwrap();
    assert_eq!(tokens(&bound), vec!["commit"]);
}

#[test]
fn concurrent_binds_share_one_spec() {
    let spec = commit_spec();
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let spec = spec.clone();
            std::thread::spawn(move || {
                let named = NamedArgs::new().set("message", format!("msg {i}"));
                spec.bind_named(&named).unwrap().into_tokens()
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let out = handle.join().unwrap();
        assert_eq!(out, vec!["commit".to_string(), "--message".into(), format!("msg {i}")]);
    }
}

// =============================================================================
// VALIDATION ERRORS
// =============================================================================

#[test]
fn unsupported_keys_fail_before_rendering() {
    let err = commit_spec()
        .bind_named(&NamedArgs::new().set("bogus", true))
        .unwrap_err();
    assert_eq!(err.to_string(), "Unsupported options: bogus");
}

#[test]
fn alias_collision_is_rejected() {
    let err = commit_spec()
        .bind_named(&NamedArgs::new().set("message", "a").set("m", "b"))
        .unwrap_err();
    assert!(matches!(err, BindError::AliasCollision { .. }));
}

#[test]
fn required_allow_nil_accepts_nil() {
    let spec = Specification::builder()
        .value(Opt::new("upstream").required().allow_nil())
        .build()
        .unwrap();
    let bound = spec
        .bind_named(&NamedArgs::new().set("upstream", ArgValue::Nil))
        .unwrap();
    assert!(bound.tokens().is_empty());

    let err = spec.bind_named(&NamedArgs::new()).unwrap_err();
    assert_eq!(err.to_string(), "Missing required option: upstream");
}

#[test]
fn custom_validator_runs_on_non_nil_only() {
    let spec = Specification::builder()
        .value(Opt::new("depth").validator(|v| v.as_int().is_some_and(|d| d > 0)))
        .build()
        .unwrap();
    assert!(spec.bind_named(&NamedArgs::new().set("depth", ArgValue::Nil)).is_ok());
    assert!(spec.bind_named(&NamedArgs::new().set("depth", 3)).is_ok());
    let err = spec
        .bind_named(&NamedArgs::new().set("depth", 0))
        .unwrap_err();
    assert!(matches!(err, BindError::ValidatorRejected { .. }));
}

#[test]
fn requires_one_of_group() {
    let spec = Specification::builder()
        .value(Opt::new("message").alias("m"))
        .value(Opt::new("file").alias("F"))
        .requires_one_of(["message", "file"])
        .build()
        .unwrap();
    let err = spec.bind_named(&NamedArgs::new()).unwrap_err();
    assert_eq!(err.to_string(), "Missing required one of: message, file");
    assert!(spec.bind_named(&NamedArgs::new().set("F", "msg.txt")).is_ok());
}

#[test]
fn unexpected_positionals_are_reported() {
    let spec = Specification::builder()
        .literal("show")
        .operand(Operand::new("rev"))
        .build()
        .unwrap();
    let err = spec
        .bind(&["HEAD".into(), "extra".into()], &NamedArgs::new())
        .unwrap_err();
    assert!(matches!(err, BindError::UnexpectedArguments { .. }));
}

// =============================================================================
// CUSTOM AND METADATA
// =============================================================================

#[test]
fn custom_builder_tokens_are_spliced_in_place() {
    let spec = Specification::builder()
        .literal("log")
        .custom(Opt::new("range"), |v| match v.as_list() {
            Some([from, to]) => CustomTokens::One(format!(
                "{}..{}",
                from.to_token().unwrap_or_default(),
                to.to_token().unwrap_or_default()
            )),
            _ => CustomTokens::None,
        })
        .custom(Opt::new("format"), |v| {
            vec!["--format".to_string(), v.to_token().unwrap_or_default()]
        })
        .build()
        .unwrap();
    let named = NamedArgs::new()
        .set("range", vec!["main", "topic"])
        .set("format", "%H");
    let bound = spec.bind_named(&named).unwrap();
    assert_eq!(tokens(&bound), vec!["log", "main..topic", "--format", "%H"]);
}

#[test]
fn timeout_becomes_execution_option() {
    let bound = commit_spec()
        .bind_named(&NamedArgs::new().set("timeout", 30))
        .unwrap();
    assert_eq!(tokens(&bound), vec!["commit"]);
    assert_eq!(
        bound.execution_options().unwrap().timeout,
        Some(std::time::Duration::from_secs(30))
    );
}

#[test]
fn oversized_timeout_is_an_error_not_a_panic() {
    let bound = commit_spec()
        .bind_named(&NamedArgs::new().set("timeout", 1e30))
        .unwrap();
    let err = bound.execution_options().unwrap_err();
    assert!(matches!(err, BindError::InvalidValue { ref name, .. } if name == "timeout"));

    let bound = commit_spec()
        .bind_named(&NamedArgs::new().set("timeout", -5))
        .unwrap();
    assert!(bound.execution_options().is_err());
}
