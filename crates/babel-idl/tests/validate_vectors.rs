//! Integration tests: validate whole trees.
//!
//! Each fixture in tests/fixtures/ has:
//! - case.json: the target language and a serialized Idl tree
//! - expect.json: `{"valid": true}` or the expected error code and message
//!
//! The remaining tests assemble trees through the `add_*` API the way a
//! parser would.

use babel_idl::{Idl, IdlError, Primitive, TEST_LANGUAGE, Type, Value};
use serde_json::{Value as Json, json};
use std::path::PathBuf;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn run_fixture(name: &str) {
    let dir = fixtures_dir().join(name);

    let case_path = dir.join("case.json");
    let expect_path = dir.join("expect.json");

    let case_str = std::fs::read_to_string(&case_path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", case_path.display()));
    let expect_str = std::fs::read_to_string(&expect_path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", expect_path.display()));

    let case: Json = serde_json::from_str(&case_str)
        .unwrap_or_else(|e| panic!("failed to parse {}: {e}", case_path.display()));
    let expected: Json = serde_json::from_str(&expect_str)
        .unwrap_or_else(|e| panic!("failed to parse {}: {e}", expect_path.display()));

    let language = case["language"].as_str().expect("missing language field");
    let idl: Idl = serde_json::from_value(case["idl"].clone())
        .unwrap_or_else(|e| panic!("failed to decode idl in {}: {e}", case_path.display()));

    let result = match idl.validate(language) {
        Ok(()) => json!({"valid": true}),
        Err(err) => json!({
            "valid": false,
            "code": err.code(),
            "message": err.to_string(),
        }),
    };

    assert_eq!(
        result,
        expected,
        "\n\nFixture: {name}\n\nGot:\n{}\n\nExpected:\n{}\n",
        serde_json::to_string_pretty(&result).expect("result must serialize"),
        serde_json::to_string_pretty(&expected).expect("expected must serialize"),
    );
}

#[test]
fn diamond_imports() {
    run_fixture("diamond_imports");
}

#[test]
fn indirect_inheritance_cycle() {
    run_fixture("indirect_inheritance_cycle");
}

#[test]
fn shadowed_ancestor_field() {
    run_fixture("shadowed_ancestor_field");
}

#[test]
fn collision_across_files() {
    run_fixture("collision_across_files");
}

#[test]
fn abstract_parameter_in_list() {
    run_fixture("abstract_parameter_in_list");
}

#[test]
fn enum_reference_not_found() {
    run_fixture("enum_reference_not_found");
}

#[test]
fn enum_reference_resolves() {
    run_fixture("enum_reference_resolves");
}

#[test]
fn import_without_namespace() {
    run_fixture("import_without_namespace");
}

#[test]
fn void_map_value() {
    run_fixture("void_map_value");
}

// ── Assembled trees ─────────────────────────────────────────────────────────

/// A imports B and C; both import D.
fn diamond() -> Idl {
    let mut a = Idl::new("a.babel");
    for branch in ["b.babel", "c.babel"] {
        let child = a.add_import(branch).expect("branch import");
        child
            .add_import("d.babel")
            .expect("shared import")
            .add_struct("Shared")
            .expect("shared struct");
    }
    a
}

#[test]
fn diamond_yields_shared_import_once() {
    let a = diamond();
    let d_count = a
        .unique_imports()
        .iter()
        .filter(|i| i.filename == "d.babel")
        .count();
    assert_eq!(d_count, 1);
    assert_eq!(a.all_structs().len(), 1);
    assert!(a.validate(TEST_LANGUAGE).is_ok());
}

#[test]
fn direct_and_indirect_cycles_terminate() {
    let mut direct = Idl::new("direct.babel");
    direct.add_struct("A").expect("A").extends = Some("a".to_string());
    assert!(matches!(
        direct.validate(TEST_LANGUAGE),
        Err(IdlError::InheritanceCycle { .. })
    ));

    let mut indirect = Idl::new("indirect.babel");
    indirect.add_struct("A").expect("A").extends = Some("B".to_string());
    indirect.add_struct("B").expect("B").extends = Some("A".to_string());
    assert!(matches!(
        indirect.validate(TEST_LANGUAGE),
        Err(IdlError::InheritanceCycle { .. })
    ));
    let a = indirect.find_struct("A").expect("A");
    assert!(matches!(
        a.base_classes(&indirect),
        Err(IdlError::InheritanceCycle { .. })
    ));
}

#[test]
fn shadowing_is_detected_across_an_import() {
    let mut root = Idl::new("child.babel");
    root.add_import("base.babel")
        .expect("import")
        .add_struct("Base")
        .expect("Base")
        .add_field(Type::named("string"), "Name")
        .expect("field");
    let child = root.add_struct("Child").expect("Child");
    child.extends = Some("Base".to_string());
    child
        .add_field(Type::named("int64"), "name")
        .expect("field");

    let err = root.validate(TEST_LANGUAGE).expect_err("must fail");
    insta::assert_snapshot!(err.to_string(), @"field Base.Name redefined somewhere up to Child");
}

#[test]
fn base_and_sub_classes_follow_the_chain() {
    let mut idl = Idl::new("zoo.babel");
    idl.add_struct("Animal").expect("Animal").is_abstract = true;
    idl.add_struct("Mammal").expect("Mammal").extends = Some("Animal".to_string());
    idl.add_struct("Dog").expect("Dog").extends = Some("Mammal".to_string());
    idl.add_struct("Cat").expect("Cat").extends = Some("Mammal".to_string());

    let dog = idl.find_struct("Dog").expect("Dog");
    let bases: Vec<&str> = dog
        .base_classes(&idl)
        .expect("acyclic")
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(bases, vec!["Animal", "Mammal"]);

    let mammal = idl.find_struct("Mammal").expect("Mammal");
    let subs: Vec<&str> = mammal
        .sub_classes(&idl)
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(subs, vec!["Dog", "Cat"]);
    assert!(idl.validate(TEST_LANGUAGE).is_ok());
}

#[test]
fn abstract_return_nested_in_map_is_rejected() {
    let mut idl = Idl::new("draw.babel");
    idl.add_struct("Shape").expect("Shape").is_abstract = true;
    idl.add_service("Draw")
        .expect("service")
        .add_method(
            Type::map(Primitive::String, Type::list(Type::named("Shape"))),
            "byLayer",
        )
        .expect("method");
    assert_eq!(
        idl.validate(TEST_LANGUAGE),
        Err(IdlError::AbstractReturn {
            service: "Draw".to_string(),
            method: "byLayer".to_string(),
        })
    );
}

#[test]
fn const_reference_must_fit_field_type() {
    let mut idl = Idl::new("limits.babel");
    {
        let limits = idl.add_const("Limits").expect("const");
        limits.add("Max", Value::Int(100)).expect("Max");
        limits
            .add("Label", Value::String("cap".to_string()))
            .expect("Label");
    }
    {
        let s = idl.add_struct("Page").expect("struct");
        s.add_field(Type::named("int32"), "size")
            .expect("size")
            .set_initializer(Value::Ref("Limits.Max".to_string()))
            .expect("init");
    }
    assert!(idl.validate(TEST_LANGUAGE).is_ok());

    idl.add_struct("Title")
        .expect("struct")
        .add_field(Type::named("int32"), "text")
        .expect("text")
        .set_initializer(Value::Ref("Limits.Label".to_string()))
        .expect("init");
    let err = idl.validate(TEST_LANGUAGE).expect_err("string const into int32");
    insta::assert_snapshot!(err.to_string(), @"invalid initialization of int32 text: constant Limits.Label is a string");
}

#[test]
fn malformed_reference_is_rejected() {
    let mut idl = Idl::new("bad.babel");
    idl.add_struct("S")
        .expect("struct")
        .add_field(Type::named("int32"), "n")
        .expect("n")
        .set_initializer(Value::Ref("Too.Many.Parts".to_string()))
        .expect("init");
    assert!(matches!(
        idl.validate(TEST_LANGUAGE),
        Err(IdlError::InvalidReference { .. })
    ));
}

#[test]
fn default_namespaces_satisfy_every_language() {
    let mut idl = Idl::new("shop.babel");
    idl.add_namespace("java", "org.shop").expect("explicit");
    idl.add_default_namespace("company.com", "Shop/Api")
        .expect("default");
    idl.add_struct("Order").expect("struct");

    for language in babel_idl::LANGUAGES {
        assert!(
            idl.validate(language).is_ok(),
            "{language} must have a namespace"
        );
    }
    assert_eq!(idl.namespace("java"), Some("org.shop"));
    assert!(matches!(
        idl.validate("cobol"),
        Err(IdlError::NamespaceMissing { .. })
    ));
}

#[test]
fn validated_tree_serializes_like_the_source_tree() {
    let mut idl = Idl::new("tiny.babel");
    idl.add_enum("Flag")
        .expect("enum")
        .add("On", 1)
        .expect("On");
    let plain = serde_json::to_value(&idl).expect("idl must serialize");
    let sealed = idl.seal(TEST_LANGUAGE).expect("valid");
    let frozen = serde_json::to_value(&sealed).expect("sealed must serialize");
    assert_eq!(plain, frozen);
    assert_eq!(frozen["enums"][0]["values"][0]["value"], json!({"kind": "int", "value": 1}));
}
