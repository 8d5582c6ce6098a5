//! Integration tests: bind a validated service the way the gateway does.

use babel_idl::{Attribute, Idl, TEST_LANGUAGE, Type, Value};
use babel_rest::{
    HttpMethod, ListFormat, ParmIn, REST_SCOPE, ResponseCode, bind_service, coerce, read_op,
};
use serde_json::json;

fn s(v: &str) -> Value {
    Value::String(v.to_string())
}

fn rest(name: &str) -> Attribute {
    Attribute::new(REST_SCOPE, name)
}

/// Service `A` with one method declaring three responses and two headers,
/// and one method with path and query parameters.
fn service_idl() -> Idl {
    let mut idl = Idl::new("testfile.babel");
    let svc = idl.add_service("A").expect("service");
    {
        let m = svc
            .add_method(Type::named("string"), "testHeaders")
            .expect("testHeaders");
        m.add_attribute(rest("Op").with("Method", s("get")).with("Path", s("/test/headers")));
        m.add_attribute(
            rest("Header")
                .with("Name", s("Foo"))
                .with("Type", s("string"))
                .with("Desc", s("Some header")),
        );
        m.add_attribute(
            rest("Header")
                .with("Name", s("Bar"))
                .with("Type", s("list<string>"))
                .with("Desc", s("Some other header"))
                .with("Format", s("csv")),
        );
        m.add_attribute(
            rest("Response")
                .with("Code", Value::Int(201))
                .with("Type", s("list<string>"))
                .with("Headers", s("Foo")),
        );
        m.add_attribute(
            rest("Response")
                .with("Code", Value::Int(0))
                .with("Headers", s("Foo, Bar")),
        );
        m.add_attribute(
            rest("Response")
                .with("Code", Value::Int(202))
                .with("Headers", s(" Bar ,")),
        );
    }
    {
        let m = svc
            .add_method(Type::named("string"), "testParms")
            .expect("testParms");
        m.add_attribute(
            rest("Op")
                .with("Method", s("POST"))
                .with("Path", s("/test/{a}/parms"))
                .with("Deprecated", Value::Bool(true)),
        );
        m.add_attribute(rest("Response").with("Code", Value::Int(202)));
        m.add_parameter(Type::named("int32"), "a")
            .expect("a")
            .add_attribute(
                rest("Parm")
                    .with("In", s("PATH"))
                    .with("Required", Value::Bool(true))
                    .with("Name", s("A")),
            );
        m.add_parameter(Type::list(Type::named("int64")), "b")
            .expect("b")
            .add_attribute(rest("Parm").with("Format", s("pipes")));
    }
    idl
}

#[test]
fn headers_are_wired_into_each_response() {
    let idl = service_idl();
    let sealed = idl.seal(TEST_LANGUAGE).expect("valid idl");
    let svc = sealed.find_service("A").expect("service A");
    let op = read_op(svc.method("testHeaders").expect("method")).expect("operation");

    assert_eq!(op.method, HttpMethod::Get);
    assert!(!op.deprecated);
    assert_eq!(op.path, "/test/headers");
    assert_eq!(op.responses.len(), 3);

    let created = &op.responses[&ResponseCode::Code(201)];
    assert_eq!(created.ty.to_string(), "list<string>");
    assert_eq!(created.headers.keys().collect::<Vec<_>>(), vec!["Foo"]);
    assert_eq!(created.headers["Foo"].desc, "Some header");
    assert_eq!(created.headers["Foo"].format, ListFormat::None);

    let zero = &op.responses[&ResponseCode::Code(0)];
    assert_eq!(zero.ty.to_string(), "string");
    assert_eq!(zero.headers.len(), 2);
    assert_eq!(zero.headers["Bar"].ty.to_string(), "list<string>");
    assert_eq!(zero.headers["Bar"].format, ListFormat::Csv);

    let accepted = &op.responses[&ResponseCode::Code(202)];
    assert_eq!(accepted.headers.keys().collect::<Vec<_>>(), vec!["Bar"]);
}

#[test]
fn parameters_bind_and_coerce() {
    let idl = service_idl();
    let svc = idl.find_service("A").expect("service A");
    let bindings = bind_service(svc).expect("bindings");
    let parms = &bindings[1];
    assert_eq!(parms.operation.method, HttpMethod::Post);
    assert!(parms.operation.deprecated);
    assert_eq!(parms.operation.path, "/test/{a}/parms");
    assert!(parms.operation.responses.contains_key(&ResponseCode::Code(202)));

    let a = &parms.parameters[0];
    assert_eq!(a.parm.location, ParmIn::Path);
    assert!(a.parm.required);
    assert_eq!(a.parm.name, "A");
    assert_eq!(
        coerce(&idl, &a.ty, &["7"], a.parm.format),
        Ok(json!(7))
    );

    let b = &parms.parameters[1];
    assert_eq!(b.parm.location, ParmIn::Query);
    assert_eq!(b.parm.format, ListFormat::Pipes);
    assert_eq!(b.parm.name, "b");
    assert_eq!(
        coerce(&idl, &b.ty, &["1|2"], b.parm.format),
        Ok(json!(["1", "2"]))
    );
}

#[test]
fn bindings_serialize_for_exporters() {
    let idl = service_idl();
    let svc = idl.find_service("A").expect("service A");
    let bindings = bind_service(svc).expect("bindings");
    let json = serde_json::to_value(&bindings[1].parameters[0].parm).expect("parm serializes");
    assert_eq!(
        json,
        json!({"in": "path", "required": true, "format": "NONE", "name": "A"})
    );
}
