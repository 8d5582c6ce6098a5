//! The type-string grammar used by `Response.Type` and `Header.Type`.
//!
//! ```text
//! type := "map" "<" type "," type ">"     key must be a scalar primitive
//!       | "list" "<" type ">"
//!       | identifier
//! ```
//!
//! Whitespace is allowed around every token. The comma of a map splits at
//! bracket depth zero, so `map<string, map<string,int32>>` nests correctly.
//! `void` may only stand alone; lists and maps cannot hold it.

use crate::error::RestError;
use babel_idl::Type;
use regex::Regex;
use std::sync::OnceLock;

fn map_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*map\s*<(.*)>\s*$").expect("map type regex must compile"))
}

fn list_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*list\s*<(.*)>\s*$").expect("list type regex must compile"))
}

fn basic_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(\w+)\s*$").expect("basic type regex must compile"))
}

/// Parse a type string into a [`Type`].
pub fn parse_type(input: &str) -> Result<Type, RestError> {
    check_balanced(input)
        .and_then(|()| parse_fragment(input))
        .map_err(|reason| RestError::TypeGrammar {
            input: input.to_string(),
            reason,
        })
}

fn check_balanced(input: &str) -> Result<(), String> {
    let mut depth = 0usize;
    for c in input.chars() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| "unexpected '>'".to_string())?;
            }
            _ => {}
        }
    }
    if depth == 0 {
        Ok(())
    } else {
        Err("unclosed '<'".to_string())
    }
}

fn parse_fragment(s: &str) -> Result<Type, String> {
    if let Some(caps) = map_re().captures(s) {
        let inner = caps.get(1).map_or("", |m| m.as_str());
        let split = find_split(inner).ok_or_else(|| format!("unable to break key/value: {s}"))?;
        let key = parse_fragment(&inner[..split])?;
        let key = key
            .as_primitive()
            .filter(|p| p.is_scalar())
            .ok_or_else(|| format!("key type must be a primitive type: {s}"))?;
        let value = parse_element(&inner[split + 1..], s)?;
        return Ok(Type::map(key, value));
    }
    if let Some(caps) = list_re().captures(s) {
        let inner = caps.get(1).map_or("", |m| m.as_str());
        return Ok(Type::list(parse_element(inner, s)?));
    }
    if let Some(caps) = basic_re().captures(s) {
        let name = caps.get(1).map_or("", |m| m.as_str());
        return Ok(Type::named(name));
    }
    Err(format!("not a type: {:?}", s.trim()))
}

/// Value type of a list or map.
fn parse_element(s: &str, outer: &str) -> Result<Type, String> {
    let element = parse_fragment(s)?;
    if element.is_void() {
        return Err(format!("void cannot be held by a collection: {}", outer.trim()));
    }
    Ok(element)
}

/// Byte offset of the first comma outside any nested `<...>`.
fn find_split(s: &str) -> Option<usize> {
    let mut depth = 0i32;
    for (i, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth -= 1,
            ',' if depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use babel_idl::Primitive;

    #[test]
    fn canonical_form_matches_whitespace_stripped_input() {
        let cases = [
            "bool",
            "int64",
            "list<int64>",
            "list<C>",
            "C",
            "map<string,int32>",
            " map < string , list <   string > >  ",
            "map<string , map<string, map<string, list<string> > > >",
        ];
        for case in cases {
            let ty = parse_type(case).unwrap_or_else(|e| panic!("{case:?} must parse: {e}"));
            assert_eq!(ty.to_string(), case.replace(' ', ""), "round trip of {case:?}");
        }
    }

    #[test]
    fn malformed_strings_are_rejected() {
        let cases = [
            " map < string , list <<   string > >  ",
            "list<>",
            "< > ",
            "< > list",
            "< string >",
            "int64  string",
            "list<int64>, string",
            "list<list<int32>",
            "map<string,int32>>",
            "",
        ];
        for case in cases {
            assert!(parse_type(case).is_err(), "{case:?} must not parse");
        }
    }

    #[test]
    fn nested_maps_are_structural() {
        let ty = parse_type("map<string, map<int32, list<Foo>>>").expect("valid");
        assert_eq!(ty.key_type(), Some(Primitive::String));
        let inner = ty.value_type().expect("map value");
        assert_eq!(inner.key_type(), Some(Primitive::Int32));
        let list = inner.value_type().expect("inner map value");
        assert!(list.is_list());
        assert!(list.value_type().is_some_and(|t| t.is_user_defined()));
    }

    #[test]
    fn map_keys_must_be_scalar_primitives() {
        for case in ["map<Foo,string>", "map<list<int32>,string>", "map<binary,string>"] {
            let err = parse_type(case).expect_err("non-primitive key");
            assert!(
                err.to_string().contains("key type must be a primitive type"),
                "{case}: {err}"
            );
        }
    }

    #[test]
    fn void_stands_alone_only() {
        assert!(parse_type(" void ").expect("bare void").is_void());
        for case in ["list<void>", "map<string, void>", "map<string, list<void>>"] {
            let err = parse_type(case).expect_err("void element");
            assert!(
                err.to_string().contains("void cannot be held by a collection"),
                "{case}: {err}"
            );
        }
    }

    #[test]
    fn error_names_the_input() {
        let err = parse_type("list<>").expect_err("empty list");
        insta::assert_snapshot!(err.to_string(), @r#"unable to parse type "list<>": not a type: """#);
    }
}
