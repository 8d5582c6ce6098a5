//! Per-language namespace derivation.
//!
//! A default namespace is declared once as a dotted domain plus a
//! slash-separated path, and expanded into one namespace per target
//! language. For `company.com` and `Foo/Bar`:
//!
//! ```text
//! java     com.company.foo.bar
//! csharp   Company.Foo.Bar
//! go       com.company/foo/bar
//! js       foo.bar
//! python   foo.bar
//! php      FooBar
//! ruby     FooBar
//! asp      FooBar
//! ios      BAR
//! ```

use crate::error::IdlError;
use std::collections::BTreeMap;

/// Key under which the raw `domain/ns` default declaration is recorded.
pub const DEFAULT_NAMESPACE_KEY: &str = "#default";

/// Language exempt from the namespace completeness check.
pub const TEST_LANGUAGE: &str = "test";

/// Languages that receive a derived default namespace.
pub const LANGUAGES: [&str; 9] = [
    "java", "csharp", "asp", "js", "python", "ruby", "ios", "go", "php",
];

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn segments(raw: &str, separator: char) -> Option<Vec<String>> {
    raw.split(separator)
        .map(str::trim)
        .map(|s| (!s.is_empty()).then(|| capitalize(s)))
        .collect()
}

/// Expand a default namespace declaration into per-language namespaces.
pub fn derive_default_namespaces(
    domain: &str,
    namespace: &str,
) -> Result<BTreeMap<&'static str, String>, IdlError> {
    let mut domain_parts = segments(domain, '.')
        .filter(|parts| parts.len() >= 2)
        .ok_or_else(|| IdlError::InvalidDomain {
            domain: domain.to_string(),
        })?;
    domain_parts.reverse();
    let path = segments(namespace, '/').ok_or_else(|| IdlError::InvalidNamespace {
        namespace: namespace.to_string(),
    })?;

    let reversed_domain = domain_parts.join(".");
    let company = domain_parts.last().cloned().unwrap_or_default();
    let joined = path.join("");
    let last = path.last().cloned().unwrap_or_default();
    let prefix: String = last.chars().take(3).collect();

    let mut out = BTreeMap::new();
    out.insert(
        "java",
        format!("{reversed_domain}.{}", path.join(".")).to_lowercase(),
    );
    out.insert("csharp", format!("{company}.{}", path.join(".")));
    out.insert("asp", joined.clone());
    out.insert("js", path.join(".").to_lowercase());
    out.insert("python", path.join(".").to_lowercase());
    out.insert("ruby", joined.clone());
    out.insert("ios", prefix.to_uppercase());
    out.insert(
        "go",
        format!("{reversed_domain}/{}", path.join("/")).to_lowercase(),
    );
    out.insert("php", joined);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_every_language() {
        let ns = derive_default_namespaces("company.com", "Foo/Bar").expect("valid input");
        assert_eq!(ns.len(), LANGUAGES.len());
        assert_eq!(ns["java"], "com.company.foo.bar");
        assert_eq!(ns["csharp"], "Company.Foo.Bar");
        assert_eq!(ns["go"], "com.company/foo/bar");
        assert_eq!(ns["js"], "foo.bar");
        assert_eq!(ns["python"], "foo.bar");
        assert_eq!(ns["php"], "FooBar");
        assert_eq!(ns["ruby"], "FooBar");
        assert_eq!(ns["asp"], "FooBar");
        assert_eq!(ns["ios"], "BAR");
    }

    #[test]
    fn lowercase_segments_are_capitalized() {
        let ns = derive_default_namespaces(" acme.co.uk ", "billing / v2").expect("valid");
        assert_eq!(ns["csharp"], "Acme.Billing.V2");
        assert_eq!(ns["java"], "uk.co.acme.billing.v2");
        assert_eq!(ns["ios"], "V2");
    }

    #[test]
    fn rejects_short_or_empty_domains() {
        assert!(matches!(
            derive_default_namespaces("localhost", "Foo"),
            Err(IdlError::InvalidDomain { .. })
        ));
        assert!(matches!(
            derive_default_namespaces("company..com", "Foo"),
            Err(IdlError::InvalidDomain { .. })
        ));
    }

    #[test]
    fn rejects_empty_namespace_segments() {
        assert!(matches!(
            derive_default_namespaces("company.com", "Foo//Bar"),
            Err(IdlError::InvalidNamespace { .. })
        ));
        assert!(matches!(
            derive_default_namespaces("company.com", ""),
            Err(IdlError::InvalidNamespace { .. })
        ));
    }
}
