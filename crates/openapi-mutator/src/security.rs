//! Removing security declarations and injecting bearer auth

use serde_yaml::{Mapping, Value};
use tracing::{info, warn};

use crate::document::Document;
use crate::types::BEARER_SCHEME_NAME;

const SECURITY_KEY: &str = "security";
const COMPONENTS_KEY: &str = "components";
const SECURITY_SCHEMES_KEY: &str = "securitySchemes";

/// Which security edits to perform
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SecurityOptions {
    /// Delete `security` and `components.securitySchemes`
    pub remove_existing: bool,
    /// Ensure the `BearerAuth` scheme and global requirement exist
    pub add_bearer: bool,
}

/// What [`apply_security_mutations`] did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SecurityReport {
    pub removed_existing: bool,
    pub bearer_scheme_added: bool,
    pub bearer_requirement_added: bool,
}

/// Run removal, then injection. Enabling both leaves bearer auth as the only
/// security declared.
pub fn apply_security_mutations(doc: &mut Document, options: &SecurityOptions) -> SecurityReport {
    let mut report = SecurityReport::default();

    if options.remove_existing {
        report.removed_existing = remove_security(doc);
        if !report.removed_existing {
            info!("ST2138_REMOVE_SECURITY set but no security blocks were present");
        }
    }

    if options.add_bearer {
        let (scheme_added, requirement_added) = inject_bearer_auth(doc);
        report.bearer_scheme_added = scheme_added;
        report.bearer_requirement_added = requirement_added;
    }

    report
}

/// Delete the global `security` field and `components.securitySchemes`.
///
/// Returns whether anything was removed.
pub fn remove_security(doc: &mut Document) -> bool {
    let root = doc.root_mut();
    let mut removed_any = false;

    if root.shift_remove(SECURITY_KEY).is_some() {
        info!("Removed global security section");
        removed_any = true;
    }

    if let Some(Value::Mapping(components)) = root.get_mut(COMPONENTS_KEY) {
        if components.shift_remove(SECURITY_SCHEMES_KEY).is_some() {
            info!("Removed components.securitySchemes");
            removed_any = true;
        }
    }

    removed_any
}

/// Ensure `components.securitySchemes.BearerAuth` and a global
/// `{BearerAuth: []}` requirement exist without duplicating either.
///
/// An existing `BearerAuth` scheme is left as is. Returns
/// `(scheme_added, requirement_added)`.
pub fn inject_bearer_auth(doc: &mut Document) -> (bool, bool) {
    let root = doc.root_mut();

    let components = mapping_entry(root, COMPONENTS_KEY);
    let schemes = mapping_entry(components, SECURITY_SCHEMES_KEY);
    let scheme_added = if schemes.contains_key(BEARER_SCHEME_NAME) {
        false
    } else {
        schemes.insert(Value::from(BEARER_SCHEME_NAME), bearer_scheme());
        info!("Injected components.securitySchemes.{}", BEARER_SCHEME_NAME);
        true
    };

    let security = sequence_entry(root, SECURITY_KEY);
    let already_required = security.iter().any(|requirement| {
        requirement
            .as_mapping()
            .is_some_and(|m| m.contains_key(BEARER_SCHEME_NAME))
    });
    let requirement_added = if already_required {
        false
    } else {
        let mut requirement = Mapping::new();
        requirement.insert(Value::from(BEARER_SCHEME_NAME), Value::Sequence(Vec::new()));
        security.push(Value::Mapping(requirement));
        info!("Added global security requirement {}", BEARER_SCHEME_NAME);
        true
    };

    (scheme_added, requirement_added)
}

fn bearer_scheme() -> Value {
    let mut scheme = Mapping::new();
    scheme.insert(Value::from("type"), Value::from("http"));
    scheme.insert(Value::from("scheme"), Value::from("bearer"));
    scheme.insert(Value::from("bearerFormat"), Value::from("JWT"));
    Value::Mapping(scheme)
}

/// Get `parent[key]` as a mapping, creating it (or replacing a value of another shape)
fn mapping_entry<'a>(parent: &'a mut Mapping, key: &str) -> &'a mut Mapping {
    let slot = parent
        .entry(Value::from(key))
        .or_insert_with(|| Value::Mapping(Mapping::new()));
    if !slot.is_mapping() {
        warn!("Replacing non-mapping {} with an empty mapping", key);
        *slot = Value::Mapping(Mapping::new());
    }
    let Value::Mapping(map) = slot else {
        unreachable!("{key} was just set to a mapping");
    };
    map
}

/// Get `parent[key]` as a sequence, creating it (or replacing a value of another shape)
fn sequence_entry<'a>(parent: &'a mut Mapping, key: &str) -> &'a mut Vec<Value> {
    let slot = parent
        .entry(Value::from(key))
        .or_insert_with(|| Value::Sequence(Vec::new()));
    if !slot.is_sequence() {
        warn!("Replacing non-list {} with an empty list", key);
        *slot = Value::Sequence(Vec::new());
    }
    let Value::Sequence(seq) = slot else {
        unreachable!("{key} was just set to a sequence");
    };
    seq
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECURED_SPEC: &str = r#"
openapi: "3.0.0"
info:
  title: Device API
  version: "1.0.0"
security:
  - ApiKeyAuth: []
paths: {}
components:
  schemas:
    Device:
      type: object
  securitySchemes:
    ApiKeyAuth:
      type: apiKey
      in: header
      name: X-API-Key
"#;

    fn schemes(doc: &Document) -> Vec<String> {
        doc.get(COMPONENTS_KEY)
            .and_then(|c| c.get(SECURITY_SCHEMES_KEY))
            .and_then(Value::as_mapping)
            .map(|m| m.keys().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn requirements(doc: &Document) -> Vec<String> {
        doc.get(SECURITY_KEY)
            .and_then(Value::as_sequence)
            .map(|seq| {
                seq.iter()
                    .filter_map(Value::as_mapping)
                    .flat_map(|m| m.keys().filter_map(Value::as_str).map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn test_no_options_leaves_document_untouched() {
        let mut doc = Document::parse(SECURED_SPEC).unwrap();
        let original = doc.clone();

        let report = apply_security_mutations(&mut doc, &SecurityOptions::default());

        assert_eq!(doc, original);
        assert_eq!(report, SecurityReport::default());
    }

    #[test]
    fn test_remove_security() {
        let mut doc = Document::parse(SECURED_SPEC).unwrap();

        assert!(remove_security(&mut doc));

        assert!(doc.get(SECURITY_KEY).is_none());
        assert!(schemes(&doc).is_empty());
        // sibling components survive, key order intact
        let components = doc.get(COMPONENTS_KEY).unwrap();
        assert!(components.get("schemas").is_some());
        let keys: Vec<_> = doc.root().keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, vec!["openapi", "info", "paths", "components"]);
    }

    #[test]
    fn test_remove_security_when_absent() {
        let mut doc = Document::parse("openapi: 3.0.0\ncomponents: []\n").unwrap();

        let report = apply_security_mutations(
            &mut doc,
            &SecurityOptions {
                remove_existing: true,
                add_bearer: false,
            },
        );

        assert!(!report.removed_existing);
    }

    #[test]
    fn test_inject_bearer_into_bare_document() {
        let mut doc = Document::parse("openapi: 3.0.0\npaths: {}\n").unwrap();

        assert_eq!(inject_bearer_auth(&mut doc), (true, true));

        let scheme = doc
            .get(COMPONENTS_KEY)
            .and_then(|c| c.get(SECURITY_SCHEMES_KEY))
            .and_then(|s| s.get(BEARER_SCHEME_NAME))
            .unwrap();
        assert_eq!(scheme.get("type").and_then(Value::as_str), Some("http"));
        assert_eq!(scheme.get("scheme").and_then(Value::as_str), Some("bearer"));
        assert_eq!(scheme.get("bearerFormat").and_then(Value::as_str), Some("JWT"));

        let security = doc.get(SECURITY_KEY).and_then(Value::as_sequence).unwrap();
        assert_eq!(security.len(), 1);
        let scopes = security[0].get(BEARER_SCHEME_NAME).and_then(Value::as_sequence);
        assert_eq!(scopes.map(Vec::len), Some(0));
    }

    #[test]
    fn test_inject_bearer_twice_is_stable() {
        let mut doc = Document::parse(SECURED_SPEC).unwrap();

        assert_eq!(inject_bearer_auth(&mut doc), (true, true));
        let once = doc.clone();
        assert_eq!(inject_bearer_auth(&mut doc), (false, false));

        assert_eq!(doc, once);
        assert_eq!(schemes(&doc), vec!["ApiKeyAuth", "BearerAuth"]);
        assert_eq!(requirements(&doc), vec!["ApiKeyAuth", "BearerAuth"]);
    }

    #[test]
    fn test_inject_keeps_existing_bearer_scheme() {
        let yaml = r#"
components:
  securitySchemes:
    BearerAuth:
      type: http
      scheme: bearer
      bearerFormat: opaque
security:
  - BearerAuth: []
    ApiKeyAuth: []
"#;
        let mut doc = Document::parse(yaml).unwrap();

        assert_eq!(inject_bearer_auth(&mut doc), (false, false));

        let format = doc
            .get(COMPONENTS_KEY)
            .and_then(|c| c.get(SECURITY_SCHEMES_KEY))
            .and_then(|s| s.get(BEARER_SCHEME_NAME))
            .and_then(|b| b.get("bearerFormat"))
            .and_then(Value::as_str);
        assert_eq!(format, Some("opaque"));
        assert_eq!(doc.get(SECURITY_KEY).and_then(Value::as_sequence).map(Vec::len), Some(1));
    }

    #[test]
    fn test_inject_repairs_wrong_shapes() {
        let yaml = "components: none\nsecurity:\n  BearerAuth: []\n";
        let mut doc = Document::parse(yaml).unwrap();

        assert_eq!(inject_bearer_auth(&mut doc), (true, true));

        assert_eq!(schemes(&doc), vec!["BearerAuth"]);
        assert_eq!(requirements(&doc), vec!["BearerAuth"]);
    }

    #[test]
    fn test_remove_then_inject_leaves_only_bearer() {
        let mut doc = Document::parse(SECURED_SPEC).unwrap();

        let report = apply_security_mutations(
            &mut doc,
            &SecurityOptions {
                remove_existing: true,
                add_bearer: true,
            },
        );

        assert!(report.removed_existing);
        assert!(report.bearer_scheme_added);
        assert!(report.bearer_requirement_added);
        assert_eq!(schemes(&doc), vec!["BearerAuth"]);
        assert_eq!(requirements(&doc), vec!["BearerAuth"]);
    }
}
