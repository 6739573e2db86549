//! package.json

use super::ParsedManifest;
use codelens_core::{DependencyKind, ManifestFormat};
use serde_json::Value;

const SECTIONS: [(&str, DependencyKind); 2] = [
    ("dependencies", DependencyKind::Production),
    ("devDependencies", DependencyKind::Development),
];

pub(crate) fn parse_package_json(content: &str) -> Result<ParsedManifest, String> {
    let document: Value = serde_json::from_str(content).map_err(|e| e.to_string())?;
    let Value::Object(root) = document else {
        return Err("package.json is not a JSON object".to_string());
    };

    let mut parsed = ParsedManifest::default();
    for (section, kind) in SECTIONS {
        match root.get(section) {
            None | Some(Value::Null) => {}
            Some(Value::Object(entries)) => {
                for (name, version) in entries {
                    match version {
                        Value::String(version) => {
                            parsed.push(name, Some(version.clone()), kind, ManifestFormat::PackageJson)
                        }
                        other => parsed.reject(format!(
                            "{}.{}: version must be a string, got {}",
                            section, name, other
                        )),
                    }
                }
            }
            Some(_) => parsed.reject(format!("{}: expected an object", section)),
        }
    }

    Ok(parsed)
}
