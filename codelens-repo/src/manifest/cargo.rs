//! Cargo.toml

use super::{parse_toml_table, toml_version, ParsedManifest};
use codelens_core::{DependencyKind, ManifestFormat};
use toml::{Table, Value};

const SECTIONS: [(&str, DependencyKind); 3] = [
    ("dependencies", DependencyKind::Production),
    ("dev-dependencies", DependencyKind::Development),
    ("build-dependencies", DependencyKind::Development),
];

pub(crate) fn parse_cargo_toml(content: &str) -> Result<ParsedManifest, String> {
    let document = parse_toml_table(content)?;
    let mut parsed = ParsedManifest::default();

    collect_sections(&document, "", &mut parsed);

    if let Some(workspace) = document.get("workspace").and_then(Value::as_table) {
        collect_table(
            workspace,
            "dependencies",
            "workspace.",
            DependencyKind::Production,
            &mut parsed,
        );
    }

    // [target.'cfg(unix)'.dependencies] and friends
    if let Some(targets) = document.get("target").and_then(Value::as_table) {
        for (target, table) in targets {
            if let Some(table) = table.as_table() {
                collect_sections(table, &format!("target.{}.", target), &mut parsed);
            }
        }
    }

    Ok(parsed)
}

fn collect_sections(table: &Table, prefix: &str, parsed: &mut ParsedManifest) {
    for (section, kind) in SECTIONS {
        collect_table(table, section, prefix, kind, parsed);
    }
}

fn collect_table(
    table: &Table,
    section: &str,
    prefix: &str,
    kind: DependencyKind,
    parsed: &mut ParsedManifest,
) {
    let Some(value) = table.get(section) else {
        return;
    };
    let Some(entries) = value.as_table() else {
        parsed.reject(format!("{}{}: expected a table", prefix, section));
        return;
    };

    for (name, value) in entries {
        // `foo = { package = "bar" }` renames the dependency; the key is what the code uses
        match toml_version(value) {
            Ok(version) => parsed.push(name, version, kind, ManifestFormat::Cargo),
            Err(()) => parsed.reject(format!("{}{}.{}: unsupported value", prefix, section, name)),
        }
    }
}
