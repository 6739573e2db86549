//! requirements.txt, Pipfile and pyproject.toml

use super::{parse_toml_table, toml_version, ParsedManifest};
use codelens_core::{DependencyKind, ManifestFormat};
use toml::{Table, Value};

/// Pinned requirements: `name==version` per line, anything else has an unknown version
pub(crate) fn parse_requirements(content: &str) -> ParsedManifest {
    let mut parsed = ParsedManifest::default();

    for (index, raw) in content.lines().enumerate() {
        let line = strip_inline_comment(raw).trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('-') {
            continue;
        }

        let mut parts = line.split("==");
        let name = parts.next().unwrap_or_default().trim();
        let version = parts.next().map(|v| v.trim().to_string());

        if name.is_empty() {
            parsed.reject(format!("line {}: missing package name", index + 1));
            continue;
        }
        parsed.push(name, version, DependencyKind::Production, ManifestFormat::Requirements);
    }

    parsed
}

/// Text before a ` #` comment marker
fn strip_inline_comment(line: &str) -> &str {
    match line.find(" #").or_else(|| line.find("\t#")) {
        Some(index) => &line[..index],
        None => line,
    }
}

pub(crate) fn parse_pipfile(content: &str) -> Result<ParsedManifest, String> {
    let document = parse_toml_table(content)?;
    let mut parsed = ParsedManifest::default();

    for (section, kind) in [
        ("packages", DependencyKind::Production),
        ("dev-packages", DependencyKind::Development),
    ] {
        match document.get(section) {
            None => {}
            Some(Value::Table(entries)) => {
                for (name, value) in entries {
                    match toml_version(value) {
                        // "*" means any version
                        Ok(version) => parsed.push(
                            name,
                            version.filter(|v| v != "*"),
                            kind,
                            ManifestFormat::Pipfile,
                        ),
                        Err(()) => {
                            parsed.reject(format!("{}.{}: unsupported value", section, name))
                        }
                    }
                }
            }
            Some(_) => parsed.reject(format!("{}: expected a table", section)),
        }
    }

    Ok(parsed)
}

pub(crate) fn parse_pyproject(content: &str) -> Result<ParsedManifest, String> {
    let document = parse_toml_table(content)?;
    let mut parsed = ParsedManifest::default();

    if let Some(project) = document.get("project").and_then(Value::as_table) {
        if let Some(value) = project.get("dependencies") {
            requirement_list(value, "project.dependencies", DependencyKind::Production, &mut parsed);
        }
        if let Some(value) = project.get("optional-dependencies") {
            requirement_groups(
                value,
                "project.optional-dependencies",
                DependencyKind::Development,
                &mut parsed,
            );
        }
    }

    if let Some(value) = document.get("dependency-groups") {
        requirement_groups(value, "dependency-groups", DependencyKind::Development, &mut parsed);
    }

    if let Some(poetry) = document
        .get("tool")
        .and_then(|tool| tool.get("poetry"))
        .and_then(Value::as_table)
    {
        poetry_section(poetry, "dependencies", DependencyKind::Production, &mut parsed);
        poetry_section(poetry, "dev-dependencies", DependencyKind::Development, &mut parsed);

        if let Some(groups) = poetry.get("group").and_then(Value::as_table) {
            for group in groups.values().filter_map(Value::as_table) {
                poetry_section(group, "dependencies", DependencyKind::Development, &mut parsed);
            }
        }
    }

    Ok(parsed)
}

/// An array of PEP 508 requirement strings
fn requirement_list(value: &Value, label: &str, kind: DependencyKind, parsed: &mut ParsedManifest) {
    let Some(items) = value.as_array() else {
        parsed.reject(format!("{}: expected an array", label));
        return;
    };

    for item in items {
        match item.as_str().and_then(split_requirement) {
            Some((name, version)) => parsed.push(name, version, kind, ManifestFormat::Pyproject),
            // `{ include-group = ".." }` entries and junk
            None => parsed.reject(format!("{}: unsupported entry {}", label, item)),
        }
    }
}

/// A table of requirement arrays keyed by extra or group name
fn requirement_groups(
    value: &Value,
    label: &str,
    kind: DependencyKind,
    parsed: &mut ParsedManifest,
) {
    let Some(groups) = value.as_table() else {
        parsed.reject(format!("{}: expected a table", label));
        return;
    };
    for (group, items) in groups {
        requirement_list(items, &format!("{}.{}", label, group), kind, parsed);
    }
}

fn poetry_section(table: &Table, key: &str, kind: DependencyKind, parsed: &mut ParsedManifest) {
    let Some(entries) = table.get(key).and_then(Value::as_table) else {
        return;
    };

    for (name, value) in entries {
        if name == "python" {
            continue;
        }
        match toml_version(value) {
            Ok(version) => parsed.push(name, version, kind, ManifestFormat::Pyproject),
            Err(()) => parsed.reject(format!("tool.poetry.{}.{}: unsupported value", key, name)),
        }
    }
}

/// Split a PEP 508 requirement into its name and version specifier.
///
/// Extras and environment markers are dropped. Returns `None` when no name can be found.
pub(crate) fn split_requirement(requirement: &str) -> Option<(String, Option<String>)> {
    let requirement = requirement.split(';').next().unwrap_or_default().trim();
    let name_end = requirement
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        .unwrap_or(requirement.len());
    let name = &requirement[..name_end];
    if name.is_empty() {
        return None;
    }

    let mut rest = requirement[name_end..].trim_start();
    if rest.starts_with('[') {
        rest = rest.find(']').map(|i| rest[i + 1..].trim_start()).unwrap_or("");
    }
    let version = rest
        .trim_start_matches('(')
        .trim_end_matches(')')
        .trim()
        .to_string();

    Some((name.to_string(), Some(version).filter(|v| !v.is_empty())))
}
