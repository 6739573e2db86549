//! go.mod

use super::ParsedManifest;
use codelens_core::{DependencyKind, ManifestFormat};

/// `require` directives, both single-line and parenthesized blocks
pub(crate) fn parse_go_mod(content: &str) -> ParsedManifest {
    let mut parsed = ParsedManifest::default();
    let mut in_require_block = false;

    for (index, raw) in content.lines().enumerate() {
        let line = raw.split("//").next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }

        if in_require_block {
            if line == ")" {
                in_require_block = false;
            } else {
                require(line, index + 1, &mut parsed);
            }
            continue;
        }

        let Some(rest) = line
            .strip_prefix("require")
            .filter(|rest| rest.starts_with([' ', '\t', '(']))
        else {
            continue;
        };
        let rest = rest.trim();
        if rest == "(" {
            in_require_block = true;
        } else if !rest.is_empty() {
            require(rest, index + 1, &mut parsed);
        }
    }

    parsed
}

fn require(spec: &str, line_number: usize, parsed: &mut ParsedManifest) {
    let mut fields = spec.split_whitespace();
    match (fields.next(), fields.next()) {
        (Some(module), version) => parsed.push(
            module,
            version.map(str::to_string),
            DependencyKind::Production,
            ManifestFormat::GoMod,
        ),
        (None, _) => parsed.reject(format!("line {}: empty require", line_number)),
    }
}
