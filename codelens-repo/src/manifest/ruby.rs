//! Gemfile

use super::ParsedManifest;
use codelens_core::{DependencyKind, ManifestFormat};
use regex::Regex;
use std::sync::LazyLock;

static GEM_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^gem\s*\(?\s*["']([^"']*)["']\s*(?:,\s*["']([^"']+)["'])?(.*)$"#)
        .expect("valid gem pattern")
});
static GROUP_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^group\s*\(?(.*?)\)?\s+do\b").expect("valid group pattern"));
static BLOCK_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^(if|unless|case|begin)\b)|\bdo\s*(\|[^|]*\|)?$").expect("valid block pattern")
});
static DEV_GROUPS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[:'\x22](development|test)\b").expect("valid group name pattern"));
static INLINE_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bgroups?\s*(:|=>)").expect("valid inline group pattern"));

pub(crate) fn parse_gemfile(content: &str) -> ParsedManifest {
    let mut parsed = ParsedManifest::default();
    // One entry per open `do`/`if` block: whether it marks development gems
    let mut blocks: Vec<bool> = Vec::new();

    for (index, raw) in content.lines().enumerate() {
        let line = raw.split(" #").next().unwrap_or_default().trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let in_dev_group = blocks.iter().any(|dev| *dev);

        if let Some(captures) = GEM_LINE.captures(line) {
            let name = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
            if name.is_empty() {
                parsed.reject(format!("line {}: gem without a name", index + 1));
                continue;
            }
            let version = captures.get(2).map(|m| m.as_str().to_string());
            let options = captures.get(3).map(|m| m.as_str()).unwrap_or_default();

            let inline_dev = INLINE_GROUP.is_match(options) && DEV_GROUPS.is_match(options);
            let kind = if in_dev_group || inline_dev {
                DependencyKind::Development
            } else {
                DependencyKind::Production
            };
            parsed.push(name, version, kind, ManifestFormat::Gemfile);
            continue;
        }

        if let Some(captures) = GROUP_OPEN.captures(line) {
            let groups = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
            blocks.push(DEV_GROUPS.is_match(groups));
        } else if line == "end" || line.starts_with("end ") || line.starts_with("end.") {
            blocks.pop();
        } else if BLOCK_OPEN.is_match(line) {
            blocks.push(false);
        }
    }

    parsed
}
