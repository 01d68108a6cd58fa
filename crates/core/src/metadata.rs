use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ManifestError, Result};

pub const REQUIRED_KEYS: &[&str] = &["version", "tagline", "license", "url", "author"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

impl Author {
    /// Parses `Name <email>`. The split happens at the last ` <`, so the
    /// email may itself contain `>`. Name and email must both be non-empty.
    pub fn parse(value: &str) -> Option<Self> {
        let (name, email) = value.strip_suffix('>')?.rsplit_once(" <")?;
        if name.trim().is_empty() || email.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            email: email.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub version: String,
    pub tagline: String,
    pub license: String,
    pub url: String,
    pub author: Author,
    /// Every other `__key__` assignment found in the file.
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

pub fn load_metadata(path: &Path) -> Result<PackageMetadata> {
    let text = fs::read_to_string(path).map_err(|err| ManifestError::io(path, err))?;
    parse_metadata(path, &text)
}

/// Reads `__key__ = 'value'` assignments from a module source file. When a
/// key repeats, the last assignment wins. `path` is only used for error
/// messages.
pub fn parse_metadata(path: &Path, text: &str) -> Result<PackageMetadata> {
    let mut values = parse_assignments(text)
        .into_iter()
        .collect::<BTreeMap<_, _>>();

    let missing = REQUIRED_KEYS
        .iter()
        .filter(|key| !values.contains_key(**key))
        .copied()
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(ManifestError::metadata(
            path,
            format!("missing required key(s): {}", missing.join(", ")),
        ));
    }

    let mut take = |key: &str| values.remove(key).unwrap_or_default();
    let version = take("version");
    let tagline = take("tagline");
    let license = take("license");
    let url = take("url");
    let author_text = take("author");

    let author = Author::parse(&author_text).ok_or_else(|| {
        ManifestError::metadata(
            path,
            format!("__author__ '{author_text}' does not match 'Name <email>'"),
        )
    })?;

    Ok(PackageMetadata {
        version,
        tagline,
        license,
        url,
        author,
        extra: values,
    })
}

/// Finds every `__key__ = 'value'` assignment in `text`, in order. An
/// assignment may start anywhere, so two on one line are both found.
fn parse_assignments(text: &str) -> Vec<(String, String)> {
    let mut found = Vec::new();
    let mut cursor = 0;
    while let Some(offset) = text[cursor..].find("__") {
        let start = cursor + offset;
        match assignment_at(&text[start..]) {
            Some((key, value, consumed)) => {
                found.push((key.to_string(), value.to_string()));
                cursor = start + consumed;
            }
            // `_` is one byte, so this stays on a char boundary.
            None => cursor = start + 1,
        }
    }
    found
}

/// Matches one assignment at the start of `text` and returns the key, the
/// value and the number of bytes consumed.
fn assignment_at(text: &str) -> Option<(&str, &str, usize)> {
    let name_len = text
        .find(|ch: char| !(ch.is_ascii_lowercase() || ch == '_'))
        .unwrap_or(text.len());
    let key = text[..name_len].strip_prefix("__")?.strip_suffix("__")?;
    if key.is_empty() {
        return None;
    }

    let rest = text[name_len..].trim_start().strip_prefix('=')?;
    let rest = rest.trim_start().strip_prefix('\'')?;
    let (value, _) = rest.split_once('\'')?;
    if value.is_empty() || value.contains('\n') {
        return None;
    }
    let consumed = text.len() - rest.len() + value.len() + 1;
    Some((key, value, consumed))
}
