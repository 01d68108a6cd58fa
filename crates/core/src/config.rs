use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ManifestError, Result};

/// Whether the manifest is being built for a real install or only inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InstallMode {
    Install,
    #[default]
    Query,
}

impl InstallMode {
    pub fn is_install(self) -> bool {
        matches!(self, Self::Install)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvNames {
    pub install_uis: String,
    pub linguas: String,
    pub manpath_no_share: String,
}

impl Default for EnvNames {
    fn default() -> Self {
        Self {
            install_uis: "GPODDER_INSTALL_UIS".to_string(),
            linguas: "LINGUAS".to_string(),
            manpath_no_share: "GPODDER_MANPATH_NO_SHARE".to_string(),
        }
    }
}

/// A script with an install condition. Scripts without a descriptor are always installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptDescriptor {
    pub name: String,
    pub requires_any_ui: Vec<String>,
}

impl ScriptDescriptor {
    pub fn new(name: &str, requires_any_ui: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            requires_any_ui: requires_any_ui.iter().map(|ui| ui.to_string()).collect(),
        }
    }

    pub fn accepts(&self, uis: &BTreeSet<String>) -> bool {
        self.requires_any_ui.iter().any(|ui| uis.contains(ui))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectLayout {
    pub package_name: String,
    pub scripts_dir: String,
    pub source_dir: String,
    pub share_dir: String,
    pub package_marker: String,
    /// Defaults to the package marker of the top-level package.
    pub metadata_file: Option<String>,
    pub scripts: Vec<ScriptDescriptor>,
    pub desktop_folders: Vec<String>,
    pub desktop_uis: Vec<String>,
    pub excludes: Vec<String>,
    pub env: EnvNames,
}

impl Default for ProjectLayout {
    fn default() -> Self {
        Self {
            package_name: "gpodder".to_string(),
            scripts_dir: "bin".to_string(),
            source_dir: "src".to_string(),
            share_dir: "share".to_string(),
            package_marker: "__init__.py".to_string(),
            metadata_file: None,
            scripts: vec![
                ScriptDescriptor::new("gpo", &["cli"]),
                ScriptDescriptor::new("gpodder", &["gtk"]),
            ],
            desktop_folders: vec![
                "icons".to_string(),
                "dbus-1".to_string(),
                "applications".to_string(),
            ],
            desktop_uis: vec!["gtk".to_string()],
            excludes: Vec::new(),
            env: EnvNames::default(),
        }
    }
}

impl ProjectLayout {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| ManifestError::io(path, err))?;
        let layout: Self = serde_json::from_str(&text).map_err(|err| {
            ManifestError::InvalidConfig(format!("failed to parse {}: {err}", path.display()))
        })?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn validate(&self) -> Result<()> {
        if self.package_name.trim().is_empty() {
            return Err(ManifestError::InvalidConfig(
                "package_name must not be empty".to_string(),
            ));
        }
        if self.package_name.contains('/') || self.package_name.contains('\\') {
            return Err(ManifestError::InvalidConfig(format!(
                "package_name '{}' must be a single path segment",
                self.package_name
            )));
        }
        for (field, value) in [
            ("scripts_dir", &self.scripts_dir),
            ("source_dir", &self.source_dir),
            ("share_dir", &self.share_dir),
        ] {
            validate_relative(field, value)?;
        }
        if let Some(metadata_file) = &self.metadata_file {
            validate_relative("metadata_file", metadata_file)?;
        }
        if self.package_marker.is_empty() {
            return Err(ManifestError::InvalidConfig(
                "package_marker must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn scripts_components(&self) -> Vec<String> {
        split_components(&self.scripts_dir)
    }

    pub fn source_components(&self) -> Vec<String> {
        split_components(&self.source_dir)
    }

    /// `src/<package>`: the directory walked for packages.
    pub fn package_root_components(&self) -> Vec<String> {
        let mut parts = self.source_components();
        parts.push(self.package_name.clone());
        parts
    }

    pub fn share_components(&self) -> Vec<String> {
        split_components(&self.share_dir)
    }

    /// `share/<package>/ui`
    pub fn ui_data_components(&self) -> Vec<String> {
        let mut parts = self.share_components();
        parts.push(self.package_name.clone());
        parts.push("ui".to_string());
        parts
    }

    pub fn locale_components(&self) -> Vec<String> {
        let mut parts = self.share_components();
        parts.push("locale".to_string());
        parts
    }

    pub fn man_components(&self) -> Vec<String> {
        let mut parts = self.share_components();
        parts.push("man".to_string());
        parts
    }

    pub fn desktop_components(&self) -> Vec<Vec<String>> {
        self.desktop_folders
            .iter()
            .map(|folder| {
                let mut parts = self.share_components();
                parts.push(folder.clone());
                parts
            })
            .collect()
    }

    pub fn metadata_path(&self, root: &Path) -> PathBuf {
        let parts = match &self.metadata_file {
            Some(file) => split_components(file),
            None => {
                let mut parts = self.package_root_components();
                parts.push(self.package_marker.clone());
                parts
            }
        };
        parts
            .iter()
            .fold(root.to_path_buf(), |acc, part| acc.join(part))
    }

    pub fn script_descriptor(&self, name: &str) -> Option<&ScriptDescriptor> {
        self.scripts.iter().find(|descriptor| descriptor.name == name)
    }
}

pub(crate) fn split_components(value: &str) -> Vec<String> {
    value
        .split(['/', '\\'])
        .filter(|part| !part.is_empty() && *part != ".")
        .map(str::to_string)
        .collect()
}

fn validate_relative(field: &str, value: &str) -> Result<()> {
    if value.starts_with('/') || value.starts_with('\\') || Path::new(value).is_absolute() {
        return Err(ManifestError::InvalidConfig(format!(
            "{field} '{value}' must be relative to the project root"
        )));
    }
    let parts = split_components(value);
    if parts.is_empty() {
        return Err(ManifestError::InvalidConfig(format!(
            "{field} must not be empty"
        )));
    }
    if parts.iter().any(|part| part == "..") {
        return Err(ManifestError::InvalidConfig(format!(
            "{field} '{value}' must not leave the project root"
        )));
    }
    Ok(())
}
