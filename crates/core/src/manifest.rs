use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use tracing::info;

use crate::config::{InstallMode, ProjectLayout};
use crate::data_files::enumerate_data_files;
use crate::error::Result;
use crate::model::{Manifest, MANIFEST_VERSION};
use crate::packages::enumerate_packages;
use crate::scripts::enumerate_scripts;
use crate::selection::SelectionCriteria;
use crate::walk::ExcludeMatcher;

#[derive(Debug, Clone)]
pub struct ManifestOptions {
    pub root: PathBuf,
    pub layout: ProjectLayout,
    pub criteria: SelectionCriteria,
    pub mode: InstallMode,
}

impl ManifestOptions {
    pub fn new(root: impl Into<PathBuf>, criteria: SelectionCriteria) -> Self {
        Self {
            root: root.into(),
            layout: ProjectLayout::default(),
            criteria,
            mode: InstallMode::Query,
        }
    }
}

/// Builds the manifest in one pass: packages, then scripts, then data files.
/// Data files go last because manpages are matched against the script list.
/// A missing generated file in install mode aborts the whole build.
pub fn build_manifest(options: &ManifestOptions) -> Result<Manifest> {
    options.layout.validate()?;
    let root = options.root.as_path();
    let layout = &options.layout;
    let criteria = &options.criteria;

    let mut warnings = Vec::new();
    let excludes = ExcludeMatcher::new(&layout.excludes, &mut warnings);

    let mut packages = enumerate_packages(root, layout, criteria, &excludes, &mut warnings);
    packages.sort();

    let mut scripts = enumerate_scripts(root, layout, criteria, &excludes, &mut warnings);
    scripts.sort();

    let mut data_files = enumerate_data_files(
        root,
        layout,
        criteria,
        &scripts,
        options.mode,
        &excludes,
        &mut warnings,
    )?;
    data_files.sort();

    info!(
        "manifest: {} package(s), {} script(s), {} data folder(s)",
        packages.len(),
        scripts.len(),
        data_files.len()
    );

    Ok(Manifest {
        manifest_version: MANIFEST_VERSION.to_string(),
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        root: root.to_string_lossy().to_string(),
        mode: options.mode,
        selection: criteria.clone(),
        packages,
        scripts,
        data_files,
        excludes: layout.excludes.clone(),
        warnings,
    })
}
