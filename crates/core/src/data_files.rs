use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::{InstallMode, ProjectLayout};
use crate::error::{ManifestError, Result};
use crate::model::DataFileGroup;
use crate::scripts::script_basename;
use crate::selection::SelectionCriteria;
use crate::walk::{join_components, walk_tree, ExcludeMatcher, WalkedDir};

/// Classifies the shared-data tree into install directories.
///
/// Directory filters run in order: UI data folders, translations, desktop
/// integration folders, then manpages without a matching script. Surviving
/// files drop `.h` build artifacts and `.in` templates; in install mode every
/// template's generated counterpart must already exist.
pub fn enumerate_data_files(
    root: &Path,
    layout: &ProjectLayout,
    criteria: &SelectionCriteria,
    scripts: &[String],
    mode: InstallMode,
    excludes: &ExcludeMatcher,
    warnings: &mut Vec<String>,
) -> Result<Vec<DataFileGroup>> {
    let filters = DirectoryFilters::new(layout, criteria, scripts);
    let mut groups = Vec::new();

    for dir in walk_tree(root, &layout.share_components(), excludes, warnings) {
        if dir.files.is_empty() || !filters.keep_directory(&dir) {
            continue;
        }

        let mut files = Vec::new();
        for filename in filters.manpage_filter(&dir) {
            if let Some(path) = convert_filename(root, &dir, filename, mode)? {
                files.push(path);
            }
        }

        if !files.is_empty() {
            groups.push(DataFileGroup {
                dir: filters.install_dir(&dir),
                files,
            });
        }
    }

    Ok(groups)
}

struct DirectoryFilters<'a> {
    criteria: &'a SelectionCriteria,
    scripts: &'a [String],
    desktop_uis: &'a [String],
    ui_prefix: Vec<String>,
    locale_prefix: Vec<String>,
    desktop_prefixes: Vec<Vec<String>>,
    man_prefix: Vec<String>,
}

impl<'a> DirectoryFilters<'a> {
    fn new(
        layout: &'a ProjectLayout,
        criteria: &'a SelectionCriteria,
        scripts: &'a [String],
    ) -> Self {
        Self {
            criteria,
            scripts,
            desktop_uis: &layout.desktop_uis,
            ui_prefix: layout.ui_data_components(),
            locale_prefix: layout.locale_components(),
            desktop_prefixes: layout.desktop_components(),
            man_prefix: layout.man_components(),
        }
    }

    fn keep_directory(&self, dir: &WalkedDir) -> bool {
        if let Some(uis) = self.criteria.uis.as_set() {
            if dir.starts_with(&self.ui_prefix)
                && !dir.components.iter().any(|part| uis.contains(part))
            {
                info!("Skipping folder: {}", dir.dir_path());
                return false;
            }
        }

        if let Some(languages) = self.criteria.languages.as_set() {
            if dir.starts_with(&self.locale_prefix) {
                if let Some(language) = dir.components.get(self.locale_prefix.len()) {
                    if !languages.contains(language) {
                        info!("Skipping translation: {language}");
                        return false;
                    }
                }
            }
        }

        if let Some(uis) = self.criteria.uis.as_set() {
            let is_desktop_folder = self
                .desktop_prefixes
                .iter()
                .any(|prefix| dir.starts_with(prefix));
            if is_desktop_folder && !self.desktop_uis.iter().any(|ui| uis.contains(ui)) {
                info!("Skipping freedesktop.org folder: {}", dir.dir_path());
                return false;
            }
        }

        true
    }

    /// Drops `*.1` manpages whose script is not being installed.
    fn manpage_filter<'d>(&self, dir: &'d WalkedDir) -> Vec<&'d str> {
        if !dir.starts_with(&self.man_prefix) {
            return dir.files.iter().map(String::as_str).collect();
        }

        dir.files
            .iter()
            .map(String::as_str)
            .filter(|filename| match filename.strip_suffix(".1") {
                None => true,
                Some(stem) => {
                    let found = self
                        .scripts
                        .iter()
                        .any(|script| script_basename(script) == stem);
                    if !found {
                        info!("Skipping manpage without script: {filename}");
                    }
                    found
                }
            })
            .collect()
    }

    /// Some platforms install manpages to `$PREFIX/man` rather than
    /// `$PREFIX/share/man`.
    fn install_dir(&self, dir: &WalkedDir) -> String {
        if self.criteria.manpath_no_share && dir.starts_with(&self.man_prefix) {
            let mut components = vec!["man".to_string()];
            components.extend_from_slice(&dir.components[self.man_prefix.len()..]);
            return join_components(&components);
        }
        dir.dir_path()
    }
}

fn convert_filename(
    root: &Path,
    dir: &WalkedDir,
    filename: &str,
    mode: InstallMode,
) -> Result<Option<String>> {
    let path = dir.file_path(filename);

    // Generated by "make messages".
    if path.ends_with(".h") {
        return Ok(None);
    }

    if let Some(target) = path.strip_suffix(".in") {
        if mode.is_install() && !root.join(target).exists() {
            return Err(ManifestError::MissingFile {
                path: PathBuf::from(target),
            });
        }
        return Ok(None);
    }

    Ok(Some(path))
}
