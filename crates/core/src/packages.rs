use std::path::Path;

use tracing::info;

use crate::config::ProjectLayout;
use crate::selection::SelectionCriteria;
use crate::walk::{walk_tree, ExcludeMatcher};

/// Lists dotted package names under `<source_dir>/<package_name>`.
///
/// A directory is a package when it contains the layout's marker file. The
/// name is built from the path segments below the source directory. When a UI
/// selection is active, every segment ending in `ui` must strip to a selected
/// UI (`gtkui` needs `gtk`), otherwise the package is skipped.
pub fn enumerate_packages(
    root: &Path,
    layout: &ProjectLayout,
    criteria: &SelectionCriteria,
    excludes: &ExcludeMatcher,
    warnings: &mut Vec<String>,
) -> Vec<String> {
    let source_depth = layout.source_components().len();
    let mut packages = Vec::new();

    for dir in walk_tree(root, &layout.package_root_components(), excludes, warnings) {
        if !dir.files.iter().any(|file| *file == layout.package_marker) {
            continue;
        }

        let segments = &dir.components[source_depth..];
        let package = segments.join(".");

        if let Some(uis) = criteria.uis.as_set() {
            let rejected = segments
                .iter()
                .filter_map(|segment| segment.strip_suffix("ui"))
                .any(|folder_ui| !uis.contains(folder_ui));
            if rejected {
                info!("Skipping package: {package}");
                continue;
            }
        }

        packages.push(package);
    }

    packages
}
