use std::path::Path;

use tracing::info;

use crate::config::ProjectLayout;
use crate::selection::SelectionCriteria;
use crate::walk::{walk_tree, ExcludeMatcher};

/// Lists the executable scripts to install, as `/`-separated paths relative to
/// `root`. Scripts with a descriptor in the layout are kept only when their
/// descriptor accepts the UI selection; all other scripts are kept. The result
/// is in walk order; callers sort it.
pub fn enumerate_scripts(
    root: &Path,
    layout: &ProjectLayout,
    criteria: &SelectionCriteria,
    excludes: &ExcludeMatcher,
    warnings: &mut Vec<String>,
) -> Vec<String> {
    let mut scripts = Vec::new();

    for dir in walk_tree(root, &layout.scripts_components(), excludes, warnings) {
        for filename in &dir.files {
            if let (Some(uis), Some(descriptor)) = (
                criteria.uis.as_set(),
                layout.script_descriptor(filename),
            ) {
                if !descriptor.accepts(uis) {
                    info!("Skipping script: {filename}");
                    continue;
                }
            }
            scripts.push(dir.file_path(filename));
        }
    }

    scripts
}

/// The final path segment of a script path.
pub fn script_basename(script: &str) -> &str {
    script.rsplit('/').next().unwrap_or(script)
}
