use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::warn;
use walkdir::WalkDir;

/// One directory that holds at least one file, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedDir {
    pub components: Vec<String>,
    pub files: Vec<String>,
}

impl WalkedDir {
    pub fn dir_path(&self) -> String {
        join_components(&self.components)
    }

    pub fn file_path(&self, file: &str) -> String {
        if self.components.is_empty() {
            file.to_string()
        } else {
            format!("{}/{}", self.dir_path(), file)
        }
    }

    pub fn starts_with(&self, prefix: &[String]) -> bool {
        self.components.starts_with(prefix)
    }
}

pub fn join_components(components: &[String]) -> String {
    components.join("/")
}

pub fn components_to_path(root: &Path, components: &[String]) -> PathBuf {
    components
        .iter()
        .fold(root.to_path_buf(), |acc, part| acc.join(part))
}

/// Walks `root/<start>` and groups files by their directory. Entries are
/// visited in file-name order and directories come back sorted by path, so
/// repeated runs over the same tree are identical.
pub fn walk_tree(
    root: &Path,
    start: &[String],
    excludes: &ExcludeMatcher,
    warnings: &mut Vec<String>,
) -> Vec<WalkedDir> {
    let walk_root = components_to_path(root, start);
    if !walk_root.is_dir() {
        let message = format!("directory not found: {}", walk_root.display());
        warn!("{message}");
        warnings.push(message);
        return Vec::new();
    }

    let mut grouped: BTreeMap<Vec<String>, Vec<String>> = BTreeMap::new();
    let iter = WalkDir::new(&walk_root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            let relative = relative_components(&walk_root, start, entry.path());
            !excludes.is_excluded(&join_components(&relative))
        });

    for item in iter {
        let entry = match item {
            Ok(entry) => entry,
            Err(err) => {
                let message = format!("walk error under {}: {}", walk_root.display(), err);
                warn!("{message}");
                warnings.push(message);
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }

        let file_type = entry.file_type();
        let is_file = file_type.is_file() || (file_type.is_symlink() && !entry.path().is_dir());
        if !is_file {
            continue;
        }

        let mut components = relative_components(&walk_root, start, entry.path());
        let Some(name) = components.pop() else {
            continue;
        };
        grouped.entry(components).or_default().push(name);
    }

    grouped
        .into_iter()
        .map(|(components, files)| WalkedDir { components, files })
        .collect()
}

fn relative_components(walk_root: &Path, start: &[String], path: &Path) -> Vec<String> {
    let mut components = start.to_vec();
    if let Ok(relative) = path.strip_prefix(walk_root) {
        components.extend(
            relative
                .components()
                .map(|part| part.as_os_str().to_string_lossy().to_string()),
        );
    }
    components
}

/// Exclude patterns checked against `/`-separated paths relative to the
/// project root.
///
/// A pattern with glob metacharacters is matched against the whole path. A
/// plain name such as `__pycache__` matches any single path component, and a
/// plain path such as `share/gpodder/extensions` matches that subtree.
#[derive(Debug, Clone)]
pub struct ExcludeMatcher {
    globs: GlobSet,
    names: Vec<String>,
    subtrees: Vec<Vec<String>>,
}

impl ExcludeMatcher {
    pub fn none() -> Self {
        Self {
            globs: GlobSet::empty(),
            names: Vec::new(),
            subtrees: Vec::new(),
        }
    }

    /// Invalid globs are dropped with a warning rather than failing the walk.
    pub fn new(patterns: &[String], warnings: &mut Vec<String>) -> Self {
        let mut matcher = Self::none();
        let mut builder = GlobSetBuilder::new();
        let mut glob_count = 0;

        for pattern in patterns.iter().map(|pattern| pattern.trim()) {
            if pattern.is_empty() {
                continue;
            }
            if has_glob_syntax(pattern) {
                match Glob::new(pattern) {
                    Ok(glob) => {
                        builder.add(glob);
                        glob_count += 1;
                    }
                    Err(err) => warnings.push(format!("ignoring exclude '{pattern}': {err}")),
                }
                continue;
            }

            let components = pattern
                .split('/')
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>();
            match components.as_slice() {
                [] => {}
                [name] => matcher.names.push(name.clone()),
                _ => matcher.subtrees.push(components),
            }
        }

        if glob_count > 0 {
            match builder.build() {
                Ok(set) => matcher.globs = set,
                Err(err) => warnings.push(format!("glob excludes disabled: {err}")),
            }
        }
        matcher
    }

    pub fn is_excluded(&self, relative: &str) -> bool {
        if self.globs.is_match(relative) {
            return true;
        }

        let components = relative.split('/').collect::<Vec<_>>();
        let named = components
            .iter()
            .any(|part| self.names.iter().any(|name| name == part));
        named
            || self.subtrees.iter().any(|subtree| {
                subtree.len() <= components.len()
                    && subtree.iter().zip(&components).all(|(want, got)| want == got)
            })
    }
}

fn has_glob_syntax(pattern: &str) -> bool {
    pattern.contains(|ch: char| matches!(ch, '*' | '?' | '[' | ']' | '{' | '}'))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{walk_tree, ExcludeMatcher};

    fn matcher(patterns: &[&str]) -> (ExcludeMatcher, Vec<String>) {
        let patterns = patterns.iter().map(|p| p.to_string()).collect::<Vec<_>>();
        let mut warnings = Vec::new();
        let matcher = ExcludeMatcher::new(&patterns, &mut warnings);
        (matcher, warnings)
    }

    #[test]
    fn globs_match_the_whole_relative_path() {
        let (matcher, warnings) = matcher(&["**/*.pyc", "["]);

        assert!(matcher.is_excluded("src/gpodder/util.pyc"));
        assert!(!matcher.is_excluded("src/gpodder/util.py"));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("'['"));
    }

    #[test]
    fn plain_names_match_whole_components() {
        let (matcher, warnings) = matcher(&["__pycache__", "share/gpodder/extensions"]);

        assert!(warnings.is_empty());
        assert!(matcher.is_excluded("src/gpodder/__pycache__"));
        assert!(matcher.is_excluded("src/gpodder/__pycache__/util.cpython-311.pyc"));
        assert!(!matcher.is_excluded("src/gpodder/not__pycache__"));
        assert!(matcher.is_excluded("share/gpodder/extensions/notification.py"));
        assert!(!matcher.is_excluded("share/gpodder/extensions-old/notification.py"));
        assert!(!matcher.is_excluded("share/gpodder"));
    }

    #[test]
    fn groups_files_by_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        fs::create_dir_all(root.join("share/man/man1")).expect("mkdir");
        fs::create_dir_all(root.join("share/empty")).expect("mkdir");
        fs::write(root.join("share/man/man1/gpo.1"), "").expect("write");
        fs::write(root.join("share/man/man1/gpodder.1"), "").expect("write");
        fs::write(root.join("share/README"), "").expect("write");

        let mut warnings = Vec::new();
        let dirs = walk_tree(
            root,
            &["share".to_string()],
            &ExcludeMatcher::none(),
            &mut warnings,
        );

        assert!(warnings.is_empty());
        assert_eq!(dirs.len(), 2);
        assert_eq!(dirs[0].dir_path(), "share");
        assert_eq!(dirs[0].files, ["README"]);
        assert_eq!(dirs[1].dir_path(), "share/man/man1");
        assert_eq!(dirs[1].files, ["gpo.1", "gpodder.1"]);
        assert_eq!(dirs[1].file_path("gpo.1"), "share/man/man1/gpo.1");
    }

    #[test]
    fn missing_root_is_a_warning() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut warnings = Vec::new();
        let dirs = walk_tree(
            dir.path(),
            &["bin".to_string()],
            &ExcludeMatcher::none(),
            &mut warnings,
        );
        assert!(dirs.is_empty());
        assert_eq!(warnings.len(), 1);
    }
}
