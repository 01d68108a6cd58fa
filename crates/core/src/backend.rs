use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{split_components, ProjectLayout};
use crate::error::{ManifestError, Result};
use crate::metadata::PackageMetadata;
use crate::model::Manifest;
use crate::walk::{components_to_path, join_components, ExcludeMatcher};

/// Everything a packaging backend needs to install the project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SetupRequest {
    pub name: String,
    pub version: String,
    pub description: String,
    pub license: String,
    pub url: String,
    pub author: String,
    pub author_email: String,
    /// Maps the root package namespace (`""`) to the source directory.
    pub package_dir: BTreeMap<String, String>,
    pub manifest: Manifest,
}

impl SetupRequest {
    pub fn new(layout: &ProjectLayout, metadata: &PackageMetadata, manifest: Manifest) -> Self {
        Self {
            name: layout.package_name.clone(),
            version: metadata.version.clone(),
            description: metadata.tagline.clone(),
            license: metadata.license.clone(),
            url: metadata.url.clone(),
            author: metadata.author.name.clone(),
            author_email: metadata.author.email.clone(),
            package_dir: BTreeMap::from([(String::new(), layout.source_dir.clone())]),
            manifest,
        }
    }

    fn source_dir(&self) -> &str {
        self.package_dir.get("").map(String::as_str).unwrap_or("src")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackendReport {
    pub backend: String,
    /// Files written by the backend, in write order.
    pub written: Vec<PathBuf>,
}

pub trait PackagingBackend {
    fn name(&self) -> &'static str;

    fn submit(&self, request: &SetupRequest) -> Result<BackendReport>;
}

/// Writes the setup request as pretty JSON for an external packaging tool.
pub struct JsonManifestBackend {
    pub output: PathBuf,
}

impl PackagingBackend for JsonManifestBackend {
    fn name(&self) -> &'static str {
        "json"
    }

    fn submit(&self, request: &SetupRequest) -> Result<BackendReport> {
        let payload = serde_json::to_string_pretty(request)?;
        fs::write(&self.output, payload).map_err(|err| ManifestError::io(&self.output, err))?;
        info!("setup request written to {}", self.output.display());
        Ok(BackendReport {
            backend: self.name().to_string(),
            written: vec![self.output.clone()],
        })
    }
}

/// Copies the manifest into `<destdir>/<prefix>`: scripts under `bin`, data
/// groups under their install directory, and each package's own files under
/// `lib/<package path>`. Package files matching the manifest's excludes are
/// left out.
pub struct StagingBackend {
    pub project_root: PathBuf,
    pub destdir: PathBuf,
    pub prefix: String,
}

impl StagingBackend {
    fn install_root(&self) -> PathBuf {
        components_to_path(&self.destdir, &split_components(&self.prefix))
    }

    fn copy_file(
        &self,
        source: &Path,
        target_dir: &Path,
        written: &mut Vec<PathBuf>,
    ) -> Result<()> {
        let Some(file_name) = source.file_name() else {
            return Ok(());
        };
        fs::create_dir_all(target_dir).map_err(|err| ManifestError::io(target_dir, err))?;
        let target = target_dir.join(file_name);
        fs::copy(source, &target).map_err(|err| ManifestError::io(source, err))?;
        debug!("installed {} -> {}", source.display(), target.display());
        written.push(target);
        Ok(())
    }
}

impl PackagingBackend for StagingBackend {
    fn name(&self) -> &'static str {
        "staging"
    }

    fn submit(&self, request: &SetupRequest) -> Result<BackendReport> {
        let install_root = self.install_root();
        let manifest = &request.manifest;
        let mut written = Vec::new();

        let mut matcher_warnings = Vec::new();
        let excludes = ExcludeMatcher::new(&manifest.excludes, &mut matcher_warnings);
        for warning in &matcher_warnings {
            warn!("{warning}");
        }

        let source_components = split_components(request.source_dir());
        for package in &manifest.packages {
            let package_components = package.split('.').map(str::to_string).collect::<Vec<_>>();
            let mut source = source_components.clone();
            source.extend(package_components.iter().cloned());
            let source_dir = components_to_path(&self.project_root, &source);

            let mut target = vec!["lib".to_string()];
            target.extend(package_components);
            let target_dir = components_to_path(&install_root, &target);

            let entries =
                fs::read_dir(&source_dir).map_err(|err| ManifestError::io(&source_dir, err))?;
            let mut files = Vec::new();
            for entry in entries {
                let entry = entry.map_err(|err| ManifestError::io(&source_dir, err))?;
                if !entry.path().is_file() {
                    continue;
                }
                let mut relative = source.clone();
                relative.push(entry.file_name().to_string_lossy().to_string());
                if excludes.is_excluded(&join_components(&relative)) {
                    debug!("excluded {}", join_components(&relative));
                    continue;
                }
                files.push(entry.path());
            }
            files.sort();
            for file in files {
                self.copy_file(&file, &target_dir, &mut written)?;
            }
        }

        let bin_dir = install_root.join("bin");
        for script in &manifest.scripts {
            let source = components_to_path(&self.project_root, &split_components(script));
            self.copy_file(&source, &bin_dir, &mut written)?;
        }

        for group in &manifest.data_files {
            let target_dir = components_to_path(&install_root, &split_components(&group.dir));
            for file in &group.files {
                let source = components_to_path(&self.project_root, &split_components(file));
                self.copy_file(&source, &target_dir, &mut written)?;
            }
        }

        info!(
            "staged {} file(s) into {}",
            written.len(),
            install_root.display()
        );
        Ok(BackendReport {
            backend: self.name().to_string(),
            written,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{JsonManifestBackend, PackagingBackend, SetupRequest};
    use crate::config::ProjectLayout;
    use crate::metadata::{Author, PackageMetadata};
    use crate::model::{Manifest, MANIFEST_VERSION};
    use crate::selection::SelectionCriteria;

    fn sample_request() -> SetupRequest {
        let metadata = PackageMetadata {
            version: "3.11.4".to_string(),
            tagline: "Media aggregator and podcast client".to_string(),
            license: "GPL-3.0-or-later".to_string(),
            url: "http://gpodder.org/".to_string(),
            author: Author {
                name: "The gPodder Team".to_string(),
                email: "gpodder@gpodder.org".to_string(),
            },
            extra: Default::default(),
        };
        let manifest = Manifest {
            manifest_version: MANIFEST_VERSION.to_string(),
            generated_at: "2026-01-01T00:00:00Z".to_string(),
            root: ".".to_string(),
            mode: Default::default(),
            selection: SelectionCriteria::everything(),
            packages: vec!["gpodder".to_string()],
            scripts: vec!["bin/gpo".to_string()],
            data_files: Vec::new(),
            excludes: Vec::new(),
            warnings: Vec::new(),
        };
        SetupRequest::new(&ProjectLayout::default(), &metadata, manifest)
    }

    #[test]
    fn setup_request_maps_metadata() {
        let request = sample_request();
        assert_eq!(request.name, "gpodder");
        assert_eq!(request.description, "Media aggregator and podcast client");
        assert_eq!(request.author_email, "gpodder@gpodder.org");
        assert_eq!(request.package_dir.get("").map(String::as_str), Some("src"));
    }

    #[test]
    fn json_backend_round_trips_request() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = dir.path().join("setup.json");
        let backend = JsonManifestBackend {
            output: output.clone(),
        };
        let request = sample_request();
        let report = backend.submit(&request).expect("submit");
        assert_eq!(report.written, [output.clone()]);

        let parsed: SetupRequest =
            serde_json::from_str(&fs::read_to_string(&output).expect("read")).expect("parse");
        assert_eq!(parsed, request);
    }
}
