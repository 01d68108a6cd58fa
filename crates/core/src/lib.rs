pub mod backend;
pub mod config;
pub mod data_files;
pub mod error;
pub mod manifest;
pub mod markdown;
pub mod metadata;
pub mod model;
pub mod packages;
pub mod scripts;
pub mod selection;
pub mod walk;

pub use backend::{
    BackendReport, JsonManifestBackend, PackagingBackend, SetupRequest, StagingBackend,
};
pub use config::{EnvNames, InstallMode, ProjectLayout, ScriptDescriptor};
pub use data_files::enumerate_data_files;
pub use error::{ManifestError, Result};
pub use manifest::{build_manifest, ManifestOptions};
pub use markdown::render_markdown_summary;
pub use metadata::{load_metadata, parse_metadata, Author, PackageMetadata};
pub use model::{DataFileGroup, Manifest, MANIFEST_VERSION};
pub use packages::enumerate_packages;
pub use scripts::enumerate_scripts;
pub use selection::{
    resolve_selection_criteria, resolve_selection_criteria_with, Selection, SelectionCriteria,
};
pub use walk::ExcludeMatcher;
