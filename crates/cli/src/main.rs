use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use gpodder_install_core::{
    build_manifest, load_metadata, render_markdown_summary, resolve_selection_criteria,
    InstallMode, JsonManifestBackend, ManifestError, ManifestOptions, PackagingBackend,
    ProjectLayout, SelectionCriteria, SetupRequest, StagingBackend,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "gpodder-install",
    version,
    about = "Select the packages, scripts and data files to install from a gPodder source tree."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build the install manifest and emit it as JSON.
    Manifest(ManifestArgs),
    /// Build the manifest in install mode and stage the files into a destination directory.
    Install(InstallArgs),
    /// Show the UI and language selection read from the environment.
    Selection(ProjectArgs),
    /// Show the package metadata parsed from the main module.
    Metadata(ProjectArgs),
}

#[derive(Debug, Args)]
struct ProjectArgs {
    /// Project root containing the scripts, source and data directories.
    #[arg(long, default_value = ".", value_name = "DIR")]
    root: PathBuf,

    /// JSON file overriding the default project layout.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ManifestArgs {
    #[command(flatten)]
    project: ProjectArgs,

    /// Output file for the JSON setup request. Defaults to stdout.
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Optional markdown summary output file.
    #[arg(long, value_name = "FILE")]
    md: Option<PathBuf>,

    /// Fail when a `.in` template has no generated counterpart, as an install would.
    #[arg(long)]
    check_generated: bool,
}

#[derive(Debug, Args)]
struct InstallArgs {
    #[command(flatten)]
    project: ProjectArgs,

    /// Staging directory the prefix is created under.
    #[arg(long, value_name = "DIR")]
    destdir: PathBuf,

    /// Install prefix inside the staging directory.
    #[arg(long, default_value = "/usr/local")]
    prefix: String,

    /// Write the list of installed files to this path.
    #[arg(long, value_name = "FILE")]
    record: Option<PathBuf>,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Manifest(args) => run_manifest_command(args),
        Commands::Install(args) => run_install_command(args),
        Commands::Selection(args) => run_selection_command(args),
        Commands::Metadata(args) => run_metadata_command(args),
    };

    ExitCode::from(exit_status(result))
}

/// Reports a failed command on stderr and maps it to exit status 1.
fn exit_status(result: Result<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            match remediation(&err) {
                Some(message) => eprintln!("{message}"),
                None => eprintln!("error: {err:#}"),
            }
            1
        }
    }
}

/// The install hint for a missing generated file anywhere in the error chain.
fn remediation(err: &anyhow::Error) -> Option<String> {
    let path = err.chain().find_map(|cause| {
        cause
            .downcast_ref::<ManifestError>()
            .and_then(ManifestError::missing_file)
    })?;

    Some(format!(
        "
    Missing file: {}

    If you want to install, use \"make install\" instead of running
    gpodder-install directly. See the README file for more information.
",
        path.display()
    ))
}

fn load_layout(project: &ProjectArgs) -> Result<ProjectLayout> {
    match &project.config {
        Some(path) => ProjectLayout::load(path)
            .with_context(|| format!("failed to load layout from {}", path.display())),
        None => Ok(ProjectLayout::default()),
    }
}

fn prepare_request(project: &ProjectArgs, mode: InstallMode) -> Result<SetupRequest> {
    let layout = load_layout(project)?;
    let criteria = resolve_selection_criteria(&layout.env);
    let metadata_path = layout.metadata_path(&project.root);
    let metadata = load_metadata(&metadata_path)?;

    let options = ManifestOptions {
        root: project.root.clone(),
        layout: layout.clone(),
        criteria,
        mode,
    };
    let manifest = build_manifest(&options)?;
    Ok(SetupRequest::new(&layout, &metadata, manifest))
}

fn run_manifest_command(args: ManifestArgs) -> Result<()> {
    let mode = if args.check_generated {
        InstallMode::Install
    } else {
        InstallMode::Query
    };
    let request = prepare_request(&args.project, mode)?;

    match &args.output {
        Some(output) => {
            let backend = JsonManifestBackend {
                output: output.clone(),
            };
            backend.submit(&request)?;
            println!("Setup request written to {}", output.display());
        }
        None => {
            let payload = serde_json::to_string_pretty(&request)
                .context("failed to serialize setup request")?;
            println!("{payload}");
        }
    }

    if let Some(md_path) = args.md {
        let markdown = render_markdown_summary(&request);
        fs::write(&md_path, markdown).with_context(|| {
            format!("failed to write markdown summary to {}", md_path.display())
        })?;
        eprintln!("Markdown summary written to {}", md_path.display());
    }

    Ok(())
}

fn run_install_command(args: InstallArgs) -> Result<()> {
    let request = prepare_request(&args.project, InstallMode::Install)?;
    let manifest = &request.manifest;

    let backend = StagingBackend {
        project_root: args.project.root.clone(),
        destdir: args.destdir.clone(),
        prefix: args.prefix.clone(),
    };
    let report = backend.submit(&request)?;

    println!(
        "Installed {} {}: {} package(s), {} script(s), {} data file(s) into {}",
        request.name,
        request.version,
        manifest.packages.len(),
        manifest.scripts.len(),
        manifest.data_file_count(),
        args.destdir.display()
    );
    for warning in &manifest.warnings {
        println!("Warning: {warning}");
    }

    if let Some(record) = args.record {
        write_record(&record, &report.written)?;
        println!("Install record written to {}", record.display());
    }

    Ok(())
}

fn write_record(path: &Path, written: &[PathBuf]) -> Result<()> {
    let mut payload = written
        .iter()
        .map(|file| file.to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    payload.push('\n');
    fs::write(path, payload)
        .with_context(|| format!("failed to write install record {}", path.display()))
}

fn run_selection_command(args: ProjectArgs) -> Result<()> {
    let layout = load_layout(&args)?;
    let SelectionCriteria {
        uis,
        languages,
        manpath_no_share,
    } = resolve_selection_criteria(&layout.env);

    println!("UIs (${}): {}", layout.env.install_uis, uis);
    println!("Languages (${}): {}", layout.env.linguas, languages);
    println!(
        "Manpages outside share (${}): {}",
        layout.env.manpath_no_share, manpath_no_share
    );
    Ok(())
}

fn run_metadata_command(args: ProjectArgs) -> Result<()> {
    let layout = load_layout(&args)?;
    let metadata = load_metadata(&layout.metadata_path(&args.root))?;

    println!("Name: {}", layout.package_name);
    println!("Version: {}", metadata.version);
    println!("Description: {}", metadata.tagline);
    println!("License: {}", metadata.license);
    println!("URL: {}", metadata.url);
    println!("Author: {} <{}>", metadata.author.name, metadata.author.email);
    for (key, value) in &metadata.extra {
        println!("{key}: {value}");
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
