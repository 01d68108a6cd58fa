use crate::backend::SetupRequest;

pub fn render_markdown_summary(request: &SetupRequest) -> String {
    let manifest = &request.manifest;
    let mut out = String::new();
    out.push_str(&format!("# {} {} Install Manifest\n\n", request.name, request.version));
    out.push_str(&format!(
        "- Description: {}\n- License: {}\n- URL: <{}>\n- Author: {} <{}>\n- Generated at: `{}`\n- Mode: `{:?}`\n\n",
        request.description,
        request.license,
        request.url,
        request.author,
        request.author_email,
        manifest.generated_at,
        manifest.mode
    ));

    out.push_str("## Selection\n\n");
    out.push_str(&format!(
        "- UIs: {}\n- Languages: {}\n- Manpages outside share: `{}`\n\n",
        manifest.selection.uis, manifest.selection.languages, manifest.selection.manpath_no_share
    ));

    out.push_str("## Packages\n\n");
    if manifest.packages.is_empty() {
        out.push_str("No packages selected.\n\n");
    } else {
        for package in &manifest.packages {
            out.push_str(&format!("- `{}`\n", package));
        }
        out.push('\n');
    }

    out.push_str("## Scripts\n\n");
    if manifest.scripts.is_empty() {
        out.push_str("No scripts selected.\n\n");
    } else {
        for script in &manifest.scripts {
            out.push_str(&format!("- `{}`\n", script));
        }
        out.push('\n');
    }

    out.push_str("## Data Files\n\n");
    if manifest.data_files.is_empty() {
        out.push_str("No data files selected.\n\n");
    } else {
        for group in &manifest.data_files {
            out.push_str(&format!(
                "### `{}` ({} file(s))\n\n",
                group.dir,
                group.files.len()
            ));
            for file in &group.files {
                out.push_str(&format!("- `{}`\n", file));
            }
            out.push('\n');
        }
    }

    if !manifest.warnings.is_empty() {
        out.push_str("## Warnings\n\n");
        for warning in &manifest.warnings {
            out.push_str(&format!("- {}\n", warning));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::render_markdown_summary;
    use crate::backend::SetupRequest;
    use crate::config::ProjectLayout;
    use crate::metadata::{Author, PackageMetadata};
    use crate::model::{DataFileGroup, Manifest, MANIFEST_VERSION};
    use crate::selection::{Selection, SelectionCriteria};

    #[test]
    fn summary_lists_every_section() {
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
            selection: SelectionCriteria {
                uis: Selection::only(["cli"]),
                ..SelectionCriteria::default()
            },
            packages: vec!["gpodder".to_string()],
            scripts: Vec::new(),
            data_files: vec![DataFileGroup {
                dir: "share/man/man1".to_string(),
                files: vec!["share/man/man1/gpo.1".to_string()],
            }],
            excludes: Vec::new(),
            warnings: vec!["directory not found: bin".to_string()],
        };
        let request = SetupRequest::new(&ProjectLayout::default(), &metadata, manifest);

        let markdown = render_markdown_summary(&request);
        assert!(markdown.starts_with("# gpodder 3.11.4 Install Manifest"));
        assert!(markdown.contains("- UIs: [cli]"));
        assert!(markdown.contains("- Languages: (all)"));
        assert!(markdown.contains("No scripts selected."));
        assert!(markdown.contains("### `share/man/man1` (1 file(s))"));
        assert!(markdown.contains("## Warnings"));
    }
}
