use std::fs;
use std::path::Path;

use anyhow::{Result, bail};
use ignore::WalkBuilder;
use sieve_core::ProjectFiles;
use tracing::{debug, warn};

/// Read every text file under `root` into a snapshot keyed by `/`-separated relative path.
///
/// Hidden and git-ignored files are skipped, as are files above
/// `max_file_bytes` and files that are not valid UTF-8.
pub fn load_project(root: &Path, max_file_bytes: u64) -> Result<ProjectFiles> {
    if !root.is_dir() {
        bail!("Project root {} is not a directory", root.display());
    }

    let mut files = ProjectFiles::new();
    let walker = WalkBuilder::new(root)
        .max_depth(None)
        .hidden(true)
        .git_ignore(true)
        .build();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                warn!("Error walking directory: {error}");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|file_type| file_type.is_file()) {
            continue;
        }

        let path = entry.path();
        let size = entry.metadata().map_or(0, |metadata| metadata.len());
        if size > max_file_bytes {
            debug!("Skipping {} ({size} bytes)", path.display());
            continue;
        }

        let Ok(content) = fs::read_to_string(path) else {
            debug!("Skipping non-text file {}", path.display());
            continue;
        };
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let key = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.insert(key, content);
    }

    debug!("Loaded {} files from {}", files.len(), root.display());
    Ok(files)
}
