//! Layered INI configuration files.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use ini::Ini;
use tracing::debug;

use super::CredentialError;

/// Parsed configuration files, lowest priority first.
#[derive(Debug, Default)]
pub(super) struct ConfigLayers {
    layers: Vec<Ini>,
}

impl ConfigLayers {
    /// Reads every existing file in `paths`. Missing or unreadable files are
    /// skipped; files that exist but do not parse are rejected.
    pub(super) fn load(paths: &[Utf8PathBuf]) -> Result<Self, CredentialError> {
        let mut layers = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(contents) = read_optional(path) else {
                continue;
            };
            let parsed = Ini::load_from_str(&contents).map_err(|err| CredentialError::Parse {
                path: path.clone(),
                message: err.to_string(),
            })?;
            debug!(path = %path, "loaded OVH configuration file");
            layers.push(parsed);
        }
        Ok(Self { layers })
    }

    /// Looks `key` up in `section`, letting later files win.
    pub(super) fn get(&self, section: &str, key: &str) -> Option<String> {
        self.layers
            .iter()
            .rev()
            .find_map(|layer| layer.get_from(Some(section), key))
            .map(str::to_owned)
    }
}

fn read_optional(path: &Utf8Path) -> Option<String> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_str().is_empty() => dir,
        _ => Utf8Path::new("."),
    };
    let file_name = path.file_name()?;

    let dir = match Dir::open_ambient_dir(parent, ambient_authority()) {
        Ok(dir) => dir,
        Err(err) => {
            log_skipped(path, &err);
            return None;
        }
    };

    match dir.read_to_string(file_name) {
        Ok(contents) => Some(contents),
        Err(err) => {
            log_skipped(path, &err);
            None
        }
    }
}

fn log_skipped(path: &Utf8Path, err: &io::Error) {
    if err.kind() != io::ErrorKind::NotFound {
        debug!(path = %path, error = %err, "skipping unreadable OVH configuration file");
    }
}
