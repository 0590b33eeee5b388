//! Default server and model locations.
//!
//! A release bundle ships the server under `bin/` and models under `models/`
//! next to the launcher, so the defaults are derived from a base directory
//! (normally the current working directory).

use std::env::consts::EXE_SUFFIX;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Model file used when nothing else is configured.
pub const DEFAULT_MODEL_FILE: &str = "ggml-large-v3-turbo.bin";

/// Server binary names tried in order, without the platform suffix.
pub const SERVER_EXECUTABLE_CANDIDATES: [&str; 2] = ["whisper-server", "server"];

/// First existing server binary under `<base_dir>/bin`.
///
/// Returns the first candidate even when none exists so callers always have
/// a path to show and validate.
pub fn default_executable_path(base_dir: &Path) -> PathBuf {
    let bin_dir = base_dir.join("bin");

    let candidates: Vec<PathBuf> = SERVER_EXECUTABLE_CANDIDATES
        .iter()
        .map(|name| bin_dir.join(format!("{name}{EXE_SUFFIX}")))
        .collect();

    if let Some(found) = candidates.iter().find(|path| path.is_file()) {
        debug!(path = %found.display(), "found server executable");
        return found.clone();
    }

    bin_dir.join(format!("{}{EXE_SUFFIX}", SERVER_EXECUTABLE_CANDIDATES[0]))
}

/// `<base_dir>/models/ggml-large-v3-turbo.bin`
pub fn default_model_path(base_dir: &Path) -> PathBuf {
    base_dir.join("models").join(DEFAULT_MODEL_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn falls_back_to_whisper_server_when_nothing_exists() {
        let temp = tempdir().unwrap();
        let exe = default_executable_path(temp.path());
        assert_eq!(
            exe,
            temp.path()
                .join("bin")
                .join(format!("whisper-server{EXE_SUFFIX}"))
        );
    }

    #[test]
    fn picks_legacy_server_name_when_only_it_exists() {
        let temp = tempdir().unwrap();
        let bin = temp.path().join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        let legacy = bin.join(format!("server{EXE_SUFFIX}"));
        std::fs::write(&legacy, b"stub").unwrap();

        assert_eq!(default_executable_path(temp.path()), legacy);
    }

    #[test]
    fn prefers_whisper_server_over_legacy_name() {
        let temp = tempdir().unwrap();
        let bin = temp.path().join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::write(bin.join(format!("server{EXE_SUFFIX}")), b"stub").unwrap();
        let preferred = bin.join(format!("whisper-server{EXE_SUFFIX}"));
        std::fs::write(&preferred, b"stub").unwrap();

        assert_eq!(default_executable_path(temp.path()), preferred);
    }

    #[test]
    fn model_default_lives_under_models() {
        let model = default_model_path(Path::new("/srv/app"));
        assert_eq!(model, PathBuf::from("/srv/app/models/ggml-large-v3-turbo.bin"));
    }
}
