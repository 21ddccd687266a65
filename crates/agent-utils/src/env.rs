//! Environment loading

use std::path::PathBuf;
use tracing::debug;

/// Load variables from the nearest `.env` file, if there is one
///
/// Variables already present in the process environment win. Returns the path
/// that was loaded.
pub fn load_env() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            debug!(path = %path.display(), "Loaded .env file");
            Some(path)
        }
        Err(e) => {
            debug!(error = %e, "No .env file loaded");
            None
        }
    }
}
