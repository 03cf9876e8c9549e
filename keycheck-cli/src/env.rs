//! Environment file loading
//!
//! Variables already present in the process environment are never
//! overwritten by file values.

use std::path::{Path, PathBuf};

use anyhow::Context;

/// Load `.env.local` from the working directory, then `.env` from the working
/// directory or the nearest parent. Returns the files that were loaded.
///
/// Missing files are not an error; malformed ones are reported on stderr
/// since logging is not initialized yet.
pub fn load_default_env_files() -> Vec<PathBuf> {
    let mut loaded = Vec::new();

    match dotenvy::from_filename(".env.local") {
        Ok(path) => loaded.push(path),
        Err(e) => {
            // Not an error if the file doesn't exist
            if !matches!(e, dotenvy::Error::Io(_)) {
                eprintln!("Warning: Failed to load .env.local: {}", e);
            }
        }
    }

    match dotenvy::dotenv() {
        Ok(path) => loaded.push(path),
        Err(e) => {
            if !matches!(e, dotenvy::Error::Io(_)) {
                eprintln!("Warning: Failed to load .env: {}", e);
            }
        }
    }

    loaded
}

/// Load an explicitly requested file; any failure is fatal
pub fn load_env_file(path: &Path) -> anyhow::Result<PathBuf> {
    dotenvy::from_path(path)
        .with_context(|| format!("Failed to load env file {}", path.display()))?;
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_env_file_does_not_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "KEYCHECK_ENV_TEST_FROM_FILE=file-value").unwrap();
        writeln!(file, "KEYCHECK_ENV_TEST_PRESET=file-value").unwrap();

        std::env::set_var("KEYCHECK_ENV_TEST_PRESET", "process-value");
        load_env_file(file.path()).unwrap();

        assert_eq!(
            std::env::var("KEYCHECK_ENV_TEST_FROM_FILE").as_deref(),
            Ok("file-value")
        );
        assert_eq!(
            std::env::var("KEYCHECK_ENV_TEST_PRESET").as_deref(),
            Ok("process-value")
        );
    }

    #[test]
    fn test_load_missing_env_file_fails() {
        let err = load_env_file(Path::new("/nonexistent/keycheck/.env")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/keycheck/.env"));
    }
}
