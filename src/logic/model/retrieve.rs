//! Model Retrieval
//!
//! Makes sure a model bundle is on disk before the check loads it,
//! downloading it from `model_url` when needed.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sha2::{Digest, Sha256};

use super::inference::{METADATA_FILE, MODEL_FILE};
use crate::config::NagConfig;
use crate::error::{NagError, NagResult};

/// Download timeout for model files
const DOWNLOAD_TIMEOUT_SECS: u64 = 300;

/// Return the bundle directory, fetching the bundle first if it is missing
pub fn retrieve_model(config: &NagConfig) -> NagResult<PathBuf> {
    let dir = config.model_path.clone();

    if is_bundle_present(&dir) {
        tracing::info!("Using model bundle at {}", dir.display());
        verify_checksum(&dir.join(MODEL_FILE), config.model_sha256.as_deref())?;
        return Ok(dir);
    }

    let base_url = config.model_url.as_deref().ok_or_else(|| {
        NagError::Model(format!(
            "No model at {} and no model_url configured",
            dir.display()
        ))
    })?;
    let base_url = base_url.trim_end_matches('/');

    std::fs::create_dir_all(&dir)?;
    let agent = ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
        .build();

    // Model goes to a .part file until its checksum is known to be good
    let partial = dir.join(format!("{}.part", MODEL_FILE));
    download(&agent, &format!("{}/{}", base_url, MODEL_FILE), &partial)?;
    if let Err(e) = verify_checksum(&partial, config.model_sha256.as_deref()) {
        let _ = std::fs::remove_file(&partial);
        return Err(e);
    }
    std::fs::rename(&partial, dir.join(MODEL_FILE))?;

    download(&agent, &format!("{}/{}", base_url, METADATA_FILE), &dir.join(METADATA_FILE))?;

    tracing::info!("Model bundle downloaded from {} to {}", base_url, dir.display());
    Ok(dir)
}

fn is_bundle_present(dir: &Path) -> bool {
    dir.join(MODEL_FILE).is_file() && dir.join(METADATA_FILE).is_file()
}

fn download(agent: &ureq::Agent, url: &str, dest: &Path) -> NagResult<()> {
    tracing::info!("Downloading {}", url);

    let response = agent.get(url).call().map_err(|e| match e {
        ureq::Error::Status(status, _) => {
            NagError::Model(format!("Download of {} failed with HTTP {}", url, status))
        }
        other => NagError::Network(other.to_string()),
    })?;

    let mut reader = response.into_reader();
    let mut file = File::create(dest)?;
    std::io::copy(&mut reader, &mut file)?;
    Ok(())
}

/// Compute SHA256 hash of file
pub fn compute_file_hash(path: &Path) -> Result<String, std::io::Error> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Check `path` against the expected digest, if one is configured
pub fn verify_checksum(path: &Path, expected: Option<&str>) -> NagResult<()> {
    let Some(expected) = expected else {
        return Ok(());
    };

    let actual = compute_file_hash(path)?;
    if !actual.eq_ignore_ascii_case(expected) {
        tracing::error!("Checksum mismatch for {}", path.display());
        return Err(NagError::ModelIntegrity {
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // sha256("hello")
    const HELLO_SHA256: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    fn config_for(dir: &Path) -> NagConfig {
        NagConfig {
            model_path: dir.to_path_buf(),
            ..NagConfig::with_threshold(0.8)
        }
    }

    fn write_bundle(dir: &Path, model: &[u8]) {
        std::fs::write(dir.join(MODEL_FILE), model).unwrap();
        std::fs::write(dir.join(METADATA_FILE), r#"{"classes": ["defect"], "n_features": 8}"#).unwrap();
    }

    #[test]
    fn test_compute_file_hash() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f");
        std::fs::write(&path, b"hello").unwrap();

        assert_eq!(compute_file_hash(&path).unwrap(), HELLO_SHA256);
    }

    #[test]
    fn test_present_bundle_used_as_is() {
        let dir = tempfile::tempdir().unwrap();
        write_bundle(dir.path(), b"hello");

        let config = NagConfig {
            model_sha256: Some(HELLO_SHA256.to_uppercase()),
            ..config_for(dir.path())
        };
        assert_eq!(retrieve_model(&config).unwrap(), dir.path());
    }

    #[test]
    fn test_present_bundle_with_bad_checksum() {
        let dir = tempfile::tempdir().unwrap();
        write_bundle(dir.path(), b"tampered");

        let config = NagConfig {
            model_sha256: Some(HELLO_SHA256.to_string()),
            ..config_for(dir.path())
        };
        assert!(matches!(
            retrieve_model(&config),
            Err(NagError::ModelIntegrity { .. })
        ));
    }

    #[test]
    fn test_missing_bundle_without_url() {
        let dir = tempfile::tempdir().unwrap();
        let err = retrieve_model(&config_for(&dir.path().join("absent"))).unwrap_err();
        assert!(err.to_string().contains("no model_url configured"));
    }
}
