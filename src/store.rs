use std::path::PathBuf;

use crate::analysis::AnalysisResult;
use crate::error::Error;

/// Resolves analysis tokens to stored results.
pub trait AnalysisStore: Send + Sync {
    fn load(&self, token: &str) -> Result<AnalysisResult, Error>;
}

/// Results stored as `<dir>/<token>.json`.
pub struct JsonAnalysisStore {
    dir: PathBuf,
}

impl JsonAnalysisStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, token: &str) -> Option<PathBuf> {
        is_valid_token(token).then(|| self.dir.join(format!("{token}.json")))
    }
}

/// Tokens are opaque but never contain path separators or dots.
pub(crate) fn is_valid_token(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl AnalysisStore for JsonAnalysisStore {
    fn load(&self, token: &str) -> Result<AnalysisResult, Error> {
        let path = self
            .path_for(token)
            .ok_or_else(|| Error::UnknownToken(token.to_string()))?;

        let bytes = std::fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::UnknownToken(token.to_string()),
            _ => Error::InvalidResult(format!("{}: {}", path.display(), e)),
        })?;

        let result: AnalysisResult = serde_json::from_slice(&bytes)
            .map_err(|e| Error::InvalidResult(format!("{}: {}", path.display(), e)))?;

        log::debug!(
            "Loaded analysis {token}: {} pathways, {} resources",
            result.pathways.len(),
            result.resource_summary.len()
        );
        Ok(result)
    }
}
