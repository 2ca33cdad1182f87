//! Transport collaborator boundary
//!
//! The console reads entity-shaped data through [`ProjectSource`]. Retries,
//! token refresh and redirect-on-unauthorized live on the other side of
//! this trait.

use std::path::PathBuf;

use thiserror::Error;

use crate::entities::Project;

/// Errors raised by a transport collaborator
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("could not read {path:?}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("malformed payload: {0}")]
    Payload(String),
}

/// Fallible request/response source of projects
pub trait ProjectSource {
    fn fetch_projects(&self) -> Result<Vec<Project>, TransportError>;
}

/// Reads a project list from a YAML or JSON file
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ProjectSource for FileSource {
    fn fetch_projects(&self) -> Result<Vec<Project>, TransportError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| TransportError::Io {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        let is_json = self
            .path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            serde_json::from_str(&contents).map_err(|e| TransportError::Payload(e.to_string()))
        } else {
            serde_yml::from_str(&contents).map_err(|e| TransportError::Payload(e.to_string()))
        }
    }
}
