//! SRC_URI style fetchable leaves

use std::fmt;
use thiserror::Error;

use crate::element::Element;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchableError {
    #[error("Fetchable \"{0}\" has no file name")]
    MissingFilename(String),
    #[error("Unexpected \"->\", file renames are not enabled")]
    UnexpectedRename,
}

/// A URI plus the file name it is stored under
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fetchable {
    uri: String,
    filename: String,
}

impl Fetchable {
    pub fn new(uri: &str) -> Result<Self, FetchableError> {
        if uri == "->" {
            return Err(FetchableError::UnexpectedRename);
        }
        let filename = basename(uri);
        if filename.is_empty() {
            return Err(FetchableError::MissingFilename(uri.to_string()));
        }
        Ok(Fetchable {
            uri: uri.to_string(),
            filename: filename.to_string(),
        })
    }

    pub fn renamed(uri: &str, filename: &str) -> Result<Self, FetchableError> {
        if filename.is_empty() || filename.contains('/') || filename == "(" || filename == ")" {
            return Err(FetchableError::MissingFilename(format!("{} -> {}", uri, filename)));
        }
        Ok(Fetchable {
            uri: uri.to_string(),
            filename: filename.to_string(),
        })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn is_renamed(&self) -> bool {
        basename(&self.uri) != self.filename
    }
}

fn basename(uri: &str) -> &str {
    uri.rsplit('/').next().unwrap_or(uri)
}

impl fmt::Display for Fetchable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_renamed() {
            write!(f, "{} -> {}", self.uri, self.filename)
        } else {
            write!(f, "{}", self.uri)
        }
    }
}

impl Element for Fetchable {
    type Err = FetchableError;

    fn parse_element(token: &str) -> Result<Self, Self::Err> {
        Fetchable::new(token)
    }

    fn parse_renamed(token: &str, rename: &str) -> Result<Self, Self::Err> {
        Fetchable::renamed(token, rename)
    }
}
