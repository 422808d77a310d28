use thiserror::Error;

/// Violations of the EMMA coverage entry format
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoverageError {
    #[error("malformed coverage value '{0}', expected '(covered/total)'")]
    MalformedRatio(String),
    #[error("unknown coverage type '{0}'")]
    UnknownMetric(String),
}
