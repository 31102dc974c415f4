// Error types for boxbreath. The session engine itself never fails; these
// cover the collaborators it drives and the terminal shell around it.

use std::io;
use std::path::PathBuf;

/// Failure to emit an audible phase cue
#[derive(Debug, thiserror::Error)]
pub enum CueError {
    #[error("cue output unavailable: {0}")]
    Io(#[from] io::Error),
}

/// Failure to hold or release the keep-awake hint
#[derive(Debug, thiserror::Error)]
pub enum PowerHintError {
    #[error("power hint request rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),

    #[error("could not open log file {path}: {source}")]
    LogFile { path: PathBuf, source: io::Error },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        let err = CueError::from(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
        assert_eq!(err.to_string(), "cue output unavailable: closed");

        assert_eq!(
            PowerHintError::Rejected("busy".into()).to_string(),
            "power hint request rejected: busy"
        );

        let err = AppError::LogFile {
            path: PathBuf::from("/tmp/x.log"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "could not open log file /tmp/x.log: denied");
    }
}
