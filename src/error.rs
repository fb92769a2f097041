use std::path::PathBuf;

/// Reason codes for interval and block-list failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordError {
    #[error("coordinate intervals do not intersect")]
    NoIntersection,

    #[error("interval span would be < 1 (min {min}, max {max})")]
    InvalidSpan { min: i64, max: i64 },

    #[error("blocks out of coordinate order at index {index}")]
    OutOfOrder { index: usize },

    #[error("blocks overlap at index {index}")]
    OverlappingBlocks { index: usize },

    #[error("cannot extend by {remaining} bases: no block to extend")]
    ExtensionUnsatisfiable { remaining: i64 },
}

/// Errors that can occur in denovofusion.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid parameter: {0}")]
    Parameter(String),

    #[error("I/O error: {source} ({path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("FASTA parsing error: {0}")]
    Fasta(String),

    #[error("{format} parsing error at line {line}: {message}")]
    Parse {
        format: &'static str,
        line: usize,
        message: String,
    },

    #[error("coordinate error: {0}")]
    Coord(#[from] CoordError),

    #[error("alignment error: {0}")]
    Alignment(String),

    #[error("sequence error: {0}")]
    Sequence(String),

    #[error("no contig could be resolved ({failed} failed)")]
    NoContigResolved { failed: usize },
}

impl Error {
    /// Convenience for wrapping an `io::Error` with a path context.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: path.into(),
        }
    }

    pub(crate) fn parse(format: &'static str, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            format,
            line,
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            source: err,
            path: PathBuf::from("<unknown>"),
        }
    }
}
