use std::path::PathBuf;

use thiserror::Error;

use crate::reader::Section;

/// Errors that can occur while reading modes, animating them, or writing trajectories.
#[derive(Error, Debug)]
pub enum Error {
    /// The input file could not be opened.
    #[error("could not open '{}': {source}", path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output file could not be created.
    #[error("could not create '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any other I/O failure while streaming a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required section marker never appeared in the input.
    #[error("{origin}: missing {section} section")]
    MissingSection { origin: String, section: Section },

    /// The contents of a section could not be interpreted.
    #[error("{origin}:{line}: malformed {section} section: {message}")]
    Malformed {
        origin: String,
        section: Section,
        /// Line number where the problem was found (1-based, 0 if unknown).
        line: usize,
        message: String,
    },

    #[error("mode index {index} is out of range, there are {nmodes} modes")]
    IndexOutOfRange { index: usize, nmodes: usize },

    #[error("the frame half-width must be at least 1")]
    InvalidHalfWidth,

    #[error("cannot write a trajectory without atom labels")]
    EmptyLabels,
}

pub type Result<T> = std::result::Result<T, Error>;
