use std::io;
use thiserror::Error;

/// Errors a transport reports back to the connection layer.
#[derive(Error, Debug)]
pub enum Error {
    /// Per-connection transport state could not be allocated
    #[error("out of memory: {0}")]
    OutOfMemory(&'static str),

    /// The transport has been torn down and accepts no new connections
    #[error("transport is shutting down")]
    ShuttingDown,

    /// The connection already carries transport state
    #[error("connection {0} already has transport state")]
    AlreadyAllocated(u64),

    /// A transport with this name is already registered
    #[error("transport {0:?} is already registered")]
    DuplicateTransport(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Negative errno for callers that speak the integer transport contract.
    pub fn errno(&self) -> i32 {
        match self {
            Error::OutOfMemory(_) => -libc::ENOMEM,
            Error::ShuttingDown => -libc::ESHUTDOWN,
            Error::AlreadyAllocated(_) | Error::DuplicateTransport(_) => -libc::EEXIST,
            Error::Io(e) => -e.raw_os_error().unwrap_or(libc::EIO),
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(e) => e,
            Error::OutOfMemory(_) => io::Error::new(io::ErrorKind::OutOfMemory, err),
            Error::ShuttingDown => io::Error::new(io::ErrorKind::NotConnected, err),
            Error::AlreadyAllocated(_) | Error::DuplicateTransport(_) => {
                io::Error::new(io::ErrorKind::AlreadyExists, err)
            }
        }
    }
}

/// Result type alias for transport operations
pub type Result<T> = std::result::Result<T, Error>;
