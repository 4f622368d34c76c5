//! Infrastructure-level errors (wraps application errors)

use std::io;

use thiserror::Error;

use crate::application::ApplicationError;

/// Failures outside the services: terminal output the CLI writes itself.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("cannot write rendered hierarchy to stdout")]
    Stdout(#[source] io::Error),
}
