//! Path context for I/O failures of instance and output files.

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

pub trait IoResultExt<T> {
    /// Wrap an I/O error as `OperationFailed`, naming the action and the path.
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;

    /// Like [`with_path_context`](IoResultExt::with_path_context), except that a
    /// file gone missing is reported as `InputNotFound`.
    fn reading_input(self, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{} {}", action, path.display()),
            source: Box::new(e),
        })
    }

    fn reading_input(self, path: &Path) -> ApplicationResult<T> {
        match self {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ApplicationError::InputNotFound(path.to_path_buf()))
            }
            other => other.with_path_context("read input", path),
        }
    }
}
