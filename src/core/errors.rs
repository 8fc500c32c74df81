//!    Error handling
//!
//! Fallible I/O uses anyhow. Contract violations of the tool lifecycle
//! (double initialization, missing context) are not errors, they panic.

#[allow(unused_imports)]
pub use anyhow::{anyhow, bail, ensure, Error};
use anyhow::{Context, Result};

/// Result type alias used throughout the crate
pub type VistoolResult<T> = Result<T>;

/// Helper functions for creating common error contexts
pub trait VistoolContext<T> {
    /// Add file operation context to an error
    fn with_file_context<P: AsRef<std::path::Path>>(
        self,
        operation: &str,
        path: P,
    ) -> VistoolResult<T>;
}

impl<T, E> VistoolContext<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_file_context<P: AsRef<std::path::Path>>(
        self,
        operation: &str,
        path: P,
    ) -> VistoolResult<T> {
        self.with_context(|| {
            format!("Failed to {} file: {}", operation, path.as_ref().display())
        })
    }
}
