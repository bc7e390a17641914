//! Result output port for writing verdicts.

use crate::domain::VideoVerdict;

/// Port for outputting classification verdicts.
pub trait ResultOutput: Send + Sync {
    /// Writes a single verdict.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write(&self, verdict: &VideoVerdict) -> anyhow::Result<()>;

    /// Flushes any buffered output.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    fn flush(&self) -> anyhow::Result<()>;
}
