//! Base plugin trait definition.
//!
//! Extractors and OCR backends implement `Plugin`, which provides a startup
//! check and the metadata used for logging.

use crate::Result;

/// Base trait shared by document extractors and OCR backends.
///
/// Implementations must be `Send + Sync`: one instance serves every request.
pub trait Plugin: Send + Sync {
    /// Stable identifier used in log output.
    fn name(&self) -> &str;

    fn version(&self) -> String;

    /// Called once before the plugin serves requests.
    ///
    /// Backends that depend on external tools should verify them here.
    fn initialize(&self) -> Result<()> {
        Ok(())
    }
}
