pub mod json_file;

pub use json_file::JsonFileStore;

use crate::error::Result;
use crate::models::PlantRegistry;

/// Durable holder of the whole plant document.
///
/// The document is the unit of persistence: callers load everything,
/// change it in memory and save everything back.
pub trait PlantStore: Send + Sync {
    /// Returns an empty registry when nothing has been saved yet.
    fn load(&self) -> Result<PlantRegistry>;

    /// Replaces the stored document. Readers never observe a partial write.
    fn save(&self, registry: &PlantRegistry) -> Result<()>;
}
