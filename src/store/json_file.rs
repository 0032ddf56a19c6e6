use super::PlantStore;
use crate::error::Result;
use crate::models::PlantRegistry;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Plant document kept as pretty-printed JSON on local disk.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "plants.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl PlantStore for JsonFileStore {
    fn load(&self) -> Result<PlantRegistry> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No plant file yet, starting empty");
                return Ok(PlantRegistry::new());
            }
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(PlantRegistry::new());
        }

        let registry: PlantRegistry = serde_json::from_str(&content)?;
        tracing::debug!(
            path = %self.path.display(),
            plants = registry.len(),
            "Loaded plant file"
        );
        Ok(registry)
    }

    fn save(&self, registry: &PlantRegistry) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(registry)?;
        let temp = self.temp_path();

        // Write beside the target, then rename over it.
        {
            let mut file = File::create(&temp)?;
            file.write_all(json.as_bytes())?;
            file.write_all(b"\n")?;
            file.sync_all()?;
        }
        if let Err(e) = fs::rename(&temp, &self.path) {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }

        tracing::debug!(
            path = %self.path.display(),
            plants = registry.len(),
            "Saved plant file"
        );
        Ok(())
    }
}
