use std::fs;
use std::path::{Path, PathBuf};

use crate::task::Task;
use crate::{Error, Result};

/// What a finished run did, in a form that can be dumped as JSON.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RunSummary {
    pub input: PathBuf,
    pub num_mappers: usize,
    pub num_reducers: usize,
    pub boundaries: Vec<u64>,
    pub tasks: Vec<Task>,
    pub outputs: Vec<PathBuf>,
}

impl RunSummary {
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let serialized = serde_json::to_string_pretty(self)
            .map_err(|e| Error::io(format!("can't serialize summary for {}", path.display()), e.into()))?;
        fs::write(path, serialized)
            .map_err(|e| Error::io(format!("can't write {}", path.display()), e))
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::io(format!("can't read {}", path.display()), e))?;
        serde_json::from_str(&contents)
            .map_err(|e| Error::io(format!("can't parse {}", path.display()), e.into()))
    }
}
