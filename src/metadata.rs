use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io;

/// Display metadata for one raw sequence. Purely presentational.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceMetadata {
    pub label: String,
    #[serde(default)]
    pub sublabel: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// The metadata document shipped alongside a report, keyed by raw-sequence id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub sequences: HashMap<String, SequenceMetadata>,
}

impl Metadata {
    pub fn from_json_file(filename: &str) -> anyhow::Result<Self> {
        let file = File::open(filename)
            .with_context(|| format!("Could not open metadata file '{filename}'"))?;
        let metadata: Metadata = serde_json::from_reader(io::BufReader::new(file))
            .with_context(|| format!("Could not parse metadata file '{filename}'"))?;
        log::debug!("loaded metadata for {} sequences", metadata.sequences.len());
        Ok(metadata)
    }

    pub fn from_json_str(data: &str) -> anyhow::Result<Self> {
        let metadata: Metadata =
            serde_json::from_str(data).context("Could not parse metadata JSON")?;
        Ok(metadata)
    }

    pub fn label_for(&self, sequence_id: &str) -> Option<&str> {
        self.sequences
            .get(sequence_id)
            .map(|entry| entry.label.as_str())
    }
}
