//! Mapping Assembler: folds ranked matches and their reasoning into the
//! `requirement → [match]` document and persists it.

use std::path::Path;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::errors::MappingError;
use crate::mapping::corpus::ExperienceItem;
use crate::mapping::similarity::ScoredIndex;

/// One experience matched to a requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub experience: ExperienceItem,
    /// Cosine similarity clamped to [0, 1], two decimals, e.g. `"0.83"`.
    pub similarity: String,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MappingEntry {
    pub requirement: String,
    pub matches: Vec<Match>,
}

/// The persisted artifact. Serializes as a JSON object whose keys appear in
/// requirement-corpus order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mappings {
    pub entries: Vec<MappingEntry>,
}

impl Mappings {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn match_count(&self) -> usize {
        self.entries.iter().map(|e| e.matches.len()).sum()
    }
}

impl Serialize for Mappings {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.requirement, &entry.matches)?;
        }
        map.end()
    }
}

/// Formats a raw cosine score for the output document. Negative scores read
/// as `"0.00"`.
pub fn format_similarity(score: f32) -> String {
    let clamped = if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    };
    format!("{clamped:.2}")
}

/// Zips requirements, ranked picks and reasoning into `Mappings`.
///
/// `ranked` and `reasoning` are parallel to `requirements` (and to each other
/// row by row). Requirements without matches are left out.
pub fn assemble(
    requirements: &[String],
    experiences: &[ExperienceItem],
    ranked: &[Vec<ScoredIndex>],
    reasoning: Vec<Vec<String>>,
) -> Mappings {
    let entries = requirements
        .iter()
        .zip(ranked)
        .zip(reasoning)
        .filter(|((_, picks), _)| !picks.is_empty())
        .map(|((requirement, picks), texts)| MappingEntry {
            requirement: requirement.clone(),
            matches: picks
                .iter()
                .zip(texts)
                .map(|(pick, reasoning)| Match {
                    experience: experiences[pick.index].clone(),
                    similarity: format_similarity(pick.score),
                    reasoning,
                })
                .collect(),
        })
        .collect();

    Mappings { entries }
}

/// Pretty-prints with four-space indentation, the layout downstream tooling
/// already reads.
pub fn to_pretty_json(mappings: &Mappings) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    mappings.serialize(&mut serializer)?;
    Ok(buf)
}

/// Writes the mappings document, creating the parent directory if needed.
pub async fn write_mappings(path: &Path, mappings: &Mappings) -> Result<(), MappingError> {
    let bytes = to_pretty_json(mappings).map_err(MappingError::Serialize)?;
    let write_err = |source| MappingError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }
    tokio::fs::write(path, bytes).await.map_err(write_err)
}
