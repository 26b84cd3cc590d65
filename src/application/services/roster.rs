//! Roster service
//!
//! Turns raw roster files into participants. The allocation never sees raw
//! records, only well-formed, uniquely identified participants.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{ensure_unique_ids, parse_roster, Participant};
use crate::infrastructure::traits::FileSystem;

/// On-disk roster layout, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterFormat {
    /// `id, country, flag` per line
    Text,
    /// `[[participants]]` tables
    Toml,
}

impl RosterFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Text,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RosterFile {
    #[serde(default)]
    participants: Vec<RosterRecord>,
}

#[derive(Debug, Deserialize)]
struct RosterRecord {
    id: RawId,
    country: String,
    #[serde(default)]
    international: bool,
}

/// Ids may be written as numbers or strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

impl From<RosterRecord> for Participant {
    fn from(record: RosterRecord) -> Self {
        let id = match record.id {
            RawId::Number(n) => n.to_string(),
            RawId::Text(s) => s,
        };
        Participant::new(id.as_str(), record.country, record.international)
    }
}

/// Service for loading participant rosters.
pub struct RosterService {
    fs: Arc<dyn FileSystem>,
}

impl RosterService {
    /// Create a new roster service.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Load participants from a roster file, in file order.
    #[instrument(skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<Vec<Participant>> {
        if !self.fs.is_file(path) {
            return Err(ApplicationError::RosterNotFound(path.to_path_buf()));
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read roster", path)?;

        let participants = match RosterFormat::from_path(path) {
            RosterFormat::Text => parse_roster(&content)?,
            RosterFormat::Toml => {
                let file: RosterFile =
                    toml::from_str(&content).map_err(|e| ApplicationError::InvalidRoster {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    })?;
                let participants: Vec<Participant> =
                    file.participants.into_iter().map(Participant::from).collect();
                ensure_unique_ids(&participants)?;
                participants
            }
        };

        debug!("loaded {} participants", participants.len());
        Ok(participants)
    }
}

const SAMPLE: &[(u32, &str, bool)] = &[
    (1, "usa", true),
    (2, "usa", true),
    (3, "usa", true),
    (4, "usa", true),
    (5, "usa", true),
    (6, "usa", true),
    (7, "usa", true),
    (8, "usa", true),
    (9, "usa", false),
    (10, "ca", true),
    (11, "ca", true),
    (12, "ca", true),
    (13, "ca", true),
    (14, "ca", true),
    (15, "ca", true),
    (16, "ch", false),
    (17, "ch", false),
    (18, "ch", false),
    (19, "ch", true),
    (20, "ch", true),
    (21, "in", true),
    (22, "in", true),
    (23, "in", true),
    (24, "zb", true),
    (25, "zb", true),
    (26, "de", true),
    (27, "de", false),
    (28, "de", false),
    (29, "de", true),
    (30, "de", true),
    (31, "de", true),
    (32, "de", true),
    (33, "de", true),
];

/// Built-in demo population of 33 participants across six countries.
///
/// Eight international `usa` members, six `ca`, smaller groups elsewhere, and
/// a single domestic-only `usa` member who cannot form a circle alone.
pub fn sample_roster() -> Vec<Participant> {
    SAMPLE
        .iter()
        .map(|&(id, country, international)| Participant::new(id, country, international))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("roster.toml", RosterFormat::Toml)]
    #[case("ROSTER.TOML", RosterFormat::Toml)]
    #[case("roster.csv", RosterFormat::Text)]
    #[case("roster", RosterFormat::Text)]
    fn given_path_when_detecting_format_then_uses_extension(
        #[case] path: &str,
        #[case] expected: RosterFormat,
    ) {
        assert_eq!(RosterFormat::from_path(Path::new(path)), expected);
    }

    #[test]
    fn given_sample_roster_when_built_then_has_unique_ids() {
        let roster = sample_roster();

        assert_eq!(roster.len(), 33);
        assert!(ensure_unique_ids(&roster).is_ok());
        assert_eq!(roster.iter().filter(|p| p.eligible_international).count(), 27);
    }
}
