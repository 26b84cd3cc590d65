//! Domain entities: core data structures

use std::fmt;

use itertools::Itertools;

use crate::domain::error::DomainError;

/// Opaque participant identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<u32> for ParticipantId {
    fn from(value: u32) -> Self {
        Self::new(value.to_string())
    }
}

/// A person taking part in the gift exchange.
///
/// Participants are moved between circles, never cloned into two of them.
/// The reject flag is the only mutable state and is set through
/// [`Participant::mark_reject`].
///
/// There is no `Clone`, so no participant can sit in two circles:
///
/// ```compile_fail
/// use giftcircle::domain::Participant;
///
/// let p = Participant::new("1", "de", false);
/// let twin: Participant = p.clone();
/// ```
#[derive(Debug, PartialEq, Eq)]
pub struct Participant {
    pub id: ParticipantId,
    /// Grouping key for interleaving and domestic circles
    pub country: String,
    /// Willing to ship gifts abroad
    pub eligible_international: bool,
    is_reject: bool,
}

impl Participant {
    pub fn new(id: impl Into<ParticipantId>, country: impl Into<String>, international: bool) -> Self {
        Self {
            id: id.into(),
            country: country.into(),
            eligible_international: international,
            is_reject: false,
        }
    }

    pub fn is_reject(&self) -> bool {
        self.is_reject
    }

    /// Flag this participant as a reject.
    ///
    /// Returns `false` if the flag was already set; the flag is never cleared.
    pub fn mark_reject(&mut self) -> bool {
        let changed = !self.is_reject;
        self.is_reject = true;
        changed
    }

    /// `I` for international, `D` for domestic-only.
    pub fn letter(&self) -> char {
        if self.eligible_international {
            'I'
        } else {
            'D'
        }
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.id, self.letter(), self.country)?;
        if self.is_reject {
            f.write_str(" (REJECT)")?;
        }
        Ok(())
    }
}

/// A directed link along which one gift flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GiftLink<'a> {
    pub giver: &'a Participant,
    pub receiver: &'a Participant,
}

impl fmt::Display for GiftLink<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} -> {}]", self.giver, self.receiver)
    }
}

/// Parse a plain-text roster.
///
/// One record per line: `id, country, flag`. Fields are separated by commas
/// when the line has any, otherwise by whitespace, so `new zealand` works as a
/// country in comma-separated lines. The flag accepts `I`/`D`, `true`/`false`, `yes`/`no`, `1`/`0`.
/// Blank lines and `#` comments are skipped.
pub fn parse_roster(content: &str) -> Result<Vec<Participant>, DomainError> {
    let mut participants = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = if trimmed.contains(',') {
            trimmed
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect()
        } else {
            trimmed.split_whitespace().collect()
        };
        let [id, country, flag] = fields.as_slice() else {
            return Err(DomainError::InvalidRecord {
                line: line_no,
                message: format!("expected 3 fields, found {}", fields.len()),
            });
        };

        let international = parse_flag(flag).ok_or_else(|| DomainError::InvalidRecord {
            line: line_no,
            message: format!("invalid international flag: {flag}"),
        })?;
        participants.push(Participant::new(*id, *country, international));
    }

    ensure_unique_ids(&participants)?;
    Ok(participants)
}

/// Parse an international-eligibility flag.
pub fn parse_flag(flag: &str) -> Option<bool> {
    match flag.to_ascii_lowercase().as_str() {
        "i" | "true" | "yes" | "1" => Some(true),
        "d" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Every participant id must be unique within a roster.
pub fn ensure_unique_ids(participants: &[Participant]) -> Result<(), DomainError> {
    match participants.iter().map(|p| &p.id).duplicates().next() {
        Some(id) => Err(DomainError::DuplicateId(id.to_string())),
        None => Ok(()),
    }
}
