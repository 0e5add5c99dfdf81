//! Display-name resolution for participants and owning groups.

use mercato_core::{GroupRef, ParticipantId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prefix carried by raw club identifiers.
const CLUB_ID_PREFIX: &str = "mpg_championship_club_";

/// Number of trailing id characters used when a participant has no name.
const FALLBACK_NAME_LEN: usize = 6;

/// Lookup table from opaque ids to display names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Directory {
    participants: BTreeMap<ParticipantId, String>,
    groups: BTreeMap<String, String>,
}

impl Directory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a participant display name.
    pub fn insert_participant(&mut self, id: impl Into<ParticipantId>, name: impl Into<String>) {
        self.participants.insert(id.into(), name.into());
    }

    /// Register an owning-group display name.
    pub fn insert_group(&mut self, id: impl Into<String>, name: impl Into<String>) {
        self.groups.insert(id.into(), name.into());
    }

    /// Builder form of [`Directory::insert_participant`].
    pub fn with_participant(mut self, id: impl Into<ParticipantId>, name: impl Into<String>) -> Self {
        self.insert_participant(id, name);
        self
    }

    /// Builder form of [`Directory::insert_group`].
    pub fn with_group(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.insert_group(id, name);
        self
    }

    /// Display name of a participant, falling back to the tail of its id.
    pub fn participant_name(&self, id: &str) -> String {
        if let Some(name) = self.participants.get(id) {
            return name.clone();
        }
        let chars: Vec<char> = id.chars().collect();
        let start = chars.len().saturating_sub(FALLBACK_NAME_LEN);
        chars[start..].iter().collect()
    }

    /// Resolve an owning-group id. Empty or missing ids are unknown.
    pub fn resolve_group(&self, id: Option<&str>) -> Option<GroupRef> {
        let id = id.map(str::trim).filter(|id| !id.is_empty())?;

        let name = match self.groups.get(id) {
            Some(name) => name.clone(),
            None => match id.strip_prefix(CLUB_ID_PREFIX) {
                Some(suffix) => format!("Club #{suffix}"),
                None => id.to_string(),
            },
        };

        Some(GroupRef {
            id: id.to_string(),
            name,
        })
    }

    /// Number of named participants.
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Number of named groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}
