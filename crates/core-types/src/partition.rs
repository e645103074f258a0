use crate::enums::{Gender, Sport};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The category a statistic is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum PartitionKey {
    All,
    Team,
    Gender,
    TeamGender,
    Sport,
    SportGender,
}

/// A concrete partition value, e.g. `"Female"` or `"Women's Basketball/Female"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Partition(String);

impl Partition {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What we know about a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamProfile {
    pub gender: Gender,
    pub sport: Sport,
}

impl TeamProfile {
    pub fn infer(team: &str) -> Self {
        Self {
            gender: Gender::infer(team),
            sport: Sport::infer(team),
        }
    }
}

/// Resolves a free-text group key to a team profile.
///
/// Explicit entries win; anything not listed falls back to text inference.
/// Lookups ignore case and surrounding whitespace.
#[derive(Debug, Clone, Default)]
pub struct TeamDirectory {
    entries: HashMap<String, TeamProfile>,
}

impl TeamDirectory {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, TeamProfile)>,
        S: AsRef<str>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, profile)| (normalize(name.as_ref()), profile))
                .collect(),
        }
    }

    pub fn profile(&self, group_key: &str) -> TeamProfile {
        self.entries
            .get(&normalize(group_key))
            .copied()
            .unwrap_or_else(|| TeamProfile::infer(group_key))
    }

    /// The partition `group_key` falls into under `key`.
    ///
    /// Unrecognised teams are kept under `Unknown` buckets rather than dropped.
    pub fn partition(&self, key: PartitionKey, group_key: &str) -> Partition {
        let team = match group_key.trim() {
            "" => "Unknown",
            trimmed => trimmed,
        };
        match key {
            PartitionKey::All => Partition::new("All"),
            PartitionKey::Team => Partition::new(team),
            PartitionKey::Gender => Partition::new(self.profile(group_key).gender.to_string()),
            PartitionKey::TeamGender => {
                Partition::new(format!("{team}/{}", self.profile(group_key).gender))
            }
            PartitionKey::Sport => Partition::new(self.profile(group_key).sport.to_string()),
            PartitionKey::SportGender => {
                let profile = self.profile(group_key);
                Partition::new(format!("{}/{}", profile.sport, profile.gender))
            }
        }
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_entries_override_inference() {
        let directory = TeamDirectory::new([(
            "Lady Vols",
            TeamProfile {
                gender: Gender::Female,
                sport: Sport::Basketball,
            },
        )]);
        assert_eq!(directory.profile("lady vols ").gender, Gender::Female);
        assert_eq!(directory.profile("Lady Vols").sport, Sport::Basketball);
        assert_eq!(directory.profile("Mens Basketball").gender, Gender::Male);
    }

    #[test]
    fn partitions_by_key() {
        let directory = TeamDirectory::default();
        let team = "Women's Basketball";
        assert_eq!(directory.partition(PartitionKey::All, team).as_str(), "All");
        assert_eq!(directory.partition(PartitionKey::Team, team).as_str(), team);
        assert_eq!(directory.partition(PartitionKey::Gender, team).as_str(), "Female");
        assert_eq!(
            directory.partition(PartitionKey::TeamGender, team).as_str(),
            "Women's Basketball/Female"
        );
        assert_eq!(directory.partition(PartitionKey::Sport, team).as_str(), "Basketball");
        assert_eq!(
            directory.partition(PartitionKey::SportGender, team).as_str(),
            "Basketball/Female"
        );
    }

    #[test]
    fn unknown_teams_stay_in_an_unknown_bucket() {
        let directory = TeamDirectory::default();
        assert_eq!(directory.partition(PartitionKey::Gender, "Track").as_str(), "Unknown");
        assert_eq!(directory.partition(PartitionKey::Team, "").as_str(), "Unknown");
    }
}
