use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::keys::normalize_key;
use crate::models::RemoteEvent;

/// A schedule category.
///
/// Each category is reconciled separately and stored in its own keyspace;
/// keys are unique only within a category, never globally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Music,
    Cinema,
    Theatre,
    SpecificHealing,
    PopHealing,
    MusicHealing,
    Knowledge,
}

#[derive(Debug, Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(String);

impl Category {
    /// Every known category, in display order.
    pub const ALL: [Category; 7] = [
        Category::Music,
        Category::Cinema,
        Category::Theatre,
        Category::SpecificHealing,
        Category::PopHealing,
        Category::MusicHealing,
        Category::Knowledge,
    ];

    /// Name of this category's store directory; also the feed table name.
    pub fn store_name(&self) -> &'static str {
        match self {
            Category::Music => "music",
            Category::Cinema => "cinema",
            Category::Theatre => "theatre",
            Category::SpecificHealing => "specific_healing",
            Category::PopHealing => "pop_healing",
            Category::MusicHealing => "music_healing",
            Category::Knowledge => "knowledge",
        }
    }

    /// Human-readable title.
    pub fn title(&self) -> &'static str {
        match self {
            Category::Music => "Music",
            Category::Cinema => "Cinema",
            Category::Theatre => "Theatre",
            Category::SpecificHealing => "Specific Healing",
            Category::PopHealing => "Pop Healing",
            Category::MusicHealing => "Music Healing",
            Category::Knowledge => "Knowledge",
        }
    }

    /// Derive the stable storage key for a remote record in this category.
    ///
    /// Music entries are identified by act name. The other categories reuse
    /// event titles freely across days, so their announcement link carries
    /// the identity instead.
    pub fn derive_key(&self, event: &RemoteEvent) -> String {
        match self {
            Category::Music => normalize_key(&event.name),
            _ => normalize_key(&event.announcement_link),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.store_name())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.store_name() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
