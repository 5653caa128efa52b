//! Data models for Sveriges Radio API responses
//!
//! This module contains the structures needed to deserialize the program
//! index, the "right now" playlists and the traffic messages.
//!
//! Unknown fields are ignored everywhere. Values are strictly typed: a channel
//! id sent as `"132"` is a parse failure, not a number.

use serde::{Deserialize, Deserializer, Serialize};

/// Deserializes `null` as the type's default value
///
/// Combined with `#[serde(default)]` this treats a missing or null list as an
/// empty one.
fn null_to_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Program Index Models
// ============================================================================

/// A radio channel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Channel {
    /// Upstream channel identifier (e.g., 132 for P1)
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

/// One entry of the program index
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Program {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    /// Channel broadcasting the program, absent for some podcasts
    #[serde(default)]
    pub channel: Option<Channel>,
}

/// Paging information of the program index
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub totalhits: u32,
    #[serde(default)]
    pub totalpages: u32,
    #[serde(default)]
    pub nextpage: Option<String>,
}

/// Response of `GET /programs/index`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelIndex {
    #[serde(default, deserialize_with = "null_to_default")]
    pub programs: Vec<Program>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl ChannelIndex {
    /// Channel ids in index order, skipping programs without a channel
    pub fn channel_ids(&self) -> Vec<i64> {
        self.programs
            .iter()
            .filter_map(|program| match &program.channel {
                Some(channel) => Some(channel.id),
                None => {
                    tracing::debug!(
                        program = ?program.id,
                        "Skipping program without channel"
                    );
                    None
                }
            })
            .collect()
    }

    /// Number of pages announced by the upstream (1 when unpaginated)
    pub fn total_pages(&self) -> u32 {
        self.pagination
            .as_ref()
            .map(|p| p.totalpages.max(1))
            .unwrap_or(1)
    }
}

// ============================================================================
// Playlist Models
// ============================================================================

/// A song as described by the playlist API
///
/// All fields are free-form text and any of them may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Song {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub composer: Option<String>,
    #[serde(default)]
    pub recordlabel: Option<String>,
}

/// Current and previous song of a channel
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Playlist {
    #[serde(default)]
    pub song: Option<Song>,
    #[serde(default)]
    pub previoussong: Option<Song>,
}

impl Playlist {
    /// The song currently on air, or the previous one when nothing is playing
    pub fn available_song(&self) -> Option<&Song> {
        self.song.as_ref().or(self.previoussong.as_ref())
    }

    /// Owning variant of [`Playlist::available_song`]
    pub fn into_available_song(self) -> Option<Song> {
        self.song.or(self.previoussong)
    }
}

/// Response of `GET /playlists/rightnow`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RightNow {
    #[serde(default, deserialize_with = "null_to_default")]
    pub playlist: Playlist,
}

// ============================================================================
// Traffic Models
// ============================================================================

/// A traffic message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrafficMessage {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub priority: i32,
}

/// Response of `GET /traffic/messages`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrafficBundle {
    #[serde(default, deserialize_with = "null_to_default")]
    pub messages: Vec<TrafficMessage>,
}
