//! Public response shapes
//!
//! The DTOs decouple the published JSON from the upstream schema. Conversions
//! are plain field copies.

use crate::models::{Song, TrafficMessage};
use serde::{Deserialize, Serialize};

#[cfg(feature = "server")]
use utoipa::ToSchema;

/// A song as published by `/api/v1/programs/aggregated-songs`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct SongDto {
    pub title: Option<String>,
    pub description: Option<String>,
    pub artist: Option<String>,
    pub composer: Option<String>,
    pub recordlabel: Option<String>,
}

/// A traffic message as published by `/api/v1/traffic/messages`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct TrafficMessageDto {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: i32,
}

impl From<&Song> for SongDto {
    fn from(song: &Song) -> Self {
        Self {
            title: song.title.clone(),
            description: song.description.clone(),
            artist: song.artist.clone(),
            composer: song.composer.clone(),
            recordlabel: song.recordlabel.clone(),
        }
    }
}

impl From<Song> for SongDto {
    fn from(song: Song) -> Self {
        Self {
            title: song.title,
            description: song.description,
            artist: song.artist,
            composer: song.composer,
            recordlabel: song.recordlabel,
        }
    }
}

impl From<&TrafficMessage> for TrafficMessageDto {
    fn from(message: &TrafficMessage) -> Self {
        Self {
            id: message.id,
            title: message.title.clone(),
            description: message.description.clone(),
            category: message.category.clone(),
            priority: message.priority,
        }
    }
}

impl From<TrafficMessage> for TrafficMessageDto {
    fn from(message: TrafficMessage) -> Self {
        Self {
            id: message.id,
            title: message.title,
            description: message.description,
            category: message.category,
            priority: message.priority,
        }
    }
}
