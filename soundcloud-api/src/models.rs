//! Response payloads returned by the SoundCloud API.
//!
//! Each model names the fields callers commonly read and keeps everything
//! else in `extra`, so unknown or newly added fields survive a round trip.

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

/// Resource identifier. The API sends numbers; older endpoints send strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Id(pub String);

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Id(n.to_string()),
            Raw::Text(s) => Id(s),
        })
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Id(value.to_string())
    }
}

/// Compact user representation embedded in tracks, playlists and comments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MiniUser {
    pub id: Option<Id>,
    pub username: Option<String>,
    pub permalink_url: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    pub id: Option<Id>,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub permalink_url: Option<String>,
    pub avatar_url: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub description: Option<String>,
    pub track_count: Option<u64>,
    pub playlist_count: Option<u64>,
    pub followers_count: Option<u64>,
    pub followings_count: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Track {
    pub id: Option<Id>,
    pub title: Option<String>,
    pub user: Option<MiniUser>,
    pub permalink_url: Option<String>,
    pub artwork_url: Option<String>,
    pub genre: Option<String>,
    /// Length in milliseconds.
    pub duration: Option<u64>,
    pub streamable: Option<bool>,
    pub stream_url: Option<String>,
    pub license: Option<String>,
    pub track_type: Option<String>,
    pub playback_count: Option<u64>,
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Playlist {
    pub id: Option<Id>,
    pub title: Option<String>,
    pub user: Option<MiniUser>,
    pub permalink_url: Option<String>,
    pub playlist_type: Option<String>,
    pub track_count: Option<u64>,
    #[serde(default)]
    pub tracks: Vec<Track>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Comment {
    pub id: Option<Id>,
    pub body: Option<String>,
    /// Position in the track, in milliseconds.
    pub timestamp: Option<u64>,
    pub user: Option<MiniUser>,
    pub track_id: Option<Id>,
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Group {
    pub id: Option<Id>,
    pub name: Option<String>,
    pub short_description: Option<String>,
    pub permalink_url: Option<String>,
    pub creator: Option<MiniUser>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebProfile {
    pub id: Option<Id>,
    pub service: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub username: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A third-party service linked to the authenticated account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Connection {
    pub id: Option<Id>,
    pub display_name: Option<String>,
    pub service: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub post_publish: Option<bool>,
    pub post_favorite: Option<bool>,
    pub uri: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecretToken {
    pub kind: Option<String>,
    pub token: Option<String>,
    pub uri: Option<String>,
    pub resource_uri: Option<String>,
}

/// Visibility filter for track searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    All,
    Public,
    Private,
}

impl Filter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Public => "public",
            Filter::Private => "private",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum License {
    #[serde(rename = "all-rights-reserved")]
    AllRightsReserved,
    #[serde(rename = "no-rights-reserved")]
    NoRightsReserved,
    #[serde(rename = "cc-by")]
    CcAttribution,
    #[serde(rename = "cc-by-nc")]
    CcAttributionNonCommercial,
    #[serde(rename = "cc-by-nd")]
    CcAttributionNoDerivatives,
    #[serde(rename = "cc-by-sa")]
    CcAttributionShareAlike,
    #[serde(rename = "cc-by-nc-nd")]
    CcAttributionNonCommercialNoDerivatives,
    #[serde(rename = "cc-by-nc-sa")]
    CcAttributionNonCommercialShareAlike,
}

impl License {
    pub fn as_str(&self) -> &'static str {
        match self {
            License::AllRightsReserved => "all-rights-reserved",
            License::NoRightsReserved => "no-rights-reserved",
            License::CcAttribution => "cc-by",
            License::CcAttributionNonCommercial => "cc-by-nc",
            License::CcAttributionNoDerivatives => "cc-by-nd",
            License::CcAttributionShareAlike => "cc-by-sa",
            License::CcAttributionNonCommercialNoDerivatives => "cc-by-nc-nd",
            License::CcAttributionNonCommercialShareAlike => "cc-by-nc-sa",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackType {
    Original,
    Remix,
    Live,
    Recording,
    Spoken,
    Podcast,
    Demo,
    #[serde(rename = "in progress")]
    InProgress,
    Stem,
    Loop,
    #[serde(rename = "sound effect")]
    SoundEffect,
    Sample,
    Other,
}

impl TrackType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackType::Original => "original",
            TrackType::Remix => "remix",
            TrackType::Live => "live",
            TrackType::Recording => "recording",
            TrackType::Spoken => "spoken",
            TrackType::Podcast => "podcast",
            TrackType::Demo => "demo",
            TrackType::InProgress => "in progress",
            TrackType::Stem => "stem",
            TrackType::Loop => "loop",
            TrackType::SoundEffect => "sound effect",
            TrackType::Sample => "sample",
            TrackType::Other => "other",
        }
    }
}
