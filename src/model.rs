use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SongKind {
    Standard,
    Rerecording,
    Short,
    Vault,
}

impl SongKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Rerecording => "rerecording",
            Self::Short => "short",
            Self::Vault => "vault",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AlbumKind {
    #[default]
    Standard,
    Rerecording,
}

impl AlbumKind {
    pub fn category(self) -> SongKind {
        match self {
            Self::Standard => SongKind::Standard,
            Self::Rerecording => SongKind::Rerecording,
        }
    }

    pub fn label(self) -> &'static str {
        self.category().label()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCheck {
    pub name: String,
    pub region: String,
    pub categories: Vec<String>,
}

impl RawCheck {
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|value| value == category)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    pub title: String,
    pub kind: SongKind,
    pub file_path: Option<PathBuf>,
    pub album: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    pub name: String,
    pub kind: AlbumKind,
    pub full_album_unlock: bool,
    pub folder_path: Option<PathBuf>,
    pub songs: Vec<Song>,
}

impl Album {
    pub fn new(name: &str, kind: AlbumKind, full_album_unlock: bool) -> Self {
        Self {
            name: name.to_string(),
            kind,
            full_album_unlock,
            folder_path: None,
            songs: Vec::new(),
        }
    }

    pub fn song(&self, title: &str) -> Option<&Song> {
        self.songs.iter().find(|song| song.title == title)
    }

    pub fn song_titles(&self) -> impl Iterator<Item = &str> {
        self.songs.iter().map(|song| song.title.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AlbumMetadata {
    #[serde(default)]
    pub full_album_unlock: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn album_metadata_defaults_to_per_song_unlocks() {
        let parsed: AlbumMetadata = serde_json::from_str("{}").expect("parse");
        assert!(!parsed.full_album_unlock);

        let parsed: AlbumMetadata =
            serde_json::from_str(r#"{"fullAlbumUnlock": true}"#).expect("parse");
        assert!(parsed.full_album_unlock);
    }

    #[test]
    fn album_kind_maps_to_song_category() {
        assert_eq!(AlbumKind::Standard.category(), SongKind::Standard);
        assert_eq!(AlbumKind::Rerecording.category(), SongKind::Rerecording);
        assert_eq!(AlbumKind::Rerecording.label(), "rerecording");
    }
}
