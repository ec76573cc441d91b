use crate::error::{Error, Result};
use crate::model::{Album, AlbumKind, AlbumMetadata, RawCheck, Song, SongKind};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, warn};

// Region whose checks are not songs and never become part of the library.
pub const BONUS_REGION: &str = "Bonus Locations";
// Album that collects checks without a region.
pub const FALLBACK_ALBUM: &str = "Songs";

pub const RERECORDINGS: &str = "Re-recordings";
pub const SHORT_SONGS: &str = "Short Songs";

#[derive(Debug, Clone, Default)]
pub struct Library {
    albums: Vec<Album>,
    album_lookup: HashMap<String, usize>,
}

impl Library {
    pub fn build(checks: &[RawCheck], metadata: &HashMap<String, AlbumMetadata>) -> Result<Self> {
        let mut library = Self::default();

        for (index, check) in checks.iter().enumerate() {
            if check.name.trim().is_empty() {
                return Err(Error::MalformedRecord {
                    index,
                    reason: String::from("name is blank"),
                });
            }
            if check.region.eq_ignore_ascii_case(BONUS_REGION) {
                continue;
            }

            let album_name = if check.region.trim().is_empty() {
                FALLBACK_ALBUM
            } else {
                check.region.as_str()
            };

            // The first check seen for an album decides its kind.
            let album_idx = match library.album_lookup.get(album_name) {
                Some(idx) => *idx,
                None => {
                    let kind = if check.has_category(RERECORDINGS) {
                        AlbumKind::Rerecording
                    } else {
                        AlbumKind::Standard
                    };
                    let full_unlock = metadata
                        .get(album_name)
                        .map(|meta| meta.full_album_unlock)
                        .unwrap_or(false);
                    library.push_album(Album::new(album_name, kind, full_unlock))
                }
            };

            let album = &mut library.albums[album_idx];
            if album.song(&check.name).is_some() {
                warn!(album = %album.name, title = %check.name, "duplicate song title in catalog");
                continue;
            }
            album.songs.push(Song {
                title: check.name.clone(),
                kind: classify_song(check),
                file_path: None,
                album: album.name.clone(),
            });
        }

        debug!(albums = library.albums.len(), "library built");
        Ok(library)
    }

    fn push_album(&mut self, album: Album) -> usize {
        let idx = self.albums.len();
        self.album_lookup.insert(album.name.clone(), idx);
        self.albums.push(album);
        idx
    }

    pub fn albums(&self) -> &[Album] {
        &self.albums
    }

    pub fn albums_mut(&mut self) -> impl Iterator<Item = &mut Album> {
        self.albums.iter_mut()
    }

    pub fn album(&self, name: &str) -> Option<&Album> {
        self.album_lookup.get(name).map(|idx| &self.albums[*idx])
    }

    pub fn album_mut(&mut self, name: &str) -> Option<&mut Album> {
        let idx = *self.album_lookup.get(name)?;
        self.albums.get_mut(idx)
    }

    pub fn song(&self, title: &str) -> Option<&Song> {
        self.songs().find(|song| song.title == title)
    }

    pub fn album_for_song(&self, title: &str) -> Option<&Album> {
        self.albums
            .iter()
            .find(|album| album.song(title).is_some())
    }

    pub fn songs(&self) -> impl Iterator<Item = &Song> {
        self.albums.iter().flat_map(|album| album.songs.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.albums.is_empty()
    }

    pub fn album_names(&self) -> impl Iterator<Item = &str> {
        self.albums.iter().map(|album| album.name.as_str())
    }

    pub fn assign_folders(&mut self, folders: &HashMap<String, String>) -> usize {
        let mut assigned = 0;
        for album in &mut self.albums {
            let Some(folder) = folders.get(&album.name) else {
                continue;
            };
            if folder.trim().is_empty() {
                album.folder_path = None;
                continue;
            }
            album.folder_path = Some(PathBuf::from(folder.trim()));
            assigned += 1;
        }
        assigned
    }
}

fn classify_song(check: &RawCheck) -> SongKind {
    if check.has_category(SHORT_SONGS) {
        SongKind::Short
    } else if check.has_category(RERECORDINGS) {
        SongKind::Rerecording
    } else {
        SongKind::Standard
    }
}
