use crate::error::{Error, LockReason, LockedSongError};
use crate::library::{Library, RERECORDINGS};
use crate::model::{Album, AlbumKind, SongKind};
use crate::slot::{INCLUDE_SHORT_SONGS, INCLUDE_VAULT_SONGS, OptionKind, SlotData, SlotSchema};
use std::collections::HashSet;
use tracing::{debug, info};

pub const VAULT_TRACKS_ITEM: &str = "Vault Tracks";
pub const RERECORDINGS_ITEM: &str = RERECORDINGS;
pub const SHORT_SONGS_ITEM: &str = "Short Songs";
pub const ALBUM_ITEM_SUFFIX: &str = "(Album)";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnlockState {
    enabled_categories: HashSet<SongKind>,
    unlocked_albums: HashSet<String>,
    unlocked_songs: HashSet<String>,
}

impl UnlockState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enabled_categories(&self) -> &HashSet<SongKind> {
        &self.enabled_categories
    }

    pub fn unlocked_albums(&self) -> &HashSet<String> {
        &self.unlocked_albums
    }

    pub fn unlocked_songs(&self) -> &HashSet<String> {
        &self.unlocked_songs
    }

    pub fn is_category_enabled(&self, kind: SongKind) -> bool {
        self.enabled_categories.contains(&kind)
    }

    pub fn is_album_unlocked(&self, name: &str) -> bool {
        self.unlocked_albums.contains(name)
    }

    pub fn is_song_unlocked(&self, title: &str) -> bool {
        self.unlocked_songs.contains(title)
    }

    pub fn is_empty(&self) -> bool {
        self.enabled_categories.is_empty()
            && self.unlocked_albums.is_empty()
            && self.unlocked_songs.is_empty()
    }

    pub fn reset(&mut self) -> bool {
        let changed = !self.is_empty();
        self.enabled_categories.clear();
        self.unlocked_albums.clear();
        self.unlocked_songs.clear();
        changed
    }

    pub fn apply_slot_data(
        &mut self,
        library: &Library,
        schema: &SlotSchema,
        slot: &SlotData,
    ) -> bool {
        let albums_changed = self.apply_slot_snapshot(library, schema, slot);
        let toggles_changed = self.filter_category_toggles(library, slot);
        albums_changed || toggles_changed
    }

    // Rebuilds album and category unlocks from a snapshot. Song unlocks accumulate.
    pub fn apply_slot_snapshot(
        &mut self,
        library: &Library,
        schema: &SlotSchema,
        slot: &SlotData,
    ) -> bool {
        let before = self.clone();
        self.enabled_categories.clear();
        self.unlocked_albums.clear();

        let enabled = schema.enabled_names(slot, OptionKind::Album);
        for name in &enabled {
            match library.album(name) {
                Some(album) => self.unlock_album(album, album.full_album_unlock),
                None if name == RERECORDINGS => {}
                None => debug!("{}", Error::UnknownEventTarget(name.clone())),
            }
        }

        // "Re-recordings" switches on every re-recorded album at once.
        if enabled.iter().any(|name| name == RERECORDINGS) {
            for album in library
                .albums()
                .iter()
                .filter(|album| album.kind == AlbumKind::Rerecording)
            {
                self.unlock_album(album, true);
            }
        }

        info!(
            albums = self.unlocked_albums.len(),
            categories = self.enabled_categories.len(),
            "applied slot snapshot"
        );
        *self != before
    }

    pub fn filter_category_toggles(&mut self, library: &Library, slot: &SlotData) -> bool {
        let short_enabled = slot.toggle(INCLUDE_SHORT_SONGS);
        let vault_enabled = slot.toggle(INCLUDE_VAULT_SONGS);
        let mut changed = false;

        for song in library.songs() {
            let excluded = match song.kind {
                SongKind::Short => !short_enabled,
                SongKind::Vault => !vault_enabled,
                SongKind::Standard | SongKind::Rerecording => false,
            };
            if excluded {
                changed |= self.unlocked_songs.remove(&song.title);
            }
        }
        changed
    }

    pub fn apply_item_received(&mut self, library: &Library, item_name: &str) -> bool {
        match item_name {
            VAULT_TRACKS_ITEM => return self.enabled_categories.insert(SongKind::Vault),
            RERECORDINGS_ITEM => return self.enabled_categories.insert(SongKind::Rerecording),
            SHORT_SONGS_ITEM => return self.enabled_categories.insert(SongKind::Short),
            _ => {}
        }

        let (lookup, album_item) = match item_name.strip_suffix(ALBUM_ITEM_SUFFIX) {
            Some(stripped) => (stripped.trim(), true),
            None => (item_name, false),
        };
        let before = self.clone();
        let album = library.album(lookup);

        if let Some(album) = album.filter(|album| album_item || album.full_album_unlock) {
            self.unlock_album(album, album.full_album_unlock);
        } else if let Some(song) = library.song(lookup) {
            // The parent album stays locked: a song item alone does not open its album.
            self.unlocked_songs.insert(song.title.clone());
            if let Some(parent) = library.album(&song.album) {
                self.enabled_categories.insert(parent.kind.category());
            }
        } else if let Some(album) = album {
            self.unlock_album(album, false);
        } else {
            debug!("{}", Error::UnknownEventTarget(item_name.to_string()));
            return false;
        }

        *self != before
    }

    fn unlock_album(&mut self, album: &Album, with_songs: bool) {
        self.unlocked_albums.insert(album.name.clone());
        self.enabled_categories.insert(album.kind.category());
        if with_songs {
            self.unlocked_songs
                .extend(album.song_titles().map(str::to_string));
        }
    }

    /// A song plays when its album is a full-album unlock, or when both the song and its
    /// album are unlocked. Songs outside any album only need their own unlock.
    pub fn check_playable(&self, library: &Library, title: &str) -> Result<(), LockedSongError> {
        let song_unlocked = self.is_song_unlocked(title);
        let Some(album) = library.album_for_song(title) else {
            return if song_unlocked {
                Ok(())
            } else {
                Err(LockedSongError {
                    title: title.to_string(),
                    album: None,
                    reason: LockReason::SongLocked,
                })
            };
        };

        let album_unlocked = self.is_album_unlocked(&album.name);
        if album.full_album_unlock || (song_unlocked && album_unlocked) {
            return Ok(());
        }

        Err(LockedSongError {
            title: title.to_string(),
            album: Some(album.name.clone()),
            reason: if album_unlocked {
                LockReason::SongLocked
            } else {
                LockReason::AlbumLocked
            },
        })
    }

    pub fn is_playable(&self, library: &Library, title: &str) -> bool {
        self.check_playable(library, title).is_ok()
    }
}
