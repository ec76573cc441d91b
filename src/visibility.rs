use crate::library::Library;
use crate::model::{Album, Song};
use crate::unlock::UnlockState;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectedAlbum {
    pub name: String,
    pub songs: Vec<String>,
}

// Unlocked albums in display order, each with the songs whose category is enabled.
// Albums left without songs are omitted.
pub fn project<'a>(
    library: &'a Library,
    state: &UnlockState,
    album_order: &[String],
) -> Vec<(&'a Album, Vec<&'a Song>)> {
    let mut albums: Vec<&Album> = library
        .albums()
        .iter()
        .filter(|album| state.is_album_unlocked(&album.name))
        .collect();
    albums.sort_by_key(|album| {
        album_order
            .iter()
            .position(|name| name == &album.name)
            .unwrap_or(usize::MAX)
    });

    albums
        .into_iter()
        .filter_map(|album| {
            let songs: Vec<&Song> = album
                .songs
                .iter()
                .filter(|song| state.is_category_enabled(song.kind))
                .collect();
            (!songs.is_empty()).then_some((album, songs))
        })
        .collect()
}

pub fn project_tree(
    library: &Library,
    state: &UnlockState,
    album_order: &[String],
) -> Vec<ProjectedAlbum> {
    project(library, state, album_order)
        .into_iter()
        .map(|(album, songs)| ProjectedAlbum {
            name: album.name.clone(),
            songs: songs.iter().map(|song| song.title.clone()).collect(),
        })
        .collect()
}
