use crate::error::Error;
use crate::library::Library;
use crate::model::Album;
use crate::normalize::{self, distance, eq_ignore_case, normalize_filename, normalize_title};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

// Fuzzy matches must be strictly closer than this edit distance.
pub const MAX_FUZZY_DISTANCE: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMatch {
    pub file: PathBuf,
    pub title: String,
    pub exact: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchReport {
    pub matched: Vec<FileMatch>,
    pub unmatched: Vec<PathBuf>,
}

impl MatchReport {
    fn merge(&mut self, other: MatchReport) {
        self.matched.extend(other.matched);
        self.unmatched.extend(other.unmatched);
    }
}

pub fn list_audio_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }

    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(normalize::is_audio_name)
        })
        .map(|entry| entry.into_path())
        .collect()
}

/// Picks the song a file belongs to. An exact match anywhere in the album beats any
/// fuzzy candidate; among fuzzy candidates the first with the lowest distance wins.
pub fn match_file(album: &Album, file_name: &str) -> Option<(usize, bool)> {
    let normalized_file = normalize_filename(file_name);
    let titles: Vec<String> = album
        .songs
        .iter()
        .map(|song| normalize_title(&song.title))
        .collect();

    if let Some(idx) = titles
        .iter()
        .position(|title| eq_ignore_case(&normalized_file, title))
    {
        return Some((idx, true));
    }

    let mut best: Option<(usize, usize)> = None;
    for (idx, title) in titles.iter().enumerate() {
        let dist = distance(&normalized_file, title);
        if dist < MAX_FUZZY_DISTANCE && best.is_none_or(|(_, best_dist)| dist < best_dist) {
            best = Some((idx, dist));
        }
    }
    best.map(|(idx, _)| (idx, false))
}

pub fn assign_files(album: &mut Album, files: &[PathBuf]) -> MatchReport {
    let mut report = MatchReport::default();
    // Songs already holding an exact match; fuzzy candidates never replace those.
    let mut exact_songs = HashSet::new();

    for file in files {
        let Some(file_name) = file.file_name().and_then(|name| name.to_str()) else {
            report.unmatched.push(file.clone());
            continue;
        };

        match match_file(album, file_name) {
            Some((idx, false)) if exact_songs.contains(&idx) => {
                let title = &album.songs[idx].title;
                debug!(file = file_name, %title, "song already has an exact match");
                report.unmatched.push(file.clone());
            }
            Some((idx, exact)) => {
                let song = &mut album.songs[idx];
                info!(file = file_name, title = %song.title, exact, "matched file");
                song.file_path = Some(file.clone());
                if exact {
                    exact_songs.insert(idx);
                }
                report.matched.push(FileMatch {
                    file: file.clone(),
                    title: song.title.clone(),
                    exact,
                });
            }
            None => {
                let err = Error::UnmatchedFile {
                    file: file.clone(),
                    album: album.name.clone(),
                };
                warn!("{err}");
                report.unmatched.push(file.clone());
            }
        }
    }

    report
}

pub fn assign_album(album: &mut Album) -> MatchReport {
    let Some(folder) = album.folder_path.clone() else {
        return MatchReport::default();
    };
    let files = list_audio_files(&folder);
    assign_files(album, &files)
}

pub fn assign_library(library: &mut Library) -> MatchReport {
    let mut report = MatchReport::default();
    for album in library.albums_mut() {
        report.merge(assign_album(album));
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AlbumKind, Song, SongKind};
    use std::fs;
    use tempfile::tempdir;

    fn album(titles: &[&str]) -> Album {
        let mut album = Album::new("Fearless (Taylor's Version)", AlbumKind::Rerecording, false);
        for title in titles {
            album.songs.push(Song {
                title: title.to_string(),
                kind: SongKind::Rerecording,
                file_path: None,
                album: album.name.clone(),
            });
        }
        album
    }

    #[test]
    fn truncated_marker_file_matches_exactly() {
        let mut album = album(&["Fearless (Taylor's Version)", "Love Story (Taylor's Version)"]);
        let file = PathBuf::from("/music/02 - Love Story (Taylor's Ver).mp3");

        let report = assign_files(&mut album, std::slice::from_ref(&file));

        assert_eq!(report.matched.len(), 1);
        assert!(report.matched[0].exact);
        assert_eq!(album.songs[1].file_path, Some(file));
        assert_eq!(album.songs[0].file_path, None);
    }

    #[test]
    fn exact_match_wins_regardless_of_song_order() {
        let forward = album(&["Style!", "Style"]);
        let backward = album(&["Style", "Style!"]);

        assert_eq!(match_file(&forward, "Style.mp3"), Some((1, true)));
        assert_eq!(match_file(&backward, "Style.mp3"), Some((0, true)));
    }

    #[test]
    fn fuzzy_match_needs_distance_below_threshold() {
        let album = album(&["Blank Space", "Wildest Dreams"]);
        assert_eq!(match_file(&album, "Blank Spce.mp3"), Some((0, false)));
        assert_eq!(match_file(&album, "Shake It Off.mp3"), None);
    }

    #[test]
    fn fuzzy_ties_keep_first_song() {
        let album = album(&["abcd", "abce"]);
        assert_eq!(match_file(&album, "abcx.mp3"), Some((0, false)));
    }

    #[test]
    fn exact_file_wins_regardless_of_file_order() {
        let exact = PathBuf::from("/m/Blank Space.mp3");
        let fuzzy = PathBuf::from("/m/Blank Spaces.m4a");

        let mut fuzzy_first = album(&["Blank Space"]);
        assign_files(&mut fuzzy_first, &[fuzzy.clone(), exact.clone()]);
        assert_eq!(fuzzy_first.songs[0].file_path, Some(exact.clone()));

        let mut exact_first = album(&["Blank Space"]);
        let report = assign_files(&mut exact_first, &[exact.clone(), fuzzy.clone()]);
        assert_eq!(exact_first.songs[0].file_path, Some(exact));
        assert_eq!(report.unmatched, vec![fuzzy]);
    }

    #[test]
    fn later_file_of_equal_quality_replaces_earlier_match() {
        let mut album = album(&["Blank Space"]);
        let files = vec![
            PathBuf::from("/m/Blank Spaces.mp3"),
            PathBuf::from("/m/Blank Spacey.m4a"),
        ];
        let report = assign_files(&mut album, &files);

        assert_eq!(report.matched.len(), 2);
        assert_eq!(album.songs[0].file_path, Some(files[1].clone()));
    }

    #[test]
    fn unmatched_files_are_reported_not_fatal() {
        let mut album = album(&["Blank Space"]);
        let files = vec![
            PathBuf::from("/m/Interview.mp3"),
            PathBuf::from("/m/01 Blank Space.mp3"),
        ];
        let report = assign_files(&mut album, &files);

        assert_eq!(report.unmatched, vec![files[0].clone()]);
        assert_eq!(album.songs[0].file_path, Some(files[1].clone()));
    }

    #[test]
    fn listing_keeps_only_audio_files_in_the_folder() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("b.MP3"), b"x").expect("write mp3");
        fs::write(dir.path().join("a.wav"), b"x").expect("write wav");
        fs::write(dir.path().join("cover.jpg"), b"x").expect("write jpg");
        fs::write(dir.path().join("c.flac"), b"x").expect("write flac");
        fs::create_dir(dir.path().join("nested")).expect("mkdir");
        fs::write(dir.path().join("nested").join("d.mp3"), b"x").expect("write nested");

        let files = list_audio_files(dir.path());
        let names: Vec<String> = files
            .iter()
            .filter_map(|path| path.file_name())
            .map(|name| name.to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.wav", "b.MP3"]);
    }

    #[test]
    fn album_without_folder_is_left_alone() {
        let mut album = album(&["Blank Space"]);
        assert_eq!(assign_album(&mut album), MatchReport::default());

        album.folder_path = Some(PathBuf::from("/definitely/not/here"));
        assert_eq!(assign_album(&mut album), MatchReport::default());
    }

    #[test]
    fn album_folder_scan_assigns_paths_inside_folder() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("01 - Fearless (Taylor's Ver).m4a"), b"x").expect("write");
        let mut album = album(&["Fearless (Taylor's Version)"]);
        album.folder_path = Some(dir.path().to_path_buf());

        let report = assign_album(&mut album);
        assert_eq!(report.matched.len(), 1);
        let path = album.songs[0].file_path.clone().expect("assigned");
        assert!(path.starts_with(dir.path()));
    }
}
