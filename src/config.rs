use crate::catalog;
use crate::error::Error;
use crate::library::Library;
use crate::matcher;
use crate::model::{AlbumMetadata, RawCheck};
use crate::slot::SlotSchema;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const APP_DIR: &str = "setlist";
const CURRENT_GAME_FILE: &str = "currentGame.json";
const CONNECTION_FILE: &str = "connection.json";
const LOCATIONS_FILE: &str = "locations.json";
const ALBUM_METADATA_FILE: &str = "album_metadata.json";
const ALBUM_FOLDERS_FILE: &str = "albumFolders.json";
const ALBUM_ORDER_FILE: &str = "albumOrder.json";
const SLOT_DATA_FILE: &str = "slot_data.json";

pub const DEFAULT_GAME: &str = "Manual_TaylorSwiftDiscography_bennydreamly";

pub const DEFAULT_ALBUM_ORDER: &[&str] = &[
    "Taylor Swift",
    "Fearless",
    "Fearless (Taylor's Version)",
    "Speak Now",
    "Speak Now (Taylor's Version)",
    "Red",
    "Red (Taylor's Version)",
    "1989",
    "1989 (Taylor's Version)",
    "Reputation",
    "Lover",
    "Folklore",
    "Evermore",
    "Midnights",
    "The Tortured Poets Department",
];

pub fn config_root() -> Result<PathBuf> {
    config_root_from(
        env::var_os("SETLIST_CONFIG_DIR"),
        env::var_os("HOME").or_else(|| env::var_os("USERPROFILE")),
    )
}

fn config_root_from(override_dir: Option<OsString>, home: Option<OsString>) -> Result<PathBuf> {
    if let Some(override_dir) = override_dir {
        return Ok(PathBuf::from(override_dir));
    }

    let home = home.context("neither HOME nor USERPROFILE is set")?;
    Ok(PathBuf::from(home).join(".config").join(APP_DIR))
}

pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(Some(value))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

pub fn load_current_game(root: &Path) -> Result<String> {
    let game: Option<String> = read_json(&root.join(CURRENT_GAME_FILE))?;
    Ok(game
        .filter(|game| !game.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_GAME.to_string()))
}

pub fn save_current_game(root: &Path, game: &str) -> Result<()> {
    write_json(&root.join(CURRENT_GAME_FILE), game)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: String,
    pub slot: String,
    pub password: String,
}

impl ConnectionSettings {
    pub fn port_number(&self) -> Option<u16> {
        self.port.trim().parse().ok()
    }
}

pub fn load_connection(root: &Path) -> Result<ConnectionSettings> {
    Ok(read_json(&root.join(CONNECTION_FILE))?.unwrap_or_default())
}

pub fn save_connection(root: &Path, settings: &ConnectionSettings) -> Result<()> {
    write_json(&root.join(CONNECTION_FILE), settings)?;
    info!(host = %settings.host, slot = %settings.slot, "saved connection settings");
    Ok(())
}

// Blank folder entries in library order.
struct FolderPlaceholders<'a>(&'a Library);

impl Serialize for FolderPlaceholders<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.album_names().map(|name| (name, "")))
    }
}

#[derive(Debug, Clone)]
pub struct GameConfig {
    game: String,
    dir: PathBuf,
}

impl GameConfig {
    pub fn new(root: &Path, game: &str) -> Self {
        Self {
            game: game.to_string(),
            dir: root.join(game),
        }
    }

    pub fn game(&self) -> &str {
        &self.game
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn load_catalog(&self) -> Result<Vec<RawCheck>> {
        let path = self.dir.join(LOCATIONS_FILE);
        if !path.exists() {
            return Ok(catalog::bundled_catalog()?);
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read catalog {}", path.display()))?;
        catalog::parse_catalog(&raw)
            .with_context(|| format!("failed to load catalog {}", path.display()))
    }

    pub fn load_album_metadata(&self) -> Result<HashMap<String, AlbumMetadata>> {
        let path = self.dir.join(ALBUM_METADATA_FILE);
        match read_json(&path)? {
            Some(metadata) => Ok(metadata),
            None => {
                warn!("{}", Error::MissingResource(path));
                Ok(HashMap::new())
            }
        }
    }

    // Album folder assignments. A missing file is written with a blank entry for every
    // album so it can be filled in by hand.
    pub fn load_or_generate_album_folders(
        &self,
        library: &Library,
    ) -> Result<HashMap<String, String>> {
        let path = self.dir.join(ALBUM_FOLDERS_FILE);
        if let Some(folders) = read_json(&path)? {
            return Ok(folders);
        }

        write_json(&path, &FolderPlaceholders(library))?;
        info!(path = %path.display(), "generated album folder placeholders");
        Ok(HashMap::new())
    }

    pub fn album_order(&self) -> Result<Vec<String>> {
        let path = self.dir.join(ALBUM_ORDER_FILE);
        let loaded: Vec<String> = read_json(&path)?.unwrap_or_default();
        if loaded.is_empty() {
            let order: Vec<String> = DEFAULT_ALBUM_ORDER
                .iter()
                .map(|name| name.to_string())
                .collect();
            write_json(&path, &order)?;
            info!(path = %path.display(), "generated default album order");
            return Ok(order);
        }
        Ok(loaded)
    }

    pub fn load_slot_schema(&self) -> Result<SlotSchema> {
        Ok(read_json(&self.dir.join(SLOT_DATA_FILE))?.unwrap_or_default())
    }

    pub fn load_library(&self) -> Result<Library> {
        ensure_dir(&self.dir)?;
        let checks = self.load_catalog()?;
        let metadata = self.load_album_metadata()?;
        let mut library = Library::build(&checks, &metadata)
            .with_context(|| format!("failed to build library for {}", self.game))?;

        let folders = self.load_or_generate_album_folders(&library)?;
        library.assign_folders(&folders);
        let report = matcher::assign_library(&mut library);
        info!(
            game = %self.game,
            albums = library.albums().len(),
            matched = report.matched.len(),
            unmatched = report.unmatched.len(),
            "library loaded"
        );
        Ok(library)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn config_root_prefers_override_then_home() {
        let root = config_root_from(Some(OsString::from("/tmp/setlist")), None).expect("override");
        assert_eq!(root, PathBuf::from("/tmp/setlist"));

        let root = config_root_from(None, Some(OsString::from("/home/me"))).expect("home");
        assert_eq!(root, PathBuf::from("/home/me").join(".config").join(APP_DIR));

        assert!(config_root_from(None, None).is_err());
    }

    #[test]
    fn current_game_defaults_then_round_trips() {
        let dir = tempdir().expect("tempdir");
        assert_eq!(load_current_game(dir.path()).expect("load"), DEFAULT_GAME);

        save_current_game(dir.path(), "Other_Game").expect("save");
        assert_eq!(load_current_game(dir.path()).expect("load"), "Other_Game");
    }

    #[test]
    fn connection_settings_round_trip() {
        let dir = tempdir().expect("tempdir");
        assert_eq!(
            load_connection(dir.path()).expect("load"),
            ConnectionSettings::default()
        );

        let settings = ConnectionSettings {
            host: String::from("archipelago.gg"),
            port: String::from("38281"),
            slot: String::from("Player1"),
            password: String::new(),
        };
        save_connection(dir.path(), &settings).expect("save");
        let loaded = load_connection(dir.path()).expect("load");
        assert_eq!(loaded, settings);
        assert_eq!(loaded.port_number(), Some(38281));
    }

    #[test]
    fn missing_game_files_fall_back_to_defaults() {
        let dir = tempdir().expect("tempdir");
        let game = GameConfig::new(dir.path(), DEFAULT_GAME);

        let library = game.load_library().expect("library");
        assert!(library.album("Red").is_some());
        assert!(game.load_album_metadata().expect("metadata").is_empty());
        assert!(game.load_slot_schema().expect("schema").is_empty());

        let folders: HashMap<String, String> =
            read_json(&game.dir().join(ALBUM_FOLDERS_FILE))
                .expect("read")
                .expect("generated");
        assert_eq!(folders.get("Red").map(String::as_str), Some(""));

        let order = game.album_order().expect("order");
        assert_eq!(order.first().map(String::as_str), Some("Taylor Swift"));
        assert!(game.dir().join(ALBUM_ORDER_FILE).exists());
    }

    #[test]
    fn album_order_reads_file_and_regenerates_empty_one() {
        let dir = tempdir().expect("tempdir");
        let game = GameConfig::new(dir.path(), "g");
        write_json(&game.dir().join(ALBUM_ORDER_FILE), &["Red", "1989"]).expect("write");
        assert_eq!(game.album_order().expect("order"), vec!["Red", "1989"]);

        write_json(&game.dir().join(ALBUM_ORDER_FILE), &Vec::<String>::new()).expect("empty");
        let order = game.album_order().expect("default");
        assert_eq!(order.len(), DEFAULT_ALBUM_ORDER.len());
        let written: Vec<String> = read_json(&game.dir().join(ALBUM_ORDER_FILE))
            .expect("read")
            .expect("regenerated");
        assert_eq!(written, order);
    }

    #[test]
    fn folder_placeholders_follow_library_order() {
        let dir = tempdir().expect("tempdir");
        let game = GameConfig::new(dir.path(), "g");
        game.load_library().expect("library");

        let raw = fs::read_to_string(game.dir().join(ALBUM_FOLDERS_FILE)).expect("generated");
        let position = |name: &str| raw.find(&format!("\"{name}\"")).expect("album listed");
        assert!(position("Taylor Swift") < position("Fearless"));
        assert!(position("Red") < position("1989"));
        assert!(position("1989") < position("Songs"));
    }

    #[test]
    fn game_files_override_bundled_data() {
        let dir = tempdir().expect("tempdir");
        let music = tempdir().expect("music");
        fs::write(music.path().join("01 - Cardigan.mp3"), b"x").expect("write audio");

        let game = GameConfig::new(dir.path(), "g");
        write_json(
            &game.dir().join(LOCATIONS_FILE),
            &serde_json::json!([
                {"name": "cardigan", "region": "Folklore", "category": ["Folklore"]}
            ]),
        )
        .expect("locations");
        write_json(
            &game.dir().join(ALBUM_METADATA_FILE),
            &serde_json::json!({"Folklore": {"fullAlbumUnlock": true}}),
        )
        .expect("metadata");
        write_json(
            &game.dir().join(ALBUM_FOLDERS_FILE),
            &serde_json::json!({"Folklore": music.path().to_string_lossy()}),
        )
        .expect("folders");

        let library = game.load_library().expect("library");
        let folklore = library.album("Folklore").expect("folklore");
        assert!(folklore.full_album_unlock);
        assert!(folklore.songs[0].file_path.is_some());
    }

    #[test]
    fn broken_catalog_is_an_error() {
        let dir = tempdir().expect("tempdir");
        let game = GameConfig::new(dir.path(), "g");
        write_json(&game.dir().join(LOCATIONS_FILE), &serde_json::json!({"not": "a list"}))
            .expect("write");
        assert!(game.load_library().is_err());
    }
}
