#![no_main]

use libfuzzer_sys::fuzz_target;
use serde_json::json;
use setlist::catalog::bundled_catalog;
use setlist::library::Library;
use setlist::queue::PlayQueue;
use setlist::slot::{SlotData, SlotSchema};
use setlist::unlock::UnlockState;
use setlist::visibility::project_tree;
use std::collections::HashMap;

const ITEMS: &[&str] = &[
    "Red (Album)",
    "1989",
    "Fearless (Taylor's Version) (Album)",
    "22",
    "Love Story (Taylor's Version)",
    "Re-recordings",
    "Vault Tracks",
    "Short Songs",
    "Sweeter Than Fiction",
    "Victory",
];

fuzz_target!(|data: &[u8]| {
    let Ok(checks) = bundled_catalog() else {
        return;
    };
    let Ok(library) = Library::build(&checks, &HashMap::new()) else {
        return;
    };
    let Ok(schema) = SlotSchema::from_json(
        r#"{"slot_data_keys": {
            "opt_red": {"type": "album", "display_name": "Red"},
            "opt_rr": {"type": "album", "display_name": "Re-recordings"}
        }}"#,
    ) else {
        return;
    };
    let titles: Vec<String> = library.songs().map(|song| song.title.clone()).collect();

    let mut state = UnlockState::new();
    let mut queue = PlayQueue::new();
    for byte in data {
        let arg = usize::from(byte >> 3);
        match byte % 8 {
            0 => {
                state.apply_item_received(&library, ITEMS[arg % ITEMS.len()]);
            }
            1 => {
                let slot = SlotData::from_value(&json!({
                    "opt_red": arg & 1,
                    "opt_rr": (arg >> 1) & 1,
                    "include_short_songs": arg & 4 != 0,
                }));
                state.apply_slot_data(&library, &schema, &slot);
            }
            2 => queue.enqueue(titles[arg % titles.len()].clone()),
            3 => {
                if queue.next_playable(&library, &state).is_err() {
                    queue.skip_head();
                }
            }
            4 => {
                queue.finish_current();
            }
            5 => {
                state.reset();
                queue.clear();
            }
            6 => {
                queue.remove_first(&titles[arg % titles.len()]);
            }
            _ => {
                for album in project_tree(&library, &state, &[]) {
                    assert!(state.is_album_unlocked(&album.name));
                    assert!(!album.songs.is_empty());
                }
            }
        }
    }
});
