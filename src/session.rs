use crate::config::{self, GameConfig};
use crate::error::LockedSongError;
use crate::library::Library;
use crate::queue::PlayQueue;
use crate::slot::{SlotData, SlotSchema};
use crate::unlock::UnlockState;
use crate::visibility::{self, ProjectedAlbum};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

pub trait Player: Send {
    fn play(&mut self, path: &Path) -> anyhow::Result<()>;
    fn stop(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCall {
    Play(PathBuf),
    Stop,
}

#[derive(Debug, Clone, Default)]
pub struct NullPlayer {
    calls: Arc<Mutex<Vec<PlayerCall>>>,
}

impl NullPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<PlayerCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn record(&self, call: PlayerCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl Player for NullPlayer {
    fn play(&mut self, path: &Path) -> anyhow::Result<()> {
        self.record(PlayerCall::Play(path.to_path_buf()));
        Ok(())
    }

    fn stop(&mut self) {
        self.record(PlayerCall::Stop);
    }
}

#[derive(Debug)]
pub struct LoadedGame {
    pub library: Library,
    pub schema: SlotSchema,
    pub album_order: Vec<String>,
}

pub fn load_game(root: &Path, game: &str) -> anyhow::Result<LoadedGame> {
    let config = GameConfig::new(root, game);
    let library = config.load_library()?;
    let schema = config.load_slot_schema()?;
    let album_order = config.album_order()?;
    Ok(LoadedGame {
        library,
        schema,
        album_order,
    })
}

#[derive(Debug)]
pub enum Command {
    SwitchGame(String),
    Reload,
    LibraryLoaded {
        generation: u64,
        result: anyhow::Result<LoadedGame>,
    },
    SlotData(Value),
    ItemReceived(String),
    Disconnect,
    Enqueue(String),
    PlaybackFinished { title: String },
    SkipLocked,
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    TreeChanged(Vec<ProjectedAlbum>),
    NowPlaying { title: String, path: PathBuf },
    Idle,
    Locked(LockedSongError),
    LocationChecked(String),
    LoadFailed(String),
    Status(String),
}

#[derive(Debug, Clone)]
enum UnlockEvent {
    Slot(SlotData),
    Item(String),
}

struct LoadedState {
    library: Library,
    schema: SlotSchema,
    album_order: Vec<String>,
}

pub struct Session<P: Player> {
    root: PathBuf,
    game: String,
    generation: u64,
    loaded: Option<LoadedState>,
    // Unlock events of the current connection, replayed after every reload.
    history: Vec<UnlockEvent>,
    state: UnlockState,
    queue: PlayQueue,
    player: P,
    commands: Sender<Command>,
    events: Sender<SessionEvent>,
}

impl<P: Player> Session<P> {
    pub fn new(
        root: PathBuf,
        game: String,
        player: P,
        commands: Sender<Command>,
        events: Sender<SessionEvent>,
    ) -> Self {
        Self {
            root,
            game,
            generation: 0,
            loaded: None,
            history: Vec::new(),
            state: UnlockState::new(),
            queue: PlayQueue::new(),
            player,
            commands,
            events,
        }
    }

    pub fn game(&self) -> &str {
        &self.game
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.loaded.is_none()
    }

    pub fn state(&self) -> &UnlockState {
        &self.state
    }

    pub fn queue(&self) -> &PlayQueue {
        &self.queue
    }

    pub fn library(&self) -> Option<&Library> {
        self.loaded.as_ref().map(|loaded| &loaded.library)
    }

    pub fn start_load(&mut self) {
        self.generation += 1;
        self.loaded = None;
        let generation = self.generation;
        let root = self.root.clone();
        let game = self.game.clone();
        let commands = self.commands.clone();
        debug!(game = %game, generation, "starting library load");

        thread::spawn(move || {
            let result = load_game(&root, &game);
            let _ = commands.send(Command::LibraryLoaded { generation, result });
        });
    }

    pub fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::SwitchGame(game) => self.switch_game(game),
            Command::Reload => {
                self.stop_playback();
                self.state.reset();
                self.start_load();
                self.emit_tree();
            }
            Command::LibraryLoaded { generation, result } => {
                self.finish_load(generation, result)
            }
            Command::SlotData(value) => {
                self.apply_unlock(UnlockEvent::Slot(SlotData::from_value(&value)))
            }
            Command::ItemReceived(item) => self.apply_unlock(UnlockEvent::Item(item)),
            Command::Disconnect => self.disconnect(),
            Command::Enqueue(title) => self.enqueue(title),
            Command::PlaybackFinished { title } => self.playback_finished(&title),
            Command::SkipLocked => {
                if let Some(title) = self.queue.skip_head() {
                    self.emit(SessionEvent::Status(format!("Skipped {title}")));
                }
                if self.queue.current().is_none() {
                    self.play_next();
                }
            }
            Command::Shutdown => {
                self.player.stop();
                return false;
            }
        }
        true
    }

    pub fn run(mut self, commands: Receiver<Command>) {
        while let Ok(command) = commands.recv() {
            if !self.handle(command) {
                break;
            }
        }
        info!("session stopped");
    }

    fn switch_game(&mut self, game: String) {
        if let Err(err) = config::save_current_game(&self.root, &game) {
            warn!("failed to save current game: {err:#}");
        }
        info!(from = %self.game, to = %game, "switching game");
        self.game = game;
        self.history.clear();
        self.stop_playback();
        self.state.reset();
        self.start_load();
        self.emit_tree();
        self.emit(SessionEvent::Status(format!("Loading {}", self.game)));
    }

    fn disconnect(&mut self) {
        self.history.clear();
        self.stop_playback();
        self.state.reset();
        // A load that was running belongs to the old connection; start over.
        if self.loaded.is_none() {
            self.start_load();
        }
        self.emit_tree();
        self.emit(SessionEvent::Status(String::from("Disconnected")));
    }

    fn finish_load(&mut self, generation: u64, result: anyhow::Result<LoadedGame>) {
        if generation != self.generation {
            debug!(generation, current = self.generation, "dropping stale library load");
            return;
        }

        match result {
            Ok(game) => {
                self.state.reset();
                self.loaded = Some(LoadedState {
                    library: game.library,
                    schema: game.schema,
                    album_order: game.album_order,
                });
                for event in self.history.clone() {
                    self.apply_loaded(&event);
                }
                self.emit_tree();
                self.emit(SessionEvent::Status(format!("Loaded {}", self.game)));
            }
            Err(err) => {
                warn!(game = %self.game, "library load failed: {err:#}");
                self.emit(SessionEvent::LoadFailed(format!("{err:#}")));
            }
        }
    }

    fn apply_unlock(&mut self, event: UnlockEvent) {
        let changed = self.apply_loaded(&event);
        // A snapshot carries the whole slot state, so only the latest one is kept.
        if matches!(event, UnlockEvent::Slot(_)) {
            self.history
                .retain(|earlier| !matches!(earlier, UnlockEvent::Slot(_)));
        }
        self.history.push(event);
        if changed {
            self.emit_tree();
        }
    }

    // Events that arrive before the library is ready stay in the history only.
    fn apply_loaded(&mut self, event: &UnlockEvent) -> bool {
        let Some(loaded) = &self.loaded else {
            return false;
        };
        match event {
            UnlockEvent::Slot(slot) => {
                self.state
                    .apply_slot_data(&loaded.library, &loaded.schema, slot)
            }
            UnlockEvent::Item(item) => self.state.apply_item_received(&loaded.library, item),
        }
    }

    fn enqueue(&mut self, title: String) {
        let known = self
            .library()
            .is_some_and(|library| library.song(&title).is_some());
        if !known {
            self.emit(SessionEvent::Status(format!("Unknown song {title}")));
            return;
        }

        self.queue.enqueue(title);
        if self.queue.current().is_none() {
            self.play_next();
        }
    }

    // Completion of anything but the current song is a late signal from a stopped play.
    fn playback_finished(&mut self, title: &str) {
        if self.queue.current() != Some(title) {
            debug!(title, "ignoring completion of a song that is not current");
            return;
        }
        let Some(title) = self.queue.finish_current() else {
            return;
        };
        self.emit(SessionEvent::LocationChecked(title));
        self.play_next();
    }

    fn play_next(&mut self) {
        let Some(loaded) = &self.loaded else {
            return;
        };
        let Some(head) = self.queue.peek() else {
            self.emit(SessionEvent::Idle);
            return;
        };
        if let Err(err) = self.state.check_playable(&loaded.library, head) {
            info!("{err}");
            self.emit(SessionEvent::Locked(err));
            return;
        }
        let Some(path) = loaded
            .library
            .song(head)
            .and_then(|song| song.file_path.clone())
        else {
            let message = format!("{head} has no audio file");
            self.emit(SessionEvent::Status(message));
            return;
        };

        match self.queue.next_playable(&loaded.library, &self.state) {
            Ok(Some(title)) => match self.player.play(&path) {
                Ok(()) => {
                    info!(title = %title, path = %path.display(), "now playing");
                    self.emit(SessionEvent::NowPlaying { title, path });
                }
                Err(err) => {
                    self.queue.finish_current();
                    self.emit(SessionEvent::Status(format!(
                        "Failed to play {title}: {err:#}"
                    )));
                }
            },
            Ok(None) => self.emit(SessionEvent::Idle),
            Err(err) => self.emit(SessionEvent::Locked(err)),
        }
    }

    fn stop_playback(&mut self) {
        if self.queue.clear() {
            self.player.stop();
        }
    }

    fn emit_tree(&self) {
        let tree = match &self.loaded {
            Some(loaded) => {
                visibility::project_tree(&loaded.library, &self.state, &loaded.album_order)
            }
            None => Vec::new(),
        };
        self.emit(SessionEvent::TreeChanged(tree));
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }
}

pub struct SessionHandle {
    cmd_tx: Sender<Command>,
    event_rx: Receiver<SessionEvent>,
    worker: Option<JoinHandle<()>>,
}

impl SessionHandle {
    pub fn spawn<P: Player + 'static>(root: PathBuf, game: String, player: P) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let mut session = Session::new(root, game, player, cmd_tx.clone(), event_tx);

        let worker = thread::spawn(move || {
            session.start_load();
            session.run(cmd_rx);
        });

        Self {
            cmd_tx,
            event_rx,
            worker: Some(worker),
        }
    }

    pub fn send(&self, command: Command) {
        let _ = self.cmd_tx.send(command);
    }

    pub fn try_recv_event(&self) -> Option<SessionEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_event_timeout(&self, timeout: Duration) -> Option<SessionEvent> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn shutdown(&mut self) {
        let _ = self.cmd_tx.send(Command::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
