use crate::error::LockedSongError;
use crate::library::Library;
use crate::unlock::UnlockState;
use std::collections::VecDeque;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayQueue {
    entries: VecDeque<String>,
    current: Option<String>,
}

impl PlayQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, title: impl Into<String>) {
        self.entries.push_back(title.into());
    }

    pub fn dequeue_next(&mut self) -> Option<String> {
        self.entries.pop_front()
    }

    /// Starts the next song if it may play. A locked head stays in place and the error
    /// goes back to the caller, who decides whether to `skip_head`. `Ok(None)` means idle.
    pub fn next_playable(
        &mut self,
        library: &Library,
        state: &UnlockState,
    ) -> Result<Option<String>, LockedSongError> {
        let Some(head) = self.entries.front() else {
            self.current = None;
            return Ok(None);
        };
        state.check_playable(library, head)?;

        let title = self.entries.pop_front();
        self.current = title.clone();
        Ok(title)
    }

    pub fn finish_current(&mut self) -> Option<String> {
        self.current.take()
    }

    pub fn peek(&self) -> Option<&str> {
        self.entries.front().map(String::as_str)
    }

    pub fn skip_head(&mut self) -> Option<String> {
        self.entries.pop_front()
    }

    pub fn remove_first(&mut self, title: &str) -> bool {
        match self.entries.iter().position(|entry| entry == title) {
            Some(idx) => self.entries.remove(idx).is_some(),
            None => false,
        }
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.entries.is_empty() || self.current.is_some();
        self.entries.clear();
        self.current = None;
        changed
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
