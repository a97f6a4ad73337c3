//! Video library
//!
//! An ordered, append-only collection of [`LibraryItem`]s. Order is the play
//! queue: the item after the last one is the first one.

pub mod schema;

pub use schema::{
    seed_playlist, seed_videos, ActiveSource, Comment, LibraryItem, LiveCaptureSource, NewVideo,
    PlaylistEntry, Rating, LIVE_SOURCE_ID,
};

use crate::utils::format::format_total_duration;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Library {
    items: Vec<LibraryItem>,
}

impl Library {
    pub fn new(items: Vec<LibraryItem>) -> Self {
        Self { items }
    }

    pub fn seeded() -> Self {
        Self::new(seed_videos())
    }

    pub fn items(&self) -> &[LibraryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn first(&self) -> Option<&LibraryItem> {
        self.items.first()
    }

    pub fn get(&self, id: u32) -> Option<&LibraryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn position(&self, id: u32) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    /// Item queued after `current`, wrapping to the first item
    ///
    /// With no current item (or one no longer in the library) the queue
    /// starts from the top.
    pub fn next_after(&self, current: Option<u32>) -> Option<&LibraryItem> {
        let next_index = current
            .and_then(|id| self.position(id))
            .map(|index| index + 1)
            .unwrap_or(0);

        self.items.get(next_index).or_else(|| self.items.first())
    }

    /// Flip the completion flag. Returns the new value, or None for an unknown id.
    pub fn toggle_completion(&mut self, id: u32) -> Option<bool> {
        let item = self.items.iter_mut().find(|item| item.id == id)?;
        item.completed = !item.completed;
        Some(item.completed)
    }

    /// Append a video, numbering it after the current length
    pub fn add(&mut self, video: NewVideo) -> &LibraryItem {
        let id = self.items.len() as u32 + 1;
        self.items.push(LibraryItem {
            id,
            title: video.title,
            source_url: video.source_url,
            thumbnail_url: video.thumbnail_url,
            duration_minutes: video.duration_minutes,
            completed: false,
        });
        &self.items[self.items.len() - 1]
    }

    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|item| item.completed).count()
    }

    /// Share of completed items, rounded to a whole percent
    pub fn progress_percent(&self) -> u32 {
        if self.items.is_empty() {
            return 0;
        }
        (self.completed_count() as f64 * 100.0 / self.items.len() as f64).round() as u32
    }

    pub fn total_duration_minutes(&self) -> u32 {
        self.items.iter().map(|item| item.duration_minutes).sum()
    }

    pub fn total_duration_label(&self) -> String {
        format_total_duration(self.total_duration_minutes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> Library {
        Library::new(
            ["A", "B", "C"]
                .into_iter()
                .enumerate()
                .map(|(i, title)| LibraryItem {
                    id: i as u32 + 1,
                    title: title.to_string(),
                    source_url: format!("https://media.test/{title}.mp4"),
                    thumbnail_url: String::new(),
                    duration_minutes: 10,
                    completed: false,
                })
                .collect(),
        )
    }

    #[test]
    fn test_next_after_advances_and_wraps() {
        let library = abc();
        assert_eq!(library.next_after(Some(2)).unwrap().title, "C");
        assert_eq!(library.next_after(Some(3)).unwrap().title, "A");
        assert_eq!(library.next_after(None).unwrap().title, "A");
        assert_eq!(library.next_after(Some(42)).unwrap().title, "A");
        assert!(Library::default().next_after(Some(1)).is_none());
    }

    #[test]
    fn test_toggle_completion() {
        let mut library = abc();
        assert_eq!(library.toggle_completion(2), Some(true));
        assert!(library.get(2).unwrap().completed);
        assert!(!library.get(1).unwrap().completed);
        assert!(!library.get(3).unwrap().completed);

        assert_eq!(library.toggle_completion(2), Some(false));
        assert_eq!(library, abc());

        assert_eq!(library.toggle_completion(99), None);
    }

    #[test]
    fn test_add_assigns_next_id() {
        let mut library = abc();
        let added = library.add(NewVideo {
            title: "Tears of Steel".to_string(),
            source_url: "https://media.test/tears.mp4".to_string(),
            thumbnail_url: String::new(),
            duration_minutes: 12,
        });
        assert_eq!(added.id, 4);
        assert!(!added.completed);
        assert_eq!(library.len(), 4);
    }

    #[test]
    fn test_progress_and_duration() {
        let library = Library::seeded();
        assert_eq!(library.progress_percent(), 33);
        assert_eq!(library.total_duration_minutes(), 45);
        assert_eq!(library.total_duration_label(), "45 min");
        assert_eq!(Library::default().progress_percent(), 0);
    }
}
