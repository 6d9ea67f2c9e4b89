/*!
 * In-memory timeline of subtitle entries.
 *
 * Entries are stored in insertion order; every read goes through `view()`,
 * which projects them sorted by start time. Sorting is never stored, so an
 * edit that moves an entry's start is visible in the next view without any
 * bookkeeping.
 */

use std::collections::HashSet;
use std::fmt;

use log::debug;

use crate::errors::SubtitleError;
use crate::resolver;
use crate::subtitle_processor::{self, EntryField, SubtitleEntry};

pub mod ids;

pub use ids::{EntryId, IdGenerator, SequentialIdGenerator, UuidIdGenerator};

/// Length of an entry created by `add`, in seconds
pub const DEFAULT_ENTRY_DURATION: f64 = 2.0;

/// Text of an entry created by `add`
pub const PLACEHOLDER_TEXT: &str = "Type subtitle...";

/// Ordered collection of subtitle entries with id-based editing
pub struct TimelineStore {
    // @field: Entries in insertion order
    entries: Vec<SubtitleEntry>,

    // @field: Source of ids for parsed and added entries
    ids: Box<dyn IdGenerator>,
}

impl TimelineStore {
    /// Create an empty timeline with random UUID ids
    pub fn new() -> Self {
        Self::with_id_generator(UuidIdGenerator)
    }

    /// Create an empty timeline drawing ids from `ids`
    pub fn with_id_generator(ids: impl IdGenerator + 'static) -> Self {
        Self {
            entries: Vec::new(),
            ids: Box::new(ids),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &EntryId) -> Option<&SubtitleEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    /// Entries sorted by start time, ties in insertion order
    pub fn view(&self) -> Vec<&SubtitleEntry> {
        subtitle_processor::sort_by_start(&self.entries)
    }

    /// Swap in a whole new set of entries.
    ///
    /// Nothing changes if the batch repeats an id.
    pub fn replace_all(&mut self, entries: Vec<SubtitleEntry>) -> Result<(), SubtitleError> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if !seen.insert(&entry.id) {
                return Err(SubtitleError::DuplicateId(entry.id.clone()));
            }
        }

        debug!("Replacing {} entries with {}", self.entries.len(), entries.len());
        self.entries = entries;
        Ok(())
    }

    /// Parse SRT content with this timeline's ids and replace everything.
    ///
    /// Returns the number of entries loaded. On a parse error the timeline
    /// keeps its previous contents.
    pub fn load_srt(&mut self, content: &str) -> Result<usize, SubtitleError> {
        let entries = subtitle_processor::parse_srt_string(content, self.ids.as_mut())?;
        let count = entries.len();
        self.replace_all(entries)?;
        Ok(count)
    }

    /// Append a placeholder entry right after the last one in start order
    pub fn add(&mut self) -> EntryId {
        let start = self.view().last().map_or(0.0, |last| last.end);
        let id = self.fresh_id();

        self.entries.push(SubtitleEntry::new(
            id.clone(),
            start,
            start + DEFAULT_ENTRY_DURATION,
            PLACEHOLDER_TEXT,
        ));
        debug!("Added entry {} at {:.3}s", id, start);
        id
    }

    /// Replace one field of the entry with `id`
    pub fn update_field(&mut self, id: &EntryId, field: EntryField) -> Result<(), SubtitleError> {
        if let EntryField::Start(time) | EntryField::End(time) = field {
            if !time.is_finite() || time < 0.0 {
                return Err(SubtitleError::InvalidTime(time));
            }
        }

        // Store -0.0 as 0.0
        let field = match field {
            EntryField::Start(time) => EntryField::Start(time + 0.0),
            EntryField::End(time) => EntryField::End(time + 0.0),
            text => text,
        };

        let slot = self
            .entries
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| SubtitleError::NotFound(id.clone()))?;

        debug!("Updating {} of entry {}", field.name(), id);
        *slot = slot.with_field(field);
        Ok(())
    }

    /// Delete the entry with `id`, returning it
    pub fn remove(&mut self, id: &EntryId) -> Result<SubtitleEntry, SubtitleError> {
        let index = self
            .entries
            .iter()
            .position(|e| &e.id == id)
            .ok_or_else(|| SubtitleError::NotFound(id.clone()))?;

        debug!("Removing entry {}", id);
        Ok(self.entries.remove(index))
    }

    /// Canonical SRT text of the current view
    pub fn to_srt(&self) -> Result<String, SubtitleError> {
        subtitle_processor::to_srt_string(&self.entries)
    }

    /// Entry that should be on screen at `time`
    pub fn active_at(&self, time: f64) -> Option<&SubtitleEntry> {
        resolver::resolve(time, self.view())
    }

    fn fresh_id(&mut self) -> EntryId {
        // Entries loaded through replace_all may come from another generator
        loop {
            let id = self.ids.next_id();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}

impl Default for TimelineStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TimelineStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimelineStore")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}
