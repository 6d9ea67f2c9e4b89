/*!
 * Active subtitle lookup for a playback position.
 *
 * An entry is active when `start <= time <= end`. When several entries
 * overlap, the one that starts earliest wins, which is the first match in
 * a start-sorted view.
 */

use crate::subtitle_processor::{compare_start, SubtitleEntry};
use crate::timeline::EntryId;

/// First entry of a start-sorted view that covers `time`.
///
/// Linear scan; suitable for one-off queries. Build an `ActiveEntryIndex`
/// when the same view is queried repeatedly.
pub fn resolve<'a, I>(time: f64, view: I) -> Option<&'a SubtitleEntry>
where
    I: IntoIterator<Item = &'a SubtitleEntry>,
{
    view.into_iter().find(|entry| entry.covers(time))
}

/// Precomputed lookup structure answering `resolve` in O(log n)
#[derive(Debug, Clone)]
pub struct ActiveEntryIndex<'a> {
    // @field: Entries sorted by start
    entries: Vec<&'a SubtitleEntry>,

    // @field: max_end[i] is the largest end among entries[..=i]
    max_end: Vec<f64>,
}

impl<'a> ActiveEntryIndex<'a> {
    /// Build an index over `entries` in any order
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a SubtitleEntry>,
    {
        let mut entries: Vec<&'a SubtitleEntry> = entries.into_iter().collect();
        entries.sort_by(|a, b| compare_start(a, b));

        let mut running = f64::NEG_INFINITY;
        let max_end = entries
            .iter()
            .map(|entry| {
                running = running.max(entry.end);
                running
            })
            .collect();

        Self { entries, max_end }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Same answer as `resolve(time, view)` over the indexed entries
    pub fn resolve(&self, time: f64) -> Option<&'a SubtitleEntry> {
        if time.is_nan() {
            return None;
        }

        // Entries before `upper` start at or before `time`
        let upper = self.entries.partition_point(|entry| entry.start <= time);
        // First entry whose end reaches `time`; everything before it ends too early
        let first = self.max_end.partition_point(|&end| end < time);

        if first < upper {
            Some(self.entries[first])
        } else {
            None
        }
    }
}

/// Change in the displayed entry between two playback samples
#[derive(Debug, Clone, PartialEq)]
pub enum ActiveChange<'a> {
    /// A different entry became active
    Show(&'a SubtitleEntry),
    /// Nothing is active anymore
    Hide,
}

/// Remembers the active entry across playback samples
#[derive(Debug, Default, Clone)]
pub struct PlaybackCursor {
    current: Option<EntryId>,
}

impl PlaybackCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&EntryId> {
        self.current.as_ref()
    }

    /// Sample the index at `time`, reporting only transitions
    pub fn advance<'a>(&mut self, index: &ActiveEntryIndex<'a>, time: f64) -> Option<ActiveChange<'a>> {
        let active = index.resolve(time);
        let active_id = active.map(|entry| &entry.id);

        if active_id == self.current.as_ref() {
            return None;
        }

        self.current = active_id.cloned();
        Some(match active {
            Some(entry) => ActiveChange::Show(entry),
            None => ActiveChange::Hide,
        })
    }
}
