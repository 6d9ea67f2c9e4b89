use std::borrow::Borrow;
use std::cmp::Ordering;

use log::{debug, warn};

use crate::errors::SubtitleError;
use crate::timeline::{EntryId, IdGenerator};
use crate::timestamp;

// @module: SRT parsing and serialization

// @const: Separator between start and end timestamps
pub const TIME_SEPARATOR: &str = "-->";

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleEntry {
    // @field: Stable identifier, never carried by the SRT format
    pub id: EntryId,

    // @field: Start time in seconds
    pub start: f64,

    // @field: End time in seconds
    pub end: f64,

    // @field: Subtitle text, may span several lines
    pub text: String,
}

/// One editable field of an entry together with its new value
#[derive(Debug, Clone, PartialEq)]
pub enum EntryField {
    Start(f64),
    End(f64),
    Text(String),
}

impl EntryField {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start(_) => "start",
            Self::End(_) => "end",
            Self::Text(_) => "text",
        }
    }
}

impl SubtitleEntry {
    pub fn new(id: EntryId, start: f64, end: f64, text: impl Into<String>) -> Self {
        SubtitleEntry {
            id,
            start,
            end,
            text: text.into(),
        }
    }

    /// Copy of this entry with exactly one field replaced
    pub fn with_field(&self, field: EntryField) -> Self {
        let mut updated = self.clone();
        match field {
            EntryField::Start(start) => updated.start = start,
            EntryField::End(end) => updated.end = end,
            EntryField::Text(text) => updated.text = text,
        }
        updated
    }

    /// Whether `time` falls inside `[start, end]`
    pub fn covers(&self, time: f64) -> bool {
        self.start <= time && time <= self.end
    }

    // @checks: end not before start
    pub fn is_well_formed(&self) -> bool {
        self.end >= self.start
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> Result<String, SubtitleError> {
        timestamp::encode(self.start)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> Result<String, SubtitleError> {
        timestamp::encode(self.end)
    }

    /// Render the entry as one SRT block numbered `index`
    pub fn to_srt_block(&self, index: usize) -> Result<String, SubtitleError> {
        // Blank lines would split the block when read back
        let text = self
            .text
            .split('\n')
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        Ok(format!(
            "{}\n{} {} {}\n{}",
            index,
            self.format_start_time()?,
            TIME_SEPARATOR,
            self.format_end_time()?,
            text
        ))
    }
}

/// Order of two entries by start time; `-0.0` and `0.0` compare equal
pub fn compare_start(a: &SubtitleEntry, b: &SubtitleEntry) -> Ordering {
    // total_cmp would put -0.0 before 0.0
    (a.start + 0.0).total_cmp(&(b.start + 0.0))
}

/// Entries ordered by ascending start; equal starts keep their input order
pub fn sort_by_start<E: Borrow<SubtitleEntry>>(entries: &[E]) -> Vec<&SubtitleEntry> {
    let mut sorted: Vec<&SubtitleEntry> = entries
        .iter()
        .map(|e| <E as Borrow<SubtitleEntry>>::borrow(e))
        .collect();
    sorted.sort_by(|a, b| compare_start(a, b));
    sorted
}

/// Parse SRT format string into subtitle entries
///
/// Blocks with fewer than two lines are skipped. A block whose time range
/// cannot be decoded aborts the whole parse so callers never receive a
/// partial timeline.
pub fn parse_srt_string(content: &str, ids: &mut dyn IdGenerator) -> Result<Vec<SubtitleEntry>, SubtitleError> {
    let normalized = content
        .trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .replace('\r', "\n");

    let mut entries = Vec::new();

    for (block_idx, mut lines) in split_blocks(&normalized).into_iter().enumerate() {
        let block_num = block_idx + 1;
        if lines.len() < 2 {
            debug!("Skipping block {} with fewer than two lines", block_num);
            continue;
        }

        let last = lines.len() - 1;
        lines[0] = lines[0].trim_start();
        lines[last] = lines[last].trim_end();

        // The index line is optional
        let (time_line, text_lines) = if lines[0].contains(TIME_SEPARATOR) {
            (lines[0], &lines[1..])
        } else {
            (lines[1], &lines[2..])
        };

        let (start, end) = parse_time_range(time_line).map_err(|e| match e {
            SubtitleError::Format(msg) => SubtitleError::format(format!("block {}: {}", block_num, msg)),
            other => other,
        })?;

        entries.push(SubtitleEntry::new(ids.next_id(), start, end, text_lines.join("\n")));
    }

    // Stable sort keeps file order for equal starts
    entries.sort_by(compare_start);

    let overlap_count = entries
        .windows(2)
        .filter(|pair| pair[0].end > pair[1].start)
        .count();
    if overlap_count > 0 {
        warn!("Found {} overlapping subtitle entries", overlap_count);
    }

    debug!("Parsed {} subtitle entries", entries.len());
    Ok(entries)
}

/// Render entries as canonical SRT, numbered from 1 in start order
pub fn to_srt_string<E: Borrow<SubtitleEntry>>(entries: &[E]) -> Result<String, SubtitleError> {
    let blocks = sort_by_start(entries)
        .into_iter()
        .enumerate()
        .map(|(i, entry)| entry.to_srt_block(i + 1))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(blocks.join("\n\n"))
}

fn parse_time_range(line: &str) -> Result<(f64, f64), SubtitleError> {
    let (start, end) = line.split_once(TIME_SEPARATOR).ok_or_else(|| {
        SubtitleError::format(format!("missing '{}' in time line {:?}", TIME_SEPARATOR, line))
    })?;

    Ok((timestamp::decode(start.trim())?, timestamp::decode(end.trim())?))
}

fn split_blocks(content: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in content.split('\n') {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }

    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}
