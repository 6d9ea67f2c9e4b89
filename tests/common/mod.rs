/*!
 * Common test utilities for the subtitler test suite
 */

use std::path::{Path, PathBuf};
use std::fs;
use anyhow::Result;
use tempfile::TempDir;

use subtitler::subtitle_processor::SubtitleEntry;
use subtitler::timeline::{EntryId, SequentialIdGenerator, TimelineStore};

/// Three well-formed entries, already in start order
pub const SAMPLE_SRT: &str = "1
00:00:01,000 --> 00:00:04,000
This is a test subtitle.

2
00:00:05,000 --> 00:00:09,000
It contains multiple entries.

3
00:00:10,000 --> 00:00:14,000
For testing purposes.";

/// Same entries as `SAMPLE_SRT` written out of order with odd numbering
pub const SHUFFLED_SRT: &str = "7
00:00:10,000 --> 00:00:14,000
For testing purposes.

3
00:00:01,000 --> 00:00:04,000
This is a test subtitle.

12
00:00:05,000 --> 00:00:09,000
It contains multiple entries.
";

/// Route library logs to the test output; safe to call from every test
pub fn init_test_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a sample subtitle file for testing
pub fn create_test_subtitle(dir: &Path, filename: &str) -> Result<PathBuf> {
    create_test_file(dir, filename, SAMPLE_SRT)
}

/// Creates a fake video file; the backends under test never decode it
pub fn create_test_video(dir: &Path, filename: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, b"\x00\x00\x00\x18ftypmp42fake video payload")?;
    Ok(file_path)
}

/// Timeline with predictable ids (`sub-1`, `sub-2`, ...)
pub fn sequential_timeline() -> TimelineStore {
    TimelineStore::with_id_generator(SequentialIdGenerator::new())
}

/// Shorthand for building an entry
pub fn entry(id: &str, start: f64, end: f64, text: &str) -> SubtitleEntry {
    SubtitleEntry::new(EntryId::new(id), start, end, text)
}
