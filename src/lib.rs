/*!
 * # Subtitler - AI subtitle generation and burn-in
 *
 * A Rust library for editing video subtitles generated by a speech-to-text
 * backend and burning them into the video.
 *
 * ## Features
 *
 * - Parse and serialize SRT subtitle files
 * - Edit a timeline of subtitle entries keyed by stable ids
 * - Resolve the subtitle shown at any playback time
 * - Generate subtitles for a video through a backend service
 * - Burn subtitles into a video with configurable style
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `timestamp`: SRT timestamp codec
 * - `subtitle_processor`: Subtitle entries, SRT parsing and serialization
 * - `timeline`: Id-keyed subtitle store with a start-sorted view
 * - `resolver`: Active subtitle lookup for playback
 * - `style`: Burn-in style options
 * - `providers`: Backend clients:
 *   - `providers::backend`: HTTP transcription and burn-in client
 *   - `providers::mock`: In-memory backend for tests
 *   - `providers::retry`: Caller-side retry policy
 * - `session`: Editing session and backend workflows
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod file_utils;
pub mod timestamp;
pub mod subtitle_processor;
pub mod timeline;
pub mod resolver;
pub mod style;
pub mod providers;
pub mod session;
pub mod app_controller;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::Config;
pub use subtitle_processor::{EntryField, SubtitleEntry};
pub use timeline::{EntryId, IdGenerator, SequentialIdGenerator, TimelineStore, UuidIdGenerator};
pub use resolver::{resolve, ActiveEntryIndex};
pub use style::{StyleOptions, SubtitlePosition};
pub use session::EditorSession;
pub use errors::{AppError, CollaboratorError, SubtitleError};
