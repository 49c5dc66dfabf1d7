//! Script Execution Subsystem
//!
//! The engineering core of ScriptDeck: resolving script sources to concrete
//! files, launching interpreter processes with a merged output stream,
//! streaming that output line-by-line from dedicated worker threads, and
//! tracking session lifecycle in an explicit registry.

pub mod events;
pub mod launcher;
pub mod registry;
pub mod resolver;
pub mod streamer;

// Re-exports for convenience
pub use events::SessionEvent;
pub use launcher::{is_command_available, launch, LaunchedProcess};
pub use registry::{SessionHandle, SessionInfo, SessionRegistry};
pub use resolver::{resolve, ResolvedScript};
pub use streamer::{stream_lines, LineAssembler};
