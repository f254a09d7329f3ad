pub mod analyzer;
pub mod extract;
pub mod prompts;
pub mod session;

pub use analyzer::ValueAnalyzer;
pub use session::{spawn_sweeper, ChatSession, SessionStore, SWEEP_INTERVAL};
