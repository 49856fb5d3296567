// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod config;
pub mod deck;
pub mod error;
pub mod leaderboard;
pub mod logging;
pub mod moves;
pub mod runtime;
pub mod scheduler;
pub mod score;
pub mod session;

pub use deck::{Card, CardState, Deck, Symbol, SymbolSet};
pub use error::{DeckError, StoreError};
pub use session::{RevealOutcome, Session, SessionState, WinSummary};
