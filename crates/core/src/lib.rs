//! Game engine for the subreddit race: a session state machine over a shared
//! read-only link graph, plus the tick timer that drives the clock.

pub mod session;
pub mod timer;

pub use session::{format_elapsed, GameError, GameSession, Phase};
pub use timer::TickTimer;
