use serde::{Deserialize, Serialize};

/// One outgoing hyperlink in the graph document. The document maps each
/// subreddit name to an ordered list of these records; order is meaningful
/// (it decides BFS tie-breaking) and is preserved end to end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkRecord {
    pub subreddit: String,
}

impl LinkRecord {
    pub fn new(subreddit: impl Into<String>) -> Self {
        Self {
            subreddit: subreddit.into(),
        }
    }
}

/// Which path is shown on the post-win comparison view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PathTab {
    Player,
    Optimal,
}

/// Scoring outcome once a session is won.
///
/// `Unknown` covers both "still playing" and "optimal path unavailable";
/// callers show no comparison in that case.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Outcome {
    Optimal,
    Suboptimal { optimal_moves: usize },
    Unknown,
}

/// Session lifecycle notification, emitted after every state mutation so
/// observers (the CLI status line, tests) can redraw without polling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum GameEvent {
    Moved { to: String, moves: usize },
    HintReady { next: String },
    Ticked { elapsed_secs: u64 },
    Won { moves: usize, optimal_moves: usize },
    TabSelected { tab: PathTab },
}
