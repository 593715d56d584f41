//! The per-game state machine.
//!
//! A [`GameSession`] owns everything that mutates during one race: current
//! position, the path walked so far, the elapsed-seconds counter, the hint,
//! and (after the win) the reference optimal path. The graph itself is shared
//! read-only, so independent sessions can coexist over one loaded document.

use graph::{shortest_path, LinkGraph};
use protocol::{GameEvent, LinkRecord, Outcome, PathTab};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum GameError {
    #[error("unknown {role} subreddit '{name}'")]
    UnknownNode { role: &'static str, name: String },
    #[error("'{to}' is not linked from '{from}'")]
    InvalidMove { from: String, to: String },
    #[error("the race is already won")]
    NotPlaying,
    #[error("no path from '{start}' to '{end}' despite a completed run")]
    Inconsistent { start: String, end: String },
}

/// Gameplay phase. `Won` is terminal: only tab selection remains valid, and
/// a restart is a fresh session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Playing,
    Won,
}

pub struct GameSession {
    graph: Arc<LinkGraph>,
    start: String,
    end: String,
    current: String,
    path: Vec<String>,
    elapsed_secs: u64,
    timer_active: bool,
    optimal_path: Vec<String>,
    hint: Option<String>,
    active_tab: PathTab,
    subscribers: Vec<UnboundedSender<GameEvent>>,
}

impl GameSession {
    /// Start a session for a validated (start, end) pair.
    ///
    /// Both endpoints must exist in the graph's key set. When they are equal
    /// the session is born won: single-node path, zero moves, timer never
    /// activates.
    pub fn new(graph: Arc<LinkGraph>, start: &str, end: &str) -> Result<Self, GameError> {
        for (role, name) in [("start", start), ("destination", end)] {
            if !graph.contains(name) {
                return Err(GameError::UnknownNode {
                    role,
                    name: name.to_string(),
                });
            }
        }

        let mut session = Self {
            graph,
            start: start.to_string(),
            end: end.to_string(),
            current: start.to_string(),
            path: vec![start.to_string()],
            elapsed_secs: 0,
            timer_active: start != end,
            optimal_path: Vec::new(),
            hint: None,
            active_tab: PathTab::Player,
            subscribers: Vec::new(),
        };
        if start == end {
            session.on_win()?;
        }
        Ok(session)
    }

    pub fn phase(&self) -> Phase {
        if self.current == self.end {
            Phase::Won
        } else {
            Phase::Playing
        }
    }

    /// Move to `node`, which must be an outgoing link of the current
    /// position. Clears any active hint; reaching the destination runs the
    /// win transition synchronously.
    pub fn select_next_hop(&mut self, node: &str) -> Result<(), GameError> {
        if self.phase() == Phase::Won {
            return Err(GameError::NotPlaying);
        }
        if !self
            .graph
            .neighbors(&self.current)
            .iter()
            .any(|l| l.subreddit == node)
        {
            return Err(GameError::InvalidMove {
                from: self.current.clone(),
                to: node.to_string(),
            });
        }

        self.current = node.to_string();
        self.path.push(node.to_string());
        self.hint = None;
        debug!("hop to '{}' ({} moves)", node, self.player_moves());
        self.emit(GameEvent::Moved {
            to: node.to_string(),
            moves: self.player_moves(),
        });

        if self.current == self.end {
            self.on_win()?;
        }
        Ok(())
    }

    /// Suggest the next hop on a shortest route to the destination.
    ///
    /// Silent no-op when already at the destination or when no route exists;
    /// a missing hint is not an error.
    pub fn request_hint(&mut self) {
        if self.phase() == Phase::Won {
            return;
        }
        match shortest_path(&self.graph, &self.current, &self.end) {
            Some(route) if route.len() > 1 => {
                let next = route[1].clone();
                self.hint = Some(next.clone());
                self.emit(GameEvent::HintReady { next });
            }
            _ => debug!("no hint available from '{}'", self.current),
        }
    }

    /// One-second timer tick. Ignored once the timer is deactivated, so a
    /// tick already in flight at win time records nothing.
    pub fn tick(&mut self) {
        if !self.timer_active {
            return;
        }
        self.elapsed_secs += 1;
        self.emit(GameEvent::Ticked {
            elapsed_secs: self.elapsed_secs,
        });
    }

    /// Select which path the post-win comparison shows. Only effective once
    /// won with a known, strictly shorter optimal path; no-op otherwise.
    pub fn set_comparison_tab(&mut self, tab: PathTab) {
        let comparable = self.phase() == Phase::Won
            && !self.optimal_path.is_empty()
            && self.optimal_path.len() < self.path.len();
        if !comparable {
            return;
        }
        self.active_tab = tab;
        self.emit(GameEvent::TabSelected { tab });
    }

    /// Playing -> Won transition. Runs exactly once per session: the timer is
    /// deactivated and the reference optimal path is computed here and never
    /// again.
    fn on_win(&mut self) -> Result<(), GameError> {
        self.timer_active = false;
        match shortest_path(&self.graph, &self.start, &self.end) {
            Some(optimal) => {
                self.optimal_path = optimal;
                self.emit(GameEvent::Won {
                    moves: self.player_moves(),
                    optimal_moves: self.optimal_path.len() - 1,
                });
                Ok(())
            }
            None => {
                // The player just walked a start-to-end path, so one must
                // exist; this can only be a construction bug, not bad input.
                error!(
                    "optimal-path search failed after a completed run ({} -> {})",
                    self.start, self.end
                );
                Err(GameError::Inconsistent {
                    start: self.start.clone(),
                    end: self.end.clone(),
                })
            }
        }
    }

    /// Register an observer; every state mutation emits one event.
    pub fn subscribe(&mut self) -> UnboundedReceiver<GameEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    fn emit(&mut self, event: GameEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Outgoing links available from the current position, in document order.
    pub fn options(&self) -> &[LinkRecord] {
        self.graph.neighbors(&self.current)
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn timer_active(&self) -> bool {
        self.timer_active
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn optimal_path(&self) -> &[String] {
        &self.optimal_path
    }

    pub fn active_tab(&self) -> PathTab {
        self.active_tab
    }

    pub fn player_moves(&self) -> usize {
        self.path.len() - 1
    }

    pub fn optimal_moves(&self) -> Option<usize> {
        if self.optimal_path.is_empty() {
            None
        } else {
            Some(self.optimal_path.len() - 1)
        }
    }

    /// Derived scoring outcome; `Unknown` until the optimal path is known.
    pub fn outcome(&self) -> Outcome {
        if self.phase() != Phase::Won || self.optimal_path.is_empty() {
            return Outcome::Unknown;
        }
        let optimal_moves = self.optimal_path.len() - 1;
        if self.player_moves() > optimal_moves {
            Outcome::Suboptimal { optimal_moves }
        } else {
            Outcome::Optimal
        }
    }
}

/// Render elapsed seconds as `M:SS`.
pub fn format_elapsed(total_secs: u64) -> String {
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}
