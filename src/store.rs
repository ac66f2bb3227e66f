//! The board state store: single owner of the board and its only write path.

use tracing::{debug, error, warn};

use crate::io::persist::Persistence;
use crate::model::board::Board;
use crate::ops::check::check_board;

pub type SubscriptionId = u64;

type Subscriber = Box<dyn FnMut(&Board)>;

/// How the store's initial board came about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardOrigin {
    /// Loaded from persistence as-is
    Loaded,
    /// Loaded, but card stage labels had to be resynced
    Repaired { cards: usize },
    /// Nothing usable was persisted; started from the seed
    Seeded(SeedReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedReason {
    NothingPersisted,
    LoadFailed(String),
    Malformed(String),
}

pub struct BoardStore<P: Persistence> {
    board: Board,
    persistence: P,
    origin: BoardOrigin,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: SubscriptionId,
}

impl<P: Persistence> BoardStore<P> {
    /// Load the persisted board, falling back to `seed()` when nothing
    /// usable is stored. Never fails.
    pub fn open(mut persistence: P, seed: impl FnOnce() -> Board) -> Self {
        let (board, origin) = match persistence.load() {
            Ok(Some(mut board)) => {
                let report = check_board(&board);
                if let Some(err) = report.errors.iter().find(|e| e.is_structural()) {
                    warn!(problem = ?err, "persisted board is malformed, using seed");
                    let reason = format!("{err:?}");
                    persistence.quarantine(&board, &reason);
                    (seed(), BoardOrigin::Seeded(SeedReason::Malformed(reason)))
                } else {
                    match board.resync_stages() {
                        0 => (board, BoardOrigin::Loaded),
                        cards => {
                            warn!(cards, "resynced card stages with their columns");
                            (board, BoardOrigin::Repaired { cards })
                        }
                    }
                }
            }
            Ok(None) => (seed(), BoardOrigin::Seeded(SeedReason::NothingPersisted)),
            Err(e) => {
                warn!(error = %e, "could not load board state, using seed");
                (seed(), BoardOrigin::Seeded(SeedReason::LoadFailed(e.to_string())))
            }
        };

        BoardStore {
            board,
            persistence,
            origin,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Current snapshot
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn origin(&self) -> &BoardOrigin {
        &self.origin
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Apply a transform. `f` reports whether it changed the board; only
    /// then is the result checked, saved and published.
    pub fn update<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&mut Board) -> bool,
    {
        if !f(&mut self.board) {
            return false;
        }

        let report = check_board(&self.board);
        if !report.valid {
            error!(errors = ?report.errors, "board invariants violated after update");
        }

        if let Err(e) = self.persistence.save(&self.board) {
            warn!(error = %e, "could not save board state");
        } else {
            debug!(cards = self.board.card_count(), "board saved");
        }

        for (_, subscriber) in &mut self.subscribers {
            subscriber(&self.board);
        }
        true
    }

    /// Write the current board without changing it.
    pub fn flush(&mut self) -> bool {
        match self.persistence.save(&self.board) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "could not save board state");
                false
            }
        }
    }

    /// Register a callback invoked with the new board after every change.
    pub fn subscribe(&mut self, f: impl FnMut(&Board) + 'static) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(f)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }
}
