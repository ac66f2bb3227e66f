//! Entry point for a host UI.
//!
//! Each inbound UI event maps to one method here: drag events go to the
//! [`DragTracker`], create/delete triggers pass through the
//! [`MutationGuard`], and every board change goes through
//! [`BoardStore::update`].

use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use crate::io::persist::Persistence;
use crate::model::board::Board;
use crate::model::card::{CardDraft, generate_card_id};
use crate::model::config::BoardConfig;
use crate::ops::board_ops::{self, MoveRequest};
use crate::ops::drag::{DragSession, DragTracker, Point, Rect};
use crate::ops::drop_position::DropGeometry;
use crate::ops::guard::{Clock, MutationGuard, Rejected, SystemClock, TriggerFamily};
use crate::store::{BoardStore, SubscriptionId};

type DragSubscriber = Box<dyn FnMut(&DragSession)>;

pub struct Engine<P: Persistence> {
    store: BoardStore<P>,
    tracker: DragTracker,
    guard: MutationGuard,
    clock: Box<dyn Clock>,
    drag_subscribers: Vec<DragSubscriber>,
}

impl<P: Persistence> Engine<P> {
    pub fn new(store: BoardStore<P>, geometry: DropGeometry, debounce: Duration) -> Self {
        Engine {
            store,
            tracker: DragTracker::new(geometry),
            guard: MutationGuard::new(debounce),
            clock: Box::new(SystemClock),
            drag_subscribers: Vec::new(),
        }
    }

    /// Open the persisted board and configure geometry and debounce from
    /// `config`.
    pub fn from_config(persistence: P, config: &BoardConfig) -> Self {
        let store = BoardStore::open(persistence, || config.seed_board());
        Engine::new(
            store,
            DropGeometry::from(&config.drop),
            Duration::from_millis(config.guard.debounce_ms),
        )
    }

    /// Replace the time source used for debouncing.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn board(&self) -> &Board {
        self.store.board()
    }

    pub fn drag_session(&self) -> &DragSession {
        self.tracker.session()
    }

    pub fn store(&self) -> &BoardStore<P> {
        &self.store
    }

    pub fn geometry(&self) -> DropGeometry {
        self.tracker.geometry()
    }

    /// Be told about every board change.
    pub fn subscribe(&mut self, f: impl FnMut(&Board) + 'static) -> SubscriptionId {
        self.store.subscribe(f)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Be told about every drag session change (for drop indicators).
    pub fn on_drag(&mut self, f: impl FnMut(&DragSession) + 'static) {
        self.drag_subscribers.push(Box::new(f));
    }

    fn publish_drag(&mut self) {
        let session = self.tracker.session();
        for subscriber in &mut self.drag_subscribers {
            subscriber(session);
        }
    }

    // -----------------------------------------------------------------------
    // Drag events
    // -----------------------------------------------------------------------

    pub fn drag_start(&mut self, card_id: &str, column_id: &str, index: usize) -> bool {
        let changed = self.tracker.start(card_id, column_id, index);
        if changed {
            self.publish_drag();
        }
        changed
    }

    /// Pointer over a column's card list, `offset_y` pixels below its top.
    /// Unknown columns are ignored.
    pub fn drag_over(&mut self, column_id: &str, offset_y: f64) -> bool {
        let Some(card_count) = self.store.board().column(column_id).map(|c| c.len()) else {
            return false;
        };
        let changed = self.tracker.over(column_id, offset_y, card_count);
        if changed {
            self.publish_drag();
        }
        changed
    }

    pub fn drag_leave(&mut self, column_id: &str, pointer: Point, bounds: Rect) -> bool {
        let changed = self.tracker.leave(column_id, pointer, bounds);
        if changed {
            self.publish_drag();
        }
        changed
    }

    /// Release over `column_id`. Returns true if the board changed.
    pub fn drop(&mut self, column_id: &str) -> bool {
        let was_dragging = self.tracker.session().is_dragging();
        let request = self.tracker.drop(column_id);
        if was_dragging {
            self.publish_drag();
        }
        match request {
            Some(req) => self.move_card(&req),
            None => false,
        }
    }

    /// Drag ended without a drop.
    pub fn drag_end(&mut self) -> bool {
        let discarded = self.tracker.end();
        if discarded {
            self.publish_drag();
        }
        discarded
    }

    // -----------------------------------------------------------------------
    // Board mutations
    // -----------------------------------------------------------------------

    /// Commit a move. Stale requests are ignored.
    pub fn move_card(&mut self, req: &MoveRequest) -> bool {
        let moved = self.store.update(|board| board_ops::move_card(board, req));
        if moved {
            debug!(
                card = %req.card_id,
                from = %req.source_column,
                to = %req.target_column,
                index = req.target_index,
                "card moved"
            );
        }
        moved
    }

    /// Create a card from `draft` at the head of its column.
    ///
    /// Returns the new card's id, `Ok(None)` if nothing was added (unknown
    /// column, empty board), or the reason the trigger was ignored.
    pub fn add_card(&mut self, draft: CardDraft) -> Result<Option<String>, Rejected> {
        let _permit = self.guard.try_enter(TriggerFamily::Add, self.clock.now())?;

        let id = generate_card_id();
        let column = draft.column.clone();
        let stage = match &column {
            Some(c) => c.clone(),
            None => match self.store.board().columns.first() {
                Some(first) => first.id.clone(),
                None => return Ok(None),
            },
        };
        let card = draft.into_card(id.clone(), &stage, Utc::now());

        let added = self
            .store
            .update(|board| board_ops::add_card(board, card, column.as_deref()));
        if added {
            debug!(card = %id, column = %stage, "card added");
        }
        Ok(added.then_some(id))
    }

    /// Delete a card. `Ok(false)` if it was already gone.
    pub fn delete_card(&mut self, card_id: &str) -> Result<bool, Rejected> {
        let _permit = self
            .guard
            .try_enter(TriggerFamily::Delete, self.clock.now())?;
        let deleted = self
            .store
            .update(|board| board_ops::delete_card(board, card_id));
        if deleted {
            debug!(card = card_id, "card deleted");
        }
        Ok(deleted)
    }

    pub fn rename_column(&mut self, column_id: &str, name: &str) -> bool {
        self.store
            .update(|board| board_ops::rename_column(board, column_id, name))
    }
}
