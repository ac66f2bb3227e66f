//! Opportunity board engine.
//!
//! Cards (sales opportunities) live in an ordered set of columns. They are
//! reordered by drag and drop, created and deleted behind a duplicate-trigger
//! guard, and persisted after every change. See [`engine::Engine`] for the
//! entry point a UI binds to.

pub mod cli;
pub mod engine;
pub mod io;
pub mod model;
pub mod ops;
pub mod store;

pub use engine::Engine;
pub use store::BoardStore;
