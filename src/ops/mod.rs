pub mod board_ops;
pub mod check;
pub mod drag;
pub mod drop_position;
pub mod guard;
