//! Navigation state for the explorer. Nothing in here performs I/O; every
//! type is owned by the input loop and mutated one event at a time.

pub mod browser;
pub mod detail;
pub mod focus;
pub mod gate;
pub mod layout;
pub mod list;
pub mod table_view;
pub mod visual;
