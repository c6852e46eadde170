//! Domain model module declarations.

pub mod document;
pub mod intent;
pub mod interaction;
pub mod item;
