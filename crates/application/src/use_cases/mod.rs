//! Application use cases (multi-call workflows).

mod save_pet;
mod save_tutor;

pub use save_pet::*;
pub use save_tutor::*;
