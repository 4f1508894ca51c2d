//! The observation demo: a store with differently observed fields and the
//! widgets displaying them.

pub mod model;
pub mod views;

pub use model::*;
pub use views::*;
