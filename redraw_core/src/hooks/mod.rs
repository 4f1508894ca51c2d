pub(crate) mod effect;
pub use effect::*;

pub(crate) mod listenable;
pub use listenable::*;
