pub mod delta_eval;
pub mod fragment;
pub mod input;
pub mod stats;
pub mod timer;
pub mod widget;
