pub mod all_eq;
pub mod debug_border;
