//! The observation demo on top of `redraw_core`: a store whose fields are
//! observed at different granularities, a self ticking view model and the
//! widgets showing which of them re-render on which write.

pub mod app;
pub mod config;
pub mod demo;
pub mod shell;

pub use app::App;
pub use config::Config;
