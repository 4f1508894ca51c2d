use crate::{
    config::Config,
    demo::{Store, StoreRecord},
    shell::ContentView,
};
use anyhow::Context;
use log::info;
use redraw_core::{Evaluator, ThreadContext};
use std::{fmt::Write, time::Duration};

/// The demo application: owns the store and the evaluator rendering the
/// content view on top of it.
pub struct App {
    evaluator: Evaluator,
    store: Store,
    config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        let context = ThreadContext::default();
        let store = Store::new(&context);
        let mut evaluator = Evaluator::with_context(context);
        evaluator.mount(ContentView { store, equality_override: config.equality_override });
        info!(
            "started with the equality override {}",
            if config.equality_override { "enabled" } else { "disabled" }
        );

        Self { evaluator, store, config }
    }

    /// Clicks the button labeled `label` and renders the result.
    pub fn click(&mut self, label: &str) -> anyhow::Result<()> {
        self.evaluator.click(label).with_context(|| format!("failed to click {:?}", label))?;
        self.evaluator.update();
        Ok(())
    }

    /// Moves the demo clock forward, returns the number of timer ticks.
    pub fn advance(&mut self, dt: Duration) -> usize { self.evaluator.advance(dt) }

    pub fn renders(&self, suffix: &str) -> usize { self.evaluator.stats().renders(suffix) }

    pub fn text(&self, suffix: &str) -> Option<String> { self.evaluator.text(suffix) }

    pub fn snapshot(&self) -> StoreRecord { self.store.snapshot(&self.evaluator.thread_context()) }

    pub fn restore(&mut self, record: &StoreRecord) {
        self.store.restore(&self.evaluator.thread_context(), record);
        self.evaluator.update();
    }

    pub fn store(&self) -> Store { self.store }

    pub fn config(&self) -> &Config { &self.config }

    pub fn evaluator(&self) -> &Evaluator { &self.evaluator }

    pub fn evaluator_mut(&mut self) -> &mut Evaluator { &mut self.evaluator }

    /// render counts of every fragment, one per line
    pub fn report(&self) -> String {
        let stats = self.evaluator.stats();
        let mut report = String::new();
        for (path, renders) in stats.profile() {
            let skips = stats.skips(&path);
            // writing to a String can not fail
            let _ = if skips > 0 {
                writeln!(report, "{:>5}  {} (skipped {})", renders, path, skips)
            } else {
                writeln!(report, "{:>5}  {}", renders, path)
            };
        }
        report
    }
}

impl Default for App {
    fn default() -> Self { Self::new(Config::default()) }
}
