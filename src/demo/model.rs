use anyhow::Context;
use parking_lot::Mutex;
use redraw_core::{
    CallbackContext,
    ContextEffect,
    ContextShout,
    DropCallbackHelper,
    Field,
    ObservationTree,
    ThreadContext,
    TimerHandle,
    WidgetContext,
};
use serde::{Deserialize, Serialize};
use std::{
    sync::{Arc, Weak},
    time::Duration,
};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Counter living behind its own handle. Widgets holding only this handle are
/// isolated from writes to the rest of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NestedCounter {
    pub count: Field<i64>,
}

/// The observed app data. Every field is tracked on its own, and handles
/// compare by identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Store {
    pub child1: Field<NestedCounter>,
    pub child2: Field<i64>,
    pub child3: Field<i64>,
}

impl Store {
    pub fn new(context: &ThreadContext) -> Self {
        let tree = context.tree();
        Self {
            child1: tree.field(NestedCounter { count: tree.field(0) }),
            child2: tree.field(0),
            child3: tree.field(0),
        }
    }

    pub fn snapshot(&self, context: &impl ContextShout) -> StoreRecord {
        StoreRecord {
            child1: context.peek(context.peek(self.child1).count),
            child2: context.peek(self.child2),
            child3: context.peek(self.child3),
        }
    }

    /// Schedules writes bringing the store to `record`.
    pub fn restore(&self, context: &impl ContextShout, record: &StoreRecord) {
        context.shout(context.spy(self.child1).count, record.child1);
        context.shout(self.child2, record.child2);
        context.shout(self.child3, record.child3);
    }
}

/// Plain values of a [`Store`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreRecord {
    pub child1: i64,
    pub child2: i64,
    pub child3: i64,
}

impl StoreRecord {
    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string(self).context("failed to serialize the store record")
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("failed to parse the store record")
    }
}

/// View model counting up once per [`TICK_INTERVAL`] on its own. The timer only
/// holds a weak reference, so it never keeps the counter alive.
#[derive(Debug)]
pub struct ViewModelCounter {
    pub count: Field<i64>,
    pub grand_child_count: Field<i64>,
    timer: Mutex<Option<TimerHandle>>,
    tree: Arc<ObservationTree>,
}

impl ViewModelCounter {
    pub fn new(context: &ThreadContext) -> Arc<Self> {
        let tree = context.tree().clone();
        Arc::new_cyclic(|this: &Weak<Self>| {
            let this = this.clone();
            let timer = context.timers().repeating(TICK_INTERVAL, move |context: &CallbackContext| {
                if let Some(counter) = this.upgrade() {
                    counter.tick(context);
                }
            });
            log::debug!("created view model counter with timer {:?}", timer.id());

            Self {
                count: tree.field(0),
                grand_child_count: tree.field(0),
                timer: Mutex::new(Some(timer)),
                tree,
            }
        })
    }

    fn tick(&self, context: &CallbackContext) { context.shout_with(self.count, |count| count + 1) }

    /// Stops the timer. Idempotent, and independent of how many references to
    /// the counter are still around.
    pub fn dispose(&self) {
        let timer = self.timer.lock().take();
        if let Some(timer) = timer {
            log::debug!("disposing view model counter, cancelling timer {:?}", timer.id());
            timer.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.lock().as_ref().map_or(false, TimerHandle::is_active)
    }
}

impl Drop for ViewModelCounter {
    fn drop(&mut self) {
        self.dispose();
        self.tree.release(self.count);
        self.tree.release(self.grand_child_count);
    }
}

pub trait ContextViewModel {
    /// View model owned by the calling widget. It is created on the first render
    /// and disposed when the widget is torn down.
    fn view_model(&mut self) -> Arc<ViewModelCounter>;
}

impl<'a> ContextViewModel for WidgetContext<'a> {
    fn view_model(&mut self) -> Arc<ViewModelCounter> {
        let handle = self.effect(
            |context| {
                let counter = ViewModelCounter::new(context);
                let disposer = DropCallbackHelper::new({
                    let counter = counter.clone();
                    move || counter.dispose()
                });
                (counter, disposer)
            },
            (),
        );
        handle.with(|(counter, _)| counter.clone())
    }
}
