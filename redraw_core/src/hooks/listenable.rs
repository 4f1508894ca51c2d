use crate::{CallbackContext, Field, ObservationTree, ThreadContext, WidgetContext};
use std::sync::Arc;

pub trait ContextListenable {
    /// field local to the calling widget, created with `initial` on the first
    /// render and released when the widget is torn down
    fn listenable<T: Send + Sync + 'static>(&mut self, initial: T) -> Field<T>;

    /// committed value of `field`; the widget re-renders when it is written
    fn listen<T: Clone + Send + Sync + 'static>(&mut self, field: Field<T>) -> T;
}

impl<'a> ContextListenable for WidgetContext<'a> {
    fn listenable<T: Send + Sync + 'static>(&mut self, initial: T) -> Field<T> {
        let key = self.key_for_hook();
        self.tree().initialize_with(key, || initial)
    }

    fn listen<T: Clone + Send + Sync + 'static>(&mut self, field: Field<T>) -> T {
        self.mark_read(field.idx);
        self.tree().get(field)
    }
}

/// Untracked access to fields, available from every context.
pub trait ContextShout {
    fn observation_tree(&self) -> &Arc<ObservationTree>;

    /// Schedules a write. It becomes visible to renders with the next update.
    fn shout<T: Send + Sync + 'static>(&self, field: Field<T>, value: T) {
        self.observation_tree().set(field, value)
    }

    /// newest value, including writes not applied yet
    fn spy<T: Clone + 'static>(&self, field: Field<T>) -> T {
        self.observation_tree().get_latest(field)
    }

    /// value as seen by renders of the current frame
    fn peek<T: Clone + 'static>(&self, field: Field<T>) -> T { self.observation_tree().get(field) }

    fn shout_with<T: Clone + Send + Sync + 'static>(&self, field: Field<T>, f: impl FnOnce(T) -> T) {
        self.shout(field, f(self.spy(field)))
    }
}

impl<'a> ContextShout for WidgetContext<'a> {
    fn observation_tree(&self) -> &Arc<ObservationTree> { self.tree() }
}

impl ContextShout for CallbackContext {
    fn observation_tree(&self) -> &Arc<ObservationTree> { &self.thread.tree }
}

impl ContextShout for ThreadContext {
    fn observation_tree(&self) -> &Arc<ObservationTree> { &self.tree }
}
