use crate::{ContextListenable, Field, ObservationTree, ThreadContext, WidgetContext};
use std::sync::Arc;

/// Value created by [`ContextEffect::effect`], living in the observation tree
/// until the widget is torn down or the deps change.
#[derive(Debug, Clone)]
pub struct EffectHandle<T> {
    field: Field<Option<T>>,
    tree: Arc<ObservationTree>,
}

impl<T: 'static> EffectHandle<T> {
    /// `f` runs while the tree is locked
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.tree.with(self.field, |value| {
            f(value.as_ref().expect("effect was not initialized; this is likely an internal redraw bug :("))
        })
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.with(T::clone)
    }
}

pub trait ContextEffect {
    /// Runs `callback` on the first render and again whenever `deps` differ
    /// from the previous render. The previous value is dropped after the new
    /// one was created; the last one is dropped when the widget is torn down.
    fn effect<T, D>(&mut self, callback: impl FnOnce(&ThreadContext) -> T, deps: D) -> EffectHandle<T>
    where
        T: Send + Sync + 'static,
        D: PartialEq + Send + Sync + 'static;
}

impl<'a> ContextEffect for WidgetContext<'a> {
    fn effect<T, D>(&mut self, callback: impl FnOnce(&ThreadContext) -> T, deps: D) -> EffectHandle<T>
    where
        T: Send + Sync + 'static,
        D: PartialEq + Send + Sync + 'static,
    {
        let deps_field: Field<Option<D>> = self.listenable(None);
        let handle_field: Field<Option<T>> = self.listenable(None);
        let deps = Some(deps);

        let tree = self.tree().clone();
        if !tree.with(handle_field, Option::is_some) {
            let handle = callback(&self.thread);
            tree.set_unconditional(handle_field.idx, Box::new(Some(handle)));
            tree.set_unconditional(deps_field.idx, Box::new(deps));
        } else if !tree.with(deps_field, |old| *old == deps) {
            tree.set_unconditional(deps_field.idx, Box::new(deps));
            let handle = callback(&self.thread);
            tree.set_unconditional(handle_field.idx, Box::new(Some(handle)));
        }

        EffectHandle { field: handle_field, tree }
    }
}

/// Runs the callback when dropped. Returned from effects to tie cleanup to the
/// lifetime of the widget.
pub struct DropCallbackHelper<T: FnOnce()> {
    callback: Option<T>,
}
impl<T: FnOnce()> DropCallbackHelper<T> {
    pub fn new(callback: T) -> DropCallbackHelper<T> { Self { callback: Some(callback) } }
}
impl<T: FnOnce()> Drop for DropCallbackHelper<T> {
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            callback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ContextShout, Evaluator, FragmentInner, Widget};
    use std::sync::atomic::{AtomicUsize, Ordering};

    static CREATED: AtomicUsize = AtomicUsize::new(0);
    static DROPPED: AtomicUsize = AtomicUsize::new(0);

    struct WithEffect {
        deps: Field<u8>,
    }
    impl Widget for WithEffect {
        const NAME: &'static str = "with_effect";
        fn render(&self, context: &mut WidgetContext) -> FragmentInner {
            let deps = context.listen(self.deps);
            let handle = context.effect(
                |_| {
                    CREATED.fetch_add(1, Ordering::SeqCst);
                    DropCallbackHelper::new(|| {
                        DROPPED.fetch_add(1, Ordering::SeqCst);
                    })
                },
                deps,
            );
            handle.with(|_| ());
            FragmentInner::empty()
        }
    }

    #[test]
    fn effects_follow_deps_and_teardown() {
        let mut evaluator = Evaluator::new();
        let deps = evaluator.thread_context().tree().field(0u8);
        evaluator.mount(WithEffect { deps });
        assert_eq!(CREATED.load(Ordering::SeqCst), 1);

        // same deps, no new effect
        evaluator.thread_context().shout(deps, 0);
        evaluator.update();
        assert_eq!(evaluator.stats().renders("with_effect"), 2);
        assert_eq!(CREATED.load(Ordering::SeqCst), 1);
        assert_eq!(DROPPED.load(Ordering::SeqCst), 0);

        evaluator.thread_context().shout(deps, 1);
        evaluator.update();
        assert_eq!(CREATED.load(Ordering::SeqCst), 2);
        assert_eq!(DROPPED.load(Ordering::SeqCst), 1);

        evaluator.unmount();
        assert_eq!(DROPPED.load(Ordering::SeqCst), 2);
    }
}
