use super::model::{ContextViewModel, NestedCounter, Store, ViewModelCounter};
use redraw_core::{
    all_eq,
    widgets::{column, Button, Text},
    CallbackContext,
    ContextListenable,
    ContextShout,
    Equality,
    FragmentInner,
    ThreadContext,
    Widget,
    WidgetContext,
};
use std::{rc::Rc, sync::Arc};

/// Root of the demo. Reads all three store fields, so any store write
/// re-renders it. It has no props comparison of its own, so every render of
/// its parent re-renders it too, unless `equality_override` is set and
/// `child2` did not change since its last render.
pub struct ObservationDemo {
    pub store: Store,
    pub equality_override: bool,
}

impl Widget for ObservationDemo {
    const NAME: &'static str = "observation_demo";

    fn render(&self, context: &mut WidgetContext) -> FragmentInner {
        let store = self.store;
        let child1 = context.listen(store.child1);
        let child2 = context.listen(store.child2);
        let child3 = context.listen(store.child3);

        column([
            context.child(Controls { store }),
            context.child(Child1 { counter: child1 }),
            context.child(Child2::new(child2)),
            context.child(Child3 { count: child3 }),
            context.child(Child4),
        ])
    }

    fn equality(&self) -> Option<Equality> {
        let child2 = self.store.child2;
        self.equality_override
            .then(|| Equality::on(move |context: &ThreadContext| context.tree().get(child2)))
    }
}

pub struct Controls {
    pub store: Store,
}

impl Widget for Controls {
    const NAME: &'static str = "controls";

    fn render(&self, context: &mut WidgetContext) -> FragmentInner {
        let store = self.store;
        column([
            context.child(Text::new("Controls")),
            context.child(Button::new("Increment Child 1 Count", move |context: &CallbackContext| {
                let counter = context.spy(store.child1);
                context.shout_with(counter.count, |count| count + 1)
            })),
            context.child(Button::new("Increment Child 2 Count", move |context: &CallbackContext| {
                context.shout_with(store.child2, |count| count + 1)
            })),
            context.child(Button::new("Increment Child 3 Count", move |context: &CallbackContext| {
                context.shout_with(store.child3, |count| count + 1)
            })),
        ])
    }

    fn same(&self, previous: &Self) -> bool { self.store == previous.store }
}

/// Only sees the nested counter handle, so nothing but `count` writes reach it.
pub struct Child1 {
    pub counter: NestedCounter,
}

impl Widget for Child1 {
    const NAME: &'static str = "child1";

    fn render(&self, context: &mut WidgetContext) -> FragmentInner {
        let count = context.listen(self.counter.count);
        FragmentInner::text(format!("Child 1 - Count: {}", count)).debug_mode()
    }

    fn same(&self, previous: &Self) -> bool { self.counter == previous.counter }
}

pub struct Child2 {
    pub count: i64,
    pub non_diffable: Rc<dyn Fn() -> i64>,
}

impl Child2 {
    pub fn new(count: i64) -> Self { Self { count, non_diffable: Rc::new(|| 0) } }
}

impl Widget for Child2 {
    const NAME: &'static str = "child2";

    fn render(&self, _context: &mut WidgetContext) -> FragmentInner {
        FragmentInner::text(format!("Child 2 - Count: {}", self.count)).debug_mode()
    }

    // the closure only compares by address, so this never holds for two renders
    // of the parent
    fn same(&self, previous: &Self) -> bool {
        all_eq!(&self.count, &previous.count) && all_eq!(&self.non_diffable, &previous.non_diffable)
    }
}

pub struct Child3 {
    pub count: i64,
}

impl Widget for Child3 {
    const NAME: &'static str = "child3";

    fn render(&self, _context: &mut WidgetContext) -> FragmentInner {
        FragmentInner::text(format!("Child 3 - Count: {}", self.count)).debug_mode()
    }
}

/// Panel owning a [`ViewModelCounter`]. Has no props worth comparing and
/// therefore renders with every render of its parent.
pub struct Child4;

impl Widget for Child4 {
    const NAME: &'static str = "child4";

    fn render(&self, context: &mut WidgetContext) -> FragmentInner {
        let view_model = context.view_model();
        let count = context.listen(view_model.count);

        column([
            context.child(Text::new(format!("Child 4 - Count: {}", count))),
            context.child_keyed(0, GrandChild { source: GrandChildSource::Live(view_model) }),
            context.child_keyed(1, GrandChild { source: GrandChildSource::Local(count) }),
        ])
    }
}

pub enum GrandChildSource {
    /// the view model itself, compared by identity
    Live(Arc<ViewModelCounter>),
    /// a plain copy of a count
    Local(i64),
}

pub struct GrandChild {
    pub source: GrandChildSource,
}

impl Widget for GrandChild {
    const NAME: &'static str = "grand_child";

    fn render(&self, context: &mut WidgetContext) -> FragmentInner {
        let count = match &self.source {
            GrandChildSource::Live(view_model) => context.peek(view_model.grand_child_count),
            GrandChildSource::Local(count) => *count,
        };
        FragmentInner::text(format!("Grand Child {}", count)).debug_mode()
    }

    fn same(&self, previous: &Self) -> bool {
        match (&self.source, &previous.source) {
            (GrandChildSource::Live(a), GrandChildSource::Live(b)) => Arc::ptr_eq(a, b),
            (GrandChildSource::Local(a), GrandChildSource::Local(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redraw_core::Evaluator;

    fn mounted(equality_override: bool) -> (Evaluator, Store) {
        let mut evaluator = Evaluator::new();
        let store = Store::new(&evaluator.thread_context());
        evaluator.mount(ObservationDemo { store, equality_override });
        (evaluator, store)
    }

    #[test]
    fn first_render_shows_zeroes() {
        let (evaluator, _) = mounted(true);
        assert_eq!(evaluator.text("child1").as_deref(), Some("Child 1 - Count: 0"));
        assert_eq!(evaluator.text("child2").as_deref(), Some("Child 2 - Count: 0"));
        assert_eq!(evaluator.text("child3").as_deref(), Some("Child 3 - Count: 0"));
        assert_eq!(evaluator.text("child4.text").as_deref(), Some("Child 4 - Count: 0"));
        assert_eq!(evaluator.text("grand_child<0>").as_deref(), Some("Grand Child 0"));
        assert_eq!(evaluator.text("grand_child<1>").as_deref(), Some("Grand Child 0"));
        assert_eq!(evaluator.text("controls.text").as_deref(), Some("Controls"));
        for label in ["Increment Child 1 Count", "Increment Child 2 Count", "Increment Child 3 Count"]
        {
            assert!(evaluator.texts().iter().any(|(_, text)| text == label));
        }
    }

    #[test]
    fn child2_props_never_compare_equal() {
        let a = Child2::new(1);
        let b = Child2::new(1);
        assert!(!b.same(&a));
        assert!(!Child3 { count: 1 }.same(&Child3 { count: 1 }));
    }

    #[test]
    fn live_grand_children_compare_by_identity() {
        let context = ThreadContext::default();
        let view_model = ViewModelCounter::new(&context);
        let other = ViewModelCounter::new(&context);
        let live = |view_model: &Arc<ViewModelCounter>| GrandChild {
            source: GrandChildSource::Live(view_model.clone()),
        };

        assert!(live(&view_model).same(&live(&view_model)));
        assert!(!live(&view_model).same(&live(&other)));
        assert!(!live(&view_model).same(&GrandChild { source: GrandChildSource::Local(0) }));
    }

    #[test]
    fn controls_write_one_field_each() {
        let (mut evaluator, store) = mounted(false);
        let context = evaluator.thread_context();

        evaluator.click("Increment Child 2 Count").unwrap();
        assert_eq!(context.spy(store.child2), 1);
        assert_eq!(context.spy(store.child3), 0);
        assert_eq!(context.spy(context.spy(store.child1).count), 0);
        evaluator.update();
        assert_eq!(evaluator.text("child2").as_deref(), Some("Child 2 - Count: 1"));
    }
}
