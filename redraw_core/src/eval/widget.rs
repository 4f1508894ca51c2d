use crate::{FragmentInner, ThreadContext, WidgetContext};
use std::{
    any::Any,
    fmt::{Debug, Formatter},
};

/// A widget is the props of one node of the render tree plus the function
/// turning them into a fragment.
pub trait Widget: 'static {
    const NAME: &'static str;

    fn render(&self, context: &mut WidgetContext) -> FragmentInner;

    /// Called on the new props when the parent re-renders. Returning `true`
    /// keeps the already rendered fragment. Without an implementation props are
    /// always considered changed.
    fn same(&self, _previous: &Self) -> bool { false }

    /// Optional override deciding whether a re-render requested by the parent
    /// (props that are not [`Widget::same`]) can be skipped. Writes to fields
    /// the widget read always re-render it. Only affects the widget it is
    /// declared on.
    fn equality(&self) -> Option<Equality> { None }
}

pub(crate) trait AnyWidget {
    fn name(&self) -> &'static str;
    fn render(&self, context: &mut WidgetContext) -> FragmentInner;
    fn same_as(&self, new: &dyn Any) -> bool;
    fn equality(&self) -> Option<Equality>;
}

impl<W: Widget> AnyWidget for W {
    fn name(&self) -> &'static str { W::NAME }

    fn render(&self, context: &mut WidgetContext) -> FragmentInner { Widget::render(self, context) }

    fn same_as(&self, new: &dyn Any) -> bool {
        new.downcast_ref::<W>().map_or(false, |new| new.same(self))
    }

    fn equality(&self) -> Option<Equality> { Widget::equality(self) }
}

/// Object safe equality, used to keep equality snapshots of any type.
pub trait DynEq: Any {
    fn dyn_eq(&self, other: &dyn DynEq) -> bool;
    fn as_any(&self) -> &dyn Any;
}

impl<T: PartialEq + 'static> DynEq for T {
    fn dyn_eq(&self, other: &dyn DynEq) -> bool {
        other.as_any().downcast_ref::<T>().map_or(false, |other| self == other)
    }

    fn as_any(&self) -> &dyn Any { self }
}

/// Equality override of a widget: a snapshot of observed state taken after
/// every render. A re-render requested by the parent is skipped while the
/// current snapshot equals the one of the last render.
pub struct Equality {
    snapshot: Box<dyn Fn(&ThreadContext) -> Box<dyn DynEq>>,
}

impl Equality {
    pub fn on<T: PartialEq + 'static>(snapshot: impl Fn(&ThreadContext) -> T + 'static) -> Self {
        Self { snapshot: Box::new(move |context| Box::new(snapshot(context))) }
    }

    pub(crate) fn snapshot(&self, context: &ThreadContext) -> Box<dyn DynEq> {
        (self.snapshot)(context)
    }

    pub(crate) fn unchanged(&self, context: &ThreadContext, last: &dyn DynEq) -> bool {
        let current = self.snapshot(context);
        current.as_ref().dyn_eq(last)
    }
}

impl Debug for Equality {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { write!(f, "Equality {{ .. }}") }
}
