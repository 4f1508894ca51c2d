//! Leaf widgets every app needs.

use crate::{all_eq, CallbackContext, Fragment, FragmentInner, RenderObject, Widget, WidgetContext};
use derivative::Derivative;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub text: String,
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self { Self { text: text.into() } }
}

impl Widget for Text {
    const NAME: &'static str = "text";

    fn render(&self, _context: &mut WidgetContext) -> FragmentInner {
        FragmentInner::text(self.text.clone()).debug_mode()
    }

    fn same(&self, previous: &Self) -> bool { all_eq!(&self.text, &previous.text) }
}

/// A button is only ever considered changed: its click handler is a fresh
/// closure on every render of the parent.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct Button {
    pub label: String,
    #[derivative(Debug = "ignore")]
    pub on_click: Rc<dyn Fn(&CallbackContext)>,
}

impl Button {
    pub fn new(label: impl Into<String>, on_click: impl Fn(&CallbackContext) + 'static) -> Self {
        Self { label: label.into(), on_click: Rc::new(on_click) }
    }
}

impl Widget for Button {
    const NAME: &'static str = "button";

    fn render(&self, _context: &mut WidgetContext) -> FragmentInner {
        FragmentInner::leaf(RenderObject::Button {
            label: self.label.clone(),
            on_click: self.on_click.clone(),
        })
        .debug_mode()
    }
}

/// vertical stack of already mounted children
pub fn column(children: impl IntoIterator<Item = Fragment>) -> FragmentInner {
    FragmentInner::node(children).debug_mode()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ContextShout, Evaluator, Field};

    struct Screen {
        title: Field<String>,
        clicks: Field<u32>,
    }
    impl Widget for Screen {
        const NAME: &'static str = "screen";
        fn render(&self, context: &mut WidgetContext) -> FragmentInner {
            use crate::ContextListenable;
            let title = context.listen(self.title);
            let clicks = self.clicks;
            let heading = context.child(Text::new(title));
            let button = context.child(Button::new("press", move |context: &CallbackContext| {
                context.shout_with(clicks, |n| n + 1)
            }));
            column([heading, button])
        }
    }

    #[test]
    fn text_keeps_its_fragment_while_unchanged() {
        let mut evaluator = Evaluator::new();
        let tree = evaluator.thread_context().tree().clone();
        let title = tree.field(String::from("hello"));
        let clicks = tree.field(0u32);
        evaluator.mount(Screen { title, clicks });

        evaluator.thread_context().shout(title, String::from("hello"));
        evaluator.update();
        assert_eq!(evaluator.stats().renders("screen"), 2);
        assert_eq!(evaluator.stats().renders("screen.text"), 1);
        assert_eq!(evaluator.stats().renders("screen.button"), 2);

        evaluator.thread_context().shout(title, String::from("world"));
        evaluator.update();
        assert_eq!(evaluator.text("screen.text").as_deref(), Some("world"));
        assert_eq!(evaluator.stats().renders("screen.text"), 2);
    }

    #[test]
    fn buttons_dispatch_clicks() {
        let mut evaluator = Evaluator::new();
        let tree = evaluator.thread_context().tree().clone();
        let title = tree.field(String::from("hello"));
        let clicks = tree.field(0u32);
        evaluator.mount(Screen { title, clicks });

        evaluator.click("press").unwrap();
        evaluator.click("press").unwrap();
        evaluator.update();
        assert_eq!(tree.get(clicks), 2);
        // nothing reads the counter
        assert_eq!(evaluator.stats().renders("screen"), 1);
    }
}
