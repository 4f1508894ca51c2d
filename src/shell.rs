//! Tab navigation around the demos.

use crate::demo::{ObservationDemo, Store};
use redraw_core::{
    widgets::{column, Button},
    CallbackContext,
    ContextListenable,
    ContextShout,
    FragmentInner,
    Widget,
    WidgetContext,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    ObservationDemo,
}

impl Tab {
    pub const ALL: [Tab; 1] = [Tab::ObservationDemo];

    pub fn name(&self) -> &'static str {
        match self {
            Tab::ObservationDemo => "observationDemo",
        }
    }

    /// name with the first letter upper cased and the rest lower cased
    pub fn title(&self) -> String {
        let mut chars = self.name().chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
            None => String::new(),
        }
    }
}

/// Top level widget: one button per tab followed by the selected tab.
pub struct ContentView {
    pub store: Store,
    pub equality_override: bool,
}

impl Widget for ContentView {
    const NAME: &'static str = "content_view";

    fn render(&self, context: &mut WidgetContext) -> FragmentInner {
        let selected = context.listenable(Tab::ObservationDemo);
        let current = context.listen(selected);

        let mut children = Vec::with_capacity(Tab::ALL.len() + 1);
        for tab in Tab::ALL {
            children.push(context.child(Button::new(
                tab.title(),
                move |context: &CallbackContext| context.shout(selected, tab),
            )));
        }
        children.push(match current {
            Tab::ObservationDemo => context.child(ObservationDemo {
                store: self.store,
                equality_override: self.equality_override,
            }),
        });

        column(children)
    }

    fn same(&self, previous: &Self) -> bool {
        self.store == previous.store && self.equality_override == previous.equality_override
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redraw_core::Evaluator;

    #[test]
    fn titles_are_capitalized() {
        assert_eq!(Tab::ObservationDemo.title(), "Observationdemo");
    }

    #[test]
    fn reselecting_the_tab_rerenders_the_demo_unless_overridden() {
        for equality_override in [false, true] {
            let mut evaluator = Evaluator::new();
            let store = Store::new(&evaluator.thread_context());
            evaluator.mount(ContentView { store, equality_override });
            assert!(evaluator.mounted("content_view.observation_demo"));

            evaluator.click("Observationdemo").unwrap();
            evaluator.update();
            assert_eq!(evaluator.stats().renders("content_view"), 2);
            let demo = "content_view.observation_demo";
            if equality_override {
                // child2 is unchanged, the demo is left alone
                assert_eq!(evaluator.stats().renders(demo), 1);
                assert_eq!(evaluator.stats().skips(demo), 1);
            } else {
                assert_eq!(evaluator.stats().renders(demo), 2);
                assert_eq!(evaluator.stats().skips(demo), 0);
            }
            assert!(evaluator.mounted("content_view.observation_demo.child4"));
        }
    }
}
