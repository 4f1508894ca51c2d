#![cfg(feature = "debug_bounds")]

use redraw::{App, Config};

fn app(equality_override: bool) -> App {
    let _ = env_logger::builder().is_test(true).try_init();
    App::new(Config { equality_override, ..Config::default() })
}

#[test]
fn rerendered_fragments_get_fresh_borders() {
    // six random channels per border, two renders practically never match
    let mut app = app(false);
    let child1 = app.evaluator().border("child1").expect("child1 has a border");
    let child2 = app.evaluator().border("child2").expect("child2 has a border");

    app.click("Increment Child 1 Count").unwrap();
    assert_ne!(app.evaluator().border("child1"), Some(child1));
    assert_eq!(app.evaluator().border("child2"), Some(child2));

    app.click("Increment Child 2 Count").unwrap();
    assert_ne!(app.evaluator().border("child2"), Some(child2));
}

#[test]
fn skipped_demo_keeps_its_border() {
    for equality_override in [false, true] {
        let mut app = app(equality_override);
        let demo = app.evaluator().border("observation_demo").expect("demo has a border");

        app.click("Observationdemo").unwrap();
        let after = app.evaluator().border("observation_demo");
        if equality_override {
            assert_eq!(after, Some(demo));
        } else {
            assert_ne!(after, Some(demo));
        }
    }
}
