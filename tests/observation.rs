use redraw::{App, Config};

const CHILD1: &str = "Increment Child 1 Count";
const CHILD2: &str = "Increment Child 2 Count";
const CHILD3: &str = "Increment Child 3 Count";

const DISPLAYS: [&str; 6] = [
    "observation_demo",
    "controls",
    "child1",
    "child2",
    "child3",
    "child4",
];

fn app(equality_override: bool) -> App {
    let _ = env_logger::builder().is_test(true).try_init();
    App::new(Config { equality_override, ..Config::default() })
}

fn renders(app: &App) -> Vec<usize> { DISPLAYS.iter().map(|name| app.renders(name)).collect() }

#[test]
fn first_render_renders_everything_once() {
    for equality_override in [false, true] {
        let app = app(equality_override);
        assert_eq!(renders(&app), vec![1; DISPLAYS.len()]);
    }
}

#[test]
fn nested_counter_writes_only_rerender_child1() {
    for equality_override in [false, true] {
        let mut app = app(equality_override);
        for _ in 0..3 {
            app.click(CHILD1).unwrap();
        }

        assert_eq!(app.renders("child1"), 4);
        for name in ["observation_demo", "controls", "child2", "child3", "child4"] {
            assert_eq!(app.renders(name), 1, "{} re-rendered", name);
        }
        assert_eq!(app.text("child1").as_deref(), Some("Child 1 - Count: 3"));
    }
}

#[test]
fn child2_writes_rerender_display_a() {
    for equality_override in [false, true] {
        let mut app = app(equality_override);
        app.click(CHILD2).unwrap();
        app.click(CHILD2).unwrap();

        // field writes reach their readers whatever the override says
        assert_eq!(app.renders("observation_demo"), 3);
        assert_eq!(app.renders("child2"), 3);
        assert_eq!(app.renders("child3"), 3);
        assert_eq!(app.renders("child1"), 1);
        assert_eq!(app.renders("controls"), 1);
        assert_eq!(app.text("child2").as_deref(), Some("Child 2 - Count: 2"));
    }
}

#[test]
fn child3_writes_rerender_both_displays() {
    for equality_override in [false, true] {
        let mut app = app(equality_override);
        app.click(CHILD3).unwrap();
        app.click(CHILD3).unwrap();

        assert_eq!(app.renders("observation_demo"), 3);
        assert_eq!(app.evaluator().stats().skips("observation_demo"), 0);
        assert_eq!(app.renders("child2"), 3);
        assert_eq!(app.renders("child3"), 3);
        assert_eq!(app.text("child2").as_deref(), Some("Child 2 - Count: 0"));
        assert_eq!(app.text("child3").as_deref(), Some("Child 3 - Count: 2"));
    }
}

#[test]
fn tab_rerender_skips_the_demo_only_with_override() {
    for equality_override in [false, true] {
        let mut app = app(equality_override);
        app.click(CHILD3).unwrap();
        app.click("Observationdemo").unwrap();
        assert_eq!(app.renders("content_view"), 2);

        let skips = app.evaluator().stats().skips("observation_demo");
        if equality_override {
            assert_eq!(app.renders("observation_demo"), 2);
            assert_eq!(skips, 1);
            assert_eq!(app.renders("child3"), 2);
        } else {
            assert_eq!(app.renders("observation_demo"), 3);
            assert_eq!(skips, 0);
            assert_eq!(app.renders("child3"), 3);
        }
        assert_eq!(app.text("child3").as_deref(), Some("Child 3 - Count: 1"));

        // the child2 write re-rendered the demo, so its snapshot is current again
        app.click(CHILD2).unwrap();
        let before = app.renders("observation_demo");
        app.click("Observationdemo").unwrap();
        let expected = if equality_override { before } else { before + 1 };
        assert_eq!(app.renders("observation_demo"), expected);
    }
}

#[test]
fn display_b_follows_display_a() {
    for equality_override in [false, true] {
        let mut app = app(equality_override);
        for label in [CHILD3, CHILD2, CHILD1, CHILD3, CHILD3, CHILD2] {
            app.click(label).unwrap();
            assert_eq!(app.renders("child2"), app.renders("child3"), "after {}", label);
        }
    }
}
