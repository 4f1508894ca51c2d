use super::{input::find_button, stats::path_matches};
use crate::{
    context::{context::FragmentStore, key::KeyMap},
    CallbackContext,
    DebugBorder,
    EvaluatedFragment,
    Fragment,
    InputError,
    Key,
    KeyPart,
    RenderStats,
    ThreadContext,
    TimerQueue,
    Widget,
    WidgetContext,
};
use hashbrown::HashSet;
use std::{collections::BTreeSet, time::Duration};

// parents sort before their children
type RenderQueue = BTreeSet<(u16, Fragment)>;
type Notified = HashSet<Fragment, ahash::RandomState>;

/// Keeps the mounted fragment tree up to date with the observation tree. The
/// evaluator produces no output of its own, the evaluated fragments are read
/// back through [`Evaluator::text`] and [`Evaluator::texts`].
pub struct Evaluator {
    pub(crate) key_map: KeyMap,
    fragment_store: FragmentStore,
    context: ThreadContext,
    stats: RenderStats,
    root: Option<Fragment>,
}

impl Default for Evaluator {
    fn default() -> Self { Self::new() }
}

impl Evaluator {
    pub fn new() -> Self { Self::with_context(ThreadContext::default()) }

    /// Evaluator sharing the observation tree and timers of `context`, so
    /// entities can be created before anything is mounted.
    pub fn with_context(context: ThreadContext) -> Self {
        Self {
            key_map: Default::default(),
            fragment_store: Default::default(),
            context,
            stats: Default::default(),
            root: None,
        }
    }

    pub fn thread_context(&self) -> ThreadContext { self.context.clone() }

    pub fn callback_context(&self) -> CallbackContext {
        CallbackContext { thread: self.context.clone() }
    }

    pub fn timers(&self) -> &TimerQueue { &self.context.timers }

    pub fn stats(&self) -> &RenderStats { &self.stats }

    /// Mounts `widget` as the new root, tearing down the previous one, and
    /// renders the whole tree.
    pub fn mount<W: Widget>(&mut self, widget: W) -> Fragment {
        if let Some(old) = self.root.take() {
            self.remove_tree(old);
        }
        let key = self.key_map.key_with(Key::ROOT, KeyPart::widget::<W>(0));
        let root = self.fragment_store.add_root(key, Box::new(widget));
        log::debug!("mounted {} as root", W::NAME);
        self.root = Some(root);
        self.update();
        root
    }

    /// Tears down the whole tree, dropping all widget local state.
    pub fn unmount(&mut self) {
        if let Some(root) = self.root.take() {
            self.remove_tree(root);
        }
    }

    /// Applies all pending writes and re-renders what depends on them. Returns
    /// whether anything was rendered.
    pub fn update(&mut self) -> bool {
        let mut rendered_any = false;
        loop {
            let mut queue = RenderQueue::new();
            let mut notified = Notified::default();
            let touched = self.context.tree.update_tree();
            for idx in touched {
                for frag in self.context.tree.dependents(idx) {
                    self.schedule(&mut queue, frag);
                    notified.insert(frag);
                }
            }
            let dirty: Vec<_> = self.fragment_store.dirty().collect();
            for frag in dirty {
                self.schedule(&mut queue, frag);
            }

            if queue.is_empty() {
                return rendered_any;
            }
            rendered_any |= self.run(queue, &notified);
        }
    }

    fn schedule(&self, queue: &mut RenderQueue, frag: Fragment) {
        if self.fragment_store.contains(frag) {
            queue.insert((self.fragment_store.get(frag).depth, frag));
        }
    }

    /// Renders `queue` parents first. Fragments in `notified` read a field that
    /// changed and always render; the others only render because their parent
    /// handed them new props, which their [`crate::Equality`] may veto.
    fn run(&mut self, mut queue: RenderQueue, notified: &Notified) -> bool {
        let mut rendered: HashSet<Fragment, ahash::RandomState> = HashSet::default();
        while let Some((_, frag)) = queue.pop_first() {
            if !self.fragment_store.contains(frag) {
                log::trace!("tried to render already removed fragment {:?}, skipping it", frag);
                continue;
            }
            let needs_render = self.fragment_store.get(frag).needs_render;
            if rendered.contains(&frag) && !needs_render {
                continue;
            }
            if needs_render && !notified.contains(&frag) && self.equality_unchanged(frag) {
                let info = self.fragment_store.get_mut(frag);
                info.needs_render = false;
                let path = self.key_map.key_debug(info.key).to_string();
                log::debug!("skipping {}, equality snapshot unchanged", path);
                self.stats.record_skip(&path);
                continue;
            }

            self.render_fragment(frag);
            rendered.insert(frag);

            let dirty: Vec<_> = self.fragment_store.dirty().collect();
            for child in dirty {
                self.schedule(&mut queue, child);
            }
        }
        !rendered.is_empty()
    }

    fn equality_unchanged(&self, frag: Fragment) -> bool {
        let info = self.fragment_store.get(frag);
        let equality = info.widget.as_ref().and_then(|widget| widget.equality());
        match (equality, info.equality_snapshot.as_ref()) {
            (Some(equality), Some(last)) => equality.unchanged(&self.context, last.as_ref()),
            _ => false,
        }
    }

    fn render_fragment(&mut self, frag: Fragment) {
        let (key, depth, widget, old_reads) = {
            let info = self.fragment_store.get_mut(frag);
            let widget = info
                .widget
                .take()
                .expect("fragment has no widget; this is likely an internal redraw bug :(");
            (info.key, info.depth, widget, std::mem::take(&mut info.reads))
        };
        for idx in old_reads {
            self.context.tree.remove_dependent(idx, frag);
        }

        let path = self.key_map.key_debug(key).to_string();
        log::debug!("rendering {} ({})", path, widget.name());
        let (inner, reads) = {
            let mut context = WidgetContext::for_fragment(
                self.context.clone(),
                &mut self.fragment_store,
                &mut self.key_map,
                key,
                frag,
                depth,
            );
            let inner = widget.render(&mut context);
            (inner, context.widget_local.reads)
        };
        self.stats.record_render(&path);

        let snapshot = widget.equality().map(|equality| equality.snapshot(&self.context));
        let (render_object, children, border) = inner.unpack();
        let old_children = {
            let info = self.fragment_store.get_mut(frag);
            info.widget = Some(widget);
            info.reads = reads;
            info.needs_render = false;
            info.equality_snapshot = snapshot;
            let old = info.evaluated.take().map(|evaluated| evaluated.children).unwrap_or_default();
            info.evaluated =
                Some(EvaluatedFragment { render_object, children: children.clone(), border });
            old
        };

        for old in old_children {
            if !children.contains(&old) {
                self.remove_tree(old);
            }
        }
    }

    fn remove_tree(&mut self, frag: Fragment) {
        let info = match self.fragment_store.remove(frag) {
            Some(info) => info,
            None => return,
        };
        for idx in &info.reads {
            self.context.tree.remove_dependent(*idx, frag);
        }
        if let Some(evaluated) = &info.evaluated {
            for child in evaluated.children.iter() {
                self.remove_tree(*child);
            }
        }

        log::trace!("removing fragment {}", self.key_map.key_debug(info.key));
        self.context.tree.remove_widget(&info.key);
        self.key_map.remove(&info.key);
    }

    /// Moves time forward by `dt`, firing every timer due on the way. Writes of
    /// all timers firing at the same instant are applied together, followed by
    /// one update. Returns the number of timer callbacks run.
    pub fn advance(&mut self, dt: Duration) -> usize {
        let timers = self.context.timers.clone();
        let until = timers.now() + dt;
        let callback_context = self.callback_context();
        let mut fired = 0;
        while let Some(at) = timers.next_due(until) {
            for (id, mut callback) in timers.take_due(at) {
                log::trace!("firing timer {:?} at {:?}", id, at);
                callback(&callback_context);
                timers.restore(id, callback);
                fired += 1;
            }
            self.update();
        }
        timers.set_now(until);
        fired
    }

    /// Runs the click handler of the button labeled `label`. The writes it
    /// makes are applied by the next [`Evaluator::update`].
    pub fn click(&mut self, label: &str) -> Result<(), InputError> {
        let on_click = find_button(&self.fragment_store, label)?;
        log::debug!("clicked {:?}", label);
        on_click(&self.callback_context());
        Ok(())
    }

    fn find(&self, suffix: &str) -> Option<&crate::context::context::FragmentInfo> {
        self.fragment_store
            .iter()
            .map(|(_, info)| info)
            .find(|info| path_matches(&self.key_map.key_debug(info.key).to_string(), suffix))
    }

    pub fn mounted(&self, suffix: &str) -> bool { self.find(suffix).is_some() }

    /// text currently shown by the fragment at `suffix`
    pub fn text(&self, suffix: &str) -> Option<String> {
        self.find(suffix)?.evaluated.as_ref()?.text().map(str::to_owned)
    }

    /// debug border drawn around the fragment at `suffix` by its last render
    pub fn border(&self, suffix: &str) -> Option<DebugBorder> {
        self.find(suffix)?.evaluated.as_ref()?.border
    }

    /// (path, text) of every visible text in tree order
    pub fn texts(&self) -> Vec<(String, String)> {
        let mut texts = Vec::new();
        if let Some(root) = self.root {
            self.collect_texts(root, &mut texts);
        }
        texts
    }

    fn collect_texts(&self, frag: Fragment, texts: &mut Vec<(String, String)>) {
        let info = self.fragment_store.get(frag);
        if let Some(evaluated) = &info.evaluated {
            if let Some(text) = evaluated.text() {
                texts.push((self.key_map.key_debug(info.key).to_string(), text.to_owned()));
            }
            for child in evaluated.children.iter() {
                self.collect_texts(*child, texts);
            }
        }
    }
}
