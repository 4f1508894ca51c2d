use std::collections::BTreeMap;

/// `path` names the fragment `suffix` refers to: either the full dotted path or
/// a tail of it starting at a part boundary.
pub(crate) fn path_matches(path: &str, suffix: &str) -> bool {
    path == suffix
        || (path.len() > suffix.len()
            && path.ends_with(suffix)
            && path.as_bytes()[path.len() - suffix.len() - 1] == b'.')
}

/// Per fragment render counters, keyed by the dotted key path of the fragment
/// (e.g. `content_view.observation_demo.child2`).
#[derive(Debug, Default, Clone)]
pub struct RenderStats {
    renders: BTreeMap<String, usize>,
    skips: BTreeMap<String, usize>,
}

impl RenderStats {
    pub(crate) fn record_render(&mut self, path: &str) {
        *self.renders.entry(path.to_owned()).or_default() += 1;
    }

    pub(crate) fn record_skip(&mut self, path: &str) {
        *self.skips.entry(path.to_owned()).or_default() += 1;
    }

    fn count(map: &BTreeMap<String, usize>, suffix: &str) -> usize {
        map.iter().filter(|(path, _)| path_matches(path, suffix)).map(|(_, count)| count).sum()
    }

    /// renders of every fragment matching `suffix`
    pub fn renders(&self, suffix: &str) -> usize { Self::count(&self.renders, suffix) }

    /// renders avoided through an equality override
    pub fn skips(&self, suffix: &str) -> usize { Self::count(&self.skips, suffix) }

    pub fn total(&self) -> usize { self.renders.values().sum() }

    pub fn profile(&self) -> BTreeMap<String, usize> { self.renders.clone() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffixes_match_whole_parts_only() {
        assert!(path_matches("a.b.child2", "child2"));
        assert!(path_matches("a.b.child2", "b.child2"));
        assert!(path_matches("child2", "child2"));
        assert!(!path_matches("a.b.grand_child2", "child2"));
        assert!(!path_matches("a.b", "a.b.c"));
    }

    #[test]
    fn counts_add_up_per_path() {
        let mut stats = RenderStats::default();
        stats.record_render("root.child1");
        stats.record_render("root.child1");
        stats.record_render("root.panel.child1");
        stats.record_skip("root");

        assert_eq!(stats.renders("root.child1"), 2);
        assert_eq!(stats.renders("child1"), 3);
        assert_eq!(stats.renders("root"), 0);
        assert_eq!(stats.skips("root"), 1);
        assert_eq!(stats.total(), 3);
        assert_eq!(stats.profile().len(), 2);
    }
}
