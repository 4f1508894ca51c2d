use crate::{CallbackContext, DebugBorder};
use derivative::Derivative;
use freelist::Idx;
use smallvec::{smallvec, SmallVec};
use std::rc::Rc;

/*
The general flow of a frame in redraw:
Patch -> Notify -> Evaluation

1. Patch
writes made by callbacks and timers since the last frame are applied to the
observation tree, the result is the set of touched fields

2. Notify
the fragments that read a touched field during their last render are scheduled

3. Evaluation
scheduled fragments are re-rendered parents first; a re-rendered parent compares
the props of its children and schedules the ones that changed, unless their
equality override reports nothing relevant changed since their last render

 */

/// Fragment is merely a reference into the fragment store
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Fragment(pub(crate) Idx);

impl From<Fragment> for FragmentChildren {
    fn from(fragment: Fragment) -> Self { smallvec![fragment] }
}

pub type FragmentChildren = SmallVec<[Fragment; 8]>;

/// RenderObject is the data structure that really defines _what_ is shown
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub enum RenderObject {
    Text {
        text: String,
    },
    Button {
        label: String,
        // this is nothing that gets shown but instead it gets interpreted by the input handling
        // logic
        #[derivative(Debug = "ignore")]
        on_click: Rc<dyn Fn(&CallbackContext)>,
    },
}

#[derive(Debug)]
pub enum FragmentInner {
    Leaf { render_object: RenderObject, border: Option<DebugBorder> },
    Node { children: FragmentChildren, border: Option<DebugBorder> },
}

impl FragmentInner {
    pub fn leaf(render_object: RenderObject) -> Self {
        FragmentInner::Leaf { render_object, border: None }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::leaf(RenderObject::Text { text: text.into() })
    }

    pub fn node(children: impl IntoIterator<Item = Fragment>) -> Self {
        FragmentInner::Node { children: children.into_iter().collect(), border: None }
    }

    pub fn empty() -> Self { FragmentInner::Node { children: SmallVec::new(), border: None } }

    /// Paints the bounds of this fragment with fresh random colors. As every
    /// render produces new colors, flickering shows which fragments re-render.
    pub fn debug_mode(self) -> Self {
        #[cfg(feature = "debug_bounds")]
        {
            let border = Some(DebugBorder::random());
            match self {
                FragmentInner::Leaf { render_object, .. } => {
                    FragmentInner::Leaf { render_object, border }
                }
                FragmentInner::Node { children, .. } => FragmentInner::Node { children, border },
            }
        }
        #[cfg(not(feature = "debug_bounds"))]
        {
            self
        }
    }

    pub fn unpack(self) -> (Option<RenderObject>, FragmentChildren, Option<DebugBorder>) {
        match self {
            Self::Leaf { render_object, border } => (Some(render_object), SmallVec::new(), border),
            Self::Node { children, border } => (None, children, border),
        }
    }
}

/// What the last render of a fragment produced.
#[derive(Debug, Clone)]
pub struct EvaluatedFragment {
    pub render_object: Option<RenderObject>,
    pub children: FragmentChildren,
    pub border: Option<DebugBorder>,
}

impl EvaluatedFragment {
    pub fn text(&self) -> Option<&str> {
        match &self.render_object {
            Some(RenderObject::Text { text }) => Some(text),
            Some(RenderObject::Button { label, .. }) => Some(label),
            None => None,
        }
    }
}
