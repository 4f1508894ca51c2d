pub(crate) mod context;
pub(crate) mod key;
pub(crate) mod patched_tree;

pub use context::{CallbackContext, ThreadContext, WidgetContext};
pub use key::{Key, KeyPart};
pub use patched_tree::{Field, HookKey, ObservationTree};
