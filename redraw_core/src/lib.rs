mod context;
pub(crate) mod eval;
pub mod hooks;
mod util;
pub mod widgets;

pub use context::{
    CallbackContext,
    Field,
    HookKey,
    Key,
    KeyPart,
    ObservationTree,
    ThreadContext,
    WidgetContext,
};
pub use eval::{
    delta_eval::Evaluator,
    fragment::*,
    input::InputError,
    stats::RenderStats,
    timer::{TimerHandle, TimerId, TimerQueue},
    widget::{DynEq, Equality, Widget},
};
pub use hooks::*;
pub use util::{
    all_eq::{all_eq, AllEqDispatcher, AllEqViaPartialEq, AllEqViaPtrEquality},
    debug_border::{Color, DebugBorder},
};
