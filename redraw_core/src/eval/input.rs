use crate::{context::context::FragmentStore, CallbackContext, RenderObject};
use std::{
    fmt::{Display, Formatter},
    rc::Rc,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    NoSuchButton(String),
}

impl Display for InputError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InputError::NoSuchButton(label) => write!(f, "no mounted button labeled {:?}", label),
        }
    }
}

impl std::error::Error for InputError {}

/// looks up the click handler of the mounted button labeled `label`
pub(crate) fn find_button(
    fragment_store: &FragmentStore,
    label: &str,
) -> Result<Rc<dyn Fn(&CallbackContext)>, InputError> {
    fragment_store
        .iter()
        .find_map(|(_, info)| match info.evaluated.as_ref()?.render_object.as_ref()? {
            RenderObject::Button { label: button_label, on_click } if button_label == label => {
                Some(on_click.clone())
            }
            _ => None,
        })
        .ok_or_else(|| InputError::NoSuchButton(label.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_names_the_label() {
        let err = InputError::NoSuchButton("Increment".to_owned());
        assert_eq!(err.to_string(), "no mounted button labeled \"Increment\"");
    }
}
