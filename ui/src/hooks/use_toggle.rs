use std::rc::Rc;

use yew::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Toggle(pub bool);

pub enum ToggleAction {
    Flip,
    Set(bool),
}

impl Reducible for Toggle {
    type Action = ToggleAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let next = match action {
            ToggleAction::Flip => !self.0,
            ToggleAction::Set(value) => value,
        };
        if next == self.0 {
            self
        } else {
            Rc::new(Toggle(next))
        }
    }
}

/// Returns `(value, toggle)`. Each emit of `toggle` flips the current value,
/// even when several are queued before the next render.
#[hook]
pub fn use_toggle(initial: bool) -> (bool, Callback<()>) {
    let state = use_reducer(|| Toggle(initial));

    let toggle = {
        let state = state.clone();
        use_callback((), move |_, _| state.dispatch(ToggleAction::Flip))
    };

    (state.0, toggle)
}
