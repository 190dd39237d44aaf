use yew::prelude::*;

/// The `value` of the previous render, or `None` on the first render.
#[hook]
pub fn use_previous<T>(value: T) -> Option<T>
where
    T: Clone + PartialEq + 'static,
{
    let previous = use_mut_ref(|| None::<T>);
    let result = previous.borrow().clone();

    {
        let previous = previous.clone();
        use_effect_with(value, move |value| {
            *previous.borrow_mut() = Some(value.clone());
        });
    }

    result
}
