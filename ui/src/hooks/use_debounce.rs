use gloo_timers::callback::Timeout;
use yew::prelude::*;

/// Returns `value` once it has stopped changing for `delay_ms`.
///
/// Every change (of the value or the delay) drops the pending timeout, so
/// only the last value in a burst comes through.
#[hook]
pub fn use_debounce<T>(value: T, delay_ms: u32) -> T
where
    T: Clone + PartialEq + 'static,
{
    let debounced = use_state(|| value.clone());

    {
        let debounced = debounced.clone();
        use_effect_with((value, delay_ms), move |(value, delay_ms)| {
            let value = value.clone();
            let timeout = Timeout::new(*delay_ms, move || {
                debounced.set(value);
            });

            // Dropping the timeout cancels it
            move || drop(timeout)
        });
    }

    (*debounced).clone()
}
