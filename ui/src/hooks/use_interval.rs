use gloo_timers::callback::Interval;
use yew::prelude::*;

/// Call `callback` every `delay_ms` milliseconds. `None` pauses the interval.
///
/// The most recent callback is always the one called; only a change of
/// `delay_ms` restarts the timer.
#[hook]
pub fn use_interval(callback: Callback<()>, delay_ms: Option<u32>) {
    let latest = use_mut_ref(|| callback.clone());
    *latest.borrow_mut() = callback;

    use_effect_with(delay_ms, move |delay_ms| {
        let interval = delay_ms.map(|delay_ms| {
            Interval::new(delay_ms, move || {
                // clone out so a re-render triggered by the callback can
                // replace it
                let callback = latest.borrow().clone();
                callback.emit(());
            })
        });

        move || drop(interval)
    });
}
