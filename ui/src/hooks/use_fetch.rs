use std::rc::Rc;

use fetcher::{
    CancellableFetcher, FetchError, FetchOptions, FetchSnapshot, FetcherConfig,
    HttpTransport,
};
use serde::de::DeserializeOwned;
use yew::prelude::*;

use crate::YewExecutor;

/// Fetch hook return type
pub struct FetchHookReturn<T> {
    pub data: Option<T>,
    pub is_loading: bool,
    pub error: Option<FetchError>,
    pub refetch: Callback<()>,
}

impl<T> FetchHookReturn<T> {
    /// Returns true if this is the initial load (data not yet fetched,
    /// currently loading, and no error).
    pub fn is_initial_loading(&self) -> bool {
        self.is_loading && self.data.is_none() && self.error.is_none()
    }
}

/// Fetch JSON from `url` with a plain GET, cancelling the previous request
/// whenever `url` changes and when the component unmounts.
///
/// # Example
///
/// ```rust,ignore
/// #[function_component]
/// fn Todo(props: &TodoProps) -> Html {
///     let todo = use_fetch_with_abort::<Todo>(&props.url);
///     match (&todo.data, &todo.error) {
///         (Some(todo), _) => html! { <p>{ &todo.title }</p> },
///         (None, Some(error)) => html! { <p>{ error.to_string() }</p> },
///         (None, None) => html! { <p>{ "Loading..." }</p> },
///     }
/// }
/// ```
#[hook]
pub fn use_fetch_with_abort<T>(url: &str) -> FetchHookReturn<T>
where
    T: DeserializeOwned + Clone + 'static,
{
    use_fetch(url, FetchOptions::default())
}

/// Like [`use_fetch_with_abort`] with an explicit method, headers, and JSON
/// body. Changing `options` replaces the underlying fetcher.
#[hook]
pub fn use_fetch<T>(url: &str, options: FetchOptions) -> FetchHookReturn<T>
where
    T: DeserializeOwned + Clone + 'static,
{
    use_fetch_with_config(url, options, FetcherConfig::default())
}

/// The general form: request options plus fetcher config (timeout, empty
/// key policy).
#[hook]
pub fn use_fetch_with_config<T>(
    url: &str,
    options: FetchOptions,
    config: FetcherConfig,
) -> FetchHookReturn<T>
where
    T: DeserializeOwned + Clone + 'static,
{
    let snapshot = use_state(|| FetchSnapshot::<T> {
        loading: true,
        ..Default::default()
    });

    let fetcher = {
        let snapshot = snapshot.clone();
        use_memo((options.clone(), config.clone()), move |(options, config)| {
            let fetcher = CancellableFetcher::<T>::new(
                Rc::new(HttpTransport::default()),
                Rc::new(YewExecutor),
            )
            .with_options(options.clone())
            .with_config(config.clone());
            fetcher.on_change(move |next: &FetchSnapshot<T>| {
                snapshot.set(next.clone())
            });
            fetcher
        })
    };

    // Tear the fetcher down when it is replaced or the component unmounts.
    // Callbacks handed out earlier may still hold it, so dropping is not
    // enough.
    {
        let fetcher = fetcher.clone();
        use_effect_with((options.clone(), config.clone()), move |_| {
            move || fetcher.teardown()
        });
    }

    {
        let snapshot = snapshot.clone();
        let fetcher = fetcher.clone();
        use_effect_with(
            (url.to_string(), options, config),
            move |(url, _, _)| {
                snapshot.set(fetcher.observe(url));
            },
        );
    }

    let refetch = {
        let snapshot = snapshot.clone();
        Callback::from(move |_| snapshot.set(fetcher.refetch()))
    };

    FetchHookReturn {
        data: snapshot.data.clone(),
        is_loading: snapshot.loading,
        error: snapshot.error.clone(),
        refetch,
    }
}
