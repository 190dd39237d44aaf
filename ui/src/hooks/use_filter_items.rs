use std::fmt::Display;
use std::rc::Rc;

use yew::prelude::*;

/// Default filter: case-insensitive substring match on the item's
/// `Display` output.
pub fn matches_query<T: Display>(item: &T, query: &str) -> bool {
    item.to_string()
        .to_lowercase()
        .contains(&query.to_lowercase())
}

/// Items for which `filter(item, query)` holds, in their original order.
pub fn filter_items<T, F>(items: &[T], query: &str, filter: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T, &str) -> bool,
{
    items
        .iter()
        .filter(|item| filter(item, query))
        .cloned()
        .collect()
}

pub struct UseFilterItems<T> {
    pub items: Rc<Vec<T>>,
    pub set_items: Callback<Vec<T>>,
    pub query: Rc<String>,
    pub set_query: Callback<String>,
    pub filtered_items: Rc<Vec<T>>,
}

/// Hold a list and a query, and expose the items matching the query.
///
/// The filter is only recomputed when the items or the query change; a new
/// `filter` closure on its own does not trigger a recomputation.
///
/// # Example
///
/// ```rust,ignore
/// let fruit = use_filter_items(matches_query::<String>);
/// fruit.set_query.emit("ban".into());
/// ```
#[hook]
pub fn use_filter_items<T, F>(filter: F) -> UseFilterItems<T>
where
    T: Clone + PartialEq + 'static,
    F: Fn(&T, &str) -> bool + 'static,
{
    let items = use_state(|| Rc::new(Vec::<T>::new()));
    let query = use_state(|| Rc::new(String::new()));

    let filtered_items = use_memo(
        ((*items).clone(), (*query).clone()),
        move |(items, query)| {
            filter_items(items.as_slice(), query.as_str(), filter)
        },
    );

    let set_items = {
        let items = items.clone();
        Callback::from(move |next: Vec<T>| items.set(Rc::new(next)))
    };
    let set_query = {
        let query = query.clone();
        Callback::from(move |next: String| query.set(Rc::new(next)))
    };

    UseFilterItems {
        items: (*items).clone(),
        set_items,
        query: (*query).clone(),
        set_query,
        filtered_items,
    }
}
