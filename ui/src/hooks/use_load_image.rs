use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{Event, HtmlImageElement};
use yew::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Failed to load image with src: {src}")]
pub struct LoadImageError {
    pub src: String,
}

/// Progress of one image load. `I` is the loaded image, an
/// `HtmlImageElement` in the browser.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageLoad<I> {
    pub image: Option<I>,
    pub loading: bool,
    pub error: Option<LoadImageError>,
}

impl<I> Default for ImageLoad<I> {
    fn default() -> Self {
        ImageLoad {
            image: None,
            loading: false,
            error: None,
        }
    }
}

pub enum ImageLoadAction<I> {
    Started,
    Loaded(I),
    Failed(LoadImageError),
}

impl<I> Reducible for ImageLoad<I> {
    type Action = ImageLoadAction<I>;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let next = match action {
            ImageLoadAction::Started => ImageLoad {
                loading: true,
                ..Default::default()
            },
            ImageLoadAction::Loaded(image) => ImageLoad {
                image: Some(image),
                ..Default::default()
            },
            ImageLoadAction::Failed(error) => ImageLoad {
                error: Some(error),
                ..Default::default()
            },
        };
        Rc::new(next)
    }
}

/// An image element being loaded. Dropping it detaches the listeners, so a
/// load that finishes later is not reported.
struct ImageLoader {
    image: HtmlImageElement,
    on_load: Closure<dyn FnMut(Event)>,
    on_error: Closure<dyn FnMut(Event)>,
}

impl ImageLoader {
    fn start(
        src: &str,
        state: UseReducerDispatcher<ImageLoad<HtmlImageElement>>,
    ) -> Result<Self, JsValue> {
        let image = HtmlImageElement::new()?;

        let on_load = {
            let state = state.clone();
            let loaded = image.clone();
            Closure::wrap(Box::new(move |_: Event| {
                state.dispatch(ImageLoadAction::Loaded(loaded.clone()));
            }) as Box<dyn FnMut(Event)>)
        };
        let on_error = {
            let state = state.clone();
            let src = src.to_string();
            Closure::wrap(Box::new(move |_: Event| {
                let error = LoadImageError { src: src.clone() };
                tracing::warn!(%error, "Image failed to load");
                state.dispatch(ImageLoadAction::Failed(error));
            }) as Box<dyn FnMut(Event)>)
        };

        image.add_event_listener_with_callback(
            "load",
            on_load.as_ref().unchecked_ref(),
        )?;
        image.add_event_listener_with_callback(
            "error",
            on_error.as_ref().unchecked_ref(),
        )?;
        state.dispatch(ImageLoadAction::Started);
        image.set_src(src);

        Ok(ImageLoader {
            image,
            on_load,
            on_error,
        })
    }
}

impl Drop for ImageLoader {
    fn drop(&mut self) {
        let _ = self.image.remove_event_listener_with_callback(
            "load",
            self.on_load.as_ref().unchecked_ref(),
        );
        let _ = self.image.remove_event_listener_with_callback(
            "error",
            self.on_error.as_ref().unchecked_ref(),
        );
    }
}

/// Load the image at `src`, reporting `loading` until it either loads or
/// fails. A new `src` abandons the previous load.
///
/// # Example
/// ```ignore
/// let avatar = use_load_image(&props.avatar_url);
/// if let Some(error) = &avatar.error {
///     return html! { <p>{ error.to_string() }</p> };
/// }
/// ```
#[hook]
pub fn use_load_image(src: &str) -> ImageLoad<HtmlImageElement> {
    let state = use_reducer(ImageLoad::<HtmlImageElement>::default);

    {
        let dispatcher = state.dispatcher();
        use_effect_with(src.to_string(), move |src| {
            let loader = match ImageLoader::start(src, dispatcher.clone()) {
                Ok(loader) => Some(loader),
                Err(e) => {
                    tracing::error!(
                        src = %src,
                        error = ?e,
                        "Failed to create image"
                    );
                    dispatcher.dispatch(ImageLoadAction::Failed(
                        LoadImageError { src: src.clone() },
                    ));
                    None
                }
            };
            move || drop(loader)
        });
    }

    (*state).clone()
}
