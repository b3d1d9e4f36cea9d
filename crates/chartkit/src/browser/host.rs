//! `Host` implementation for the browser.

use super::canvas2d::Canvas2dSurface;
use super::dom::ElementContainer;
use super::BrowserError;
use chartkit_core::{Canvas, Container, FrameHost, FrameToken};
use chartkit_widgets::{Host, Tooltip, Viewport};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlCanvasElement, HtmlElement, ResizeObserver, Window};

type Hook = RefCell<Option<Box<dyn FnMut()>>>;

/// Callbacks the host forwards browser notifications to.
///
/// The chart owns its host, so the host cannot point back at the chart
/// directly; the owner of the chart fills these in after creation.
#[derive(Default)]
pub struct HostHooks {
    frame: Hook,
    resize: Hook,
}

impl HostHooks {
    /// Set the animation-frame callback.
    pub fn on_frame(&self, callback: impl FnMut() + 'static) {
        *self.frame.borrow_mut() = Some(Box::new(callback));
    }

    /// Set the container-resize callback.
    pub fn on_resize(&self, callback: impl FnMut() + 'static) {
        *self.resize.borrow_mut() = Some(Box::new(callback));
    }

    /// Drop both callbacks.
    pub fn clear(&self) {
        for hook in [&self.frame, &self.resize] {
            if let Ok(mut slot) = hook.try_borrow_mut() {
                slot.take();
            }
        }
    }

    fn fire(hook: &Hook) {
        // A hook that is already running (re-entrant notification) is skipped.
        if let Ok(mut slot) = hook.try_borrow_mut() {
            if let Some(callback) = slot.as_mut() {
                callback();
            }
        }
    }
}

/// A chart's browser resources: the canvas, a tooltip element, a resize
/// observer on the container and the animation-frame callback.
pub struct WebHost {
    window: Window,
    container: HtmlElement,
    surface: Canvas2dSurface,
    tooltip: HtmlElement,
    ambient: ElementContainer,
    observer: ResizeObserver,
    hooks: Rc<HostHooks>,
    frame_callback: Closure<dyn FnMut()>,
    _resize_callback: Closure<dyn FnMut()>,
}

fn create_element<T: JsCast>(document: &Document, tag: &str) -> Result<T, BrowserError> {
    document
        .create_element(tag)
        .map_err(|e| BrowserError::Dom(format!("create <{tag}>: {e:?}")))?
        .dyn_into::<T>()
        .map_err(|_| BrowserError::Dom(format!("<{tag}> has an unexpected type")))
}

fn set_styles(element: &HtmlElement, styles: &[(&str, &str)]) {
    let style = element.style();
    for (name, value) in styles {
        style.set_property(name, value).ok();
    }
}

impl WebHost {
    /// Build the canvas and tooltip inside `container` and start observing
    /// its size.
    pub fn new(container: HtmlElement) -> Result<Self, BrowserError> {
        let window = web_sys::window().ok_or(BrowserError::NoWindow)?;
        let document = window.document().ok_or(BrowserError::NoDocument)?;

        let canvas: HtmlCanvasElement = create_element(&document, "canvas")?;
        set_styles(
            &canvas,
            &[("display", "block"), ("width", "100%"), ("height", "100%")],
        );
        let tooltip: HtmlElement = create_element(&document, "div")?;
        set_styles(
            &tooltip,
            &[
                ("position", "absolute"),
                ("display", "none"),
                ("pointer-events", "none"),
                ("padding", "6px 8px"),
                ("border-radius", "4px"),
                ("font", "12px system-ui, sans-serif"),
                ("white-space", "nowrap"),
                ("background", "rgba(17, 24, 39, 0.94)"),
                ("color", "#f9fafb"),
                ("z-index", "10"),
            ],
        );
        if container.style().get_property_value("position").unwrap_or_default().is_empty() {
            container.style().set_property("position", "relative").ok();
        }
        container
            .append_child(&canvas)
            .map_err(|e| BrowserError::Dom(format!("{e:?}")))?;
        container
            .append_child(&tooltip)
            .map_err(|e| BrowserError::Dom(format!("{e:?}")))?;

        let hooks = Rc::new(HostHooks::default());
        let frame_hooks = Rc::clone(&hooks);
        let frame_callback = Closure::<dyn FnMut()>::new(move || HostHooks::fire(&frame_hooks.frame));
        let resize_hooks = Rc::clone(&hooks);
        let resize_callback =
            Closure::<dyn FnMut()>::new(move || HostHooks::fire(&resize_hooks.resize));
        let observer = ResizeObserver::new(resize_callback.as_ref().unchecked_ref())
            .map_err(|e| BrowserError::Dom(format!("{e:?}")))?;
        observer.observe(&container);

        Ok(Self {
            ambient: ElementContainer::chain(container.clone().into()),
            surface: Canvas2dSurface::new(canvas)?,
            window,
            container,
            tooltip,
            observer,
            hooks,
            frame_callback,
            _resize_callback: resize_callback,
        })
    }

    /// Hooks to connect the chart to.
    pub fn hooks(&self) -> Rc<HostHooks> {
        Rc::clone(&self.hooks)
    }

    /// The canvas element, for pointer listeners.
    pub fn canvas(&self) -> HtmlCanvasElement {
        self.surface.element().clone()
    }

    fn fill_tooltip(&self, tooltip: &Tooltip) -> Result<(), JsValue> {
        let document = self.window.document().ok_or("no document")?;
        self.tooltip.set_inner_html("");
        let title = document.create_element("strong")?;
        title.set_text_content(Some(&tooltip.title));
        self.tooltip.append_child(&title)?;
        for line in &tooltip.lines {
            let row = document.create_element("div")?;
            row.set_text_content(Some(line));
            self.tooltip.append_child(&row)?;
        }
        let style = self.tooltip.style();
        style.set_property("left", &format!("{}px", tooltip.x + 12.0))?;
        style.set_property("top", &format!("{}px", tooltip.y + 12.0))?;
        style.set_property("display", "block")?;
        Ok(())
    }
}

impl FrameHost for WebHost {
    fn request_frame(&mut self) -> FrameToken {
        let id = self
            .window
            .request_animation_frame(self.frame_callback.as_ref().unchecked_ref())
            .unwrap_or_default();
        FrameToken(u64::from(id.unsigned_abs()))
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        if let Ok(id) = i32::try_from(token.0) {
            self.window.cancel_animation_frame(id).ok();
        }
    }
}

impl Host for WebHost {
    fn now(&self) -> f64 {
        self.window.performance().map_or(0.0, |p| p.now())
    }

    fn viewport(&mut self) -> Viewport {
        let viewport = Viewport::new(
            f64::from(self.container.client_width()),
            f64::from(self.container.client_height()),
            self.window.device_pixel_ratio(),
        );
        let size = viewport.device_size();
        self.surface.set_backing_size(size.width, size.height);
        viewport
    }

    fn surface(&mut self) -> &mut dyn Canvas {
        &mut self.surface
    }

    fn ambient(&mut self) -> Option<&dyn Container> {
        // The container may have been moved under a new parent since mount.
        self.ambient = ElementContainer::chain(self.container.clone().into());
        Some(&self.ambient)
    }

    fn show_tooltip(&mut self, tooltip: Option<&Tooltip>) {
        let shown = match tooltip {
            Some(tooltip) => self.fill_tooltip(tooltip),
            None => self.tooltip.style().set_property("display", "none"),
        };
        if let Err(err) = shown {
            tracing::warn!(?err, "tooltip update failed");
        }
    }

    fn release(&mut self) {
        self.observer.disconnect();
        self.hooks.clear();
        self.surface.element().remove();
        self.tooltip.remove();
    }
}
