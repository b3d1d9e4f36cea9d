//! Ambient background lookup over the DOM.

use chartkit_core::{Color, Container};
use web_sys::Element;

/// A DOM element and its ancestors as a [`Container`] chain.
///
/// The ancestry is captured once; background colors are read from the
/// computed style on every query, so theme changes on the page are seen.
pub struct ElementContainer {
    element: Element,
    parent: Option<Box<ElementContainer>>,
}

impl ElementContainer {
    /// Capture `element` and every ancestor up to the document root.
    pub fn chain(element: Element) -> Self {
        let parent = element
            .parent_element()
            .map(|parent| Box::new(Self::chain(parent)));
        Self { element, parent }
    }

    /// The element this link wraps.
    pub const fn element(&self) -> &Element {
        &self.element
    }
}

impl Container for ElementContainer {
    fn effective_background_color(&self) -> Option<Color> {
        let style = web_sys::window()?
            .get_computed_style(&self.element)
            .ok()
            .flatten()?;
        let value = style.get_property_value("background-color").ok()?;
        value.parse().ok()
    }

    fn parent(&self) -> Option<&dyn Container> {
        self.parent.as_deref().map(|p| p as &dyn Container)
    }
}
