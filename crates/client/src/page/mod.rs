//! In-memory page document.
//!
//! A [`Document`] is the browser page the controllers work against: a flat
//! list of addressable elements, a logical clock with fire-once timers, and
//! a pending navigation target. Controllers look elements up by id, class
//! or attribute and treat a missing element as "feature not on this page".

pub mod layout;
pub mod notification;
mod timers;

use std::collections::BTreeMap;
use std::time::Duration;

use askama::Template;

pub use notification::NotificationKind;
pub use timers::TimerAction;

use crate::routes::ViewState;
use timers::TimerQueue;

/// Stable handle for an element within one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

/// Element kinds the controllers distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Div,
    Span,
    Link,
    Button,
    Form,
    Input,
    Select,
}

impl Tag {
    /// HTML tag name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Div => "div",
            Self::Span => "span",
            Self::Link => "a",
            Self::Button => "button",
            Self::Form => "form",
            Self::Input => "input",
            Self::Select => "select",
        }
    }
}

/// Inner content of an element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Content {
    #[default]
    Empty,
    /// Plain text, escaped when rendered.
    Text(String),
    /// Markup produced by a template.
    Html(String),
}

impl Content {
    /// The raw content string (text or markup).
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Empty => "",
            Self::Text(s) | Self::Html(s) => s,
        }
    }
}

/// One addressable element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    node: NodeId,
    tag: Tag,
    id: Option<String>,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    content: Content,
    hidden: bool,
    disabled: bool,
    value: String,
}

impl Element {
    /// Create a detached element. The node id is assigned when it is
    /// added to a document.
    #[must_use]
    pub fn new(tag: Tag) -> Self {
        Self {
            node: NodeId(0),
            tag,
            id: None,
            classes: Vec::new(),
            attrs: BTreeMap::new(),
            content: Content::Empty,
            hidden: false,
            disabled: false,
            value: String::new(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_owned());
        self
    }

    #[must_use]
    pub fn with_class(mut self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    #[must_use]
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_owned(), value.to_owned());
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.content = Content::Text(text.to_owned());
        self
    }

    #[must_use]
    pub fn with_html(mut self, html: String) -> Self {
        self.content = Content::Html(html);
        self
    }

    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub const fn node(&self) -> NodeId {
        self.node
    }

    pub const fn tag(&self) -> Tag {
        self.tag
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_owned());
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub const fn content(&self) -> &Content {
        &self.content
    }

    /// Text or markup inside the element.
    pub fn inner(&self) -> &str {
        self.content.as_str()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.content = Content::Text(text.into());
    }

    pub fn set_html(&mut self, html: String) {
        self.content = Content::Html(html);
    }

    pub fn set_content(&mut self, content: Content) {
        self.content = content;
    }

    pub fn clear(&mut self) {
        self.content = Content::Empty;
    }

    pub const fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub const fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    pub const fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub const fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Current value of a form field.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }
}

/// Path plus query string of the loaded page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    path: String,
    query: Vec<(String, String)>,
}

impl Location {
    /// Split `path?query` into its parts.
    #[must_use]
    pub fn parse(target: &str) -> Self {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        let path = if path.starts_with('/') {
            path.to_owned()
        } else {
            format!("/{path}")
        };

        Self {
            path,
            query: url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// First value of a query parameter.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)?;
        if !self.query.is_empty() {
            let query: String = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(&self.query)
                .finish();
            write!(f, "?{query}")?;
        }
        Ok(())
    }
}

// =============================================================================
// Document
// =============================================================================

/// A loaded page.
#[derive(Debug)]
pub struct Document {
    location: Location,
    elements: Vec<Element>,
    next_node: u64,
    timers: TimerQueue,
    navigation: Option<String>,
    pub(crate) view: ViewState,
}

impl Document {
    /// An empty page at `location`.
    #[must_use]
    pub fn new(location: Location) -> Self {
        Self {
            location,
            elements: Vec::new(),
            next_node: 1,
            timers: TimerQueue::default(),
            navigation: None,
            view: ViewState::default(),
        }
    }

    pub const fn location(&self) -> &Location {
        &self.location
    }

    /// Append an element and return its node id.
    pub fn append(&mut self, mut element: Element) -> NodeId {
        let node = NodeId(self.next_node);
        self.next_node += 1;
        element.node = node;
        self.elements.push(element);
        node
    }

    /// Remove an element. Returns `false` if it was already gone.
    pub fn remove(&mut self, node: NodeId) -> bool {
        let before = self.elements.len();
        self.elements.retain(|el| el.node != node);
        self.elements.len() != before
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn get(&self, node: NodeId) -> Option<&Element> {
        self.elements.iter().find(|el| el.node == node)
    }

    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|el| el.node == node)
    }

    pub fn by_id(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|el| el.id() == Some(id))
    }

    pub fn by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.elements.iter_mut().find(|el| el.id() == Some(id))
    }

    /// Whether an element with this id exists.
    pub fn has(&self, id: &str) -> bool {
        self.by_id(id).is_some()
    }

    pub fn by_class<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements.iter().filter(move |el| el.has_class(class))
    }

    pub fn by_class_mut<'a>(
        &'a mut self,
        class: &'a str,
    ) -> impl Iterator<Item = &'a mut Element> + 'a {
        self.elements.iter_mut().filter(move |el| el.has_class(class))
    }

    /// Replace the markup inside `#id`. Returns `false` if it is absent.
    pub fn set_html(&mut self, id: &str, html: String) -> bool {
        match self.by_id_mut(id) {
            Some(el) => {
                el.set_html(html);
                true
            }
            None => false,
        }
    }

    /// Empty `#id` if present.
    pub fn clear(&mut self, id: &str) {
        if let Some(el) = self.by_id_mut(id) {
            el.clear();
        }
    }

    /// Value of a form field, or empty when the field is absent.
    pub fn field_value(&self, id: &str) -> String {
        self.by_id(id).map(|el| el.value().to_owned()).unwrap_or_default()
    }

    /// Set a form field's value. Returns `false` if the field is absent.
    pub fn set_field(&mut self, id: &str, value: &str) -> bool {
        match self.by_id_mut(id) {
            Some(el) => {
                el.set_value(value);
                true
            }
            None => false,
        }
    }

    /// The submit button belonging to `form_id`.
    pub fn submit_button_mut(&mut self, form_id: &str) -> Option<&mut Element> {
        self.elements.iter_mut().find(|el| {
            el.tag == Tag::Button && el.attr("type") == Some("submit") && el.attr("form") == Some(form_id)
        })
    }

    // -------------------------------------------------------------------------
    // Clock and navigation
    // -------------------------------------------------------------------------

    /// Logical time since the page loaded.
    pub const fn now(&self) -> Duration {
        self.timers.now()
    }

    /// Schedule `action` to run once after `delay`.
    pub fn set_timeout(&mut self, delay: Duration, action: TimerAction) {
        self.timers.schedule(delay, action);
    }

    /// Number of timers that have not fired yet.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Move the clock forward, firing every timer that falls due.
    ///
    /// Stops early if a timer navigates away.
    pub fn advance(&mut self, by: Duration) {
        let deadline = self.timers.now() + by;
        while self.navigation.is_none() {
            let Some(action) = self.timers.pop_due(deadline) else {
                break;
            };
            self.fire(action);
        }
        if self.navigation.is_none() {
            self.timers.set_now(deadline);
        }
    }

    /// Fire timers until none remain or the page navigates away.
    pub fn run_timers(&mut self) {
        while self.navigation.is_none() {
            let Some(action) = self.timers.pop_next() else {
                break;
            };
            self.fire(action);
        }
    }

    fn fire(&mut self, action: TimerAction) {
        match action {
            TimerAction::FadeNotification(node) => {
                if let Some(el) = self.get_mut(node) {
                    el.add_class("hide");
                    self.set_timeout(notification::FADE_OUT, TimerAction::RemoveNotification(node));
                }
            }
            TimerAction::RemoveNotification(node) => {
                self.remove(node);
            }
            TimerAction::Navigate(target) => self.navigate(&target),
        }
    }

    /// Leave the page. Unfired timers are discarded.
    pub fn navigate(&mut self, target: &str) {
        tracing::debug!(from = %self.location, to = target, "Navigating");
        self.timers.clear();
        self.navigation = Some(target.to_owned());
    }

    /// Navigate after `delay`.
    pub fn redirect_after(&mut self, delay: Duration, target: &str) {
        self.set_timeout(delay, TimerAction::Navigate(target.to_owned()));
    }

    /// Pending navigation target, if the page has navigated away.
    pub fn navigation(&self) -> Option<&str> {
        self.navigation.as_deref()
    }

    pub fn take_navigation(&mut self) -> Option<String> {
        self.navigation.take()
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    /// Render the page as HTML.
    pub fn render_html(&self) -> String {
        let page = PageTemplate {
            path: self.location.path(),
            elements: self.elements.iter().map(ElementView::from).collect(),
        };
        render(&page)
    }
}

/// Render a template, logging and returning an empty string on failure.
pub(crate) fn render<T: Template>(template: &T) -> String {
    template.render().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Template render failed");
        String::new()
    })
}

/// Loading placeholder shown while a view fetches its data.
#[derive(Template)]
#[template(path = "partials/loading.html")]
pub(crate) struct LoadingTemplate<'a> {
    pub message: &'a str,
}

/// Element display data for the page template.
struct ElementView<'a> {
    tag: &'static str,
    id: Option<&'a str>,
    class: String,
    attrs: Vec<(&'a str, &'a str)>,
    hidden: bool,
    disabled: bool,
    is_input: bool,
    value: &'a str,
    text: Option<&'a str>,
    html: Option<&'a str>,
}

impl<'a> From<&'a Element> for ElementView<'a> {
    fn from(el: &'a Element) -> Self {
        let (text, html) = match &el.content {
            Content::Empty => (None, None),
            Content::Text(text) => (Some(text.as_str()), None),
            Content::Html(html) => (None, Some(html.as_str())),
        };

        Self {
            tag: el.tag.as_str(),
            id: el.id(),
            class: el.classes.join(" "),
            attrs: el.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect(),
            hidden: el.hidden,
            disabled: el.disabled,
            is_input: el.tag == Tag::Input,
            value: &el.value,
            text,
            html,
        }
    }
}

#[derive(Template)]
#[template(path = "page.html")]
struct PageTemplate<'a> {
    path: &'a str,
    elements: Vec<ElementView<'a>>,
}
