//! Toast notifications.

use std::time::Duration;

use askama::Template;

use super::{Document, Element, NodeId, Tag, TimerAction, render};

/// Time between a notification starting to fade and its removal.
pub const FADE_OUT: Duration = Duration::from_millis(300);

/// Notification severity; doubles as the CSS class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
    Warning,
}

impl NotificationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
            Self::Warning => "warning",
        }
    }

    /// Font Awesome icon shown next to the message.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Success => "fa-check-circle",
            Self::Error => "fa-exclamation-circle",
            Self::Info => "fa-info-circle",
            Self::Warning => "fa-exclamation-triangle",
        }
    }
}

#[derive(Template)]
#[template(path = "partials/notification.html")]
struct NotificationTemplate<'a> {
    icon: &'static str,
    message: &'a str,
}

impl Document {
    /// Append a notification and schedule its fade-out after `duration`.
    pub fn notify(&mut self, message: &str, kind: NotificationKind, duration: Duration) -> NodeId {
        let html = render(&NotificationTemplate {
            icon: kind.icon(),
            message,
        });

        let node = self.append(
            Element::new(Tag::Div)
                .with_class("notification")
                .with_class(kind.as_str())
                .with_attr("data-message", message)
                .with_html(html),
        );
        self.set_timeout(duration, TimerAction::FadeNotification(node));
        node
    }

    /// Notifications currently on the page, oldest first.
    pub fn notifications(&self) -> impl Iterator<Item = &Element> {
        self.by_class("notification")
    }

    /// Message of the most recent notification.
    pub fn last_notification(&self) -> Option<(NotificationKind, &str)> {
        self.notifications().last().and_then(|el| {
            let kind = [
                NotificationKind::Success,
                NotificationKind::Error,
                NotificationKind::Info,
                NotificationKind::Warning,
            ]
            .into_iter()
            .find(|kind| el.has_class(kind.as_str()))?;
            Some((kind, el.attr("data-message")?))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::page::Location;

    #[test]
    fn test_notification_lifecycle() {
        let mut doc = Document::new(Location::parse("/menu.html"));
        let node = doc.notify("Saved", NotificationKind::Success, Duration::from_millis(3000));

        let el = doc.get(node).unwrap();
        assert!(el.has_class("notification"));
        assert!(el.has_class("success"));
        assert!(el.inner().contains("fa-check-circle"));
        assert!(el.inner().contains("Saved"));

        doc.advance(Duration::from_millis(3000));
        assert!(doc.get(node).unwrap().has_class("hide"));

        doc.advance(Duration::from_millis(299));
        assert!(doc.get(node).is_some());

        doc.advance(Duration::from_millis(1));
        assert!(doc.get(node).is_none());
    }

    #[test]
    fn test_last_notification() {
        let mut doc = Document::new(Location::parse("/menu.html"));
        assert_eq!(doc.last_notification(), None);

        doc.notify("first", NotificationKind::Info, Duration::from_millis(3000));
        doc.notify("second", NotificationKind::Warning, Duration::from_millis(3000));

        assert_eq!(
            doc.last_notification(),
            Some((NotificationKind::Warning, "second"))
        );
        assert_eq!(doc.notifications().count(), 2);
    }

    #[test]
    fn test_icons_per_kind() {
        assert_eq!(NotificationKind::Error.icon(), "fa-exclamation-circle");
        assert_eq!(NotificationKind::Info.icon(), "fa-info-circle");
        assert_eq!(NotificationKind::Warning.icon(), "fa-exclamation-triangle");
    }
}
