//! Static markup of each page.
//!
//! Every page shares the header chrome (user display, login/logout
//! controls, cart badge, API status); the rest depends on the route.

use super::{Document, Element, Location, Tag};
use crate::routes::Route;

/// Build the document served at `location`.
///
/// Unknown paths get the chrome only.
#[must_use]
pub fn build(location: Location, route: Option<Route>) -> Document {
    let mut doc = Document::new(location);
    chrome(&mut doc);

    match route {
        Some(Route::Login) => form(
            &mut doc,
            "loginForm",
            &[("username", Tag::Input), ("password", Tag::Input)],
            "Login",
        ),
        Some(Route::Register) => form(
            &mut doc,
            "registerForm",
            &[
                ("username", Tag::Input),
                ("password", Tag::Input),
                ("email", Tag::Input),
                ("fullName", Tag::Input),
                ("phone", Tag::Input),
            ],
            "Register",
        ),
        Some(Route::Menu) => {
            doc.append(Element::new(Tag::Input).with_id("searchInput"));
            doc.append(Element::new(Tag::Div).with_id("category-filters"));
            doc.append(Element::new(Tag::Div).with_id("menu-container"));
        }
        Some(Route::Cart) => {
            doc.append(Element::new(Tag::Div).with_id("cart-container"));
            doc.append(Element::new(Tag::Div).with_id("cart-summary"));
        }
        Some(Route::Checkout) => {
            doc.append(Element::new(Tag::Div).with_id("checkout-summary"));
            form(
                &mut doc,
                "checkoutForm",
                &[
                    ("address", Tag::Input),
                    ("phone", Tag::Input),
                    ("paymentMethod", Tag::Select),
                ],
                "Place Order",
            );
        }
        Some(Route::Profile) => {
            doc.append(Element::new(Tag::Div).with_id("profile-info"));
            doc.append(Element::new(Tag::Div).with_id("order-history"));
        }
        Some(Route::Home | Route::AdminDashboard) | None => {}
    }

    doc
}

fn chrome(doc: &mut Document) {
    doc.append(Element::new(Tag::Span).with_class("user-display"));
    doc.append(
        Element::new(Tag::Link)
            .with_class("login-btn")
            .with_attr("href", "login.html")
            .with_text("Login"),
    );
    doc.append(
        Element::new(Tag::Button)
            .with_id("logoutBtn")
            .with_class("logout-btn")
            .with_text("Logout")
            .hidden(),
    );
    doc.append(
        Element::new(Tag::Span)
            .with_class("cart-count")
            .with_text("0")
            .hidden(),
    );
    doc.append(Element::new(Tag::Div).with_id("api-status"));
}

fn form(doc: &mut Document, form_id: &str, fields: &[(&str, Tag)], submit: &str) {
    doc.append(Element::new(Tag::Form).with_id(form_id));
    for (field, tag) in fields {
        doc.append(
            Element::new(*tag)
                .with_id(field)
                .with_attr("name", field)
                .with_attr("form", form_id),
        );
    }
    doc.append(
        Element::new(Tag::Button)
            .with_attr("type", "submit")
            .with_attr("form", form_id)
            .with_text(submit),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_page_has_chrome() {
        for route in [None, Some(Route::Home), Some(Route::Menu), Some(Route::Profile)] {
            let doc = build(Location::parse("/x.html"), route);
            assert_eq!(doc.by_class("user-display").count(), 1);
            assert_eq!(doc.by_class("cart-count").count(), 1);
            assert!(doc.has("logoutBtn"));
            assert!(doc.has("api-status"));
        }
    }

    #[test]
    fn test_login_page_has_form() {
        let mut doc = build(Location::parse("/login.html"), Some(Route::Login));
        assert!(doc.has("loginForm"));
        assert!(doc.has("username"));
        assert!(doc.has("password"));
        assert!(doc.submit_button_mut("loginForm").is_some());
        assert!(!doc.has("menu-container"));
    }

    #[test]
    fn test_checkout_page_fields() {
        let doc = build(Location::parse("/checkout.html"), Some(Route::Checkout));
        for id in ["checkout-summary", "checkoutForm", "address", "phone", "paymentMethod"] {
            assert!(doc.has(id), "missing #{id}");
        }
    }
}
