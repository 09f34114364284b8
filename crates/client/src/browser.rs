//! Headless browser session.
//!
//! [`Browser`] holds the loaded page and follows navigations: when a
//! controller or timer leaves the page, the old view is torn down and the
//! target is loaded with a fresh document, the way a full page load would.

use std::time::Duration;

use tracing::{info, warn};

use crate::api::FoodApi;
use crate::page::Document;
use crate::routes::{self, Event};
use crate::session::KeyValueStore;
use crate::state::AppState;

/// Upper bound on chained navigations followed in one step.
const MAX_REDIRECTS: usize = 10;

/// A single browser tab.
#[derive(Debug)]
pub struct Browser<A, K> {
    state: AppState<A, K>,
    page: Document,
    history: Vec<String>,
}

impl<A: FoodApi, K: KeyValueStore> Browser<A, K> {
    /// Open `target` in a new tab.
    pub async fn open(state: AppState<A, K>, target: &str) -> Self {
        let page = routes::load_page(&state, target).await;
        let mut browser = Self {
            state,
            page,
            history: vec![target.to_owned()],
        };
        browser.follow().await;
        browser
    }

    pub const fn page(&self) -> &Document {
        &self.page
    }

    pub const fn page_mut(&mut self) -> &mut Document {
        &mut self.page
    }

    pub const fn state(&self) -> &AppState<A, K> {
        &self.state
    }

    /// Every target loaded in this tab, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Type into a form field. Returns `false` if the field is not on the page.
    pub fn fill(&mut self, field: &str, value: &str) -> bool {
        self.page.set_field(field, value)
    }

    /// Deliver a user event, then follow any navigation it caused.
    pub async fn dispatch(&mut self, event: Event) {
        routes::dispatch(&self.state, &mut self.page, event).await;
        self.follow().await;
    }

    /// Let `by` pass on the page clock, then follow any navigation.
    pub async fn advance(&mut self, by: Duration) {
        self.page.advance(by);
        self.follow().await;
    }

    /// Run every pending timer, then follow any navigation.
    pub async fn settle(&mut self) {
        self.page.run_timers();
        self.follow().await;
    }

    /// Load `target` as if typed into the address bar.
    pub async fn navigate(&mut self, target: &str) {
        self.page.navigate(target);
        self.follow().await;
    }

    async fn follow(&mut self) {
        for _ in 0..MAX_REDIRECTS {
            let Some(target) = self.page.take_navigation() else {
                return;
            };

            info!(from = %self.page.location(), to = %target, "Loading page");
            routes::teardown(&mut self.page);
            self.page = routes::load_page(&self.state, &target).await;
            self.history.push(target);
        }

        if let Some(target) = self.page.navigation() {
            warn!(target, "Too many redirects; staying on page");
        }
    }
}
