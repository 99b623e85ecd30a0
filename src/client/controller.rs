//! List view controller.
//!
//! Owns the client-side window of loaded rows and the selection mirror,
//! and drives incremental loading as the UI reports which rows it rendered.
//! The UI layer is any fixed-row-height virtualized list: it calls
//! [`ListViewController::on_items_rendered`] whenever the visible range
//! changes and renders [`ListViewController::window`].
//!
//! Local edits (selection toggles, drag reorders) stay on the client until
//! [`ListViewController::save`] sends them. Failed calls never leave the
//! window half-updated: a page is appended whole or not at all.

use std::collections::{HashSet, VecDeque};

use super::transport::{ListTransport, TransportError};
use crate::api::SaveStateRequest;
use crate::domain::{ItemId, PAGE_SIZE};

// =============================================================================
// Status and Notifications
// =============================================================================

/// Loading state of the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    /// Nothing in flight.
    #[default]
    Idle,
    /// A load is in flight; further loads are refused.
    Loading,
    /// The last load failed. Loading may be attempted again.
    Error,
}

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

/// Transient message for the UI to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>, error: &TransportError) -> Self {
        let message = message.into();
        tracing::error!(%error, "{message}");
        Self {
            severity: Severity::Error,
            message,
        }
    }
}

/// Holds the view in [`LoadStatus::Loading`] while a load is in flight.
///
/// Dropping the guard puts back the status it replaced, so a load future
/// abandoned by its caller (timeout, `select!`) leaves the view usable.
struct LoadingGuard<'a> {
    status: &'a mut LoadStatus,
    previous: LoadStatus,
}

impl<'a> LoadingGuard<'a> {
    fn enter(status: &'a mut LoadStatus) -> Self {
        let previous = std::mem::replace(status, LoadStatus::Loading);
        Self { status, previous }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        *self.status = self.previous;
    }
}

// =============================================================================
// Controller
// =============================================================================

/// Client-side state machine over a [`ListTransport`].
#[derive(Debug)]
pub struct ListViewController<T> {
    transport: T,
    /// Rows materialized on the client, in display order.
    window: Vec<ItemId>,
    /// Full order as last reported by the server (or last saved).
    known_order: Vec<ItemId>,
    selection: HashSet<ItemId>,
    /// Search term the window was loaded with.
    active_search: String,
    /// Search box contents, restored from the server on mount.
    search_input: String,
    /// Last page appended to the window.
    page: u32,
    /// Filtered total reported with the last page.
    total: u64,
    status: LoadStatus,
    /// Set by drag reorders, cleared by loads and saves.
    reordered: bool,
    notifications: VecDeque<Notification>,
}

impl<T: ListTransport> ListViewController<T> {
    /// Creates an idle controller with an empty window.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            window: Vec::new(),
            known_order: Vec::new(),
            selection: HashSet::new(),
            active_search: String::new(),
            search_input: String::new(),
            page: 0,
            total: 0,
            status: LoadStatus::Idle,
            reordered: false,
            notifications: VecDeque::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Rows to render.
    pub fn window(&self) -> &[ItemId] {
        &self.window
    }

    pub const fn selection(&self) -> &HashSet<ItemId> {
        &self.selection
    }

    pub fn is_selected(&self, id: ItemId) -> bool {
        self.selection.contains(&id)
    }

    pub const fn status(&self) -> LoadStatus {
        self.status
    }

    pub const fn page(&self) -> u32 {
        self.page
    }

    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Length of the full collection as last reported.
    pub fn collection_len(&self) -> usize {
        self.known_order.len()
    }

    pub fn active_search(&self) -> &str {
        &self.active_search
    }

    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    /// Updates the search box without running a search.
    pub fn set_search_input(&mut self, input: impl Into<String>) {
        self.search_input = input.into();
    }

    /// Returns true if there are local reorders not yet saved.
    pub const fn has_unsaved_order(&self) -> bool {
        self.reordered
    }

    /// Drains pending notifications, oldest first.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push_back(notification);
    }

    fn fail(&mut self, message: &str, error: &TransportError) {
        self.status = LoadStatus::Error;
        self.notify(Notification::error(message, error));
    }

    // -------------------------------------------------------------------------
    // Loading
    // -------------------------------------------------------------------------

    /// Loads selection, last search, the full id list and page 1 concurrently.
    ///
    /// Returns true if all three calls succeeded.
    pub async fn mount(&mut self) -> bool {
        if self.status == LoadStatus::Loading {
            return false;
        }

        let guard = LoadingGuard::enter(&mut self.status);
        let transport = &self.transport;
        let loaded = tokio::try_join!(
            transport.fetch_initial_state(),
            transport.fetch_all_ids(),
            transport.fetch_page(1, ""),
        );
        drop(guard);

        match loaded {
            Ok((initial, ids, first_page)) => {
                self.selection = initial.selected.into_iter().collect();
                self.search_input = initial.last_search;
                self.active_search.clear();
                self.known_order = ids;
                self.replace_window(first_page.items, first_page.total);
                self.status = LoadStatus::Idle;
                tracing::debug!(total = self.total, "List view mounted");
                true
            }
            Err(error) => {
                self.fail("Failed to load initial state", &error);
                false
            }
        }
    }

    /// Returns true if another page exists and no load is in flight.
    pub fn can_load_more(&self) -> bool {
        self.status != LoadStatus::Loading
            && u64::from(self.page) * u64::from(PAGE_SIZE) < self.total
    }

    /// Reacts to the UI's rendered range; loads the next page when the last
    /// loaded row becomes visible.
    ///
    /// Returns true if a page was appended.
    pub async fn on_items_rendered(&mut self, visible_stop_index: usize) -> bool {
        if self.window.len().checked_sub(1) != Some(visible_stop_index) {
            return false;
        }
        self.load_more().await
    }

    /// Appends the next page of the active search.
    ///
    /// Ids already in the window are skipped; they show up again when the
    /// server order shifted between two pages.
    ///
    /// Returns true if a page was appended.
    pub async fn load_more(&mut self) -> bool {
        if !self.can_load_more() {
            return false;
        }

        let next_page = self.page + 1;
        let guard = LoadingGuard::enter(&mut self.status);
        let result = self
            .transport
            .fetch_page(next_page, &self.active_search)
            .await;
        drop(guard);

        match result {
            Ok(response) => {
                let loaded: HashSet<ItemId> = self.window.iter().copied().collect();
                self.window
                    .extend(response.items.into_iter().filter(|id| !loaded.contains(id)));
                self.total = response.total;
                self.page = next_page;
                self.status = LoadStatus::Idle;
                true
            }
            Err(error) => {
                self.fail("Failed to load items", &error);
                false
            }
        }
    }

    /// Discards the window and reloads page 1 filtered by `term`.
    ///
    /// Returns true if the search succeeded.
    pub async fn search(&mut self, term: impl Into<String>) -> bool {
        if self.status == LoadStatus::Loading {
            return false;
        }
        let term = term.into();
        self.search_input.clone_from(&term);

        let guard = LoadingGuard::enter(&mut self.status);
        let result = self.transport.fetch_page(1, &term).await;
        drop(guard);

        match result {
            Ok(response) => {
                self.active_search = term;
                self.replace_window(response.items, response.total);
                self.status = LoadStatus::Idle;
                true
            }
            Err(error) => {
                self.fail("Failed to load items", &error);
                false
            }
        }
    }

    fn replace_window(&mut self, items: Vec<ItemId>, total: u64) {
        self.window = items;
        self.total = total;
        self.page = 1;
        self.reordered = false;
    }

    // -------------------------------------------------------------------------
    // Local edits
    // -------------------------------------------------------------------------

    /// Flips the selection of `id`. Returns true if it is now selected.
    pub fn toggle_selection(&mut self, id: ItemId) -> bool {
        if self.selection.remove(&id) {
            false
        } else {
            self.selection.insert(id);
            true
        }
    }

    /// Moves the row at `source` to `destination` within the window.
    ///
    /// Returns false (and changes nothing) if either index is out of range.
    pub fn reorder(&mut self, source: usize, destination: usize) -> bool {
        if source >= self.window.len() || destination >= self.window.len() {
            return false;
        }
        if source != destination {
            let moved = self.window.remove(source);
            self.window.insert(destination, moved);
            self.reordered = true;
        }
        true
    }

    /// The full order with the window's rows placed, in window order, into
    /// the positions those rows occupy in the known order.
    fn projected_order(&self) -> Vec<ItemId> {
        let members: HashSet<ItemId> = self.window.iter().copied().collect();
        let mut reordered = self.window.iter().copied();
        self.known_order
            .iter()
            .map(|&id| {
                if members.contains(&id) {
                    reordered.next().unwrap_or(id)
                } else {
                    id
                }
            })
            .collect()
    }

    // -------------------------------------------------------------------------
    // Server sync
    // -------------------------------------------------------------------------

    /// Sends the selection mirror, the local order and the active search term.
    ///
    /// The order is only sent if rows were reordered since the last load.
    /// If the full order was never loaded it is fetched first, so a reorder
    /// is never dropped silently. On failure local state is left untouched.
    pub async fn save(&mut self) -> bool {
        if self.status == LoadStatus::Loading {
            return false;
        }
        if self.reordered && self.known_order.is_empty() {
            match self.transport.fetch_all_ids().await {
                Ok(ids) => self.known_order = ids,
                Err(error) => {
                    self.notify(Notification::error("Failed to save state", &error));
                    return false;
                }
            }
        }
        let sorted_items = if self.reordered {
            self.projected_order()
        } else {
            Vec::new()
        };
        let mut selected_items: Vec<ItemId> = self.selection.iter().copied().collect();
        selected_items.sort_unstable();

        let request = SaveStateRequest {
            selected_items,
            sorted_items,
            search_term: self.active_search.clone(),
        };
        let sent_order = self.reordered.then(|| request.sorted_items.clone());

        match self.transport.save_state(request).await {
            Ok(_) => {
                if let Some(order) = sent_order {
                    self.known_order = order;
                    self.reordered = false;
                }
                self.notify(Notification::success("State saved"));
                true
            }
            Err(error) => {
                self.notify(Notification::error("Failed to save state", &error));
                false
            }
        }
    }

    /// Resets the server state, clears the selection mirror and search, and
    /// reloads page 1 of the base order.
    pub async fn reset(&mut self) -> bool {
        if self.status == LoadStatus::Loading {
            return false;
        }
        if let Err(error) = self.transport.reset_state().await {
            self.notify(Notification::error("Failed to reset state", &error));
            return false;
        }

        self.selection.clear();
        self.active_search.clear();
        self.search_input.clear();

        let guard = LoadingGuard::enter(&mut self.status);
        let transport = &self.transport;
        let reloaded = tokio::try_join!(transport.fetch_page(1, ""), transport.fetch_all_ids());
        drop(guard);

        match reloaded {
            Ok((first_page, ids)) => {
                self.known_order = ids;
                self.replace_window(first_page.items, first_page.total);
                self.status = LoadStatus::Idle;
                self.notify(Notification::success("State reset"));
                true
            }
            Err(error) => {
                self.fail("Failed to reload items", &error);
                false
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
