//! The list-screen fetch lifecycle: paging, debounced search, filter changes,
//! focus refresh and stale-response suppression, generic over the resource.
//!
//! Every screen that shows a server-backed list runs one [`ListQuery`] with
//! its own [`FetchSession`]. Nothing is shared between screens.

use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use crux_core::App;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::capabilities::{Capabilities, HttpResult, TimerId};
use crate::config::ClientConfig;
use crate::debounce::Debouncer;
use crate::endpoints;
use crate::filters::{normalize_search, ListParams};
use crate::guard::{RequestGuard, RequestToken};
use crate::pagination::{accumulate, can_load_more, Page, Pagination};
use crate::resources::Resource;
use crate::{AppError, SEARCH_DEBOUNCE_MS};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FetchStatus {
    #[default]
    Idle,
    /// First page for the current params.
    Loading,
    LoadingMore,
    /// Page 1 reloaded behind a visible list.
    Refreshing,
    Error,
}

impl FetchStatus {
    #[must_use]
    pub const fn is_busy(self) -> bool {
        matches!(self, Self::Loading | Self::LoadingMore | Self::Refreshing)
    }
}

/// The page a fetch asked for and whether its items extend the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub append: bool,
}

impl PageRequest {
    #[must_use]
    pub const fn first() -> Self {
        Self {
            page: 1,
            append: false,
        }
    }
}

/// Per-screen fetch state. Lives from mount to unmount.
#[derive(Debug, Clone)]
pub struct FetchSession<T, F> {
    /// Set by `Mounted`; nothing is fetched without it.
    pub config: Option<ClientConfig>,
    pub guard: RequestGuard,
    pub params: ListParams<F>,
    /// Text as typed, applied to `params` once the debounce settles.
    pub search_input: String,
    pub page: u32,
    pub items: Vec<T>,
    pub pagination: Option<Pagination>,
    pub status: FetchStatus,
    pub error: Option<String>,
    pub is_active: bool,
    pub debounce: Debouncer,
    pub has_fetched_once: bool,
    pub last_request: Option<PageRequest>,
    /// Request id of the primary fetch still outstanding.
    pub in_flight: Option<String>,
}

impl<T, F: Default> Default for FetchSession<T, F> {
    fn default() -> Self {
        Self {
            config: None,
            guard: RequestGuard::new(),
            params: ListParams::default(),
            search_input: String::new(),
            page: 1,
            items: Vec::new(),
            pagination: None,
            status: FetchStatus::Idle,
            error: None,
            is_active: false,
            debounce: Debouncer::new(),
            has_fetched_once: false,
            last_request: None,
            in_flight: None,
        }
    }
}

pub enum ListEvent<R: Resource> {
    /// The screen appeared for the first time, or again after `Unmounted`.
    Mounted(ClientConfig),
    /// The screen became visible again.
    Focused,
    Unmounted,
    SearchChanged(String),
    SearchSettled {
        timer: TimerId,
    },
    FiltersChanged(R::Filters),
    /// The user scrolled to the bottom.
    EndReached,
    /// Pull-to-refresh.
    Refresh,
    Retry,

    // Shell answers
    PageLoaded {
        token: RequestToken,
        request: PageRequest,
        result: Box<HttpResult>,
    },
}

impl<R: Resource> ListEvent<R> {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mounted(_) => "mounted",
            Self::Focused => "focused",
            Self::Unmounted => "unmounted",
            Self::SearchChanged(_) => "search_changed",
            Self::SearchSettled { .. } => "search_settled",
            Self::FiltersChanged(_) => "filters_changed",
            Self::EndReached => "end_reached",
            Self::Refresh => "refresh",
            Self::Retry => "retry",
            Self::PageLoaded { .. } => "page_loaded",
        }
    }
}

impl<R: Resource> fmt::Debug for ListEvent<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SearchChanged(text) => f.debug_tuple("SearchChanged").field(text).finish(),
            Self::SearchSettled { timer } => {
                f.debug_struct("SearchSettled").field("timer", timer).finish()
            }
            Self::FiltersChanged(filters) => {
                f.debug_tuple("FiltersChanged").field(filters).finish()
            }
            Self::PageLoaded {
                token,
                request,
                result,
            } => f
                .debug_struct("PageLoaded")
                .field("token", token)
                .field("request", request)
                .field("ok", &result.is_ok())
                .finish(),
            other => f.write_str(other.name()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmptyState {
    NoRecords,
    /// Nothing matches the current search or filters.
    NoMatches,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyStateView {
    pub kind: EmptyState,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListViewModel<T> {
    pub items: Vec<T>,
    pub search_input: String,
    pub status: FetchStatus,
    pub is_loading: bool,
    pub is_loading_more: bool,
    pub is_refreshing: bool,
    pub error: Option<String>,
    pub can_load_more: bool,
    pub total: Option<u64>,
    pub empty_state: Option<EmptyStateView>,
}

pub struct ListQuery<R: Resource> {
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Default for ListQuery<R> {
    fn default() -> Self {
        Self {
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> ListQuery<R> {
    fn execute_fetch(
        session: &mut FetchSession<R::Item, R::Filters>,
        request: PageRequest,
        status: FetchStatus,
        caps: &Capabilities<ListEvent<R>>,
    ) {
        let Some(config) = session.config.as_ref() else {
            warn!(resource = R::PATH, "fetch requested before the screen was configured");
            return;
        };
        let http_request = match endpoints::list_request::<R>(config, &session.params, request.page) {
            Ok(r) => r,
            Err(e) => {
                warn!(resource = R::PATH, error = %e, "could not build list request");
                if let Some(previous) = session.in_flight.take() {
                    caps.http.cancel(previous);
                }
                session.guard.invalidate();
                session.error = Some(AppError::from(e).user_facing_message(R::load_error_copy()));
                session.status = FetchStatus::Error;
                caps.render.render();
                return;
            }
        };

        if let Some(previous) = session.in_flight.take() {
            debug!(resource = R::PATH, request_id = %previous, "superseding in-flight fetch");
            caps.http.cancel(previous);
        }

        let token = session.guard.begin();
        session.in_flight = Some(http_request.request_id().to_string());
        session.last_request = Some(request);
        session.status = status;

        info!(
            resource = R::PATH,
            page = request.page,
            append = request.append,
            token = token.value(),
            "fetching list page"
        );

        caps.http.send(http_request, move |result| ListEvent::PageLoaded {
            token,
            request,
            result: Box::new(result),
        });
        caps.render.render();
    }

    fn handle_page_loaded(
        session: &mut FetchSession<R::Item, R::Filters>,
        token: RequestToken,
        request: PageRequest,
        result: HttpResult,
    ) -> bool {
        if !session.is_active {
            debug!(resource = R::PATH, token = token.value(), "dropping response after unmount");
            return false;
        }
        if !session.guard.is_current(token) {
            debug!(
                resource = R::PATH,
                token = token.value(),
                latest = session.guard.latest(),
                "dropping stale response"
            );
            return false;
        }

        session.in_flight = None;

        match decode_page::<R>(result, request.page) {
            Ok(page) => {
                accumulate(&mut session.items, page.items, request.append);
                session.page = page.pagination.current_page;
                session.pagination = Some(page.pagination);
                session.error = None;
                session.status = FetchStatus::Idle;
                session.has_fetched_once = true;
            }
            Err(e) => {
                warn!(resource = R::PATH, page = request.page, error = %e, "list fetch failed");
                session.error = Some(e.user_facing_message(R::load_error_copy()));
                session.status = FetchStatus::Error;
            }
        }
        true
    }
}

fn decode_page<R: Resource>(result: HttpResult, requested_page: u32) -> Result<Page<R::Item>, AppError> {
    let response = result?;
    if !response.is_success() {
        return Err(AppError::from_http_status(response.status(), Some(response.body())));
    }
    Ok(Page::from_envelope(response.body(), R::ITEMS_KEY, requested_page)?)
}

impl<R: Resource> App for ListQuery<R> {
    type Event = ListEvent<R>;
    type Model = FetchSession<R::Item, R::Filters>;
    type ViewModel = ListViewModel<R::Item>;
    type Capabilities = Capabilities<ListEvent<R>>;

    fn update(&self, event: ListEvent<R>, model: &mut Self::Model, caps: &Capabilities<ListEvent<R>>) {
        if !model.is_active && !matches!(event, ListEvent::Mounted(_)) {
            debug!(resource = R::PATH, event = event.name(), "ignoring event while unmounted");
            return;
        }

        match event {
            ListEvent::Mounted(config) => {
                if model.is_active {
                    return;
                }
                // A remounted screen starts over; nothing from its last visit survives.
                *model = FetchSession {
                    config: Some(config),
                    is_active: true,
                    ..FetchSession::default()
                };
                Self::execute_fetch(model, PageRequest::first(), FetchStatus::Loading, caps);
            }

            ListEvent::Focused => {
                // The mount fetch covers the first appearance.
                if !model.has_fetched_once {
                    return;
                }
                Self::execute_fetch(model, PageRequest::first(), FetchStatus::Refreshing, caps);
            }

            ListEvent::Unmounted => {
                model.debounce.cancel(&caps.timer);
                if let Some(request_id) = model.in_flight.take() {
                    caps.http.cancel(request_id);
                }
                model.guard.invalidate();
                model.is_active = false;
            }

            ListEvent::SearchChanged(text) => {
                model.search_input = text;
                let delay = model
                    .config
                    .as_ref()
                    .map_or(Duration::from_millis(SEARCH_DEBOUNCE_MS), ClientConfig::search_debounce);
                model
                    .debounce
                    .schedule(&caps.timer, delay, |timer| ListEvent::SearchSettled { timer });
                caps.render.render();
            }

            ListEvent::SearchSettled { timer } => {
                if !model.debounce.settle(timer) {
                    debug!(resource = R::PATH, %timer, "ignoring superseded search timer");
                    return;
                }
                let search = normalize_search(&model.search_input);
                if search == model.params.search {
                    return;
                }
                model.params.search = search;
                model.page = 1;
                Self::execute_fetch(model, PageRequest::first(), FetchStatus::Loading, caps);
            }

            ListEvent::FiltersChanged(filters) => {
                if filters == model.params.filters {
                    return;
                }
                model.params.filters = filters;
                model.page = 1;
                Self::execute_fetch(model, PageRequest::first(), FetchStatus::Loading, caps);
            }

            ListEvent::EndReached => {
                if !can_load_more(model.status, model.pagination.as_ref()) {
                    return;
                }
                let Some(next) = model.pagination.and_then(|p| p.next_page()) else {
                    return;
                };
                let request = PageRequest {
                    page: next,
                    append: true,
                };
                Self::execute_fetch(model, request, FetchStatus::LoadingMore, caps);
            }

            ListEvent::Refresh => {
                Self::execute_fetch(model, PageRequest::first(), FetchStatus::Refreshing, caps);
            }

            ListEvent::Retry => {
                if model.status != FetchStatus::Error {
                    return;
                }
                let request = model.last_request.unwrap_or_else(PageRequest::first);
                let status = if request.append {
                    FetchStatus::LoadingMore
                } else {
                    FetchStatus::Loading
                };
                Self::execute_fetch(model, request, status, caps);
            }

            ListEvent::PageLoaded {
                token,
                request,
                result,
            } => {
                if Self::handle_page_loaded(model, token, request, *result) {
                    caps.render.render();
                }
            }
        }
    }

    fn view(&self, model: &Self::Model) -> ListViewModel<R::Item> {
        let empty_state = (model.has_fetched_once
            && model.status == FetchStatus::Idle
            && model.items.is_empty())
        .then(|| {
            let filtered = model.params.is_filtered();
            EmptyStateView {
                kind: if filtered {
                    EmptyState::NoMatches
                } else {
                    EmptyState::NoRecords
                },
                message: R::empty_copy(filtered).to_string(),
            }
        });

        ListViewModel {
            items: model.items.clone(),
            search_input: model.search_input.clone(),
            status: model.status,
            is_loading: model.status == FetchStatus::Loading,
            is_loading_more: model.status == FetchStatus::LoadingMore,
            is_refreshing: model.status == FetchStatus::Refreshing,
            error: model.error.clone(),
            can_load_more: can_load_more(model.status, model.pagination.as_ref()),
            total: model.pagination.map(|p| p.total),
            empty_state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{HttpOperation, TimerOperation, TimerOutput};
    use crate::resources::{ContactFilters, ContactKind, Contacts};
    use crate::testing::{
        connection_refused, contacts, http_request, json_response, list_page, Drained, ScreenTester,
    };
    use assert_matches::assert_matches;
    use crux_core::Request;
    use proptest::prelude::*;
    use serde_json::json;

    type Screen = ScreenTester<ListQuery<Contacts>>;
    type Fetch = Request<HttpOperation>;

    fn config() -> ClientConfig {
        ClientConfig::new("https://erp.example.com/api").unwrap()
    }

    fn single_fetch(drained: Drained) -> Fetch {
        assert_eq!(drained.fetches.len(), 1, "expected exactly one fetch");
        drained.fetches.into_iter().next().unwrap()
    }

    fn param(fetch: &Fetch, key: &str) -> Option<String> {
        http_request(fetch).and_then(|request| request.query_param(key))
    }

    fn mount(app: &mut Screen) -> Fetch {
        single_fetch(app.send(ListEvent::Mounted(config())))
    }

    fn page(ids: std::ops::Range<u64>, current: u32, last: u32, total: u64) -> HttpResult {
        json_response(200, &list_page("contacts", contacts(ids), current, last, total))
    }

    fn mounted_with_first_page(app: &mut Screen) {
        let fetch = mount(app);
        app.resolve(fetch, page(1..21, 1, 3, 45));
    }

    #[test]
    fn test_mount_fetches_first_page() {
        let mut app = Screen::new();
        let drained = app.send(ListEvent::Mounted(config()));
        assert!(drained.renders >= 1);
        let fetch = single_fetch(drained);

        assert_eq!(param(&fetch, "page").as_deref(), Some("1"));
        assert_eq!(param(&fetch, "per_page").as_deref(), Some("20"));
        assert_eq!(param(&fetch, "search"), None);
        assert!(app.view().is_loading);

        app.resolve(fetch, page(1..21, 1, 3, 45));
        let view = app.view();
        assert_eq!(view.items.len(), 20);
        assert_eq!(view.status, FetchStatus::Idle);
        assert_eq!(view.total, Some(45));
        assert!(view.can_load_more);
        assert!(view.empty_state.is_none());
    }

    #[test]
    fn test_events_before_mount_are_ignored() {
        let mut app = Screen::new();
        assert!(app.send(ListEvent::Refresh).is_quiet());
        assert!(app.send(ListEvent::SearchChanged("ali".into())).is_quiet());
        assert!(app.model.config.is_none());
        assert_eq!(app.view().search_input, "");
    }

    #[test]
    fn test_load_more_appends_second_page() {
        let mut app = Screen::new();
        mounted_with_first_page(&mut app);

        let fetch = single_fetch(app.send(ListEvent::EndReached));
        assert_eq!(param(&fetch, "page").as_deref(), Some("2"));
        assert!(app.view().is_loading_more);

        app.resolve(fetch, page(21..41, 2, 3, 45));
        assert_eq!(app.model.items.len(), 40);
        assert_eq!(app.model.items[20].id, 21);
        assert_eq!(app.model.pagination.map(|p| p.current_page), Some(2));
        assert_eq!(app.model.page, 2);
    }

    #[test]
    fn test_end_reached_is_ignored_while_loading_or_on_last_page() {
        let mut app = Screen::new();
        let first = mount(&mut app);
        // Before the first page lands.
        assert!(app.send(ListEvent::EndReached).fetches.is_empty());

        app.resolve(first, page(1..21, 1, 2, 30));
        let second = single_fetch(app.send(ListEvent::EndReached));
        // Second scroll while page 2 is in flight.
        assert!(app.send(ListEvent::EndReached).is_quiet());

        app.resolve(second, page(21..31, 2, 2, 30));
        assert!(!app.view().can_load_more);
        assert!(app.send(ListEvent::EndReached).is_quiet());
    }

    #[test]
    fn test_search_is_debounced_to_the_final_text() {
        let mut app = Screen::new();
        mounted_with_first_page(&mut app);

        let mut timers: Vec<Request<TimerOperation>> = Vec::new();
        for text in ["l", "la", "las"] {
            let drained = app.send(ListEvent::SearchChanged(text.into()));
            assert!(drained.fetches.is_empty());
            assert_eq!(drained.timers.len(), 1);
            let previous: Option<TimerId> = timers.last().map(|t| t.operation.id());
            assert_eq!(drained.timer_cancels, previous.into_iter().collect::<Vec<_>>());
            timers.extend(drained.timers);
        }
        assert_eq!(app.view().search_input, "las");

        // Superseded timers that fire anyway do nothing.
        let mut timers = timers.into_iter();
        let stale = timers.next().unwrap();
        assert!(app.resolve(stale, TimerOutput::Elapsed).is_quiet());

        let last = timers.last().unwrap();
        let fetch = single_fetch(app.resolve(last, TimerOutput::Elapsed));
        assert_eq!(param(&fetch, "search").as_deref(), Some("las"));
        assert_eq!(param(&fetch, "page").as_deref(), Some("1"));
    }

    #[test]
    fn test_search_window_follows_config() {
        let mut app = Screen::new();
        let mut slow = config();
        slow.search_debounce_ms = 1200;
        let first = single_fetch(app.send(ListEvent::Mounted(slow)));
        app.resolve(first, page(1..4, 1, 1, 3));

        let timer = app.send(ListEvent::SearchChanged("x".into())).timers.remove(0);
        assert_matches!(timer.operation, TimerOperation::Start { after_ms: 1200, .. });
    }

    #[test]
    fn test_settled_search_with_same_text_does_not_refetch() {
        let mut app = Screen::new();
        mounted_with_first_page(&mut app);

        let timer = app.send(ListEvent::SearchChanged("   ".into())).timers.remove(0);
        assert!(app.resolve(timer, TimerOutput::Elapsed).fetches.is_empty());
    }

    #[test]
    fn test_filter_change_resets_to_first_page() {
        let mut app = Screen::new();
        mounted_with_first_page(&mut app);
        let more = single_fetch(app.send(ListEvent::EndReached));
        app.resolve(more, page(21..41, 2, 3, 45));
        assert_eq!(app.model.page, 2);

        let filters = ContactFilters {
            kind: Some(ContactKind::Supplier),
        };
        let fetch = single_fetch(app.send(ListEvent::FiltersChanged(filters.clone())));
        assert_eq!(param(&fetch, "page").as_deref(), Some("1"));
        assert_eq!(param(&fetch, "kind").as_deref(), Some("supplier"));
        assert_eq!(app.model.page, 1);
        // Old rows stay until the new page lands.
        assert_eq!(app.model.items.len(), 40);

        app.resolve(fetch, page(100..105, 1, 1, 5));
        assert_eq!(app.model.items.len(), 5);
        assert_eq!(app.model.items[0].id, 100);

        // Same filters again: nothing to do.
        assert!(app.send(ListEvent::FiltersChanged(filters)).is_quiet());
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut app = Screen::new();
        mounted_with_first_page(&mut app);

        let slow = single_fetch(app.send(ListEvent::FiltersChanged(ContactFilters {
            kind: Some(ContactKind::Customer),
        })));
        let drained = app.send(ListEvent::FiltersChanged(ContactFilters {
            kind: Some(ContactKind::Employee),
        }));
        assert_eq!(drained.http_cancels.len(), 1);
        let fast = single_fetch(drained);

        app.resolve(fast, page(500..502, 1, 1, 2));
        let applied = app.view();

        assert!(app.resolve(slow, page(900..920, 1, 1, 20)).is_quiet());
        assert_eq!(app.view(), applied);
        assert_eq!(app.model.items[0].id, 500);
    }

    #[test]
    fn test_stale_failure_does_not_touch_error_state() {
        let mut app = Screen::new();
        mounted_with_first_page(&mut app);
        let stale = single_fetch(app.send(ListEvent::Refresh));
        let current = single_fetch(app.send(ListEvent::Refresh));

        app.resolve(current, page(1..21, 1, 3, 45));
        app.resolve(stale, connection_refused());
        assert_eq!(app.view().error, None);
        assert_eq!(app.view().status, FetchStatus::Idle);
    }

    #[test]
    fn test_focus_refresh_waits_for_first_success() {
        let mut app = Screen::new();
        let first = mount(&mut app);

        // Focus that accompanies the mount.
        assert!(app.send(ListEvent::Focused).is_quiet());

        app.resolve(first, page(1..21, 1, 3, 45));
        for _ in 0..2 {
            let fetch = single_fetch(app.send(ListEvent::Focused));
            assert_eq!(param(&fetch, "page").as_deref(), Some("1"));
            assert!(app.view().is_refreshing);
            app.resolve(fetch, page(1..21, 1, 3, 45));
        }
    }

    #[test]
    fn test_failure_shows_message_and_retry_reissues() {
        let mut app = Screen::new();
        let first = mount(&mut app);
        app.resolve(first, connection_refused());

        let view = app.view();
        assert_eq!(view.status, FetchStatus::Error);
        assert_eq!(view.error.as_deref(), Some(crate::NETWORK_ERROR_COPY));
        assert!(view.empty_state.is_none());

        // A failed first load never enables focus refresh.
        assert!(app.send(ListEvent::Focused).is_quiet());

        let retry = single_fetch(app.send(ListEvent::Retry));
        assert_eq!(param(&retry, "page").as_deref(), Some("1"));
        assert!(app.view().is_loading);
        app.resolve(retry, page(1..3, 1, 1, 2));
        assert_eq!(app.view().error, None);
        assert_eq!(app.view().items.len(), 2);
    }

    #[test]
    fn test_failed_load_more_keeps_items_and_retries_same_page() {
        let mut app = Screen::new();
        mounted_with_first_page(&mut app);
        let more = single_fetch(app.send(ListEvent::EndReached));
        app.resolve(more, json_response(500, &json!({"message": "Sunucu hatası"})));
        assert_eq!(app.view().items.len(), 20);
        assert_eq!(app.view().error.as_deref(), Some("Sunucu hatası"));

        let retry = single_fetch(app.send(ListEvent::Retry));
        assert_eq!(param(&retry, "page").as_deref(), Some("2"));
        // The list stays on screen with the footer spinner, not the full-screen one.
        let view = app.view();
        assert_eq!(view.status, FetchStatus::LoadingMore);
        assert!(view.is_loading_more);
        assert!(!view.is_loading);

        app.resolve(retry, page(21..41, 2, 3, 45));
        assert_eq!(app.model.items.len(), 40);
    }

    #[test]
    fn test_server_error_without_message_uses_screen_copy() {
        let mut app = Screen::new();
        let first = mount(&mut app);
        app.resolve(first, json_response(502, &json!({})));
        assert_eq!(
            app.view().error.as_deref(),
            Some("Kişiler yüklenirken bir hata oluştu.")
        );
    }

    #[test]
    fn test_empty_states() {
        let mut app = Screen::new();
        let first = mount(&mut app);
        assert!(app.view().empty_state.is_none());
        app.resolve(first, page(0..0, 1, 1, 0));
        assert_matches!(
            app.view().empty_state,
            Some(EmptyStateView { kind: EmptyState::NoRecords, .. })
        );

        let fetch = single_fetch(app.send(ListEvent::FiltersChanged(ContactFilters {
            kind: Some(ContactKind::Employee),
        })));
        app.resolve(fetch, page(0..0, 1, 1, 0));
        let empty = app.view().empty_state.unwrap();
        assert_eq!(empty.kind, EmptyState::NoMatches);
        assert_eq!(empty.message, "Aramanızla eşleşen kişi bulunamadı.");
    }

    #[test]
    fn test_unmount_cancels_and_blocks_writes() {
        let mut app = Screen::new();
        let fetch = mount(&mut app);
        let timer = app.send(ListEvent::SearchChanged("a".into())).timers.remove(0);

        let drained = app.send(ListEvent::Unmounted);
        assert_eq!(drained.timer_cancels.len(), 1);
        assert_eq!(drained.http_cancels.len(), 1);
        assert_eq!(drained.renders, 0);

        assert!(app.resolve(fetch, page(1..21, 1, 3, 45)).is_quiet());
        assert!(app.resolve(timer, TimerOutput::Elapsed).is_quiet());
        assert!(app.send(ListEvent::Refresh).is_quiet());
        assert!(app.model.items.is_empty());
        assert!(!app.model.is_active);
    }

    #[test]
    fn test_remount_starts_a_fresh_session() {
        let mut app = Screen::new();
        mounted_with_first_page(&mut app);
        let timer = app.send(ListEvent::SearchChanged("abc".into())).timers.remove(0);
        app.send(ListEvent::Unmounted);

        let refetch = single_fetch(app.send(ListEvent::Mounted(config())));
        assert_eq!(param(&refetch, "page").as_deref(), Some("1"));
        assert_eq!(param(&refetch, "search"), None);

        let view = app.view();
        assert!(view.items.is_empty());
        assert_eq!(view.search_input, "");
        assert!(view.is_loading);
        assert_eq!(view.total, None);

        // The new visit has not loaded anything yet, so focus waits for it.
        assert!(app.send(ListEvent::Focused).is_quiet());
        // A timer from the previous visit is not this session's.
        assert!(app.resolve(timer, TimerOutput::Elapsed).is_quiet());

        app.resolve(refetch, page(1..4, 1, 1, 3));
        assert_eq!(app.view().items.len(), 3);
    }

    #[test]
    fn test_mount_while_mounted_is_ignored() {
        let mut app = Screen::new();
        mounted_with_first_page(&mut app);
        assert!(app.send(ListEvent::Mounted(config())).is_quiet());
        assert_eq!(app.model.items.len(), 20);
    }

    #[test]
    fn test_missing_pagination_means_single_page() {
        let mut app = Screen::new();
        let first = mount(&mut app);
        app.resolve(
            first,
            json_response(200, &json!({"data": {"contacts": contacts(1..4)}})),
        );
        let view = app.view();
        assert_eq!(view.items.len(), 3);
        assert_eq!(view.total, Some(3));
        assert!(!view.can_load_more);
    }

    proptest! {
        #[test]
        fn only_the_last_issued_fetch_is_applied(
            filter_changes in 1usize..6,
            seed in any::<u64>(),
        ) {
            let mut app = Screen::new();
            let mut pending = vec![(0u64, mount(&mut app))];
            let kinds = [ContactKind::Customer, ContactKind::Supplier, ContactKind::Employee];
            for i in 0..filter_changes {
                let filters = ContactFilters { kind: Some(kinds[i % kinds.len()]) };
                let fetch = single_fetch(app.send(ListEvent::FiltersChanged(filters)));
                pending.push(((i as u64 + 1) * 1000, fetch));
            }
            let last_base = (filter_changes as u64) * 1000;

            // Complete in an arbitrary order derived from the seed.
            let mut state = seed;
            while !pending.is_empty() {
                state = state
                    .wrapping_mul(6_364_136_223_846_793_005)
                    .wrapping_add(1_442_695_040_888_963_407);
                let idx = usize::try_from(state >> 33).unwrap() % pending.len();
                let (base, fetch) = pending.swap_remove(idx);
                app.resolve(fetch, page(base..base + 3, 1, 1, 3));
            }

            prop_assert_eq!(app.model.status, FetchStatus::Idle);
            prop_assert_eq!(app.model.items.len(), 3);
            prop_assert_eq!(app.model.items[0].id, last_base);
        }
    }
}
