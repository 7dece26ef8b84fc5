//! Single-record screens: fetch one resource by id, refresh on focus.

use std::fmt;
use std::marker::PhantomData;

use crux_core::App;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::capabilities::{Capabilities, HttpResult};
use crate::config::ClientConfig;
use crate::endpoints::{self, decode_record};
use crate::guard::{RequestGuard, RequestToken};
use crate::resources::Resource;
use crate::AppError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DetailStatus {
    #[default]
    Idle,
    Loading,
    Error,
}

#[derive(Debug, Clone)]
pub struct DetailSession<T> {
    pub config: Option<ClientConfig>,
    pub guard: RequestGuard,
    pub id: Option<u64>,
    pub record: Option<T>,
    pub status: DetailStatus,
    pub error: Option<String>,
    pub is_active: bool,
    pub has_fetched_once: bool,
    pub in_flight: Option<String>,
}

impl<T> Default for DetailSession<T> {
    fn default() -> Self {
        Self {
            config: None,
            guard: RequestGuard::new(),
            id: None,
            record: None,
            status: DetailStatus::Idle,
            error: None,
            is_active: false,
            has_fetched_once: false,
            in_flight: None,
        }
    }
}

pub enum DetailEvent {
    Mounted(ClientConfig),
    /// Shows record `id`, or switches the screen to another record.
    Load { id: u64 },
    Focused,
    Retry,
    Unmounted,

    Loaded {
        token: RequestToken,
        result: Box<HttpResult>,
    },
}

impl fmt::Debug for DetailEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mounted(_) => f.write_str("Mounted"),
            Self::Load { id } => f.debug_struct("Load").field("id", id).finish(),
            Self::Focused => f.write_str("Focused"),
            Self::Retry => f.write_str("Retry"),
            Self::Unmounted => f.write_str("Unmounted"),
            Self::Loaded { token, result } => f
                .debug_struct("Loaded")
                .field("token", token)
                .field("ok", &result.is_ok())
                .finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailViewModel<T> {
    pub record: Option<T>,
    pub status: DetailStatus,
    pub is_loading: bool,
    pub error: Option<String>,
}

pub struct DetailQuery<R: Resource> {
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Default for DetailQuery<R> {
    fn default() -> Self {
        Self {
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> DetailQuery<R> {
    fn fetch(session: &mut DetailSession<R::Item>, id: u64, caps: &Capabilities<DetailEvent>) {
        let Some(config) = session.config.as_ref() else {
            warn!(resource = R::PATH, id, "record requested before the screen was configured");
            return;
        };
        let built = endpoints::detail_request::<R>(config, id);

        if let Some(previous) = session.in_flight.take() {
            caps.http.cancel(previous);
        }
        let token = session.guard.begin();

        let request = match built {
            Ok(r) => r,
            Err(e) => {
                warn!(resource = R::PATH, id, error = %e, "could not build detail request");
                session.guard.invalidate();
                session.error = Some(AppError::from(e).user_facing_message(R::load_error_copy()));
                session.status = DetailStatus::Error;
                caps.render.render();
                return;
            }
        };

        info!(resource = R::PATH, id, token = token.value(), "fetching record");
        session.in_flight = Some(request.request_id().to_string());
        session.status = DetailStatus::Loading;
        caps.http.send(request, move |result| DetailEvent::Loaded {
            token,
            result: Box::new(result),
        });
        caps.render.render();
    }
}

fn decode<R: Resource>(result: HttpResult) -> Result<R::Item, AppError> {
    let response = result?;
    if !response.is_success() {
        return Err(AppError::from_http_status(response.status(), Some(response.body())));
    }
    Ok(decode_record(response.body())?)
}

impl<R: Resource> App for DetailQuery<R> {
    type Event = DetailEvent;
    type Model = DetailSession<R::Item>;
    type ViewModel = DetailViewModel<R::Item>;
    type Capabilities = Capabilities<DetailEvent>;

    fn update(&self, event: DetailEvent, model: &mut Self::Model, caps: &Capabilities<DetailEvent>) {
        if !model.is_active && !matches!(event, DetailEvent::Mounted(_)) {
            debug!(resource = R::PATH, ?event, "ignoring event while unmounted");
            return;
        }

        match event {
            DetailEvent::Mounted(config) => {
                if model.is_active {
                    return;
                }
                *model = DetailSession {
                    config: Some(config),
                    is_active: true,
                    ..DetailSession::default()
                };
            }

            DetailEvent::Load { id } => {
                if model.id != Some(id) {
                    model.record = None;
                    model.has_fetched_once = false;
                    model.error = None;
                }
                model.id = Some(id);
                Self::fetch(model, id, caps);
            }

            DetailEvent::Focused => {
                if !model.has_fetched_once {
                    return;
                }
                if let Some(id) = model.id {
                    Self::fetch(model, id, caps);
                }
            }

            DetailEvent::Retry => {
                if model.status != DetailStatus::Error {
                    return;
                }
                if let Some(id) = model.id {
                    Self::fetch(model, id, caps);
                }
            }

            DetailEvent::Unmounted => {
                if let Some(request_id) = model.in_flight.take() {
                    caps.http.cancel(request_id);
                }
                model.guard.invalidate();
                model.is_active = false;
            }

            DetailEvent::Loaded { token, result } => {
                if !model.guard.is_current(token) {
                    debug!(resource = R::PATH, token = token.value(), "dropping stale record response");
                    return;
                }
                model.in_flight = None;
                match decode::<R>(*result) {
                    Ok(record) => {
                        model.record = Some(record);
                        model.error = None;
                        model.status = DetailStatus::Idle;
                        model.has_fetched_once = true;
                    }
                    Err(e) => {
                        warn!(resource = R::PATH, error = %e, "record fetch failed");
                        model.error = Some(e.user_facing_message(R::load_error_copy()));
                        model.status = DetailStatus::Error;
                    }
                }
                caps.render.render();
            }
        }
    }

    fn view(&self, model: &Self::Model) -> DetailViewModel<R::Item> {
        DetailViewModel {
            record: model.record.clone(),
            status: model.status,
            is_loading: model.status == DetailStatus::Loading,
            error: model.error.clone(),
        }
    }
}
