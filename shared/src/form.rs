//! Create/update/delete screens: client-side validation, submission and
//! mapping of the server's validation envelope onto form fields.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use crux_core::App;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::capabilities::{Capabilities, HttpError, HttpRequest, HttpResult};
use crate::config::ClientConfig;
use crate::endpoints::{self, decode_record};
use crate::guard::{RequestGuard, RequestToken};
use crate::resources::Editable;
use crate::{AppError, ErrorKind};

/// Field name to the first message reported for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the first message per field.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.0.remove(field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

pub trait Validate {
    /// Every failing field is reported, not just the first.
    fn validate(&self) -> FieldErrors;
}

/// `{ message?: string, errors: { <field>: string[] } }`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ValidationEnvelope {
    #[serde(default)]
    pub message: Option<String>,
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ValidationEnvelope {
    #[must_use]
    pub fn parse(body: &[u8]) -> Option<Self> {
        serde_json::from_slice(body).ok()
    }

    #[must_use]
    pub fn field_errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for (field, messages) in &self.errors {
            if let Some(first) = messages.iter().find(|m| !m.trim().is_empty()) {
                errors.insert(field.clone(), first.clone());
            }
        }
        errors
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubmitTarget {
    Create,
    Update(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormAction {
    Save,
    Delete,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormStatus {
    #[default]
    Editing,
    Submitting,
    Deleting,
    Saved,
    Deleted,
    Failed,
}

impl FormStatus {
    #[must_use]
    pub const fn is_busy(self) -> bool {
        matches!(self, Self::Submitting | Self::Deleting)
    }
}

#[derive(Debug, Clone)]
pub struct FormSession<T> {
    pub config: Option<ClientConfig>,
    pub guard: RequestGuard,
    pub status: FormStatus,
    pub field_errors: FieldErrors,
    /// Banner message for failures that are not tied to a field.
    pub error: Option<String>,
    pub saved: Option<T>,
    pub is_active: bool,
    pub in_flight: Option<String>,
}

impl<T> Default for FormSession<T> {
    fn default() -> Self {
        Self {
            config: None,
            guard: RequestGuard::new(),
            status: FormStatus::Editing,
            field_errors: FieldErrors::new(),
            error: None,
            saved: None,
            is_active: false,
            in_flight: None,
        }
    }
}

pub enum FormEvent<R: Editable> {
    Mounted(ClientConfig),
    Submit {
        draft: R::Draft,
        target: SubmitTarget,
    },
    Delete {
        id: u64,
    },
    /// The user touched a field; its inline error goes away.
    FieldEdited {
        field: String,
    },
    Reset,
    Unmounted,

    Completed {
        token: RequestToken,
        action: FormAction,
        result: Box<HttpResult>,
    },
}

impl<R: Editable> fmt::Debug for FormEvent<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mounted(_) => f.write_str("Mounted"),
            Self::Submit { draft, target } => f
                .debug_struct("Submit")
                .field("draft", draft)
                .field("target", target)
                .finish(),
            Self::Delete { id } => f.debug_struct("Delete").field("id", id).finish(),
            Self::FieldEdited { field } => {
                f.debug_struct("FieldEdited").field("field", field).finish()
            }
            Self::Reset => f.write_str("Reset"),
            Self::Unmounted => f.write_str("Unmounted"),
            Self::Completed {
                token,
                action,
                result,
            } => f
                .debug_struct("Completed")
                .field("token", token)
                .field("action", action)
                .field("ok", &result.is_ok())
                .finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormViewModel<T> {
    pub status: FormStatus,
    pub is_busy: bool,
    pub field_errors: FieldErrors,
    pub error: Option<String>,
    pub saved: Option<T>,
}

pub struct MutationForm<R: Editable> {
    _resource: PhantomData<fn() -> R>,
}

impl<R: Editable> Default for MutationForm<R> {
    fn default() -> Self {
        Self {
            _resource: PhantomData,
        }
    }
}

impl<R: Editable> MutationForm<R> {
    fn send(
        session: &mut FormSession<R::Item>,
        built: Result<HttpRequest, HttpError>,
        action: FormAction,
        caps: &Capabilities<FormEvent<R>>,
    ) {
        let request = match built {
            Ok(r) => r,
            Err(e) => {
                warn!(resource = R::PATH, error = %e, "could not build mutation request");
                session.error = Some(AppError::from(e).user_facing_message(failure_copy::<R>(action)));
                session.status = FormStatus::Failed;
                caps.render.render();
                return;
            }
        };

        let token = session.guard.begin();
        info!(resource = R::PATH, ?action, method = request.method().as_str(), "submitting");
        session.in_flight = Some(request.request_id().to_string());
        session.status = match action {
            FormAction::Save => FormStatus::Submitting,
            FormAction::Delete => FormStatus::Deleting,
        };
        session.error = None;
        caps.http.send(request, move |result| FormEvent::Completed {
            token,
            action,
            result: Box::new(result),
        });
        caps.render.render();
    }

    fn complete(session: &mut FormSession<R::Item>, action: FormAction, result: HttpResult) {
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!(resource = R::PATH, ?action, error = %e, "mutation failed");
                session.error = Some(AppError::from(e).user_facing_message(failure_copy::<R>(action)));
                session.status = FormStatus::Failed;
                return;
            }
        };

        if response.is_success() {
            match action {
                FormAction::Delete => {
                    session.saved = None;
                    session.status = FormStatus::Deleted;
                }
                FormAction::Save => match decode_record::<R::Item>(response.body()) {
                    Ok(record) => {
                        session.saved = Some(record);
                        session.status = FormStatus::Saved;
                    }
                    Err(e) => {
                        warn!(resource = R::PATH, error = %e, "saved record could not be decoded");
                        session.error = Some(AppError::from(e).user_facing_message(R::save_error_copy()));
                        session.status = FormStatus::Failed;
                    }
                },
            }
            return;
        }

        let error = AppError::from_http_status(response.status(), Some(response.body()));
        if error.kind == ErrorKind::Validation {
            if let Some(envelope) = ValidationEnvelope::parse(response.body()) {
                session.field_errors = envelope.field_errors();
                session.error = envelope.message.filter(|m| !m.trim().is_empty());
                session.status = FormStatus::Editing;
                return;
            }
        }
        warn!(resource = R::PATH, ?action, status = response.status(), "mutation rejected");
        session.error = Some(error.user_facing_message(failure_copy::<R>(action)));
        session.status = FormStatus::Failed;
    }
}

fn failure_copy<R: Editable>(action: FormAction) -> &'static str {
    match action {
        FormAction::Save => R::save_error_copy(),
        FormAction::Delete => R::delete_error_copy(),
    }
}

impl<R: Editable> App for MutationForm<R> {
    type Event = FormEvent<R>;
    type Model = FormSession<R::Item>;
    type ViewModel = FormViewModel<R::Item>;
    type Capabilities = Capabilities<FormEvent<R>>;

    fn update(&self, event: FormEvent<R>, model: &mut Self::Model, caps: &Capabilities<FormEvent<R>>) {
        if !model.is_active && !matches!(event, FormEvent::Mounted(_)) {
            debug!(resource = R::PATH, "ignoring form event while unmounted");
            return;
        }

        match event {
            FormEvent::Mounted(config) => {
                if model.is_active {
                    return;
                }
                *model = FormSession {
                    config: Some(config),
                    is_active: true,
                    ..FormSession::default()
                };
                caps.render.render();
            }

            FormEvent::Submit { draft, target } => {
                if model.status.is_busy() {
                    debug!(resource = R::PATH, "submit ignored while a request is running");
                    return;
                }
                let errors = draft.validate();
                if !errors.is_empty() {
                    model.field_errors = errors;
                    model.error = None;
                    model.status = FormStatus::Editing;
                    caps.render.render();
                    return;
                }
                let Some(config) = model.config.as_ref() else {
                    return;
                };
                let built = match target {
                    SubmitTarget::Create => endpoints::create_request::<R>(config, &draft),
                    SubmitTarget::Update(id) => endpoints::update_request::<R>(config, id, &draft),
                };
                model.field_errors = FieldErrors::new();
                Self::send(model, built, FormAction::Save, caps);
            }

            FormEvent::Delete { id } => {
                if model.status.is_busy() {
                    return;
                }
                let Some(config) = model.config.as_ref() else {
                    return;
                };
                let built = endpoints::delete_request::<R>(config, id);
                Self::send(model, built, FormAction::Delete, caps);
            }

            FormEvent::FieldEdited { field } => {
                if model.field_errors.remove(&field).is_some() {
                    caps.render.render();
                }
            }

            FormEvent::Reset => {
                if let Some(request_id) = model.in_flight.take() {
                    caps.http.cancel(request_id);
                }
                model.guard.invalidate();
                model.status = FormStatus::Editing;
                model.field_errors = FieldErrors::new();
                model.error = None;
                model.saved = None;
                caps.render.render();
            }

            FormEvent::Unmounted => {
                if let Some(request_id) = model.in_flight.take() {
                    caps.http.cancel(request_id);
                }
                model.guard.invalidate();
                model.is_active = false;
            }

            FormEvent::Completed {
                token,
                action,
                result,
            } => {
                if !model.guard.is_current(token) {
                    debug!(resource = R::PATH, token = token.value(), "dropping stale mutation response");
                    return;
                }
                model.in_flight = None;
                Self::complete(model, action, *result);
                caps.render.render();
            }
        }
    }

    fn view(&self, model: &Self::Model) -> FormViewModel<R::Item> {
        FormViewModel {
            status: model.status,
            is_busy: model.status.is_busy(),
            field_errors: model.field_errors.clone(),
            error: model.error.clone(),
            saved: model.saved.clone(),
        }
    }
}
