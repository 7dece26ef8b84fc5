//! Drives a screen core through [`AppTester`] the way a shell would: every
//! event a resolved request produces is fed straight back into the app, and
//! the resulting effects are sorted by kind.

use crux_core::capability::Operation;
use crux_core::testing::{AppTester, Update};
use crux_core::{App, Request, WithContext};
use serde_json::{json, Value};

use crate::capabilities::{
    Effect, HttpError, HttpHeaders, HttpOperation, HttpRequest, HttpResponse, HttpResult,
    TimerId, TimerOperation,
};

pub struct ScreenTester<A: App> {
    app: AppTester<A, Effect>,
    pub model: A::Model,
}

impl<A> Default for ScreenTester<A>
where
    A: App,
    A::Capabilities: WithContext<A, Effect>,
    A::Model: Default,
{
    fn default() -> Self {
        Self {
            app: AppTester::default(),
            model: A::Model::default(),
        }
    }
}

impl<A> ScreenTester<A>
where
    A: App,
    A::Capabilities: WithContext<A, Effect>,
    A::Model: Default,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send(&mut self, event: A::Event) -> Drained {
        let update = self.app.update(event, &mut self.model);
        self.settle(update)
    }

    /// Answers `request` as the shell would.
    ///
    /// # Panics
    /// If `request` is a notification, which has nothing to answer.
    pub fn resolve<Op: Operation>(&mut self, mut request: Request<Op>, output: Op::Output) -> Drained {
        let update = self
            .app
            .resolve(&mut request, output)
            .expect("request should expect an answer");
        self.settle(update)
    }

    #[must_use]
    pub fn view(&self) -> A::ViewModel {
        self.app.view(&self.model)
    }

    fn settle(&mut self, update: Update<Effect, A::Event>) -> Drained {
        let mut drained = Drained::from_effects(update.effects);
        for event in update.events {
            drained.extend(self.send(event));
        }
        drained
    }
}

/// Effects from one step, sorted by kind.
#[derive(Default)]
pub struct Drained {
    pub fetches: Vec<Request<HttpOperation>>,
    pub http_cancels: Vec<String>,
    pub timers: Vec<Request<TimerOperation>>,
    pub timer_cancels: Vec<TimerId>,
    pub renders: usize,
}

impl Drained {
    #[must_use]
    pub fn from_effects(effects: Vec<Effect>) -> Self {
        let mut drained = Self::default();
        for effect in effects {
            match effect {
                Effect::Http(request) => match &request.operation {
                    HttpOperation::Cancel { request_id } => {
                        drained.http_cancels.push(request_id.clone());
                    }
                    HttpOperation::Execute(_) => drained.fetches.push(request),
                },
                Effect::Timer(request) => match request.operation {
                    TimerOperation::Cancel { id } => drained.timer_cancels.push(id),
                    TimerOperation::Start { .. } => drained.timers.push(request),
                },
                Effect::Render(_) => drained.renders += 1,
            }
        }
        drained
    }

    fn extend(&mut self, other: Drained) {
        self.fetches.extend(other.fetches);
        self.http_cancels.extend(other.http_cancels);
        self.timers.extend(other.timers);
        self.timer_cancels.extend(other.timer_cancels);
        self.renders += other.renders;
    }

    /// The outgoing HTTP requests, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<&HttpRequest> {
        self.fetches.iter().filter_map(http_request).collect()
    }

    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.fetches.is_empty()
            && self.http_cancels.is_empty()
            && self.timers.is_empty()
            && self.timer_cancels.is_empty()
            && self.renders == 0
    }
}

/// The request an HTTP effect asks for, if it is not a cancellation.
#[must_use]
pub fn http_request(request: &Request<HttpOperation>) -> Option<&HttpRequest> {
    match &request.operation {
        HttpOperation::Execute(request) => Some(request),
        HttpOperation::Cancel { .. } => None,
    }
}

#[must_use]
pub fn json_response(status: u16, body: &Value) -> HttpResult {
    let headers = HttpHeaders::from(vec![(
        "content-type".to_string(),
        "application/json".to_string(),
    )]);
    Ok(HttpResponse::new(
        status,
        headers,
        body.to_string().into_bytes(),
        "test-response".to_string(),
        1,
    ))
}

#[must_use]
pub fn empty_response(status: u16) -> HttpResult {
    Ok(HttpResponse::new(
        status,
        HttpHeaders::new(),
        Vec::new(),
        "test-response".to_string(),
        1,
    ))
}

#[must_use]
pub fn connection_refused() -> HttpResult {
    Err(HttpError::ConnectionError {
        host: "erp.example.com".to_string(),
        message: "connection refused".to_string(),
    })
}

/// A list envelope as the API returns it.
#[must_use]
pub fn list_page(items_key: &str, items: Vec<Value>, current_page: u32, last_page: u32, total: u64) -> Value {
    json!({
        "data": {
            items_key: items,
            "pagination": {
                "current_page": current_page,
                "last_page": last_page,
                "total": total
            }
        }
    })
}

/// Contact records with sequential ids, named after their id.
#[must_use]
pub fn contacts(ids: std::ops::Range<u64>) -> Vec<Value> {
    ids.map(|id| json!({"id": id, "name": format!("Kişi {id}")})).collect()
}
