//! A tokio shell for one screen: executes the core's effects and publishes
//! its view model.
//!
//! Events are processed strictly one at a time. HTTP requests and timers run
//! as separate tasks whose answers are fed back through the same loop. A
//! cancelled request or timer has its task aborted and is answered on the
//! spot, so a cancelled timer never fires.

mod client;

pub use self::client::ApiClient;
#[cfg(feature = "http-client")]
pub use self::client::ReqwestClient;

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use crux_core::{App, Core, Request, WithContext};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::capabilities::{
    Effect, HttpError, HttpOperation, HttpResult, TimerId, TimerOperation, TimerOutput,
};
use crate::{AppError, ErrorKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShellError {
    #[error("screen runtime has shut down")]
    Closed,
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl From<ShellError> for AppError {
    fn from(e: ShellError) -> Self {
        AppError::new(ErrorKind::Unknown, e.to_string())
    }
}

/// Handle to a running screen. Dropping it stops the screen and aborts every
/// request and timer it still has outstanding.
pub struct ScreenHandle<A: App> {
    events: mpsc::UnboundedSender<A::Event>,
    views: watch::Receiver<A::ViewModel>,
    task: JoinHandle<()>,
}

impl<A> ScreenHandle<A>
where
    A: App,
    A::ViewModel: Clone,
{
    pub fn send(&self, event: A::Event) -> Result<(), ShellError> {
        self.events.send(event).map_err(|_| ShellError::Closed)
    }

    /// Latest published view.
    #[must_use]
    pub fn view(&self) -> A::ViewModel {
        self.views.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<A::ViewModel> {
        self.views.clone()
    }

    /// Waits for the next published view.
    pub async fn changed(&mut self) -> Result<A::ViewModel, ShellError> {
        self.views.changed().await.map_err(|_| ShellError::Closed)?;
        Ok(self.views.borrow_and_update().clone())
    }

    /// Waits until a published view satisfies `predicate`.
    pub async fn wait_until<F>(&mut self, predicate: F) -> Result<A::ViewModel, ShellError>
    where
        F: Fn(&A::ViewModel) -> bool,
    {
        loop {
            {
                let current = self.views.borrow_and_update();
                if predicate(&current) {
                    return Ok(current.clone());
                }
            }
            self.views.changed().await.map_err(|_| ShellError::Closed)?;
        }
    }

    pub fn shutdown(self) {
        self.task.abort();
    }
}

impl<A: App> Drop for ScreenHandle<A> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub struct ScreenRuntime;

impl ScreenRuntime {
    /// Starts a fresh `A` core on the current tokio runtime.
    pub fn spawn<A>(client: Arc<dyn ApiClient>) -> ScreenHandle<A>
    where
        A: App + Send + Sync + 'static,
        A::Capabilities: WithContext<A, Effect> + Send + Sync + 'static,
        A::Model: Send + Sync + 'static,
        A::ViewModel: Clone + Send + Sync + 'static,
    {
        let core: Core<Effect, A> = Core::new::<A::Capabilities>();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(core.view());

        let task = tokio::spawn(run(core, client, event_rx, view_tx));

        ScreenHandle {
            events: event_tx,
            views: view_rx,
            task,
        }
    }
}

async fn run<A>(
    core: Core<Effect, A>,
    client: Arc<dyn ApiClient>,
    mut events: mpsc::UnboundedReceiver<A::Event>,
    views: watch::Sender<A::ViewModel>,
) where
    A: App + Send + Sync + 'static,
    A::Capabilities: Send + Sync + 'static,
    A::Model: Send + Sync + 'static,
    A::ViewModel: Clone + Send + Sync + 'static,
{
    let (answers_tx, mut answers) = mpsc::unbounded_channel();
    let mut tasks = EffectTasks::new(client, answers_tx);

    loop {
        let effects = tokio::select! {
            Some(answer) = answers.recv() => tasks.answer(&core, answer),
            next = events.recv() => match next {
                Some(event) => core.process_event(event),
                None => break,
            },
        };

        if tasks.dispatch(&core, effects) {
            views.send_replace(core.view());
        }
    }

    debug!("screen event channel closed; stopping");
}

/// What a finished effect task reports back to the loop.
enum Answer {
    Http { request_id: String, result: HttpResult },
    Timer { id: TimerId },
}

/// Effect requests the shell still owes an answer, with the task working on
/// each. Tasks are aborted on cancel and on drop.
struct EffectTasks {
    client: Arc<dyn ApiClient>,
    answers: mpsc::UnboundedSender<Answer>,
    http: HashMap<String, (Request<HttpOperation>, JoinHandle<()>)>,
    timers: HashMap<TimerId, (Request<TimerOperation>, JoinHandle<()>)>,
}

impl EffectTasks {
    fn new(client: Arc<dyn ApiClient>, answers: mpsc::UnboundedSender<Answer>) -> Self {
        Self {
            client,
            answers,
            http: HashMap::new(),
            timers: HashMap::new(),
        }
    }

    /// Resolves the request `answer` belongs to. Answers for requests that
    /// were cancelled in the meantime have nothing left to resolve.
    fn answer<A: App>(&mut self, core: &Core<Effect, A>, answer: Answer) -> Vec<Effect> {
        match answer {
            Answer::Http { request_id, result } => match self.http.remove(&request_id) {
                Some((mut request, _)) => core.resolve(&mut request, result),
                None => Vec::new(),
            },
            Answer::Timer { id } => match self.timers.remove(&id) {
                Some((mut request, _)) => core.resolve(&mut request, TimerOutput::Elapsed),
                None => Vec::new(),
            },
        }
    }

    /// Starts or cancels tasks for `effects`; returns whether a render was
    /// requested.
    fn dispatch<A: App>(&mut self, core: &Core<Effect, A>, effects: Vec<Effect>) -> bool {
        let mut queue = VecDeque::from(effects);
        let mut render = false;

        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Render(_) => render = true,

                Effect::Http(request) => match request.operation.clone() {
                    HttpOperation::Execute(http_request) => {
                        let request_id = http_request.request_id().to_string();
                        let client = Arc::clone(&self.client);
                        let answers = self.answers.clone();
                        trace!(%request_id, url = http_request.url().as_str(), "starting request");
                        let task = tokio::spawn({
                            let request_id = request_id.clone();
                            async move {
                                let result = client.execute(http_request).await;
                                // The loop is gone if this fails; nothing left to tell.
                                let _ = answers.send(Answer::Http { request_id, result });
                            }
                        });
                        self.http.insert(request_id, (request, task));
                    }
                    HttpOperation::Cancel { request_id } => {
                        if let Some((mut pending, task)) = self.http.remove(&request_id) {
                            debug!(%request_id, "aborting request");
                            task.abort();
                            let cancelled = Err(HttpError::Cancelled { request_id });
                            queue.extend(core.resolve(&mut pending, cancelled));
                        }
                    }
                },

                Effect::Timer(request) => match request.operation {
                    TimerOperation::Start { id, after_ms } => {
                        let answers = self.answers.clone();
                        let task = tokio::spawn(async move {
                            tokio::time::sleep(Duration::from_millis(after_ms)).await;
                            let _ = answers.send(Answer::Timer { id });
                        });
                        if let Some((_, previous)) = self.timers.insert(id, (request, task)) {
                            previous.abort();
                        }
                    }
                    TimerOperation::Cancel { id } => {
                        if let Some((mut pending, task)) = self.timers.remove(&id) {
                            trace!(%id, "aborting timer");
                            task.abort();
                            queue.extend(core.resolve(&mut pending, TimerOutput::Cleared));
                        }
                    }
                },
            }
        }

        render
    }
}

impl Drop for EffectTasks {
    fn drop(&mut self) {
        for (_, (_, task)) in self.http.drain() {
            task.abort();
        }
        for (_, (_, task)) in self.timers.drain() {
            task.abort();
        }
    }
}
