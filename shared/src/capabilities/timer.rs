use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Identifies one armed timer within a core instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(pub u64);

impl std::fmt::Display for TimerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerOperation {
    Start { id: TimerId, after_ms: u64 },
    /// A cancelled timer must never fire.
    Cancel { id: TimerId },
}

impl TimerOperation {
    pub fn id(&self) -> TimerId {
        match self {
            Self::Start { id, .. } | Self::Cancel { id } => *id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerOutput {
    Elapsed,
    /// The shell dropped the timer after a cancel; the app hears nothing.
    Cleared,
}

impl Operation for TimerOperation {
    type Output = TimerOutput;
}

pub struct Timer<Ev> {
    context: CapabilityContext<TimerOperation, Ev>,
    next_id: Arc<AtomicU64>,
}

impl<Ev> Capability<Ev> for Timer<Ev> {
    type Operation = TimerOperation;
    type MappedSelf<MappedEv> = Timer<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Timer {
            context: self.context.map_event(f),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

impl<Ev> Timer<Ev>
where
    Ev: Send + 'static,
{
    pub fn new(context: CapabilityContext<TimerOperation, Ev>) -> Self {
        Self {
            context,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Arms a one-shot timer. `callback` receives the id so the app can tell a
    /// current timer from a superseded one.
    pub fn start<F>(&self, after: Duration, callback: F) -> TimerId
    where
        F: FnOnce(TimerId) -> Ev + Send + 'static,
    {
        let id = TimerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let after_ms = u64::try_from(after.as_millis()).unwrap_or(u64::MAX);

        let ctx = self.context.clone();
        self.context.spawn(async move {
            let output = ctx
                .request_from_shell(TimerOperation::Start { id, after_ms })
                .await;
            if output == TimerOutput::Elapsed {
                ctx.update_app(callback(id));
            }
        });

        id
    }

    pub fn cancel(&self, id: TimerId) {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            ctx.notify_shell(TimerOperation::Cancel { id }).await;
        });
    }
}
