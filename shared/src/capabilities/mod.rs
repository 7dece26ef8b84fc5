mod http;
mod timer;

pub use self::http::{
    Http, HttpError, HttpHeaders, HttpMethod, HttpOperation, HttpRequest, HttpResponse,
    HttpResult, ValidatedUrl, DEFAULT_TIMEOUT_MS, MAX_TIMEOUT_MS,
};
pub use self::timer::{Timer, TimerId, TimerOperation, TimerOutput};
pub use crux_core::render::{Render, RenderOperation};

use crux_core::bridge::ResolveSerialized;
use crux_core::capability::ProtoContext;
use crux_core::{Request, WithContext};
use serde::Serialize;

/// Side effects requested by a screen core. The shell executes them and
/// resolves each request back into the core.
///
/// Written out by hand: the screens are generic over their resource and
/// `#[derive(Effect)]` only accepts one concrete app.
#[derive(Debug)]
pub enum Effect {
    Http(Request<HttpOperation>),
    Timer(Request<TimerOperation>),
    Render(Request<RenderOperation>),
}

/// What a foreign shell sees of an [`Effect`].
#[derive(Debug, Serialize)]
#[serde(rename = "Effect")]
pub enum EffectFfi {
    Http(HttpOperation),
    Timer(TimerOperation),
    Render(RenderOperation),
}

impl crux_core::Effect for Effect {
    type Ffi = EffectFfi;

    fn serialize(self) -> (Self::Ffi, ResolveSerialized) {
        match self {
            Effect::Http(request) => request.serialize(EffectFfi::Http),
            Effect::Timer(request) => request.serialize(EffectFfi::Timer),
            Effect::Render(request) => request.serialize(EffectFfi::Render),
        }
    }
}

pub type AppHttp<Ev> = Http<Ev>;
pub type AppTimer<Ev> = Timer<Ev>;
pub type AppRender<Ev> = Render<Ev>;

pub struct Capabilities<Ev> {
    pub http: AppHttp<Ev>,
    pub timer: AppTimer<Ev>,
    pub render: AppRender<Ev>,
}

impl<A, Ev> WithContext<A, Effect> for Capabilities<Ev>
where
    A: crux_core::App<Event = Ev, Capabilities = Capabilities<Ev>>,
    Ev: Send + 'static,
{
    fn new_with_context(context: ProtoContext<Effect, Ev>) -> Capabilities<Ev> {
        Capabilities {
            http: Http::new(context.specialize(Effect::Http)),
            timer: Timer::new(context.specialize(Effect::Timer)),
            render: Render::new(context.specialize(Effect::Render)),
        }
    }
}
