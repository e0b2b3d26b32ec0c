// Client side of the `/invoke` route convention
mod dispatcher;
mod endpoint;
mod pipeline;
mod remote;

pub use dispatcher::{extract_output, DispatchOutcome, Dispatcher, DispatcherConfig, FALLBACK_MESSAGE};
pub use endpoint::EndpointIdentity;
pub use pipeline::PromptPipeline;
pub use remote::RemoteRunnable;
