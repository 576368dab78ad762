//! Server-push live refresh.
//!
//! - [`sse`]: incremental `text/event-stream` decoding
//! - [`event`]: the typed `{type, entityId, payload}` envelope
//! - [`subscriber`]: connection lifecycle and relevance-filtered refresh

pub mod event;
pub mod sse;
pub mod subscriber;

pub use event::{EventKind, LiveEvent};
pub use sse::{SseDecoder, SseFrame};
pub use subscriber::{LiveRefresh, LiveRefreshBuilder, LiveState, RefreshTarget};
