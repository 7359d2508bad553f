//! Software render sink for the Clarity overlay
//!
//! Rasterizes composed instance batches with `tiny-skia`. Hosts with a GPU
//! pipeline upload [`InstanceBatch::as_bytes`](clarity_core::InstanceBatch::as_bytes)
//! instead; this crate is the reference sink used for previews and checks.

pub mod atlas;
pub mod error;
pub mod renderer;

pub use atlas::Atlas;
pub use error::SinkError;
pub use renderer::SoftwareSink;
