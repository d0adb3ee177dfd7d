pub mod batch_ctx;
pub mod batch_flow;

pub use batch_ctx::BatchCtx;
pub use batch_flow::{AttemptResult, BatchFlow, MAX_ATTEMPTS};
