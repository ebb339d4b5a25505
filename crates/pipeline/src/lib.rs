pub mod chain;
pub mod context;
pub mod error;
pub mod middleware;
pub mod state;
pub mod terminator;
pub mod util;

pub use chain::{build_chain, chain_router, BoxedChain};
pub use context::RequestContext;
pub use error::GatewayError;
pub use state::PipelineState;
