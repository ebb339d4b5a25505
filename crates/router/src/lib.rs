pub mod admin_guard;
pub mod builder;
pub mod error;
pub mod service;
pub mod socket;
pub mod table;
pub mod watcher;

pub use admin_guard::{AdminGuardLayer, OWNER_HEADER};
pub use builder::{reload, TableBuilder};
pub use error::RouterError;
pub use service::GatewayRouter;
pub use socket::bind_listener;
pub use table::{build_table, RoutingTable, ADMIN_PREFIX};
pub use watcher::DefinitionWatcher;
