//! The hybrid Router (spec §4.4).

mod decision;
mod keyword;
mod router;

pub use decision::{RoutingDecision, RoutingSource};
pub use router::{route, RouterConfig};
