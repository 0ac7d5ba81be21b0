//! Resource-specific action handlers
//!
//! Each action wraps one server-side resource (users, datasets, ...) and
//! issues authenticated HTTP calls through the shared [`Connection`]. Actions
//! hold no mutable state of their own, so one instance can serve concurrent
//! callers; the client caches one instance per resource kind for exactly that
//! reason.

use std::sync::Arc;

use crate::client::ResourceKind;
use crate::connection::Connection;

mod datasets;
mod domains;
mod frameworks;
mod licenses;
mod memberships;
mod organisations;
mod projects;
mod teams;
mod users;

pub use datasets::DatasetsAction;
pub use domains::DomainsAction;
pub use frameworks::FrameworksAction;
pub use licenses::LicensesAction;
pub use memberships::MembershipsAction;
pub use organisations::OrganisationsAction;
pub use projects::ProjectsAction;
pub use teams::TeamsAction;
pub use users::UsersAction;

/// Common contract for all resource handlers
pub trait Action: Send + Sync {
    /// The resource kind this action handles
    fn kind(&self) -> ResourceKind;

    /// The shared connection this action issues requests through
    fn connection(&self) -> &Arc<Connection>;
}
