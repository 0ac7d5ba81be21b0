//! The client: one connection, one cached action per resource kind
//!
//! [`Client`] owns the shared [`Connection`] and a fixed-slot registry with
//! one cell per [`ResourceKind`]. Each kind has an explicit factory, so
//! instantiation cannot fail; the registry guarantees that repeated requests
//! for the same kind return the identical instance, which lets an action rely
//! on any in-memory caching it keeps being client-wide.

use paddock_core::{ClientConfig, Result};
use std::sync::Arc;
use std::sync::OnceLock;

use crate::actions::{
    Action, DatasetsAction, DomainsAction, FrameworksAction, LicensesAction, MembershipsAction,
    OrganisationsAction, ProjectsAction, TeamsAction, UsersAction,
};
use crate::connection::Connection;

/// The resource kinds the backend exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Users,
    Datasets,
    Projects,
    Teams,
    Organisations,
    Memberships,
    Licenses,
    Frameworks,
    Domains,
}

impl ResourceKind {
    /// Every kind, in registry order
    pub const ALL: [ResourceKind; 9] = [
        ResourceKind::Users,
        ResourceKind::Datasets,
        ResourceKind::Projects,
        ResourceKind::Teams,
        ResourceKind::Organisations,
        ResourceKind::Memberships,
        ResourceKind::Licenses,
        ResourceKind::Frameworks,
        ResourceKind::Domains,
    ];

    /// Kinds eagerly instantiated when a client is constructed
    pub const CORE: [ResourceKind; 4] = [
        ResourceKind::Users,
        ResourceKind::Datasets,
        ResourceKind::Projects,
        ResourceKind::Teams,
    ];
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Users => write!(f, "users"),
            Self::Datasets => write!(f, "datasets"),
            Self::Projects => write!(f, "projects"),
            Self::Teams => write!(f, "teams"),
            Self::Organisations => write!(f, "organisations"),
            Self::Memberships => write!(f, "memberships"),
            Self::Licenses => write!(f, "licenses"),
            Self::Frameworks => write!(f, "frameworks"),
            Self::Domains => write!(f, "domains"),
        }
    }
}

/// Fixed-slot cache: one cell per resource kind
#[derive(Default)]
struct Registry {
    users: OnceLock<Arc<UsersAction>>,
    datasets: OnceLock<Arc<DatasetsAction>>,
    projects: OnceLock<Arc<ProjectsAction>>,
    teams: OnceLock<Arc<TeamsAction>>,
    organisations: OnceLock<Arc<OrganisationsAction>>,
    memberships: OnceLock<Arc<MembershipsAction>>,
    licenses: OnceLock<Arc<LicensesAction>>,
    frameworks: OnceLock<Arc<FrameworksAction>>,
    domains: OnceLock<Arc<DomainsAction>>,
}

/// Entry point to the backend: owns the connection and the action registry.
///
/// Create one client per logical session. After [`close`](Client::close) no
/// further operations are valid.
pub struct Client {
    connection: Arc<Connection>,
    registry: Registry,
}

impl Client {
    /// Create a client with a default connection (localhost, blank
    /// credentials); configure via
    /// [`connection()`](Client::connection)`.set_server(..)` /
    /// `.set_credentials(..)` or use [`with_connection`](Client::with_connection).
    pub fn new() -> Result<Self> {
        Ok(Self::with_connection(Connection::new()?))
    }

    /// Create a client from a [`ClientConfig`]
    pub fn with_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self::with_connection(Connection::with_config(config)?))
    }

    /// Create a client over an existing connection
    pub fn with_connection(connection: Connection) -> Self {
        let client = Self {
            connection: Arc::new(connection),
            registry: Registry::default(),
        };

        // Pre-populate the core resource actions through the same lazy path
        // later requests use.
        for kind in ResourceKind::CORE {
            let _ = client.action(kind);
            tracing::debug!(kind = %kind, "Pre-populated action");
        }

        client
    }

    /// The shared connection
    pub fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }

    /// Always construct a brand-new action for `kind`, bound to the shared
    /// connection. The registry is not consulted and not updated.
    pub fn new_action(&self, kind: ResourceKind) -> Arc<dyn Action> {
        let connection = self.connection.clone();
        match kind {
            ResourceKind::Users => Arc::new(UsersAction::new(connection)),
            ResourceKind::Datasets => Arc::new(DatasetsAction::new(connection)),
            ResourceKind::Projects => Arc::new(ProjectsAction::new(connection)),
            ResourceKind::Teams => Arc::new(TeamsAction::new(connection)),
            ResourceKind::Organisations => Arc::new(OrganisationsAction::new(connection)),
            ResourceKind::Memberships => Arc::new(MembershipsAction::new(connection)),
            ResourceKind::Licenses => Arc::new(LicensesAction::new(connection)),
            ResourceKind::Frameworks => Arc::new(FrameworksAction::new(connection)),
            ResourceKind::Domains => Arc::new(DomainsAction::new(connection)),
        }
    }

    /// The cached action for `kind`, created on first use.
    ///
    /// Pointer-stable: every call with the same kind returns the identical
    /// instance for the lifetime of this client.
    pub fn action(&self, kind: ResourceKind) -> Arc<dyn Action> {
        match kind {
            ResourceKind::Users => self.users(),
            ResourceKind::Datasets => self.datasets(),
            ResourceKind::Projects => self.projects(),
            ResourceKind::Teams => self.teams(),
            ResourceKind::Organisations => self.organisations(),
            ResourceKind::Memberships => self.memberships(),
            ResourceKind::Licenses => self.licenses(),
            ResourceKind::Frameworks => self.frameworks(),
            ResourceKind::Domains => self.domains(),
        }
    }

    /// The users action
    pub fn users(&self) -> Arc<UsersAction> {
        self.registry
            .users
            .get_or_init(|| Arc::new(UsersAction::new(self.connection.clone())))
            .clone()
    }

    /// The datasets action
    pub fn datasets(&self) -> Arc<DatasetsAction> {
        self.registry
            .datasets
            .get_or_init(|| Arc::new(DatasetsAction::new(self.connection.clone())))
            .clone()
    }

    /// The projects action
    pub fn projects(&self) -> Arc<ProjectsAction> {
        self.registry
            .projects
            .get_or_init(|| Arc::new(ProjectsAction::new(self.connection.clone())))
            .clone()
    }

    /// The teams action
    pub fn teams(&self) -> Arc<TeamsAction> {
        self.registry
            .teams
            .get_or_init(|| Arc::new(TeamsAction::new(self.connection.clone())))
            .clone()
    }

    /// The organisations action
    pub fn organisations(&self) -> Arc<OrganisationsAction> {
        self.registry
            .organisations
            .get_or_init(|| Arc::new(OrganisationsAction::new(self.connection.clone())))
            .clone()
    }

    /// The memberships action
    pub fn memberships(&self) -> Arc<MembershipsAction> {
        self.registry
            .memberships
            .get_or_init(|| Arc::new(MembershipsAction::new(self.connection.clone())))
            .clone()
    }

    /// The licenses action
    pub fn licenses(&self) -> Arc<LicensesAction> {
        self.registry
            .licenses
            .get_or_init(|| Arc::new(LicensesAction::new(self.connection.clone())))
            .clone()
    }

    /// The frameworks action
    pub fn frameworks(&self) -> Arc<FrameworksAction> {
        self.registry
            .frameworks
            .get_or_init(|| Arc::new(FrameworksAction::new(self.connection.clone())))
            .clone()
    }

    /// The domains action
    pub fn domains(&self) -> Arc<DomainsAction> {
        self.registry
            .domains
            .get_or_init(|| Arc::new(DomainsAction::new(self.connection.clone())))
            .clone()
    }

    /// Whether an action for `kind` has been cached
    pub(crate) fn has_cached(&self, kind: ResourceKind) -> bool {
        match kind {
            ResourceKind::Users => self.registry.users.get().is_some(),
            ResourceKind::Datasets => self.registry.datasets.get().is_some(),
            ResourceKind::Projects => self.registry.projects.get().is_some(),
            ResourceKind::Teams => self.registry.teams.get().is_some(),
            ResourceKind::Organisations => self.registry.organisations.get().is_some(),
            ResourceKind::Memberships => self.registry.memberships.get().is_some(),
            ResourceKind::Licenses => self.registry.licenses.get().is_some(),
            ResourceKind::Frameworks => self.registry.frameworks.get().is_some(),
            ResourceKind::Domains => self.registry.domains.get().is_some(),
        }
    }

    /// Close the underlying connection. Terminal and idempotent.
    pub fn close(&self) {
        self.connection.close();
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("connection", &self.connection)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::{empty_response, MockTransport};

    fn test_client() -> Client {
        let transport = Arc::new(MockTransport::new(|_| Ok(empty_response(200))));
        Client::with_connection(Connection::with_transport(transport))
    }

    #[test]
    fn test_action_is_pointer_stable() {
        let client = test_client();
        for kind in ResourceKind::ALL {
            let first = client.action(kind);
            let second = client.action(kind);
            assert!(
                Arc::ptr_eq(&first, &second),
                "action({}) returned distinct instances",
                kind
            );
        }
    }

    #[test]
    fn test_typed_accessor_matches_action() {
        let client = test_client();
        let typed: Arc<dyn Action> = client.datasets();
        let dynamic = client.action(ResourceKind::Datasets);
        assert!(Arc::ptr_eq(&typed, &dynamic));
    }

    #[test]
    fn test_new_action_is_always_fresh() {
        let client = test_client();
        let first = client.new_action(ResourceKind::Licenses);
        let second = client.new_action(ResourceKind::Licenses);
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_new_action_does_not_populate_registry() {
        let client = test_client();
        assert!(!client.has_cached(ResourceKind::Licenses));

        let fresh = client.new_action(ResourceKind::Licenses);
        assert!(!client.has_cached(ResourceKind::Licenses));

        let cached = client.action(ResourceKind::Licenses);
        assert!(!Arc::ptr_eq(&fresh, &cached));
        assert!(client.has_cached(ResourceKind::Licenses));
    }

    #[test]
    fn test_core_kinds_are_eagerly_populated() {
        let client = test_client();
        for kind in ResourceKind::CORE {
            assert!(client.has_cached(kind), "{} not pre-populated", kind);
        }
        // Non-core kinds stay lazy
        assert!(!client.has_cached(ResourceKind::Frameworks));
        assert!(!client.has_cached(ResourceKind::Memberships));
    }

    #[test]
    fn test_actions_share_one_connection() {
        let client = test_client();
        for kind in ResourceKind::ALL {
            let action = client.action(kind);
            assert!(Arc::ptr_eq(action.connection(), client.connection()));
            assert_eq!(action.kind(), kind);
        }
    }

    #[test]
    fn test_close_delegates_to_connection() {
        let client = test_client();
        client.close();
        client.close();
        assert!(client.connection().is_closed());
    }
}
