use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

use agencyops_auth::Principal;
use agencyops_guard::{Navigator, PrincipalStore, RouteTable};
use agencyops_infra::seed::{seed_defaults, seed_demo_principals};
use agencyops_infra::store::{
    InMemoryPermissionStore, InMemoryPrincipalDirectory, PostgresPermissionStore,
    PostgresPrincipalDirectory,
};
use agencyops_infra::{AppConfig, PermissionService, PermissionStore, PrincipalDirectory, StoreError};

pub type SharedPermissionService = Arc<PermissionService<Arc<dyn PermissionStore>>>;

/// Application services shared by all handlers.
pub struct AppServices {
    pub permissions: SharedPermissionService,
    pub directory: Arc<dyn PrincipalDirectory>,
    pub routes: Arc<RouteTable>,
}

impl AppServices {
    pub fn new(
        store: Arc<dyn PermissionStore>,
        directory: Arc<dyn PrincipalDirectory>,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            permissions: Arc::new(PermissionService::new(store, lookup_timeout)),
            directory,
            routes: Arc::new(RouteTable::default_back_office()),
        }
    }

    pub fn in_memory(backend: &InMemoryBackend, lookup_timeout: Duration) -> Self {
        Self::new(
            backend.permissions.clone(),
            backend.directory.clone(),
            lookup_timeout,
        )
    }

    /// Navigator bound to a single request's session.
    pub fn navigator(&self, token: &str, principal: Principal) -> Navigator<SharedPermissionService> {
        Navigator::new(
            Arc::new(PrincipalStore::with_session(token, principal)),
            self.permissions.clone(),
            self.routes.clone(),
        )
    }
}

/// Seeded in-memory tables (development and tests).
#[derive(Clone)]
pub struct InMemoryBackend {
    pub permissions: Arc<InMemoryPermissionStore>,
    pub directory: Arc<InMemoryPrincipalDirectory>,
}

impl InMemoryBackend {
    /// Default page catalog and role matrix; the directory starts empty.
    pub fn seeded() -> Result<Self, StoreError> {
        let permissions = Arc::new(InMemoryPermissionStore::new());
        seed_defaults(&permissions)?;
        Ok(Self {
            permissions,
            directory: Arc::new(InMemoryPrincipalDirectory::new()),
        })
    }
}

/// Select the backend from configuration: Postgres when `DATABASE_URL` is
/// set, seeded in-memory tables with one demo principal per role otherwise.
pub async fn build_services(config: &AppConfig) -> Result<AppServices, StoreError> {
    let Some(url) = config.database_url.as_deref() else {
        let backend = InMemoryBackend::seeded()?;
        for principal in seed_demo_principals(&backend.directory)? {
            tracing::info!(user_id = %principal.id, role = %principal.role, "demo principal");
        }
        return Ok(AppServices::in_memory(&backend, config.permission_lookup_timeout));
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(config.permission_lookup_timeout)
        .connect(url)
        .await?;

    let store = PostgresPermissionStore::new(pool.clone());
    store.ensure_schema().await?;
    tracing::info!("using postgres permission tables");

    Ok(AppServices::new(
        Arc::new(store),
        Arc::new(PostgresPrincipalDirectory::new(pool)),
        config.permission_lookup_timeout,
    ))
}
