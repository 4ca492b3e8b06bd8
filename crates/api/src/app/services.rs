use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use ironstart_auth::{AuthService, AuthStore, PasswordHasher};
use ironstart_infra::{InMemoryAuthStore, InMemoryTodoRepository, PostgresTodoRepository, TodoRepository};

use crate::config::AppConfig;
use crate::rpc::{AppRouter, OpenApiInfo, todo_router};

pub type Auth = AuthService<Arc<dyn AuthStore>>;

/// Everything request handlers need, built once at startup.
pub struct AppServices {
    pub config: AppConfig,
    pub auth: Arc<Auth>,
    pub router: AppRouter,
    pub openapi_info: OpenApiInfo,
}

impl AppServices {
    /// Base URL the REST and RPC adapters are served from.
    pub fn api_server_url(&self) -> String {
        format!("{}/api", self.config.app_url)
    }
}

/// Wire storage per config: Postgres-backed todos when persistent stores are
/// enabled, in-memory otherwise.
pub async fn build_services(config: AppConfig) -> anyhow::Result<AppServices> {
    let repo: Arc<dyn TodoRepository> = match (&config.database_url, config.use_persistent_stores) {
        (Some(url), true) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .context("failed to connect to DATABASE_URL")?;
            let repo = PostgresTodoRepository::new(pool);
            repo.ensure_schema()
                .await
                .context("failed to prepare todos table")?;
            tracing::info!("using postgres todo store");
            Arc::new(repo)
        }
        _ => {
            tracing::info!("using in-memory todo store");
            Arc::new(InMemoryTodoRepository::new())
        }
    };

    build_services_with(config, repo)
}

/// Wire the auth service and procedure router around an existing todo store.
pub fn build_services_with(
    config: AppConfig,
    repo: Arc<dyn TodoRepository>,
) -> anyhow::Result<AppServices> {
    let store: Arc<dyn AuthStore> = Arc::new(InMemoryAuthStore::new());
    let auth = Arc::new(
        AuthService::new(store, config.auth_secret.clone().into_bytes())
            .with_hasher(PasswordHasher::with_iterations(config.password_hash_iterations)),
    );

    let router = todo_router(repo, auth.clone()).context("failed to build procedure router")?;

    Ok(AppServices {
        config,
        auth,
        router,
        openapi_info: OpenApiInfo::default(),
    })
}
