//! # Server Configuration
//!
//! Router assembly and the serve loop for the controller's REST surface.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::handlers::{self, clusters, configurations, profiles, triggers};
use crate::storage::Storage;
use crate::telemetry;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub storage: Arc<Storage>,
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/clusters",
            get(clusters::list_clusters).post(clusters::create_cluster),
        )
        .route("/clusters/search", get(clusters::search_clusters))
        .route(
            "/clusters/{id}",
            get(clusters::get_cluster).delete(clusters::delete_cluster),
        )
        .route(
            "/profiles",
            get(profiles::list_profiles).post(profiles::create_profile),
        )
        .route(
            "/profiles/{id}",
            get(profiles::get_profile)
                .put(profiles::change_profile)
                .delete(profiles::delete_profile),
        )
        .route(
            "/configurations",
            get(configurations::list_configurations),
        )
        .route(
            "/configurations/{id}",
            get(configurations::get_configuration).delete(configurations::delete_configuration),
        )
        .route(
            "/configurations/{id}/enable",
            put(configurations::enable_configuration_by_id),
        )
        .route(
            "/configurations/{id}/disable",
            put(configurations::disable_configuration_by_id),
        )
        .route(
            "/cluster/{name}/configuration",
            get(configurations::get_active_configuration),
        )
        .route(
            "/cluster/{name}/configurations",
            get(configurations::list_cluster_configurations)
                .post(configurations::create_cluster_configuration),
        )
        .route(
            "/cluster/{name}/configurations/assign",
            post(configurations::assign_cluster_configuration),
        )
        .route(
            "/cluster/{name}/configurations/enable",
            put(configurations::enable_cluster_configuration),
        )
        .route(
            "/cluster/{name}/configurations/disable",
            put(configurations::disable_cluster_configuration),
        )
        .route(
            "/trigger-types",
            get(triggers::list_trigger_types).post(triggers::create_trigger_type),
        )
        .route("/triggers", get(triggers::list_triggers))
        .route(
            "/triggers/{id}",
            get(triggers::get_trigger).delete(triggers::delete_trigger),
        )
        .route("/triggers/{id}/activate", put(triggers::activate_trigger))
        .route(
            "/triggers/{id}/deactivate",
            put(triggers::deactivate_trigger),
        )
        .route(
            "/cluster/{name}/triggers",
            get(triggers::list_cluster_triggers).post(triggers::create_trigger),
        )
        .route(
            "/cluster/{name}/triggers/{id}/ack",
            put(triggers::ack_trigger),
        )
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(telemetry::trace_context_middleware))
}

/// Serves the API until Ctrl-C
pub async fn run_server(config: AppConfig, storage: Storage) -> Result<()> {
    let addr = config
        .bind_addr()
        .with_context(|| format!("invalid bind address '{}'", config.api_bind_addr))?;

    let state = AppState {
        config: Arc::new(config),
        storage: Arc::new(storage),
    };
    let profile = state.config.profile.clone();
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, %profile, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown requested");
        })
        .await?;

    Ok(())
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz,
        crate::handlers::clusters::list_clusters,
        crate::handlers::clusters::search_clusters,
        crate::handlers::clusters::create_cluster,
        crate::handlers::clusters::get_cluster,
        crate::handlers::clusters::delete_cluster,
        crate::handlers::profiles::list_profiles,
        crate::handlers::profiles::create_profile,
        crate::handlers::profiles::get_profile,
        crate::handlers::profiles::change_profile,
        crate::handlers::profiles::delete_profile,
        crate::handlers::configurations::list_configurations,
        crate::handlers::configurations::get_configuration,
        crate::handlers::configurations::delete_configuration,
        crate::handlers::configurations::enable_configuration_by_id,
        crate::handlers::configurations::disable_configuration_by_id,
        crate::handlers::configurations::list_cluster_configurations,
        crate::handlers::configurations::create_cluster_configuration,
        crate::handlers::configurations::assign_cluster_configuration,
        crate::handlers::configurations::enable_cluster_configuration,
        crate::handlers::configurations::disable_cluster_configuration,
        crate::handlers::configurations::get_active_configuration,
        crate::handlers::triggers::list_trigger_types,
        crate::handlers::triggers::create_trigger_type,
        crate::handlers::triggers::list_triggers,
        crate::handlers::triggers::get_trigger,
        crate::handlers::triggers::delete_trigger,
        crate::handlers::triggers::activate_trigger,
        crate::handlers::triggers::deactivate_trigger,
        crate::handlers::triggers::list_cluster_triggers,
        crate::handlers::triggers::create_trigger,
        crate::handlers::triggers::ack_trigger,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::models::ClusterConfiguration,
            crate::models::cluster::Model,
            crate::models::configuration_profile::Model,
            crate::models::trigger_type::Model,
            crate::models::trigger::Model,
            crate::handlers::HealthStatus,
            crate::handlers::CreatedId,
            crate::handlers::ChangeRequest,
            crate::handlers::clusters::CreateClusterRequest,
            crate::handlers::profiles::ProfileRequest,
            crate::handlers::configurations::CreateConfigurationRequest,
            crate::handlers::configurations::AssignConfigurationRequest,
            crate::handlers::triggers::CreateTriggerTypeRequest,
            crate::handlers::triggers::CreateTriggerRequest,
            crate::error::ApiError,
        )
    ),
    tags(
        (name = "clusters", description = "Cluster registry"),
        (name = "profiles", description = "Reusable configuration profiles"),
        (name = "configurations", description = "Per-cluster configuration activation"),
        (name = "triggers", description = "Diagnostic triggers"),
    ),
    info(
        title = "Configuration Controller API",
        description = "Stores cluster configurations and diagnostic triggers for remote agents",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
