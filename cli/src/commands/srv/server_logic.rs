//! # lumigrate Trigger Server Logic
//!
//! File: cli/src/commands/srv/server_logic.rs
//!
//! ## Overview
//!
//! HTTP front end for the migration pipeline. A client names a project that
//! already sits under the repository root; the server answers immediately
//! and runs the migration in the background:
//!
//! - `POST /migrate` and `POST /api/migrate` accept
//!   `{"projectPath": "...", "projectName": "...", "withEnv": true, "noInteraction": "true"}`.
//!   The two flags may be JSON booleans or the strings `"true"`/`"false"`.
//!   The same fields are also read from the query string; body values win.
//!   A missing or unreadable body counts as an empty one.
//! - The origin is `<repository_root>/<projectName>/<projectPath>`, the
//!   destination is the origin path with `_new` appended. Both values must
//!   be relative and may not climb out with `..`.
//! - Every response has the shape `{"success": bool, "message": string, "data": null}`.
//!
//! ## Architecture
//!
//! 1. `create_app` builds the Axum router with a `TraceLayer` for request logging.
//! 2. `migrate_handler` validates the request and hands a `MigrationJob` to
//!    the configured `Launcher`.
//! 3. The production launcher, `spawn_migration`, moves the job onto Tokio's
//!    blocking pool and drops the join handle. Progress is only visible in
//!    the logs; there is no status endpoint and no cancellation.
//!
//! ```rust
//! let config = config::load_and_merge_config(args)?;
//! server_logic::run_server(config).await?;
//! ```
//!
use super::config::ServerConfig;
use crate::commands::migrate::composer::Composer;
use crate::commands::migrate::descriptor::{MigrationOptions, ProjectDescriptor};
use crate::commands::migrate::pipeline;
use crate::core::error::Result;
use anyhow::Context;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{debug, error, info, warn, Level};

pub const MSG_MISSING_PATH: &str = "Please provide the Lumen project path.";
pub const MSG_MISSING_NAME: &str = "Please provide the project name.";
pub const MSG_INVALID_PATH: &str =
    "Project path and name must be relative paths inside the repository root.";
pub const MSG_IN_PROGRESS: &str = "Lumen to Laravel Migration On Progress...";

/// Everything a background migration needs, resolved from one request.
#[derive(Debug, Clone)]
pub struct MigrationJob {
    pub name: String,
    pub origin: PathBuf,
    pub destination: PathBuf,
    pub options: MigrationOptions,
}

/// Starts a migration without waiting for it.
pub type Launcher = Arc<dyn Fn(MigrationJob) + Send + Sync>;

/// Shared state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub repository_root: PathBuf,
    pub composer: Composer,
    pub launcher: Launcher,
}

/// Request body of the migrate endpoints. Missing fields take their default.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MigrateRequest {
    pub project_path: Option<String>,
    pub project_name: Option<String>,
    #[serde(deserialize_with = "deserialize_flag")]
    pub with_env: bool,
    #[serde(deserialize_with = "deserialize_flag")]
    pub no_interaction: bool,
}

/// Accepts `true`, `false`, `"true"`, `"false"` or `null`. Any string other
/// than `"true"` counts as false.
fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(value)) => value,
        Some(Flag::Text(text)) => text.trim().eq_ignore_ascii_case("true"),
        None => false,
    })
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl ApiResponse {
    fn reply(status: StatusCode, success: bool, message: &str) -> (StatusCode, Json<ApiResponse>) {
        (
            status,
            Json(ApiResponse {
                success,
                message: message.to_string(),
                data: None,
            }),
        )
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl MigrateRequest {
    /// Fills fields missing from `self` with the ones from `fallback`.
    fn with_fallback(self, fallback: MigrateRequest) -> MigrateRequest {
        let pick = |own: Option<String>, other: Option<String>| {
            if non_empty(own.as_deref()).is_some() {
                own
            } else {
                other
            }
        };
        MigrateRequest {
            project_path: pick(self.project_path, fallback.project_path),
            project_name: pick(self.project_name, fallback.project_name),
            with_env: self.with_env || fallback.with_env,
            no_interaction: self.no_interaction || fallback.no_interaction,
        }
    }
}

/// Appends the normal components of `relative` to `base`. Returns `None` if
/// `relative` is absolute, has a drive prefix, contains `..` or names nothing.
fn join_inside(base: &Path, relative: &str) -> Option<PathBuf> {
    let mut joined = base.to_path_buf();
    let mut pushed = false;
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => {
                joined.push(part);
                pushed = true;
            }
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) | Component::ParentDir => return None,
        }
    }
    pushed.then_some(joined)
}

/// Production `Launcher`: runs the pipeline on the blocking pool, detached.
pub fn spawn_migration(job: MigrationJob) {
    tokio::task::spawn_blocking(move || {
        let report = pipeline::run(&job.origin, &job.destination, &job.name, &job.options);
        let failed: Vec<String> = report.failures().map(|o| o.stage.to_string()).collect();
        if failed.is_empty() {
            info!("Background migration of '{}' completed", job.name);
        } else {
            error!(
                "Background migration of '{}' had failed stages: {}",
                job.name,
                failed.join(", ")
            );
        }
    });
}

async fn migrate_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<MigrateRequest>, QueryRejection>,
    body: std::result::Result<Json<MigrateRequest>, JsonRejection>,
) -> (StatusCode, Json<ApiResponse>) {
    let query = query.map(|Query(q)| q).unwrap_or_else(|rejection| {
        warn!("Ignoring unreadable query string: {}", rejection);
        MigrateRequest::default()
    });
    let body = body.map(|Json(b)| b).unwrap_or_else(|rejection| {
        debug!("No usable JSON body: {}", rejection);
        MigrateRequest::default()
    });
    let request = body.with_fallback(query);

    let Some(project_path) = non_empty(request.project_path.as_deref()) else {
        return ApiResponse::reply(StatusCode::BAD_REQUEST, false, MSG_MISSING_PATH);
    };
    let Some(project_name) = non_empty(request.project_name.as_deref()) else {
        return ApiResponse::reply(StatusCode::BAD_REQUEST, false, MSG_MISSING_NAME);
    };

    let Some(origin) = join_inside(&state.repository_root, project_name)
        .and_then(|project_dir| join_inside(&project_dir, project_path))
    else {
        warn!(
            "Rejected migration request with path {:?} and name {:?}",
            project_path, project_name
        );
        return ApiResponse::reply(StatusCode::BAD_REQUEST, false, MSG_INVALID_PATH);
    };
    let destination = ProjectDescriptor::default_destination(&origin);
    let job = MigrationJob {
        name: project_name.to_string(),
        origin,
        destination,
        options: MigrationOptions {
            merge_env: request.with_env,
            composer: Composer::new(
                state.composer.program(),
                request.no_interaction || state.composer.no_interaction(),
            ),
        },
    };
    info!(
        "Accepted migration of '{}' from {:?}",
        job.name, job.origin
    );
    (state.launcher)(job);

    ApiResponse::reply(StatusCode::OK, true, MSG_IN_PROGRESS)
}

/// # Create Axum Application (`create_app`)
///
/// Builds the router with both migrate routes and HTTP request tracing.
pub fn create_app(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::default().include_headers(true))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/migrate", post(migrate_handler))
        .route("/api/migrate", post(migrate_handler))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(trace_layer))
}

/// # Run HTTP Server (`run_server`)
///
/// Binds to the configured address and serves the trigger endpoints until
/// Ctrl+C or SIGTERM.
///
/// ## Errors
///
/// Fails if the listener cannot be bound or the server stops with an error.
pub async fn run_server(config: ServerConfig) -> Result<()> {
    let addr = SocketAddr::new(config.host, config.port);
    let state = AppState {
        repository_root: config.repository_root.clone(),
        composer: config.composer.clone(),
        launcher: Arc::new(spawn_migration),
    };
    let app = create_app(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind TCP listener to address {}", addr))?;

    println!("\n=================================================================");
    println!("📂 Repository root:   {}", config.repository_root.display());
    println!("🌐 Trigger URL:       http://{}/migrate", addr);
    println!("🎼 Composer:          {}", config.composer.program());
    println!("=================================================================\n");
    info!("Starting migration trigger server on {}", addr);
    println!("Server starting! Press Ctrl+C to stop.");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    println!("\nServer shutdown complete.");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, initiating graceful shutdown..."),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
                info!("Received SIGTERM, initiating graceful shutdown...");
            }
            Err(e) => {
                error!(
                    "Failed to install SIGTERM handler: {}. Shutdown on SIGTERM might not work.",
                    e
                );
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Mutex;
    use tower::ServiceExt;

    /// Router whose launcher records jobs instead of running them.
    fn test_app(composer: Composer) -> (Router, Arc<Mutex<Vec<MigrationJob>>>) {
        let jobs = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&jobs);
        let state = AppState {
            repository_root: PathBuf::from("/srv/repositories"),
            composer,
            launcher: Arc::new(move |job: MigrationJob| recorded.lock().unwrap().push(job)),
        };
        (create_app(state), jobs)
    }

    async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, ApiResponse) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, ApiResponse) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_migrate_accepts_and_launches() {
        let (app, jobs) = test_app(Composer::new("composer", false));

        let (status, body) = post_json(
            app,
            "/migrate",
            r#"{"projectPath": "api", "projectName": "shop", "withEnv": "true"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            ApiResponse {
                success: true,
                message: MSG_IN_PROGRESS.to_string(),
                data: None
            }
        );
        let jobs = jobs.lock().unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].name, "shop");
        assert_eq!(jobs[0].origin, PathBuf::from("/srv/repositories/shop/api"));
        assert_eq!(jobs[0].destination, PathBuf::from("/srv/repositories/shop/api_new"));
        assert!(jobs[0].options.merge_env);
        assert!(!jobs[0].options.composer.no_interaction());
    }

    #[tokio::test]
    async fn test_api_route_and_boolean_flags() {
        let (app, jobs) = test_app(Composer::new("/opt/composer", false));

        let (status, _) = post_json(
            app,
            "/api/migrate",
            r#"{"projectPath": "api", "projectName": "shop", "withEnv": false, "noInteraction": true}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let jobs = jobs.lock().unwrap();
        assert!(!jobs[0].options.merge_env);
        assert_eq!(jobs[0].options.composer, Composer::new("/opt/composer", true));
    }

    #[tokio::test]
    async fn test_missing_project_path() {
        let (app, jobs) = test_app(Composer::default());

        let (status, body) = post_json(app, "/migrate", r#"{"projectName": "shop"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.success);
        assert_eq!(body.message, MSG_MISSING_PATH);
        assert_eq!(body.data, None);
        assert!(jobs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_project_name() {
        let (app, jobs) = test_app(Composer::default());

        let (status, body) =
            post_json(app, "/api/migrate", r#"{"projectPath": "api", "projectName": "  "}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.message, MSG_MISSING_NAME);
        assert!(jobs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_paths_outside_repository_root() {
        for body in [
            r#"{"projectPath": "/etc", "projectName": "shop"}"#,
            r#"{"projectPath": "../../etc", "projectName": "shop"}"#,
            r#"{"projectPath": "api", "projectName": "/tmp"}"#,
            r#"{"projectPath": "api", "projectName": ".."}"#,
            r#"{"projectPath": ".", "projectName": "shop"}"#,
        ] {
            let (app, jobs) = test_app(Composer::default());

            let (status, response) = post_json(app, "/migrate", body).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
            assert!(!response.success);
            assert_eq!(response.message, MSG_INVALID_PATH);
            assert_eq!(response.data, None);
            assert!(jobs.lock().unwrap().is_empty(), "{}", body);
        }
    }

    #[tokio::test]
    async fn test_nested_relative_path_is_joined() {
        let (app, jobs) = test_app(Composer::default());

        let (status, _) = post_json(
            app,
            "/migrate",
            r#"{"projectPath": "./services/api", "projectName": "shop"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let jobs = jobs.lock().unwrap();
        assert_eq!(jobs[0].origin, PathBuf::from("/srv/repositories/shop/services/api"));
        assert_eq!(
            jobs[0].destination,
            PathBuf::from("/srv/repositories/shop/services/api_new")
        );
    }

    #[tokio::test]
    async fn test_query_string_without_body() {
        let (app, jobs) = test_app(Composer::new("composer", false));
        let request = Request::builder()
            .method("POST")
            .uri("/migrate?projectPath=api&projectName=shop&withEnv=true&noInteraction=false")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.message, MSG_IN_PROGRESS);
        let jobs = jobs.lock().unwrap();
        assert_eq!(jobs[0].origin, PathBuf::from("/srv/repositories/shop/api"));
        assert!(jobs[0].options.merge_env);
        assert!(!jobs[0].options.composer.no_interaction());
    }

    #[tokio::test]
    async fn test_body_fields_win_over_query() {
        let (app, jobs) = test_app(Composer::default());

        let (status, _) = post_json(
            app,
            "/api/migrate?projectPath=legacy&projectName=shop",
            r#"{"projectPath": "api"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let jobs = jobs.lock().unwrap();
        assert_eq!(jobs[0].origin, PathBuf::from("/srv/repositories/shop/api"));
    }

    #[tokio::test]
    async fn test_unusable_body_gets_json_error() {
        let (app, jobs) = test_app(Composer::default());
        let request = Request::builder()
            .method("POST")
            .uri("/migrate")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(app.clone(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.message, MSG_MISSING_PATH);

        let (status, body) = post_json(app, "/migrate", "{not json").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.success);
        assert_eq!(body.message, MSG_MISSING_PATH);
        assert!(jobs.lock().unwrap().is_empty());
    }

    #[test]
    fn test_join_inside() {
        let root = Path::new("/srv/repositories");
        assert_eq!(
            join_inside(root, "shop/./api"),
            Some(PathBuf::from("/srv/repositories/shop/api"))
        );
        assert_eq!(join_inside(root, "/etc"), None);
        assert_eq!(join_inside(root, "shop/../../etc"), None);
        assert_eq!(join_inside(root, "./"), None);
    }

    #[test]
    fn test_flag_deserialization() {
        let request: MigrateRequest = serde_json::from_str(
            r#"{"withEnv": "TRUE", "noInteraction": null}"#,
        )
        .unwrap();
        assert!(request.with_env);
        assert!(!request.no_interaction);
        let request: MigrateRequest = serde_json::from_str(r#"{"withEnv": "false"}"#).unwrap();
        assert!(!request.with_env);
    }
}
