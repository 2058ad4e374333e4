// File: services/liveclass_backend/src/main.rs
use axum::{routing::get, Router};
use liveclass_apns::{routes as live_activity_routes, spawn_update_ticker, LiveActivityServiceFactory};
use liveclass_common::logging;
use liveclass_config::load_config;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() {
    logging::init();
    let config = Arc::new(
        logging::log_result(load_config(), "Configuration loaded", "Failed to load config")
            .expect("Failed to load config"),
    );

    let state = Arc::new(
        LiveActivityServiceFactory::new(config.clone())
            .build()
            .expect("Failed to initialize live activity service"),
    );

    // Background jobs
    liveclass_registry::cleanup::spawn(
        state.registry.clone(),
        Duration::from_secs(config.registry.cleanup_interval_secs),
        state.token_ttl,
    );
    if let Some(secs) = config.school.update_interval_secs {
        info!(interval_secs = secs, "automatic live activity updates enabled");
        spawn_update_ticker(
            state.dispatcher.clone(),
            state.clock.clone(),
            Duration::from_secs(secs),
        );
    }

    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to LiveClass API!" }))
        .merge(live_activity_routes(state.clone()));

    #[allow(unused_mut)] // mutated when the openapi feature is enabled
    let mut app = Router::new()
        .nest("/api", api_router)
        .layer(TraceLayer::new_for_http());

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use liveclass_apns::openapi::LiveActivityApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "LiveClass API",
                version = "0.1.0",
                description = "Live Activity registration and push dispatch",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            servers( (url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(LiveActivityApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");

        let swagger_ui = SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc);
        app = app.merge(swagger_ui);
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Failed to bind server address");
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .expect("Server error");
}
