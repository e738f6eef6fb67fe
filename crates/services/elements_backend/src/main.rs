// File: services/elements_backend/src/main.rs
mod service_factory;

use elements_booking::{routes, BookingState};
use elements_common::{config_error, logging, ElementsError};
use elements_config::load_config;
use elements_cronofy::auth::print_authorization_url;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

#[tokio::main]
async fn main() -> Result<(), ElementsError> {
    logging::init();

    let config = Arc::new(load_config().map_err(config_error)?);
    let api = service_factory::scheduling_api(&config)?;
    print_authorization_url(&config.cronofy, &config.web.origin);

    let state = Arc::new(BookingState::new(config.clone(), api)?);

    #[allow(unused_mut)] // mutated only with the openapi feature
    let mut app = routes(state).nest_service("/static", ServeDir::new(STATIC_DIR));

    #[cfg(feature = "openapi")]
    {
        use elements_booking::doc::ElementsApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        info!("📖 Adding Swagger UI at /docs");
        app = app.merge(SwaggerUi::new("/docs").url("/docs/openapi.json", ElementsApiDoc::openapi()));
    }

    let app = app.layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| config_error(format!("cannot bind {}: {}", addr, e)))?;
    info!("🚀 Serving on http://{}", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .map_err(|e| ElementsError::InternalError(format!("server stopped: {}", e)))
}
