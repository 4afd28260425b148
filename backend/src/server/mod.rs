//! HTTP server assembly for the donor drive binary.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use donor_drive::Trace;
#[cfg(debug_assertions)]
use donor_drive::doc::ApiDoc;
use donor_drive::inbound::http::donations::{get_stats, list_donors, submit_donation, sync_stats};
use donor_drive::inbound::http::error::json_config;
use donor_drive::inbound::http::health::{HealthState, health, live, ready};
use donor_drive::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Seconds in-flight requests get to finish after SIGINT/SIGTERM.
const SHUTDOWN_GRACE_SECS: u64 = 10;

/// Register the `/api` routes.
fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(submit_donation)
            .service(get_stats)
            .service(list_donors)
            .service(sync_stats)
            .service(health),
    );
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .wrap(Trace)
        .configure(api_routes)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Bind the donor drive API and mark the service ready.
///
/// The returned [`Server`] must be awaited to accept connections. Actix
/// installs SIGINT/SIGTERM handlers and drains in-flight requests for
/// `SHUTDOWN_GRACE_SECS` before resolving.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = build_http_state(&config);
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), http_state.clone())
    })
    .shutdown_timeout(SHUTDOWN_GRACE_SECS)
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
