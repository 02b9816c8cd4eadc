//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::{build_http_state, build_ws_state};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::DefaultClock;
use tracing::info;

use showroom::Trace;
#[cfg(debug_assertions)]
use showroom::doc::ApiDoc;
use showroom::inbound::http::assets::serve_asset;
use showroom::inbound::http::health::{HealthState, live, ready};
use showroom::inbound::http::products_test::list_test_products;
use showroom::inbound::http::state::HttpState;
use showroom::inbound::ws;
use showroom::inbound::ws::state::WsState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use std::sync::Arc;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    ws_state: web::Data<WsState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        ws_state,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(ws_state)
        .wrap(Trace)
        .service(ws::ws_entry)
        .service(ready)
        .service(live)
        .service(list_test_products);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // The asset catch-all matches every path, so it must be registered last.
    app.service(serve_asset)
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// One coordinator and connection registry are shared by every worker, so a
/// write received on any worker reaches sessions on all of them.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let ServerConfig {
        bind_addr,
        stores,
        public_dir,
        allowed_origins,
        products_test_count,
    } = config;
    let ws_state = web::Data::new(build_ws_state(
        stores,
        Arc::new(DefaultClock),
        allowed_origins,
    ));
    let http_state = web::Data::new(build_http_state(public_dir, products_test_count));

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            ws_state: ws_state.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    info!(%bind_addr, "server listening");
    health_state.mark_ready();
    Ok(server)
}
