use actix_web::{web, App, HttpServer};
use backend::config::db::DbProfile;
use backend::infra::state::build_state;
use backend::middleware::cors::cors_middleware;
use backend::middleware::request_trace::RequestTrace;
use backend::middleware::structured_logger::StructuredLogger;
use backend::middleware::trace_span::TraceSpan;
use backend::routes;
use backend::state::security_config::SecurityConfig;

mod telemetry;

fn fatal(msg: &str) -> ! {
    eprintln!("taskdeck-backend: {msg}");
    std::process::exit(1);
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Configuration is environment-only. Bind address and port have
    // sensible defaults; the signing secret and database credentials
    // do not, and their absence aborts startup before any request is
    // accepted.
    let host = std::env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = match std::env::var("BACKEND_PORT") {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| fatal("BACKEND_PORT is not a valid port number")),
        Err(_) => 5000,
    };

    let security_config = SecurityConfig::from_env().unwrap_or_else(|e| fatal(&e.to_string()));

    let app_state = build_state()
        .with_db(DbProfile::Prod)
        .with_security(security_config)
        .build()
        .await
        .unwrap_or_else(|e| fatal(&format!("could not connect to the database: {e}")));

    tracing::info!(%host, port, "taskdeck backend listening");

    let data = web::Data::new(app_state);

    // RequestTrace is registered last so it runs first and every
    // other layer sees the trace id it establishes.
    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware())
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
