use actix_web::web::{self, Data, JsonConfig, PathConfig, QueryConfig};
use actix_web::{App, HttpServer, ResponseError};
use mongodb::Client;
use tracing::{info, Level};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::fmt::format::FmtSpan;

use crewmatch_server::database::{Database, MongoDatabase};
use crewmatch_server::error::Error;
use crewmatch_server::{routes, seed};

#[actix_web::main]
async fn main() -> Result<(), Error> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_span_events(FmtSpan::NEW)
        .compact()
        .init();

    let uri = std::env::var("MONGODB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    let bind_addr =
        std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    info!("connecting to db: {}", uri);
    let db = Client::with_uri_str(&uri).await?.database("crewmatch");
    let db = MongoDatabase::initialize(db).await?;

    if std::env::var("SEED_DEMO_DATA").map(|v| v == "1").unwrap_or(false) {
        seed::seed(&db).await?;
    }

    info!("listening on {}", bind_addr);
    HttpServer::new(move || {
        App::new()
            .app_data(JsonConfig::default().error_handler(|err, _req| {
                // format json errors with custom format
                Error::InvalidJson(err).into()
            }))
            .app_data(PathConfig::default().error_handler(|err, _req| {
                // format path errors with custom format
                Error::InvalidPath(err).into()
            }))
            .app_data(QueryConfig::default().error_handler(|err, _req| {
                // format query errors with custom format
                Error::InvalidQuery(err).into()
            }))
            .app_data(Data::new(Box::new(db.clone()) as Box<dyn Database>))
            .wrap(TracingLogger::default())
            .configure(routes)
            .default_service(web::to(|| async { Error::PathNotFound.error_response() }))
    })
    .bind(&bind_addr)?
    .run()
    .await?;

    Ok(())
}
