mod api;
mod auth;
mod browser;
mod contacts;
mod detail;
mod discovery;
mod maps;

use axum::{routing::get, Router};
use dotenv::dotenv;
use std::env;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(api::gmap, api::website),
    components(schemas(
        api::ContactResponse,
        crate::maps::BusinessRecord,
        crate::contacts::ContactBundle
    )),
    tags(
        (name = "scraper", description = "Maps business discovery and website contact extraction")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());

    let app = Router::new()
        .merge(SwaggerUi::new("/contact-hunter-swagger").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/gmap", get(api::gmap))
        .route("/website", get(api::website));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    println!("🚀 Contact Hunter API live at http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
