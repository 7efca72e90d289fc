use actix_web::http::StatusCode;
use actix_web::middleware::Logger;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, web};
use dotenv::dotenv;
use env_logger::Env;
use log::info;
use serde_json::json;

use safequest_backend::database::connect_to_mongo;
use safequest_backend::middleware::not_found::not_found;
use safequest_backend::post::post_service::PostService;
use safequest_backend::router::index::routes;
use safequest_backend::user::service::UserService;

#[get("/")]
async fn default() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Welcome to the SafeQuest API",
        "httpStatusCode": StatusCode::OK.as_u16(),
        "service": std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string()),
    }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    info!("Starting server on http://localhost:{}", port);

    let mongo_client = connect_to_mongo()
        .await
        .expect("Failed to connect to MongoDB");

    let post_service = web::Data::new(PostService::new(&mongo_client));
    let user_service = web::Data::new(UserService::new(&mongo_client));

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(post_service.clone())
            .app_data(user_service.clone())
            .configure(routes)
            .service(default)
            .default_service(web::route().to(not_found))
    })
    .bind(("localhost", port))?
    .run()
    .await?;

    info!("Server has stopped");

    Ok(())
}
