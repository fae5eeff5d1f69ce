use actix_web::{get, web, HttpResponse, Responder, Scope};
use serde_json::json;
use crate::utils::logging::Logger;

pub fn initialize() -> Scope {
    web::scope("/misc")
        .service(health)
        .service(system_log)
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({"status": "ok"}))
}

#[get("/log")]
async fn system_log() -> impl Responder {
    let logs = Logger::get_system_logs().await;
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(Logger::format_logs(&logs))
}
