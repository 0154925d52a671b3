use actix_web::{HttpResponse, Responder, get};

macros_utils::routes! {
    route is_alive,
}

/// Liveness check route
/// This route returns no content, the response status is enough.
#[get("/isAlive")]
pub async fn is_alive() -> impl Responder {
    HttpResponse::Ok()
}
