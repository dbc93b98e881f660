use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::{header, Method};
use actix_web::middleware::Next;
use actix_web::{error, web, Error, HttpResponse, ResponseError};
use log::debug;

use crate::error::ChatError;
use crate::AppState;

const PUBLIC_PATHS: &[&str] = &[
    "/login",
    "/api/login",
    "/logout",
    "/api/logout",
    "/health",
    "/api/health",
];

fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

fn wants_html(req: &ServiceRequest) -> bool {
    req.method() == Method::GET
        && req
            .headers()
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .map(|accept| accept.contains("text/html"))
            .unwrap_or(false)
}

/// Runs ahead of every route. Browsers failing the check are sent to the
/// login page, anything else gets a 401 JSON body.
pub async fn require_site_password<B: MessageBody>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| error::ErrorInternalServerError("application state missing"))?;

    if is_public(req.path()) || state.gate.verify(req.request()) {
        return next.call(req).await.map(ServiceResponse::map_into_left_body);
    }

    debug!("Rejected unauthenticated {} {}", req.method(), req.path());
    let response = if wants_html(&req) {
        HttpResponse::Found()
            .insert_header((header::LOCATION, "/login"))
            .finish()
    } else {
        ChatError::Unauthorized.error_response()
    };
    Ok(req.into_response(response).map_into_right_body())
}
