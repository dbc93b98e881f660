use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{error, info, warn};
use tera::Context;

use crate::error::ChatError;
use crate::web::models::{ChatRequest, HealthResponse, LoginForm};
use crate::web::relay::Relay;
use crate::AppState;

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

fn login_form(req: &HttpRequest, body: &[u8]) -> LoginForm {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    LoginForm::from_body(content_type, body)
}

fn render_login(data: &AppState, error_message: Option<&str>) -> Result<String, tera::Error> {
    let mut context = Context::new();
    if let Some(message) = error_message {
        context.insert("error", message);
    }
    data.tera.render("login.html", &context)
}

fn login_page_response(
    mut builder: actix_web::HttpResponseBuilder,
    data: &AppState,
    error_message: Option<&str>,
) -> HttpResponse {
    match render_login(data, error_message) {
        Ok(html) => builder.content_type("text/html; charset=utf-8").body(html),
        Err(e) => {
            error!("Template error: {}", e);
            HttpResponse::InternalServerError().body("Template error")
        }
    }
}

// Sign-in page
pub async fn login_page(data: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if !data.gate.enabled() || data.gate.verify(&req) {
        return redirect("/");
    }
    login_page_response(HttpResponse::Ok(), &data, None)
}

// Browser login: redirects on success, re-renders the form on failure
pub async fn login(data: web::Data<AppState>, req: HttpRequest, body: web::Bytes) -> impl Responder {
    if !data.gate.enabled() {
        return redirect("/");
    }
    let form = login_form(&req, &body);
    match data.gate.login_cookie() {
        Some(cookie) if data.gate.password_matches(&form.password) => {
            info!("Successful login");
            HttpResponse::Found()
                .cookie(cookie)
                .insert_header((header::LOCATION, "/"))
                .finish()
        }
        _ => {
            warn!("Rejected login attempt");
            login_page_response(HttpResponse::Unauthorized(), &data, Some("Incorrect password"))
        }
    }
}

// Programmatic login: 204 with or without a cookie, 401 on a wrong password
pub async fn api_login(
    data: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, ChatError> {
    if !data.gate.enabled() {
        return Ok(HttpResponse::NoContent().finish());
    }
    let form = login_form(&req, &body);
    match data.gate.login_cookie() {
        Some(cookie) if data.gate.password_matches(&form.password) => {
            info!("Successful API login");
            Ok(HttpResponse::NoContent().cookie(cookie).finish())
        }
        _ => {
            warn!("Rejected API login attempt");
            Err(ChatError::Unauthorized)
        }
    }
}

pub async fn logout(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Found()
        .cookie(data.gate.logout_cookie())
        .insert_header((header::LOCATION, "/login"))
        .finish()
}

pub async fn api_logout(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::NoContent()
        .cookie(data.gate.logout_cookie())
        .finish()
}

// Health check endpoint
pub async fn health_check(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION"),
        has_xai_api_key: data.upstream.is_some(),
        has_site_password: data.gate.enabled(),
        env: data.config.environment(),
    })
}

// Chat API endpoint
pub async fn chat(data: web::Data<AppState>, body: web::Bytes) -> Result<HttpResponse, ChatError> {
    let request = ChatRequest::parse(&body)?;
    let message_count = request.messages.len();
    let relay = Relay::new(request, data.upstream.clone(), data.config.mock_delay);

    info!(
        "Chat relay {} started: {} messages, upstream configured: {}",
        relay.id(),
        message_count,
        data.upstream.is_some()
    );

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .insert_header((header::CONNECTION, "keep-alive"))
        .streaming(relay.into_stream()))
}

pub async fn method_not_allowed(req: HttpRequest) -> impl Responder {
    let allow = match req.path() {
        "/login" => "GET, POST",
        "/api/chat" | "/api/login" => "POST",
        _ => "GET",
    };
    HttpResponse::MethodNotAllowed()
        .insert_header((header::ALLOW, allow))
        .body("Method Not Allowed")
}
