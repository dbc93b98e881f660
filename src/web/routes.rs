use actix_web::web;
use crate::web::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::resource("/chat")
                    .route(web::post().to(handlers::chat))
                    .default_service(web::to(handlers::method_not_allowed)),
            )
            .service(
                web::resource("/login")
                    .route(web::post().to(handlers::api_login))
                    .default_service(web::to(handlers::method_not_allowed)),
            )
            .service(
                web::resource("/logout")
                    .route(web::get().to(handlers::api_logout))
                    .default_service(web::to(handlers::method_not_allowed)),
            )
            .service(
                web::resource("/health")
                    .route(web::get().to(handlers::health_check))
                    .default_service(web::to(handlers::method_not_allowed)),
            ),
    )
    .service(
        web::resource("/login")
            .route(web::get().to(handlers::login_page))
            .route(web::post().to(handlers::login))
            .default_service(web::to(handlers::method_not_allowed)),
    )
    .service(
        web::resource("/logout")
            .route(web::get().to(handlers::logout))
            .default_service(web::to(handlers::method_not_allowed)),
    )
    .service(
        web::resource("/health")
            .route(web::get().to(handlers::health_check))
            .default_service(web::to(handlers::method_not_allowed)),
    );
}
