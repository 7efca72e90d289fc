use super::controller::{signin, signup, update_avatar, update_profile};
use actix_web::web;

pub fn user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/signup", web::post().to(signup))
            .route("/signin", web::post().to(signin))
            .route("/update", web::put().to(update_profile))
            .route("/update-avatar", web::put().to(update_avatar)),
    );
}
