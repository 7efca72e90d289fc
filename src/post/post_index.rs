use super::post_controller::{comment_post, create_post, get_post, like_post, list_posts};
use actix_web::web;

pub fn post_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/posts")
            .route("", web::get().to(list_posts))
            .route("", web::post().to(create_post))
            .route("/{id}", web::get().to(get_post))
            .route("/{id}/like", web::post().to(like_post))
            .route("/{id}/comment", web::post().to(comment_post)),
    );
}
