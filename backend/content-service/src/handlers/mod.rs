/// HTTP request handlers
pub mod comments;
pub mod posts;

use actix_web::web;

/// Mount all /api/v1 routes.
///
/// `/posts/saved` is registered before `/posts/{post_id}` so the literal
/// segment wins over the id capture.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(
                web::scope("/posts")
                    .service(
                        web::resource("")
                            .route(web::get().to(posts::list_posts))
                            .route(web::post().to(posts::create_post)),
                    )
                    .route("/saved", web::get().to(posts::get_saved_posts))
                    .service(
                        web::resource("/{post_id}")
                            .route(web::get().to(posts::get_post))
                            .route(web::patch().to(posts::update_post))
                            .route(web::delete().to(posts::delete_post)),
                    )
                    .service(
                        web::resource("/{post_id}/comments")
                            .route(web::get().to(comments::list_post_comments))
                            .route(web::post().to(comments::create_comment)),
                    )
                    .service(
                        web::resource("/{post_id}/like")
                            .route(web::post().to(posts::like_post))
                            .route(web::delete().to(posts::unlike_post)),
                    )
                    .service(
                        web::resource("/{post_id}/save")
                            .route(web::post().to(posts::save_post))
                            .route(web::delete().to(posts::unsave_post)),
                    )
                    .service(
                        web::resource("/{post_id}/report")
                            .route(web::post().to(posts::report_post))
                            .route(web::delete().to(posts::unreport_post)),
                    ),
            )
            .service(
                web::scope("/comments")
                    .service(
                        web::resource("/{comment_id}")
                            .route(web::get().to(comments::get_comment))
                            .route(web::patch().to(comments::update_comment))
                            .route(web::delete().to(comments::delete_comment)),
                    )
                    .route("/{comment_id}/replies", web::get().to(comments::get_replies))
                    .service(
                        web::resource("/{comment_id}/like")
                            .route(web::post().to(comments::like_comment))
                            .route(web::delete().to(comments::unlike_comment)),
                    )
                    .service(
                        web::resource("/{comment_id}/report")
                            .route(web::post().to(comments::report_comment))
                            .route(web::delete().to(comments::unreport_comment)),
                    ),
            )
            .service(
                web::scope("/users").route("/{user_id}/posts", web::get().to(posts::get_user_posts)),
            ),
    );
}
