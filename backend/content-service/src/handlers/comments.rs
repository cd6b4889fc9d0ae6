/// Comment handlers - HTTP endpoints for comment operations
use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::handlers::posts::PageParams;
use crate::middleware::{MaybeUserId, UserId};
use crate::models::{CreateCommentRequest, UpdateCommentRequest};
use crate::services::{CommentService, DEFAULT_PAGE_SIZE};

pub async fn list_post_comments(
    service: web::Data<CommentService>,
    post_id: web::Path<i64>,
    query: web::Query<PageParams>,
    viewer: MaybeUserId,
) -> Result<HttpResponse> {
    let comments = service
        .list_post_comments(
            *post_id,
            query.page.unwrap_or(1),
            query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            viewer.0,
        )
        .await?;

    Ok(HttpResponse::Ok().json(comments))
}

pub async fn create_comment(
    service: web::Data<CommentService>,
    post_id: web::Path<i64>,
    user_id: UserId,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    let comment = service
        .create_comment(user_id.0, *post_id, req.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(comment))
}

pub async fn get_comment(
    service: web::Data<CommentService>,
    comment_id: web::Path<i64>,
    viewer: MaybeUserId,
) -> Result<HttpResponse> {
    let comment = service.get_comment(*comment_id, viewer.0).await?;
    Ok(HttpResponse::Ok().json(comment))
}

pub async fn get_replies(
    service: web::Data<CommentService>,
    comment_id: web::Path<i64>,
    viewer: MaybeUserId,
) -> Result<HttpResponse> {
    let replies = service.get_replies(*comment_id, viewer.0).await?;
    Ok(HttpResponse::Ok().json(replies))
}

pub async fn update_comment(
    service: web::Data<CommentService>,
    comment_id: web::Path<i64>,
    user_id: UserId,
    req: web::Json<UpdateCommentRequest>,
) -> Result<HttpResponse> {
    let comment = service
        .update_comment(user_id.0, *comment_id, req.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(comment))
}

pub async fn delete_comment(
    service: web::Data<CommentService>,
    comment_id: web::Path<i64>,
    user_id: UserId,
) -> Result<HttpResponse> {
    service.delete_comment(user_id.0, *comment_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn like_comment(
    service: web::Data<CommentService>,
    comment_id: web::Path<i64>,
    user_id: UserId,
) -> Result<HttpResponse> {
    service.like(user_id.0, *comment_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn unlike_comment(
    service: web::Data<CommentService>,
    comment_id: web::Path<i64>,
    user_id: UserId,
) -> Result<HttpResponse> {
    service.unlike(user_id.0, *comment_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn report_comment(
    service: web::Data<CommentService>,
    comment_id: web::Path<i64>,
    user_id: UserId,
) -> Result<HttpResponse> {
    service.report(user_id.0, *comment_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn unreport_comment(
    service: web::Data<CommentService>,
    comment_id: web::Path<i64>,
    user_id: UserId,
) -> Result<HttpResponse> {
    service.unreport(user_id.0, *comment_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
