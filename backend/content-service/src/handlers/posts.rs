/// Post handlers - HTTP endpoints for post operations
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::Result;
use crate::middleware::{MaybeUserId, UserId};
use crate::models::{CreatePostRequest, UpdatePostRequest};
use crate::services::{PostService, DEFAULT_PAGE_SIZE};

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

pub async fn list_posts(
    service: web::Data<PostService>,
    query: web::Query<PageParams>,
    viewer: MaybeUserId,
) -> Result<HttpResponse> {
    let posts = service
        .list_posts(
            query.page.unwrap_or(1),
            query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            viewer.0,
        )
        .await?;

    Ok(HttpResponse::Ok().json(posts))
}

pub async fn create_post(
    service: web::Data<PostService>,
    user_id: UserId,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    let post = service.create_post(user_id.0, req.into_inner()).await?;
    Ok(HttpResponse::Created().json(post))
}

pub async fn get_post(
    service: web::Data<PostService>,
    post_id: web::Path<i64>,
    viewer: MaybeUserId,
) -> Result<HttpResponse> {
    let post = service.get_post(*post_id, viewer.0).await?;
    Ok(HttpResponse::Ok().json(post))
}

pub async fn update_post(
    service: web::Data<PostService>,
    post_id: web::Path<i64>,
    user_id: UserId,
    req: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse> {
    let post = service
        .update_post(user_id.0, *post_id, req.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(post))
}

pub async fn delete_post(
    service: web::Data<PostService>,
    post_id: web::Path<i64>,
    user_id: UserId,
) -> Result<HttpResponse> {
    service.delete_post(user_id.0, *post_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn get_user_posts(
    service: web::Data<PostService>,
    user_id: web::Path<Uuid>,
    viewer: MaybeUserId,
) -> Result<HttpResponse> {
    let posts = service.get_user_posts(*user_id, viewer.0).await?;
    Ok(HttpResponse::Ok().json(posts))
}

pub async fn get_saved_posts(
    service: web::Data<PostService>,
    user_id: UserId,
) -> Result<HttpResponse> {
    let posts = service.get_saved_posts(user_id.0).await?;
    Ok(HttpResponse::Ok().json(posts))
}

pub async fn like_post(
    service: web::Data<PostService>,
    post_id: web::Path<i64>,
    user_id: UserId,
) -> Result<HttpResponse> {
    service.like(user_id.0, *post_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn unlike_post(
    service: web::Data<PostService>,
    post_id: web::Path<i64>,
    user_id: UserId,
) -> Result<HttpResponse> {
    service.unlike(user_id.0, *post_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn save_post(
    service: web::Data<PostService>,
    post_id: web::Path<i64>,
    user_id: UserId,
) -> Result<HttpResponse> {
    service.save(user_id.0, *post_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn unsave_post(
    service: web::Data<PostService>,
    post_id: web::Path<i64>,
    user_id: UserId,
) -> Result<HttpResponse> {
    service.unsave(user_id.0, *post_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn report_post(
    service: web::Data<PostService>,
    post_id: web::Path<i64>,
    user_id: UserId,
) -> Result<HttpResponse> {
    service.report(user_id.0, *post_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn unreport_post(
    service: web::Data<PostService>,
    post_id: web::Path<i64>,
    user_id: UserId,
) -> Result<HttpResponse> {
    service.unreport(user_id.0, *post_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
