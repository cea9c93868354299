use actix_web::{web, HttpResponse, Responder};
use log::info;
use tokio::task;

use crate::error::{ApiError, Error};
use crate::models::{Post, UpdatePost};
use crate::repository::PostRepository;

type Repo = web::Data<dyn PostRepository>;

/// Runs a store call on the blocking pool; rusqlite calls are synchronous.
async fn blocking<F, T>(repo: &Repo, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&dyn PostRepository) -> crate::error::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let repo = repo.clone().into_inner();
    let result = task::spawn_blocking(move || f(repo.as_ref()))
        .await
        .map_err(Error::from)?;
    Ok(result?)
}

pub async fn find_all(repo: Repo) -> Result<HttpResponse, ApiError> {
    let posts = blocking(&repo, |r| r.find_all()).await?;
    Ok(HttpResponse::Ok().json(posts))
}

pub async fn find_by_id(repo: Repo, path: web::Path<i32>) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let post = blocking(&repo, move |r| r.find_by_id(id))
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(HttpResponse::Ok().json(post))
}

pub async fn create(repo: Repo, payload: web::Json<Post>) -> Result<HttpResponse, ApiError> {
    let mut post = payload.into_inner();
    post.validate().map_err(ApiError::Validation)?;
    post.version = None;

    // An id that is already stored gets overwritten.
    let saved = blocking(&repo, move |r| r.save(&post)).await?;
    info!("Created post {} for user {}", saved.id, saved.user_id);
    Ok(HttpResponse::Created().json(saved))
}

pub async fn update(
    repo: Repo,
    path: web::Path<i32>,
    payload: web::Json<UpdatePost>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let update = payload.into_inner();
    update.validate().map_err(ApiError::Validation)?;

    let existing = blocking(&repo, move |r| r.find_by_id(id))
        .await?
        .ok_or(ApiError::NotFound)?;
    let merged = existing.merged_with(update);
    let saved = blocking(&repo, move |r| r.save(&merged)).await?;
    info!("Updated post {} to version {:?}", saved.id, saved.version);
    Ok(HttpResponse::Ok().json(saved))
}

pub async fn delete(repo: Repo, path: web::Path<i32>) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    blocking(&repo, move |r| r.delete_by_id(id)).await?;
    info!("Deleted post {}", id);
    Ok(HttpResponse::NoContent().finish())
}

pub async fn not_found() -> impl Responder {
    HttpResponse::NotFound().json("404 Not Found")
}

/// Mounts the post routes under `/api/posts`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default()
        .error_handler(|err, _req| ApiError::Malformed(err.to_string()).into());
    let path_config = web::PathConfig::default()
        .error_handler(|err, _req| ApiError::Malformed(err.to_string()).into());

    cfg.service(
        web::scope("/api/posts")
            .app_data(json_config)
            .app_data(path_config)
            .route("", web::get().to(find_all))
            .route("", web::post().to(create))
            .route("/{id}", web::get().to(find_by_id))
            .route("/{id}", web::put().to(update))
            .route("/{id}", web::delete().to(delete)),
    );
}
