use crate::{
    domain::{
        auth::ports::AuthService,
        post::{
            models::post::{PostDto, PostRequest},
            ports::PostService,
        },
    },
    inbound::http::{
        auth::authenticated_editor,
        errors::AppError,
        state::{SharedAuthState, SharedPostState},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use uuid::Uuid;

#[derive(serde::Deserialize, Debug)]
pub struct PostFilter {
    pub published: Option<bool>,
}

#[tracing::instrument(
    name = "List newsletter posts",
    skip(post_state, auth_state, request),
    fields(editor_id = tracing::field::Empty)
)]
pub async fn list_posts<PS: PostService, AS: AuthService>(
    path: web::Path<Uuid>,
    filter: web::Query<PostFilter>,
    post_state: web::Data<SharedPostState<PS>>,
    auth_state: web::Data<SharedAuthState<AS>>,
    request: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let editor_id = authenticated_editor(&request, &auth_state).await?;
    let posts = post_state
        .post_service()
        .list_posts(editor_id, path.into_inner(), filter.published)
        .await?;

    let posts: Vec<PostDto> = posts.iter().map(PostDto::from).collect();
    Ok(HttpResponse::Ok().json(posts))
}

#[tracing::instrument(
    name = "Create a newsletter post",
    skip(body, post_state, auth_state, request),
    fields(editor_id = tracing::field::Empty)
)]
pub async fn create_post<PS: PostService, AS: AuthService>(
    path: web::Path<Uuid>,
    body: web::Json<PostRequest>,
    post_state: web::Data<SharedPostState<PS>>,
    auth_state: web::Data<SharedAuthState<AS>>,
    request: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let editor_id = authenticated_editor(&request, &auth_state).await?;
    let post = post_state
        .post_service()
        .create_post(editor_id, path.into_inner(), body.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(PostDto::from(&post)))
}

#[tracing::instrument(
    name = "Get a newsletter post",
    skip(post_state, auth_state, request),
    fields(editor_id = tracing::field::Empty)
)]
pub async fn get_post<PS: PostService, AS: AuthService>(
    path: web::Path<(Uuid, Uuid)>,
    post_state: web::Data<SharedPostState<PS>>,
    auth_state: web::Data<SharedAuthState<AS>>,
    request: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let editor_id = authenticated_editor(&request, &auth_state).await?;
    let (newsletter_id, post_id) = path.into_inner();
    let post = post_state
        .post_service()
        .get_post(editor_id, newsletter_id, post_id)
        .await?;

    Ok(HttpResponse::Ok().json(PostDto::from(&post)))
}

#[tracing::instrument(
    name = "Update a newsletter post",
    skip(body, post_state, auth_state, request),
    fields(editor_id = tracing::field::Empty)
)]
pub async fn update_post<PS: PostService, AS: AuthService>(
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<PostRequest>,
    post_state: web::Data<SharedPostState<PS>>,
    auth_state: web::Data<SharedAuthState<AS>>,
    request: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let editor_id = authenticated_editor(&request, &auth_state).await?;
    let (newsletter_id, post_id) = path.into_inner();
    let post = post_state
        .post_service()
        .update_post(editor_id, newsletter_id, post_id, body.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(PostDto::from(&post)))
}

#[tracing::instrument(
    name = "Delete a newsletter post",
    skip(post_state, auth_state, request),
    fields(editor_id = tracing::field::Empty)
)]
pub async fn delete_post<PS: PostService, AS: AuthService>(
    path: web::Path<(Uuid, Uuid)>,
    post_state: web::Data<SharedPostState<PS>>,
    auth_state: web::Data<SharedAuthState<AS>>,
    request: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let editor_id = authenticated_editor(&request, &auth_state).await?;
    let (newsletter_id, post_id) = path.into_inner();
    post_state
        .post_service()
        .delete_post(editor_id, newsletter_id, post_id)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

#[tracing::instrument(
    name = "Publish a newsletter post now",
    skip(post_state, auth_state, request),
    fields(editor_id = tracing::field::Empty)
)]
pub async fn publish_post<PS: PostService, AS: AuthService>(
    path: web::Path<(Uuid, Uuid)>,
    post_state: web::Data<SharedPostState<PS>>,
    auth_state: web::Data<SharedAuthState<AS>>,
    request: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let editor_id = authenticated_editor(&request, &auth_state).await?;
    let (newsletter_id, post_id) = path.into_inner();
    let post = post_state
        .post_service()
        .publish_now(editor_id, newsletter_id, post_id)
        .await?;

    Ok(HttpResponse::Ok().json(PostDto::from(&post)))
}
