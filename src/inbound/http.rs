use crate::configuration::ApplicationSettings;
use crate::domain::auth::ports::AuthService;
use crate::domain::newsletter::ports::NewsletterService;
use crate::domain::post::ports::PostService;
use crate::domain::subscriber::ports::SubscriptionService;
use crate::inbound::http::handlers::{
    confirm, create_newsletter, create_post, delete_post, get_newsletter, get_post, health_check,
    list_newsletters, list_posts, list_subscribers, publish_post, subscribe, unsubscribe,
    update_post,
};
use crate::inbound::http::state::{
    SharedAuthState, SharedNewsletterState, SharedPostState, SharedSubscriptionState,
};
use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

mod auth;
mod errors;
mod handlers;
pub mod state;

pub struct Application {
    port: u16,
    server: Server,
}

/// Services the HTTP surface delegates to.
pub struct Services<PS, NS, SS, AS>
where
    PS: PostService,
    NS: NewsletterService,
    SS: SubscriptionService,
    AS: AuthService,
{
    pub posts: Arc<PS>,
    pub newsletters: Arc<NS>,
    pub subscriptions: Arc<SS>,
    pub auth: Arc<AS>,
}

fn run<PS, NS, SS, AS>(
    listener: TcpListener,
    services: Services<PS, NS, SS, AS>,
) -> Result<Server, std::io::Error>
where
    PS: PostService,
    NS: NewsletterService,
    SS: SubscriptionService,
    AS: AuthService,
{
    let post_state = web::Data::new(SharedPostState::new(services.posts));
    let newsletter_state = web::Data::new(SharedNewsletterState::new(services.newsletters));
    let subscription_state = web::Data::new(SharedSubscriptionState::new(services.subscriptions));
    let auth_state = web::Data::new(SharedAuthState::new(services.auth));

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .app_data(post_state.clone())
            .app_data(newsletter_state.clone())
            .app_data(subscription_state.clone())
            .app_data(auth_state.clone())
            .service(
                web::scope("/api/v1")
                    .route("/newsletters", web::post().to(create_newsletter::<NS, AS>))
                    .route("/newsletters", web::get().to(list_newsletters::<NS, AS>))
                    .route("/newsletters/{id}", web::get().to(get_newsletter::<NS, AS>))
                    .route("/newsletters/{id}/posts", web::get().to(list_posts::<PS, AS>))
                    .route("/newsletters/{id}/posts", web::post().to(create_post::<PS, AS>))
                    .route(
                        "/newsletters/{id}/posts/{post_id}",
                        web::get().to(get_post::<PS, AS>),
                    )
                    .route(
                        "/newsletters/{id}/posts/{post_id}",
                        web::put().to(update_post::<PS, AS>),
                    )
                    .route(
                        "/newsletters/{id}/posts/{post_id}",
                        web::delete().to(delete_post::<PS, AS>),
                    )
                    .route(
                        "/newsletters/{id}/posts/{post_id}/publish",
                        web::post().to(publish_post::<PS, AS>),
                    )
                    .route(
                        "/newsletters/{id}/subscribers",
                        web::get().to(list_subscribers::<SS, AS>),
                    )
                    .route("/newsletters/{id}/subscribe", web::post().to(subscribe::<SS>))
                    .route("/subscribe/confirm/{token}", web::get().to(confirm::<SS>))
                    .route("/unsubscribe/{token}", web::get().to(unsubscribe::<SS>)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}

impl Application {
    pub async fn build<PS, NS, SS, AS>(
        services: Services<PS, NS, SS, AS>,
        configuration: &ApplicationSettings,
    ) -> Result<Self, std::io::Error>
    where
        PS: PostService,
        NS: NewsletterService,
        SS: SubscriptionService,
        AS: AuthService,
    {
        let address = format!("{}:{}", configuration.host, configuration.port);
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();
        let server = run(listener, services)?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}
