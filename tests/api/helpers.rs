use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use once_cell::sync::Lazy;
use secrecy::ExposeSecret;
use std::collections::{HashMap, HashSet};
use sqlx::{Connection, Executor, PgConnection, PgPool};
use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use newsletter::configuration::{get_configuration, DatabaseSettings, SchedulerSettings, Settings};
use newsletter::domain::auth::{credentials::Claims, service::JwtAuth};
use newsletter::domain::editor::EditorId;
use newsletter::domain::newsletter::{
    errors::NewsletterError,
    models::newsletter::{Newsletter, NewsletterId},
    ports::NewsletterRepository,
    service::BlogNewsletters,
};
use newsletter::domain::post::{
    errors::PostError,
    models::{
        post::{Post, PostDraft, PostId, PostRequest},
        status::PostStatus,
        timeline::Timeline,
    },
    ports::{PostRepository, StatusTransition},
    service::BlogPosts,
};
use newsletter::domain::subscriber::{
    errors::SubscriberError,
    models::{
        subscriber::{ConfirmedSubscriber, SubscribeRequest, Subscriber},
        token::SubscriptionToken,
    },
    ports::SubscriberRepository,
    service::Subscription,
};
use newsletter::inbound::http::{Application, Services};
use newsletter::outbound::db::postgres_db::PostgresDb;
use newsletter::outbound::notifier::email_client::EmailClient;
use newsletter::outbound::telemetry::init_logger;
use newsletter::scheduler::PostPublisher;

/// Every repository port the application needs, served by a single store.
pub trait TestStore:
    NewsletterRepository + SubscriberRepository + PostRepository + Send + Sync + 'static
{
}

impl<T> TestStore for T where
    T: NewsletterRepository + SubscriberRepository + PostRepository + Send + Sync + 'static
{
}

pub type TestPostService<S> = BlogPosts<S, S, S, EmailClient>;

/// Stands in for Postgres so the suite runs without a database.
#[derive(Default)]
pub struct InMemoryStore {
    newsletters: Mutex<HashMap<NewsletterId, Newsletter>>,
    subscribers: Mutex<Vec<Subscriber>>,
    posts: Mutex<HashMap<PostId, Post>>,
    failing_posts: Mutex<HashSet<PostId>>,
}

impl InMemoryStore {
    pub fn post(&self, post_id: PostId) -> Option<Post> {
        self.posts.lock().unwrap().get(&post_id).cloned()
    }

    pub fn post_count(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    pub fn subscriber(&self, email: &str) -> Option<Subscriber> {
        self.subscribers
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.email.as_str() == email)
            .cloned()
    }

    /// Make `mark_published` fail for this post, as a broken store row would.
    pub fn fail_publication_of(&self, post_id: PostId) {
        self.failing_posts.lock().unwrap().insert(post_id);
    }
}

#[async_trait]
impl NewsletterRepository for InMemoryStore {
    async fn get(&self, newsletter_id: NewsletterId) -> Result<Newsletter, NewsletterError> {
        self.newsletters
            .lock()
            .unwrap()
            .get(&newsletter_id)
            .cloned()
            .ok_or_else(|| NewsletterError::NotFound(newsletter_id.to_string()))
    }

    async fn insert(&self, newsletter: &Newsletter) -> Result<(), NewsletterError> {
        self.newsletters
            .lock()
            .unwrap()
            .insert(newsletter.id, newsletter.clone());
        Ok(())
    }

    async fn list_by_editor(
        &self,
        editor_id: EditorId,
    ) -> Result<Vec<Newsletter>, NewsletterError> {
        let mut owned: Vec<Newsletter> = self
            .newsletters
            .lock()
            .unwrap()
            .values()
            .filter(|n| n.editor_id == editor_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }
}

#[async_trait]
impl SubscriberRepository for InMemoryStore {
    async fn insert(&self, subscriber: &Subscriber) -> Result<(), SubscriberError> {
        let mut subscribers = self.subscribers.lock().unwrap();
        if subscribers
            .iter()
            .any(|s| s.newsletter_id == subscriber.newsletter_id && s.email == subscriber.email)
        {
            return Err(SubscriberError::AlreadySubscribed(
                subscriber.email.to_string(),
            ));
        }
        subscribers.push(subscriber.clone());
        Ok(())
    }

    async fn confirm_by_token(
        &self,
        token: &SubscriptionToken,
    ) -> Result<Subscriber, SubscriberError> {
        let mut subscribers = self.subscribers.lock().unwrap();
        let subscriber = subscribers
            .iter_mut()
            .find(|s| &s.confirmation_token == token && s.unsubscribed_at.is_none())
            .ok_or_else(|| SubscriberError::NotFound("unknown token".into()))?;
        subscriber.confirmed = true;
        Ok(subscriber.clone())
    }

    async fn unsubscribe_by_token(
        &self,
        token: &SubscriptionToken,
        at: DateTime<Utc>,
    ) -> Result<Subscriber, SubscriberError> {
        let mut subscribers = self.subscribers.lock().unwrap();
        let subscriber = subscribers
            .iter_mut()
            .find(|s| &s.unsubscribe_token == token && s.unsubscribed_at.is_none())
            .ok_or_else(|| SubscriberError::NotFound("unknown token".into()))?;
        subscriber.unsubscribed_at = Some(at);
        Ok(subscriber.clone())
    }

    async fn list_by_newsletter(
        &self,
        newsletter_id: NewsletterId,
    ) -> Result<Vec<Subscriber>, SubscriberError> {
        Ok(self
            .subscribers
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.newsletter_id == newsletter_id)
            .cloned()
            .collect())
    }

    async fn list_confirmed(
        &self,
        newsletter_id: NewsletterId,
    ) -> Result<Vec<Result<ConfirmedSubscriber, SubscriberError>>, SubscriberError> {
        Ok(self
            .subscribers
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.newsletter_id == newsletter_id && s.receives_posts())
            .map(|s| ConfirmedSubscriber::new(s).map_err(SubscriberError::ValidationError))
            .collect())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn find_by_newsletter(
        &self,
        newsletter_id: NewsletterId,
        published: Option<bool>,
    ) -> Result<Vec<Post>, PostError> {
        let mut posts: Vec<Post> = self
            .posts
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.newsletter_id == newsletter_id)
            .filter(|p| published.map_or(true, |wanted| p.is_posted() == wanted))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn find_by_id(&self, post_id: PostId) -> Result<Post, PostError> {
        self.post(post_id)
            .ok_or_else(|| PostError::NotFound(post_id.to_string()))
    }

    async fn find_due(&self, as_of: DateTime<Utc>) -> Result<Vec<Post>, PostError> {
        let mut due: Vec<Post> = self
            .posts
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.status() == PostStatus::Scheduled)
            .filter(|p| p.timeline.scheduled_at().map_or(false, |at| at <= as_of))
            .cloned()
            .collect();
        due.sort_by_key(|p| p.timeline.scheduled_at());
        Ok(due)
    }

    async fn insert(&self, post: &Post) -> Result<(), PostError> {
        self.posts.lock().unwrap().insert(post.id, post.clone());
        Ok(())
    }

    async fn update(&self, post: &Post) -> Result<(), PostError> {
        let mut posts = self.posts.lock().unwrap();
        let stored = posts
            .get_mut(&post.id)
            .ok_or_else(|| PostError::NotFound(post.id.to_string()))?;
        let timeline = if stored.is_posted() {
            stored.timeline
        } else {
            post.timeline
        };
        *stored = Post {
            timeline,
            ..post.clone()
        };
        Ok(())
    }

    async fn mark_published(
        &self,
        post_id: PostId,
        published_at: DateTime<Utc>,
    ) -> Result<StatusTransition, PostError> {
        if self.failing_posts.lock().unwrap().contains(&post_id) {
            return Err(PostError::Unexpected(anyhow::anyhow!(
                "simulated store failure"
            )));
        }
        let mut posts = self.posts.lock().unwrap();
        let post = posts
            .get_mut(&post_id)
            .ok_or_else(|| PostError::NotFound(post_id.to_string()))?;
        if post.is_posted() {
            return Ok(StatusTransition::AlreadyPosted);
        }
        post.timeline = Timeline::restore(
            PostStatus::Posted,
            post.timeline.scheduled_at(),
            Some(published_at),
        )
        .map_err(|e| PostError::Unexpected(anyhow::anyhow!(e)))?;
        Ok(StatusTransition::Applied)
    }

    async fn delete(&self, post_id: PostId) -> Result<(), PostError> {
        self.posts
            .lock()
            .unwrap()
            .remove(&post_id)
            .map(|_| ())
            .ok_or_else(|| PostError::NotFound(post_id.to_string()))
    }
}

pub struct ConfirmationLinks {
    pub html: reqwest::Url,
    pub plain_text: reqwest::Url,
}

pub struct TestEditor {
    pub id: EditorId,
    pub token: String,
}

pub struct TestApp<S = InMemoryStore>
where
    S: TestStore,
{
    pub address: String,
    pub port: u16,
    pub email_server: MockServer,
    pub store: Arc<S>,
    pub posts: Arc<TestPostService<S>>,
    pub editor: TestEditor,
    jwt_secret: String,
    api_client: reqwest::Client,
}

impl<S> TestApp<S>
where
    S: TestStore,
{
    pub fn another_editor(&self) -> TestEditor {
        let id = EditorId::new(Uuid::new_v4());
        TestEditor {
            id,
            token: mint_token(id, &self.jwt_secret, Duration::hours(1)),
        }
    }

    pub fn expired_token(&self) -> String {
        mint_token(self.editor.id, &self.jwt_secret, Duration::minutes(-5))
    }

    pub fn publisher(&self, settings: &SchedulerSettings) -> PostPublisher<TestPostService<S>> {
        PostPublisher::new(Arc::clone(&self.posts), settings)
    }

    /// Accept every mail the application sends.
    pub async fn accept_emails(&self) {
        Mock::given(path("/emails"))
            .and(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&self.email_server)
            .await;
    }

    pub async fn email_requests(&self) -> Vec<wiremock::Request> {
        self.email_server.received_requests().await.unwrap()
    }

    pub async fn post_newsletters(&self, token: &str, body: serde_json::Value) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/api/v1/newsletters", &self.address))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get(&self, token: Option<&str>, route: &str) -> reqwest::Response {
        let mut request = self
            .api_client
            .get(&format!("{}/api/v1{}", &self.address, route));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Failed to execute request.")
    }

    pub async fn create_newsletter(&self, name: &str) -> NewsletterId {
        let response = self
            .post_newsletters(&self.editor.token, serde_json::json!({ "name": name }))
            .await;
        assert_eq!(201, response.status().as_u16());
        let body: serde_json::Value = response.json().await.unwrap();
        body["id"].as_str().unwrap().parse().unwrap()
    }

    pub async fn post_posts(
        &self,
        token: &str,
        newsletter_id: NewsletterId,
        body: serde_json::Value,
    ) -> reqwest::Response {
        self.api_client
            .post(&format!(
                "{}/api/v1/newsletters/{}/posts",
                &self.address, newsletter_id
            ))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn put_post(
        &self,
        token: &str,
        newsletter_id: NewsletterId,
        post_id: PostId,
        body: serde_json::Value,
    ) -> reqwest::Response {
        self.api_client
            .put(&format!(
                "{}/api/v1/newsletters/{}/posts/{}",
                &self.address, newsletter_id, post_id
            ))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn delete_post(
        &self,
        token: &str,
        newsletter_id: NewsletterId,
        post_id: PostId,
    ) -> reqwest::Response {
        self.api_client
            .delete(&format!(
                "{}/api/v1/newsletters/{}/posts/{}",
                &self.address, newsletter_id, post_id
            ))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn publish_post(
        &self,
        token: &str,
        newsletter_id: NewsletterId,
        post_id: PostId,
    ) -> reqwest::Response {
        self.api_client
            .post(&format!(
                "{}/api/v1/newsletters/{}/posts/{}/publish",
                &self.address, newsletter_id, post_id
            ))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_subscribe(
        &self,
        newsletter_id: NewsletterId,
        body: serde_json::Value,
    ) -> reqwest::Response {
        self.api_client
            .post(&format!(
                "{}/api/v1/newsletters/{}/subscribe",
                &self.address, newsletter_id
            ))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Create a post through the API and return its JSON representation.
    pub async fn create_post(
        &self,
        newsletter_id: NewsletterId,
        title: &str,
        scheduled_at: DateTime<Utc>,
    ) -> serde_json::Value {
        let response = self
            .post_posts(
                &self.editor.token,
                newsletter_id,
                post_body(title, scheduled_at),
            )
            .await;
        assert_eq!(201, response.status().as_u16());
        response.json().await.unwrap()
    }

    /// Store a post scheduled for `send_at` without going through the API.
    pub async fn seed_scheduled_post(
        &self,
        newsletter_id: NewsletterId,
        send_at: DateTime<Utc>,
    ) -> PostId {
        let request = PostRequest {
            title: format!("Scheduled for {}", send_at),
            content_html: "<p>Scheduled content</p>".to_string(),
            content_text: None,
            scheduled_at: Some(send_at),
        };
        let draft = PostDraft::try_from(request).unwrap();
        let post = Post::create(newsletter_id, self.editor.id, draft, send_at - Duration::hours(1));
        PostRepository::insert(self.store.as_ref(), &post).await.unwrap();
        post.id
    }

    /// Read a post back from whichever store backs the application.
    pub async fn stored_post(&self, post_id: PostId) -> Option<Post> {
        PostRepository::find_by_id(self.store.as_ref(), post_id)
            .await
            .ok()
    }

    pub async fn add_subscriber(&self, newsletter_id: NewsletterId, email: &str) -> Subscriber {
        let request = SubscribeRequest {
            email: email.to_string(),
        };
        let subscriber = Subscriber::new(newsletter_id, request, Utc::now()).unwrap();
        SubscriberRepository::insert(self.store.as_ref(), &subscriber)
            .await
            .unwrap();
        subscriber
    }

    pub async fn add_confirmed_subscriber(
        &self,
        newsletter_id: NewsletterId,
        email: &str,
    ) -> Subscriber {
        let subscriber = self.add_subscriber(newsletter_id, email).await;
        self.store
            .confirm_by_token(&subscriber.confirmation_token)
            .await
            .unwrap()
    }

    pub fn get_confirmation_links(&self, email_request: &wiremock::Request) -> ConfirmationLinks {
        let body: serde_json::Value = serde_json::from_slice(&email_request.body).unwrap();
        let get_link = |s: &str| {
            let links: Vec<_> = linkify::LinkFinder::new()
                .links(s)
                .filter(|l| *l.kind() == linkify::LinkKind::Url)
                .collect();
            assert_eq!(links.len(), 1);
            let raw_link = links[0].as_str().to_owned();
            let mut confirmation_link = reqwest::Url::parse(&raw_link).unwrap();
            assert_eq!(confirmation_link.host_str().unwrap(), "127.0.0.1");
            confirmation_link.set_port(Some(self.port)).unwrap();
            confirmation_link
        };

        let html = get_link(body["html"].as_str().unwrap());
        let plain_text = get_link(body["text"].as_str().unwrap());
        ConfirmationLinks { html, plain_text }
    }
}

pub fn post_body(title: &str, scheduled_at: DateTime<Utc>) -> serde_json::Value {
    serde_json::json!({
        "title": title,
        "content_html": "<p>Newsletter body as HTML</p>",
        "content_text": "Newsletter body as plain text",
        "scheduled_at": scheduled_at.to_rfc3339(),
    })
}

/// Recipients of a captured mail request.
pub fn recipients(email_request: &wiremock::Request) -> Vec<String> {
    let body: serde_json::Value = serde_json::from_slice(&email_request.body).unwrap();
    let mut to: Vec<String> = body["to"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r.as_str().unwrap().to_string())
        .collect();
    to.sort();
    to
}

/// Sign an HS256 token the way the identity provider does.
pub fn mint_token(editor_id: EditorId, secret: &str, valid_for: Duration) -> String {
    let claims = Claims {
        sub: editor_id.as_uuid(),
        exp: (Utc::now() + valid_for).timestamp(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to sign token")
}

/// Bunyan records written while a test-local subscriber is installed.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Levels of the records emitted by this crate, ignoring dependencies.
    pub fn crate_levels(&self) -> Vec<u64> {
        let buffer = self.0.lock().unwrap();
        String::from_utf8_lossy(&buffer)
            .lines()
            .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
            .filter(|record| {
                record["target"]
                    .as_str()
                    .map_or(false, |target| target.starts_with("newsletter"))
            })
            .filter_map(|record| record["level"].as_u64())
            .collect()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

static TRACING: Lazy<()> = Lazy::new(|| {
    let c = get_configuration().expect("Failed to read configuration");
    let default_filter_level = c.general.log_level;
    let subscriber_name = "test".to_string();
    if std::env::var("TEST_LOG").is_ok() {
        init_logger(&subscriber_name, &default_filter_level, std::io::stdout)
            .expect("Failed to init logger");
    } else {
        init_logger(&subscriber_name, &default_filter_level, std::io::sink)
            .expect("Failed to init logger");
    }
});

fn test_configuration(email_server: &MockServer) -> Settings {
    let mut c = get_configuration().expect("Failed to read configuration");
    c.application.port = 0;
    c.email_client.base_url = email_server.uri();
    c
}

pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);
    let email_server = MockServer::start().await;
    let configuration = test_configuration(&email_server);
    let store = Arc::new(InMemoryStore::default());
    build_app(store, configuration, email_server).await
}

/// Same application, backed by Postgres in a database of its own.
pub async fn spawn_postgres_app() -> TestApp<PostgresDb> {
    Lazy::force(&TRACING);
    let email_server = MockServer::start().await;
    let configuration = {
        let mut c = test_configuration(&email_server);
        c.database.database_name = Uuid::new_v4().to_string();
        c
    };
    configure_database(&configuration.database).await;
    let store = Arc::new(PostgresDb::new(&configuration.database));
    build_app(store, configuration, email_server).await
}

async fn configure_database(config: &DatabaseSettings) -> PgPool {
    let mut connection = PgConnection::connect_with(&config.without_db())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(format!(r#"CREATE DATABASE "{}";"#, config.database_name).as_str())
        .await
        .expect("Failed to create database.");

    let connection_pool = PgPool::connect_with(config.with_db())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database");
    connection_pool
}

async fn build_app<S>(store: Arc<S>, configuration: Settings, email_server: MockServer) -> TestApp<S>
where
    S: TestStore,
{
    let email_client = Arc::new(
        EmailClient::new(configuration.email_client.clone()).expect("Failed to build email client"),
    );

    let posts = Arc::new(BlogPosts::new(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::clone(&email_client),
    ));
    let newsletters = Arc::new(BlogNewsletters::new(Arc::clone(&store)));
    let subscriptions = Arc::new(Subscription::new(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::clone(&email_client),
        &configuration.application.base_url,
    ));
    let jwt_secret = configuration
        .application
        .jwt_secret
        .expose_secret()
        .to_string();
    let auth = Arc::new(JwtAuth::new(configuration.application.jwt_secret.clone()));

    let application = Application::build(
        Services {
            posts: Arc::clone(&posts),
            newsletters,
            subscriptions,
            auth,
        },
        &configuration.application,
    )
    .await
    .expect("Failed to build application.");
    let port = application.port();
    let _ = tokio::spawn(application.run_until_stopped());

    let editor_id = EditorId::new(Uuid::new_v4());
    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        port,
        email_server,
        store,
        posts,
        editor: TestEditor {
            id: editor_id,
            token: mint_token(editor_id, &jwt_secret, Duration::hours(1)),
        },
        jwt_secret,
        api_client: reqwest::Client::new(),
    }
}
