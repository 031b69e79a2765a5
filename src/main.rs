use newsletter::configuration::get_configuration;
use newsletter::domain::auth::service::JwtAuth;
use newsletter::domain::newsletter::service::BlogNewsletters;
use newsletter::domain::post::service::BlogPosts;
use newsletter::domain::subscriber::service::Subscription;
use newsletter::inbound::http::{Application, Services};
use newsletter::outbound::db::postgres_db::PostgresDb;
use newsletter::outbound::notifier::email_client::EmailClient;
use newsletter::outbound::telemetry::init_logger;
use newsletter::scheduler::PostPublisher;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let configuration = get_configuration()?;
    init_logger("newsletter", &configuration.log_level(), std::io::stdout)?;

    let db = Arc::new(PostgresDb::new(&configuration.database));
    db.migrate().await?;
    let email_client = Arc::new(EmailClient::new(configuration.email_client.clone())?);

    let posts = Arc::new(BlogPosts::new(
        Arc::clone(&db),
        Arc::clone(&db),
        Arc::clone(&db),
        Arc::clone(&email_client),
    ));
    let newsletters = Arc::new(BlogNewsletters::new(Arc::clone(&db)));
    let subscriptions = Arc::new(Subscription::new(
        Arc::clone(&db),
        Arc::clone(&db),
        Arc::clone(&email_client),
        &configuration.application.base_url,
    ));
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
    .await?;
    let publisher = PostPublisher::new(posts, &configuration.scheduler).start();
    let outcome = application.run_until_stopped().await;

    publisher.stop().await;
    outcome?;
    Ok(())
}
