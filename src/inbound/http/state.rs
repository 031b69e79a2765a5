use crate::domain::auth::ports::AuthService;
use crate::domain::newsletter::ports::NewsletterService;
use crate::domain::post::ports::PostService;
use crate::domain::subscriber::ports::SubscriptionService;
use std::sync::Arc;

#[derive(Debug)]
pub struct SharedPostState<PS: PostService>(Arc<PS>);

impl<PS: PostService> SharedPostState<PS> {
    pub fn new(post_service: Arc<PS>) -> Self {
        Self(post_service)
    }
    pub fn post_service(&self) -> &PS {
        &self.0
    }
}

impl<PS: PostService> Clone for SharedPostState<PS> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

#[derive(Debug)]
pub struct SharedNewsletterState<NS: NewsletterService>(Arc<NS>);

impl<NS: NewsletterService> SharedNewsletterState<NS> {
    pub fn new(newsletter_service: Arc<NS>) -> Self {
        Self(newsletter_service)
    }
    pub fn newsletter_service(&self) -> &NS {
        &self.0
    }
}

impl<NS: NewsletterService> Clone for SharedNewsletterState<NS> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

#[derive(Debug)]
pub struct SharedSubscriptionState<SS: SubscriptionService>(Arc<SS>);

impl<SS: SubscriptionService> SharedSubscriptionState<SS> {
    pub fn new(subscription_service: Arc<SS>) -> Self {
        Self(subscription_service)
    }
    pub fn subscription_service(&self) -> &SS {
        &self.0
    }
}

impl<SS: SubscriptionService> Clone for SharedSubscriptionState<SS> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

#[derive(Debug)]
pub struct SharedAuthState<AS: AuthService>(Arc<AS>);

impl<AS: AuthService> SharedAuthState<AS> {
    pub fn new(auth_service: Arc<AS>) -> Self {
        Self(auth_service)
    }
    pub fn auth_service(&self) -> &AS {
        &self.0
    }
}

impl<AS: AuthService> Clone for SharedAuthState<AS> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}
