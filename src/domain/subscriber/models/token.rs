use rand::{distributions::Alphanumeric, thread_rng, Rng};

const TOKEN_LENGTH: usize = 25;

/// Opaque token mailed to a subscriber to confirm or cancel a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(String);

impl SubscriptionToken {
    pub fn parse(s: String) -> Result<SubscriptionToken, String> {
        if validate_token(&s) {
            Ok(Self(s))
        } else {
            Err(format!("{} is not a valid subscription token", s))
        }
    }

    pub fn new() -> Self {
        let mut rng = thread_rng();
        let token = std::iter::repeat_with(|| rng.sample(Alphanumeric))
            .map(char::from)
            .take(TOKEN_LENGTH)
            .collect();
        Self(token)
    }
}

impl Default for SubscriptionToken {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<str> for SubscriptionToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SubscriptionToken {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SubscriptionToken::parse(value)
    }
}

fn validate_token(token: &str) -> bool {
    let correct_length = token.len() > 20 && token.len() < 40;
    correct_length && token.chars().all(|c| c.is_ascii_alphanumeric())
}
