use validator::validate_email;

/// A syntactically valid address, trimmed and lower-cased so that the same
/// mailbox cannot subscribe twice under different spellings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriberEmail(String);

#[derive(thiserror::Error, Debug)]
#[error("{0} is not a valid email address")]
pub struct InvalidEmail(String);

impl SubscriberEmail {
    pub fn parse(raw: String) -> Result<SubscriberEmail, InvalidEmail> {
        let normalized = raw.trim().to_lowercase();
        if validate_email(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(InvalidEmail(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriberEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<SubscriberEmail> for String {
    fn from(email: SubscriberEmail) -> Self {
        email.0
    }
}
