pub mod email;
pub mod subscriber;
pub mod token;
