//! Message card rendering and webhook delivery

mod card;
mod error;
mod webhook;

pub use card::{CardSection, Fact, MessageCard};
pub use error::NotifyError;
pub use webhook::{Notifier, TeamsWebhook};

#[cfg(test)]
pub use webhook::mock;
