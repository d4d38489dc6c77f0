//! ACME client implementations

mod certbot;

pub use certbot::{CertbotClient, CertbotOptions, CertbotSession};
