//! Certificate files: layout, expiry and export

mod expiry;
mod layout;

pub use expiry::{needs_renewal, read_not_after};
pub use layout::{CertificateLayout, backup_path};
