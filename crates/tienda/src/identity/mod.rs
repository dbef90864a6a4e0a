//! Identity: user persistence, registration/confirmation flows, mail jobs.

pub mod mail;
pub mod manager;
pub mod service;

pub use mail::{LogMailer, MailQueue, MailRequest, Mailer};
pub use manager::{SqliteUserStore, UserStore};
pub use service::IdentityService;
