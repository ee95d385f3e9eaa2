pub mod handlers;
pub mod mailer;
pub mod repository;

pub use handlers::verify_email;
pub use mailer::{EmailMessage, LogMailer, Mailer};
pub use repository::{
    InMemoryVerificationRepository, PostgresVerificationRepository, VerificationRepository,
};
