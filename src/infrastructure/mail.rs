pub mod mailer;
pub mod template;

pub use mailer::{HttpMailer, Mailer, OutgoingMail};
