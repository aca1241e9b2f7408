pub mod extract;
pub mod hash;
pub mod text;
pub mod jwt;
pub mod mailer;
