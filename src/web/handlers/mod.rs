pub mod empty_mail;
pub mod error_pages;
pub mod health;
pub mod login;
