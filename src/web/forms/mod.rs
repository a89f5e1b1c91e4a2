/*
 * Responsibility
 * - /Login 画面の form binding と validation (field 単位のメッセージを返す)
 */
pub mod empty_mail;
pub mod login;

pub use empty_mail::EmptyMailForm;
pub use login::{LoginForm, LoginPageSubmission};
