pub mod redirect;
pub mod service;

pub use redirect::UnexpectedReason;
pub use service::{LoginError, LoginOutcome, LoginRequest, LoginService};
