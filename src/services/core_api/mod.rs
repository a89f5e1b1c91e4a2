//! Core REST API client (COR-901 authorize, COR-112 DID lookup, COR-001 member registration).
pub mod client;
pub mod error;
pub mod signer;
pub mod types;

pub use client::{AuthorizeResponse, CoreApi, CoreApiClient};
pub use error::{CoreApiError, SppMemberRegisterError};
pub use types::SppMemberDetails;
