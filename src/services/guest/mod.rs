pub mod record;
pub mod store;

pub use record::GuestRegistrationRecord;
pub use store::{CacheGuestStore, GuestStore, GuestStoreError};
