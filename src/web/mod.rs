pub mod coop;
pub mod extractors;
pub mod forms;
pub mod handlers;
pub mod routes;
pub mod view;

pub use routes::routes;
