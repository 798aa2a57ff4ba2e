//! In-memory adapters for tests and local wiring.

mod repository;
mod sample_store;
mod status;

pub use repository::InMemoryLicenseServerRepository;
pub use sample_store::InMemorySampleStore;
pub use status::InMemoryLicenseStatus;
