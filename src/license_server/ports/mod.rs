//! Port contracts for license server configuration and usage reads.

mod repository;
mod sample_store;
mod status;

pub use repository::{
    LicenseServerRepository, LicenseServerRepositoryError, LicenseServerRepositoryResult,
};
pub use sample_store::{
    SampleFrame, SampleRow, SampleSource, SampleStore, SampleStoreError, SampleStoreResult,
};
pub use status::{LicenseStatusError, LicenseStatusQuery, LicenseStatusResult};
