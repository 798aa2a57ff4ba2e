//! Unit tests for license server services.
//!
//! Tests are organised by concern: configuration flows and usage reads run
//! against the in-memory adapters, store interaction is pinned down with
//! mocks, the reconcile rules are checked as properties, and a gated store
//! holds a submission open to observe per-server write ordering.
