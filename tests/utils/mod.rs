pub mod actions;
pub mod assertions;
pub mod mocks;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use actions::{Browser, GraphqlResponse};
#[allow(unused_imports)]
pub use mocks::RecordingMailer;
#[allow(unused_imports)]
pub use setup::{TestApp, TestAppBuilder};
