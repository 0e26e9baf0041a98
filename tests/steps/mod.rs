//! Step definition modules for Cucumber feature tests.

pub mod orchestration;
