//! Submission module: records and retrieves student work.
//!
//! Every query scopes by the authenticated student's id; ownership is never
//! taken from the client (the unauthenticated single-question practice path
//! is the documented exception).

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::SubmissionService;
