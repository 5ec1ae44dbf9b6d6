//! Mutating admission review handling.
//!
//! A [`review::ReviewHandler`] decodes an `AdmissionReview`, runs a
//! [`mutation::Mutator`] against the embedded object and answers with a JSON
//! patch describing the edits, computed by the [`diff`] module.

pub mod admission_request;
pub mod admission_response;
pub mod admission_review;
pub mod cluster;
pub mod codec;
pub mod diff;
pub mod errors;
pub mod mutation;
pub mod review;

pub use json_patch::Patch;
