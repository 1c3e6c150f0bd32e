//! # kt-keeps
//!
//! Contract tests for the Keeps REST resource (`/api/keeps`).
//!
//! The [`keeps_suite`] builder registers six cases covering creation with
//! server-assigned ownership, public listing, read by id, edit, delete and
//! private creation.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod model;
pub mod suite;

pub use model::{Keep, PLACEHOLDER_IMG, UNTRUSTED_USER_ID};
pub use suite::{keeps_suite, KeepsContext, EDITED_NAME, KEEPS_PATH, SUITE_NAME};
