//! # kt-harness
//!
//! Generic harness for contract tests against a REST resource.
//!
//! A [`Suite`] owns an ordered list of [`TestCase`]s and a shared context
//! (typically a `kt_client::ResourceClient` plus an auth bridge). Each case
//! body returns a [`TestOutcome`] built with [`pass`], [`fail`],
//! [`precondition`] or [`unexpected`]; response records are compared with
//! [`verify_is_same`] against a [`Shape`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod case;
pub mod outcome;
pub mod shape;
pub mod suite;

pub use case::{TestCase, TestInfo, TestState};
pub use outcome::{fail, handle_error, pass, precondition, unexpected, FailureKind, TestOutcome};
pub use shape::{verify_is_same, Field, FieldKind, Shape, ShapeMismatch};
pub use suite::{CaseReport, NoopObserver, Suite, SuiteObserver, SuiteReport, TestFilter};
