//! Mixed-integer backend for the cab pooling engine.
//!
//! This crate provides [`LpBackend`], the default implementation of the
//! [`MipBackend`](cabpool_core::MipBackend) trait. It translates a
//! [`LinearModel`](cabpool_core::LinearModel) into a `good_lp` problem and
//! solves it with the pure-Rust `microlp` branch-and-bound solver, so no
//! native solver library is needed at build or run time.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod backend;

pub use backend::LpBackend;
