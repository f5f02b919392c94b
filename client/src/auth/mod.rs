//! Authentication module: session lifecycle and authorization evaluation.
//!
//! This module provides the public surface screens use to gate rendering and
//! navigation: the session store (login, logout, restore, current user) and
//! the pure permission evaluator.

pub mod models;
pub mod permissions;
pub mod session;
