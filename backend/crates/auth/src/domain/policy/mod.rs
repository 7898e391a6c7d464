//! Domain Policy Module
//!
//! Authentication rules expressed as free functions over plain entities.

pub mod authorize;
pub mod lockout;
