//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Opaque-token cryptography (random bytes, SHA-256, constant-time compare)
//! - Password hashing (Argon2id, NIST SP 800-63B compliant)
//! - Cookie building and parsing
//! - Client address extraction
//! - Rate limiting infrastructure

pub mod client;
pub mod cookie;
pub mod crypto;
pub mod password;
pub mod rate_limit;
