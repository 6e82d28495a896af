//! Application services: use-case orchestration.
//!
//! Each service module implements a single use-case by composing domain logic
//! with port trait calls. Services import only from `crate::domain` and
//! `crate::application::ports`, never from `crate::infra`, `crate::commands`,
//! or `crate::output`.

pub mod compiler;
pub mod enroll;
pub mod installer;
pub mod port_allocator;
pub mod provision;
pub mod validator;
