//! Tenant-scoped role and permission resolution.
//!
//! This crate decides which role applies for a user within a tenant at a
//! point in time, and whether that role's permission grants reach a given
//! resource. Assignments carry validity windows and optional branch scoping;
//! grants carry a breadth ([`Scope`]) and an optional ABAC [`Policy`] that
//! can narrow, but never widen, what the scope allows. The default behavior
//! is deny-by-default: every internal failure folds into a denied
//! [`Decision`] rather than an error escaping the [`Engine`].
//!
//! # Examples
//!
//! Basic decision flow using the in-memory store (enable `memory-store`):
//! ```no_run
//! use rs_grants::{EngineBuilder, PermissionCode, ResourceContext, TenantId, UserId};
//! # #[cfg(feature = "memory-store")]
//! # {
//! use rs_grants::MemoryStore;
//! let store = MemoryStore::new();
//! let engine = EngineBuilder::new(store).build();
//! let tenant = TenantId::try_from("tenant_1").unwrap();
//! let user = UserId::try_from("user_1").unwrap();
//! let code = PermissionCode::try_from("ENROLLMENT_CREATE").unwrap();
//! let resource = ResourceContext::new(tenant.clone());
//! let _ = engine.can_user(user, tenant, None, code, &resource, None);
//! # }
//! ```
//!
//! Creating a process-local cache (enable `memory-cache`):
//! ```no_run
//! # #[cfg(feature = "memory-cache")]
//! # {
//! use rs_grants::MemoryCache;
//! use std::time::Duration;
//! let cache = MemoryCache::new(1024).with_ttl(Duration::from_secs(30));
//! # let _ = cache;
//! # }
//! ```
#![forbid(unsafe_code)]

mod assignment;
mod cache;
mod catalog;
mod decision;
mod engine;
mod error;
mod evaluator;
mod permission;
mod policy;
mod resolver;
mod role;
mod store;
mod types;

#[cfg(feature = "memory-cache")]
mod memory_cache;

#[cfg(feature = "memory-store")]
mod memory_store;

pub use crate::assignment::{RoleAssignment, ValidityWindow};
pub use crate::cache::{Cache, NoCache};
pub use crate::catalog::{Directory, RoleCatalog};
pub use crate::decision::{Decision, Reason};
pub use crate::engine::{Engine, EngineBuilder};
pub use crate::error::{BoxError, Error, Result, StoreError};
pub use crate::evaluator::ResourceContext;
pub use crate::permission::{PermissionCode, Scope};
pub use crate::policy::{AttrPath, MAX_POLICY_DEPTH, Operand, Policy, PolicyError, Subject};
pub use crate::role::{PermissionGrant, Role, RoleTemplate, TemplateGrant};
pub use crate::store::AssignmentStore;
pub use crate::types::{AssignmentId, BranchId, RoleId, TemplateId, TenantId, UserId};

#[cfg(feature = "memory-store")]
pub use crate::memory_store::MemoryStore;

#[cfg(feature = "memory-cache")]
pub use crate::memory_cache::MemoryCache;
