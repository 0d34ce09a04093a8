//! Ownership rules for user-scoped resources.
//!
//! User routes look resources up with [`Scope::Owner`]; only admin-designated
//! routes ever hold [`Scope::Admin`]. [`Lookup`] keeps "absent" and "not yours"
//! apart internally, and [`Lookup::found`] is the single place both collapse
//! into the same 404.

use uuid::Uuid;

use crate::error::ApiError;

/// Whose resources a caller may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Owner(Uuid),
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDenied;

/// Anything persisted with a permanent owner reference.
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

/// Pure predicate: admins pass, everyone else must own the resource.
pub fn enforce(owner_id: Uuid, scope: Scope) -> Result<(), AccessDenied> {
    match scope {
        Scope::Admin => Ok(()),
        Scope::Owner(caller) if caller == owner_id => Ok(()),
        Scope::Owner(_) => Err(AccessDenied),
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Lookup<T> {
    Visible(T),
    NotOwned,
    Absent,
}

impl<T: Owned> Lookup<T> {
    pub fn classify(row: Option<T>, scope: Scope) -> Self {
        match row {
            None => Lookup::Absent,
            Some(r) => match enforce(r.owner_id(), scope) {
                Ok(()) => Lookup::Visible(r),
                Err(AccessDenied) => Lookup::NotOwned,
            },
        }
    }
}

impl<T> Lookup<T> {
    /// The caller cannot tell a foreign resource from a missing one.
    pub fn found(self, what: &str) -> Result<T, ApiError> {
        match self {
            Lookup::Visible(r) => Ok(r),
            Lookup::NotOwned => {
                tracing::debug!(resource = what, "lookup hit a resource owned by someone else");
                Err(ApiError::NotFound(format!("{what} not found")))
            }
            Lookup::Absent => Err(ApiError::NotFound(format!("{what} not found"))),
        }
    }
}
