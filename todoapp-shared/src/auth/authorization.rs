/// Resource ownership checks
///
/// Every task belongs to exactly one user, and only that user may read,
/// modify or delete it. Handlers for single-entity endpoints run the guard
/// in a fixed order:
///
/// 1. **Existence**: the entity was not found → [`AccessError::NotFound`]
/// 2. **Ownership**: the owner differs from the caller → [`AccessError::Forbidden`]
/// 3. **Operation**: the entity is handed back to the handler
///
/// A missing entity is always reported as not found, never as forbidden.
///
/// # Example
///
/// ```
/// use todoapp_shared::auth::authorization::{guard_owned, AccessError, OwnedResource};
/// use todoapp_shared::auth::middleware::AuthContext;
///
/// struct Note { owner: i32 }
///
/// impl OwnedResource for Note {
///     fn owner_id(&self) -> i32 { self.owner }
/// }
///
/// let caller = AuthContext::new(1);
///
/// assert!(guard_owned(Some(Note { owner: 1 }), &caller).is_ok());
/// assert_eq!(guard_owned(Some(Note { owner: 2 }), &caller).err(), Some(AccessError::Forbidden));
/// assert_eq!(guard_owned(None::<Note>, &caller).err(), Some(AccessError::NotFound));
/// ```

use super::middleware::AuthContext;

/// Entity with a single owning user
pub trait OwnedResource {
    /// ID of the user that owns this entity
    fn owner_id(&self) -> i32;
}

/// Outcome of a failed ownership check
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    /// The entity does not exist
    #[error("Resource not found")]
    NotFound,

    /// The entity exists but belongs to someone else
    #[error("Not authorized to access this resource")]
    Forbidden,
}

/// Checks that the caller owns a resource
pub fn require_ownership(auth: &AuthContext, resource_owner_id: i32) -> Result<(), AccessError> {
    if auth.user_id != resource_owner_id {
        return Err(AccessError::Forbidden);
    }

    Ok(())
}

/// Applies the existence → ownership sequence to a loaded entity
///
/// `entity` is the result of a lookup by id. On success the entity is
/// returned so the handler can continue with it.
pub fn guard_owned<T: OwnedResource>(entity: Option<T>, auth: &AuthContext) -> Result<T, AccessError> {
    let entity = entity.ok_or(AccessError::NotFound)?;

    if let Err(e) = require_ownership(auth, entity.owner_id()) {
        tracing::warn!(
            user_id = auth.user_id,
            owner_id = entity.owner_id(),
            "Denied access to resource owned by another user"
        );
        return Err(e);
    }

    Ok(entity)
}
