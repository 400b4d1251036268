//! Authentication state trait and macro.

use crate::session::SessionGuard;

/// Trait for state types that provide the session guard to auth extractors.
pub trait HasAuthBackend {
    fn guard(&self) -> &SessionGuard;
    fn secure_cookies(&self) -> bool;
}

/// Macro to implement `HasAuthBackend` for state structs with the standard fields.
///
/// The struct must have these fields:
/// - `guard: Arc<SessionGuard>`
/// - `secure_cookies: bool`
///
/// # Example
/// ```ignore
/// use rotokey::impl_has_auth_backend;
///
/// #[derive(Clone)]
/// pub struct MyState {
///     pub guard: Arc<SessionGuard>,
///     pub secure_cookies: bool,
///     // ... other fields
/// }
///
/// impl_has_auth_backend!(MyState);
/// ```
#[macro_export]
macro_rules! impl_has_auth_backend {
    ($state_type:ty) => {
        impl $crate::auth::HasAuthBackend for $state_type {
            fn guard(&self) -> &$crate::session::SessionGuard {
                &self.guard
            }
            fn secure_cookies(&self) -> bool {
                self.secure_cookies
            }
        }
    };
}
