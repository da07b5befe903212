use crate::models::User;

/// Read-only view of the authentication state owned by a session provider.
///
/// The guard only ever sees this trait, so it can be driven by a fixed value in
/// tests and by the request's session in the HTTP layer.
pub trait AuthStateReader {
    fn current_user(&self) -> Option<User>;
}

impl AuthStateReader for Option<User> {
    fn current_user(&self) -> Option<User> {
        self.clone()
    }
}

impl<T: AuthStateReader + ?Sized> AuthStateReader for &T {
    fn current_user(&self) -> Option<User> {
        (**self).current_user()
    }
}
