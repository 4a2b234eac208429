//! Composable claim validation.

use crate::PasetoError;

/// A check over a decrypted or verified claims set.
///
/// Validations compose with [`then`](Validate::then), which runs them in
/// order and stops at the first failure.
pub trait Validate {
    /// The type of claim that can be validated
    type Claims: ?Sized;

    /// The validation to perform on the claims
    fn validate(&self, claims: &Self::Claims) -> Result<(), PasetoError>;

    /// Extend the validation with another validation.
    fn then<V>(self, other: V) -> Then<Self, V>
    where
        Self: Sized,
        V: Validate<Claims = Self::Claims>,
    {
        Then(self, other)
    }
}

/// Two validations run in sequence. See [`Validate::then`].
pub struct Then<T, U>(T, U);

impl<T: Validate, U: Validate<Claims = T::Claims>> Validate for Then<T, U> {
    type Claims = T::Claims;

    fn validate(&self, claims: &Self::Claims) -> Result<(), PasetoError> {
        self.0.validate(claims)?;
        self.1.validate(claims)
    }
}

/// A missing validation always passes.
impl<T: Validate> Validate for Option<T> {
    type Claims = T::Claims;

    fn validate(&self, claims: &Self::Claims) -> Result<(), PasetoError> {
        match self {
            Some(v) => v.validate(claims),
            None => Ok(()),
        }
    }
}

impl<T: Validate + ?Sized> Validate for Box<T> {
    type Claims = T::Claims;

    fn validate(&self, claims: &Self::Claims) -> Result<(), PasetoError> {
        T::validate(self, claims)
    }
}
