/// Type-state markers for the builder pattern
///
/// These types are used to track which fields have been set
/// in the builder at compile-time, preventing invalid configurations.
use std::marker::PhantomData;

/// Marker trait for URL state
pub trait UrlState {}

/// URL has not been set
pub struct NoUrl;
impl UrlState for NoUrl {}

/// URL has been set
pub struct HasUrl;
impl UrlState for HasUrl {}

/// Phantom marker to prevent direct construction
#[derive(Debug, Clone, Copy)]
pub struct TypeState<U> {
    _url: PhantomData<U>,
}

impl<U> TypeState<U> {
    pub(crate) fn new() -> Self {
        Self { _url: PhantomData }
    }
}

impl<U> Default for TypeState<U> {
    fn default() -> Self {
        Self::new()
    }
}
