//! Screen identifiers and the factory the controller builds screens with

use async_trait::async_trait;
use std::fmt;

use crate::error::NavigationError;

/// Identifier of one navigable page, e.g. `"login"` or `"home"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScreenId(String);

impl ScreenId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScreenId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ScreenId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Builds renderable screens on demand.
///
/// Implemented by the presentation layer. Construction may be slow (resource
/// loading) and may fail, typically with [`NavigationError::ScreenNotFound`].
#[async_trait]
pub trait ScreenFactory: Send + Sync {
    type Screen: Send + Sync + 'static;

    async fn build(&self, id: &ScreenId) -> Result<Self::Screen, NavigationError>;
}
