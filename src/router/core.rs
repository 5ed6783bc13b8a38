//! Route index contract consumed by the dispatcher.

use crate::mapping::RouteMappingEntry;
use smallvec::SmallVec;
use std::sync::Arc;

/// Maximum number of path variables before heap allocation.
/// Most REST paths carry ≤4 variables (e.g. `/users/{id}/posts/{post_id}`).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated `(name, value)` storage for extracted path variables.
///
/// Names come from the compiled route tree and are shared via `Arc<str>`;
/// values are per-request data taken from the concrete path.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Path variables extracted while matching a concrete path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathVariables(pub ParamVec);

impl PathVariables {
    /// Get a variable by name.
    ///
    /// Uses "last write wins" semantics when the same name appears at
    /// several depths (e.g. `/org/{id}/user/{id}` returns the user id).
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_ref(), v.as_str()))
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for PathVariables {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (Arc::from(k), v.to_string()))
                .collect(),
        )
    }
}

/// Entries registered under the matched path pattern plus the variables
/// extracted from the concrete path
#[derive(Debug, Clone, Default)]
pub struct RouteLookup {
    /// All entries of the matched pattern, in registration order, any method
    pub entries: Vec<Arc<RouteMappingEntry>>,
    pub path_variables: PathVariables,
}

/// Pattern-to-path matching collaborator.
///
/// The dispatcher only relies on these two calls; the pattern syntax and
/// matching strategy belong to the implementation.
pub trait RouteIndex: Send + Sync {
    /// Whether any registered pattern matches `path`
    fn has_route(&self, path: &str) -> bool;

    /// Entries and path variables for the pattern matching `path`
    fn get_route(&self, path: &str) -> Option<RouteLookup>;
}
