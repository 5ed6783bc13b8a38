//! Radix tree route index
//!
//! Paths are split into segments and stored in a tree where:
//! - static segments (e.g. `users`) match exactly
//! - variable segments (e.g. `{id}`) match any single non-empty segment
//! - terminal nodes hold every [`RouteMappingEntry`] registered for the
//!   pattern, whatever its methods
//!
//! Lookup is O(k) in the path length. Static children are tried before
//! variable children, with backtracking, so `/users/me` wins over
//! `/users/{id}` for the concrete path `/users/me`.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use super::core::{ParamVec, PathVariables, RouteIndex, RouteLookup};
use crate::mapping::RouteMappingEntry;

#[derive(Clone, Default)]
struct RadixNode {
    /// The path segment this node represents (without `/`)
    segment: Cow<'static, str>,
    /// Entries registered for the pattern ending at this node
    entries: Vec<Arc<RouteMappingEntry>>,
    /// Set when this node stands for a `{name}` segment
    param_name: Option<Arc<str>>,
    children: Vec<RadixNode>,
    /// Variable children; different names at the same depth get their own node
    param_children: Vec<RadixNode>,
}

impl RadixNode {
    fn new(segment: Cow<'static, str>) -> Self {
        Self {
            segment,
            ..Self::default()
        }
    }

    fn new_param(param_name: &str) -> Self {
        Self {
            param_name: Some(Arc::from(param_name)),
            ..Self::default()
        }
    }

    fn is_terminal(&self) -> bool {
        !self.entries.is_empty()
    }

    fn insert(&mut self, segments: &[&str], entry: Arc<RouteMappingEntry>) {
        let Some((segment, remaining)) = segments.split_first() else {
            self.entries.push(entry);
            return;
        };

        if let Some(param_name) = segment
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
        {
            if let Some(child) = self
                .param_children
                .iter_mut()
                .find(|c| c.param_name.as_deref() == Some(param_name))
            {
                child.insert(remaining, entry);
                return;
            }
            let mut child = RadixNode::new_param(param_name);
            child.insert(remaining, entry);
            self.param_children.push(child);
            return;
        }

        if let Some(child) = self.children.iter_mut().find(|c| c.segment == *segment) {
            child.insert(remaining, entry);
            return;
        }

        let mut child = RadixNode::new(Cow::Owned((*segment).to_string()));
        child.insert(remaining, entry);
        self.children.push(child);
    }

    fn search<'n>(&'n self, segments: &[&str], params: &mut ParamVec) -> Option<&'n RadixNode> {
        let Some((segment, remaining)) = segments.split_first() else {
            return self.is_terminal().then_some(self);
        };

        for child in &self.children {
            if child.segment == *segment {
                if let Some(found) = child.search(remaining, params) {
                    return Some(found);
                }
            }
        }

        for param_child in &self.param_children {
            if let Some(name) = &param_child.param_name {
                params.push((Arc::clone(name), (*segment).to_string()));
                if let Some(found) = param_child.search(remaining, params) {
                    return Some(found);
                }
                // Backtrack
                params.pop();
            }
        }

        None
    }
}

fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// [`RouteIndex`] backed by a radix tree over `{name}` path patterns.
///
/// Patterns that differ only in empty segments (`/users`, `/users/`,
/// `users`) share one terminal node; their entries keep registration order.
#[derive(Clone, Default)]
pub struct RadixIndex {
    root: RadixNode,
    pattern_count: usize,
}

impl RadixIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry under its pattern
    pub fn insert(&mut self, pattern: &str, entry: Arc<RouteMappingEntry>) {
        let segments = split_segments(pattern);
        self.pattern_count += 1;
        self.root.insert(&segments, entry);
    }

    /// Number of `insert` calls
    #[must_use]
    pub fn len(&self) -> usize {
        self.pattern_count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pattern_count == 0
    }

    fn find(&self, path: &str) -> Option<(&RadixNode, ParamVec)> {
        let segments = split_segments(path);
        let mut params = ParamVec::new();
        let node = self.root.search(&segments, &mut params)?;
        Some((node, params))
    }
}

impl fmt::Debug for RadixIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RadixIndex")
            .field("patterns", &self.len())
            .finish_non_exhaustive()
    }
}

impl RouteIndex for RadixIndex {
    fn has_route(&self, path: &str) -> bool {
        self.find(path).is_some()
    }

    fn get_route(&self, path: &str) -> Option<RouteLookup> {
        let (node, params) = self.find(path)?;
        Some(RouteLookup {
            entries: node.entries.clone(),
            path_variables: PathVariables(params),
        })
    }
}
