//! Namespace scope for watching and listing

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which namespaces a watch or listing covers
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Scope {
    #[default]
    AllNamespaces,
    Namespace(String),
}

impl Scope {
    /// An empty or blank namespace means the whole cluster
    pub fn from_namespace(namespace: &str) -> Self {
        let namespace = namespace.trim();
        if namespace.is_empty() {
            Self::AllNamespaces
        } else {
            Self::Namespace(namespace.to_string())
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        match self {
            Self::AllNamespaces => None,
            Self::Namespace(ns) => Some(ns),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllNamespaces => write!(f, "all namespaces"),
            Self::Namespace(ns) => write!(f, "namespace {}", ns),
        }
    }
}
