//! AS relationships (CAIDA `as-rel` format).
//!
//! Each relationship is stored in both directions: a provider-to-customer
//! edge `A|B|-1` is also recorded as `B|A|1`, and peers carry `0` both ways.

mod loader;

pub use loader::{load_relationships, parse_relationships};

use std::collections::HashMap;

/// Relationship code of an edge as seen from its first AS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relationship {
    /// First AS is a provider of the second (`-1`)
    ProviderToCustomer,
    /// Settlement-free peering (`0`)
    Peer,
    /// First AS is a customer of the second (`1`)
    CustomerToProvider,
}

impl Relationship {
    /// Parses a CAIDA relationship code.
    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            -1 => Some(Relationship::ProviderToCustomer),
            0 => Some(Relationship::Peer),
            1 => Some(Relationship::CustomerToProvider),
            _ => None,
        }
    }

    /// CAIDA relationship code.
    pub fn code(&self) -> i8 {
        match self {
            Relationship::ProviderToCustomer => -1,
            Relationship::Peer => 0,
            Relationship::CustomerToProvider => 1,
        }
    }

    /// The same relationship seen from the other AS.
    pub fn reversed(&self) -> Self {
        match self {
            Relationship::ProviderToCustomer => Relationship::CustomerToProvider,
            Relationship::Peer => Relationship::Peer,
            Relationship::CustomerToProvider => Relationship::ProviderToCustomer,
        }
    }
}

/// Read-only table of AS relationships.
#[derive(Debug, Default, Clone)]
pub struct AsRelationships {
    edges: HashMap<(u32, u32), Relationship>,
}

impl AsRelationships {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `a -> b` with `relationship` and `b -> a` with its reverse.
    ///
    /// A later record for the same pair replaces the earlier one.
    pub fn insert(&mut self, a: u32, b: u32, relationship: Relationship) {
        self.edges.insert((a, b), relationship);
        self.edges.insert((b, a), relationship.reversed());
    }

    /// Relationship of `a` towards `b`, if any.
    pub fn relationship(&self, a: u32, b: u32) -> Option<Relationship> {
        self.edges.get(&(a, b)).copied()
    }

    /// Whether the two networks share an edge.
    pub fn are_neighbors(&self, a: u32, b: u32) -> bool {
        self.edges.contains_key(&(a, b))
    }

    /// Number of distinct AS pairs.
    pub fn len(&self) -> usize {
        self.edges.len() / 2
    }

    /// Whether no relationship was loaded.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
