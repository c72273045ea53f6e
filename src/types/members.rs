//! Registered member list for a circle

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Ordered, deduplicated list of a circle's registered members
///
/// Members keep the order in which they were discovered (index order or
/// registration-event order). Duplicates and the zero address are dropped.
/// Comparison is case-insensitive because it goes through [`Address`].
///
/// # Examples
///
/// ```
/// use circlescan::RegisteredUserSet;
/// use alloy_primitives::address;
///
/// let alice = address!("00000000000000000000000000000000000000a1");
/// let mut users = RegisteredUserSet::new();
/// users.insert(alice);
/// users.insert(alice);
///
/// assert_eq!(users.len(), 1);
/// assert!(users.contains_str("0x00000000000000000000000000000000000000A1"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegisteredUserSet(Vec<Address>);

impl RegisteredUserSet {
    /// Create a new empty set
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a member
    ///
    /// Returns `true` if the member was newly inserted. The zero address is
    /// never inserted.
    pub fn insert(&mut self, user: Address) -> bool {
        if user.is_zero() || self.0.contains(&user) {
            return false;
        }
        self.0.push(user);
        true
    }

    /// Check membership
    pub fn contains(&self, user: &Address) -> bool {
        self.0.contains(user)
    }

    /// Check membership of a hex string in any letter case
    ///
    /// Unparseable input is never a member.
    pub fn contains_str(&self, user: &str) -> bool {
        user.trim()
            .parse::<Address>()
            .is_ok_and(|user| self.contains(&user))
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no member is registered
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over members in discovery order
    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.0.iter()
    }

    /// Members as lower-case hex strings
    pub fn to_lowercase_strings(&self) -> Vec<String> {
        self.0.iter().map(|user| format!("{user:#x}")).collect()
    }
}

impl FromIterator<Address> for RegisteredUserSet {
    fn from_iter<I: IntoIterator<Item = Address>>(iter: I) -> Self {
        let mut set = Self::new();
        for user in iter {
            set.insert(user);
        }
        set
    }
}

impl IntoIterator for RegisteredUserSet {
    type Item = Address;
    type IntoIter = std::vec::IntoIter<Address>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
