//! Role domain model.
//!
//! Roles are fixed reference data: a closed set with stable numeric
//! identifiers, seeded once by the schema migration. A user's roles are
//! held as a [`RoleSet`] bitset so authorization checks never compare
//! strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Basic,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Admin, Role::Basic];

    /// Stable identifier, also used as the `role` record key in storage.
    pub fn id(self) -> i64 {
        match self {
            Role::Admin => 1,
            Role::Basic => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Basic => "BASIC",
        }
    }

    pub fn from_id(id: i64) -> Option<Role> {
        Role::ALL.into_iter().find(|r| r.id() == id)
    }

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Role> {
        Role::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(name.trim()))
    }

    fn bit(self) -> u8 {
        1 << (self.id() - 1)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::from_name(s).ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Numeric identifier for a role name. Unknown names are non-matching.
pub fn role_id_of(name: &str) -> Option<i64> {
    Role::from_name(name).map(Role::id)
}

/// True when any of the given names is `ADMIN`, compared
/// case-insensitively.
pub fn is_admin<I, S>(role_names: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    role_names
        .into_iter()
        .any(|name| Role::from_name(name.as_ref()) == Some(Role::Admin))
}

/// Set of roles held by a user.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<Role>", from = "Vec<Role>")]
pub struct RoleSet(u8);

impl RoleSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn only(role: Role) -> Self {
        Self(role.bit())
    }

    pub fn insert(&mut self, role: Role) -> bool {
        let added = !self.contains(role);
        self.0 |= role.bit();
        added
    }

    pub fn remove(&mut self, role: Role) -> bool {
        let removed = self.contains(role);
        self.0 &= !role.bit();
        removed
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    pub fn is_admin(&self) -> bool {
        self.contains(Role::Admin)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        Role::ALL.into_iter().filter(|r| self.contains(*r))
    }

    /// Space-separated role names, e.g. `"ADMIN BASIC"`.
    pub fn to_scope(&self) -> String {
        self.iter().map(Role::name).collect::<Vec<_>>().join(" ")
    }
}

impl fmt::Debug for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<T: IntoIterator<Item = Role>>(iter: T) -> Self {
        let mut set = RoleSet::empty();
        for role in iter {
            set.insert(role);
        }
        set
    }
}

impl From<Vec<Role>> for RoleSet {
    fn from(roles: Vec<Role>) -> Self {
        roles.into_iter().collect()
    }
}

impl From<RoleSet> for Vec<Role> {
    fn from(set: RoleSet) -> Self {
        set.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_stable() {
        assert_eq!(Role::Admin.id(), 1);
        assert_eq!(Role::Basic.id(), 2);
        assert_eq!(Role::from_id(1), Some(Role::Admin));
        assert_eq!(Role::from_id(3), None);
    }

    #[test]
    fn names_match_case_insensitively() {
        assert_eq!(role_id_of("admin"), Some(1));
        assert_eq!(role_id_of("Basic"), Some(2));
        assert_eq!(role_id_of("moderator"), None);
        assert_eq!("aDmIn".parse::<Role>(), Ok(Role::Admin));
    }

    #[test]
    fn is_admin_over_names() {
        assert!(is_admin(["basic", "Admin"]));
        assert!(!is_admin(["BASIC"]));
        assert!(!is_admin(Vec::<String>::new()));
        assert!(!is_admin(["administrator"]));
    }

    #[test]
    fn role_set_operations() {
        let mut set = RoleSet::only(Role::Basic);
        assert!(!set.is_admin());
        assert!(set.insert(Role::Admin));
        assert!(!set.insert(Role::Admin));
        assert_eq!(set.len(), 2);
        assert_eq!(set.to_scope(), "ADMIN BASIC");

        assert!(set.remove(Role::Basic));
        assert!(!set.remove(Role::Basic));
        assert_eq!(set, RoleSet::only(Role::Admin));

        set.remove(Role::Admin);
        assert!(set.is_empty());
    }

    #[test]
    fn role_set_serializes_as_names() {
        let set: RoleSet = [Role::Basic, Role::Admin].into_iter().collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["ADMIN","BASIC"]"#);

        let back: RoleSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
