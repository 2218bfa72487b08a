// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account roles and the UI sections they unlock.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Account roles for authorization.
///
/// ## Role Hierarchy
///
/// - `Admin` - Manages accounts and profiles; passes every API guard
/// - `Issuer` - Registers documents and their fingerprints
/// - `Verifier` - Checks documents against their recorded fingerprints
/// - `User` - Looks documents up and maintains their own profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full administrative access
    Admin,
    /// Document issuer
    Issuer,
    /// Document verifier
    Verifier,
    /// End user
    User,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Issuer, Role::Verifier, Role::User];

    /// Check if this role has at least the privileges of the required role.
    pub fn has_privilege(&self, required: Role) -> bool {
        match (self, required) {
            // Admin can do anything
            (Role::Admin, _) => true,
            (role, required) => *role == required,
        }
    }

    /// Parse role from string (case-insensitive).
    /// Used when reading the `role` column back from storage.
    pub fn from_str(s: &str) -> Option<Role> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "issuer" => Some(Role::Issuer),
            "verifier" => Some(Role::Verifier),
            "user" => Some(Role::User),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Issuer => "issuer",
            Role::Verifier => "verifier",
            Role::User => "user",
        }
    }

    /// The section a freshly authenticated session lands on.
    pub fn home(&self) -> Section {
        match self {
            Role::Admin => Section::Admin,
            Role::Issuer => Section::Issuer,
            Role::Verifier => Section::Verifier,
            Role::User => Section::User,
        }
    }

    /// Sections this role may render, in navigation order.
    pub fn sections(&self) -> Vec<Section> {
        Section::ALL
            .into_iter()
            .filter(|section| section.renders_for(*self))
            .collect()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Route subtrees of the frontend, each gated by a set of roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    /// Account administration (add-account, manage-account)
    Admin,
    /// Own profile and document updates
    Profile,
    /// Document registration
    Issuer,
    /// Verification console
    Verifier,
    /// End-user dashboard
    User,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Admin,
        Section::Profile,
        Section::Issuer,
        Section::Verifier,
        Section::User,
    ];

    /// Roles whose sessions render this section.
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Section::Admin => &[Role::Admin],
            Section::Profile => &[Role::Issuer, Role::Verifier, Role::User],
            Section::Issuer => &[Role::Issuer],
            Section::Verifier => &[Role::Verifier],
            Section::User => &[Role::User],
        }
    }

    /// Whether the section is part of this role's navigation.
    pub fn renders_for(&self, role: Role) -> bool {
        self.allowed_roles().contains(&role)
    }

    /// Whether API calls backing this section are permitted.
    ///
    /// Unlike [`Section::renders_for`], admin passes every section guard.
    pub fn permits(&self, role: Role) -> bool {
        self.allowed_roles()
            .iter()
            .any(|allowed| role.has_privilege(*allowed))
    }

    /// Frontend route the section is mounted at.
    pub fn route(&self) -> &'static str {
        match self {
            Section::Admin => "/admin",
            Section::Profile => "/profile",
            Section::Issuer => "/issuer",
            Section::Verifier => "/verifier",
            Section::User => "/user",
        }
    }
}
