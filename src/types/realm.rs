// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Realm import documents decoded from ConfigMap payloads.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single realm definition to be imported into the identity system.
///
/// Unknown properties are rejected so that typos in the source document
/// surface as decode errors instead of being silently dropped.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RealmImport {
    pub realm: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_required: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_allowed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token_lifespan: Option<u32>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clients: Vec<ClientImport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<RolesImport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupImport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<UserImport>,
    /// SHA-256 of the raw payload this realm was decoded from
    #[serde(skip)]
    pub checksum: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClientImport {
    pub client_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_client: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub redirect_uris: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub web_origins: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RolesImport {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub realm: Vec<RoleImport>,
    /// Client roles keyed by client id
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub client: BTreeMap<String, Vec<RoleImport>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RoleImport {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GroupImport {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub realm_roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_groups: Vec<GroupImport>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserImport {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub realm_roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
}

/// All realm imports decoded from one ConfigMap, in document order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeycloakImport {
    realm_imports: Vec<(String, RealmImport)>,
}

impl KeycloakImport {
    pub fn len(&self) -> usize {
        self.realm_imports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.realm_imports.is_empty()
    }

    /// Iterate over `(name, realm)` pairs in the order they were decoded
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RealmImport)> {
        self.realm_imports
            .iter()
            .map(|(name, realm)| (name.as_str(), realm))
    }
}

impl FromIterator<(String, RealmImport)> for KeycloakImport {
    fn from_iter<T: IntoIterator<Item = (String, RealmImport)>>(iter: T) -> Self {
        Self {
            realm_imports: iter.into_iter().collect(),
        }
    }
}
