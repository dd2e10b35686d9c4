// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Decoding of realm documents stored in ConfigMaps.

use crate::config::ImportFileType;
use crate::constants::CONFIG_DATA_KEY;
use crate::error::DecodeError;
use crate::types::{KeycloakImport, RealmImport};
use k8s_openapi::api::core::v1::ConfigMap;
use kube::ResourceExt;
use serde::Deserialize;
use sha2::{Digest, Sha256};

/// Turns ConfigMaps into realm imports using the configured file type
#[derive(Debug, Clone)]
pub struct ConfigMapImportProvider {
    file_type: ImportFileType,
}

impl ConfigMapImportProvider {
    pub fn new(file_type: ImportFileType) -> Self {
        Self { file_type }
    }

    /// Decode the `configData` entry of a ConfigMap.
    ///
    /// A single document is keyed by the ConfigMap name. A YAML payload with
    /// several documents yields one import per document, keyed
    /// `<configmap>/<realm>`, in document order.
    pub fn get(&self, config_map: &ConfigMap) -> Result<KeycloakImport, DecodeError> {
        let name = config_map.name_any();
        let data = config_map
            .data
            .as_ref()
            .and_then(|d| d.get(CONFIG_DATA_KEY))
            .ok_or(DecodeError::MissingConfigData(CONFIG_DATA_KEY))?;

        let mut realms = self.decode(data)?;
        let checksum = checksum(data);
        for realm in &mut realms {
            realm.checksum.clone_from(&checksum);
        }

        match realms.len() {
            0 => Err(DecodeError::Empty),
            1 => Ok(realms.into_iter().map(|realm| (name.clone(), realm)).collect()),
            _ => Ok(realms
                .into_iter()
                .map(|realm| (format!("{}/{}", name, realm.realm), realm))
                .collect()),
        }
    }

    fn decode(&self, data: &str) -> Result<Vec<RealmImport>, DecodeError> {
        match self.file_type {
            // Empty documents, such as after a trailing `---`, are skipped
            ImportFileType::Yaml => serde_yaml::Deserializer::from_str(data)
                .filter_map(|document| Option::<RealmImport>::deserialize(document).transpose())
                .map(|realm| realm.map_err(DecodeError::from))
                .collect(),
            ImportFileType::Json => Ok(vec![serde_json::from_str(data)?]),
            ImportFileType::Auto => Err(DecodeError::UnsupportedFileType(self.file_type)),
        }
    }
}

/// Hex encoded SHA-256 of a payload
pub fn checksum(data: &str) -> String {
    hex::encode(Sha256::digest(data.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::config_map;
    use kube::api::ObjectMeta;

    fn yaml() -> ConfigMapImportProvider {
        ConfigMapImportProvider::new(ImportFileType::Yaml)
    }

    #[test]
    fn test_single_yaml_document_is_keyed_by_configmap_name() {
        let cm = config_map("app-realm", "default", "realm: app\nenabled: true\n");

        let import = yaml().get(&cm).unwrap();

        let entries: Vec<(&str, &RealmImport)> = import.iter().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "app-realm");
        assert_eq!(entries[0].1.realm, "app");
        assert_eq!(entries[0].1.enabled, Some(true));
    }

    #[test]
    fn test_json_document() {
        let provider = ConfigMapImportProvider::new(ImportFileType::Json);
        let cm = config_map("app-realm", "default", r#"{"realm": "app", "displayName": "App"}"#);

        let import = provider.get(&cm).unwrap();

        let (name, realm) = import.iter().next().unwrap();
        assert_eq!(name, "app-realm");
        assert_eq!(realm.display_name.as_deref(), Some("App"));
    }

    #[test]
    fn test_multiple_yaml_documents_keep_order() {
        let cm = config_map(
            "bundle",
            "default",
            "realm: shared\n---\nrealm: zeta\n---\nrealm: alpha\n",
        );

        let import = yaml().get(&cm).unwrap();

        let names: Vec<&str> = import.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["bundle/shared", "bundle/zeta", "bundle/alpha"]);
    }

    #[test]
    fn test_checksum_is_attached() {
        let payload = "realm: app\n";
        let cm = config_map("app-realm", "default", payload);

        let import = yaml().get(&cm).unwrap();

        let (_, realm) = import.iter().next().unwrap();
        assert_eq!(realm.checksum, checksum(payload));
        assert_eq!(realm.checksum.len(), 64);
    }

    #[test]
    fn test_missing_config_data() {
        let cm = ConfigMap {
            metadata: ObjectMeta {
                name: Some("app-realm".to_string()),
                namespace: Some("default".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        assert!(matches!(yaml().get(&cm), Err(DecodeError::MissingConfigData(_))));
    }

    #[test]
    fn test_schema_mismatch_fails() {
        let cm = config_map("app-realm", "default", "realm: app\nenabled: maybe\n");
        assert!(matches!(yaml().get(&cm), Err(DecodeError::Yaml(_))));
    }

    #[test]
    fn test_unknown_property_fails() {
        let cm = config_map("app-realm", "default", "realm: app\nthemeColour: red\n");
        assert!(yaml().get(&cm).is_err());
    }

    #[test]
    fn test_invalid_json_fails() {
        let provider = ConfigMapImportProvider::new(ImportFileType::Json);
        let cm = config_map("app-realm", "default", "realm: app");

        assert!(matches!(provider.get(&cm), Err(DecodeError::Json(_))));
    }

    #[test]
    fn test_auto_file_type_is_unsupported() {
        let provider = ConfigMapImportProvider::new(ImportFileType::Auto);
        let cm = config_map("app-realm", "default", "realm: app");

        assert!(matches!(
            provider.get(&cm),
            Err(DecodeError::UnsupportedFileType(ImportFileType::Auto))
        ));
    }

    #[test]
    fn test_empty_payload_fails() {
        let cm = config_map("app-realm", "default", "");
        assert!(matches!(yaml().get(&cm), Err(DecodeError::Empty)));
    }

    #[test]
    fn test_comment_only_payload_fails() {
        let cm = config_map("app-realm", "default", "# nothing here\n---\n");
        assert!(matches!(yaml().get(&cm), Err(DecodeError::Empty)));
    }

    #[test]
    fn test_trailing_document_separator_is_ignored() {
        let cm = config_map("app-realm", "default", "realm: app\n---\n");

        let import = yaml().get(&cm).unwrap();

        let names: Vec<&str> = import.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["app-realm"]);
    }

    #[test]
    fn test_trailing_comment_document_is_ignored() {
        let cm = config_map(
            "bundle",
            "default",
            "realm: one\n---\nrealm: two\n---\n# trailing comment\n",
        );

        let import = yaml().get(&cm).unwrap();

        let names: Vec<&str> = import.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["bundle/one", "bundle/two"]);
    }
}
