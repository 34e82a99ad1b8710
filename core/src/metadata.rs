use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// Well-known metadata field names, plus an escape hatch for anything else.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MetadataKey {
    FilePermissions,
    NumHardLinks,
    FileOwner,
    FileOwnerGroup,
    FileSize,
    LastModifiedDate,
    Filename,
    NumExecutables,
    ContentType,
    ResourceName,
    ContentLanguage,
    PhoneNumbers,
    Custom(String),
}

impl MetadataKey {
    pub fn as_str(&self) -> &str {
        match self {
            MetadataKey::FilePermissions => "FilePermissions",
            MetadataKey::NumHardLinks => "NumHardLinks",
            MetadataKey::FileOwner => "FileOwner",
            MetadataKey::FileOwnerGroup => "FileOwnerGroup",
            MetadataKey::FileSize => "FileSize",
            MetadataKey::LastModifiedDate => "LastModifiedDate",
            MetadataKey::Filename => "Filename",
            MetadataKey::NumExecutables => "NumExecutables",
            MetadataKey::ContentType => "Content-Type",
            MetadataKey::ResourceName => "resourceName",
            MetadataKey::ContentLanguage => "Content-Language",
            MetadataKey::PhoneNumbers => "phonenumbers",
            MetadataKey::Custom(name) => name,
        }
    }
}

impl From<&str> for MetadataKey {
    fn from(name: &str) -> Self {
        match name {
            "FilePermissions" => MetadataKey::FilePermissions,
            "NumHardLinks" => MetadataKey::NumHardLinks,
            "FileOwner" => MetadataKey::FileOwner,
            "FileOwnerGroup" => MetadataKey::FileOwnerGroup,
            "FileSize" => MetadataKey::FileSize,
            "LastModifiedDate" => MetadataKey::LastModifiedDate,
            "Filename" => MetadataKey::Filename,
            "NumExecutables" => MetadataKey::NumExecutables,
            "Content-Type" => MetadataKey::ContentType,
            "resourceName" => MetadataKey::ResourceName,
            "Content-Language" => MetadataKey::ContentLanguage,
            "phonenumbers" => MetadataKey::PhoneNumbers,
            other => MetadataKey::Custom(other.to_string()),
        }
    }
}

impl AsRef<str> for MetadataKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for MetadataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered multi-map from field name to string values.
///
/// Keys keep first-insertion order. `add` appends, `set` replaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataRecord {
    entries: Vec<(String, Vec<String>)>,
}

impl MetadataRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        let key = key.as_ref();
        let value = value.into();
        match self.position(key) {
            Some(index) => self.entries[index].1.push(value),
            None => self.entries.push((key.to_string(), vec![value])),
        }
    }

    pub fn set(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        let key = key.as_ref();
        let value = value.into();
        match self.position(key) {
            Some(index) => self.entries[index].1 = vec![value],
            None => self.entries.push((key.to_string(), vec![value])),
        }
    }

    /// First value stored under `key`.
    pub fn get(&self, key: impl AsRef<str>) -> Option<&str> {
        self.values(key).first().map(String::as_str)
    }

    pub fn values(&self, key: impl AsRef<str>) -> &[String] {
        match self.position(key.as_ref()) {
            Some(index) => &self.entries[index].1,
            None => &[],
        }
    }

    pub fn contains(&self, key: impl AsRef<str>) -> bool {
        self.position(key.as_ref()).is_some()
    }

    pub fn remove(&mut self, key: impl AsRef<str>) -> Option<Vec<String>> {
        let index = self.position(key.as_ref())?;
        Some(self.entries.remove(index).1)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }
}

impl Serialize for MetadataRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, values) in &self.entries {
            map.serialize_entry(key, values)?;
        }
        map.end()
    }
}

impl fmt::Display for MetadataRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, values) in &self.entries {
            for value in values {
                writeln!(f, "{}: {}", key, value)?;
            }
        }
        Ok(())
    }
}
