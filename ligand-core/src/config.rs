use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::member::{Binding, BindingFlags, MemberKind, MemberKinds};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings for a `NamedIdMemberConvention`, as read from TOML.
///
/// ```toml
/// names = ["Id", "id", "_id"]
/// member_kinds = ["field", "property"]
/// binding = ["public", "instance"]
/// ```
///
/// `names` has no default: leaving it out is a configuration error reported
/// when the convention is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdConventionConfig {
    pub names: Option<Vec<String>>,
    #[serde(default = "default_member_kinds")]
    pub member_kinds: Vec<MemberKind>,
    #[serde(default = "default_binding")]
    pub binding: Vec<Binding>,
}

fn default_member_kinds() -> Vec<MemberKind> {
    vec![MemberKind::Field, MemberKind::Property]
}

fn default_binding() -> Vec<Binding> {
    vec![Binding::Public, Binding::Instance]
}

impl Default for IdConventionConfig {
    fn default() -> Self {
        Self {
            names: Some(vec!["Id".to_string(), "id".to_string(), "_id".to_string()]),
            member_kinds: default_member_kinds(),
            binding: default_binding(),
        }
    }
}

impl IdConventionConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn member_kinds(&self) -> MemberKinds {
        self.member_kinds.iter().copied().collect()
    }

    pub fn binding(&self) -> BindingFlags {
        self.binding.iter().copied().collect()
    }
}

/// Reads an id convention config from a TOML file.
pub fn load_config(path: impl AsRef<Path>) -> Result<IdConventionConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let config = IdConventionConfig::from_toml(&content)?;
    debug!("loaded id convention config from {}", path.display());
    Ok(config)
}
