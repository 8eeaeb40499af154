//! Stored secrets
//!
//! A secret is either an SSH key pair or a named environment variable. Its
//! sensitive payload is absent while the secret is pending.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::capability::Subject;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecretKind {
    #[serde(rename = "ssh")]
    Ssh,
    #[serde(rename = "env")]
    Environment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretState {
    /// Created, sensitive material not generated or supplied yet
    Pending,
    /// Sensitive material present
    Active,
}

impl SecretKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecretKind::Ssh => "ssh",
            SecretKind::Environment => "env",
        }
    }
}

impl fmt::Display for SecretKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific sensitive material.
///
/// Decoded from storage without looking at the kind tag, so a mismatch between
/// tag and data stays detectable.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SecretPayload {
    Ssh {
        #[serde(rename = "publicKey")]
        public_key: String,
        #[serde(rename = "privateKey")]
        private_key: String,
    },
    Environment {
        value: String,
    },
}

impl SecretPayload {
    pub fn kind(&self) -> SecretKind {
        match self {
            SecretPayload::Ssh { .. } => SecretKind::Ssh,
            SecretPayload::Environment { .. } => SecretKind::Environment,
        }
    }
}

// Never print key material or values.
impl fmt::Debug for SecretPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretPayload::Ssh { public_key, .. } => f
                .debug_struct("Ssh")
                .field("public_key", public_key)
                .field("private_key", &"<redacted>")
                .finish(),
            SecretPayload::Environment { .. } => f
                .debug_struct("Environment")
                .field("value", &"<redacted>")
                .finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Secret {
    pub id: Uuid,
    pub project_id: Uuid,
    pub environment_id: Uuid,
    pub name: String,
    pub kind: SecretKind,
    pub state: SecretState,
    pub payload: Option<SecretPayload>,
}

impl Secret {
    /// A new SSH secret. It starts pending; the key pair is generated later.
    pub fn new_ssh(project_id: Uuid, environment_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            environment_id,
            name: name.into(),
            kind: SecretKind::Ssh,
            state: SecretState::Pending,
            payload: None,
        }
    }

    /// A new environment variable, active as soon as it is stored
    pub fn new_environment(
        project_id: Uuid,
        environment_id: Uuid,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            environment_id,
            name: name.into(),
            kind: SecretKind::Environment,
            state: SecretState::Active,
            payload: Some(SecretPayload::Environment {
                value: value.into(),
            }),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state == SecretState::Pending
    }
}

impl Subject for Secret {
    fn authorization_name(&self) -> &'static str {
        "secret"
    }

    fn subject_id(&self) -> Uuid {
        self.id
    }
}
