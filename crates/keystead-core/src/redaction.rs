//! Capability-gated secret projections
//!
//! One stored secret renders in one of five shapes, keyed by state, kind and
//! privilege. Privilege is decided per secret, never per collection.

use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::capability::{Capability, CapabilityOracle, Subject};
use crate::error::{Error, Result};
use crate::secret::{Secret, SecretKind, SecretPayload, SecretState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    Unprivileged,
    Privileged,
}

/// Non-sensitive metadata common to every projection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretSummary {
    pub id: Uuid,
    pub name: String,
    pub project_id: Uuid,
    pub environment_id: Uuid,
    #[serde(rename = "type")]
    pub kind: SecretKind,
    pub state: SecretState,
}

/// A secret rendered for one reader
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RenderableSecret {
    Pending(SecretSummary),
    UnprivilegedSsh {
        #[serde(flatten)]
        summary: SecretSummary,
        #[serde(rename = "publicKey")]
        public_key: String,
    },
    PrivilegedSsh {
        #[serde(flatten)]
        summary: SecretSummary,
        #[serde(rename = "publicKey")]
        public_key: String,
        #[serde(rename = "privateKey")]
        private_key: String,
    },
    UnprivilegedEnvironment {
        #[serde(flatten)]
        summary: SecretSummary,
    },
    PrivilegedEnvironment {
        #[serde(flatten)]
        summary: SecretSummary,
        value: String,
    },
}

impl RenderableSecret {
    pub fn summary(&self) -> &SecretSummary {
        match self {
            RenderableSecret::Pending(summary)
            | RenderableSecret::UnprivilegedSsh { summary, .. }
            | RenderableSecret::PrivilegedSsh { summary, .. }
            | RenderableSecret::UnprivilegedEnvironment { summary }
            | RenderableSecret::PrivilegedEnvironment { summary, .. } => summary,
        }
    }

    pub fn public_key(&self) -> Option<&str> {
        match self {
            RenderableSecret::UnprivilegedSsh { public_key, .. }
            | RenderableSecret::PrivilegedSsh { public_key, .. } => Some(public_key),
            _ => None,
        }
    }

    /// Present only in the privileged SSH shape
    pub fn private_key(&self) -> Option<&str> {
        match self {
            RenderableSecret::PrivilegedSsh { private_key, .. } => Some(private_key),
            _ => None,
        }
    }

    /// Present only in the privileged environment shape
    pub fn value(&self) -> Option<&str> {
        match self {
            RenderableSecret::PrivilegedEnvironment { value, .. } => Some(value),
            _ => None,
        }
    }

    /// `None` for pending secrets, which look the same to everyone
    pub fn privilege(&self) -> Option<Privilege> {
        match self {
            RenderableSecret::Pending(_) => None,
            RenderableSecret::UnprivilegedSsh { .. }
            | RenderableSecret::UnprivilegedEnvironment { .. } => Some(Privilege::Unprivileged),
            RenderableSecret::PrivilegedSsh { .. }
            | RenderableSecret::PrivilegedEnvironment { .. } => Some(Privilege::Privileged),
        }
    }
}

fn summarize(secret: &Secret) -> SecretSummary {
    SecretSummary {
        id: secret.id,
        name: secret.name.clone(),
        project_id: secret.project_id,
        environment_id: secret.environment_id,
        kind: secret.kind,
        state: secret.state,
    }
}

/// Render a secret at a known privilege level.
///
/// Fails with `InvalidSecret` when the kind tag disagrees with the stored
/// payload, or when an active secret has no payload.
pub fn render(secret: &Secret, privilege: Privilege) -> Result<RenderableSecret> {
    if let Some(payload) = &secret.payload {
        if payload.kind() != secret.kind {
            return Err(Error::invalid_secret(
                secret.id,
                format!(
                    "kind is {} but payload holds {} data",
                    secret.kind,
                    payload.kind()
                ),
            ));
        }
    }

    if secret.state == SecretState::Pending {
        return Ok(RenderableSecret::Pending(summarize(secret)));
    }

    let payload = secret
        .payload
        .as_ref()
        .ok_or_else(|| Error::invalid_secret(secret.id, "active secret has no payload"))?;
    let summary = summarize(secret);

    let rendered = match (payload, privilege) {
        (
            SecretPayload::Ssh {
                public_key,
                private_key,
            },
            Privilege::Privileged,
        ) => RenderableSecret::PrivilegedSsh {
            summary,
            public_key: public_key.clone(),
            private_key: private_key.clone(),
        },
        (SecretPayload::Ssh { public_key, .. }, Privilege::Unprivileged) => {
            RenderableSecret::UnprivilegedSsh {
                summary,
                public_key: public_key.clone(),
            }
        }
        (SecretPayload::Environment { value }, Privilege::Privileged) => {
            RenderableSecret::PrivilegedEnvironment {
                summary,
                value: value.clone(),
            }
        }
        (SecretPayload::Environment { .. }, Privilege::Unprivileged) => {
            RenderableSecret::UnprivilegedEnvironment { summary }
        }
    };

    Ok(rendered)
}

/// Privilege the oracle grants for one secret. A failed lookup counts as
/// unprivileged.
pub fn privilege_for(secret: &Secret, oracle: &dyn CapabilityOracle) -> Privilege {
    match oracle.can(Capability::ReadPrivileged, &secret.subject_ref()) {
        Ok(true) => Privilege::Privileged,
        Ok(false) => Privilege::Unprivileged,
        Err(e) => {
            warn!(
                "Privilege lookup failed for secret {}, rendering unprivileged: {}",
                secret.id, e
            );
            Privilege::Unprivileged
        }
    }
}

/// Project a stored secret for the reader the oracle speaks for.
///
/// Pending secrets are rendered without consulting the oracle.
pub fn project(secret: &Secret, oracle: &dyn CapabilityOracle) -> Result<RenderableSecret> {
    let privilege = if secret.is_pending() {
        Privilege::Unprivileged
    } else {
        privilege_for(secret, oracle)
    };

    debug!("Projecting secret {} as {:?}", secret.id, privilege);
    render(secret, privilege)
}
