//! Capabilities, subjects and the capability oracle
//!
//! A capability is asked about one subject at a time. Capability names combine
//! the action with the subject's authorization name, e.g. `read-secret` or
//! `read-privileged-secret`. The core only ever sees a [`SubjectRef`]; policy
//! lives behind [`CapabilityOracle`].

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::OnceLock;

use uuid::Uuid;

use crate::error::OracleError;
use crate::member::ProjectMember;
use crate::role::ProjectRole;

/// Action half of a capability name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Read,
    /// Read sensitive material (private keys, secret values)
    ReadPrivileged,
    Create,
    Archive,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Read => "read",
            Capability::ReadPrivileged => "read-privileged",
            Capability::Create => "create",
            Capability::Archive => "archive",
        }
    }

    /// Full capability name for a subject kind
    pub fn name_for(&self, authorization_name: &str) -> String {
        format!("{}-{}", self.as_str(), authorization_name)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque handle on the thing a capability question is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubjectRef {
    pub name: &'static str,
    pub id: Uuid,
}

/// Anything capabilities can be checked against
pub trait Subject {
    /// Kind name used to build capability names (`secret`, `project-member`, ...)
    fn authorization_name(&self) -> &'static str;

    fn subject_id(&self) -> Uuid;

    fn subject_ref(&self) -> SubjectRef {
        SubjectRef {
            name: self.authorization_name(),
            id: self.subject_id(),
        }
    }
}

/// Answers "may the acting principal do X to this subject?"
///
/// Implementations own all policy; the core treats the answer as authoritative
/// and never re-derives it from roles.
#[cfg_attr(test, mockall::automock)]
pub trait CapabilityOracle: Send + Sync {
    fn can(&self, capability: Capability, subject: &SubjectRef) -> Result<bool, OracleError>;
}

/// Set of capability names granted to a role
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet(BTreeSet<String>);

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, other: &CapabilitySet) -> Self {
        self.0.extend(other.0.iter().cloned());
        self
    }

    pub fn does(mut self, capability: Capability, subjects: &[&str]) -> Self {
        for subject in subjects {
            self.0.insert(capability.name_for(subject));
        }
        self
    }

    pub fn reads(self, subjects: &[&str]) -> Self {
        self.does(Capability::Read, subjects)
    }

    pub fn allows(&self, capability: Capability, subject: &str) -> bool {
        self.0.contains(&capability.name_for(subject))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Capability table for an effective project role
pub fn role_capabilities(role: Option<ProjectRole>) -> &'static CapabilitySet {
    static VISITOR: OnceLock<CapabilitySet> = OnceLock::new();
    static MEMBER: OnceLock<CapabilitySet> = OnceLock::new();
    static OWNER: OnceLock<CapabilitySet> = OnceLock::new();

    let visitor = || CapabilitySet::new().reads(&["project-member"]);
    let member = || {
        CapabilitySet::new()
            .add(VISITOR.get_or_init(visitor))
            .reads(&["secret"])
    };

    match role {
        None => VISITOR.get_or_init(visitor),
        Some(ProjectRole::Member) => MEMBER.get_or_init(member),
        Some(ProjectRole::Owner) => OWNER.get_or_init(|| {
            CapabilitySet::new()
                .add(MEMBER.get_or_init(member))
                .does(Capability::ReadPrivileged, &["secret"])
                .does(Capability::Create, &["secret", "project-member"])
                .does(Capability::Archive, &["secret"])
        }),
    }
}

/// Oracle answering from an acting member's effective role, with per-subject
/// overrides (e.g. secret-level ACLs) taking precedence over the role table.
#[derive(Debug, Clone)]
pub struct MemberOracle {
    role: Option<ProjectRole>,
    overrides: HashMap<(Uuid, Capability), bool>,
}

impl MemberOracle {
    pub fn new(role: Option<ProjectRole>) -> Self {
        Self {
            role,
            overrides: HashMap::new(),
        }
    }

    pub fn for_member(member: &ProjectMember) -> Self {
        Self::new(member.effective_role())
    }

    /// Grant or deny one capability on one subject regardless of role
    pub fn with_override(mut self, subject: Uuid, capability: Capability, allowed: bool) -> Self {
        self.overrides.insert((subject, capability), allowed);
        self
    }
}

impl CapabilityOracle for MemberOracle {
    fn can(&self, capability: Capability, subject: &SubjectRef) -> Result<bool, OracleError> {
        if let Some(allowed) = self.overrides.get(&(subject.id, capability)) {
            return Ok(*allowed);
        }

        Ok(role_capabilities(self.role).allows(capability, subject.name))
    }
}
