//! Membership transitions and secret redaction for shared projects
//!
//! The two rule-dense parts of project access management:
//! - **Membership**: merging organization and project roles into an effective
//!   role, then promoting and removing members under asymmetric rules.
//! - **Secrets**: rendering each stored secret as a pending, unprivileged or
//!   privileged view, decided per secret by a capability oracle.
//!
//! Persistence, transport and activity delivery are collaborators behind the
//! traits in [`store`], [`capability`] and [`activity`].

pub mod activity;
pub mod capability;
pub mod error;
pub mod filter;
pub mod member;
pub mod model;
pub mod redaction;
pub mod resolver;
pub mod role;
pub mod secret;
pub mod service;
pub mod store;
pub mod transition;

pub use activity::{Activity, ActivityEmitter};
pub use capability::{Capability, CapabilityOracle, MemberOracle, Subject, SubjectRef};
pub use error::{Error, ErrorKind, OracleError, Result, StoreError};
pub use member::ProjectMember;
pub use model::{NewProjectMembership, OrganizationMembership, Project, ProjectMembership, User};
pub use redaction::{Privilege, RenderableSecret, SecretSummary};
pub use resolver::Resolver;
pub use role::{OrganizationRole, ProjectRole};
pub use secret::{Secret, SecretKind, SecretPayload, SecretState};
pub use service::{MembershipService, SecretService};
pub use store::{MembershipStore, ProjectStore, SecretStore, UserStore};

// Re-export for store implementors
pub use async_trait::async_trait;
