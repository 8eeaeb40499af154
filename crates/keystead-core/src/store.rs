//! Collaborator stores the core reads from and writes through
//!
//! Implementations are expected to run every call inside the caller's
//! transaction. The core issues calls one at a time and never spawns work.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::{NewProjectMembership, OrganizationMembership, Project, ProjectMembership, User};
use crate::secret::Secret;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn find_project(&self, id: Uuid) -> Result<Option<Project>, StoreError>;
}

/// Organization- and project-scoped membership records
#[async_trait]
pub trait MembershipStore: Send + Sync {
    async fn find_project_membership(
        &self,
        user_id: Uuid,
        project_id: Uuid,
    ) -> Result<Option<ProjectMembership>, StoreError>;

    async fn find_project_membership_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<ProjectMembership>, StoreError>;

    async fn find_organization_membership(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<OrganizationMembership>, StoreError>;

    async fn list_project_memberships(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<ProjectMembership>, StoreError>;

    async fn list_organization_memberships(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<OrganizationMembership>, StoreError>;

    /// Returns the id of the new record
    async fn create_project_membership(
        &self,
        membership: &NewProjectMembership,
    ) -> Result<Uuid, StoreError>;

    async fn update_project_membership(
        &self,
        membership: &ProjectMembership,
    ) -> Result<(), StoreError>;

    async fn delete_project_membership(&self, id: Uuid) -> Result<(), StoreError>;
}

/// Secrets that have not been archived. Archived secrets are invisible to
/// every lookup.
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn find_secret(&self, id: Uuid) -> Result<Option<Secret>, StoreError>;

    /// Secrets of one environment, in store order
    async fn list_environment_secrets(
        &self,
        environment_id: Uuid,
    ) -> Result<Vec<Secret>, StoreError>;

    async fn create_secret(&self, secret: &Secret) -> Result<(), StoreError>;

    /// Stamp the secret as archived
    async fn archive_secret(&self, id: Uuid) -> Result<(), StoreError>;
}
