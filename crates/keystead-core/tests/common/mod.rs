//! In-memory collaborator store shared by the core integration tests

#![allow(dead_code)]

use std::sync::Mutex;

use chrono::Utc;
use keystead_core::{
    async_trait, MembershipStore, NewProjectMembership, OrganizationMembership, OrganizationRole,
    Project, ProjectMembership, ProjectRole, ProjectStore, Secret, SecretStore, StoreError, User,
    UserStore,
};
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    projects: Vec<Project>,
    organization_memberships: Vec<OrganizationMembership>,
    project_memberships: Vec<ProjectMembership>,
    secrets: Vec<Secret>,
    archived_secrets: Vec<Uuid>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, name: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
        };
        self.tables.lock().unwrap().users.push(user.clone());
        user
    }

    pub fn add_project(&self, name: &str) -> Project {
        let project = Project {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            name: name.to_string(),
        };
        self.tables.lock().unwrap().projects.push(project.clone());
        project
    }

    pub fn join_project(&self, user: &User, project: &Project, role: ProjectRole) -> Uuid {
        let membership = ProjectMembership {
            id: Uuid::new_v4(),
            project_id: project.id,
            user_id: user.id,
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let id = membership.id;
        self.tables
            .lock()
            .unwrap()
            .project_memberships
            .push(membership);
        id
    }

    pub fn join_organization(&self, user: &User, project: &Project, role: OrganizationRole) {
        self.tables
            .lock()
            .unwrap()
            .organization_memberships
            .push(OrganizationMembership {
                id: Uuid::new_v4(),
                organization_id: project.organization_id,
                user_id: user.id,
                role,
                created_at: Utc::now(),
            });
    }

    pub fn add_secret(&self, secret: Secret) {
        self.tables.lock().unwrap().secrets.push(secret);
    }

    pub fn project_memberships(&self) -> Vec<ProjectMembership> {
        self.tables.lock().unwrap().project_memberships.clone()
    }

    /// Every stored secret, archived ones included
    pub fn all_secrets(&self) -> Vec<Secret> {
        self.tables.lock().unwrap().secrets.clone()
    }

    pub fn archived_secrets(&self) -> Vec<Uuid> {
        self.tables.lock().unwrap().archived_secrets.clone()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn find_project(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.projects.iter().find(|p| p.id == id).cloned())
    }
}

#[async_trait]
impl MembershipStore for MemoryStore {
    async fn find_project_membership(
        &self,
        user_id: Uuid,
        project_id: Uuid,
    ) -> Result<Option<ProjectMembership>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .project_memberships
            .iter()
            .find(|m| m.user_id == user_id && m.project_id == project_id)
            .cloned())
    }

    async fn find_project_membership_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<ProjectMembership>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .project_memberships
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn find_organization_membership(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<OrganizationMembership>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .organization_memberships
            .iter()
            .find(|m| m.organization_id == organization_id && m.user_id == user_id)
            .cloned())
    }

    async fn list_project_memberships(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<ProjectMembership>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .project_memberships
            .iter()
            .filter(|m| m.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn list_organization_memberships(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<OrganizationMembership>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .organization_memberships
            .iter()
            .filter(|m| m.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn create_project_membership(
        &self,
        membership: &NewProjectMembership,
    ) -> Result<Uuid, StoreError> {
        let record = ProjectMembership {
            id: Uuid::new_v4(),
            project_id: membership.project_id,
            user_id: membership.user_id,
            role: membership.role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let id = record.id;
        self.tables.lock().unwrap().project_memberships.push(record);
        Ok(id)
    }

    async fn update_project_membership(
        &self,
        membership: &ProjectMembership,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let existing = tables
            .project_memberships
            .iter_mut()
            .find(|m| m.id == membership.id)
            .ok_or_else(|| StoreError::Backend(format!("no membership {}", membership.id)))?;
        existing.role = membership.role;
        existing.updated_at = membership.updated_at;
        Ok(())
    }

    async fn delete_project_membership(&self, id: Uuid) -> Result<(), StoreError> {
        self.tables
            .lock()
            .unwrap()
            .project_memberships
            .retain(|m| m.id != id);
        Ok(())
    }
}

#[async_trait]
impl SecretStore for MemoryStore {
    async fn find_secret(&self, id: Uuid) -> Result<Option<Secret>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .secrets
            .iter()
            .find(|s| s.id == id && !tables.archived_secrets.contains(&s.id))
            .cloned())
    }

    async fn list_environment_secrets(
        &self,
        environment_id: Uuid,
    ) -> Result<Vec<Secret>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .secrets
            .iter()
            .filter(|s| s.environment_id == environment_id)
            .filter(|s| !tables.archived_secrets.contains(&s.id))
            .cloned()
            .collect())
    }

    async fn create_secret(&self, secret: &Secret) -> Result<(), StoreError> {
        self.tables.lock().unwrap().secrets.push(secret.clone());
        Ok(())
    }

    async fn archive_secret(&self, id: Uuid) -> Result<(), StoreError> {
        self.tables.lock().unwrap().archived_secrets.push(id);
        Ok(())
    }
}
