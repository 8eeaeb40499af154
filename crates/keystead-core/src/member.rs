//! The `ProjectMember` aggregate
//!
//! A `ProjectMember` describes one user's standing in one project, merged from
//! the project membership record and the organization membership record (either
//! may be absent). It is built fresh for every request and never persisted
//! itself; only the project membership it produces is.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::capability::Subject;
use crate::model::{NewProjectMembership, OrganizationMembership, Project, ProjectMembership, User};
use crate::role::{self, OrganizationRole, ProjectRole};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMember {
    pub user: User,
    pub project: Project,

    /// Role from the project membership record, `None` without one
    pub project_role: Option<ProjectRole>,

    /// Role from the organization membership record, `None` without one
    pub organization_role: Option<OrganizationRole>,

    /// Id of the project membership record, `None` when access is implicit
    pub membership_id: Option<Uuid>,

    /// When the user gained their standing in the project
    pub created_at: Option<DateTime<Utc>>,
}

impl ProjectMember {
    pub fn new(
        user: User,
        project: Project,
        project_membership: Option<&ProjectMembership>,
        organization_membership: Option<&OrganizationMembership>,
    ) -> Self {
        // The project record's timestamp wins when both exist.
        let created_at = project_membership
            .map(|m| m.created_at)
            .or_else(|| organization_membership.map(|m| m.created_at));

        Self {
            user,
            project,
            project_role: project_membership.map(|m| m.role),
            organization_role: organization_membership.map(|m| m.role),
            membership_id: project_membership.map(|m| m.id),
            created_at,
        }
    }

    pub fn effective_role(&self) -> Option<ProjectRole> {
        role::effective_role(self.project_role, self.organization_role)
    }

    pub fn is_owner(&self) -> bool {
        self.effective_role() == Some(ProjectRole::Owner)
    }

    pub fn is_same_user(&self, other: &ProjectMember) -> bool {
        self.user.id == other.user.id
    }

    /// Whether the user has an explicit project membership record
    pub fn is_explicit(&self) -> bool {
        self.membership_id.is_some()
    }

    /// Membership record to update, when one exists
    pub fn to_membership(&self, role: ProjectRole) -> Option<ProjectMembership> {
        let id = self.membership_id?;
        let now = Utc::now();

        Some(ProjectMembership {
            id,
            project_id: self.project.id,
            user_id: self.user.id,
            role,
            created_at: self.created_at.unwrap_or(now),
            updated_at: now,
        })
    }

    /// Membership record to create for a user without one
    pub fn to_new_membership(&self, role: ProjectRole) -> NewProjectMembership {
        NewProjectMembership {
            project_id: self.project.id,
            user_id: self.user.id,
            role,
        }
    }
}

impl Subject for ProjectMember {
    fn authorization_name(&self) -> &'static str {
        "project-member"
    }

    fn subject_id(&self) -> Uuid {
        self.user.id
    }
}
