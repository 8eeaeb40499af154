//! Effective membership resolution

use std::collections::BTreeMap;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::member::ProjectMember;
use crate::model::{OrganizationMembership, Project, ProjectMembership};
use crate::role;
use crate::store::{MembershipStore, ProjectStore, UserStore};

/// Builds `ProjectMember` aggregates from the user, project and membership stores
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    users: &'a dyn UserStore,
    projects: &'a dyn ProjectStore,
    memberships: &'a dyn MembershipStore,
}

impl<'a> Resolver<'a> {
    pub fn new(
        users: &'a dyn UserStore,
        projects: &'a dyn ProjectStore,
        memberships: &'a dyn MembershipStore,
    ) -> Self {
        Self {
            users,
            projects,
            memberships,
        }
    }

    /// Resolve one user's standing in a project.
    ///
    /// Missing membership records are not errors; only a missing user or
    /// project is.
    pub async fn resolve(&self, user_id: Uuid, project_id: Uuid) -> Result<ProjectMember> {
        let user = self
            .users
            .find_user(user_id)
            .await?
            .ok_or_else(|| Error::not_found("user", user_id))?;
        let project = self.load_project(project_id).await?;

        let project_membership = self
            .memberships
            .find_project_membership(user_id, project_id)
            .await?;
        let organization_membership = self
            .memberships
            .find_organization_membership(project.organization_id, user_id)
            .await?;

        let member = ProjectMember::new(
            user,
            project,
            project_membership.as_ref(),
            organization_membership.as_ref(),
        );

        debug!(
            "Resolved user {} in project {}: project={} organization={} effective={}",
            user_id,
            project_id,
            role::role_name(member.project_role),
            role::organization_role_name(member.organization_role),
            role::role_name(member.effective_role()),
        );

        Ok(member)
    }

    /// Every user with explicit or organization-derived standing in a project,
    /// ordered by name.
    pub async fn resolve_all(&self, project_id: Uuid) -> Result<Vec<ProjectMember>> {
        let project = self.load_project(project_id).await?;

        let mut by_user: BTreeMap<Uuid, (Option<ProjectMembership>, Option<OrganizationMembership>)> =
            BTreeMap::new();

        for membership in self.memberships.list_project_memberships(project_id).await? {
            let user_id = membership.user_id;
            by_user.entry(user_id).or_default().0 = Some(membership);
        }
        for membership in self
            .memberships
            .list_organization_memberships(project.organization_id)
            .await?
        {
            let user_id = membership.user_id;
            by_user.entry(user_id).or_default().1 = Some(membership);
        }

        let mut members = Vec::with_capacity(by_user.len());
        for (user_id, (project_membership, organization_membership)) in by_user {
            let Some(user) = self.users.find_user(user_id).await? else {
                warn!(
                    "Skipping membership of unknown user {} in project {}",
                    user_id, project_id
                );
                continue;
            };

            members.push(ProjectMember::new(
                user,
                project.clone(),
                project_membership.as_ref(),
                organization_membership.as_ref(),
            ));
        }

        members.sort_by(|a, b| {
            a.user
                .name
                .cmp(&b.user.name)
                .then_with(|| a.user.id.cmp(&b.user.id))
        });

        Ok(members)
    }

    async fn load_project(&self, project_id: Uuid) -> Result<Project> {
        self.projects
            .find_project(project_id)
            .await?
            .ok_or_else(|| Error::not_found("project", project_id))
    }
}
