//! Request-level operations over the collaborator stores
//!
//! Each call resolves fresh aggregates, runs the engines and persists through
//! the stores it was built with. Callers supply stores bound to their
//! transaction and commit afterwards.

use tracing::{debug, info};
use uuid::Uuid;

use crate::activity::Activity;
use crate::capability::{Capability, CapabilityOracle};
use crate::error::{Error, Result};
use crate::filter;
use crate::member::ProjectMember;
use crate::redaction::{self, RenderableSecret};
use crate::resolver::Resolver;
use crate::role::ProjectRole;
use crate::secret::Secret;
use crate::store::{MembershipStore, ProjectStore, SecretStore, UserStore};
use crate::transition;

pub struct MembershipService<'a> {
    resolver: Resolver<'a>,
    memberships: &'a dyn MembershipStore,
}

impl<'a> MembershipService<'a> {
    pub fn new(
        users: &'a dyn UserStore,
        projects: &'a dyn ProjectStore,
        memberships: &'a dyn MembershipStore,
    ) -> Self {
        Self {
            resolver: Resolver::new(users, projects, memberships),
            memberships,
        }
    }

    pub async fn resolve(&self, user_id: Uuid, project_id: Uuid) -> Result<ProjectMember> {
        self.resolver.resolve(user_id, project_id).await
    }

    /// Give `target_id` an explicit `role` in `project_id` on behalf of
    /// `actor_id`. The oracle must allow creating the target's project member.
    pub async fn add(
        &self,
        project_id: Uuid,
        actor_id: Uuid,
        target_id: Uuid,
        role: ProjectRole,
        oracle: &dyn CapabilityOracle,
    ) -> Result<ProjectMember> {
        let actor = self.resolver.resolve(actor_id, project_id).await?;
        let target = self.resolver.resolve(target_id, project_id).await?;

        if !filter::allows(oracle, Capability::Create, &target) {
            return Err(Error::forbidden(format!(
                "cannot add user {} to project {}",
                target_id, project_id
            )));
        }

        let record = transition::add(&actor, &target, role)?;
        let id = self.memberships.create_project_membership(&record).await?;

        info!(
            "User {} added user {} as {} of project {} (membership {})",
            actor_id, target_id, role, project_id, id
        );

        self.resolver.resolve(target_id, project_id).await
    }

    /// Promote `target_id` to owner of `project_id` on behalf of `actor_id`
    /// and persist the result. The returned member always carries the id of
    /// the persisted record.
    pub async fn promote(
        &self,
        project_id: Uuid,
        actor_id: Uuid,
        target_id: Uuid,
    ) -> Result<ProjectMember> {
        let actor = self.resolver.resolve(actor_id, project_id).await?;
        let target = self.resolver.resolve(target_id, project_id).await?;

        let mut promoted = transition::promote(&actor, &target)?;
        if promoted == target {
            debug!("Promotion of user {} changed nothing", target_id);
            return Ok(promoted);
        }

        let role = promoted
            .project_role
            .ok_or_else(|| Error::invalid_state("promotion produced no project role"))?;

        match promoted.to_membership(role) {
            Some(record) => {
                self.memberships.update_project_membership(&record).await?;
            }
            None => {
                let id = self
                    .memberships
                    .create_project_membership(&promoted.to_new_membership(role))
                    .await?;
                promoted.membership_id = Some(id);
            }
        }

        info!(
            "User {} promoted user {} to {} of project {}",
            actor_id, target_id, role, project_id
        );

        Ok(promoted)
    }

    /// Remove `target_id` from `project_id` on behalf of `actor_id`.
    ///
    /// Returns the activity the caller should emit.
    pub async fn remove(&self, project_id: Uuid, actor_id: Uuid, target_id: Uuid) -> Result<Activity> {
        let actor = self.resolver.resolve(actor_id, project_id).await?;
        let target = self.resolver.resolve(target_id, project_id).await?;

        transition::remove(&actor, &target, self.memberships).await?;

        let activity = if actor.is_same_user(&target) {
            Activity::user_left_project(&target.user, &target.project)
        } else {
            Activity::user_removed_from_project(&target.user, &target.project)
        };

        Ok(activity)
    }

    /// Members of a project the reader may see
    pub async fn list_members(
        &self,
        project_id: Uuid,
        oracle: &dyn CapabilityOracle,
    ) -> Result<Vec<ProjectMember>> {
        let candidates = self.resolver.resolve_all(project_id).await?;
        let total = candidates.len();

        let visible = filter::retain_readable(candidates, oracle);
        debug!(
            "Listing members of project {}: {} of {} visible",
            project_id,
            visible.len(),
            total
        );

        Ok(visible)
    }
}

pub struct SecretService<'a> {
    secrets: &'a dyn SecretStore,
}

impl<'a> SecretService<'a> {
    pub fn new(secrets: &'a dyn SecretStore) -> Self {
        Self { secrets }
    }

    /// Secrets of an environment the reader may see, each projected for the
    /// reader on its own
    pub async fn list_environment_secrets(
        &self,
        environment_id: Uuid,
        oracle: &dyn CapabilityOracle,
    ) -> Result<Vec<RenderableSecret>> {
        let candidates = self.secrets.list_environment_secrets(environment_id).await?;
        let total = candidates.len();

        let visible = filter::retain_readable(candidates, oracle);
        debug!(
            "Listing secrets of environment {}: {} of {} visible",
            environment_id,
            visible.len(),
            total
        );

        visible
            .iter()
            .map(|secret| redaction::project(secret, oracle))
            .collect()
    }

    pub async fn show(&self, id: Uuid, oracle: &dyn CapabilityOracle) -> Result<RenderableSecret> {
        let secret = self
            .secrets
            .find_secret(id)
            .await?
            .ok_or_else(|| Error::not_found("secret", id))?;

        if !filter::allows(oracle, Capability::Read, &secret) {
            return Err(Error::forbidden(format!("cannot read secret {}", id)));
        }

        redaction::project(&secret, oracle)
    }

    /// Store a new secret and return it as the creator sees it
    pub async fn create(
        &self,
        secret: Secret,
        oracle: &dyn CapabilityOracle,
    ) -> Result<RenderableSecret> {
        if secret.name.trim().is_empty() {
            return Err(Error::invalid_state("secret name must not be empty"));
        }

        if !filter::allows(oracle, Capability::Create, &secret) {
            return Err(Error::forbidden(format!(
                "cannot create secrets in project {}",
                secret.project_id
            )));
        }

        self.secrets.create_secret(&secret).await?;

        info!(
            "Created {} secret {} ({}) in environment {}",
            secret.kind, secret.name, secret.id, secret.environment_id
        );

        redaction::project(&secret, oracle)
    }

    /// Archive a secret. Archived secrets drop out of every lookup, so
    /// archiving twice reports `NotFound`.
    pub async fn archive(&self, id: Uuid, oracle: &dyn CapabilityOracle) -> Result<()> {
        let secret = self
            .secrets
            .find_secret(id)
            .await?
            .ok_or_else(|| Error::not_found("secret", id))?;

        if !filter::allows(oracle, Capability::Archive, &secret) {
            return Err(Error::forbidden(format!("cannot archive secret {}", id)));
        }

        self.secrets.archive_secret(id).await?;
        info!("Archived secret {} ({})", secret.name, id);

        Ok(())
    }
}
