//! Membership transitions: adding, promotion and removal
//!
//! Each operation is driven by the actor's effective role and acts on the
//! target's project-scoped standing. None of them emits activities.

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::member::ProjectMember;
use crate::model::{NewProjectMembership, ProjectMembership};
use crate::role::{self, OrganizationRole, ProjectRole};
use crate::store::MembershipStore;

fn ensure_same_project(actor: &ProjectMember, target: &ProjectMember) -> Result<()> {
    if actor.project.id != target.project.id {
        return Err(Error::invalid_state(format!(
            "actor is resolved in project {} but target in project {}",
            actor.project.id, target.project.id
        )));
    }
    Ok(())
}

/// Promote `target` to project owner.
///
/// Requires the actor to be an effective owner. Promoting a target that
/// already holds the project owner role changes nothing. The returned member
/// keeps the target's `membership_id`: `Some` means the existing record must be
/// updated, `None` means a record must be created.
pub fn promote(actor: &ProjectMember, target: &ProjectMember) -> Result<ProjectMember> {
    ensure_same_project(actor, target)?;

    if !actor.is_owner() {
        return Err(Error::forbidden(format!(
            "promoting members requires the owner role, actor has {}",
            role::role_name(actor.effective_role())
        )));
    }

    let mut promoted = target.clone();
    match target.project_role {
        Some(ProjectRole::Owner) => {
            debug!("User {} already owns project {}", target.user.id, target.project.id);
        }
        Some(ProjectRole::Member) | None => {
            promoted.project_role = Some(ProjectRole::Owner);
        }
    }

    Ok(promoted)
}

/// Grant `target` an explicit project membership with `role`.
///
/// Requires the actor to be an effective owner. A target that already holds
/// a project membership is rejected; organization-derived standing does not
/// count, so an organization member can be given a project role of their own.
pub fn add(
    actor: &ProjectMember,
    target: &ProjectMember,
    role: ProjectRole,
) -> Result<NewProjectMembership> {
    ensure_same_project(actor, target)?;

    if !actor.is_owner() {
        return Err(Error::forbidden(format!(
            "adding members requires the owner role, actor has {}",
            role::role_name(actor.effective_role())
        )));
    }

    if target.is_explicit() {
        return Err(Error::invalid_state(format!(
            "user {} is already a {} of project {}",
            target.user.id,
            role::role_name(target.project_role),
            target.project.id
        )));
    }

    Ok(target.to_new_membership(role))
}

/// Remove `target`'s project membership.
///
/// Anyone may remove themselves; removing somebody else takes an effective
/// owner. Organization-derived access cannot be removed here, and the last
/// owner of a project cannot be removed at all, whoever asks. Ownership is
/// re-read from the store rather than taken from the resolved aggregates.
pub async fn remove(
    actor: &ProjectMember,
    target: &ProjectMember,
    memberships: &dyn MembershipStore,
) -> Result<()> {
    ensure_same_project(actor, target)?;

    if !actor.is_same_user(target) && !actor.is_owner() {
        if let Some(record) = find_record(target, memberships).await? {
            if record.user_id == target.user.id && record.role == ProjectRole::Owner {
                ensure_another_owner(&record, target, memberships).await?;
            }
        }

        return Err(Error::forbidden(format!(
            "removing other members requires the owner role, actor has {}",
            role::role_name(actor.effective_role())
        )));
    }

    let membership_id = target.membership_id.ok_or_else(|| {
        Error::invalid_state(format!(
            "user {} has no project membership in project {}; organization access cannot be revoked here",
            target.user.id, target.project.id
        ))
    })?;

    let record = find_record(target, memberships)
        .await?
        .ok_or_else(|| Error::not_found("project membership", membership_id))?;

    if record.user_id != target.user.id || record.project_id != target.project.id {
        return Err(Error::invalid_state(format!(
            "membership {} does not belong to user {} in project {}",
            membership_id, target.user.id, target.project.id
        )));
    }

    if record.role == ProjectRole::Owner {
        ensure_another_owner(&record, target, memberships).await?;
    }

    memberships.delete_project_membership(membership_id).await?;

    info!(
        "Removed user {} from project {} (membership {})",
        target.user.id, target.project.id, membership_id
    );

    Ok(())
}

async fn find_record(
    target: &ProjectMember,
    memberships: &dyn MembershipStore,
) -> Result<Option<ProjectMembership>> {
    match target.membership_id {
        Some(id) => Ok(memberships.find_project_membership_by_id(id).await?),
        None => Ok(None),
    }
}

/// The project keeps an owner after `record` is gone: another explicit
/// project owner, or any organization owner. The latter includes the target
/// itself, whose organization role outlives the project record.
async fn ensure_another_owner(
    record: &ProjectMembership,
    target: &ProjectMember,
    memberships: &dyn MembershipStore,
) -> Result<()> {
    let other_project_owner = memberships
        .list_project_memberships(record.project_id)
        .await?
        .iter()
        .any(|m| m.role == ProjectRole::Owner && m.user_id != record.user_id);

    if other_project_owner {
        return Ok(());
    }

    let organization_owner = memberships
        .list_organization_memberships(target.project.organization_id)
        .await?
        .iter()
        .any(|m| m.role == OrganizationRole::Owner);

    if organization_owner {
        return Ok(());
    }

    Err(Error::invalid_state(format!(
        "user {} is the last owner of project {}",
        record.user_id, record.project_id
    )))
}
