//! Bulk loading of users, projects, memberships and secrets from JSON
//!
//! Fixtures seed fresh databases for development and demos. Membership ids are
//! generated when omitted; a secret's status follows from whether it carries a
//! payload unless given explicitly.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, Set};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use keystead_core::{OrganizationRole, ProjectRole, SecretKind, SecretPayload, SecretState};

use crate::entities::{
    organization, organization_membership, project, project_membership, secret, user,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub users: Vec<FixtureUser>,
    pub organizations: Vec<FixtureOrganization>,
    pub projects: Vec<FixtureProject>,
    pub organization_memberships: Vec<FixtureOrganizationMembership>,
    pub project_memberships: Vec<FixtureProjectMembership>,
    pub secrets: Vec<FixtureSecret>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureOrganization {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureProject {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureOrganizationMembership {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub role: OrganizationRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureProjectMembership {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub role: ProjectRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSecret {
    pub id: Uuid,
    pub project_id: Uuid,
    pub environment_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SecretKind,
    #[serde(default)]
    pub state: Option<SecretState>,
    #[serde(default)]
    pub payload: Option<SecretPayload>,
}

impl FixtureSecret {
    fn state(&self) -> SecretState {
        self.state.unwrap_or(match self.payload {
            Some(_) => SecretState::Active,
            None => SecretState::Pending,
        })
    }
}

/// Row counts written by [`import`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub users: usize,
    pub organizations: usize,
    pub projects: usize,
    pub memberships: usize,
    pub secrets: usize,
}

/// Insert every record of a fixture, parents before children.
///
/// Pass a transaction to make the import all-or-nothing.
pub async fn import<C: ConnectionTrait>(db: &C, fixture: &Fixture) -> Result<ImportSummary, DbErr> {
    let now = Utc::now();
    let mut summary = ImportSummary::default();

    for u in &fixture.users {
        user::ActiveModel {
            id: Set(u.id),
            name: Set(u.name.clone()),
            email: Set(u.email.clone()),
            created_at: Set(now),
        }
        .insert(db)
        .await?;
        summary.users += 1;
    }

    for o in &fixture.organizations {
        organization::ActiveModel {
            id: Set(o.id),
            name: Set(o.name.clone()),
            created_at: Set(now),
        }
        .insert(db)
        .await?;
        summary.organizations += 1;
    }

    for p in &fixture.projects {
        project::ActiveModel {
            id: Set(p.id),
            organization_id: Set(p.organization_id),
            name: Set(p.name.clone()),
            created_at: Set(now),
        }
        .insert(db)
        .await?;
        summary.projects += 1;
    }

    for m in &fixture.organization_memberships {
        organization_membership::ActiveModel {
            id: Set(m.id),
            organization_id: Set(m.organization_id),
            user_id: Set(m.user_id),
            role: Set(m.role.into()),
            created_at: Set(now),
        }
        .insert(db)
        .await?;
        summary.memberships += 1;
    }

    for m in &fixture.project_memberships {
        project_membership::ActiveModel {
            id: Set(m.id),
            project_id: Set(m.project_id),
            user_id: Set(m.user_id),
            role: Set(m.role.into()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;
        summary.memberships += 1;
    }

    for s in &fixture.secrets {
        let payload = s
            .payload
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| DbErr::Custom(format!("cannot encode payload of secret {}: {}", s.id, e)))?;

        secret::ActiveModel {
            id: Set(s.id),
            project_id: Set(s.project_id),
            environment_id: Set(s.environment_id),
            name: Set(s.name.clone()),
            kind: Set(s.kind.into()),
            status: Set(s.state().into()),
            payload: Set(payload),
            created_at: Set(now),
            archived_at: Set(None),
        }
        .insert(db)
        .await?;
        summary.secrets += 1;
    }

    info!(
        "Imported {} users, {} organizations, {} projects, {} memberships, {} secrets",
        summary.users,
        summary.organizations,
        summary.projects,
        summary.memberships,
        summary.secrets
    );

    Ok(summary)
}
