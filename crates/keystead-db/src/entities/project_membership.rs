//! ProjectMembership entity: explicit project roles

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use keystead_core::{ProjectMembership, ProjectRole};

pub use super::organization_membership::MembershipRole;

impl From<MembershipRole> for ProjectRole {
    fn from(role: MembershipRole) -> Self {
        match role {
            MembershipRole::Member => ProjectRole::Member,
            MembershipRole::Owner => ProjectRole::Owner,
        }
    }
}

impl From<ProjectRole> for MembershipRole {
    fn from(role: ProjectRole) -> Self {
        match role {
            ProjectRole::Member => MembershipRole::Member,
            ProjectRole::Owner => MembershipRole::Owner,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project_memberships")]
pub struct Model {
    /// Membership UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub project_id: Uuid,

    pub user_id: Uuid,

    /// Role of the user in this project
    pub role: MembershipRole,

    pub created_at: ChronoDateTimeUtc,

    /// Last role change
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Project,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ProjectMembership {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            project_id: model.project_id,
            user_id: model.user_id,
            role: model.role.into(),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
