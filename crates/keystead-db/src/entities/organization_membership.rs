//! OrganizationMembership entity: organization-wide roles

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use keystead_core::{OrganizationMembership, OrganizationRole};

/// Role column shared by organization and project memberships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum MembershipRole {
    #[sea_orm(string_value = "member")]
    Member,

    #[sea_orm(string_value = "owner")]
    Owner,
}

impl From<MembershipRole> for OrganizationRole {
    fn from(role: MembershipRole) -> Self {
        match role {
            MembershipRole::Member => OrganizationRole::Member,
            MembershipRole::Owner => OrganizationRole::Owner,
        }
    }
}

impl From<OrganizationRole> for MembershipRole {
    fn from(role: OrganizationRole) -> Self {
        match role {
            OrganizationRole::Member => MembershipRole::Member,
            OrganizationRole::Owner => MembershipRole::Owner,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "organization_memberships")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub organization_id: Uuid,

    pub user_id: Uuid,

    pub role: MembershipRole,

    /// When the user joined the organization
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::OrganizationId",
        to = "super::organization::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Organization,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for OrganizationMembership {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            organization_id: model.organization_id,
            user_id: model.user_id,
            role: model.role.into(),
            created_at: model.created_at,
        }
    }
}
