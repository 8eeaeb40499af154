//! Secret entity: SSH key pairs and environment variables

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use keystead_core::{Secret, SecretKind, SecretPayload, SecretState, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum SecretType {
    #[sea_orm(string_value = "ssh")]
    Ssh,

    #[sea_orm(string_value = "env")]
    Env,
}

/// Whether the sensitive material has been supplied yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum SecretStatus {
    #[sea_orm(string_value = "pending")]
    Pending,

    #[sea_orm(string_value = "present")]
    Present,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "secrets")]
pub struct Model {
    /// Secret UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub project_id: Uuid,

    pub environment_id: Uuid,

    pub name: String,

    pub kind: SecretType,

    pub status: SecretStatus,

    /// JSON-encoded sensitive material, NULL while pending
    #[sea_orm(column_type = "Text", nullable)]
    pub payload: Option<String>,

    pub created_at: ChronoDateTimeUtc,

    /// Set when the secret is archived; archived rows are never read back
    pub archived_at: Option<ChronoDateTimeUtc>,
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
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<SecretType> for SecretKind {
    fn from(kind: SecretType) -> Self {
        match kind {
            SecretType::Ssh => SecretKind::Ssh,
            SecretType::Env => SecretKind::Environment,
        }
    }
}

impl From<SecretKind> for SecretType {
    fn from(kind: SecretKind) -> Self {
        match kind {
            SecretKind::Ssh => SecretType::Ssh,
            SecretKind::Environment => SecretType::Env,
        }
    }
}

impl From<SecretStatus> for SecretState {
    fn from(status: SecretStatus) -> Self {
        match status {
            SecretStatus::Pending => SecretState::Pending,
            SecretStatus::Present => SecretState::Active,
        }
    }
}

impl From<SecretState> for SecretStatus {
    fn from(state: SecretState) -> Self {
        match state {
            SecretState::Pending => SecretStatus::Pending,
            SecretState::Active => SecretStatus::Present,
        }
    }
}

/// Decodes the payload column without consulting the kind column, so a
/// disagreement between the two survives until projection.
impl TryFrom<Model> for Secret {
    type Error = StoreError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let payload = model
            .payload
            .as_deref()
            .map(serde_json::from_str::<SecretPayload>)
            .transpose()
            .map_err(|e| StoreError::Corrupt {
                id: model.id,
                reason: format!("undecodable payload: {}", e),
            })?;

        Ok(Secret {
            id: model.id,
            project_id: model.project_id,
            environment_id: model.environment_id,
            name: model.name,
            kind: model.kind.into(),
            state: model.status.into(),
            payload,
        })
    }
}
