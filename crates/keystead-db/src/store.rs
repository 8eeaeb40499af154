//! SeaORM implementations of the core collaborator stores
//!
//! A [`DbStore`] borrows any connection, so handing it a
//! `DatabaseTransaction` makes every call part of that transaction.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use tracing::debug;
use uuid::Uuid;

use keystead_core::{
    MembershipStore, NewProjectMembership, OrganizationMembership, Project, ProjectMembership,
    ProjectStore, Secret, SecretStore, StoreError, User, UserStore,
};

use crate::entities::{organization_membership, project_membership, secret};

fn backend(e: DbErr) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// All four stores over one connection or transaction
pub struct DbStore<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> DbStore<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }
}

#[async_trait]
impl<'a, C> UserStore for DbStore<'a, C>
where
    C: ConnectionTrait + Send + Sync,
{
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let model = crate::entities::User::find_by_id(id)
            .one(self.db)
            .await
            .map_err(backend)?;
        Ok(model.map(Into::into))
    }
}

#[async_trait]
impl<'a, C> ProjectStore for DbStore<'a, C>
where
    C: ConnectionTrait + Send + Sync,
{
    async fn find_project(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        let model = crate::entities::Project::find_by_id(id)
            .one(self.db)
            .await
            .map_err(backend)?;
        Ok(model.map(Into::into))
    }
}

#[async_trait]
impl<'a, C> MembershipStore for DbStore<'a, C>
where
    C: ConnectionTrait + Send + Sync,
{
    async fn find_project_membership(
        &self,
        user_id: Uuid,
        project_id: Uuid,
    ) -> Result<Option<ProjectMembership>, StoreError> {
        let model = crate::entities::ProjectMembership::find()
            .filter(project_membership::Column::UserId.eq(user_id))
            .filter(project_membership::Column::ProjectId.eq(project_id))
            .one(self.db)
            .await
            .map_err(backend)?;
        Ok(model.map(Into::into))
    }

    async fn find_project_membership_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<ProjectMembership>, StoreError> {
        let model = crate::entities::ProjectMembership::find_by_id(id)
            .one(self.db)
            .await
            .map_err(backend)?;
        Ok(model.map(Into::into))
    }

    async fn find_organization_membership(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<OrganizationMembership>, StoreError> {
        let model = crate::entities::OrganizationMembership::find()
            .filter(organization_membership::Column::OrganizationId.eq(organization_id))
            .filter(organization_membership::Column::UserId.eq(user_id))
            .one(self.db)
            .await
            .map_err(backend)?;
        Ok(model.map(Into::into))
    }

    async fn list_project_memberships(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<ProjectMembership>, StoreError> {
        let models = crate::entities::ProjectMembership::find()
            .filter(project_membership::Column::ProjectId.eq(project_id))
            .order_by_asc(project_membership::Column::CreatedAt)
            .order_by_asc(project_membership::Column::Id)
            .all(self.db)
            .await
            .map_err(backend)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn list_organization_memberships(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<OrganizationMembership>, StoreError> {
        let models = crate::entities::OrganizationMembership::find()
            .filter(organization_membership::Column::OrganizationId.eq(organization_id))
            .order_by_asc(organization_membership::Column::CreatedAt)
            .order_by_asc(organization_membership::Column::Id)
            .all(self.db)
            .await
            .map_err(backend)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn create_project_membership(
        &self,
        membership: &NewProjectMembership,
    ) -> Result<Uuid, StoreError> {
        let now = Utc::now();
        let model = project_membership::ActiveModel {
            id: Set(Uuid::new_v4()),
            project_id: Set(membership.project_id),
            user_id: Set(membership.user_id),
            role: Set(membership.role.into()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model.insert(self.db).await.map_err(backend)?;
        debug!(
            "Created project membership {} for user {} in project {}",
            inserted.id, inserted.user_id, inserted.project_id
        );

        Ok(inserted.id)
    }

    async fn update_project_membership(
        &self,
        membership: &ProjectMembership,
    ) -> Result<(), StoreError> {
        let model = project_membership::ActiveModel {
            id: Set(membership.id),
            role: Set(membership.role.into()),
            updated_at: Set(membership.updated_at),
            ..Default::default()
        };

        model.update(self.db).await.map_err(backend)?;
        debug!("Updated project membership {}", membership.id);

        Ok(())
    }

    async fn delete_project_membership(&self, id: Uuid) -> Result<(), StoreError> {
        let result = crate::entities::ProjectMembership::delete_by_id(id)
            .exec(self.db)
            .await
            .map_err(backend)?;

        if result.rows_affected == 0 {
            return Err(StoreError::Backend(format!(
                "project membership {} was not deleted",
                id
            )));
        }
        debug!("Deleted project membership {}", id);

        Ok(())
    }
}

#[async_trait]
impl<'a, C> SecretStore for DbStore<'a, C>
where
    C: ConnectionTrait + Send + Sync,
{
    async fn find_secret(&self, id: Uuid) -> Result<Option<Secret>, StoreError> {
        crate::entities::Secret::find_by_id(id)
            .filter(secret::Column::ArchivedAt.is_null())
            .one(self.db)
            .await
            .map_err(backend)?
            .map(Secret::try_from)
            .transpose()
    }

    async fn list_environment_secrets(
        &self,
        environment_id: Uuid,
    ) -> Result<Vec<Secret>, StoreError> {
        let models = crate::entities::Secret::find()
            .filter(secret::Column::EnvironmentId.eq(environment_id))
            .filter(secret::Column::ArchivedAt.is_null())
            .order_by_asc(secret::Column::CreatedAt)
            .order_by_asc(secret::Column::Name)
            .all(self.db)
            .await
            .map_err(backend)?;

        models.into_iter().map(Secret::try_from).collect()
    }

    async fn create_secret(&self, secret: &Secret) -> Result<(), StoreError> {
        let payload = secret
            .payload
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| StoreError::Corrupt {
                id: secret.id,
                reason: format!("unencodable payload: {}", e),
            })?;

        let model = secret::ActiveModel {
            id: Set(secret.id),
            project_id: Set(secret.project_id),
            environment_id: Set(secret.environment_id),
            name: Set(secret.name.clone()),
            kind: Set(secret.kind.into()),
            status: Set(secret.state.into()),
            payload: Set(payload),
            created_at: Set(Utc::now()),
            archived_at: Set(None),
        };

        model.insert(self.db).await.map_err(backend)?;
        debug!(
            "Created secret {} in environment {}",
            secret.id, secret.environment_id
        );

        Ok(())
    }

    async fn archive_secret(&self, id: Uuid) -> Result<(), StoreError> {
        let result = crate::entities::Secret::update_many()
            .col_expr(secret::Column::ArchivedAt, Expr::value(Utc::now()))
            .filter(secret::Column::Id.eq(id))
            .filter(secret::Column::ArchivedAt.is_null())
            .exec(self.db)
            .await
            .map_err(backend)?;

        if result.rows_affected == 0 {
            return Err(StoreError::Backend(format!("secret {} was not archived", id)));
        }
        debug!("Archived secret {}", id);

        Ok(())
    }
}
