//! Initial schema: users, organizations, projects, memberships and secrets

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // 1. Users and organizations
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(uuid(User::Id).primary_key())
                    .col(string_len(User::Name, 255).not_null())
                    .col(string_len(User::Email, 255).not_null().unique_key())
                    .col(
                        timestamp_with_time_zone(User::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Organization::Table)
                    .if_not_exists()
                    .col(uuid(Organization::Id).primary_key())
                    .col(string_len(Organization::Name, 255).not_null())
                    .col(
                        timestamp_with_time_zone(Organization::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 2. Projects
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Project::Table)
                    .if_not_exists()
                    .col(uuid(Project::Id).primary_key())
                    .col(uuid(Project::OrganizationId).not_null())
                    .col(string_len(Project::Name, 255).not_null())
                    .col(
                        timestamp_with_time_zone(Project::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_projects_organization_id")
                            .from(Project::Table, Project::OrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_projects_organization_id")
                    .table(Project::Table)
                    .col(Project::OrganizationId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 3. Organization memberships
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(OrganizationMembership::Table)
                    .if_not_exists()
                    .col(uuid(OrganizationMembership::Id).primary_key())
                    .col(uuid(OrganizationMembership::OrganizationId).not_null())
                    .col(uuid(OrganizationMembership::UserId).not_null())
                    .col(
                        string_len(OrganizationMembership::Role, 32)
                            .not_null()
                            .default("member"),
                    )
                    .col(
                        timestamp_with_time_zone(OrganizationMembership::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organization_memberships_organization_id")
                            .from(
                                OrganizationMembership::Table,
                                OrganizationMembership::OrganizationId,
                            )
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organization_memberships_user_id")
                            .from(OrganizationMembership::Table, OrganizationMembership::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One record per user and organization
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_organization_memberships_organization_user")
                    .table(OrganizationMembership::Table)
                    .col(OrganizationMembership::OrganizationId)
                    .col(OrganizationMembership::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 4. Project memberships
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(ProjectMembership::Table)
                    .if_not_exists()
                    .col(uuid(ProjectMembership::Id).primary_key())
                    .col(uuid(ProjectMembership::ProjectId).not_null())
                    .col(uuid(ProjectMembership::UserId).not_null())
                    .col(
                        string_len(ProjectMembership::Role, 32)
                            .not_null()
                            .default("member"),
                    )
                    .col(
                        timestamp_with_time_zone(ProjectMembership::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(ProjectMembership::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_memberships_project_id")
                            .from(ProjectMembership::Table, ProjectMembership::ProjectId)
                            .to(Project::Table, Project::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_memberships_user_id")
                            .from(ProjectMembership::Table, ProjectMembership::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One record per user and project
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_project_memberships_project_user")
                    .table(ProjectMembership::Table)
                    .col(ProjectMembership::ProjectId)
                    .col(ProjectMembership::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 5. Secrets
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Secret::Table)
                    .if_not_exists()
                    .col(uuid(Secret::Id).primary_key())
                    .col(uuid(Secret::ProjectId).not_null())
                    .col(uuid(Secret::EnvironmentId).not_null())
                    .col(string_len(Secret::Name, 255).not_null())
                    .col(string_len(Secret::Kind, 16).not_null())
                    .col(
                        string_len(Secret::Status, 16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Secret::Payload).text())
                    .col(
                        timestamp_with_time_zone(Secret::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_secrets_project_id")
                            .from(Secret::Table, Secret::ProjectId)
                            .to(Project::Table, Project::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_secrets_environment_id")
                    .table(Secret::Table)
                    .col(Secret::EnvironmentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Reverse order of creation
        manager
            .drop_table(Table::drop().table(Secret::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ProjectMembership::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(OrganizationMembership::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Project::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Organization::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum User {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Name,
    Email,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Organization {
    #[sea_orm(iden = "organizations")]
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Project {
    #[sea_orm(iden = "projects")]
    Table,
    Id,
    OrganizationId,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum OrganizationMembership {
    #[sea_orm(iden = "organization_memberships")]
    Table,
    Id,
    OrganizationId,
    UserId,
    Role,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ProjectMembership {
    #[sea_orm(iden = "project_memberships")]
    Table,
    Id,
    ProjectId,
    UserId,
    Role,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Secret {
    #[sea_orm(iden = "secrets")]
    Table,
    Id,
    ProjectId,
    EnvironmentId,
    Name,
    Kind,
    Status,
    Payload,
    CreatedAt,
}
