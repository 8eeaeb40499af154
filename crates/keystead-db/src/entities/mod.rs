//! Database entities

pub mod organization;
pub mod organization_membership;
pub mod project;
pub mod project_membership;
pub mod secret;
pub mod user;

pub use organization::Entity as Organization;
pub use organization_membership::Entity as OrganizationMembership;
pub use project::Entity as Project;
pub use project_membership::Entity as ProjectMembership;
pub use secret::Entity as Secret;
pub use user::Entity as User;

pub mod prelude {
    pub use super::organization::Entity as Organization;
    pub use super::organization_membership::Entity as OrganizationMembership;
    pub use super::project::Entity as Project;
    pub use super::project_membership::Entity as ProjectMembership;
    pub use super::secret::Entity as Secret;
    pub use super::user::Entity as User;
}
