//! Organization and project membership roles
//!
//! Both scopes share the ordering `None < Member < Owner`. The absence of a
//! membership record is modelled as `Option::None`, so `Option<ProjectRole>`
//! orders exactly like the role ladder and `max` yields the higher standing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role held through an organization membership
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrganizationRole {
    /// Regular organization member
    Member,

    /// Organization owner, implicitly owner of every project in the organization
    Owner,
}

/// Role held through a project membership
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectRole {
    /// Regular project member
    Member,

    /// Project owner with full access
    Owner,
}

impl OrganizationRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrganizationRole::Member => "member",
            OrganizationRole::Owner => "owner",
        }
    }
}

impl ProjectRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectRole::Member => "member",
            ProjectRole::Owner => "owner",
        }
    }
}

/// An organization role carries over to every project of that organization.
impl From<OrganizationRole> for ProjectRole {
    fn from(role: OrganizationRole) -> Self {
        match role {
            OrganizationRole::Member => ProjectRole::Member,
            OrganizationRole::Owner => ProjectRole::Owner,
        }
    }
}

/// Effective project role: the higher of the project role and the organization
/// role lifted into project scope.
pub fn effective_role(
    project_role: Option<ProjectRole>,
    organization_role: Option<OrganizationRole>,
) -> Option<ProjectRole> {
    project_role.max(organization_role.map(ProjectRole::from))
}

/// Human-readable name for an optional role, `"none"` when absent
pub fn role_name(role: Option<ProjectRole>) -> &'static str {
    role.map(|r| r.as_str()).unwrap_or("none")
}

/// Organization counterpart of [`role_name`]
pub fn organization_role_name(role: Option<OrganizationRole>) -> &'static str {
    role.map(|r| r.as_str()).unwrap_or("none")
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct ParseRoleError(pub String);

impl FromStr for ProjectRole {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(ProjectRole::Member),
            "owner" => Ok(ProjectRole::Owner),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

impl FromStr for OrganizationRole {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(OrganizationRole::Member),
            "owner" => Ok(OrganizationRole::Owner),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

impl fmt::Display for ProjectRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for OrganizationRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_ordering() {
        assert!(ProjectRole::Owner > ProjectRole::Member);
        assert!(Some(ProjectRole::Member) > None);
        assert!(OrganizationRole::Owner > OrganizationRole::Member);
    }

    #[test]
    fn test_effective_role_matrix() {
        use OrganizationRole as O;
        use ProjectRole as P;

        let cases = [
            (None, None, None),
            (Some(P::Member), None, Some(P::Member)),
            (Some(P::Owner), None, Some(P::Owner)),
            (None, Some(O::Member), Some(P::Member)),
            (None, Some(O::Owner), Some(P::Owner)),
            (Some(P::Member), Some(O::Owner), Some(P::Owner)),
            (Some(P::Owner), Some(O::Member), Some(P::Owner)),
            (Some(P::Member), Some(O::Member), Some(P::Member)),
        ];

        for (project, organization, expected) in cases {
            assert_eq!(
                effective_role(project, organization),
                expected,
                "project={:?} organization={:?}",
                project,
                organization
            );
        }
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("owner".parse::<ProjectRole>().unwrap(), ProjectRole::Owner);
        assert_eq!(
            "member".parse::<OrganizationRole>().unwrap(),
            OrganizationRole::Member
        );
        assert!("manager".parse::<ProjectRole>().is_err());
        assert_eq!(ProjectRole::Owner.to_string(), "owner");
        assert_eq!(role_name(None), "none");
    }

    #[test]
    fn test_organization_role_name() {
        assert_eq!(organization_role_name(None), "none");
        assert_eq!(organization_role_name(Some(OrganizationRole::Owner)), "owner");
        assert_eq!(organization_role_name(Some(OrganizationRole::Member)), "member");
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&ProjectRole::Owner).unwrap();
        assert_eq!(json, "\"owner\"");
    }
}
