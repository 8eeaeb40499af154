//! Activity descriptors handed to the activity emitter

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::model::{Project, User};

pub const USER_LEFT_PROJECT: &str = "user.left-project";
pub const USER_REMOVED_FROM_PROJECT: &str = "user.removed-from-project";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub name: &'static str,
    pub occurred_on: DateTime<Utc>,
    pub user_id: Uuid,
    pub project_id: Uuid,
}

impl Activity {
    fn new(name: &'static str, user: &User, project: &Project) -> Self {
        Self {
            name,
            occurred_on: Utc::now(),
            user_id: user.id,
            project_id: project.id,
        }
    }

    pub fn user_left_project(user: &User, project: &Project) -> Self {
        Self::new(USER_LEFT_PROJECT, user, project)
    }

    pub fn user_removed_from_project(user: &User, project: &Project) -> Self {
        Self::new(USER_REMOVED_FROM_PROJECT, user, project)
    }
}

/// Fire-and-forget sink for activities; delivery is the emitter's concern
pub trait ActivityEmitter: Send + Sync {
    fn enqueue(&self, activity: Activity);
}
