//! Per-item authorization of collections
//!
//! Listings fetch every candidate under a parent and then ask the oracle about
//! each item on its own. Access to the parent never implies access to its
//! children.

use tracing::warn;

use crate::capability::{Capability, CapabilityOracle, Subject};

/// Ask the oracle one question; a failed lookup is a denial.
pub fn allows<S: Subject + ?Sized>(
    oracle: &dyn CapabilityOracle,
    capability: Capability,
    subject: &S,
) -> bool {
    let subject = subject.subject_ref();
    match oracle.can(capability, &subject) {
        Ok(allowed) => allowed,
        Err(e) => {
            warn!(
                "Capability {} on {} {} could not be evaluated, denying: {}",
                capability.name_for(subject.name),
                subject.name,
                subject.id,
                e
            );
            false
        }
    }
}

/// Keep the candidates the oracle lets the reader see, in their original order
pub fn retain_readable<T: Subject>(candidates: Vec<T>, oracle: &dyn CapabilityOracle) -> Vec<T> {
    candidates
        .into_iter()
        .filter(|candidate| allows(oracle, Capability::Read, candidate))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::MockCapabilityOracle;
    use crate::error::OracleError;
    use uuid::Uuid;

    #[derive(Debug, Clone, PartialEq)]
    struct Job {
        id: Uuid,
        name: &'static str,
    }

    impl Subject for Job {
        fn authorization_name(&self) -> &'static str {
            "job"
        }

        fn subject_id(&self) -> Uuid {
            self.id
        }
    }

    fn jobs(names: &[&'static str]) -> Vec<Job> {
        names
            .iter()
            .map(|name| Job {
                id: Uuid::new_v4(),
                name,
            })
            .collect()
    }

    #[test]
    fn test_denied_items_are_dropped_in_order() {
        let candidates = jobs(&["build", "test", "deploy", "lint", "release"]);
        let denied = [candidates[1].id, candidates[3].id];

        let mut oracle = MockCapabilityOracle::new();
        oracle
            .expect_can()
            .times(5)
            .returning(move |capability, subject| {
                assert_eq!(capability, Capability::Read);
                Ok(!denied.contains(&subject.id))
            });

        let visible = retain_readable(candidates, &oracle);
        let names: Vec<_> = visible.iter().map(|j| j.name).collect();
        assert_eq!(names, vec!["build", "deploy", "release"]);
    }

    #[test]
    fn test_lookup_failure_denies_only_that_item() {
        let candidates = jobs(&["build", "test", "deploy"]);
        let broken = candidates[1].id;

        let mut oracle = MockCapabilityOracle::new();
        oracle.expect_can().returning(move |_, subject| {
            if subject.id == broken {
                Err(OracleError("acl row unreadable".to_string()))
            } else {
                Ok(true)
            }
        });

        let visible = retain_readable(candidates, &oracle);
        let names: Vec<_> = visible.iter().map(|j| j.name).collect();
        assert_eq!(names, vec!["build", "deploy"]);
    }

    #[test]
    fn test_empty_collection() {
        let mut oracle = MockCapabilityOracle::new();
        oracle.expect_can().never();

        assert!(retain_readable(Vec::<Job>::new(), &oracle).is_empty());
    }
}
