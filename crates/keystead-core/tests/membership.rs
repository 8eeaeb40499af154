//! Membership transitions against an in-memory store

mod common;

use common::MemoryStore;
use keystead_core::activity::{USER_LEFT_PROJECT, USER_REMOVED_FROM_PROJECT};
use keystead_core::{
    Capability, Error, MemberOracle, MembershipService, OrganizationRole, ProjectRole,
};
use uuid::Uuid;

fn service(store: &MemoryStore) -> MembershipService<'_> {
    MembershipService::new(store, store, store)
}

#[tokio::test]
async fn test_organization_owner_owns_project_without_record() {
    let store = MemoryStore::new();
    let project = store.add_project("infra");
    let alice = store.add_user("Alice");
    store.join_organization(&alice, &project, OrganizationRole::Owner);

    let member = service(&store).resolve(alice.id, project.id).await.unwrap();

    assert_eq!(member.effective_role(), Some(ProjectRole::Owner));
    assert_eq!(member.project_role, None);
    assert!(!member.is_explicit());
}

#[tokio::test]
async fn test_owner_promotes_member() {
    let store = MemoryStore::new();
    let project = store.add_project("infra");
    let owner = store.add_user("Olivia");
    let bob = store.add_user("Bob");
    store.join_project(&owner, &project, ProjectRole::Owner);
    let bob_membership = store.join_project(&bob, &project, ProjectRole::Member);

    let promoted = service(&store)
        .promote(project.id, owner.id, bob.id)
        .await
        .unwrap();

    assert_eq!(promoted.project_role, Some(ProjectRole::Owner));
    assert_eq!(promoted.membership_id, Some(bob_membership));

    let records = store.project_memberships();
    assert_eq!(records.len(), 2);
    let record = records.iter().find(|m| m.id == bob_membership).unwrap();
    assert_eq!(record.role, ProjectRole::Owner);
}

#[tokio::test]
async fn test_promoting_organization_owner_creates_record() {
    let store = MemoryStore::new();
    let project = store.add_project("infra");
    let owner = store.add_user("Olivia");
    let carol = store.add_user("Carol");
    store.join_project(&owner, &project, ProjectRole::Owner);
    store.join_organization(&carol, &project, OrganizationRole::Owner);

    let promoted = service(&store)
        .promote(project.id, owner.id, carol.id)
        .await
        .unwrap();

    let id = promoted.membership_id.expect("record was created");
    let records = store.project_memberships();
    let record = records.iter().find(|m| m.id == id).unwrap();
    assert_eq!(record.user_id, carol.id);
    assert_eq!(record.role, ProjectRole::Owner);
}

#[tokio::test]
async fn test_member_cannot_promote() {
    let store = MemoryStore::new();
    let project = store.add_project("infra");
    let bob = store.add_user("Bob");
    let dave = store.add_user("Dave");
    store.join_project(&bob, &project, ProjectRole::Member);
    store.join_project(&dave, &project, ProjectRole::Member);

    let err = service(&store)
        .promote(project.id, bob.id, dave.id)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Forbidden(_)));
    assert!(store
        .project_memberships()
        .iter()
        .all(|m| m.role == ProjectRole::Member));
}

#[tokio::test]
async fn test_promoting_owner_twice_writes_nothing_new() {
    let store = MemoryStore::new();
    let project = store.add_project("infra");
    let owner = store.add_user("Olivia");
    let bob = store.add_user("Bob");
    store.join_project(&owner, &project, ProjectRole::Owner);
    store.join_project(&bob, &project, ProjectRole::Member);

    let svc = service(&store);
    let first = svc.promote(project.id, owner.id, bob.id).await.unwrap();
    let second = svc.promote(project.id, owner.id, bob.id).await.unwrap();

    assert_eq!(first.project_role, second.project_role);
    assert_eq!(first.membership_id, second.membership_id);
    assert_eq!(store.project_memberships().len(), 2);
}

#[tokio::test]
async fn test_member_leaves_project() {
    let store = MemoryStore::new();
    let project = store.add_project("infra");
    let owner = store.add_user("Olivia");
    let bob = store.add_user("Bob");
    store.join_project(&owner, &project, ProjectRole::Owner);
    store.join_project(&bob, &project, ProjectRole::Member);

    let activity = service(&store)
        .remove(project.id, bob.id, bob.id)
        .await
        .unwrap();

    assert_eq!(activity.name, USER_LEFT_PROJECT);
    assert_eq!(activity.user_id, bob.id);
    assert_eq!(activity.project_id, project.id);
    assert!(store.project_memberships().iter().all(|m| m.user_id != bob.id));
}

#[tokio::test]
async fn test_owner_removes_member() {
    let store = MemoryStore::new();
    let project = store.add_project("infra");
    let owner = store.add_user("Olivia");
    let bob = store.add_user("Bob");
    store.join_project(&owner, &project, ProjectRole::Owner);
    store.join_project(&bob, &project, ProjectRole::Member);

    let activity = service(&store)
        .remove(project.id, owner.id, bob.id)
        .await
        .unwrap();

    assert_eq!(activity.name, USER_REMOVED_FROM_PROJECT);
    assert_eq!(activity.user_id, bob.id);
    assert_eq!(store.project_memberships().len(), 1);
}

#[tokio::test]
async fn test_member_cannot_remove_another_member() {
    let store = MemoryStore::new();
    let project = store.add_project("infra");
    let bob = store.add_user("Bob");
    let dave = store.add_user("Dave");
    store.join_project(&bob, &project, ProjectRole::Member);
    store.join_project(&dave, &project, ProjectRole::Member);

    let err = service(&store)
        .remove(project.id, bob.id, dave.id)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Forbidden(_)));
    assert_eq!(store.project_memberships().len(), 2);
}

#[tokio::test]
async fn test_sole_owner_cannot_leave_until_another_is_promoted() {
    let store = MemoryStore::new();
    let project = store.add_project("infra");
    let owner = store.add_user("Olivia");
    let bob = store.add_user("Bob");
    let dave = store.add_user("Dave");
    store.join_project(&owner, &project, ProjectRole::Owner);
    store.join_project(&bob, &project, ProjectRole::Member);
    store.join_project(&dave, &project, ProjectRole::Member);

    let svc = service(&store);

    let err = svc.remove(project.id, owner.id, owner.id).await.unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
    assert_eq!(store.project_memberships().len(), 3);

    svc.promote(project.id, owner.id, bob.id).await.unwrap();

    let activity = svc.remove(project.id, owner.id, owner.id).await.unwrap();
    assert_eq!(activity.name, USER_LEFT_PROJECT);
    assert!(store
        .project_memberships()
        .iter()
        .all(|m| m.user_id != owner.id));
}

#[tokio::test]
async fn test_sole_owner_removal_is_invalid_state_for_any_actor() {
    let store = MemoryStore::new();
    let project = store.add_project("infra");
    let owner = store.add_user("Olivia");
    let bob = store.add_user("Bob");
    store.join_project(&owner, &project, ProjectRole::Owner);
    store.join_project(&bob, &project, ProjectRole::Member);

    let err = service(&store)
        .remove(project.id, bob.id, owner.id)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidState(_)));
}

#[tokio::test]
async fn test_organization_owner_counts_as_another_owner() {
    let store = MemoryStore::new();
    let project = store.add_project("infra");
    let owner = store.add_user("Olivia");
    let admin = store.add_user("Carol");
    store.join_project(&owner, &project, ProjectRole::Owner);
    store.join_organization(&admin, &project, OrganizationRole::Owner);

    let activity = service(&store)
        .remove(project.id, admin.id, owner.id)
        .await
        .unwrap();

    assert_eq!(activity.name, USER_REMOVED_FROM_PROJECT);
    assert!(store.project_memberships().is_empty());
}

#[tokio::test]
async fn test_organization_access_cannot_be_removed() {
    let store = MemoryStore::new();
    let project = store.add_project("infra");
    let owner = store.add_user("Olivia");
    let erin = store.add_user("Erin");
    store.join_project(&owner, &project, ProjectRole::Owner);
    store.join_organization(&erin, &project, OrganizationRole::Member);

    let err = service(&store)
        .remove(project.id, owner.id, erin.id)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidState(_)));
}

#[tokio::test]
async fn test_unknown_user_or_project_is_not_found() {
    let store = MemoryStore::new();
    let project = store.add_project("infra");
    let owner = store.add_user("Olivia");
    store.join_project(&owner, &project, ProjectRole::Owner);

    let svc = service(&store);

    let err = svc.resolve(Uuid::new_v4(), project.id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound { entity: "user", .. }));

    let err = svc.resolve(owner.id, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, Error::NotFound { entity: "project", .. }));

    let err = svc
        .promote(project.id, owner.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(err.kind().status_code(), 404);
}

#[tokio::test]
async fn test_list_members_merges_and_filters() {
    let store = MemoryStore::new();
    let project = store.add_project("infra");
    let owner = store.add_user("Olivia");
    let bob = store.add_user("Bob");
    let carol = store.add_user("Carol");
    let dave = store.add_user("Dave");
    store.join_project(&owner, &project, ProjectRole::Owner);
    store.join_project(&bob, &project, ProjectRole::Member);
    store.join_organization(&bob, &project, OrganizationRole::Member);
    store.join_organization(&carol, &project, OrganizationRole::Owner);
    store.join_project(&dave, &project, ProjectRole::Member);

    let svc = service(&store);
    let reader = svc.resolve(bob.id, project.id).await.unwrap();

    let everyone = svc
        .list_members(project.id, &MemberOracle::for_member(&reader))
        .await
        .unwrap();
    let names: Vec<_> = everyone.iter().map(|m| m.user.name.as_str()).collect();
    assert_eq!(names, vec!["Bob", "Carol", "Dave", "Olivia"]);

    let carol_member = &everyone[1];
    assert_eq!(carol_member.project_role, None);
    assert_eq!(carol_member.effective_role(), Some(ProjectRole::Owner));

    let oracle = MemberOracle::for_member(&reader).with_override(dave.id, Capability::Read, false);
    let visible = svc.list_members(project.id, &oracle).await.unwrap();
    let names: Vec<_> = visible.iter().map(|m| m.user.name.as_str()).collect();
    assert_eq!(names, vec!["Bob", "Carol", "Olivia"]);
}

#[tokio::test]
async fn test_member_cannot_remove_organization_member() {
    let store = MemoryStore::new();
    let project = store.add_project("infra");
    let owner = store.add_user("Olivia");
    let bob = store.add_user("Bob");
    let erin = store.add_user("Erin");
    store.join_project(&owner, &project, ProjectRole::Owner);
    store.join_project(&bob, &project, ProjectRole::Member);
    store.join_organization(&erin, &project, OrganizationRole::Member);

    let err = service(&store)
        .remove(project.id, bob.id, erin.id)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Forbidden(_)));
}

#[tokio::test]
async fn test_organization_owner_drops_redundant_project_ownership() {
    let store = MemoryStore::new();
    let project = store.add_project("infra");
    let carol = store.add_user("Carol");
    let bob = store.add_user("Bob");
    store.join_project(&carol, &project, ProjectRole::Owner);
    store.join_organization(&carol, &project, OrganizationRole::Owner);
    store.join_project(&bob, &project, ProjectRole::Member);

    let svc = service(&store);
    let activity = svc.remove(project.id, carol.id, carol.id).await.unwrap();
    assert_eq!(activity.name, USER_LEFT_PROJECT);
    assert!(store.project_memberships().iter().all(|m| m.user_id != carol.id));

    // Still an owner through the organization
    let carol_member = svc.resolve(carol.id, project.id).await.unwrap();
    assert!(carol_member.is_owner());
    assert!(!carol_member.is_explicit());
}

#[tokio::test]
async fn test_owner_adds_member() {
    let store = MemoryStore::new();
    let project = store.add_project("infra");
    let owner = store.add_user("Olivia");
    let frank = store.add_user("Frank");
    store.join_project(&owner, &project, ProjectRole::Owner);

    let svc = service(&store);
    let actor = svc.resolve(owner.id, project.id).await.unwrap();

    let added = svc
        .add(
            project.id,
            owner.id,
            frank.id,
            ProjectRole::Member,
            &MemberOracle::for_member(&actor),
        )
        .await
        .unwrap();

    assert_eq!(added.project_role, Some(ProjectRole::Member));
    let id = added.membership_id.expect("record was created");
    let records = store.project_memberships();
    let record = records.iter().find(|m| m.id == id).unwrap();
    assert_eq!(record.user_id, frank.id);
    assert_eq!(record.role, ProjectRole::Member);
}

#[tokio::test]
async fn test_member_cannot_add_members() {
    let store = MemoryStore::new();
    let project = store.add_project("infra");
    let bob = store.add_user("Bob");
    let frank = store.add_user("Frank");
    store.join_project(&bob, &project, ProjectRole::Member);

    let svc = service(&store);
    let actor = svc.resolve(bob.id, project.id).await.unwrap();

    let err = svc
        .add(
            project.id,
            bob.id,
            frank.id,
            ProjectRole::Member,
            &MemberOracle::for_member(&actor),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Forbidden(_)));
    assert_eq!(store.project_memberships().len(), 1);
}

#[tokio::test]
async fn test_adding_existing_member_is_invalid_state() {
    let store = MemoryStore::new();
    let project = store.add_project("infra");
    let owner = store.add_user("Olivia");
    let bob = store.add_user("Bob");
    store.join_project(&owner, &project, ProjectRole::Owner);
    store.join_project(&bob, &project, ProjectRole::Member);

    let svc = service(&store);
    let actor = svc.resolve(owner.id, project.id).await.unwrap();

    let err = svc
        .add(
            project.id,
            owner.id,
            bob.id,
            ProjectRole::Owner,
            &MemberOracle::for_member(&actor),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidState(_)));
    assert_eq!(store.project_memberships().len(), 2);
}
