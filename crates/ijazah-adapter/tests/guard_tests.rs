/*
[INPUT]:  Route table, session snapshots and a restorable session
[OUTPUT]: Test results for navigation decisions
[POS]:    Integration tests - route guard
[UPDATE]: When routes or redirect rules change
*/

mod common;

use std::sync::Arc;

use common::{ADDRESS, FakeBackend, store_with};
use ijazah_adapter::auth::ManualClock;
use ijazah_adapter::router::decide;
use ijazah_adapter::{
    AuthPhase, AuthSnapshot, MemorySessionStorage, Navigation, Role, RouteGuard, RouteTable, User,
};
use rstest::rstest;

fn snapshot(role: Option<Role>) -> AuthSnapshot {
    match role {
        Some(role) => AuthSnapshot {
            phase: AuthPhase::Authenticated,
            user: Some(User {
                address: ADDRESS.to_string(),
                role,
                is_authenticated: true,
            }),
        },
        None => AuthSnapshot::anonymous(),
    }
}

#[rstest]
#[case("/admin/issue", Some(Role::Student), Navigation::RedirectToHome)]
#[case("/admin/issue", None, Navigation::RedirectToLogin)]
#[case("/admin/issue", Some(Role::Admin), Navigation::Proceed)]
#[case("/admin/revoke", Some(Role::Issuer), Navigation::RedirectToHome)]
#[case("/admin/revoke", None, Navigation::RedirectToLogin)]
#[case("/verify", None, Navigation::Proceed)]
#[case("/explorer", Some(Role::Verifier), Navigation::Proceed)]
#[case("/certificate/CERT_1", None, Navigation::Proceed)]
#[case("/login", None, Navigation::Proceed)]
fn test_decide(#[case] path: &str, #[case] role: Option<Role>, #[case] expected: Navigation) {
    let table = RouteTable::default();
    let route = table.resolve(path).unwrap().route;
    assert_eq!(decide(route, &snapshot(role)), expected);
}

#[test]
fn test_mid_login_phases_are_not_authenticated() {
    let table = RouteTable::default();
    let route = table.by_name("admin-issue").unwrap();

    for phase in [AuthPhase::ChallengeIssued, AuthPhase::Verifying] {
        let snapshot = AuthSnapshot { phase, user: None };
        assert_eq!(decide(route, &snapshot), Navigation::RedirectToLogin);
    }
}

#[test]
fn test_redirect_targets() {
    assert_eq!(Navigation::RedirectToLogin.target_path(), Some("/login"));
    assert_eq!(Navigation::RedirectToHome.target_path(), Some("/"));
    assert_eq!(Navigation::Proceed.target_path(), None);
}

async fn persisted_admin_session() -> (Arc<FakeBackend>, Arc<MemorySessionStorage>, Arc<ManualClock>) {
    let backend = Arc::new(FakeBackend::confirming(Role::Admin, "T1"));
    let storage = Arc::new(MemorySessionStorage::new());
    let clock = Arc::new(ManualClock::default());

    let store = store_with(backend.clone(), storage.clone(), clock.clone());
    store.request_challenge(ADDRESS).await.unwrap();
    store.login(ADDRESS, "0xsig").await.unwrap();

    (backend, storage, clock)
}

#[tokio::test]
async fn test_guard_fails_closed_before_init() {
    let (backend, storage, clock) = persisted_admin_session().await;
    let guard = RouteGuard::new(store_with(backend.clone(), storage, clock));

    assert_eq!(guard.decide_now("/admin/issue"), Navigation::RedirectToLogin);
    assert_eq!(backend.validate_calls(), 0);
}

#[tokio::test]
async fn test_guard_awaits_init_once() {
    let (backend, storage, clock) = persisted_admin_session().await;
    let guard = RouteGuard::new(store_with(backend.clone(), storage, clock));

    assert_eq!(guard.before_each("/admin/issue").await, Navigation::Proceed);
    assert_eq!(guard.before_each("/admin/revoke").await, Navigation::Proceed);
    assert_eq!(guard.decide_now("/admin/issue"), Navigation::Proceed);
    assert_eq!(backend.validate_calls(), 1);
}

#[tokio::test]
async fn test_guard_after_rejected_token() {
    let (backend, storage, clock) = persisted_admin_session().await;
    backend
        .token_valid
        .store(false, std::sync::atomic::Ordering::SeqCst);
    let guard = RouteGuard::new(store_with(backend, storage, clock));

    assert_eq!(guard.before_each("/admin/issue").await, Navigation::RedirectToLogin);
}

#[tokio::test]
async fn test_unknown_path_goes_home() {
    let guard = RouteGuard::new(store_with(
        Arc::new(FakeBackend::new()),
        Arc::new(MemorySessionStorage::new()),
        Arc::new(ManualClock::default()),
    ));
    assert_eq!(guard.before_each("/does/not/exist").await, Navigation::RedirectToHome);
    assert_eq!(guard.table().routes().len(), 7);
}
