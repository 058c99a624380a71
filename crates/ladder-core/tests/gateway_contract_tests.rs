//! How the session drives the persistence gateway

use async_trait::async_trait;
use ladder_core::{PersistenceError, PersistenceGateway, Role, Session, SessionConfig, UserId};
use ladder_store::Store;
use mockall::{mock, Sequence};
use serde_json::Value;
use std::sync::Arc;

mock! {
    pub Gateway {}

    #[async_trait]
    impl PersistenceGateway for Gateway {
        async fn load(&self, user: &UserId) -> Result<Option<Value>, PersistenceError>;
        async fn save(&self, user: &UserId, document: &Value) -> Result<(), PersistenceError>;
    }
}

#[tokio::test]
async fn new_account_loads_once_then_saves_default() {
    let mut gateway = MockGateway::new();
    let mut seq = Sequence::new();
    gateway
        .expect_load()
        .withf(|user| user.as_str() == "parent-1")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(None));
    gateway
        .expect_save()
        .withf(|user, document| {
            user.as_str() == "parent-1" && document["currentKid"] == "Kid 1"
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));

    let mut session = Session::new(SessionConfig::default(), Arc::new(gateway));
    session.login(UserId::new("parent-1"), Role::Parent).await.unwrap();
    session.logout().await.unwrap();
}

#[tokio::test]
async fn unchanged_mutations_never_reach_the_gateway() {
    let document = Store::default().to_document().unwrap();
    let mut gateway = MockGateway::new();
    gateway
        .expect_load()
        .times(1)
        .returning(move |_| Ok(Some(document.clone())));
    gateway.expect_save().times(0);

    let mut session = Session::new(SessionConfig::default(), Arc::new(gateway));
    session.login(UserId::new("p"), Role::Parent).await.unwrap();
    session.select_child("Kid 1").unwrap();
    session.toggle_mastery("Not on the ladder", true).unwrap();
    session.undo().unwrap();
    session.logout().await.unwrap();
}

#[tokio::test]
async fn transport_failure_on_load_surfaces() {
    let mut gateway = MockGateway::new();
    gateway
        .expect_load()
        .returning(|_| Err(PersistenceError::unavailable("offline")));
    gateway.expect_save().times(0);

    let mut session = Session::new(SessionConfig::default(), Arc::new(gateway));
    let err = session.login(UserId::new("p"), Role::Parent).await.unwrap_err();
    assert!(err.is_retryable());
    assert!(err.to_string().contains("offline"));
}
