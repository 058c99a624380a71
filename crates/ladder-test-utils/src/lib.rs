//! Testing utilities for the ladder workspace
//!
//! Shared fixtures, gateways and assertions.

#![allow(missing_docs)]

use async_trait::async_trait;
use ladder_core::{
    MemoryGateway, Notification, PersistenceError, PersistenceGateway, Role, Session, SessionConfig,
    UserId,
};
use ladder_store::{Category, Profile, Store, TierId};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::broadcast;

pub const PARENT: &str = "parent-1";

pub fn tier(id: u8) -> TierId {
    TierId::new(id).expect("tier id in 1..=5")
}

pub fn parent() -> UserId {
    UserId::new(PARENT)
}

/// One profile `A` with tier 1 responsibilities `["Shower"]`
pub fn shower_store() -> Store {
    let mut store = Store::new("A", Profile::empty());
    store
        .add_item(tier(1), Category::Responsibilities, "Shower")
        .expect("fresh store accepts item");
    store
}

/// Document with two children and some mastery
pub fn two_kid_document() -> Value {
    json!({
        "currentKid": "Ana",
        "profiles": {
            "Ana": {
                "1": { "responsibilities": ["Make bed", "Feed pet"], "privileges": ["Tablet"] },
                "2": { "responsibilities": ["Dishes"] }
            },
            "Bo": {
                "1": { "responsibilities": ["Make bed"] }
            }
        },
        "mastered": {
            "Ana": ["Make bed"],
            "Bo": []
        }
    })
}

pub fn memory_gateway() -> Arc<MemoryGateway> {
    Arc::new(MemoryGateway::new())
}

pub fn seeded_gateway(document: Value) -> Arc<MemoryGateway> {
    Arc::new(MemoryGateway::new().with_document(parent(), document))
}

pub fn session_with(gateway: &Arc<MemoryGateway>, config: SessionConfig) -> Session {
    let shared: Arc<dyn PersistenceGateway> = gateway.clone();
    Session::new(config, shared)
}

/// Session logged in as [`PARENT`] over `gateway`
pub async fn ready_session(gateway: &Arc<MemoryGateway>) -> Session {
    let mut session = session_with(gateway, SessionConfig::default());
    session
        .login(parent(), Role::Parent)
        .await
        .expect("memory gateway login");
    session
}

/// Ready session whose store is [`shower_store`]
pub async fn shower_session() -> (Session, Arc<MemoryGateway>) {
    let document = shower_store().to_document().expect("store serializes");
    let gateway = seeded_gateway(document);
    let session = ready_session(&gateway).await;
    (session, gateway)
}

/// Stored document of [`PARENT`] decoded as a store
pub fn saved_store(gateway: &MemoryGateway) -> Option<Store> {
    gateway
        .document(&parent())
        .map(|doc| Store::from_document(doc).expect("saved document is valid"))
}

/// Notifications already queued on `rx`
pub fn drain(rx: &mut broadcast::Receiver<Notification>) -> Vec<Notification> {
    let mut notices = Vec::new();
    while let Ok(notice) = rx.try_recv() {
        notices.push(notice);
    }
    notices
}

/// Gateway whose loads never complete
#[derive(Debug, Default)]
pub struct StallingGateway;

#[async_trait]
impl PersistenceGateway for StallingGateway {
    async fn load(&self, _user: &UserId) -> Result<Option<Value>, PersistenceError> {
        std::future::pending().await
    }

    async fn save(&self, _user: &UserId, _document: &Value) -> Result<(), PersistenceError> {
        Ok(())
    }
}
