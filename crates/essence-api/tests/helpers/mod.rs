//! Test helpers: build the router with in-memory MediaHaven, broker and S3.
//!
//! Run from workspace root: `cargo test -p essence-api`.

#![allow(dead_code)]

pub mod fixtures;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum_test::TestServer;
use essence_api::{setup_routes, AppState, EventJobQueue};
use essence_core::models::ArchivedEventTypes;
use essence_infra::LinearBackoff;
use essence_services::mediahaven::{Administrative, Dynamic, Technical};
use essence_services::{
    EventProcessor, LookupOutcome, MediaObject, MessagePublisher, MetadataLookup,
    MetadataResolver, ObjectStorage, PublishError, QueueService, RoutingConfig, StorageResult,
};

pub const EXCHANGE: &str = "essence-exchange";
pub const ROUTING_KEY: &str = "essence-queue";
pub const ERROR_EXCHANGE: &str = "essence-nok";
pub const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Default)]
pub struct FakeMediahaven {
    objects: Mutex<HashMap<String, MediaObject>>,
}

impl FakeMediahaven {
    pub fn insert(&self, fragment_id: &str, object: MediaObject) {
        self.objects
            .lock()
            .unwrap()
            .insert(fragment_id.to_string(), object);
    }
}

#[async_trait]
impl MetadataLookup for FakeMediahaven {
    async fn get_fragment(&self, fragment_id: &str) -> LookupOutcome {
        match self.objects.lock().unwrap().get(fragment_id) {
            Some(object) => LookupOutcome::Found(object.clone()),
            None => LookupOutcome::NotFound {
                detail: "404 - fragment not found".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub body: String,
    pub exchange: String,
    pub routing_key: String,
}

#[derive(Default)]
pub struct FakeBroker {
    messages: Mutex<Vec<Message>>,
    unavailable: Mutex<bool>,
}

impl FakeBroker {
    pub fn messages(&self) -> Vec<Message> {
        self.messages.lock().unwrap().clone()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap() = unavailable;
    }
}

#[async_trait]
impl MessagePublisher for FakeBroker {
    async fn publish(
        &self,
        body: &[u8],
        exchange: &str,
        routing_key: &str,
    ) -> Result<(), PublishError> {
        if *self.unavailable.lock().unwrap() {
            return Err(PublishError::Connection("connection refused".to_string()));
        }
        self.messages.lock().unwrap().push(Message {
            body: String::from_utf8_lossy(body).into_owned(),
            exchange: exchange.to_string(),
            routing_key: routing_key.to_string(),
        });
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeS3 {
    deleted: Mutex<Vec<(String, String)>>,
}

impl FakeS3 {
    pub fn deleted(&self) -> Vec<(String, String)> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStorage for FakeS3 {
    async fn delete(&self, bucket: &str, key: &str) -> StorageResult<()> {
        self.deleted
            .lock()
            .unwrap()
            .push((bucket.to_string(), key.to_string()));
        Ok(())
    }
}

/// MediaHaven object with every field a notification needs.
pub fn media_object(pid: &str, org: &str, bucket: &str, key: &str) -> MediaObject {
    MediaObject {
        administrative: Some(Administrative {
            external_id: Some(pid.to_string()),
            organisation_name: Some(org.to_string()),
        }),
        technical: Some(Technical {
            md5: Some("abc123".to_string()),
        }),
        dynamic: Some(Dynamic {
            s3_bucket: Some(bucket.to_string()),
            s3_object_key: Some(key.to_string()),
        }),
    }
}

/// Test application: server plus handles on the fakes behind it.
pub struct TestApp {
    pub server: TestServer,
    pub job_queue: EventJobQueue,
    pub mediahaven: Arc<FakeMediahaven>,
    pub broker: Arc<FakeBroker>,
    pub s3: Arc<FakeS3>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Wait until every accepted batch has been processed.
    pub async fn settle(&self) {
        self.job_queue.drain().await;
    }
}

pub fn setup_test_app() -> TestApp {
    let mediahaven = Arc::new(FakeMediahaven::default());
    let broker = Arc::new(FakeBroker::default());
    let s3 = Arc::new(FakeS3::default());

    let processor = EventProcessor::new(
        MetadataResolver::new(mediahaven.clone()),
        QueueService::new(broker.clone(), LinearBackoff::new(Duration::ZERO, 2)),
        s3.clone(),
        RoutingConfig {
            exchange: EXCHANGE.to_string(),
            routing_key: ROUTING_KEY.to_string(),
            error_exchange: ERROR_EXCHANGE.to_string(),
        },
    );
    let job_queue = EventJobQueue::new(Arc::new(processor), 4);
    let state = Arc::new(AppState::new(
        ArchivedEventTypes::default(),
        job_queue.clone(),
    ));

    let server = TestServer::new(setup_routes(state, MAX_BODY_BYTES))
        .expect("Failed to create test server");

    TestApp {
        server,
        job_queue,
        mediahaven,
        broker,
        s3,
    }
}
