//! Essence Services Layer
//!
//! Business logic for archived-essence events: parsing the PREMIS envelope,
//! resolving fragment metadata in MediaHaven, publishing notifications and
//! cleaning up S3. The API crate only parses requests and hands batches to
//! the [`EventProcessor`].

pub mod events;
pub mod mediahaven;
pub mod notification;
pub mod processor;
pub mod queue;
pub mod resolver;

pub use events::{parse_events, ParseError};
pub use mediahaven::{LookupOutcome, MediaObject, MetadataLookup};
#[cfg(feature = "mediahaven")]
pub use mediahaven::{MediahavenClient, MediahavenError};
pub use notification::{build_notification, validate_notification, NotificationFields};
pub use processor::{error_routing_key, EventProcessor, ProcessOutcome, RoutingConfig};
#[cfg(feature = "rabbitmq")]
pub use queue::RabbitPublisher;
pub use queue::{MessagePublisher, PublishError, QueueService};
pub use resolver::MetadataResolver;

pub use essence_storage::{create_storage, ObjectStorage, StorageError, StorageResult};
