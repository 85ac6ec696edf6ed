//! `essenceArchivedEvent` document construction.

use std::io::Cursor;

use essence_core::constants::VRT_NAMESPACE;
use essence_core::models::FragmentMetadata;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

const ROOT_ELEMENT: &str = "essenceArchivedEvent";

/// Child elements of the notification, in the order the schema requires.
pub const NOTIFICATION_ELEMENTS: [&str; 5] = ["timestamp", "file", "pid", "s3bucket", "md5sum"];

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Failed to write notification: {0}")]
    Write(String),

    #[error("Invalid notification: {0}")]
    Invalid(String),
}

/// Field values carried by a notification document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationFields {
    pub timestamp: String,
    pub file: String,
    pub pid: String,
    pub s3bucket: String,
    pub md5sum: String,
}

/// Build the `essenceArchivedEvent` document for an archived fragment.
///
/// `timestamp` is the event's `eventDateTime`, copied verbatim.
pub fn build_notification(
    metadata: &FragmentMetadata,
    timestamp: &str,
) -> Result<String, NotificationError> {
    let write_err = |e: std::io::Error| NotificationError::Write(e.to_string());

    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(write_err)?;

    let mut root = BytesStart::new(ROOT_ELEMENT);
    root.push_attribute(("xmlns", VRT_NAMESPACE));
    writer.write_event(Event::Start(root)).map_err(write_err)?;

    let values = [
        timestamp,
        metadata.s3_object_key(),
        metadata.pid(),
        metadata.s3_bucket(),
        metadata.md5(),
    ];
    for (name, value) in NOTIFICATION_ELEMENTS.iter().zip(values) {
        writer
            .create_element(*name)
            .write_text_content(BytesText::new(value))
            .map_err(write_err)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new(ROOT_ELEMENT)))
        .map_err(write_err)?;

    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| NotificationError::Write(e.to_string()))
}

/// Check a document against the notification structure and return its values.
///
/// Requires the namespaced root and exactly the five children, in order.
pub fn validate_notification(xml: &str) -> Result<NotificationFields, NotificationError> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|e| NotificationError::Invalid(e.to_string()))?;
    let root = doc.root_element();
    if !root.has_tag_name((VRT_NAMESPACE, ROOT_ELEMENT)) {
        return Err(NotificationError::Invalid(format!(
            "unexpected root element '{}'",
            root.tag_name().name()
        )));
    }

    let children: Vec<_> = root.children().filter(|n| n.is_element()).collect();
    let names: Vec<&str> = children.iter().map(|n| n.tag_name().name()).collect();
    if names != NOTIFICATION_ELEMENTS {
        return Err(NotificationError::Invalid(format!(
            "expected elements {:?}, found {:?}",
            NOTIFICATION_ELEMENTS, names
        )));
    }

    let values: Vec<String> = children
        .iter()
        .map(|node| {
            if node.tag_name().namespace() != Some(VRT_NAMESPACE) {
                return Err(NotificationError::Invalid(format!(
                    "element '{}' outside notification namespace",
                    node.tag_name().name()
                )));
            }
            Ok(node.text().unwrap_or_default().to_string())
        })
        .collect::<Result<_, _>>()?;
    let [timestamp, file, pid, s3bucket, md5sum]: [String; 5] = values
        .try_into()
        .map_err(|_| NotificationError::Invalid("wrong element count".to_string()))?;

    Ok(NotificationFields {
        timestamp,
        file,
        pid,
        s3bucket,
        md5sum,
    })
}
