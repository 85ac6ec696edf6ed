use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};
use essence_core::constants::{EXTERNAL_ID_TYPE, MEDIAHAVEN_ID_TYPE, PREMIS_NAMESPACE};
use essence_core::models::{ArchivedEventTypes, EventFields, EventRecord};
use quick_xml::encoding::detect_encoding;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use roxmltree::{Document, Node};

const DEFAULT_ENCODING: &str = "UTF-8";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    /// Body is empty, cannot be decoded, or is not well-formed XML.
    #[error("{0}")]
    MalformedInput(String),

    /// Well-formed XML without any PREMIS `event` under the root.
    #[error("No PREMIS events found in XML with root element '{root}' (encoding: {encoding})")]
    NoEventsFound { root: String, encoding: String },
}

/// Parse a PREMIS event envelope into event records, in document order.
///
/// The body is decoded with the encoding its XML declaration names. Each
/// record keeps the source text of its `event` element, with the namespace
/// declarations it inherits added, so a failure-outcome event can be
/// forwarded as a document of its own.
pub fn parse_events(
    input: &[u8],
    archived_types: &ArchivedEventTypes,
) -> Result<Vec<EventRecord>, ParseError> {
    let body = decode_body(input)?;
    let text = body.text.as_ref();
    if text.trim().is_empty() {
        return Err(ParseError::MalformedInput("Body is empty".to_string()));
    }

    let doc = Document::parse(text).map_err(|e| ParseError::MalformedInput(e.to_string()))?;
    let root = doc.root_element();

    let records: Vec<EventRecord> = root
        .children()
        .filter(|node| node.has_tag_name((PREMIS_NAMESPACE, "event")))
        .map(|node| {
            let raw_xml = standalone_xml(node, text);
            EventRecord::new(extract_fields(node), raw_xml, archived_types)
        })
        .collect();

    if records.is_empty() {
        return Err(ParseError::NoEventsFound {
            root: root.tag_name().name().to_string(),
            encoding: body.declared_encoding,
        });
    }

    tracing::debug!(
        count = records.len(),
        encoding = %body.declared_encoding,
        "Parsed PREMIS events"
    );
    Ok(records)
}

struct DecodedBody<'a> {
    text: Cow<'a, str>,
    declared_encoding: String,
}

fn decode_body(input: &[u8]) -> Result<DecodedBody<'_>, ParseError> {
    let (detected, bom_len) = detect_encoding(input).unwrap_or((UTF_8, 0));
    let bytes = &input[bom_len..];

    // UTF-16 is fixed by the byte layout; the declaration is read after decoding.
    if detected != UTF_8 {
        let text = decode_as(bytes, detected)?;
        let declared_encoding = declaration_encoding(text.as_bytes())
            .unwrap_or_else(|| detected.name().to_string());
        return Ok(DecodedBody {
            text,
            declared_encoding,
        });
    }

    let declared = declaration_encoding(bytes);
    let encoding = match &declared {
        Some(label) => Encoding::for_label(label.as_bytes())
            .ok_or_else(|| ParseError::MalformedInput(format!("Unsupported encoding '{}'", label)))?
            .output_encoding(),
        None => UTF_8,
    };

    Ok(DecodedBody {
        text: decode_as(bytes, encoding)?,
        declared_encoding: declared.unwrap_or_else(|| DEFAULT_ENCODING.to_string()),
    })
}

fn decode_as<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> Result<Cow<'a, str>, ParseError> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .ok_or_else(|| ParseError::MalformedInput(format!("Body is not valid {}", encoding.name())))
}

/// Encoding label of the XML declaration, if the document starts with one.
fn declaration_encoding(bytes: &[u8]) -> Option<String> {
    let mut reader = Reader::from_reader(bytes);
    match reader.read_event() {
        Ok(Event::Decl(decl)) => decl
            .encoding()
            .and_then(Result::ok)
            .map(|label| String::from_utf8_lossy(&label).into_owned()),
        _ => None,
    }
}

/// Source text of `node` with every in-scope namespace that its own start
/// tag does not declare added to that start tag.
fn standalone_xml(node: Node<'_, '_>, text: &str) -> String {
    let source = &text[node.range()];
    let start_tag = start_tag(source);
    let name_end = start_tag
        .char_indices()
        .skip(1)
        .find(|(_, c)| c.is_whitespace() || *c == '/' || *c == '>')
        .map_or(start_tag.len(), |(i, _)| i);

    let mut declarations = String::new();
    for namespace in node.namespaces() {
        let attribute = match namespace.name() {
            Some("xml") => continue,
            Some(prefix) => format!("xmlns:{}", prefix),
            None => "xmlns".to_string(),
        };
        if declares(start_tag, &attribute) {
            continue;
        }
        declarations.push_str(&format!(" {}=\"{}\"", attribute, escape(namespace.uri())));
    }

    format!("{}{}{}", &source[..name_end], declarations, &source[name_end..])
}

/// The leading `<name ...>` tag of an element's source, quotes respected.
fn start_tag(source: &str) -> &str {
    let mut quote = None;
    for (i, c) in source.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(open), c) if c == open => quote = None,
            (None, '>') => return &source[..=i],
            _ => {}
        }
    }
    source
}

fn declares(start_tag: &str, attribute: &str) -> bool {
    start_tag.match_indices(attribute).any(|(i, _)| {
        start_tag[..i].ends_with(char::is_whitespace)
            && start_tag[i + attribute.len()..].trim_start().starts_with('=')
    })
}

fn extract_fields(event: Node<'_, '_>) -> EventFields {
    EventFields {
        event_type: child_text(event, &["eventType"]),
        event_id: child_text(event, &["eventIdentifier", "eventIdentifierValue"]),
        event_detail: child_text(event, &["eventDetail"]),
        event_datetime: child_text(event, &["eventDateTime"]),
        event_outcome: child_text(event, &["eventOutcomeInformation", "eventOutcome"]),
        fragment_id: linking_object_id(event, MEDIAHAVEN_ID_TYPE),
        external_id: linking_object_id(event, EXTERNAL_ID_TYPE),
    }
}

fn premis_child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.has_tag_name((PREMIS_NAMESPACE, name)))
}

/// Trimmed text at `path` below `node`, or an empty string when any step is missing.
fn child_text(node: Node<'_, '_>, path: &[&str]) -> String {
    let mut current = node;
    for name in path {
        match premis_child(current, name) {
            Some(child) => current = child,
            None => return String::new(),
        }
    }
    current.text().map(str::trim).unwrap_or_default().to_string()
}

fn linking_object_id(event: Node<'_, '_>, id_type: &str) -> String {
    event
        .children()
        .filter(|child| child.has_tag_name((PREMIS_NAMESPACE, "linkingObjectIdentifier")))
        .find(|child| child_text(*child, &["linkingObjectIdentifierType"]) == id_type)
        .map(|child| child_text(child, &["linkingObjectIdentifierValue"]))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SINGLE: &str = include_str!("../../tests/resources/single_premis_event.xml");
    const MULTI: &str = include_str!("../../tests/resources/multi_premis_event.xml");
    const NOK: &str = include_str!("../../tests/resources/single_premis_event_nok.xml");
    const NO_EVENTS: &str = include_str!("../../tests/resources/no_premis_events.xml");
    const MALFORMED: &str = include_str!("../../tests/resources/malformed_event.xml");

    fn parse(xml: &str) -> Result<Vec<EventRecord>, ParseError> {
        parse_events(xml.as_bytes(), &ArchivedEventTypes::default())
    }

    #[test]
    fn test_single_event_fields() {
        let events = parse(SINGLE).unwrap();
        assert_eq!(events.len(), 1);

        let event = &events[0];
        assert_eq!(event.event_type(), "RECORDS.FLOW.ARCHIVED");
        assert_eq!(event.event_id(), "111");
        assert_eq!(event.event_detail(), "Ingest (Lowres)");
        assert_eq!(event.event_datetime(), "2019-03-30T05:28:40Z");
        assert_eq!(event.event_outcome(), "OK");
        assert_eq!(event.fragment_id(), "a1b2c3");
        assert_eq!(event.external_id(), "pid1");
        assert!(event.is_valid_archive_event());
        assert!(event.has_success_outcome());
    }

    #[test]
    fn test_multiple_events_in_document_order() {
        let events = parse(MULTI).unwrap();
        assert_eq!(events.len(), 2);

        assert_eq!(events[0].event_type(), "EXPORT");
        assert!(!events[0].is_valid_archive_event());
        assert_eq!(events[0].external_id(), "");

        assert_eq!(events[1].event_type(), "FLOW.ARCHIVED");
        assert_eq!(events[1].fragment_id(), "d4e5f6");
        assert!(events[1].is_valid_archive_event());
    }

    #[test]
    fn test_failure_outcome() {
        let events = parse(NOK).unwrap();
        assert_eq!(events[0].event_outcome(), "NOK");
        assert!(!events[0].has_success_outcome());
        assert!(events[0].is_valid_archive_event());
    }

    #[test]
    fn test_raw_xml_parses_on_its_own() {
        let events = parse(NOK).unwrap();
        let raw = events[0].raw_xml();
        assert!(raw.starts_with(r#"<p:event xmlns:p="info:lc/xmlns/premis-v2">"#));
        assert!(raw.ends_with("</p:event>"));
        assert!(raw.contains("<p:eventOutcome>NOK</p:eventOutcome>"));

        let doc = Document::parse(raw).unwrap();
        let event = doc.root_element();
        assert!(event.has_tag_name((PREMIS_NAMESPACE, "event")));
        assert_eq!(
            child_text(event, &["eventOutcomeInformation", "eventOutcome"]),
            "NOK"
        );
    }

    #[test]
    fn test_raw_xml_keeps_own_declarations() {
        let xml = r#"<events xmlns="urn:envelope" xmlns:p="info:lc/xmlns/premis-v2" xmlns:x="urn:extra"><p:event xmlns:x="urn:extra" id='a>b'><x:note/></p:event></events>"#;
        let events = parse(xml).unwrap();
        let raw = events[0].raw_xml();

        assert_eq!(raw.matches("xmlns:x=").count(), 1);
        assert_eq!(raw.matches("xmlns:p=").count(), 1);
        assert!(raw.contains(r#"xmlns="urn:envelope""#));
        assert!(raw.ends_with(r#"id='a>b'><x:note/></p:event>"#));

        let doc = Document::parse(raw).unwrap();
        assert_eq!(doc.root_element().attribute("id"), Some("a>b"));
    }

    #[test]
    fn test_values_are_trimmed() {
        let xml = r#"<events xmlns:p="info:lc/xmlns/premis-v2">
            <p:event>
                <p:eventType>
                    FLOW.ARCHIVED
                </p:eventType>
                <p:eventOutcomeInformation><p:eventOutcome> OK </p:eventOutcome></p:eventOutcomeInformation>
                <p:linkingObjectIdentifier>
                    <p:linkingObjectIdentifierType>MEDIAHAVEN_ID</p:linkingObjectIdentifierType>
                    <p:linkingObjectIdentifierValue>  frag  </p:linkingObjectIdentifierValue>
                </p:linkingObjectIdentifier>
            </p:event>
        </events>"#;
        let events = parse(xml).unwrap();
        assert_eq!(events[0].event_type(), "FLOW.ARCHIVED");
        assert_eq!(events[0].event_outcome(), "OK");
        assert_eq!(events[0].fragment_id(), "frag");
        assert!(events[0].is_valid_archive_event());
    }

    #[test]
    fn test_missing_fields_are_empty() {
        let xml = r#"<events xmlns:p="info:lc/xmlns/premis-v2"><p:event><p:eventType>FLOW.ARCHIVED</p:eventType></p:event></events>"#;
        let events = parse(xml).unwrap();
        let event = &events[0];
        assert_eq!(event.event_id(), "");
        assert_eq!(event.event_outcome(), "");
        assert_eq!(event.fragment_id(), "");
        assert!(!event.is_valid_archive_event());
        assert!(!event.has_success_outcome());
    }

    #[test]
    fn test_events_outside_premis_namespace_are_ignored() {
        let xml = r#"<events xmlns:x="urn:other"><x:event><x:eventType>FLOW.ARCHIVED</x:eventType></x:event></events>"#;
        let err = parse(xml).unwrap_err();
        assert!(matches!(err, ParseError::NoEventsFound { .. }));
    }

    #[test]
    fn test_no_events_reports_root_and_encoding() {
        let err = parse(NO_EVENTS).unwrap_err();
        assert_eq!(
            err,
            ParseError::NoEventsFound {
                root: "records".to_string(),
                encoding: "UTF-8".to_string(),
            }
        );
        assert!(err.to_string().contains("'records'"));
    }

    #[test]
    fn test_malformed_input() {
        assert!(matches!(
            parse(MALFORMED).unwrap_err(),
            ParseError::MalformedInput(_)
        ));
        assert!(matches!(parse("").unwrap_err(), ParseError::MalformedInput(_)));
        assert!(matches!(
            parse_events(&[0xff, 0xfe, 0x00], &ArchivedEventTypes::default()).unwrap_err(),
            ParseError::MalformedInput(_)
        ));
    }

    #[test]
    fn test_declaration_encoding() {
        assert_eq!(
            declaration_encoding(br#"<?xml version="1.0" encoding="ISO-8859-1"?><a/>"#),
            Some("ISO-8859-1".to_string())
        );
        assert_eq!(
            declaration_encoding(b"<?xml version='1.0' encoding='utf-8'?><a/>"),
            Some("utf-8".to_string())
        );
        assert_eq!(declaration_encoding(br#"<?xml version="1.0"?><a/>"#), None);
        assert_eq!(declaration_encoding(b"<a/>"), None);
    }

    #[test]
    fn test_declared_single_byte_encoding_is_honoured() {
        let mut body = br#"<?xml version="1.0" encoding="ISO-8859-1"?>
<events xmlns:p="info:lc/xmlns/premis-v2"><p:event><p:eventType>FLOW.ARCHIVED</p:eventType><p:eventDetail>Archiv"#
            .to_vec();
        body.push(0xe9);
        body.extend_from_slice(b"</p:eventDetail></p:event></events>");

        let events = parse_events(&body, &ArchivedEventTypes::default()).unwrap();
        assert_eq!(events[0].event_detail(), "Archiv\u{e9}");
        assert!(events[0].raw_xml().contains("Archiv\u{e9}"));
    }

    #[test]
    fn test_utf16_body_with_bom() {
        let xml = r#"<events xmlns:p="info:lc/xmlns/premis-v2"><p:event><p:eventType>FLOW.ARCHIVED</p:eventType></p:event></events>"#;
        let mut body = vec![0xff, 0xfe];
        body.extend(xml.encode_utf16().flat_map(u16::to_le_bytes));

        let events = parse_events(&body, &ArchivedEventTypes::default()).unwrap();
        assert_eq!(events[0].event_type(), "FLOW.ARCHIVED");
    }

    #[test]
    fn test_unsupported_encoding_is_malformed() {
        let xml = r#"<?xml version="1.0" encoding="x-no-such-charset"?><events/>"#;
        assert_eq!(
            parse(xml).unwrap_err(),
            ParseError::MalformedInput("Unsupported encoding 'x-no-such-charset'".to_string())
        );
    }

    #[test]
    fn test_no_events_reports_declared_encoding() {
        let xml = r#"<?xml version="1.0" encoding="windows-1252"?><records/>"#;
        assert_eq!(
            parse(xml).unwrap_err(),
            ParseError::NoEventsFound {
                root: "records".to_string(),
                encoding: "windows-1252".to_string(),
            }
        );
    }
}
