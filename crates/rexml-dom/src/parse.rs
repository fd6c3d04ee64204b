//! quick-xml event stream to [`Document`]

use std::borrow::Cow;

use quick_xml::encoding::{decode, detect_encoding};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::document::{Attribute, Document, NodeId, NodeKind};
use crate::error::XmlError;

/// Decode raw file bytes into text, honouring a UTF-16 byte order mark or the
/// `encoding` named in the XML declaration. Undeclared input must be UTF-8.
pub(crate) fn decode_input(bytes: &[u8]) -> Result<Cow<'_, str>, XmlError> {
    let (detected, bom_len) = match detect_encoding(bytes) {
        Some((encoding, bom_len)) => (Some(encoding), bom_len),
        None => (None, 0),
    };
    let body = &bytes[bom_len..];

    let encoding = match detected {
        Some(encoding) if !encoding.is_ascii_compatible() => Some(encoding),
        _ => {
            let mut buf = Vec::new();
            match Reader::from_reader(body).read_event_into(&mut buf) {
                Ok(Event::Decl(decl)) => decl.encoder(),
                _ => None,
            }
        }
    };

    let undecodable = |message: String| XmlError::Parse {
        position: 0,
        message,
    };
    match encoding {
        Some(encoding) => decode(body, encoding)
            .map_err(|_| undecodable(format!("content is not valid {}", encoding.name()))),
        None => std::str::from_utf8(body)
            .map(Cow::Borrowed)
            .map_err(|e| undecodable(e.to_string())),
    }
}

pub(crate) fn parse_document(xml: &str) -> Result<Document, XmlError> {
    let xml = xml.trim_start_matches('\u{feff}');
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);
    reader.check_end_names(true);

    let mut doc = Document::new();
    let mut stack: Vec<NodeId> = vec![doc.document_node()];

    loop {
        let event = reader.read_event().map_err(|e| XmlError::Parse {
            position: reader.buffer_position(),
            message: e.to_string(),
        })?;
        let parent = *stack.last().unwrap_or(&doc.document_node());

        if let Event::Start(_) | Event::Empty(_) = event {
            if parent == doc.document_node() && doc.root_element().is_some() {
                return Err(XmlError::Parse {
                    position: reader.buffer_position(),
                    message: "multiple root elements".to_string(),
                });
            }
        }

        match event {
            Event::Start(start) => {
                let element = element_from(&mut doc, &start, &reader, reader.buffer_position())?;
                doc.append_child(parent, element);
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = element_from(&mut doc, &start, &reader, reader.buffer_position())?;
                doc.append_child(parent, element);
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| XmlError::Parse {
                    position: reader.buffer_position(),
                    message: e.to_string(),
                })?;
                // Whitespace between elements is layout, not content
                if text.trim().is_empty() {
                    continue;
                }
                if parent == doc.document_node() {
                    return Err(XmlError::Parse {
                        position: reader.buffer_position(),
                        message: "text outside the root element".to_string(),
                    });
                }
                let node = doc.alloc(NodeKind::Text(text.into_owned()));
                doc.append_child(parent, node);
            }
            Event::CData(data) => {
                let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                let node = doc.alloc(NodeKind::CData(text));
                doc.append_child(parent, node);
            }
            Event::Comment(comment) => {
                let text = String::from_utf8_lossy(&comment).into_owned();
                let node = doc.alloc(NodeKind::Comment(text));
                doc.append_child(parent, node);
            }
            Event::PI(pi) => {
                let text = String::from_utf8_lossy(&pi).into_owned();
                let node = doc.alloc(NodeKind::ProcessingInstruction(text));
                doc.append_child(parent, node);
            }
            Event::Decl(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    if stack.len() > 1 {
        let open = stack
            .last()
            .and_then(|&id| doc.name(id))
            .unwrap_or_default()
            .to_string();
        return Err(XmlError::Unclosed(open));
    }
    if doc.root_element().is_none() {
        return Err(XmlError::MissingRoot);
    }

    Ok(doc)
}

fn element_from(
    doc: &mut Document,
    start: &BytesStart,
    reader: &Reader<&[u8]>,
    position: usize,
) -> Result<NodeId, XmlError> {
    let parse_error = |message: String| XmlError::Parse { position, message };

    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| parse_error(e.to_string()))?
        .to_string();

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| parse_error(e.to_string()))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| parse_error(e.to_string()))?
            .to_string();
        let value = attr
            .decode_and_unescape_value(reader)
            .map_err(|e| parse_error(e.to_string()))?
            .into_owned();
        attributes.push(Attribute { name: key, value });
    }

    Ok(doc.alloc(NodeKind::Element { name, attributes }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_attributes_and_entities() {
        let doc = parse_document(r#"<?xml version="1.0"?><a k="x &amp; y">1 &lt; 2</a>"#).unwrap();
        let a = doc.root_element().unwrap();
        assert_eq!(doc.attribute(a, "k"), Some("x & y"));
        assert_eq!(doc.text(a), "1 < 2");
    }

    #[test]
    fn test_strips_byte_order_mark() {
        let doc = parse_document("\u{feff}<a/>").unwrap();
        assert_eq!(doc.name(doc.root_element().unwrap()), Some("a"));
    }

    #[test]
    fn test_rejects_mismatched_end_tag() {
        assert!(matches!(
            parse_document("<a><b></a>"),
            Err(XmlError::Parse { .. })
        ));
    }

    #[test]
    fn test_rejects_unclosed_element() {
        assert!(matches!(
            parse_document("<a><b/>"),
            Err(XmlError::Unclosed(_)) | Err(XmlError::Parse { .. })
        ));
    }

    #[test]
    fn test_rejects_empty_input() {
        assert!(matches!(parse_document("   "), Err(XmlError::MissingRoot)));
    }

    #[test]
    fn test_rejects_second_root() {
        assert!(matches!(parse_document("<a/><b/>"), Err(XmlError::Parse { .. })));
    }

    #[test]
    fn test_rejects_text_outside_root() {
        assert!(matches!(
            parse_document("garbage<reXML/>"),
            Err(XmlError::Parse { .. })
        ));
        assert!(matches!(
            parse_document("<reXML/>trailing junk"),
            Err(XmlError::Parse { .. })
        ));
        assert!(parse_document("  <reXML/>\n  ").is_ok());
    }

    #[test]
    fn test_decodes_declared_latin1() {
        let bytes = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><a>caf\xe9</a>";
        let text = decode_input(bytes).unwrap();
        let doc = parse_document(&text).unwrap();
        assert_eq!(doc.text(doc.root_element().unwrap()), "caf\u{e9}");
    }

    #[test]
    fn test_decodes_utf16_with_byte_order_mark() {
        let mut bytes = vec![0xFF, 0xFE];
        bytes.extend("<a>caf\u{e9}</a>".encode_utf16().flat_map(u16::to_le_bytes));
        let text = decode_input(&bytes).unwrap();
        let doc = parse_document(&text).unwrap();
        assert_eq!(doc.text(doc.root_element().unwrap()), "caf\u{e9}");
    }

    #[test]
    fn test_undeclared_input_must_be_utf8() {
        assert!(decode_input("<a>caf\u{e9}</a>".as_bytes()).is_ok());
        assert!(matches!(
            decode_input(b"<a>caf\xe9</a>"),
            Err(XmlError::Parse { .. })
        ));
    }

    #[test]
    fn test_keeps_cdata_as_text() {
        let doc = parse_document("<a><![CDATA[<raw>]]></a>").unwrap();
        assert_eq!(doc.text(doc.root_element().unwrap()), "<raw>");
    }
}
