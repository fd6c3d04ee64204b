//! [`Document`] to XML text

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::document::{Document, NodeId, NodeKind};
use crate::error::XmlError;

pub(crate) fn write_document(doc: &Document) -> Result<String, XmlError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(|e| XmlError::Write(e.to_string()))?;
    for &child in doc.children(doc.document_node()) {
        write_node(doc, child, &mut writer)?;
    }
    let mut xml = into_string(writer)?;
    xml.push('\n');
    Ok(xml)
}

/// Compact rendering of a node's children, used for diagnostics
pub(crate) fn write_children(doc: &Document, id: NodeId) -> String {
    let mut writer = Writer::new(Vec::new());
    for &child in doc.children(id) {
        if write_node(doc, child, &mut writer).is_err() {
            break;
        }
    }
    into_string(writer).unwrap_or_default()
}

fn into_string(writer: Writer<Vec<u8>>) -> Result<String, XmlError> {
    String::from_utf8(writer.into_inner()).map_err(|e| XmlError::Write(e.to_string()))
}

fn write_node(doc: &Document, id: NodeId, writer: &mut Writer<Vec<u8>>) -> Result<(), XmlError> {
    let event = match doc.kind(id) {
        NodeKind::Document => {
            for &child in doc.children(id) {
                write_node(doc, child, writer)?;
            }
            return Ok(());
        }
        NodeKind::Element { name, attributes } => {
            let mut start = BytesStart::new(name.as_str());
            for attr in attributes {
                start.push_attribute((attr.name.as_str(), attr.value.as_str()));
            }
            if doc.children(id).is_empty() {
                Event::Empty(start)
            } else {
                emit(writer, Event::Start(start))?;
                for &child in doc.children(id) {
                    write_node(doc, child, writer)?;
                }
                Event::End(BytesEnd::new(name.as_str()))
            }
        }
        NodeKind::Text(text) => Event::Text(BytesText::new(text)),
        NodeKind::CData(text) => Event::CData(BytesCData::new(text.as_str())),
        NodeKind::Comment(text) => Event::Comment(BytesText::from_escaped(text.as_str())),
        NodeKind::ProcessingInstruction(text) => Event::PI(BytesText::from_escaped(text.as_str())),
    };
    emit(writer, event)
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), XmlError> {
    writer
        .write_event(event)
        .map_err(|e| XmlError::Write(e.to_string()))
}
