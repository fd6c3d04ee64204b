//! Mutable in-memory XML tree for reXML documents
//!
//! The tree is an arena of nodes owned by a [`Document`]. Rules mutate it in
//! place through [`NodeId`] handles and then serialize the result with
//! [`Document::save`].
//!
//! Node selection is a deliberately small subset of XPath: `/`-separated
//! element names, either anchored at the document (`/reXML/PropertyReference`)
//! or relative to a node (`LeaseID/LeaseReference`).

pub mod document;
pub mod error;
mod parse;
mod write;

pub use document::{Attribute, Document, NodeId, NodeKind};
pub use error::XmlError;
