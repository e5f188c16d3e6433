//! OMA-DM (Open Mobile Alliance Device Management) support.
//!
//! Passpoint profiles are provisioned as OMA-DM management object trees in
//! XML form. This module holds the element tree those documents are read
//! into.

mod xml_node;

pub use xml_node::{XmlNode, XmlTreeBuilder, XmlTreeError};
