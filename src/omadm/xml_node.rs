//! XML element tree for OMA-DM management objects.
//!
//! A PPS management object arrives as an XML document. [`XmlTreeBuilder`]
//! receives parser events (start tag, text, end tag) and produces an
//! [`XmlNode`] tree. Nodes do not point back at their parents; the builder
//! keeps the chain of open elements on a stack instead.

/// One XML element with its trimmed text and child elements.
#[derive(Debug, Clone)]
pub struct XmlNode {
    tag: String,
    text: TextState,
    children: Vec<XmlNode>,
}

/// Text is accumulated while the element is open and frozen by `close`.
#[derive(Debug, Clone)]
enum TextState {
    Open(String),
    Closed(String),
}

impl XmlNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: TextState::Open(String::new()),
            children: Vec::new(),
        }
    }

    /// Append character data. Ignored once the node is closed.
    pub fn add_text(&mut self, text: &str) {
        match &mut self.text {
            TextState::Open(buf) => buf.push_str(text),
            TextState::Closed(_) => {
                log::debug!("Ignoring text added to closed <{}>", self.tag);
            }
        }
    }

    pub fn add_child(&mut self, child: XmlNode) {
        self.children.push(child);
    }

    /// Finish the element: trim surrounding whitespace from its text.
    pub fn close(&mut self) {
        if let TextState::Open(buf) = &self.text {
            self.text = TextState::Closed(buf.trim().to_string());
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.text, TextState::Closed(_))
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Trimmed text, or `None` while the node is still open.
    pub fn text(&self) -> Option<&str> {
        match &self.text {
            TextState::Open(_) => None,
            TextState::Closed(text) => Some(text),
        }
    }

    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// First direct child with the given tag.
    pub fn child(&self, tag: &str) -> Option<&XmlNode> {
        self.children.iter().find(|child| child.tag == tag)
    }
}

/// Nodes are equal when tag, closed text and children match. Text still
/// pending in an open node takes no part.
impl PartialEq for XmlNode {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag && self.text() == other.text() && self.children == other.children
    }
}

impl Eq for XmlNode {}

/// Errors from feeding the builder an unbalanced event sequence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum XmlTreeError {
    #[error("end tag </{found}> does not match open element <{expected}>")]
    MismatchedEndTag { expected: String, found: String },
    #[error("end tag </{0}> without an open element")]
    UnexpectedEndTag(String),
    #[error("text outside of any element")]
    TextOutsideElement,
    #[error("second root element <{0}>")]
    MultipleRoots(String),
    #[error("{0} element(s) still open")]
    UnclosedElements(usize),
    #[error("document has no root element")]
    Empty,
}

/// Builds an [`XmlNode`] tree from parser events.
///
/// # Example
///
/// ```
/// use passpoint_config::omadm::XmlTreeBuilder;
///
/// let mut builder = XmlTreeBuilder::new();
/// builder.start_element("MgmtTree").unwrap();
/// builder.start_element("VerDTD").unwrap();
/// builder.add_text("  1.2 ").unwrap();
/// builder.end_element("VerDTD").unwrap();
/// builder.end_element("MgmtTree").unwrap();
///
/// let root = builder.finish().unwrap();
/// assert_eq!(root.child("VerDTD").and_then(|n| n.text()), Some("1.2"));
/// ```
#[derive(Debug, Default)]
pub struct XmlTreeBuilder {
    open: Vec<XmlNode>,
    root: Option<XmlNode>,
}

impl XmlTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new element as a child of the current one.
    pub fn start_element(&mut self, tag: &str) -> Result<(), XmlTreeError> {
        if self.open.is_empty() && self.root.is_some() {
            return Err(XmlTreeError::MultipleRoots(tag.to_string()));
        }
        self.open.push(XmlNode::new(tag));
        Ok(())
    }

    /// Add character data to the current element.
    pub fn add_text(&mut self, text: &str) -> Result<(), XmlTreeError> {
        match self.open.last_mut() {
            Some(node) => {
                node.add_text(text);
                Ok(())
            }
            None if text.trim().is_empty() => Ok(()),
            None => Err(XmlTreeError::TextOutsideElement),
        }
    }

    /// Close the current element and attach it to its parent.
    pub fn end_element(&mut self, tag: &str) -> Result<(), XmlTreeError> {
        let mut node = self
            .open
            .pop()
            .ok_or_else(|| XmlTreeError::UnexpectedEndTag(tag.to_string()))?;
        if node.tag != tag {
            let expected = node.tag.clone();
            self.open.push(node);
            return Err(XmlTreeError::MismatchedEndTag {
                expected,
                found: tag.to_string(),
            });
        }

        node.close();
        match self.open.last_mut() {
            Some(parent) => parent.add_child(node),
            None => self.root = Some(node),
        }
        Ok(())
    }

    /// Return the completed root element.
    pub fn finish(self) -> Result<XmlNode, XmlTreeError> {
        if !self.open.is_empty() {
            return Err(XmlTreeError::UnclosedElements(self.open.len()));
        }
        self.root.ok_or(XmlTreeError::Empty)
    }
}
