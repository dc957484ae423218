//! An owned XML element tree over quick-xml events.
//!
//! [`Element`] is the unit the resource layer retains and serializes:
//! a tag, attributes, optional text content, and child elements. Parsing
//! reads quick-xml events into a tree; writing emits events back out with
//! proper escaping.
//!
//! Malformed documents are fatal and surface as [`XmlError`] immediately;
//! there is no partial-document recovery.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;

/// Errors raised while parsing or writing XML.
#[derive(Debug, Error)]
pub enum XmlError {
    /// The document could not be parsed.
    #[error("Malformed XML document: {0}")]
    Malformed(String),

    /// The document contained no root element.
    #[error("Document contains no root element")]
    NoRoot,

    /// The element tree could not be written out.
    #[error("Failed to write XML: {0}")]
    Write(String),
}

/// An owned XML element: tag, attributes, text content, and children.
///
/// Attribute and document order are preserved; sequence fields on the wire
/// (`type="array"`) rely on child order.
///
/// # Example
///
/// ```rust
/// use recurly_api::xml::Element;
///
/// let elem = Element::parse("<account><account_code>acme</account_code></account>").unwrap();
/// assert_eq!(elem.tag(), "account");
/// assert_eq!(elem.find("account_code").and_then(Element::text), Some("acme"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    /// Creates an empty element with the given tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Creates an element with text content.
    #[must_use]
    pub fn with_text(tag: impl Into<String>, text: impl Into<String>) -> Self {
        let mut elem = Self::new(tag);
        elem.text = Some(text.into());
        elem
    }

    /// Returns the element's tag name.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns the element's text content, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Sets the element's text content.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    /// Returns the value of an attribute, if present.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Sets an attribute, replacing any existing value.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self.attributes.iter_mut().find(|(key, _)| *key == name) {
            entry.1 = value;
        } else {
            self.attributes.push((name, value));
        }
    }

    /// Returns the element's attributes in document order.
    #[must_use]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Returns the element's children in document order.
    #[must_use]
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Appends a child element.
    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Returns the first direct child with the given tag.
    #[must_use]
    pub fn find(&self, tag: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.tag == tag)
    }

    /// Returns all direct children with the given tag, in order.
    pub fn find_all<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |child| child.tag == tag)
    }

    /// Resolves a slash-separated path of child tags.
    ///
    /// Used for fields whose value lives below an intermediate element
    /// (e.g. a subscription's plan code at `plan/plan_code`).
    #[must_use]
    pub fn find_path(&self, path: &str) -> Option<&Element> {
        let mut current = self;
        for segment in path.split('/') {
            current = current.find(segment)?;
        }
        Some(current)
    }

    /// Parses an XML document into its root element.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError::Malformed`] if the document cannot be parsed, or
    /// [`XmlError::NoRoot`] if it contains no root element. Parse failures
    /// are fatal; there is no partial-document recovery.
    pub fn parse(xml: &str) -> Result<Self, XmlError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Self> = Vec::new();
        let mut root: Option<Self> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| XmlError::Malformed(e.to_string()))?;
            match event {
                Event::Start(start) => {
                    stack.push(Self::from_start(&start)?);
                }
                Event::Empty(start) => {
                    let elem = Self::from_start(&start)?;
                    Self::attach(&mut stack, &mut root, elem)?;
                }
                Event::End(_) => {
                    let elem = stack
                        .pop()
                        .ok_or_else(|| XmlError::Malformed("unexpected closing tag".to_string()))?;
                    Self::attach(&mut stack, &mut root, elem)?;
                }
                Event::Text(text) => {
                    let content = text
                        .decode()
                        .map_err(|e| XmlError::Malformed(e.to_string()))?;
                    if let Some(top) = stack.last_mut() {
                        top.append_text(&content);
                    }
                }
                Event::CData(data) => {
                    if let Some(top) = stack.last_mut() {
                        let content = String::from_utf8_lossy(data.as_ref()).into_owned();
                        top.append_text(&content);
                    }
                }
                Event::GeneralRef(reference) => {
                    // quick-xml emits entity references as separate events.
                    let name = String::from_utf8_lossy(reference.as_ref()).into_owned();
                    let resolved = resolve_entity(&name)
                        .ok_or_else(|| XmlError::Malformed(format!("unknown entity &{name};")))?;
                    if let Some(top) = stack.last_mut() {
                        top.append_text(&resolved);
                    }
                }
                Event::Eof => break,
                Event::Decl(_) | Event::PI(_) | Event::DocType(_) | Event::Comment(_) => {}
            }
        }

        if !stack.is_empty() {
            return Err(XmlError::Malformed("unclosed element".to_string()));
        }
        root.ok_or(XmlError::NoRoot)
    }

    /// Writes the element tree as an XML fragment.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError::Write`] if the tree cannot be written.
    pub fn to_xml(&self) -> Result<String, XmlError> {
        let mut writer = Writer::new(Vec::new());
        self.write_into(&mut writer)?;
        String::from_utf8(writer.into_inner()).map_err(|e| XmlError::Write(e.to_string()))
    }

    /// Writes the element tree as a standalone XML document with a declaration.
    ///
    /// Request bodies use this form.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError::Write`] if the tree cannot be written.
    pub fn to_xml_document(&self) -> Result<String, XmlError> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(|e| XmlError::Write(e.to_string()))?;
        self.write_into(&mut writer)?;
        String::from_utf8(writer.into_inner()).map_err(|e| XmlError::Write(e.to_string()))
    }

    fn write_into(&self, writer: &mut Writer<Vec<u8>>) -> Result<(), XmlError> {
        let mut start = BytesStart::new(self.tag.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.text.is_none() && self.children.is_empty() {
            return writer
                .write_event(Event::Empty(start))
                .map_err(|e| XmlError::Write(e.to_string()));
        }

        writer
            .write_event(Event::Start(start))
            .map_err(|e| XmlError::Write(e.to_string()))?;
        if let Some(text) = &self.text {
            writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(|e| XmlError::Write(e.to_string()))?;
        }
        for child in &self.children {
            child.write_into(writer)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.tag.as_str())))
            .map_err(|e| XmlError::Write(e.to_string()))
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self, XmlError> {
        let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut elem = Self::new(tag);
        for attr in start.attributes() {
            let attr = attr.map_err(|e| XmlError::Malformed(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| XmlError::Malformed(e.to_string()))?
                .into_owned();
            elem.attributes.push((key, value));
        }
        Ok(elem)
    }

    fn attach(
        stack: &mut Vec<Self>,
        root: &mut Option<Self>,
        elem: Self,
    ) -> Result<(), XmlError> {
        if let Some(parent) = stack.last_mut() {
            parent.children.push(elem);
            Ok(())
        } else if root.is_some() {
            Err(XmlError::Malformed("multiple root elements".to_string()))
        } else {
            *root = Some(elem);
            Ok(())
        }
    }

    fn append_text(&mut self, content: &str) {
        match &mut self.text {
            Some(existing) => existing.push_str(content),
            None => self.text = Some(content.to_string()),
        }
    }
}

/// Resolves a predefined or character entity reference.
fn resolve_entity(name: &str) -> Option<String> {
    match name {
        "amp" => Some("&".to_string()),
        "lt" => Some("<".to_string()),
        "gt" => Some(">".to_string()),
        "quot" => Some("\"".to_string()),
        "apos" => Some("'".to_string()),
        _ => {
            let code = name.strip_prefix('#')?;
            let value = code.strip_prefix('x').map_or_else(
                || code.parse::<u32>().ok(),
                |hex| u32::from_str_radix(hex, 16).ok(),
            )?;
            char::from_u32(value).map(String::from)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reads_tag_text_and_children() {
        let elem = Element::parse(
            "<account><account_code>acme</account_code><state>active</state></account>",
        )
        .unwrap();

        assert_eq!(elem.tag(), "account");
        assert_eq!(elem.children().len(), 2);
        assert_eq!(elem.find("account_code").and_then(Element::text), Some("acme"));
        assert_eq!(elem.find("state").and_then(Element::text), Some("active"));
        assert!(elem.find("email").is_none());
    }

    #[test]
    fn test_parse_reads_attributes() {
        let elem = Element::parse(r#"<billing_info type="credit_card"><first_name>Jane</first_name></billing_info>"#).unwrap();

        assert_eq!(elem.attr("type"), Some("credit_card"));
        assert_eq!(elem.attr("missing"), None);
    }

    #[test]
    fn test_parse_reads_empty_elements_with_attributes() {
        let elem = Element::parse(
            r#"<account><billing_info href="https://api.recurly.com/v2/accounts/acme/billing_info"/></account>"#,
        )
        .unwrap();

        let billing = elem.find("billing_info").unwrap();
        assert_eq!(
            billing.attr("href"),
            Some("https://api.recurly.com/v2/accounts/acme/billing_info")
        );
        assert!(billing.text().is_none());
    }

    #[test]
    fn test_parse_unescapes_entities() {
        let elem = Element::parse("<company_name>Smith &amp; Sons &lt;Ltd&gt;</company_name>").unwrap();
        assert_eq!(elem.text(), Some("Smith & Sons <Ltd>"));
    }

    #[test]
    fn test_parse_resolves_character_references() {
        let elem = Element::parse("<name>caf&#233;</name>").unwrap();
        assert_eq!(elem.text(), Some("café"));
    }

    #[test]
    fn test_parse_skips_declaration_and_comments() {
        let elem = Element::parse(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><!-- hi --><plan><plan_code>gold</plan_code></plan>",
        )
        .unwrap();
        assert_eq!(elem.tag(), "plan");
    }

    #[test]
    fn test_parse_rejects_malformed_documents() {
        assert!(matches!(
            Element::parse("<account><state>active</account>"),
            Err(XmlError::Malformed(_))
        ));
        assert!(matches!(
            Element::parse("<account>"),
            Err(XmlError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_rejects_empty_document() {
        assert!(matches!(Element::parse(""), Err(XmlError::NoRoot)));
        assert!(matches!(Element::parse("<!-- nothing -->"), Err(XmlError::NoRoot)));
    }

    #[test]
    fn test_find_path_descends_nested_children() {
        let elem = Element::parse(
            "<subscription><plan><plan_code>gold</plan_code><name>Gold</name></plan></subscription>",
        )
        .unwrap();

        assert_eq!(
            elem.find_path("plan/plan_code").and_then(Element::text),
            Some("gold")
        );
        assert!(elem.find_path("plan/missing").is_none());
    }

    #[test]
    fn test_find_all_preserves_order() {
        let elem = Element::parse(
            r#"<plan_codes type="array"><plan_code>gold</plan_code><plan_code>silver</plan_code></plan_codes>"#,
        )
        .unwrap();

        let codes: Vec<_> = elem
            .find_all("plan_code")
            .filter_map(Element::text)
            .collect();
        assert_eq!(codes, vec!["gold", "silver"]);
    }

    #[test]
    fn test_to_xml_round_trips() {
        let source = r#"<account nil="nil"><account_code>acme</account_code><address><city>Lawrence</city></address></account>"#;
        let elem = Element::parse(source).unwrap();
        let written = elem.to_xml().unwrap();
        let reparsed = Element::parse(&written).unwrap();
        assert_eq!(elem, reparsed);
    }

    #[test]
    fn test_to_xml_escapes_text_and_attributes() {
        let mut elem = Element::with_text("company_name", "Smith & Sons");
        elem.set_attr("note", "a<b");

        let xml = elem.to_xml().unwrap();
        assert!(xml.contains("Smith &amp; Sons"));
        assert!(xml.contains("a&lt;b"));

        let reparsed = Element::parse(&xml).unwrap();
        assert_eq!(reparsed.text(), Some("Smith & Sons"));
        assert_eq!(reparsed.attr("note"), Some("a<b"));
    }

    #[test]
    fn test_to_xml_writes_empty_elements_self_closed() {
        let elem = Element::new("billing_info");
        assert_eq!(elem.to_xml().unwrap(), "<billing_info/>");
    }

    #[test]
    fn test_to_xml_document_includes_declaration() {
        let elem = Element::with_text("account_code", "acme");
        let doc = elem.to_xml_document().unwrap();
        assert!(doc.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    }

    #[test]
    fn test_set_attr_replaces_existing_value() {
        let mut elem = Element::new("adjustment");
        elem.set_attr("type", "charge");
        elem.set_attr("type", "credit");
        assert_eq!(elem.attr("type"), Some("credit"));
        assert_eq!(elem.attributes().len(), 1);
    }
}
