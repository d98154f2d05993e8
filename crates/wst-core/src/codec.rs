//! Token codec boundary.
//!
//! The protocol core round-trips tokens and envelopes through this boundary
//! without interpreting them. [`XmlCodec`] is the default implementation,
//! built on quick-xml (which does not expand entities, so it is safe against
//! XXE by default).

use std::collections::BTreeMap;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use quick_xml::writer::Writer;

use crate::constants::QName;
use crate::error::{WstError, WstResult};
use crate::token::XmlElement;

/// Parse/serialize boundary for token and envelope elements.
pub trait TokenCodec: Send + Sync {
    /// Parses raw bytes into an element tree.
    ///
    /// ## Errors
    ///
    /// Fails with [`WstError::Codec`] on malformed input.
    fn decode(&self, raw: &[u8]) -> WstResult<XmlElement>;

    /// Serializes an element tree to bytes.
    ///
    /// ## Errors
    ///
    /// Fails with [`WstError::Codec`] if the tree cannot be written.
    fn encode(&self, element: &XmlElement) -> WstResult<Vec<u8>>;
}

/// quick-xml implementation of the codec boundary.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlCodec;

impl XmlCodec {
    /// Creates a codec.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TokenCodec for XmlCodec {
    fn decode(&self, raw: &[u8]) -> WstResult<XmlElement> {
        let text = std::str::from_utf8(raw)
            .map_err(|e| WstError::codec(format!("input is not UTF-8: {e}")))?;
        let mut reader = NsReader::from_str(text);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let (resolve, event) = reader
                .read_resolved_event()
                .map_err(|e| WstError::codec(format!("XML parse error: {e}")))?;
            match event {
                Event::Start(start) => {
                    stack.push(element_from_start(&resolve, &start)?);
                }
                Event::Empty(start) => {
                    let element = element_from_start(&resolve, &start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(t) => {
                    if let Some(current) = stack.last_mut() {
                        let value = t
                            .unescape()
                            .map_err(|e| WstError::codec(format!("text unescape error: {e}")))?;
                        let trimmed = value.trim();
                        if !trimmed.is_empty() {
                            match &mut current.text {
                                Some(existing) => existing.push_str(trimmed),
                                None => current.text = Some(trimmed.to_string()),
                            }
                        }
                    }
                }
                Event::End(_) => {
                    let finished = stack
                        .pop()
                        .ok_or_else(|| WstError::codec("unbalanced end tag"))?;
                    attach(&mut stack, &mut root, finished)?;
                }
                Event::Eof => break,
                // Declarations, comments, CDATA, and PIs carry nothing the
                // token model keeps.
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(WstError::codec("unterminated element"));
        }
        root.ok_or_else(|| WstError::codec("no root element"))
    }

    fn encode(&self, element: &XmlElement) -> WstResult<Vec<u8>> {
        let mut namespaces = BTreeMap::new();
        collect_namespaces(element, &mut namespaces);

        let mut writer = Writer::new(Vec::new());
        write_element(&mut writer, element, &namespaces, true)?;
        Ok(writer.into_inner())
    }
}

fn element_from_start(resolve: &ResolveResult, start: &BytesStart<'_>) -> WstResult<XmlElement> {
    let namespace = match resolve {
        ResolveResult::Bound(ns) => String::from_utf8_lossy(ns.as_ref()).into_owned(),
        _ => String::new(),
    };
    let local = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let mut element = XmlElement::new(QName::new(namespace, local));

    for attr in start.attributes() {
        let attr = attr.map_err(|e| WstError::codec(format!("attribute error: {e}")))?;
        if attr.key.as_ref().starts_with(b"xmlns") {
            continue;
        }
        let name = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| WstError::codec(format!("attribute unescape error: {e}")))?
            .into_owned();
        element.attributes.push((name, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> WstResult<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(WstError::codec("multiple root elements"));
    }
    *root = Some(element);
    Ok(())
}

fn collect_namespaces(element: &XmlElement, namespaces: &mut BTreeMap<String, String>) {
    if !element.name.namespace.is_empty() && !namespaces.contains_key(&element.name.namespace) {
        let prefix = format!("ns{}", namespaces.len() + 1);
        namespaces.insert(element.name.namespace.clone(), prefix);
    }
    for child in &element.children {
        collect_namespaces(child, namespaces);
    }
}

fn write_element(
    writer: &mut Writer<Vec<u8>>,
    element: &XmlElement,
    namespaces: &BTreeMap<String, String>,
    is_root: bool,
) -> WstResult<()> {
    let tag = if element.name.namespace.is_empty() {
        element.name.local.clone()
    } else {
        let prefix = &namespaces[&element.name.namespace];
        format!("{prefix}:{}", element.name.local)
    };

    let mut start = BytesStart::new(tag.as_str());
    if is_root {
        // All namespace declarations go on the root element.
        for (uri, prefix) in namespaces {
            start.push_attribute((format!("xmlns:{prefix}").as_str(), uri.as_str()));
        }
    }
    for (name, value) in &element.attributes {
        start.push_attribute((name.as_str(), value.as_str()));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| WstError::codec(format!("write error: {e}")))?;

    if let Some(text) = &element.text {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(|e| WstError::codec(format!("write error: {e}")))?;
    }
    for child in &element.children {
        write_element(writer, child, namespaces, false)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new(tag.as_str())))
        .map_err(|e| WstError::codec(format!("write error: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{SAML2_ASSERTION_NS, WSSE_NS, WST_NS};

    fn assertion() -> XmlElement {
        XmlElement::new(QName::new(SAML2_ASSERTION_NS, "Assertion"))
            .with_attribute("ID", "_id42")
            .with_attribute("Version", "2.0")
            .with_child(
                XmlElement::new(QName::new(SAML2_ASSERTION_NS, "Issuer"))
                    .with_text("https://idp.example.org"),
            )
            .with_child(
                XmlElement::new(QName::new(SAML2_ASSERTION_NS, "Subject")).with_child(
                    XmlElement::new(QName::new(SAML2_ASSERTION_NS, "NameID")).with_text("jdoe"),
                ),
            )
    }

    #[test]
    fn round_trip_preserves_tree() {
        let codec = XmlCodec::new();
        let token = assertion();
        let encoded = codec.encode(&token).unwrap();
        let decoded = codec.decode(&encoded).unwrap();
        assert_eq!(decoded, token);
    }

    #[test]
    fn round_trip_multiple_namespaces() {
        let codec = XmlCodec::new();
        let tree = XmlElement::new(QName::new(WSSE_NS, "Security"))
            .with_child(assertion())
            .with_child(XmlElement::new(QName::new(WST_NS, "RequestType")).with_text(
                crate::constants::VALIDATE_REQUEST,
            ));
        let decoded = codec.decode(&codec.encode(&tree).unwrap()).unwrap();
        assert_eq!(decoded, tree);
    }

    #[test]
    fn decode_resolves_prefixes() {
        let codec = XmlCodec::new();
        let raw = format!(
            r#"<saml:Assertion xmlns:saml="{SAML2_ASSERTION_NS}" ID="_x"><saml:Issuer>idp</saml:Issuer></saml:Assertion>"#
        );
        let decoded = codec.decode(raw.as_bytes()).unwrap();
        assert_eq!(decoded.name, QName::new(SAML2_ASSERTION_NS, "Assertion"));
        assert_eq!(decoded.attribute("ID"), Some("_x"));
        assert_eq!(
            decoded.first_child().unwrap().text.as_deref(),
            Some("idp")
        );
    }

    #[test]
    fn decode_rejects_malformed_input() {
        let codec = XmlCodec::new();
        assert!(codec.decode(b"<open><unclosed></open>").is_err());
        assert!(codec.decode(b"no xml here").is_err());
        assert!(codec.decode(b"").is_err());
    }

    #[test]
    fn decode_self_closing_element() {
        let codec = XmlCodec::new();
        let decoded = codec.decode(b"<Status code=\"ok\"/>").unwrap();
        assert_eq!(decoded.name, QName::unqualified("Status"));
        assert_eq!(decoded.attribute("code"), Some("ok"));
    }
}
