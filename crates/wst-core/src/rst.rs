//! RequestSecurityToken / RequestSecurityTokenResponse wrappers.
//!
//! Typed views over the WS-Trust request and response envelopes. The
//! wrappers convert to and from the element tree the codec produces; they
//! never touch raw bytes.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{self, QName, WSA_NS, WSP_NS, WSSE_NS, WST_NS, WSU_NS};
use crate::error::{WstError, WstResult};
use crate::token::XmlElement;

/// WS-Trust request types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestType {
    /// Issue a new token.
    Issue,
    /// Issue a batch of tokens.
    BatchIssue,
    /// Renew an existing token.
    Renew,
    /// Validate an existing token.
    Validate,
    /// Validate a batch of tokens.
    BatchValidate,
    /// Cancel (revoke) an existing token.
    Cancel,
}

impl RequestType {
    /// Returns the WS-Trust request type URI.
    #[must_use]
    pub const fn as_uri(&self) -> &'static str {
        match self {
            Self::Issue => constants::ISSUE_REQUEST,
            Self::BatchIssue => constants::BATCH_ISSUE_REQUEST,
            Self::Renew => constants::RENEW_REQUEST,
            Self::Validate => constants::VALIDATE_REQUEST,
            Self::BatchValidate => constants::BATCH_VALIDATE_REQUEST,
            Self::Cancel => constants::CANCEL_REQUEST,
        }
    }

    /// Parses a WS-Trust request type URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            constants::ISSUE_REQUEST => Some(Self::Issue),
            constants::BATCH_ISSUE_REQUEST => Some(Self::BatchIssue),
            constants::RENEW_REQUEST => Some(Self::Renew),
            constants::VALIDATE_REQUEST => Some(Self::Validate),
            constants::BATCH_VALIDATE_REQUEST => Some(Self::BatchValidate),
            constants::CANCEL_REQUEST => Some(Self::Cancel),
            _ => None,
        }
    }
}

/// A (created, expires) timestamp pair, normalized to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lifetime {
    created: DateTime<Utc>,
    expires: DateTime<Utc>,
}

impl Lifetime {
    /// Creates a lifetime, normalizing both instants to UTC.
    ///
    /// ## Errors
    ///
    /// Fails with [`WstError::Validation`] if `expires` precedes `created`.
    pub fn new<Tz: TimeZone>(created: DateTime<Tz>, expires: DateTime<Tz>) -> WstResult<Self> {
        let created = created.with_timezone(&Utc);
        let expires = expires.with_timezone(&Utc);
        if expires < created {
            return Err(WstError::validation(format!(
                "lifetime expires ({expires}) precedes created ({created})"
            )));
        }
        Ok(Self { created, expires })
    }

    /// Creates a lifetime starting now with the given validity in seconds.
    ///
    /// ## Errors
    ///
    /// Fails with [`WstError::Validation`] for a negative duration.
    pub fn valid_for(seconds: i64) -> WstResult<Self> {
        let now = Utc::now();
        Self::new(now, now + chrono::Duration::seconds(seconds))
    }

    /// The creation instant (UTC).
    #[must_use]
    pub const fn created(&self) -> DateTime<Utc> {
        self.created
    }

    /// The expiry instant (UTC).
    #[must_use]
    pub const fn expires(&self) -> DateTime<Utc> {
        self.expires
    }
}

/// A WS-Trust RequestSecurityToken.
///
/// Exactly one semantic request type is carried per RST; the convenience
/// methods on the client default it when unset.
#[derive(Debug, Clone, Default)]
pub struct RequestSecurityToken {
    /// Request context identifier, echoed back in the RSTR.
    pub context: Option<String>,
    /// The WS-Trust request type.
    pub request_type: Option<RequestType>,
    /// Requested token type URI.
    pub token_type: Option<String>,
    /// AppliesTo target endpoint.
    pub applies_to: Option<String>,
    /// Issuer address (wsa).
    pub issuer: Option<String>,
    /// Principal on whose behalf the token is requested.
    pub on_behalf_of: Option<String>,
    /// Requested key type URI.
    pub key_type: Option<String>,
    /// Requested lifetime.
    pub lifetime: Option<Lifetime>,
    /// Token under validation (Validate requests).
    pub validate_target: Option<XmlElement>,
    /// Token under renewal (Renew requests).
    pub renew_target: Option<XmlElement>,
    /// Token under cancellation (Cancel requests).
    pub cancel_target: Option<XmlElement>,
}

impl RequestSecurityToken {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the requested token type.
    #[must_use]
    pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = Some(token_type.into());
        self
    }

    /// Sets the AppliesTo endpoint.
    #[must_use]
    pub fn with_applies_to(mut self, endpoint: impl Into<String>) -> Self {
        self.applies_to = Some(endpoint.into());
        self
    }

    /// Sets the on-behalf-of principal.
    #[must_use]
    pub fn with_on_behalf_of(mut self, principal: impl Into<String>) -> Self {
        self.on_behalf_of = Some(principal.into());
        self
    }

    /// Sets the requested lifetime.
    #[must_use]
    pub fn with_lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    /// Converts this request into its element representation.
    ///
    /// ## Errors
    ///
    /// Fails with [`WstError::Validation`] if no request type is set or more
    /// than one target token is attached.
    pub fn to_element(&self) -> WstResult<XmlElement> {
        let request_type = self
            .request_type
            .ok_or_else(|| WstError::validation("RequestSecurityToken has no request type"))?;

        let targets = usize::from(self.validate_target.is_some())
            + usize::from(self.renew_target.is_some())
            + usize::from(self.cancel_target.is_some());
        if targets > 1 {
            return Err(WstError::validation(
                "RequestSecurityToken carries more than one target token",
            ));
        }

        let mut rst = XmlElement::new(QName::new(WST_NS, "RequestSecurityToken"));
        if let Some(context) = &self.context {
            rst.attributes.push(("Context".to_string(), context.clone()));
        }
        if let Some(token_type) = &self.token_type {
            rst.push_child(
                XmlElement::new(QName::new(WST_NS, "TokenType")).with_text(token_type.clone()),
            );
        }
        rst.push_child(
            XmlElement::new(QName::new(WST_NS, "RequestType")).with_text(request_type.as_uri()),
        );
        if let Some(issuer) = &self.issuer {
            rst.push_child(XmlElement::new(QName::new(WST_NS, "Issuer")).with_child(
                XmlElement::new(QName::new(WSA_NS, "Address")).with_text(issuer.clone()),
            ));
        }
        if let Some(applies_to) = &self.applies_to {
            rst.push_child(
                XmlElement::new(QName::new(WSP_NS, "AppliesTo")).with_child(
                    XmlElement::new(QName::new(WSA_NS, "EndpointReference")).with_child(
                        XmlElement::new(QName::new(WSA_NS, "Address"))
                            .with_text(applies_to.clone()),
                    ),
                ),
            );
        }
        if let Some(principal) = &self.on_behalf_of {
            rst.push_child(
                XmlElement::new(QName::new(WST_NS, "OnBehalfOf")).with_child(
                    XmlElement::new(QName::new(WSSE_NS, "UsernameToken"))
                        .with_attribute("Id", "ID")
                        .with_child(
                            XmlElement::new(QName::new(WSSE_NS, "Username"))
                                .with_text(principal.clone()),
                        ),
                ),
            );
        }
        if let Some(key_type) = &self.key_type {
            rst.push_child(
                XmlElement::new(QName::new(WST_NS, "KeyType")).with_text(key_type.clone()),
            );
        }
        if let Some(lifetime) = &self.lifetime {
            rst.push_child(
                XmlElement::new(QName::new(WST_NS, "Lifetime"))
                    .with_child(
                        XmlElement::new(QName::new(WSU_NS, "Created"))
                            .with_text(lifetime.created().to_rfc3339()),
                    )
                    .with_child(
                        XmlElement::new(QName::new(WSU_NS, "Expires"))
                            .with_text(lifetime.expires().to_rfc3339()),
                    ),
            );
        }
        if let Some(token) = &self.validate_target {
            rst.push_child(
                XmlElement::new(QName::new(WST_NS, "ValidateTarget")).with_child(token.clone()),
            );
        }
        if let Some(token) = &self.renew_target {
            rst.push_child(
                XmlElement::new(QName::new(WST_NS, "RenewTarget")).with_child(token.clone()),
            );
        }
        if let Some(token) = &self.cancel_target {
            rst.push_child(
                XmlElement::new(QName::new(WST_NS, "CancelTarget")).with_child(token.clone()),
            );
        }
        Ok(rst)
    }
}

/// Token validation status carried in an RSTR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    /// Status code URI.
    pub code: String,
    /// Optional human-readable reason.
    pub reason: Option<String>,
}

impl Status {
    /// Returns true if the code marks the token as valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.code == constants::STATUS_CODE_VALID
    }
}

/// A WS-Trust RequestSecurityTokenResponse, parsed from its element form.
#[derive(Debug, Clone, Default)]
pub struct RequestSecurityTokenResponse {
    /// Request context echoed from the RST.
    pub context: Option<String>,
    /// The requested security token element, if issued.
    pub requested_token: Option<XmlElement>,
    /// Validation status, for Validate exchanges.
    pub status: Option<Status>,
    /// Present when the STS confirmed cancellation.
    pub token_cancelled: bool,
    /// Granted lifetime, if reported.
    pub lifetime: Option<Lifetime>,
}

impl RequestSecurityTokenResponse {
    /// Parses a single RSTR element.
    ///
    /// ## Errors
    ///
    /// Fails with [`WstError::Codec`] when the element is not an RSTR or a
    /// reported lifetime is malformed.
    pub fn from_element(element: &XmlElement) -> WstResult<Self> {
        if element.name.local != "RequestSecurityTokenResponse" {
            return Err(WstError::codec(format!(
                "expected RequestSecurityTokenResponse, found {}",
                element.name
            )));
        }

        let mut response = Self {
            context: element.attribute("Context").map(str::to_string),
            ..Self::default()
        };

        for child in &element.children {
            match child.name.local.as_str() {
                "RequestedSecurityToken" => {
                    response.requested_token = child.first_child().cloned();
                }
                "Status" => {
                    let code = child
                        .find_by_local_name("Code")
                        .and_then(|c| c.text.clone())
                        .ok_or_else(|| WstError::codec("Status element has no Code"))?;
                    let reason = child
                        .find_by_local_name("Reason")
                        .and_then(|r| r.text.clone());
                    response.status = Some(Status { code, reason });
                }
                "RequestedTokenCancelled" => {
                    response.token_cancelled = true;
                }
                "Lifetime" => {
                    response.lifetime = Some(parse_lifetime(child)?);
                }
                _ => {}
            }
        }
        Ok(response)
    }

    /// Parses an RSTR collection (or a bare RSTR) and returns the first
    /// response.
    ///
    /// ## Errors
    ///
    /// Fails with [`WstError::Codec`] when no response element is present.
    pub fn first_from(element: &XmlElement) -> WstResult<Self> {
        let rstr = element
            .find_by_local_name("RequestSecurityTokenResponse")
            .ok_or_else(|| {
                WstError::codec("payload contains no RequestSecurityTokenResponse")
            })?;
        Self::from_element(rstr)
    }
}

fn parse_lifetime(element: &XmlElement) -> WstResult<Lifetime> {
    let created = parse_instant(element, "Created")?;
    let expires = parse_instant(element, "Expires")?;
    Lifetime::new(created, expires)
}

fn parse_instant(lifetime: &XmlElement, local: &str) -> WstResult<DateTime<Utc>> {
    let text = lifetime
        .find_by_local_name(local)
        .and_then(|e| e.text.as_deref())
        .ok_or_else(|| WstError::codec(format!("Lifetime has no {local} instant")))?;
    DateTime::parse_from_rfc3339(text)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| WstError::codec(format!("malformed {local} instant: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn request_type_uri_round_trip() {
        for rt in [
            RequestType::Issue,
            RequestType::BatchIssue,
            RequestType::Renew,
            RequestType::Validate,
            RequestType::BatchValidate,
            RequestType::Cancel,
        ] {
            assert_eq!(RequestType::from_uri(rt.as_uri()), Some(rt));
        }
        assert_eq!(RequestType::from_uri("urn:not-a-request"), None);
    }

    #[test]
    fn lifetime_normalizes_to_utc() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let created = offset.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let expires = offset.with_ymd_and_hms(2026, 3, 1, 13, 0, 0).unwrap();
        let lifetime = Lifetime::new(created, expires).unwrap();
        assert_eq!(lifetime.created().timezone(), Utc);
        assert_eq!(lifetime.created().to_rfc3339(), "2026-03-01T10:00:00+00:00");
    }

    #[test]
    fn lifetime_rejects_inverted_range() {
        let now = Utc::now();
        let err = Lifetime::new(now, now - chrono::Duration::seconds(1)).unwrap_err();
        assert!(matches!(err, WstError::Validation(_)));
        // A zero-length lifetime is degenerate but not inverted.
        assert!(Lifetime::new(now, now).is_ok());
    }

    #[test]
    fn rst_requires_request_type() {
        let rst = RequestSecurityToken::new().with_token_type(constants::SAML2_TOKEN_TYPE);
        assert!(matches!(rst.to_element(), Err(WstError::Validation(_))));
    }

    #[test]
    fn rst_rejects_multiple_targets() {
        let token = XmlElement::new(QName::new(constants::SAML2_ASSERTION_NS, "Assertion"));
        let mut rst = RequestSecurityToken::new();
        rst.request_type = Some(RequestType::Validate);
        rst.validate_target = Some(token.clone());
        rst.cancel_target = Some(token);
        assert!(matches!(rst.to_element(), Err(WstError::Validation(_))));
    }

    #[test]
    fn rst_element_shape() {
        let mut rst = RequestSecurityToken::new()
            .with_token_type(constants::SAML2_TOKEN_TYPE)
            .with_applies_to("https://service.example.org")
            .with_on_behalf_of("jdoe");
        rst.request_type = Some(RequestType::Issue);
        rst.context = Some("ctx-1".to_string());

        let element = rst.to_element().unwrap();
        assert_eq!(element.attribute("Context"), Some("ctx-1"));
        assert_eq!(
            element
                .child(&QName::new(WST_NS, "RequestType"))
                .and_then(|e| e.text.as_deref()),
            Some(constants::ISSUE_REQUEST)
        );
        let address = element
            .find(&QName::new(WSA_NS, "Address"))
            .and_then(|e| e.text.as_deref());
        assert_eq!(address, Some("https://service.example.org"));
        let username = element
            .find(&QName::new(WSSE_NS, "Username"))
            .and_then(|e| e.text.as_deref());
        assert_eq!(username, Some("jdoe"));
    }

    fn rstr_with(children: Vec<XmlElement>) -> XmlElement {
        let mut rstr = XmlElement::new(QName::new(WST_NS, "RequestSecurityTokenResponse"));
        rstr.children = children;
        XmlElement::new(QName::new(WST_NS, "RequestSecurityTokenResponseCollection"))
            .with_child(rstr)
    }

    #[test]
    fn rstr_parses_requested_token() {
        let token = XmlElement::new(QName::new(constants::SAML2_ASSERTION_NS, "Assertion"))
            .with_attribute("ID", "_t1");
        let collection = rstr_with(vec![XmlElement::new(QName::new(
            WST_NS,
            "RequestedSecurityToken",
        ))
        .with_child(token.clone())]);

        let response = RequestSecurityTokenResponse::first_from(&collection).unwrap();
        assert_eq!(response.requested_token, Some(token));
    }

    #[test]
    fn rstr_parses_status() {
        let collection = rstr_with(vec![XmlElement::new(QName::new(WST_NS, "Status"))
            .with_child(
                XmlElement::new(QName::new(WST_NS, "Code"))
                    .with_text(constants::STATUS_CODE_VALID),
            )
            .with_child(
                XmlElement::new(QName::new(WST_NS, "Reason")).with_text("token is valid"),
            )]);

        let response = RequestSecurityTokenResponse::first_from(&collection).unwrap();
        let status = response.status.unwrap();
        assert!(status.is_valid());
        assert_eq!(status.reason.as_deref(), Some("token is valid"));
    }

    #[test]
    fn rstr_parses_cancelled_marker() {
        let collection = rstr_with(vec![XmlElement::new(QName::new(
            WST_NS,
            "RequestedTokenCancelled",
        ))]);
        let response = RequestSecurityTokenResponse::first_from(&collection).unwrap();
        assert!(response.token_cancelled);
    }

    #[test]
    fn rstr_missing_is_codec_error() {
        let stray = XmlElement::new(QName::new(WST_NS, "Status"));
        assert!(matches!(
            RequestSecurityTokenResponse::first_from(&stray),
            Err(WstError::Codec(_))
        ));
    }
}
