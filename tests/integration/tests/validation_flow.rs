//! Issue-then-validate flows across client, pool, and handler.

use std::sync::Arc;

use wst_client::pool::StsClientPool;
use wst_core::constants::{QName, WSSE_NS};
use wst_core::soap::{MessageContext, SoapEnvelope};
use wst_core::token::XmlElement;
use wst_handler::{FaultCode, Saml2Variant, SecurityHandler, VariantRegistry};

use crate::common::{config_for, init_tracing, StubSts};

const ENDPOINT: &str = "https://sts.example.org/sts";

fn secured(token: XmlElement) -> MessageContext {
    MessageContext::inbound(
        SoapEnvelope::new()
            .with_header_element(
                XmlElement::new(QName::new(WSSE_NS, "Security")).with_child(token),
            )
            .with_body_element(XmlElement::new(QName::unqualified("Ping"))),
    )
}

#[tokio::test]
async fn issued_token_passes_handler_validation() -> anyhow::Result<()> {
    init_tracing();
    let sts = StubSts::new();
    let pool = Arc::new(StsClientPool::with_default_capacity(sts.clone()));
    let config = config_for(ENDPOINT);
    pool.create_pool(&config)?;

    // A service client obtains a token from the STS.
    let client = pool.get_client(&config).await?;
    let token = client
        .issue_token_for_type(wst_core::constants::SAML2_TOKEN_TYPE)
        .await?;
    drop(client);

    // The receiving service's handler validates it against the same STS.
    let variant = VariantRegistry::default()
        .resolve("saml2")
        .expect("built-in variant");
    let handler = SecurityHandler::new(Arc::clone(&pool), config.clone(), variant);
    handler.handle_message(&secured(token)).await?;

    // Both exchanges went through one pooled client, now idle again.
    assert_eq!(pool.registered_configs(), 1);
    assert_eq!(pool.idle_count(&config), 1);
    Ok(())
}

#[tokio::test]
async fn unknown_token_is_rejected_by_handler() -> anyhow::Result<()> {
    init_tracing();
    let sts = StubSts::new();
    let pool = Arc::new(StsClientPool::with_default_capacity(sts));
    let config = config_for(ENDPOINT);
    pool.create_pool(&config)?;

    let forged = XmlElement::new(QName::new(
        wst_core::constants::SAML2_ASSERTION_NS,
        "Assertion",
    ))
    .with_attribute("ID", "assertion-forged");

    let handler = SecurityHandler::new(
        Arc::clone(&pool),
        config,
        Arc::new(Saml2Variant::new()),
    );
    let fault = handler.handle_message(&secured(forged)).await.unwrap_err();
    assert_eq!(fault.code, FaultCode::FailedAuthentication);
    Ok(())
}

#[tokio::test]
async fn token_lifecycle_issue_renew_cancel() -> anyhow::Result<()> {
    init_tracing();
    let sts = StubSts::new();
    let pool = Arc::new(StsClientPool::with_default_capacity(sts.clone()));
    let config = config_for(ENDPOINT);
    pool.create_pool(&config)?;

    let client = pool.get_client(&config).await?;

    let token = client
        .issue_token_for_type(wst_core::constants::SAML2_TOKEN_TYPE)
        .await?;
    assert!(client.validate_token(&token).await?);

    // Renewal supersedes the old token.
    let renewed = client
        .renew_token(wst_core::constants::SAML2_TOKEN_TYPE, &token)
        .await?;
    assert!(!client.validate_token(&token).await?);
    assert!(client.validate_token(&renewed).await?);

    // Cancellation is confirmed once and terminal.
    assert!(client.cancel_token(&renewed).await?);
    assert!(!client.validate_token(&renewed).await?);
    assert!(!client.cancel_token(&renewed).await?);

    let renewed_id = renewed.attribute("ID").expect("assertion ID");
    assert!(!sts.honors(renewed_id));
    Ok(())
}
