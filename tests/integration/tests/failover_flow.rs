//! Failover behavior of the multi-endpoint client against the stub STS.

use std::sync::Arc;

use wst_client::failover::WsTrustClient;
use wst_client::pool::StsClientPool;
use wst_core::credential::{Password, SecurityInfo};
use wst_core::error::WstError;

use crate::common::{init_tracing, StubSts};

const ENDPOINTS: [&str; 3] = [
    "https://sts0.example.org/sts",
    "https://sts1.example.org/sts",
    "https://sts2.example.org/sts",
];

fn failover_client(sts: Arc<StubSts>) -> (WsTrustClient, Arc<StsClientPool>) {
    let pool = Arc::new(StsClientPool::with_default_capacity(sts));
    let client = WsTrustClient::new(
        Arc::clone(&pool),
        "SecurityTokenService",
        "SecurityTokenServicePort",
        &ENDPOINTS,
        SecurityInfo::new("admin", Password::new("admin-secret")),
    )
    .expect("valid failover client");
    (client, pool)
}

#[tokio::test]
async fn issue_fails_over_past_downed_endpoints() -> anyhow::Result<()> {
    init_tracing();
    let sts = StubSts::new();
    sts.take_down(ENDPOINTS[0]);
    sts.take_down(ENDPOINTS[1]);
    let (client, pool) = failover_client(Arc::clone(&sts));

    let token = client
        .issue_token_for_type(wst_core::constants::SAML2_TOKEN_TYPE)
        .await?;
    assert!(sts.honors(token.attribute("ID").expect("assertion ID")));

    // Endpoints were attempted strictly in construction order.
    assert_eq!(sts.contacted(), ENDPOINTS.to_vec());
    // One pool entry exists per endpoint and every borrow was returned.
    assert_eq!(pool.registered_configs(), 3);
    Ok(())
}

#[tokio::test]
async fn issued_token_validates_through_surviving_endpoint() -> anyhow::Result<()> {
    init_tracing();
    let sts = StubSts::new();
    sts.take_down(ENDPOINTS[0]);
    let (client, _pool) = failover_client(Arc::clone(&sts));

    let token = client
        .issue_token_for_type(wst_core::constants::SAML2_TOKEN_TYPE)
        .await?;
    assert!(client.validate_token(&token).await?);
    assert!(client.cancel_token(&token).await?);
    assert!(!client.validate_token(&token).await?);
    Ok(())
}

#[tokio::test]
async fn all_endpoints_down_propagates_connection_failure() {
    init_tracing();
    let sts = StubSts::new();
    for endpoint in ENDPOINTS {
        sts.take_down(endpoint);
    }
    let (client, _pool) = failover_client(Arc::clone(&sts));

    let err = client
        .issue_token_for_type(wst_core::constants::SAML2_TOKEN_TYPE)
        .await
        .unwrap_err();
    assert!(err.is_connection_failure());
    assert!(matches!(err, WstError::Transport(_)));
    assert_eq!(sts.contacted(), ENDPOINTS.to_vec());
}
