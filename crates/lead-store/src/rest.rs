//! Hosted database store. Inserts one row into a table exposed over the
//! PostgREST protocol (`POST /rest/v1/<table>` with a JSON array body).

use std::time::Duration;

use async_trait::async_trait;
use funnel_core::types::LeadRecord;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use tracing::{error, info};
use url::Url;

use crate::store::{LeadStore, StoreError};

pub struct RestLeadStore {
    client: reqwest::Client,
    endpoint: Url,
}

impl std::fmt::Debug for RestLeadStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestLeadStore")
            .field("endpoint", &self.endpoint.as_str())
            .finish()
    }
}

impl RestLeadStore {
    pub fn new(
        base_url: &str,
        api_key: &str,
        table: &str,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let endpoint = Url::parse(&base)
            .and_then(|u| u.join(&format!("rest/v1/{table}")))
            .map_err(|e| StoreError::Unavailable(format!("invalid store url '{base_url}': {e}")))?;

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key)
            .map_err(|_| StoreError::Unavailable("api key is not a valid header value".into()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| StoreError::Unavailable("api key is not a valid header value".into()))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert("Prefer", HeaderValue::from_static("return=minimal"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl LeadStore for RestLeadStore {
    async fn insert_lead(&self, lead: &LeadRecord) -> Result<(), StoreError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&[lead])
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!(email = %lead.email, status = status.as_u16(), "Lead inserted");
            return Ok(());
        }

        let message = response.text().await.unwrap_or_default();
        error!(status = status.as_u16(), body = %message, "Lead insert rejected");
        Err(StoreError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    fn name(&self) -> &'static str {
        "rest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use funnel_core::types::{Campaign, Challenge, TeamSize};

    fn sample_lead() -> LeadRecord {
        LeadRecord {
            email: "linus@example.com".into(),
            first_name: "Linus".into(),
            company_name: "Kernel Labs".into(),
            team_size: Some(TeamSize::UpTo50),
            challenges: vec![Challenge::Pipeline],
            campaigns: vec![Campaign::Content],
            challenge_custom: None,
            campaign_custom: None,
        }
    }

    #[test]
    fn test_endpoint_join() {
        let store = RestLeadStore::new(
            "https://db.example.com",
            "anon",
            "submissions",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(store.endpoint().as_str(), "https://db.example.com/rest/v1/submissions");
    }

    #[test]
    fn test_invalid_url() {
        let result = RestLeadStore::new("not a url", "anon", "submissions", Duration::from_secs(1));
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_insert_posts_row() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/v1/submissions")
            .match_header("apikey", "anon-key")
            .match_header("authorization", "Bearer anon-key")
            .match_header("prefer", "return=minimal")
            .match_body(mockito::Matcher::Json(serde_json::json!([{
                "email": "linus@example.com",
                "first_name": "Linus",
                "company_name": "Kernel Labs",
                "team_size": "21-50",
                "challenges": ["pipeline"],
                "campaigns": ["content"],
                "challenge_custom": null,
                "campaign_custom": null
            }])))
            .with_status(201)
            .create_async()
            .await;

        let store =
            RestLeadStore::new(&server.url(), "anon-key", "submissions", Duration::from_secs(5))
                .unwrap();
        store.insert_lead(&sample_lead()).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_insert_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/rest/v1/submissions")
            .with_status(409)
            .with_body(r#"{"message":"duplicate key"}"#)
            .create_async()
            .await;

        let store =
            RestLeadStore::new(&server.url(), "anon-key", "submissions", Duration::from_secs(5))
                .unwrap();
        let err = store.insert_lead(&sample_lead()).await.unwrap_err();
        match err {
            StoreError::Rejected { status, message } => {
                assert_eq!(status, 409);
                assert!(message.contains("duplicate key"));
            }
            other => panic!("Expected Rejected, got {:?}", other),
        }
    }
}
