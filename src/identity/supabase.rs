//! Supabase (GoTrue) identity provider client
//!
//! Callback URLs from the implicit flow carry the session in the fragment
//! (`access_token`, `refresh_token`, `expires_in`, `expires_at`,
//! `token_type`, `type`); failures arrive as `error`/`error_description` in
//! the fragment or query. The access token is confirmed against
//! `/auth/v1/user` before a session is handed out.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use log::debug;
use serde::Deserialize;
use std::collections::HashMap;
use url::Url;

use super::{AuthSession, AuthUser, IdentityProvider, ProviderError};
use crate::settings::IdentitySettings;

/// Used when the callback carries no expiry information
const DEFAULT_SESSION_SECONDS: i64 = 3600;
const MAX_SESSION_SECONDS: i64 = 60 * 60 * 24 * 365;

#[derive(Debug, Deserialize)]
struct SupabaseUser {
    id: String,
    email: Option<String>,
}

/// The error body shapes GoTrue uses across endpoints
#[derive(Debug, Default, Deserialize)]
struct SupabaseErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl SupabaseErrorBody {
    fn into_message(self) -> Option<String> {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
            .filter(|m| !m.trim().is_empty())
    }
}

/// Parameters from a callback URL; fragment values win over query values
#[derive(Debug, Default)]
pub(crate) struct CallbackParams(HashMap<String, String>);

impl CallbackParams {
    pub(crate) fn from_url(url: &Url) -> Self {
        let mut params: HashMap<String, String> = url.query_pairs().into_owned().collect();
        if let Some(fragment) = url.fragment() {
            params.extend(url::form_urlencoded::parse(fragment.as_bytes()).into_owned());
        }
        Self(params)
    }

    pub(crate) fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Provider-reported failure, preferring the human readable description
    pub(crate) fn error_message(&self) -> Option<String> {
        self.get("error_description")
            .or_else(|| self.get("error"))
            .map(ToString::to_string)
    }

    pub(crate) fn expires_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        if let Some(at) = self
            .get("expires_at")
            .and_then(|v| v.parse::<i64>().ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
        {
            return at;
        }

        let seconds = self
            .get("expires_in")
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|s| (0..=MAX_SESSION_SECONDS).contains(s))
            .unwrap_or(DEFAULT_SESSION_SECONDS);
        now + Duration::seconds(seconds)
    }
}

/// Identity provider backed by a Supabase project
pub struct SupabaseIdentityClient {
    base_url: String,
    anon_key: Option<String>,
    http_client: reqwest::Client,
}

impl SupabaseIdentityClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>, anon_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key,
            http_client: reqwest::Client::new(),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &IdentitySettings) -> Self {
        Self::new(settings.url.clone(), settings.get_anon_key())
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.anon_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    fn anon_key(&self) -> Result<&str, ProviderError> {
        self.anon_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ProviderError::Configuration("missing anon key".to_string()))
    }

    fn endpoint(&self, path: &str) -> Result<Url, ProviderError> {
        Url::parse(&format!("{}{path}", self.base_url))
            .map_err(|e| ProviderError::Configuration(format!("invalid identity url: {e}")))
    }

    async fn fetch_user(&self, access_token: &str) -> Result<AuthUser, ProviderError> {
        let url = self.endpoint("/auth/v1/user")?;
        let response = self
            .http_client
            .get(url)
            .header("apikey", self.anon_key()?)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::failure_from_response(response).await);
        }

        let user: SupabaseUser = response
            .json()
            .await
            .map_err(|e| ProviderError::Transport(format!("invalid user response: {e}")))?;

        Ok(AuthUser {
            id: user.id,
            email: user.email,
        })
    }

    /// Map a non-success response: a message in the body is a provider-reported failure
    async fn failure_from_response(response: reqwest::Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        debug!("Identity provider returned {status}: {body}");

        serde_json::from_str::<SupabaseErrorBody>(&body)
            .ok()
            .and_then(SupabaseErrorBody::into_message)
            .map_or_else(
                || ProviderError::Transport(format!("identity provider returned {status}")),
                ProviderError::Reported,
            )
    }
}

#[async_trait]
impl IdentityProvider for SupabaseIdentityClient {
    async fn session_from_url(
        &self,
        callback_url: &Url,
    ) -> Result<Option<AuthSession>, ProviderError> {
        let params = CallbackParams::from_url(callback_url);

        if let Some(message) = params.error_message() {
            return Err(ProviderError::Reported(message));
        }

        let Some(access_token) = params.get("access_token") else {
            debug!("Callback URL carries no session");
            return Ok(None);
        };

        let user = self.fetch_user(access_token).await?;

        Ok(Some(AuthSession {
            access_token: access_token.to_string(),
            refresh_token: params.get("refresh_token").map(ToString::to_string),
            token_type: params.get("token_type").unwrap_or("bearer").to_string(),
            expires_at: params.expires_at(Utc::now()),
            user,
        }))
    }

    fn authorize_url(&self, provider: &str, redirect_to: &str) -> Result<String, ProviderError> {
        let mut url = self.endpoint("/auth/v1/authorize")?;
        url.query_pairs_mut()
            .append_pair("provider", provider)
            .append_pair("redirect_to", redirect_to);
        Ok(url.into())
    }

    async fn request_password_recovery(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), ProviderError> {
        let mut url = self.endpoint("/auth/v1/recover")?;
        url.query_pairs_mut().append_pair("redirect_to", redirect_to);

        let response = self
            .http_client
            .post(url)
            .header("apikey", self.anon_key()?)
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::failure_from_response(response).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> SupabaseIdentityClient {
        SupabaseIdentityClient::new("https://project.supabase.co/", Some("anon".to_string()))
    }

    async fn user_endpoint(template: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("apikey", "anon"))
            .and(header("authorization", "Bearer abc"))
            .respond_with(template)
            .expect(1)
            .mount(&server)
            .await;
        server
    }

    #[actix_web::test]
    async fn test_token_confirmed_into_session() {
        let server = user_endpoint(ResponseTemplate::new(200).set_body_json(json!({
            "id": "3f1c2a9e",
            "email": "reader@daringdifferent.com",
            "role": "authenticated"
        })))
        .await;
        let client = SupabaseIdentityClient::new(server.uri(), Some("anon".to_string()));

        let url = Url::parse(
            "https://daringdifferent.com/auth/callback#access_token=abc&refresh_token=r1&expires_at=1700003600&token_type=bearer",
        )
        .unwrap();
        let session = client.session_from_url(&url).await.unwrap().unwrap();

        assert_eq!(session.access_token, "abc");
        assert_eq!(session.refresh_token.as_deref(), Some("r1"));
        assert_eq!(session.token_type, "bearer");
        assert_eq!(session.expires_at.timestamp(), 1_700_003_600);
        assert_eq!(session.user.id, "3f1c2a9e");
        assert_eq!(
            session.user.email.as_deref(),
            Some("reader@daringdifferent.com")
        );
    }

    #[actix_web::test]
    async fn test_rejected_token_is_reported_failure() {
        let server = user_endpoint(ResponseTemplate::new(401).set_body_json(json!({
            "code": 401,
            "msg": "invalid JWT: token is expired"
        })))
        .await;
        let client = SupabaseIdentityClient::new(server.uri(), Some("anon".to_string()));

        let url = Url::parse("https://daringdifferent.com/auth/callback#access_token=abc").unwrap();
        let err = client.session_from_url(&url).await.unwrap_err();
        assert!(err.is_reported());
        assert_eq!(err.to_string(), "invalid JWT: token is expired");
    }

    #[actix_web::test]
    async fn test_unreadable_error_body_is_transport_failure() {
        let server = user_endpoint(ResponseTemplate::new(502).set_body_string("<html>")).await;
        let client = SupabaseIdentityClient::new(server.uri(), Some("anon".to_string()));

        let url = Url::parse("https://daringdifferent.com/auth/callback#access_token=abc").unwrap();
        let err = client.session_from_url(&url).await.unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
        assert_eq!(err.to_string(), "identity provider returned 502 Bad Gateway");
    }

    #[actix_web::test]
    async fn test_password_recovery_request_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/recover"))
            .and(query_param(
                "redirect_to",
                "https://daringdifferent.com/auth/callback",
            ))
            .and(header("apikey", "anon"))
            .and(body_json(json!({ "email": "reader@daringdifferent.com" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;
        let client = SupabaseIdentityClient::new(server.uri(), Some("anon".to_string()));

        client
            .request_password_recovery(
                "reader@daringdifferent.com",
                "https://daringdifferent.com/auth/callback",
            )
            .await
            .unwrap();
    }

    #[actix_web::test]
    async fn test_password_recovery_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/recover"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "code": 429,
                "error_code": "over_email_send_rate_limit",
                "msg": "email rate limit exceeded"
            })))
            .mount(&server)
            .await;
        let client = SupabaseIdentityClient::new(server.uri(), Some("anon".to_string()));

        let err = client
            .request_password_recovery("reader@daringdifferent.com", "https://daringdifferent.com")
            .await
            .unwrap_err();
        assert!(err.is_reported());
        assert_eq!(err.to_string(), "email rate limit exceeded");
    }

    #[actix_web::test]
    async fn test_reported_error_in_fragment() {
        let url = Url::parse(
            "https://daringdifferent.com/auth/callback#error=access_denied&error_code=otp_expired&error_description=Email+link+is+invalid+or+has+expired",
        )
        .unwrap();

        let err = client().session_from_url(&url).await.unwrap_err();
        assert!(err.is_reported());
        assert_eq!(err.to_string(), "Email link is invalid or has expired");
    }

    #[actix_web::test]
    async fn test_reported_error_in_query_without_description() {
        let url =
            Url::parse("https://daringdifferent.com/auth/callback?error=server_error").unwrap();
        let err = client().session_from_url(&url).await.unwrap_err();
        assert_eq!(err.to_string(), "server_error");
    }

    #[actix_web::test]
    async fn test_no_token_means_no_session() {
        let url = Url::parse("https://daringdifferent.com/auth/callback").unwrap();
        assert_eq!(client().session_from_url(&url).await.unwrap(), None);

        let url = Url::parse("https://daringdifferent.com/auth/callback#type=signup").unwrap();
        assert_eq!(client().session_from_url(&url).await.unwrap(), None);
    }

    #[actix_web::test]
    async fn test_token_without_anon_key_is_configuration_error() {
        let client = SupabaseIdentityClient::new("https://project.supabase.co", None);
        assert!(!client.is_configured());

        let url =
            Url::parse("https://daringdifferent.com/auth/callback#access_token=abc").unwrap();
        let err = client.session_from_url(&url).await.unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
    }

    #[test]
    fn test_authorize_url() {
        let url = client()
            .authorize_url("google", "https://daringdifferent.com/auth/callback")
            .unwrap();
        assert_eq!(
            url,
            "https://project.supabase.co/auth/v1/authorize?provider=google&redirect_to=https%3A%2F%2Fdaringdifferent.com%2Fauth%2Fcallback"
        );
    }

    #[test]
    fn test_fragment_overrides_query() {
        let url =
            Url::parse("https://x.test/cb?token_type=query&a=1#token_type=fragment").unwrap();
        let params = CallbackParams::from_url(&url);
        assert_eq!(params.get("token_type"), Some("fragment"));
        assert_eq!(params.get("a"), Some("1"));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn test_expiry_resolution() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();

        let url = Url::parse("https://x.test/cb#expires_at=1700003600&expires_in=10").unwrap();
        assert_eq!(
            CallbackParams::from_url(&url).expires_at(now).timestamp(),
            1_700_003_600
        );

        let url = Url::parse("https://x.test/cb#expires_in=120").unwrap();
        assert_eq!(
            CallbackParams::from_url(&url).expires_at(now).timestamp(),
            1_700_000_120
        );

        let url = Url::parse("https://x.test/cb#expires_in=soon").unwrap();
        assert_eq!(
            CallbackParams::from_url(&url).expires_at(now).timestamp(),
            1_700_003_600
        );
    }

    #[test]
    fn test_error_body_message_priority() {
        let body: SupabaseErrorBody =
            serde_json::from_str(r#"{"msg":"Invalid JWT","error":"unauthorized"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Invalid JWT"));

        let body: SupabaseErrorBody = serde_json::from_str(r#"{"message":""}"#).unwrap();
        assert_eq!(body.into_message(), None);
    }
}
