//! Starling Bank API service
//!
//! Every authenticated call reads the access token from the credential
//! store, sends it as a bearer token and decodes the JSON response. A 403
//! whose body says `invalid_token` triggers one refresh-token exchange and
//! one retry of the whole call.
//!
//! Refreshes are single-flight: callers that were rejected with the same
//! token share one exchange. Each completed refresh advances a generation
//! counter; a caller that observes a newer generation than the one it sent
//! its request under skips straight to the retry.

use std::error::Error as StdError;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use allsee_common::{CredentialStore, KeychainError, KeychainProvider};
use allsee_domain::constants::{
    ACCESS_TOKEN_IDENTIFIER, ACCOUNTS_PATH, FORM_CONTENT_TYPE, INDIVIDUAL_PATH,
    INVALID_TOKEN_ERROR, INVALID_TOKEN_STATUS, KEYCHAIN_SERVICE, REFRESH_GRANT_TYPE,
    REFRESH_REJECTED_STATUS, REFRESH_TOKEN_IDENTIFIER,
};
use allsee_domain::{
    AccountsList, AllSeeError, ApiConfig, ApiErrorBody, Balance, IndividualInfo, TokenPair,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::errors::ApiError;
use crate::http::{Headers, HttpClient, HttpTransport, NetworkError};

/// Banking operations available to the presentation layer
#[async_trait]
pub trait BankApiService: Send + Sync {
    /// Accounts held by the signed-in account holder
    async fn fetch_accounts(&self) -> Result<AccountsList, ApiError>;

    /// Personal details of the signed-in account holder
    async fn fetch_individual_information(&self) -> Result<IndividualInfo, ApiError>;

    /// Balance of one account
    async fn fetch_account_balance(&self, account_uid: &str) -> Result<Balance, ApiError>;

    /// Exchange the stored refresh token for a new token pair and persist it
    async fn refresh_access_token(&self) -> Result<(), ApiError>;

    /// Persist a freshly issued token pair (sign-in)
    fn store_credentials(&self, access_token: &str, refresh_token: &str) -> Result<(), ApiError>;

    /// Remove both tokens (sign-out); succeeds when nothing is stored
    fn clear_credentials(&self) -> Result<(), ApiError>;
}

/// Generic token lookup failure, remapped by every caller
#[derive(Debug)]
enum TokenLookupError {
    MissingToken,
    Unreadable(Box<dyn StdError + Send + Sync>),
}

impl TokenLookupError {
    fn into_api_error(self, missing: ApiError) -> ApiError {
        match self {
            Self::MissingToken => missing,
            Self::Unreadable(cause) => ApiError::UnknownError(cause),
        }
    }
}

/// A token that cannot be sent in an `Authorization` header
#[derive(Debug)]
struct TokenEncodingError {
    label: &'static str,
    reason: &'static str,
}

impl fmt::Display for TokenEncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.reason)
    }
}

impl StdError for TokenEncodingError {}

/// [`BankApiService`] backed by the Starling Bank API
pub struct StarlingBankApiService {
    transport: Arc<dyn HttpTransport>,
    store: Arc<dyn CredentialStore>,
    config: ApiConfig,
    namespace: String,
    refresh_gate: Mutex<()>,
    refresh_generation: AtomicU64,
}

impl StarlingBankApiService {
    /// Create a service over an injected transport and credential store
    ///
    /// Tokens are stored under the application's keychain namespace; use
    /// [`with_namespace`](Self::with_namespace) to isolate them.
    pub fn new(
        config: ApiConfig,
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            transport,
            store,
            config,
            namespace: KEYCHAIN_SERVICE.to_string(),
            refresh_gate: Mutex::new(()),
            refresh_generation: AtomicU64::new(0),
        }
    }

    /// Production wiring: reqwest transport and the OS keychain
    ///
    /// # Errors
    /// Returns `AllSeeError::Config` if the HTTP client cannot be built
    pub fn from_config(config: ApiConfig) -> Result<Self, AllSeeError> {
        let transport = HttpClient::from_config(&config)?;
        Ok(Self::new(config, Arc::new(transport), Arc::new(KeychainProvider::new())))
    }

    /// Store tokens under a different namespace
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// GET `path` with the stored access token, refreshing once on
    /// `invalid_token`.
    async fn authenticated_get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.config.endpoint(path);
        let mut refreshed = false;

        loop {
            let generation = self.refresh_generation.load(Ordering::Acquire);
            let token = self
                .token(ACCESS_TOKEN_IDENTIFIER)
                .map_err(|e| e.into_api_error(ApiError::MissingAccessToken))?;

            match self.transport.get(&url, &bearer_headers(&token)).await {
                Ok(body) => return Ok(serde_json::from_slice(&body)?),
                Err(err) if is_invalid_token(&err) => {
                    if refreshed {
                        warn!(url = %url, "Access token rejected again after refresh");
                        return Err(ApiError::InvalidToken);
                    }
                    debug!(url = %url, "Access token rejected, refreshing");
                    self.refresh_after(generation).await?;
                    refreshed = true;
                }
                Err(err) => {
                    debug!(url = %url, error = %err, "Authenticated request failed");
                    return Err(ApiError::InvalidResponse(err));
                }
            }
        }
    }

    /// Refresh unless another caller already did since `seen_generation`.
    async fn refresh_after(&self, seen_generation: u64) -> Result<(), ApiError> {
        let _gate = self.refresh_gate.lock().await;

        if self.refresh_generation.load(Ordering::Acquire) != seen_generation {
            debug!("Token refreshed by a concurrent call, skipping exchange");
            return Ok(());
        }

        self.exchange_refresh_token().await
    }

    /// Token exchange proper; callers hold the refresh gate.
    async fn exchange_refresh_token(&self) -> Result<(), ApiError> {
        let refresh_token = self
            .token(REFRESH_TOKEN_IDENTIFIER)
            .map_err(|e| e.into_api_error(ApiError::MissingRefreshToken))?;

        let form = vec![
            ("refresh_token".to_string(), refresh_token),
            ("client_id".to_string(), self.config.client_id.clone()),
            ("client_secret".to_string(), self.config.client_secret.clone()),
            ("grant_type".to_string(), REFRESH_GRANT_TYPE.to_string()),
        ];
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string());

        let body = match self.transport.post(&self.config.token_url, &headers, &form).await {
            Ok(body) => body,
            Err(NetworkError::BadServerResponse { status_code: REFRESH_REJECTED_STATUS, body }) => {
                let rejection =
                    body.as_deref().and_then(ApiErrorBody::parse).unwrap_or_else(ApiErrorBody::unknown);
                warn!(error = %rejection.error, "Refresh token rejected");
                return Err(ApiError::CouldNotRefreshToken {
                    error: rejection.error,
                    description: rejection.error_description,
                });
            }
            Err(err) => {
                debug!(error = %err, "Token exchange failed");
                return Err(ApiError::InvalidResponse(err));
            }
        };

        let pair: TokenPair = serde_json::from_slice(&body)?;
        let access = encode_token("access_token", &pair.access_token).map_err(refresh_rejection)?;
        let refresh =
            encode_token("refresh_token", &pair.refresh_token).map_err(refresh_rejection)?;

        self.persist_tokens(&access, &refresh)?;
        info!(expires_in = pair.expires_in, token_type = %pair.token_type, "Access token refreshed");
        Ok(())
    }

    /// Upsert the refresh token, then the access token, and advance the
    /// generation. A failed write leaves earlier writes in place.
    fn persist_tokens(&self, access: &[u8], refresh: &[u8]) -> Result<(), ApiError> {
        self.store.upsert(refresh, REFRESH_TOKEN_IDENTIFIER, &self.namespace).map_err(store_error)?;
        self.store.upsert(access, ACCESS_TOKEN_IDENTIFIER, &self.namespace).map_err(store_error)?;
        self.refresh_generation.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    fn token(&self, identifier: &str) -> Result<String, TokenLookupError> {
        match self.store.get(identifier, &self.namespace) {
            Ok(secret) => {
                String::from_utf8(secret).map_err(|e| TokenLookupError::Unreadable(Box::new(e)))
            }
            Err(KeychainError::ItemNotFound) => Err(TokenLookupError::MissingToken),
            Err(e) => Err(TokenLookupError::Unreadable(Box::new(e))),
        }
    }
}

#[async_trait]
impl BankApiService for StarlingBankApiService {
    #[instrument(skip(self))]
    async fn fetch_accounts(&self) -> Result<AccountsList, ApiError> {
        let accounts: AccountsList = self.authenticated_get(ACCOUNTS_PATH).await?;
        debug!(count = accounts.accounts.len(), "Fetched accounts");
        Ok(accounts)
    }

    #[instrument(skip(self))]
    async fn fetch_individual_information(&self) -> Result<IndividualInfo, ApiError> {
        self.authenticated_get(INDIVIDUAL_PATH).await
    }

    #[instrument(skip(self))]
    async fn fetch_account_balance(&self, account_uid: &str) -> Result<Balance, ApiError> {
        self.authenticated_get(&format!("{ACCOUNTS_PATH}/{account_uid}/balance")).await
    }

    #[instrument(skip(self))]
    async fn refresh_access_token(&self) -> Result<(), ApiError> {
        let _gate = self.refresh_gate.lock().await;
        self.exchange_refresh_token().await
    }

    fn store_credentials(&self, access_token: &str, refresh_token: &str) -> Result<(), ApiError> {
        let access = encode_token("access_token", access_token)
            .map_err(|e| ApiError::UnknownError(Box::new(e)))?;
        let refresh = encode_token("refresh_token", refresh_token)
            .map_err(|e| ApiError::UnknownError(Box::new(e)))?;

        self.persist_tokens(&access, &refresh)?;
        info!(namespace = %self.namespace, "Stored credentials");
        Ok(())
    }

    fn clear_credentials(&self) -> Result<(), ApiError> {
        // Both deletes always run; the first failure is reported.
        let access = self.store.delete(ACCESS_TOKEN_IDENTIFIER, &self.namespace);
        let refresh = self.store.delete(REFRESH_TOKEN_IDENTIFIER, &self.namespace);
        access.and(refresh).map_err(store_error)?;

        info!(namespace = %self.namespace, "Cleared credentials");
        Ok(())
    }
}

fn bearer_headers(token: &str) -> Headers {
    let mut headers = Headers::new();
    headers.insert("Authorization".to_string(), format!("Bearer {token}"));
    headers
}

/// 403 with an `invalid_token` error body
fn is_invalid_token(err: &NetworkError) -> bool {
    err.status_code() == Some(INVALID_TOKEN_STATUS)
        && err
            .body()
            .and_then(ApiErrorBody::parse)
            .is_some_and(|body| body.error == INVALID_TOKEN_ERROR)
}

/// Raw bytes of a token, which must be non-empty visible ASCII.
fn encode_token(label: &'static str, token: &str) -> Result<Vec<u8>, TokenEncodingError> {
    if token.is_empty() {
        return Err(TokenEncodingError { label, reason: "token is empty" });
    }
    if !token.bytes().all(|b| b.is_ascii_graphic()) {
        return Err(TokenEncodingError {
            label,
            reason: "token contains characters outside visible ASCII",
        });
    }
    Ok(token.as_bytes().to_vec())
}

fn refresh_rejection(err: TokenEncodingError) -> ApiError {
    ApiError::CouldNotRefreshToken {
        error: err.label.to_string(),
        description: err.reason.to_string(),
    }
}

fn store_error(err: KeychainError) -> ApiError {
    warn!(error = %err, "Credential store write failed");
    ApiError::UnknownError(Box::new(err))
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;

    use allsee_common::testing::MockKeychainProvider;

    use super::*;

    const ACCOUNTS_JSON: &str = r#"{
        "accounts": [{
            "accountUid": "9a1e1f3c-0001",
            "accountType": "PRIMARY",
            "defaultCategory": "c0ffee00-0002",
            "currency": "GBP",
            "createdAt": "2024-03-01T10:15:30.000Z",
            "name": "Personal"
        }]
    }"#;

    const FRESH_TOKEN_JSON: &str = r#"{
        "access_token": "new-access",
        "refresh_token": "new-refresh",
        "token_type": "Bearer",
        "expires_in": 86400,
        "scope": "account:read"
    }"#;

    const INVALID_TOKEN_BODY: &str =
        r#"{"error":"invalid_token","error_description":"Might it be expired?"}"#;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Get { url: String, authorization: Option<String> },
        Post { url: String, content_type: Option<String>, form: Vec<(String, String)> },
    }

    /// Transport answering from a script, in order
    #[derive(Default)]
    struct ScriptedTransport {
        responses: StdMutex<VecDeque<Result<Vec<u8>, NetworkError>>>,
        calls: StdMutex<Vec<Call>>,
    }

    impl ScriptedTransport {
        fn new(responses: Vec<Result<Vec<u8>, NetworkError>>) -> Arc<Self> {
            Arc::new(Self { responses: StdMutex::new(responses.into()), calls: StdMutex::default() })
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn get_count(&self) -> usize {
            self.calls().iter().filter(|c| matches!(c, Call::Get { .. })).count()
        }

        fn post_count(&self) -> usize {
            self.calls().iter().filter(|c| matches!(c, Call::Post { .. })).count()
        }

        fn next(&self) -> Result<Vec<u8>, NetworkError> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(NetworkError::UnknownError("script exhausted".into())))
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn get(&self, url: &str, headers: &Headers) -> Result<Vec<u8>, NetworkError> {
            self.calls.lock().unwrap().push(Call::Get {
                url: url.to_string(),
                authorization: headers.get("Authorization").cloned(),
            });
            self.next()
        }

        async fn post(
            &self,
            url: &str,
            headers: &Headers,
            form: &[(String, String)],
        ) -> Result<Vec<u8>, NetworkError> {
            self.calls.lock().unwrap().push(Call::Post {
                url: url.to_string(),
                content_type: headers.get("Content-Type").cloned(),
                form: form.to_vec(),
            });
            self.next()
        }
    }

    fn ok(body: &str) -> Result<Vec<u8>, NetworkError> {
        Ok(body.as_bytes().to_vec())
    }

    fn rejected(status_code: u16, body: &str) -> Result<Vec<u8>, NetworkError> {
        Err(NetworkError::BadServerResponse { status_code, body: Some(body.as_bytes().to_vec()) })
    }

    fn config() -> ApiConfig {
        ApiConfig::new("client-id", "client-secret")
            .with_base_url("https://bank.test/api/v2")
            .with_token_url("https://bank.test/oauth/access-token")
    }

    struct Fixture {
        service: StarlingBankApiService,
        transport: Arc<ScriptedTransport>,
        store: MockKeychainProvider,
        namespace: String,
    }

    impl Fixture {
        fn new(responses: Vec<Result<Vec<u8>, NetworkError>>) -> Self {
            let namespace = format!("AllSeeTest.{}", uuid::Uuid::new_v4());
            let transport = ScriptedTransport::new(responses);
            let store = MockKeychainProvider::new();
            let service =
                StarlingBankApiService::new(config(), transport.clone(), Arc::new(store.clone()))
                    .with_namespace(&namespace);
            Self { service, transport, store, namespace }
        }

        fn with_tokens(self, access: &str, refresh: &str) -> Self {
            self.store.insert(access.as_bytes(), ACCESS_TOKEN_IDENTIFIER, &self.namespace).unwrap();
            self.store.insert(refresh.as_bytes(), REFRESH_TOKEN_IDENTIFIER, &self.namespace).unwrap();
            self.store.clear_operations();
            self
        }

        fn stored(&self, identifier: &str) -> Option<String> {
            self.store.secret_string(identifier, &self.namespace)
        }
    }

    #[tokio::test]
    async fn missing_access_token_never_reaches_transport() {
        let fixture = Fixture::new(vec![]);

        let accounts = fixture.service.fetch_accounts().await;
        let individual = fixture.service.fetch_individual_information().await;

        assert!(matches!(accounts, Err(ApiError::MissingAccessToken)));
        assert!(matches!(individual, Err(ApiError::MissingAccessToken)));
        assert!(fixture.transport.calls().is_empty());
    }

    #[tokio::test]
    async fn fetch_accounts_sends_bearer_token_and_decodes_payload() {
        let fixture = Fixture::new(vec![ok(ACCOUNTS_JSON)]).with_tokens("access-1", "refresh-1");

        let list = fixture.service.fetch_accounts().await.unwrap();

        assert_eq!(list.accounts.len(), 1);
        let account = &list.accounts[0];
        assert_eq!(account.account_uid, "9a1e1f3c-0001");
        assert_eq!(account.account_type, "PRIMARY");
        assert_eq!(account.default_category, "c0ffee00-0002");
        assert_eq!(account.currency, "GBP");
        assert_eq!(account.created_at, "2024-03-01T10:15:30.000Z");
        assert_eq!(account.name, "Personal");
        assert_eq!(
            fixture.transport.calls(),
            vec![Call::Get {
                url: "https://bank.test/api/v2/accounts".into(),
                authorization: Some("Bearer access-1".into()),
            }]
        );
    }

    #[tokio::test]
    async fn fetch_individual_information_uses_account_holder_endpoint() {
        let body = r#"{
            "title": "Ms",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "dateOfBirth": "1815-12-10",
            "email": "ada@example.com",
            "phone": "+440000000000"
        }"#;
        let fixture = Fixture::new(vec![ok(body)]).with_tokens("access-1", "refresh-1");

        let info = fixture.service.fetch_individual_information().await.unwrap();

        assert_eq!(info.first_name, "Ada");
        assert_eq!(info.date_of_birth, "1815-12-10");
        assert!(matches!(
            &fixture.transport.calls()[0],
            Call::Get { url, .. } if url == "https://bank.test/api/v2/account-holder/individual"
        ));
    }

    #[tokio::test]
    async fn fetch_account_balance_targets_account() {
        let amount = |units: i64| format!(r#"{{"currency":"GBP","minorUnits":{units}}}"#);
        let body = format!(
            r#"{{"clearedBalance":{a},"effectiveBalance":{a},"pendingTransactions":{z},
                "acceptedOverdraft":{z},"amount":{a},"totalClearedBalance":{a},
                "totalEffectiveBalance":{a}}}"#,
            a = amount(12_345),
            z = amount(0)
        );
        let fixture = Fixture::new(vec![ok(&body)]).with_tokens("access-1", "refresh-1");

        let balance = fixture.service.fetch_account_balance("acc-42").await.unwrap();

        assert_eq!(balance.cleared_balance.minor_units, 12_345);
        assert_eq!(balance.pending_transactions.minor_units, 0);
        assert!(matches!(
            &fixture.transport.calls()[0],
            Call::Get { url, .. } if url == "https://bank.test/api/v2/accounts/acc-42/balance"
        ));
    }

    #[tokio::test]
    async fn invalid_token_refreshes_and_retries_once() {
        let fixture = Fixture::new(vec![
            rejected(403, INVALID_TOKEN_BODY),
            ok(FRESH_TOKEN_JSON),
            ok(ACCOUNTS_JSON),
        ])
        .with_tokens("stale-access", "refresh-1");

        let list = fixture.service.fetch_accounts().await.unwrap();

        assert_eq!(list.accounts[0].name, "Personal");
        assert_eq!(fixture.stored(ACCESS_TOKEN_IDENTIFIER).as_deref(), Some("new-access"));
        assert_eq!(fixture.stored(REFRESH_TOKEN_IDENTIFIER).as_deref(), Some("new-refresh"));

        let calls = fixture.transport.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(
            calls[1],
            Call::Post {
                url: "https://bank.test/oauth/access-token".into(),
                content_type: Some(FORM_CONTENT_TYPE.into()),
                form: vec![
                    ("refresh_token".into(), "refresh-1".into()),
                    ("client_id".into(), "client-id".into()),
                    ("client_secret".into(), "client-secret".into()),
                    ("grant_type".into(), "refresh_token".into()),
                ],
            }
        );
        assert!(matches!(
            &calls[2],
            Call::Get { authorization: Some(auth), .. } if auth == "Bearer new-access"
        ));
    }

    #[tokio::test]
    async fn second_invalid_token_stops_after_one_retry() {
        let fixture = Fixture::new(vec![
            rejected(403, INVALID_TOKEN_BODY),
            ok(FRESH_TOKEN_JSON),
            rejected(403, INVALID_TOKEN_BODY),
        ])
        .with_tokens("stale-access", "refresh-1");

        let result = fixture.service.fetch_accounts().await;

        assert!(matches!(result, Err(ApiError::InvalidToken)));
        assert_eq!(fixture.transport.get_count(), 2);
        assert_eq!(fixture.transport.post_count(), 1);
    }

    #[tokio::test]
    async fn retry_failure_propagates_without_another_attempt() {
        let fixture = Fixture::new(vec![
            rejected(403, INVALID_TOKEN_BODY),
            ok(FRESH_TOKEN_JSON),
            rejected(500, "upstream down"),
        ])
        .with_tokens("stale-access", "refresh-1");

        let result = fixture.service.fetch_accounts().await;

        assert!(matches!(
            result,
            Err(ApiError::InvalidResponse(NetworkError::BadServerResponse { status_code: 500, .. }))
        ));
        assert_eq!(fixture.transport.get_count(), 2);
    }

    #[tokio::test]
    async fn other_rejections_never_refresh() {
        let cases = [
            (404, "not found"),
            (500, "boom"),
            (403, r#"{"error":"insufficient_scope","error_description":"no"}"#),
            (403, "forbidden"),
        ];

        for (status, body) in cases {
            let fixture =
                Fixture::new(vec![rejected(status, body)]).with_tokens("access-1", "refresh-1");

            let result = fixture.service.fetch_accounts().await;

            match result {
                Err(ApiError::InvalidResponse(err)) => assert_eq!(err.status_code(), Some(status)),
                other => panic!("expected invalid response for {status}, got {:?}", other),
            }
            assert_eq!(fixture.transport.post_count(), 0);
        }
    }

    #[tokio::test]
    async fn transport_failures_become_invalid_response() {
        let fixture = Fixture::new(vec![Err(NetworkError::RequestTimedOut)])
            .with_tokens("access-1", "refresh-1");

        let result = fixture.service.fetch_accounts().await;

        assert!(matches!(result, Err(ApiError::InvalidResponse(NetworkError::RequestTimedOut))));
    }

    #[tokio::test]
    async fn malformed_success_body_is_data_corrupted() {
        let fixture =
            Fixture::new(vec![ok(r#"{"accounts": "nope"}"#)]).with_tokens("access-1", "refresh-1");

        let result = fixture.service.fetch_accounts().await;

        assert!(matches!(result, Err(ApiError::DataCorrupted(_))));
    }

    #[tokio::test]
    async fn refresh_without_refresh_token_makes_no_calls() {
        let fixture = Fixture::new(vec![]);
        fixture.store.insert(b"access-1", ACCESS_TOKEN_IDENTIFIER, &fixture.namespace).unwrap();

        let result = fixture.service.refresh_access_token().await;

        assert!(matches!(result, Err(ApiError::MissingRefreshToken)));
        assert!(fixture.transport.calls().is_empty());
    }

    #[tokio::test]
    async fn invalid_token_without_refresh_token_reports_missing_refresh_token() {
        let fixture = Fixture::new(vec![rejected(403, INVALID_TOKEN_BODY)]);
        fixture.store.insert(b"stale", ACCESS_TOKEN_IDENTIFIER, &fixture.namespace).unwrap();

        let result = fixture.service.fetch_accounts().await;

        assert!(matches!(result, Err(ApiError::MissingRefreshToken)));
        assert_eq!(fixture.transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn refresh_updates_both_tokens_in_order() {
        let fixture = Fixture::new(vec![ok(FRESH_TOKEN_JSON)]).with_tokens("old-access", "old-refresh");

        fixture.service.refresh_access_token().await.unwrap();

        assert_eq!(fixture.stored(ACCESS_TOKEN_IDENTIFIER).as_deref(), Some("new-access"));
        assert_eq!(fixture.stored(REFRESH_TOKEN_IDENTIFIER).as_deref(), Some("new-refresh"));

        let updates: Vec<_> = fixture
            .store
            .operations()
            .into_iter()
            .filter_map(|op| match op {
                allsee_common::testing::StoreOperation::Update { identifier, .. } => Some(identifier),
                _ => None,
            })
            .collect();
        assert_eq!(updates, vec![REFRESH_TOKEN_IDENTIFIER, ACCESS_TOKEN_IDENTIFIER]);
    }

    #[tokio::test]
    async fn rejected_refresh_reports_server_error() {
        let fixture = Fixture::new(vec![rejected(
            400,
            r#"{"error":"invalid_grant","error_description":"Refresh token expired"}"#,
        )])
        .with_tokens("old-access", "old-refresh");

        let result = fixture.service.refresh_access_token().await;

        match result {
            Err(ApiError::CouldNotRefreshToken { error, description }) => {
                assert_eq!(error, "invalid_grant");
                assert_eq!(description, "Refresh token expired");
            }
            other => panic!("expected refresh failure, got {:?}", other),
        }
        assert_eq!(fixture.stored(ACCESS_TOKEN_IDENTIFIER).as_deref(), Some("old-access"));
    }

    #[tokio::test]
    async fn unparseable_refresh_rejection_uses_placeholders() {
        let fixture = Fixture::new(vec![
            rejected(400, "<html>bad request</html>"),
            Err(NetworkError::BadServerResponse { status_code: 400, body: None }),
        ])
        .with_tokens("old-access", "old-refresh");

        for _ in 0..2 {
            match fixture.service.refresh_access_token().await {
                Err(ApiError::CouldNotRefreshToken { error, description }) => {
                    assert_eq!(error, "unknown_error");
                    assert_eq!(description, "unknown_description");
                }
                other => panic!("expected refresh failure, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn other_refresh_failures_are_invalid_response() {
        let fixture = Fixture::new(vec![rejected(503, ""), Err(NetworkError::NotConnectedToInternet)])
            .with_tokens("old-access", "old-refresh");

        assert!(matches!(
            fixture.service.refresh_access_token().await,
            Err(ApiError::InvalidResponse(NetworkError::BadServerResponse { status_code: 503, .. }))
        ));
        assert!(matches!(
            fixture.service.refresh_access_token().await,
            Err(ApiError::InvalidResponse(NetworkError::NotConnectedToInternet))
        ));
    }

    #[tokio::test]
    async fn malformed_token_response_leaves_store_untouched() {
        let fixture =
            Fixture::new(vec![ok(r#"{"access_token": 7}"#)]).with_tokens("old-access", "old-refresh");

        let result = fixture.service.refresh_access_token().await;

        assert!(matches!(result, Err(ApiError::DataCorrupted(_))));
        assert_eq!(fixture.stored(ACCESS_TOKEN_IDENTIFIER).as_deref(), Some("old-access"));
        assert_eq!(fixture.stored(REFRESH_TOKEN_IDENTIFIER).as_deref(), Some("old-refresh"));
    }

    #[tokio::test]
    async fn unencodable_token_names_the_offending_token() {
        let body = r#"{"access_token":"new access","refresh_token":"ok","token_type":"Bearer","expires_in":1,"scope":""}"#;
        let fixture = Fixture::new(vec![ok(body)]).with_tokens("old-access", "old-refresh");

        let result = fixture.service.refresh_access_token().await;

        match result {
            Err(ApiError::CouldNotRefreshToken { error, .. }) => assert_eq!(error, "access_token"),
            other => panic!("expected refresh failure, got {:?}", other),
        }
        assert_eq!(fixture.stored(REFRESH_TOKEN_IDENTIFIER).as_deref(), Some("old-refresh"));
    }

    #[tokio::test]
    async fn partial_store_failure_keeps_new_refresh_token() {
        let fixture = Fixture::new(vec![ok(FRESH_TOKEN_JSON)]).with_tokens("old-access", "old-refresh");
        fixture.store.fail_writes_for(ACCESS_TOKEN_IDENTIFIER);

        let result = fixture.service.refresh_access_token().await;

        assert!(matches!(result, Err(ApiError::UnknownError(_))));
        assert_eq!(fixture.stored(REFRESH_TOKEN_IDENTIFIER).as_deref(), Some("new-refresh"));
        assert_eq!(fixture.stored(ACCESS_TOKEN_IDENTIFIER).as_deref(), Some("old-access"));
        assert_eq!(fixture.service.refresh_generation.load(Ordering::Acquire), 0);
    }

    #[tokio::test]
    async fn stale_generation_skips_exchange() {
        let fixture = Fixture::new(vec![ok(FRESH_TOKEN_JSON)]).with_tokens("old-access", "old-refresh");
        let seen = fixture.service.refresh_generation.load(Ordering::Acquire);

        fixture.service.refresh_access_token().await.unwrap();
        fixture.service.refresh_after(seen).await.unwrap();

        assert_eq!(fixture.transport.post_count(), 1);
    }

    #[tokio::test]
    async fn stored_credentials_are_used_and_cleared() {
        let fixture = Fixture::new(vec![ok(ACCOUNTS_JSON)]);

        fixture.service.store_credentials("signed-in", "refresh-1").unwrap();
        fixture.service.fetch_accounts().await.unwrap();
        fixture.service.clear_credentials().unwrap();
        fixture.service.clear_credentials().unwrap();

        assert!(matches!(
            &fixture.transport.calls()[0],
            Call::Get { authorization: Some(auth), .. } if auth == "Bearer signed-in"
        ));
        assert!(fixture.store.is_empty());
        assert!(matches!(fixture.service.fetch_accounts().await, Err(ApiError::MissingAccessToken)));
    }

    #[test]
    fn clear_credentials_removes_refresh_token_when_access_delete_fails() {
        let fixture = Fixture::new(vec![]).with_tokens("access", "refresh");
        fixture.store.fail_writes_for(ACCESS_TOKEN_IDENTIFIER);

        let result = fixture.service.clear_credentials();

        assert!(matches!(result, Err(ApiError::UnknownError(_))));
        assert_eq!(fixture.stored(REFRESH_TOKEN_IDENTIFIER), None);
        assert_eq!(fixture.stored(ACCESS_TOKEN_IDENTIFIER).as_deref(), Some("access"));
    }

    #[test]
    fn store_credentials_rejects_unusable_tokens() {
        let fixture = Fixture::new(vec![]);

        let result = fixture.service.store_credentials("", "refresh");

        assert!(matches!(result, Err(ApiError::UnknownError(_))));
        assert!(fixture.store.is_empty());
    }

    #[test]
    fn encode_token_accepts_only_visible_ascii() {
        assert_eq!(encode_token("access_token", "abc.DEF-123_~+/=").unwrap(), b"abc.DEF-123_~+/=");
        assert!(encode_token("access_token", "").is_err());
        assert!(encode_token("access_token", "with space").is_err());
        assert!(encode_token("refresh_token", "caf\u{e9}").is_err());
    }
}
