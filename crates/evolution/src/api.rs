use crate::error::{ApiError, ApiResult};
use crate::types::{
    ConnectOutcome, ConnectionState, ConnectionStateResponse, CreateInstanceResponse, QrCode,
};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const INTEGRATION: &str = "WHATSAPP-BAILEYS";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Thin client over the Evolution API instance endpoints.
#[derive(Clone)]
pub struct EvolutionApi {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl EvolutionApi {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> ApiResult<Self> {
        Self::with_timeout(base_url, api_key, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> ApiResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::NotConfigured(format!("invalid base url {base_url:?}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::NotConfigured(format!(
                "base url {base_url} cannot hold a path"
            )));
        }

        let client = Client::builder()
            .user_agent("zapdesk/0.1")
            .connect_timeout(Duration::from_secs(5))
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::NotConfigured(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::NotConfigured("base url cannot hold a path".into()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = request.header("apikey", &self.api_key).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "Evolution API error body: {body}");
            return Err(ApiError::from_status(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub async fn create_instance(&self, instance: &str) -> ApiResult<CreateInstanceResponse> {
        let url = self.endpoint(&["instance", "create"])?;
        info!("Creating WhatsApp instance {instance}");
        self.send_json(self.client.post(url).json(&serde_json::json!({
            "instanceName": instance,
            "qrcode": true,
            "integration": INTEGRATION,
        })))
        .await
    }

    /// Asks the server for a QR code. An instance that is already paired
    /// answers with its state instead.
    pub async fn connect(&self, instance: &str) -> ApiResult<ConnectOutcome> {
        let url = self.endpoint(&["instance", "connect", instance])?;
        let data: Value = self.send_json(self.client.get(url)).await?;

        let state = data
            .pointer("/instance/state")
            .and_then(|v| v.as_str())
            .map(ConnectionState::from_wire);
        if state == Some(ConnectionState::Open) {
            return Ok(ConnectOutcome::AlreadyOpen);
        }

        let qr: QrCode =
            serde_json::from_value(data).map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(ConnectOutcome::Qr(qr))
    }

    pub async fn connection_state(&self, instance: &str) -> ApiResult<ConnectionState> {
        let url = self.endpoint(&["instance", "connectionState", instance])?;
        let data: ConnectionStateResponse = self.send_json(self.client.get(url)).await?;
        let state = data
            .instance
            .state
            .as_deref()
            .map(ConnectionState::from_wire)
            .unwrap_or_default();
        debug!("Instance {instance} state: {state}");
        Ok(state)
    }

    pub async fn logout(&self, instance: &str) -> ApiResult<()> {
        let url = self.endpoint(&["instance", "logout", instance])?;
        info!("Logging out WhatsApp instance {instance}");
        let _: Value = self.send_json(self.client.delete(url)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn api_for(server: &MockServer) -> EvolutionApi {
        EvolutionApi::new(&server.uri(), "secret").expect("valid base url")
    }

    #[test]
    fn rejects_invalid_base_url() {
        let err = EvolutionApi::new("not a url", "k").err().expect("should fail");
        assert!(matches!(err, ApiError::NotConfigured(_)));
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let api = EvolutionApi::new("https://evo.example.com/api/", "k").expect("api");
        let url = api.endpoint(&["instance", "connect", "barber"]).expect("url");
        assert_eq!(url.as_str(), "https://evo.example.com/api/instance/connect/barber");
    }

    #[tokio::test]
    async fn create_instance_sends_name_and_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/instance/create"))
            .and(header("apikey", "secret"))
            .and(body_partial_json(serde_json::json!({
                "instanceName": "barber",
                "qrcode": true
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "instance": { "instanceName": "barber", "status": "created" },
                "qrcode": { "pairingCode": "WZYEH1YY", "base64": "data:image/png;base64,AAAA" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let created = api_for(&server).await.create_instance("barber").await.expect("created");
        assert_eq!(created.instance.instance_name, "barber");
        let qr = created.qrcode.expect("qr");
        assert_eq!(qr.pairing(), Some("WZYEH1YY"));
    }

    #[tokio::test]
    async fn create_instance_reports_existing_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/instance/create"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "status": 403,
                "error": "Forbidden",
                "response": { "message": ["This name \"barber\" is already in use."] }
            })))
            .mount(&server)
            .await;

        let err = api_for(&server).await.create_instance("barber").await.err().expect("error");
        assert!(matches!(err, ApiError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn connect_returns_qr_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/instance/connect/barber"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "pairingCode": "ABCD1234",
                "code": "2@xyz",
                "base64": "iVBORw0KGgo=",
                "count": 1
            })))
            .mount(&server)
            .await;

        let outcome = api_for(&server).await.connect("barber").await.expect("connect");
        match outcome {
            ConnectOutcome::Qr(qr) => {
                assert_eq!(qr.image(), Some("iVBORw0KGgo="));
                assert_eq!(qr.pairing(), Some("ABCD1234"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn connect_detects_open_instance() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/instance/connect/barber"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "instance": { "instanceName": "barber", "state": "open" }
            })))
            .mount(&server)
            .await;

        let outcome = api_for(&server).await.connect("barber").await.expect("connect");
        assert_eq!(outcome, ConnectOutcome::AlreadyOpen);
    }

    #[tokio::test]
    async fn connection_state_maps_close_to_idle() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/instance/connectionState/barber"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "instance": { "instanceName": "barber", "state": "close" }
            })))
            .mount(&server)
            .await;

        let state = api_for(&server).await.connection_state("barber").await.expect("state");
        assert_eq!(state, ConnectionState::Idle);
    }

    #[tokio::test]
    async fn connection_state_of_unknown_instance_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/instance/connectionState/ghost"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "status": 404,
                "error": "Not Found",
                "response": { "message": ["The \"ghost\" instance does not exist"] }
            })))
            .mount(&server)
            .await;

        let err = api_for(&server).await.connection_state("ghost").await.err().expect("error");
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn logout_uses_delete() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/instance/logout/barber"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "SUCCESS",
                "error": false,
                "response": { "message": "Instance logged out" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        api_for(&server).await.logout("barber").await.expect("logout");
    }
}
