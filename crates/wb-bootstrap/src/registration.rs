//! Registration handshake with the proxy's `request-endpoint`
//!
//! The identity document is requested with the endpoint URL as audience,
//! which binds it to this proxy. Nothing here is retried: a failed
//! registration aborts the run and the operator re-runs the bootstrap.

use std::sync::Arc;

use reqwest::Method;

use wb_core::traits::{Reporter, RunEvent, TokenIssuer};
use wb_core::{BootstrapError, ProxyMode, ProxyRegistration, Result};

/// Header carrying the VM identity document
pub const VM_ID_HEADER: &str = "X-Inverting-Proxy-VM-ID";

/// Path of the registration endpoint below the proxy base URL
pub const REQUEST_ENDPOINT_PATH: &str = "request-endpoint";

/// Mode-specific shape of the registration request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestShape {
    /// POST with the operator email as raw body
    MailBody(String),
    /// POST with an empty body
    EmptyPost,
    /// GET with `usercustomiam=true`
    CustomIamQuery,
}

impl RequestShape {
    /// Select the request shape for a mode
    pub fn for_mode(mode: ProxyMode, mail: Option<&str>) -> Result<Self> {
        match mode {
            ProxyMode::Mail => match mail.map(str::trim).filter(|m| !m.is_empty()) {
                Some(mail) => Ok(RequestShape::MailBody(mail.to_string())),
                None => Err(BootstrapError::InvalidConfiguration(
                    "proxy-mode is 'mail' but no proxy-user-mail is set".to_string(),
                )),
            },
            ProxyMode::ProjectEditors | ProxyMode::ServiceAccount => Ok(RequestShape::EmptyPost),
            ProxyMode::UseIam => Ok(RequestShape::CustomIamQuery),
            ProxyMode::None => Err(BootstrapError::UnsupportedProxyMode(mode)),
        }
    }

    pub fn method(&self) -> Method {
        match self {
            RequestShape::MailBody(_) | RequestShape::EmptyPost => Method::POST,
            RequestShape::CustomIamQuery => Method::GET,
        }
    }

    /// Request body, `None` for body-less requests
    pub fn body(&self) -> Option<Vec<u8>> {
        match self {
            RequestShape::MailBody(mail) => Some(mail.as_bytes().to_vec()),
            RequestShape::EmptyPost => Some(Vec::new()),
            RequestShape::CustomIamQuery => None,
        }
    }

    pub fn query(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            RequestShape::CustomIamQuery => &[("usercustomiam", "true")],
            _ => &[],
        }
    }
}

/// Registration endpoint URL for a proxy base URL
pub fn request_endpoint(base_url: &str) -> String {
    format!("{}/{}", base_url, REQUEST_ENDPOINT_PATH)
}

/// Performs the registration handshake
pub struct Registrar {
    client: reqwest::Client,
    tokens: Arc<dyn TokenIssuer>,
    reporter: Arc<dyn Reporter>,
}

impl Registrar {
    pub fn new(
        client: reqwest::Client,
        tokens: Arc<dyn TokenIssuer>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            client,
            tokens,
            reporter,
        }
    }

    /// Register this VM on the proxy at `base_url`
    pub async fn register(
        &self,
        base_url: &str,
        mode: ProxyMode,
        mail: Option<&str>,
    ) -> Result<ProxyRegistration> {
        let endpoint = request_endpoint(base_url);
        let shape = RequestShape::for_mode(mode, mail)?;

        self.reporter.report(&RunEvent::Registering {
            endpoint: endpoint.clone(),
            mode,
            mail: mail.map(str::to_string),
        });

        let vm_identity = self.tokens.identity_token(&endpoint).await?;
        let access_token = self.tokens.access_token().await?;

        let mut request = self
            .client
            .request(shape.method(), &endpoint)
            .header(VM_ID_HEADER, vm_identity)
            .bearer_auth(access_token)
            .query(shape.query());
        if let Some(body) = shape.body() {
            request = request.body(body);
        }

        let failed = |reason: String| BootstrapError::Registration {
            url: endpoint.clone(),
            reason,
        };

        let response = request.send().await.map_err(|e| failed(e.to_string()))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| failed(e.to_string()))?;
        if !status.is_success() {
            return Err(failed(format!("HTTP {}: {}", status, body.trim())));
        }

        let registration = parse_registration(&body).map_err(|e| {
            BootstrapError::MalformedRegistrationResponse {
                url: endpoint.clone(),
                reason: e.to_string(),
            }
        })?;

        self.reporter.report(&RunEvent::Registered {
            backend_id: registration.backend_id.clone(),
            hostname: registration.hostname.clone(),
        });
        Ok(registration)
    }
}

/// Parse a `{"backendID": ..., "hostname": ...}` response body
pub fn parse_registration(body: &str) -> std::result::Result<ProxyRegistration, serde_json::Error> {
    serde_json::from_str(body)
}
