//! Request delivery.
//!
//! [`Transport`] is the seam between the controller and the network.
//! [`HttpTransport`] is the real implementation on top of `reqwest`; tests
//! substitute scripted transports.

use std::future::Future;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;

use crate::config::ClientConfig;
use crate::envelope::TransportResponse;
use crate::error::{ClientError, TransportError};
use crate::request::{MutationRequest, Payload};

/// Delivers a [`MutationRequest`] and returns the raw response.
///
/// Implementations only report transport-level problems as errors; any HTTP
/// status with a readable body is a response.
pub trait Transport {
    fn send(
        &self,
        request: &MutationRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(
        &self,
        request: &MutationRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> {
        (**self).send(request)
    }
}

/// HTTP transport against the marketplace backend.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.base_url).map_err(|err| ClientError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason: err.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: "url cannot be a base".to_string(),
            });
        }

        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            HeaderName::from_static("x-requested-with"),
            HeaderValue::from_static("XMLHttpRequest"),
        );

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(default_headers)
            .build()
            .map_err(|err| ClientError::HttpClient(err.to_string()))?;

        Ok(HttpTransport { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn resolve(&self, endpoint: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(endpoint)
            .map_err(|err| TransportError::Request(format!("invalid endpoint '{}': {}", endpoint, err)))
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: &MutationRequest) -> Result<TransportResponse, TransportError> {
        let url = self.resolve(request.endpoint())?;
        let mut builder = self.client.post(url);

        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.payload() {
            Payload::Json(map) => builder.json(map),
            Payload::Form(fields) => builder.form(fields),
            Payload::Multipart(fields) => {
                let form = fields
                    .iter()
                    .fold(reqwest::multipart::Form::new(), |form, (name, value)| {
                        form.text(name.clone(), value.clone())
                    });
                builder.multipart(form)
            }
        };

        let response = builder
            .send()
            .await
            .map_err(|err| TransportError::Request(err.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|err| TransportError::Request(format!("response read failed: {}", err)))?;

        Ok(TransportResponse::new(status, body.to_vec()))
    }
}
