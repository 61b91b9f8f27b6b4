//! Nominatim reverse-geocoding client.
//!
//! Talks to `{endpoint}/reverse` with `format=jsonv2&addressdetails=1`.
//! Works against the public OpenStreetMap instance or a self-hosted one.

use async_trait::async_trait;
use std::time::Duration;

use super::provider::{Address, ReverseGeocoder};
use crate::config::GeocodingConfig;
use crate::error::GeocodeError;
use crate::types::GeoPoint;

pub struct NominatimGeocoder {
    endpoint: String,
    timeout_ms: u64,
    client: reqwest::Client,
}

impl NominatimGeocoder {
    /// Build a client with the configured timeout, User-Agent and proxy.
    ///
    /// Without an explicit proxy, reqwest's environment proxy settings apply.
    pub fn new(config: &GeocodingConfig) -> Result<Self, GeocodeError> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone());

        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| GeocodeError::Client(format!("Invalid proxy {proxy}: {e}")))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| GeocodeError::Client(e.to_string()))?;
        Ok(Self::with_client(config, client))
    }

    /// Use a caller-supplied HTTP client. Only `endpoint` and `timeout_ms`
    /// are read from the config.
    pub fn with_client(config: &GeocodingConfig, client: reqwest::Client) -> Self {
        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            timeout_ms: config.timeout_ms,
            client,
        }
    }

    fn request_error(&self, e: reqwest::Error) -> GeocodeError {
        if e.is_timeout() {
            GeocodeError::Timeout {
                timeout_ms: self.timeout_ms,
            }
        } else {
            GeocodeError::Request {
                message: format!("Nominatim request failed: {e}"),
                status_code: e.status().map(|s| s.as_u16()),
            }
        }
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    fn name(&self) -> &str {
        "nominatim"
    }

    async fn reverse(&self, point: GeoPoint, language: &str) -> Result<Address, GeocodeError> {
        let url = format!("{}/reverse", self.endpoint);
        let lat = point.latitude.to_string();
        let lon = point.longitude.to_string();

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("format", "jsonv2"),
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("accept-language", language),
                ("addressdetails", "1"),
            ])
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(GeocodeError::Request {
                message: format!("Nominatim HTTP {status}: {text}"),
                status_code: Some(status.as_u16()),
            });
        }

        let body: serde_json::Value = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                self.request_error(e)
            } else {
                GeocodeError::Parse(e.to_string())
            }
        })?;

        if let Some(error) = body.get("error") {
            let message = error
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(GeocodeError::NoResult(message));
        }

        let raw = body
            .get("address")
            .ok_or_else(|| GeocodeError::NoResult(format!("no address for {point}")))?;
        tracing::debug!("Nominatim address ({}) for {}: {}", language, point, raw);

        serde_json::from_value(raw.clone()).map_err(|e| GeocodeError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve one canned HTTP response on a local port.
    /// The handle resolves to the raw request head.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&request).into_owned()
        });
        (format!("http://{addr}"), handle)
    }

    fn geocoder(endpoint: &str, timeout_ms: u64) -> NominatimGeocoder {
        let config = GeocodingConfig {
            endpoint: endpoint.to_string(),
            timeout_ms,
            ..GeocodingConfig::default()
        };
        let client = reqwest::Client::builder()
            .no_proxy()
            .timeout(Duration::from_millis(timeout_ms))
            .user_agent("geostamp-test")
            .build()
            .unwrap();
        NominatimGeocoder::with_client(&config, client)
    }

    fn beijing() -> GeoPoint {
        GeoPoint {
            latitude: 39.9219,
            longitude: 116.4436,
        }
    }

    #[tokio::test]
    async fn test_reverse_parses_address() {
        let body = r#"{"place_id":1,"address":{"suburb":"朝阳区","state":"北京市","country":"中国","postcode":"100020"}}"#;
        let (endpoint, server) = serve_once("200 OK", body).await;

        let address = geocoder(&endpoint, 2000)
            .reverse(beijing(), "zh")
            .await
            .unwrap();
        assert_eq!(address.components(), vec!["中国", "北京市", "朝阳区"]);

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /reverse?"));
        assert!(request.contains("format=jsonv2"));
        assert!(request.contains("accept-language=zh"));
        assert!(request.contains("addressdetails=1"));
        assert!(request.contains("lat=39.9219"));
        assert!(request.contains("lon=116.4436"));
    }

    #[tokio::test]
    async fn test_reverse_error_body_is_no_result() {
        let (endpoint, _server) = serve_once("200 OK", r#"{"error":"Unable to geocode"}"#).await;
        let err = geocoder(&endpoint, 2000)
            .reverse(beijing(), "en")
            .await
            .unwrap_err();
        assert!(matches!(err, GeocodeError::NoResult(ref m) if m == "Unable to geocode"));
    }

    #[tokio::test]
    async fn test_reverse_http_error_keeps_status() {
        let (endpoint, _server) = serve_once("503 Service Unavailable", "{}").await;
        let err = geocoder(&endpoint, 2000)
            .reverse(beijing(), "en")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GeocodeError::Request {
                status_code: Some(503),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_reverse_malformed_body() {
        let (endpoint, _server) = serve_once("200 OK", "not json").await;
        let err = geocoder(&endpoint, 2000)
            .reverse(beijing(), "en")
            .await
            .unwrap_err();
        assert!(matches!(err, GeocodeError::Parse(_)));
    }

    #[tokio::test]
    async fn test_reverse_unreachable_endpoint() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = geocoder(&format!("http://{addr}"), 2000)
            .reverse(beijing(), "en")
            .await
            .unwrap_err();
        assert!(matches!(err, GeocodeError::Request { status_code: None, .. }));
    }

    #[tokio::test]
    async fn test_reverse_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hold the connection without answering.
        let _server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let err = geocoder(&format!("http://{addr}"), 200)
            .reverse(beijing(), "en")
            .await
            .unwrap_err();
        assert!(matches!(err, GeocodeError::Timeout { timeout_ms: 200 }));
    }

    #[test]
    fn test_new_rejects_bad_proxy() {
        let config = GeocodingConfig {
            proxy: Some("::not a url::".to_string()),
            ..GeocodingConfig::default()
        };
        assert!(matches!(
            NominatimGeocoder::new(&config),
            Err(GeocodeError::Client(_))
        ));
    }

    #[test]
    fn test_new_with_http_proxy_trims_endpoint() {
        let config = GeocodingConfig {
            proxy: Some("http://127.0.0.1:7890".to_string()),
            endpoint: "https://nominatim.example.org/".to_string(),
            ..GeocodingConfig::default()
        };
        let geocoder = NominatimGeocoder::new(&config).unwrap();
        assert_eq!(geocoder.endpoint, "https://nominatim.example.org");
    }
}
