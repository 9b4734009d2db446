//! HTTP client adapter and the combined network adapter.
//!
//! [`HttpClient`] implements [`HttpPort`]: one blocking POST per call,
//! bounded by `http_timeout_ms`.  [`NetworkAdapter`] pairs it with the
//! WiFi adapter so the submitter can ask for the link state and post
//! through a single handle.
//!
//! - **`target_os = "espidf"`**: `EspHttpConnection` with the certificate
//!   bundle attached for `https://` endpoints.
//! - **all other targets**: a scripted client that answers every POST and
//!   remembers the last request.

use log::{debug, warn};

use super::wifi::WifiAdapter;
use crate::app::ports::{ConnectivityPort, HttpPort, HttpResponse};
use crate::error::HttpError;

/// Response bodies beyond this are truncated.
pub const MAX_RESPONSE_BODY: usize = 1024;

#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

pub struct HttpClient {
    timeout_ms: u32,
    #[cfg(not(target_os = "espidf"))]
    sim_reply: Result<HttpResponse, HttpError>,
    #[cfg(not(target_os = "espidf"))]
    last_request: Option<SentRequest>,
}

impl HttpClient {
    pub fn new(timeout_ms: u32) -> Self {
        Self {
            timeout_ms,
            #[cfg(not(target_os = "espidf"))]
            sim_reply: Ok(HttpResponse {
                status: 200,
                body: r#"{"success":true}"#.into(),
            }),
            #[cfg(not(target_os = "espidf"))]
            last_request: None,
        }
    }

    /// Simulation: answer subsequent POSTs with `reply`.
    #[cfg(not(target_os = "espidf"))]
    pub fn set_sim_reply(&mut self, reply: Result<HttpResponse, HttpError>) {
        self.sim_reply = reply;
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn last_request(&self) -> Option<&SentRequest> {
        self.last_request.as_ref()
    }
}

#[cfg(target_os = "espidf")]
impl HttpPort for HttpClient {
    fn post(&mut self, url: &str, headers: &[(&str, &str)], body: &[u8]) -> Result<HttpResponse, HttpError> {
        use core::time::Duration;
        use esp_idf_svc::http::Method;
        use esp_idf_svc::http::client::{Configuration, EspHttpConnection};

        let config = Configuration {
            timeout: Some(Duration::from_millis(u64::from(self.timeout_ms))),
            crt_bundle_attach: if url.starts_with("https://") {
                Some(esp_idf_svc::sys::esp_crt_bundle_attach)
            } else {
                None
            },
            ..Default::default()
        };
        let mut conn = EspHttpConnection::new(&config).map_err(|e| HttpError::Connect(e.code()))?;

        let content_length = body.len().to_string();
        let mut all_headers: heapless::Vec<(&str, &str), 8> = heapless::Vec::new();
        for &h in headers {
            if all_headers.push(h).is_err() {
                warn!("HTTP: header list full, dropping '{}'", h.0);
            }
        }
        if all_headers.push(("Content-Length", content_length.as_str())).is_err() {
            return Err(HttpError::Encode);
        }

        conn.initiate_request(Method::Post, url, &all_headers)
            .map_err(|e| HttpError::Connect(e.code()))?;

        let mut remaining = body;
        while !remaining.is_empty() {
            let n = conn.write(remaining).map_err(|e| HttpError::Send(e.code()))?;
            if n == 0 {
                return Err(HttpError::Send(-1));
            }
            remaining = &remaining[n.min(remaining.len())..];
        }

        conn.initiate_response().map_err(|e| HttpError::Receive(e.code()))?;
        let status = conn.status();

        let mut raw: heapless::Vec<u8, MAX_RESPONSE_BODY> = heapless::Vec::new();
        let mut chunk = [0u8; 128];
        loop {
            let n = conn.read(&mut chunk).map_err(|e| HttpError::Receive(e.code()))?;
            if n == 0 {
                break;
            }
            let room = MAX_RESPONSE_BODY - raw.len();
            // Bounded by the remaining capacity.
            let _ = raw.extend_from_slice(&chunk[..n.min(room)]);
            if raw.len() == MAX_RESPONSE_BODY {
                debug!("HTTP: response body truncated at {} bytes", MAX_RESPONSE_BODY);
                break;
            }
        }

        Ok(HttpResponse {
            status,
            body: String::from_utf8_lossy(&raw).into_owned(),
        })
    }
}

#[cfg(not(target_os = "espidf"))]
impl HttpPort for HttpClient {
    fn post(&mut self, url: &str, headers: &[(&str, &str)], body: &[u8]) -> Result<HttpResponse, HttpError> {
        debug!("HTTP(sim): POST {} ({} bytes, timeout {} ms)", url, body.len(), self.timeout_ms);
        self.last_request = Some(SentRequest {
            url: url.into(),
            headers: headers.iter().map(|(k, v)| ((*k).into(), (*v).into())).collect(),
            body: body.to_vec(),
        });
        let mut reply = self.sim_reply.clone()?;
        if reply.body.len() > MAX_RESPONSE_BODY {
            warn!("HTTP(sim): response body truncated");
            let mut end = MAX_RESPONSE_BODY;
            while !reply.body.is_char_boundary(end) {
                end -= 1;
            }
            reply.body.truncate(end);
        }
        Ok(reply)
    }
}

/// WiFi link plus HTTP client: the submitter's view of the network.
pub struct NetworkAdapter {
    wifi: WifiAdapter,
    http: HttpClient,
}

impl NetworkAdapter {
    pub fn new(wifi: WifiAdapter, http: HttpClient) -> Self {
        Self { wifi, http }
    }

    pub fn wifi_mut(&mut self) -> &mut WifiAdapter {
        &mut self.wifi
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn http_mut(&mut self) -> &mut HttpClient {
        &mut self.http
    }
}

impl ConnectivityPort for NetworkAdapter {
    fn is_connected(&self) -> bool {
        self.wifi.is_connected()
    }
}

impl HttpPort for NetworkAdapter {
    fn post(&mut self, url: &str, headers: &[(&str, &str)], body: &[u8]) -> Result<HttpResponse, HttpError> {
        self.http.post(url, headers, body)
    }
}
