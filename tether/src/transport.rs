use crate::token::CookieJar;
use async_trait::async_trait;
use reqwest::{
    header::{COOKIE, SET_COOKIE},
    multipart::Form,
};
use serde_json::Value;
use std::time::Duration;
use tether_types::{ActionRequest, ActionResult, Encoding, Error, Method, Result};

/// one request in, one result out. never retries.
#[async_trait]
pub(crate) trait Transport: Send + Sync {
    async fn send(&self, request: &ActionRequest) -> ActionResult;
}

pub(crate) struct HttpTransport {
    endpoint: String,
    client: reqwest::Client,
    jar: CookieJar,
}

impl HttpTransport {
    pub(crate) fn new(endpoint: &str, jar: CookieJar, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            client: builder.build()?,
            jar,
        })
    }

    async fn perform(&self, request: &ActionRequest) -> Result<Value> {
        let url = format!("{}{}", self.endpoint, request.path);
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };
        let mut builder = self.client.request(method, &url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(cookie) = self.jar.header() {
            builder = builder.header(COOKIE, cookie);
        }
        builder = match request.encoding {
            Encoding::None => builder,
            Encoding::Json => builder.json(&request.json_body()),
            Encoding::Multipart => {
                let form = request
                    .payload
                    .iter()
                    .fold(Form::new(), |form, (name, value)| form.text(name.clone(), value.to_string()));
                builder.multipart(form)
            }
        };
        let response = builder.send().await.map_err(|e| Error::TransportFailure {
            status: None,
            message: e.to_string(),
        })?;
        for value in response.headers().get_all(SET_COOKIE) {
            if let Ok(value) = value.to_str() {
                self.jar.absorb_set_cookie(value);
            }
        }
        let status = response.status();
        let code = Some(status.as_u16());
        let body = response.text().await.map_err(|e| Error::TransportFailure {
            status: code,
            message: e.to_string(),
        })?;
        if !status.is_success() {
            return Err(Error::TransportFailure { status: code, message: body });
        }
        serde_json::from_str(&body).map_err(|e| Error::TransportFailure {
            status: code,
            message: format!("invalid json body: {}", e),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ActionRequest) -> ActionResult {
        log::debug!("[{}] {}", request.method.as_str(), request.path);
        match self.perform(request).await {
            Ok(value) => ActionResult::Success(value),
            Err(Error::TransportFailure { status, message }) => ActionResult::Failure { status, message },
            Err(e) => ActionResult::Failure {
                status: None,
                message: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{HttpTransport, Transport};
    use crate::token::CookieJar;
    use serde_json::json;
    use tether_types::{action::Action, ActionResult};
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        task::JoinHandle,
    };

    /// answers one connection with `response`, yields the raw request text.
    async fn serve_once(response: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf).to_lowercase();
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|line| line.strip_prefix("content-length:"))
                        .and_then(|len| len.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&buf).to_string()
        });
        (format!("http://{}", address), handle)
    }

    fn reply(status: &str, extra: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\n{}content-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            extra,
            body.len(),
            body
        )
    }

    #[tokio::test]
    async fn post_carries_token_cookie_and_marker() {
        let body = r#"{"client_id": 7, "token": "abc"}"#;
        let (endpoint, server) = serve_once(reply("200 OK", "set-cookie: csrftoken=fresh; Path=/\r\n", body)).await;
        let jar = CookieJar::parse("csrftoken=tok");
        let transport = HttpTransport::new(&endpoint, jar.clone(), None).unwrap();
        let req = Action::CreateClient {
            name: "bot".to_string(),
            channel: "news".to_string(),
        }
        .into_request()
        .with_token("tok".to_string());
        let res = transport.send(&req).await;
        assert_eq!(res, ActionResult::Success(json!({"client_id": 7, "token": "abc"})));

        let raw = server.await.unwrap().to_lowercase();
        assert!(raw.starts_with("post /telegram/create_client http/1.1"));
        assert!(raw.contains("x-csrftoken: tok"));
        assert!(raw.contains("x-requested-with: xmlhttprequest"));
        assert!(raw.contains("cookie: csrftoken=tok"));
        assert!(raw.contains(r#"{"channel":"news","name":"bot"}"#));
        assert_eq!(jar.get("csrftoken"), Some("fresh".to_string()));
    }

    #[tokio::test]
    async fn non_2xx_keeps_server_text() {
        let (endpoint, server) = serve_once(reply("403 Forbidden", "", "CSRF verification failed.")).await;
        let transport = HttpTransport::new(&endpoint, CookieJar::default(), None).unwrap();
        let req = Action::ToggleFollow { slug: "bob".to_string() }.into_request();
        let res = transport.send(&req).await;
        assert_eq!(
            res,
            ActionResult::Failure {
                status: Some(403),
                message: "CSRF verification failed.".to_string()
            }
        );
        assert!(server.await.unwrap().starts_with("POST /user/follow/bob/"));
    }

    #[tokio::test]
    async fn html_body_on_200_is_a_failure() {
        let (endpoint, _server) = serve_once(reply("200 OK", "", "<html></html>")).await;
        let transport = HttpTransport::new(&endpoint, CookieJar::default(), None).unwrap();
        let req = Action::PollStatus {
            client_id: "1".to_string(),
        }
        .into_request();
        match transport.send(&req).await {
            ActionResult::Failure { status, message } => {
                assert_eq!(status, Some(200));
                assert!(message.starts_with("invalid json body"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unreachable_has_no_status() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);
        let transport = HttpTransport::new(&format!("http://{}/", address), CookieJar::default(), None).unwrap();
        let req = Action::PollStatus {
            client_id: "1".to_string(),
        }
        .into_request();
        match transport.send(&req).await {
            ActionResult::Failure { status, .. } => assert_eq!(status, None),
            other => panic!("expected failure, got {:?}", other),
        }
    }
}
