use poem::http::{HeaderValue, StatusCode};
use poem::{Endpoint, IntoResponse, Middleware, Request, Response};
use std::time::Instant;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that tags each request with an id and logs its outcome
pub struct RequestLogging;

impl<E: Endpoint> Middleware<E> for RequestLogging {
    type Output = RequestLoggingEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        RequestLoggingEndpoint { inner: ep }
    }
}

pub struct RequestLoggingEndpoint<E> {
    inner: E,
}

/// Incoming request id when it is a sane header value, otherwise a fresh UUID
fn request_id(req: &Request) -> String {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= 128)
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

/// Outcome line for one request, at a level picked from the status class
struct RequestOutcome<'a> {
    request_id: &'a str,
    method: &'a str,
    path: &'a str,
    client_ip: &'a str,
    started: Instant,
}

impl RequestOutcome<'_> {
    fn log(&self, status: StatusCode) {
        let duration_ms = self.started.elapsed().as_millis() as u64;
        if status.is_server_error() {
            tracing::error!(
                request_id = %self.request_id,
                method = %self.method,
                path = %self.path,
                status = status.as_u16(),
                duration_ms,
                client_ip = %self.client_ip,
                "request failed"
            );
        } else if status.is_client_error() {
            tracing::warn!(
                request_id = %self.request_id,
                method = %self.method,
                path = %self.path,
                status = status.as_u16(),
                duration_ms,
                client_ip = %self.client_ip,
                "request rejected"
            );
        } else {
            tracing::info!(
                request_id = %self.request_id,
                method = %self.method,
                path = %self.path,
                status = status.as_u16(),
                duration_ms,
                client_ip = %self.client_ip,
                "request completed"
            );
        }
    }
}

impl<E: Endpoint> Endpoint for RequestLoggingEndpoint<E> {
    type Output = Response;

    async fn call(&self, req: Request) -> poem::Result<Self::Output> {
        let started = Instant::now();
        let request_id = request_id(&req);
        let method = req.method().to_string();
        // Path only: query strings carry searchers' coordinates
        let path = req.uri().path().to_string();
        let client_ip = req
            .remote_addr()
            .as_socket_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let outcome = RequestOutcome {
            request_id: &request_id,
            method: &method,
            path: &path,
            client_ip: &client_ip,
            started,
        };

        match self.inner.call(req).await {
            Ok(resp) => {
                let mut resp = resp.into_response();
                outcome.log(resp.status());
                if let Ok(value) = HeaderValue::from_str(&request_id) {
                    resp.headers_mut().insert(REQUEST_ID_HEADER, value);
                }
                Ok(resp)
            }
            Err(err) => {
                outcome.log(err.status());
                tracing::debug!(request_id = %request_id, error = %err, "handler error");
                Err(err)
            }
        }
    }
}
