use crate::context::Context;
use crate::debug::{self, DebugLevel};
use crate::error::{self, AdapterError};
use crate::params::Params;
use crate::response::Response;
use crate::transport::{BuiltRequest, ReqwestTransport, RequestMeta, Transport};
use crate::wire;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method};
use std::time::Duration;
use url::Url;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// The sole HTTP entry point for all panel commands.
///
/// Turns an endpoint name plus a parameter map into one authenticated
/// round trip and decodes the body into a [`Response`]. Scope switching
/// goes through [`as_reseller`]/[`as_user`]/[`unscoped`], which return a
/// rescoped copy sharing the transport; nothing is mutated in place, so
/// concurrent requests on differently scoped copies cannot race.
///
/// [`as_reseller`]: Adapter::as_reseller
/// [`as_user`]: Adapter::as_user
/// [`unscoped`]: Adapter::unscoped
#[derive(Clone)]
pub struct Adapter<T: Transport = ReqwestTransport> {
    context: Context,
    transport: T,
    debug: DebugLevel,
    timeout: Option<Duration>,
}

impl Adapter<ReqwestTransport> {
    pub fn new(context: Context) -> Self {
        Self::with_reqwest_client(context, reqwest::Client::new())
    }

    pub fn with_reqwest_client(context: Context, client: reqwest::Client) -> Self {
        Self::with_transport(context, ReqwestTransport::new(client))
    }
}

impl<T: Transport> Adapter<T> {
    pub fn with_transport(context: Context, transport: T) -> Self {
        Self {
            context,
            transport,
            debug: DebugLevel::default(),
            timeout: None,
        }
    }

    #[inline]
    pub fn context(&self) -> &Context {
        &self.context
    }

    #[inline]
    pub fn host(&self) -> &str {
        self.context.host()
    }

    /// The active user scope's domain, when one is set.
    #[inline]
    pub fn domain(&self) -> Option<&str> {
        self.context.domain()
    }

    #[inline]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[inline]
    pub fn with_debug_level(mut self, level: DebugLevel) -> Self {
        self.debug = level;
        self
    }

    /// Per-request timeout forwarded to the transport. Expiry surfaces
    /// as a transport error, never as a partially decoded `Response`.
    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Issues a GET with the merged parameters in the query string.
    pub async fn get(&self, endpoint: &str, params: Params) -> Result<Response, AdapterError> {
        self.call(Method::GET, endpoint, &params).await
    }

    /// Issues a POST with the merged parameters as a form body.
    pub async fn post(&self, endpoint: &str, params: Params) -> Result<Response, AdapterError> {
        self.call(Method::POST, endpoint, &params).await
    }

    async fn call(
        &self,
        method: Method,
        endpoint: &str,
        params: &Params,
    ) -> Result<Response, AdapterError> {
        let name = endpoint.trim_start_matches('/');
        let built = self
            .build(method, name, params)
            .map_err(|e| AdapterError::in_endpoint(name, e))?;

        let dbg = self.debug;
        if dbg.is_verbose() {
            debug::request_start(dbg, &built.meta.method, built.url.as_str(), name);
        }
        if dbg.is_very_verbose() {
            debug::request_headers(dbg, &built.headers);
            if let Some(body) = built.body.as_ref() {
                debug::request_body(dbg, body);
            }
        }

        let resp = self
            .transport
            .send(&built)
            .await
            .map_err(|e| AdapterError::in_endpoint(name, e.into()))?;

        let ok = resp.status.is_success();
        if dbg.is_verbose() {
            debug::response_status(dbg, resp.status, built.url.as_str(), ok);
        }
        if dbg.is_very_verbose() {
            debug::response_headers(dbg, &resp.headers);
            debug::response_body(dbg, &resp.headers, &resp.body);
        }

        if !ok {
            let body = error::body_as_text(&resp.headers, &resp.body);
            return Err(AdapterError::in_endpoint(
                name,
                AdapterError::HttpStatus {
                    status: resp.status,
                    headers: resp.headers,
                    body,
                },
            ));
        }

        Ok(Response::from_body(resp.body))
    }

    fn build(
        &self,
        method: Method,
        endpoint: &str,
        params: &Params,
    ) -> Result<BuiltRequest, AdapterError> {
        let mut pairs = params.expanded_pairs()?;
        // Scope pairs ride along on every request; caller-supplied keys win.
        if let Some(scope) = self.context.scope() {
            for (k, v) in scope.pairs() {
                if !pairs.iter().any(|(pk, _)| pk == k) {
                    pairs.push((k.to_owned(), v.to_owned()));
                }
            }
        }
        let encoded = wire::encode_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let mut url = Url::parse(&self.context.base_url())?;
        url.set_path(endpoint);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, self.basic_auth()?);

        let mut body = None;
        if method == Method::POST {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
            body = Some(Bytes::from(encoded));
        } else if !encoded.is_empty() {
            url.set_query(Some(&encoded));
        }

        Ok(BuiltRequest {
            meta: RequestMeta {
                endpoint: endpoint.to_owned(),
                method,
            },
            url,
            headers,
            body,
            timeout: self.timeout,
        })
    }

    fn basic_auth(&self) -> Result<HeaderValue, AdapterError> {
        let token = B64.encode(format!(
            "{}:{}",
            self.context.username(),
            self.context.credential().secret().expose()
        ));
        let mut value = HeaderValue::from_str(&format!("Basic {token}"))
            .map_err(|_| AdapterError::InvalidContext("credential is not header-safe"))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl<T: Transport + Clone> Adapter<T> {
    /// Rescoped copy acting as the given reseller.
    pub fn as_reseller(&self, name: impl Into<String>) -> Self {
        self.rescope(self.context.with_reseller(name))
    }

    /// Rescoped copy acting as the given user on the given domain.
    pub fn as_user(&self, user: impl Into<String>, domain: impl Into<String>) -> Self {
        self.rescope(self.context.with_user(user, domain))
    }

    /// Copy with no acting-as scope.
    pub fn unscoped(&self) -> Self {
        self.rescope(self.context.unscoped())
    }

    fn rescope(&self, context: Context) -> Self {
        Self {
            context,
            transport: self.transport.clone(),
            debug: self.debug,
            timeout: self.timeout,
        }
    }
}
