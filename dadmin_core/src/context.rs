use crate::error::AdapterError;
use crate::secret::SecretString;
use http::uri::Scheme;

/// The authenticating credential: the account password, or an issued
/// login key used in its place. Both travel in the HTTP Basic password
/// slot.
#[derive(Clone, Debug)]
pub enum Credential {
    Password(SecretString),
    LoginKey(SecretString),
}

impl Credential {
    #[inline]
    pub(crate) fn secret(&self) -> &SecretString {
        match self {
            Credential::Password(s) | Credential::LoginKey(s) => s,
        }
    }
}

/// The identity a request acts as, distinct from the authenticating
/// credential. At most one kind exists per [`Context`] by construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scope {
    Reseller { name: String },
    User { user: String, domain: String },
}

impl Scope {
    /// Parameter pairs injected into every scoped request, under the
    /// key names the panel expects.
    pub(crate) fn pairs(&self) -> Vec<(&'static str, &str)> {
        match self {
            Scope::Reseller { name } => vec![("reseller", name.as_str())],
            Scope::User { user, domain } => {
                vec![("user", user.as_str()), ("domain", domain.as_str())]
            }
        }
    }
}

/// Connection target, credential and acting-as scope.
///
/// A `Context` is immutable: rescoping goes through [`with_reseller`],
/// [`with_user`] or [`unscoped`], which return a new value. Callers that
/// need to interleave differently-scoped requests hold one `Context`
/// (or one [`Adapter`](crate::prelude::Adapter)) per logical session
/// instead of mutating a shared one mid-flight.
///
/// [`with_reseller`]: Context::with_reseller
/// [`with_user`]: Context::with_user
/// [`unscoped`]: Context::unscoped
#[derive(Clone, Debug)]
pub struct Context {
    scheme: Scheme,
    host: String,
    port: u16,
    username: String,
    credential: Credential,
    scope: Option<Scope>,
}

pub struct ContextBuilder {
    scheme: Scheme,
    host: String,
    port: u16,
    username: String,
    credential: Option<Credential>,
}

impl ContextBuilder {
    /// Serve the panel over plain HTTP. The default is HTTPS.
    pub fn insecure_http(mut self) -> Self {
        self.scheme = Scheme::HTTP;
        self
    }

    pub fn password(mut self, password: impl Into<SecretString>) -> Self {
        self.credential = Some(Credential::Password(password.into()));
        self
    }

    pub fn login_key(mut self, key: impl Into<SecretString>) -> Self {
        self.credential = Some(Credential::LoginKey(key.into()));
        self
    }

    /// Validates the connection target and produces the `Context`.
    /// No network I/O happens here.
    pub fn build(self) -> Result<Context, AdapterError> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(AdapterError::InvalidContext("empty host"));
        }
        if host.contains("://") {
            return Err(AdapterError::InvalidContext("host must not carry a scheme"));
        }
        if host.contains('/') {
            return Err(AdapterError::InvalidContext("host must not contain '/'"));
        }
        if host.chars().any(|c| c.is_whitespace()) {
            return Err(AdapterError::InvalidContext("host must not contain whitespace"));
        }
        if self.port == 0 {
            return Err(AdapterError::InvalidContext("port must be non-zero"));
        }
        if self.username.is_empty() {
            return Err(AdapterError::InvalidContext("empty username"));
        }
        let credential = self
            .credential
            .ok_or(AdapterError::InvalidContext("missing credential"))?;

        Ok(Context {
            scheme: self.scheme,
            host: host.to_owned(),
            port: self.port,
            username: self.username,
            credential,
            scope: None,
        })
    }
}

impl Context {
    pub fn builder(host: impl Into<String>, port: u16, username: impl Into<String>) -> ContextBuilder {
        ContextBuilder {
            scheme: Scheme::HTTPS,
            host: host.into(),
            port,
            username: username.into(),
            credential: None,
        }
    }

    #[inline]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.port
    }

    #[inline]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[inline]
    pub(crate) fn credential(&self) -> &Credential {
        &self.credential
    }

    #[inline]
    pub fn scope(&self) -> Option<&Scope> {
        self.scope.as_ref()
    }

    /// The active user scope's domain, when one is set. Domain-bound
    /// endpoints (logs, spam config, email) fill their `domain`
    /// parameter from this.
    pub fn domain(&self) -> Option<&str> {
        match &self.scope {
            Some(Scope::User { domain, .. }) => Some(domain.as_str()),
            _ => None,
        }
    }

    /// `scheme://host:port`.
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    /// Browsable URL under the panel root: base URL plus an optional
    /// sub-path. Handed back to callers that need links rather than
    /// requests.
    pub fn public_path(&self, path: &str) -> String {
        let base = self.base_url();
        let path = path.trim();
        if path.is_empty() || path == "/" {
            return base;
        }
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }

    /// New context acting as the given reseller. Any user scope is
    /// dropped.
    pub fn with_reseller(&self, name: impl Into<String>) -> Context {
        let mut cx = self.clone();
        cx.scope = Some(Scope::Reseller { name: name.into() });
        cx
    }

    /// New context acting as the given user on the given domain. Any
    /// reseller scope is dropped.
    pub fn with_user(&self, user: impl Into<String>, domain: impl Into<String>) -> Context {
        let mut cx = self.clone();
        cx.scope = Some(Scope::User {
            user: user.into(),
            domain: domain.into(),
        });
        cx
    }

    /// New context with no acting-as scope.
    pub fn unscoped(&self) -> Context {
        let mut cx = self.clone();
        cx.scope = None;
        cx
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ctx() -> Context {
        Context::builder("panel.example.com", 2222, "admin")
            .password("hunter2")
            .build()
            .unwrap()
    }

    #[test]
    fn build_rejects_bad_targets() {
        let bad = [
            Context::builder("", 2222, "admin").password("x").build(),
            Context::builder("https://h", 2222, "admin").password("x").build(),
            Context::builder("h/path", 2222, "admin").password("x").build(),
            Context::builder("h ost", 2222, "admin").password("x").build(),
            Context::builder("h", 0, "admin").password("x").build(),
            Context::builder("h", 2222, "").password("x").build(),
            Context::builder("h", 2222, "admin").build(),
        ];
        for r in bad {
            assert!(matches!(r, Err(AdapterError::InvalidContext(_))));
        }
    }

    #[test]
    fn public_path_composes_base_and_subpath() {
        let cx = ctx();
        assert_eq!(cx.base_url(), "https://panel.example.com:2222");
        assert_eq!(cx.public_path(""), "https://panel.example.com:2222");
        assert_eq!(
            cx.public_path("awstats"),
            "https://panel.example.com:2222/awstats"
        );
        assert_eq!(
            cx.public_path("/awstats"),
            "https://panel.example.com:2222/awstats"
        );

        let plain = Context::builder("10.0.0.2", 2222, "admin")
            .insecure_http()
            .password("x")
            .build()
            .unwrap();
        assert_eq!(plain.base_url(), "http://10.0.0.2:2222");
    }

    #[test]
    fn scope_kinds_are_mutually_exclusive() {
        let cx = ctx();
        assert_eq!(cx.scope(), None);

        let as_reseller = cx.with_reseller("resell1");
        assert_eq!(
            as_reseller.scope(),
            Some(&Scope::Reseller { name: "resell1".into() })
        );

        let as_user = as_reseller.with_user("jdoe", "example.com");
        assert_eq!(
            as_user.scope(),
            Some(&Scope::User { user: "jdoe".into(), domain: "example.com".into() })
        );
        assert_eq!(as_user.domain(), Some("example.com"));

        // rescoping never touched the originals
        assert_eq!(cx.scope(), None);
        assert!(matches!(as_reseller.scope(), Some(Scope::Reseller { .. })));
        assert_eq!(as_user.unscoped().scope(), None);
    }

    #[test]
    fn scope_pairs_use_panel_key_names() {
        let r = Scope::Reseller { name: "resell1".into() };
        assert_eq!(r.pairs(), vec![("reseller", "resell1")]);

        let u = Scope::User { user: "jdoe".into(), domain: "example.com".into() };
        assert_eq!(u.pairs(), vec![("user", "jdoe"), ("domain", "example.com")]);
    }
}
