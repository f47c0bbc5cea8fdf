use core::fmt;

/// Credential wrapper that never reveals its contents in Debug/Display.
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    #[inline]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Explicit escape hatch used when the credential goes on the wire.
    #[inline]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<secret>")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<secret>")
    }
}

impl From<String> for SecretString {
    #[inline]
    fn from(v: String) -> Self {
        Self(v)
    }
}

impl From<&str> for SecretString {
    #[inline]
    fn from(v: &str) -> Self {
        Self(v.to_owned())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn debug_and_display_never_leak() {
        let s = SecretString::new("hunter2");
        assert_eq!(format!("{s:?}"), "<secret>");
        assert_eq!(format!("{s}"), "<secret>");
        assert_eq!(s.expose(), "hunter2");
    }
}
