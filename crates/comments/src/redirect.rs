//! Where to send the operator after a create or destroy.

/// Resolves a "back" location from the request's referer, refusing anything
/// that would leave the current host.
#[derive(Debug, Clone, Copy)]
pub struct RedirectBack<'a> {
    pub referer: Option<&'a str>,
    pub host: Option<&'a str>,
}

impl<'a> RedirectBack<'a> {
    pub fn new(referer: Option<&'a str>, host: Option<&'a str>) -> Self {
        Self { referer, host }
    }

    /// The referer when it is safe, otherwise `fallback`.
    pub fn resolve(&self, fallback: &str) -> String {
        self.referer
            .map(str::trim)
            .filter(|r| self.is_safe(r))
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string())
    }

    fn is_safe(&self, referer: &str) -> bool {
        if referer.chars().any(char::is_control) {
            return false;
        }

        if let Some(rest) = referer.strip_prefix('/') {
            // `//evil.example` and `/\evil.example` are protocol-relative in browsers.
            return !rest.starts_with('/') && !rest.starts_with('\\');
        }

        let Some(host) = self.host else {
            return false;
        };
        let Some(rest) = strip_scheme(referer) else {
            return false;
        };
        let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
        // Userinfo (`user@host`) is how `https://good@evil` disguises itself.
        !authority.contains('@') && authority.eq_ignore_ascii_case(host)
    }
}

/// Namespace root, the destination when no usable referer exists.
pub fn namespace_root(namespace: &str) -> String {
    format!("/{namespace}")
}

fn strip_scheme(url: &str) -> Option<&str> {
    let (scheme, rest) = url.split_once("://")?;
    if scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https") {
        Some(rest)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn back(referer: Option<&str>) -> String {
        RedirectBack::new(referer, Some("admin.example.com")).resolve("/support")
    }

    #[test]
    fn missing_referer_falls_back_to_root() {
        assert_eq!(back(None), "/support");
        assert_eq!(namespace_root("support"), "/support");
    }

    #[test]
    fn relative_paths_are_kept() {
        assert_eq!(back(Some("/support/orders/17")), "/support/orders/17");
    }

    #[test]
    fn same_host_absolute_urls_are_kept() {
        assert_eq!(
            back(Some("https://admin.example.com/support/orders/17?tab=notes")),
            "https://admin.example.com/support/orders/17?tab=notes"
        );
    }

    #[test]
    fn foreign_and_tricky_referers_fall_back() {
        for referer in [
            "https://evil.example/phish",
            "//evil.example/phish",
            "/\\evil.example",
            "https://admin.example.com@evil.example/",
            "javascript:alert(1)",
            "ftp://admin.example.com/",
            "/support\r\nSet-Cookie: x=1",
        ] {
            assert_eq!(back(Some(referer)), "/support", "{referer}");
        }
    }

    #[test]
    fn absolute_url_without_host_header_falls_back() {
        let r = RedirectBack::new(Some("https://admin.example.com/x"), None);
        assert_eq!(r.resolve("/admin"), "/admin");
    }
}
