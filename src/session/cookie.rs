//! Session cookie construction.

use crate::config::SameSite;

/// Builder for the session identifier Set-Cookie header.
///
/// The cookie is always `HttpOnly` with `Path=/`; `Secure` is added when
/// this deployment terminates TLS, and unconditionally for
/// `SameSite=None` (browsers reject None without Secure).
pub struct SessionCookie<'a> {
    name: &'a str,
    value: &'a str,
    max_age_secs: u64,
    same_site: SameSite,
    secure: bool,
}

impl<'a> SessionCookie<'a> {
    pub fn new(
        name: &'a str,
        value: &'a str,
        max_age_secs: u64,
        same_site: SameSite,
        secure: bool,
    ) -> Self {
        Self {
            name,
            value,
            max_age_secs,
            same_site,
            secure,
        }
    }

    /// Render the Set-Cookie header value.
    pub fn build(&self) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite={}",
            self.name,
            self.value,
            self.max_age_secs,
            self.same_site.as_str()
        );
        if self.secure || self.same_site == SameSite::None {
            cookie.push_str("; Secure");
        }
        cookie
    }
}
