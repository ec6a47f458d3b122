//! Endpoint paths and request URL formatting
//!
//! A region's base URL is precomputed once as a [`UrlTemplate`]:
//!
//! ```text
//! <api host>/wow/{endpoint}?locale=en_US&apikey=<key>           (API key)
//! <api host>/wow/{endpoint}?locale=en_US&access_token={token}   (OAuth)
//! ```
//!
//! The template always carries the first query parameter, so extra
//! parameters are appended as `&key=value` with no leading `?`.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::fmt;

use crate::config::{ClientConfig, Credentials, region_host};

const ENDPOINT_PLACEHOLDER: &str = "{endpoint}";
const TOKEN_PLACEHOLDER: &str = "{token}";

/// Fields requested with every character profile
pub const CHARACTER_FIELDS: &str = "professions,reputation";

/// Everything except RFC 3986 unreserved characters
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a URL path segment or query value
///
/// The result never contains `/` or `\`, so it is also safe as a single
/// file name component.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// API endpoints below `/wow/`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    RealmStatus,
    Character { realm: &'a str, name: &'a str },
    Spell(u64),
}

impl Endpoint<'_> {
    pub fn path(&self) -> String {
        match self {
            Self::RealmStatus => "realm/status".to_string(),
            Self::Character { realm, name } => format!(
                "character/{}/{}",
                encode_component(realm),
                encode_component(name)
            ),
            Self::Spell(id) => format!("spell/{id}"),
        }
    }
}

impl fmt::Display for Endpoint<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Region-specific request URL template
#[derive(Clone, PartialEq, Eq)]
pub struct UrlTemplate(String);

impl UrlTemplate {
    /// Build the template for a region and credential mode
    pub fn for_region(config: &ClientConfig, region: &str, credentials: &Credentials) -> Self {
        let host = region_host(&config.api_host, region);
        let locale = encode_component(&config.locale);
        let auth = match credentials {
            Credentials::ApiKey(key) => format!("apikey={}", encode_component(key)),
            Credentials::ClientCredentials { .. } => format!("access_token={TOKEN_PLACEHOLDER}"),
        };
        Self(format!(
            "{host}/wow/{ENDPOINT_PLACEHOLDER}?locale={locale}&{auth}"
        ))
    }

    /// Format a full request URL
    ///
    /// Parameters are appended in iteration order.
    pub fn format<'p, I>(&self, endpoint: &Endpoint<'_>, token: Option<&str>, params: I) -> String
    where
        I: IntoIterator<Item = (&'p str, &'p str)>,
    {
        let mut url = self.0.replacen(ENDPOINT_PLACEHOLDER, &endpoint.path(), 1);
        if let Some(token) = token {
            url = url.replacen(TOKEN_PLACEHOLDER, &encode_component(token), 1);
        }
        for (key, value) in params {
            url.push('&');
            url.push_str(key);
            url.push('=');
            url.push_str(&encode_component(value));
        }
        url
    }
}

// The template may embed an API key
impl fmt::Debug for UrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = self
            .0
            .split_once("apikey=")
            .map_or_else(|| self.0.clone(), |(head, _)| format!("{head}apikey=<redacted>"));
        f.debug_tuple("UrlTemplate").field(&redacted).finish()
    }
}

/// OAuth token endpoint for a region
pub fn token_url(config: &ClientConfig, region: &str) -> String {
    format!("{}/oauth/token", region_host(&config.token_host, region))
}

/// Icon render CDN URL for a region, size and icon
pub fn icon_url(config: &ClientConfig, region: &str, size: u32, icon_id: &str) -> String {
    format!(
        "{}/icons/{size}/{}.jpg",
        region_host(&config.icon_host, region),
        encode_component(icon_id)
    )
}
