//! HTTP response types for the Recurly API client.
//!
//! This module provides the [`HttpResponse`] type and related types for
//! accessing API response data and the pagination metadata the API carries
//! in response headers.

use std::borrow::Cow;
use std::collections::HashMap;

/// Pagination links parsed from the `Link` header.
///
/// The API paginates collections with full URLs in the `Link` header:
///
/// ```text
/// Link: <https://api.recurly.com/v2/accounts?cursor=abc>; rel="next"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageLinks {
    /// The URL of the next page, if any.
    pub next: Option<String>,
    /// The URL of the first page, if advertised.
    pub start: Option<String>,
}

impl PageLinks {
    /// Parses pagination links from a `Link` header value.
    ///
    /// The header format is `<url>; rel="next", <url>; rel="start"`.
    #[must_use]
    pub fn parse_link_header(header_value: &str) -> Self {
        let mut result = Self::default();

        for link in header_value.split(',') {
            let link = link.trim();

            let rel = link.split(';').find_map(|part| {
                let part = part.trim();
                part.strip_prefix("rel=").map(|r| r.trim_matches('"'))
            });

            let url = link
                .split(';')
                .next()
                .map(|s| s.trim().trim_start_matches('<').trim_end_matches('>'));

            if let (Some(rel), Some(url)) = (rel, url) {
                match rel {
                    "next" => result.next = Some(url.to_string()),
                    "start" => result.start = Some(url.to_string()),
                    _ => {}
                }
            }
        }

        result
    }
}

/// An HTTP response from the Recurly API.
///
/// Contains the response status code, headers, and raw body bytes, plus
/// parsed values for the headers the resource layer cares about: the
/// next-page link and the collection record count.
///
/// The body is kept as bytes because one endpoint (invoice PDF download)
/// returns a binary document; XML consumers use [`text`](Self::text).
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers (headers may have multiple values).
    pub headers: HashMap<String, Vec<String>>,
    /// The raw response body.
    pub body: Vec<u8>,
    /// The URL of the next page of a collection (from the `Link` header).
    pub next_page_url: Option<String>,
    /// The total number of records in a collection (from the `X-Records` header).
    pub total_records: Option<u64>,
}

impl HttpResponse {
    /// Creates a new `HttpResponse` with automatic header parsing.
    ///
    /// This constructor parses the pagination headers automatically:
    /// `Link` -> `next_page_url` and `X-Records` -> `total_records`.
    #[must_use]
    pub fn new(code: u16, headers: HashMap<String, Vec<String>>, body: Vec<u8>) -> Self {
        let next_page_url = headers
            .get("link")
            .and_then(|values| values.first())
            .and_then(|link| PageLinks::parse_link_header(link).next);

        let total_records = headers
            .get("x-records")
            .and_then(|values| values.first())
            .and_then(|value| value.parse().ok());

        Self {
            code,
            headers,
            body,
            next_page_url,
            total_records,
        }
    }

    /// Returns `true` if the response status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Returns the response body as text.
    ///
    /// Invalid UTF-8 sequences are replaced; XML response bodies are always
    /// UTF-8 on this API.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Returns the first value of a header, looked up case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the `Location` header value, if present.
    ///
    /// Creating calls return the canonical URL of the new resource here,
    /// and accepted-but-deferred actions return a follow-up URL.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.header("location")
    }

    /// Returns the `Content-Type` header value, if present.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Returns the `X-Request-Id` header value, if present.
    ///
    /// This ID is useful for debugging and should be included in error reports.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.header("x-request-id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(name: &str, value: &str) -> HashMap<String, Vec<String>> {
        let mut headers = HashMap::new();
        headers.insert(name.to_string(), vec![value.to_string()]);
        headers
    }

    #[test]
    fn test_is_ok_returns_true_for_2xx() {
        for code in [200, 201, 202, 204, 299] {
            let response = HttpResponse::new(code, HashMap::new(), Vec::new());
            assert!(response.is_ok(), "expected is_ok() for code {code}");
        }
    }

    #[test]
    fn test_is_ok_returns_false_for_4xx_and_5xx() {
        for code in [400, 404, 422, 500, 503] {
            let response = HttpResponse::new(code, HashMap::new(), Vec::new());
            assert!(!response.is_ok(), "expected !is_ok() for code {code}");
        }
    }

    #[test]
    fn test_link_header_parsing_extracts_full_urls() {
        let link = r#"<https://api.recurly.com/v2/accounts?cursor=1972702718353176814>; rel="next", <https://api.recurly.com/v2/accounts>; rel="start""#;
        let links = PageLinks::parse_link_header(link);

        assert_eq!(
            links.next.as_deref(),
            Some("https://api.recurly.com/v2/accounts?cursor=1972702718353176814")
        );
        assert_eq!(links.start.as_deref(), Some("https://api.recurly.com/v2/accounts"));
    }

    #[test]
    fn test_link_header_without_next_yields_none() {
        let link = r#"<https://api.recurly.com/v2/accounts>; rel="start""#;
        let links = PageLinks::parse_link_header(link);
        assert!(links.next.is_none());
    }

    #[test]
    fn test_response_parses_next_page_url() {
        let headers = headers_with(
            "link",
            r#"<https://api.recurly.com/v2/invoices?cursor=abc>; rel="next""#,
        );
        let response = HttpResponse::new(200, headers, Vec::new());

        assert_eq!(
            response.next_page_url.as_deref(),
            Some("https://api.recurly.com/v2/invoices?cursor=abc")
        );
    }

    #[test]
    fn test_response_parses_total_records() {
        let response = HttpResponse::new(200, headers_with("x-records", "3271"), Vec::new());
        assert_eq!(response.total_records, Some(3271));
    }

    #[test]
    fn test_location_extraction() {
        let headers = headers_with("location", "https://api.recurly.com/v2/accounts/acme");
        let response = HttpResponse::new(201, headers, Vec::new());

        assert_eq!(
            response.location(),
            Some("https://api.recurly.com/v2/accounts/acme")
        );
    }

    #[test]
    fn test_text_decodes_body_bytes() {
        let response = HttpResponse::new(200, HashMap::new(), b"<account/>".to_vec());
        assert_eq!(response.text(), "<account/>");
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let headers = headers_with("content-type", "application/pdf");
        let response = HttpResponse::new(200, headers, Vec::new());

        assert_eq!(response.header("Content-Type"), Some("application/pdf"));
        assert_eq!(response.content_type(), Some("application/pdf"));
    }
}
