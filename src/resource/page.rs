//! Paginated collection traversal.
//!
//! A [`Pager`] wraps a collection URL and yields decoded resources across
//! successive pages, following the full next-page URL the server advertises
//! in the `Link` response header. The sequence is lazy, forward-only, and
//! restartable from the original URL. Already produced pages are never
//! buffered.

use std::collections::{HashMap, VecDeque};

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::clients::HttpClient;
use crate::resource::errors::ResourceError;
use crate::resource::instance::Resource;
use crate::resource::registry;
use crate::xml::Element;

/// Common query filters for collection listings.
///
/// All fields are optional; unset fields are omitted from the query string.
///
/// # Example
///
/// ```rust
/// use recurly_api::resource::{ListParams, Pager};
///
/// let params = ListParams {
///     state: Some("active".to_string()),
///     per_page: Some(50),
///     ..ListParams::default()
/// };
/// let pager = Pager::with_params("accounts", &params).unwrap();
/// ```
#[derive(Clone, Debug, Default, Serialize)]
pub struct ListParams {
    /// Filter by entity state (e.g. `active`, `past_due`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Resume a listing from a pagination cursor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    /// Field to order by.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    /// Sort direction (`asc` or `desc`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

/// A lazy, forward-only pager over a collection URL.
///
/// Each page fetch parses the multi-element response body, decodes every
/// child polymorphically through the type registry, and picks up the
/// next-page URL from the response's `Link` header. Absence of a next link
/// ends the sequence: [`next`](Self::next) yields `Ok(None)`, never an
/// error, and issues no further requests.
///
/// # Example
///
/// ```rust,ignore
/// let mut pager = Pager::new("accounts").query_param("state", "active");
/// while let Some(account) = pager.next(&client).await? {
///     println!("{:?}", account.attribute_get("account_code")?);
/// }
/// ```
#[derive(Debug)]
pub struct Pager {
    start_url: String,
    query: HashMap<String, String>,
    started: bool,
    next_url: Option<String>,
    items: VecDeque<Resource>,
    total_records: Option<u64>,
}

impl Pager {
    /// Creates a pager over a collection URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            start_url: url.into(),
            query: HashMap::new(),
            started: false,
            next_url: None,
            items: VecDeque::new(),
            total_records: None,
        }
    }

    /// Creates a pager with query filters serialized from a params struct.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Params`] if the params cannot be serialized.
    pub fn with_params<P: Serialize>(url: impl Into<String>, params: &P) -> Result<Self, ResourceError> {
        let mut pager = Self::new(url);
        pager.query = serialize_to_query(params)?;
        Ok(pager)
    }

    /// Adds a single query parameter for the first page.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Returns the total record count the server reported, once the first
    /// page has been fetched.
    #[must_use]
    pub const fn total_records(&self) -> Option<u64> {
        self.total_records
    }

    /// Yields the next resource, fetching the next page when the current
    /// one is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] for a failed page fetch or an unparseable
    /// page body. Running past the last page is not an error.
    pub async fn next(&mut self, client: &HttpClient) -> Result<Option<Resource>, ResourceError> {
        loop {
            if let Some(item) = self.items.pop_front() {
                return Ok(Some(item));
            }

            let (url, is_first) = if self.started {
                match self.next_url.take() {
                    Some(url) => (url, false),
                    None => return Ok(None),
                }
            } else {
                self.started = true;
                (self.start_url.clone(), true)
            };

            // The first request carries the configured filters; next-page
            // URLs already embed their own query string.
            let response = if is_first && !self.query.is_empty() {
                client.get_with(&url, self.query.clone()).await?
            } else {
                client.get(&url).await?
            };
            if !response.is_ok() {
                return Err(ResourceError::from_response(&response, &url));
            }

            let root = Element::parse(&response.text())?;
            for child in root.children() {
                let mut resource = registry::global().hydrate(child.clone());
                resource.set_default_currency(client.config().default_currency().clone());
                self.items.push_back(resource);
            }
            self.next_url = response.next_page_url.clone();
            self.total_records = response.total_records.or(self.total_records);
        }
    }

    /// Resets the pager to re-issue the original URL.
    ///
    /// Restarting re-fetches from the server; no produced pages are
    /// buffered or replayed.
    pub fn restart(&mut self) {
        self.started = false;
        self.next_url = None;
        self.items.clear();
    }
}

/// Serializes a params struct to a query parameter map.
///
/// `None` fields are skipped; arrays join into comma-separated values.
///
/// # Errors
///
/// Returns [`ResourceError::Params`] if the params cannot be serialized.
pub fn serialize_to_query<T: Serialize>(params: &T) -> Result<HashMap<String, String>, ResourceError> {
    let value = serde_json::to_value(params)?;

    let mut query = HashMap::new();

    if let JsonValue::Object(map) = value {
        for (key, val) in map {
            match val {
                JsonValue::Null => {}
                JsonValue::String(s) => {
                    query.insert(key, s);
                }
                JsonValue::Number(n) => {
                    query.insert(key, n.to_string());
                }
                JsonValue::Bool(b) => {
                    query.insert(key, b.to_string());
                }
                JsonValue::Array(arr) => {
                    let values: Vec<String> = arr
                        .iter()
                        .filter_map(|v| match v {
                            JsonValue::String(s) => Some(s.clone()),
                            JsonValue::Number(n) => Some(n.to_string()),
                            _ => None,
                        })
                        .collect();
                    if !values.is_empty() {
                        query.insert(key, values.join(","));
                    }
                }
                JsonValue::Object(_) => {
                    query.insert(key, val.to_string());
                }
            }
        }
    }

    Ok(query)
}
