//! Pagination handling for GitHub API.
//!
//! GitHub paginates collection endpoints through the `Link` response header:
//!
//! ```text
//! Link: <https://api.github.com/repositories/172137510/issues?page=2>; rel="next", <https://api.github.com/repositories/172137510/issues?page=40>; rel="last"
//! ```
//!
//! [`LinkRelations`] turns that header into a relation -> path map, and
//! [`Paginator`] follows `next` until the header no longer carries one.

use crate::client::GitHubClient;
use crate::errors::{GitHubError, GitHubErrorKind, GitHubResult};
use crate::observability::TracingHooks;
use futures::Stream;
use reqwest::header::{HeaderMap, LINK};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::marker::PhantomData;

/// Relation name -> path mapping parsed from one `Link` header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkRelations {
    links: HashMap<String, String>,
}

impl LinkRelations {
    /// Parses a `Link` header value.
    ///
    /// URLs starting with `base_url` are stored relative to it, so the result
    /// can be fed straight back into the client. Fails with
    /// [`GitHubErrorKind::MalformedLinkHeader`] on an empty value, an entry
    /// without a `;` delimiter, or an entry without a `rel` parameter.
    pub fn parse(header_value: &str, base_url: &str) -> GitHubResult<Self> {
        if header_value.trim().is_empty() {
            return Err(GitHubError::malformed_link("Link header is empty"));
        }

        let base = base_url.trim_end_matches('/');
        let mut links = HashMap::new();

        for entry in split_entries(header_value) {
            let (url, rels) = parse_entry(entry, base)?;
            for rel in rels {
                links.insert(rel, url.clone());
            }
        }

        Ok(Self { links })
    }

    /// Parses the `Link` header from response headers.
    ///
    /// A missing header yields an empty map.
    pub fn from_headers(headers: &HeaderMap, base_url: &str) -> GitHubResult<Self> {
        match headers.get(LINK) {
            None => Ok(Self::default()),
            Some(value) => {
                let value = value.to_str().map_err(|e| {
                    GitHubError::malformed_link("Link header is not valid UTF-8").with_cause(e)
                })?;
                Self::parse(value, base_url)
            }
        }
    }

    /// Gets the path for a relation.
    pub fn get(&self, rel: &str) -> Option<&str> {
        self.links.get(rel).map(String::as_str)
    }

    /// Path of the next page.
    pub fn next(&self) -> Option<&str> {
        self.get("next")
    }

    /// Path of the previous page.
    pub fn prev(&self) -> Option<&str> {
        self.get("prev")
    }

    /// Path of the first page.
    pub fn first(&self) -> Option<&str> {
        self.get("first")
    }

    /// Path of the last page.
    pub fn last(&self) -> Option<&str> {
        self.get("last")
    }

    /// Returns true if there is a next page.
    pub fn has_next(&self) -> bool {
        self.links.contains_key("next")
    }

    /// Number of relations.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns true when no relation was present.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Iterates over `(relation, path)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.links.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Gets the total page count from the `last` link.
    pub fn total_pages(&self) -> Option<u32> {
        self.last().and_then(extract_page_number)
    }

    /// Consumes the relations and returns the underlying map.
    pub fn into_map(self) -> HashMap<String, String> {
        self.links
    }
}

/// Splits a header value on the commas that separate link entries.
///
/// Commas inside `<...>` or inside quoted parameter values do not split.
fn split_entries(value: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut in_url = false;
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in value.char_indices() {
        match c {
            '<' if !in_quotes => in_url = true,
            '>' if !in_quotes => in_url = false,
            '"' if !in_url => in_quotes = !in_quotes,
            ',' if !in_url && !in_quotes => {
                entries.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    entries.push(&value[start..]);
    entries
}

fn parse_entry(entry: &str, base: &str) -> GitHubResult<(String, Vec<String>)> {
    let entry = entry.trim();
    // `;` is legal inside the URL, so the delimiter search starts after `>`.
    let url_end = if entry.starts_with('<') {
        entry.find('>').unwrap_or(0)
    } else {
        0
    };
    let delimiter = entry[url_end..]
        .find(';')
        .map(|i| url_end + i)
        .ok_or_else(|| {
            GitHubError::malformed_link(format!("Link entry has no ';' delimiter: {:?}", entry))
        })?;
    let (url_token, params) = (&entry[..delimiter], &entry[delimiter + 1..]);

    let rel_value = params
        .split(';')
        .map(str::trim)
        .find_map(|param| {
            param
                .get(..4)
                .filter(|name| name.eq_ignore_ascii_case("rel="))
                .map(|_| &param[4..])
        })
        .ok_or_else(|| {
            GitHubError::malformed_link(format!("Link entry has no rel parameter: {:?}", entry))
        })?;

    let rels: Vec<String> = rel_value
        .trim()
        .trim_matches('"')
        .split_whitespace()
        .map(str::to_ascii_lowercase)
        .collect();
    if rels.is_empty() {
        return Err(GitHubError::malformed_link(format!(
            "Link entry has an empty rel parameter: {:?}",
            entry
        )));
    }

    Ok((relative_url(url_token.trim(), base), rels))
}

/// Strips `<`, the base URL and `>` from a URL token.
fn relative_url(token: &str, base: &str) -> String {
    let url = token.strip_prefix('<').unwrap_or(token);
    // Only strip on a path boundary, so a base of `:4000` leaves `:40001` alone.
    let url = match url.strip_prefix(base) {
        Some(rest) if !base.is_empty() && rest.starts_with(['/', '?', '>']) => rest,
        _ => url,
    };
    url.strip_suffix('>').unwrap_or(url).to_string()
}

/// Extracts the `page` query parameter from a URL or path.
pub fn extract_page_number(url: &str) -> Option<u32> {
    let (_, query) = url.split_once('?')?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == "page")
        .and_then(|(_, v)| v.parse().ok())
}

/// A single page of results.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// The items in this page, in server order.
    pub items: Vec<T>,
    /// Pagination links from this page's response.
    pub links: LinkRelations,
}

impl<T> Page<T> {
    /// Creates a new page.
    pub fn new(items: Vec<T>, links: LinkRelations) -> Self {
        Self { items, links }
    }

    /// Returns true if there is a next page.
    pub fn has_next(&self) -> bool {
        self.links.has_next()
    }

    /// Returns the path of the next page.
    pub fn next_path(&self) -> Option<&str> {
        self.links.next()
    }

    /// Returns the number of items in this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the page is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consumes the page and returns the items.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Maps the items in this page.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            links: self.links,
        }
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Query parameters controlling the first page of a listing.
///
/// Later pages use whatever the server put in the `next` link.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PaginationParams {
    /// Page number (1-indexed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Items per page (max 100).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

impl PaginationParams {
    /// Creates new pagination parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page number.
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Sets items per page.
    pub fn per_page(mut self, per_page: u32) -> Self {
        // GitHub API limits to 100
        self.per_page = Some(per_page.min(100));
        self
    }
}

/// Walks a paginated collection one page at a time.
///
/// Each call to [`next_page`](Self::next_page) issues exactly one request and
/// advances through the `next` link of the previous response.
pub struct Paginator<'a, T> {
    client: &'a GitHubClient,
    next_path: Option<String>,
    pages_fetched: u32,
    max_pages: Option<u32>,
    _phantom: PhantomData<T>,
}

impl<'a, T: DeserializeOwned> Paginator<'a, T> {
    /// Creates a paginator starting at `path`.
    pub fn new(client: &'a GitHubClient, path: impl Into<String>) -> Self {
        Self {
            client,
            next_path: Some(path.into()),
            pages_fetched: 0,
            max_pages: client.config().max_pages,
            _phantom: PhantomData,
        }
    }

    /// Overrides the page ceiling for this paginator.
    pub fn max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Fetches the next page, or `None` once the collection is exhausted.
    ///
    /// A failed fetch leaves the paginator positioned on the same page.
    pub async fn next_page(&mut self) -> GitHubResult<Option<Page<T>>> {
        let Some(path) = self.next_path.as_deref() else {
            return Ok(None);
        };

        if let Some(max) = self.max_pages {
            if self.pages_fetched >= max {
                return Err(GitHubError::new(
                    GitHubErrorKind::PageLimitExceeded,
                    format!("Pagination stopped after {} pages with more pages remaining", max),
                ));
            }
        }

        let page: Page<T> = self.client.get_page(path).await?;
        TracingHooks::on_page_fetched(path, self.pages_fetched + 1, page.len(), page.has_next());

        self.pages_fetched += 1;
        self.next_path = page.next_path().map(String::from);
        Ok(Some(page))
    }

    /// Collects all items from all pages.
    ///
    /// Any error discards the items gathered so far.
    pub async fn collect_all(mut self) -> GitHubResult<Vec<T>> {
        let mut all_items = Vec::new();

        while let Some(page) = self.next_page().await? {
            all_items.extend(page.into_items());
        }

        TracingHooks::on_pagination_complete(self.pages_fetched, all_items.len());
        Ok(all_items)
    }

    /// Converts the paginator into a stream of pages.
    pub fn into_stream(self) -> impl Stream<Item = GitHubResult<Page<T>>> + 'a
    where
        T: 'a,
    {
        futures::stream::try_unfold(self, |mut pager| async move {
            Ok(pager.next_page().await?.map(|page| (page, pager)))
        })
    }

    /// Returns true if there are more pages.
    pub fn has_more(&self) -> bool {
        self.next_path.is_some()
    }

    /// Number of pages fetched so far.
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }
}
