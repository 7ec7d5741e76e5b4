//! Page math and HATEOAS sibling links for list routes.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Every list route serves fixed pages of this many items.
pub const PAGE_SIZE: i64 = 10;

/// Result of clamping a requested page against a collection size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page_number: i64,
    pub offset: i64,
    pub total_pages: i64,
    pub page_size: i64,
}

impl PageWindow {
    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

/// Clamp `requested_page` into `[1, total_pages]` and compute the row offset.
///
/// `total_pages` is never below 1, so an empty collection still has one
/// (empty) page rather than being an error.
pub fn paginate(requested_page: i64, total_count: i64, page_size: i64) -> PageWindow {
    let page_size = page_size.max(1);
    let total_count = total_count.max(0);
    let total_pages = ((total_count + page_size - 1) / page_size).max(1);
    let page_number = requested_page.clamp(1, total_pages);

    PageWindow {
        page_number,
        offset: (page_number - 1) * page_size,
        total_pages,
        page_size,
    }
}

/// Lenient `?page=` parsing: leading integer prefix, anything else is page 1.
pub fn parse_page(raw: Option<&str>) -> i64 {
    let Some(raw) = raw else { return 1 };
    let s = raw.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    let digits = &digits[..end];
    if digits.is_empty() {
        return 1;
    }
    // Too long for i64: saturate and let `paginate` clamp.
    match digits.parse::<i64>() {
        Ok(0) => 1,
        Ok(n) => sign * n,
        Err(_) if sign < 0 => i64::MIN,
        Err(_) => i64::MAX,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_page: Option<String>,
}

impl PageLinks {
    pub fn new(page_number: i64, total_pages: i64, base_path: &str) -> Self {
        let mut links = Self::default();
        if page_number < total_pages {
            links.next_page = Some(format!("{}?page={}", base_path, page_number + 1));
            links.last_page = Some(format!("{}?page={}", base_path, total_pages));
        }
        if page_number > 1 {
            links.prev_page = Some(format!("{}?page={}", base_path, page_number - 1));
            links.first_page = Some(format!("{}?page=1", base_path));
        }
        links
    }
}

/// One page of a collection, serialized as
/// `{ <collection>: [...], pageNumber, totalPages, pageSize, totalCount, links }`.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub collection: &'static str,
    pub items: Vec<T>,
    pub window: PageWindow,
    pub total_count: i64,
    pub links: PageLinks,
}

impl<T> Page<T> {
    pub fn new(
        collection: &'static str,
        base_path: &str,
        items: Vec<T>,
        window: PageWindow,
        total_count: i64,
    ) -> Self {
        Self {
            collection,
            items,
            links: PageLinks::new(window.page_number, window.total_pages, base_path),
            window,
            total_count,
        }
    }
}

impl<T: Serialize> Serialize for Page<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(6))?;
        map.serialize_entry(self.collection, &self.items)?;
        map.serialize_entry("pageNumber", &self.window.page_number)?;
        map.serialize_entry("totalPages", &self.window.total_pages)?;
        map.serialize_entry("pageSize", &self.window.page_size)?;
        map.serialize_entry("totalCount", &self.total_count)?;
        map.serialize_entry("links", &self.links)?;
        map.end()
    }
}
