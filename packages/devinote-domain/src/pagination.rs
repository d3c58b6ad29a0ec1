//! Search, ordering and page-window arithmetic shared by every listing.
//!
//! The SQL listings only borrow [`PageWindow`], [`OrderKeys`] and [`escape_like`] from here. The
//! in-memory back end, [`paginate`], runs the whole pipeline over a `Vec<T>`.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use devinote_config::Pagination;

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
	#[default]
	Asc,
	Desc,
}
impl SortDirection {
	pub fn as_sql(self) -> &'static str {
		match self {
			Self::Asc => "ASC",
			Self::Desc => "DESC",
		}
	}
}

/// Raw listing parameters as they arrive from a caller. Nothing here is trusted.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PageRequest {
	pub page: Option<i64>,
	pub per_page: Option<i64>,
	pub order_by: Option<String>,
	pub direction: Option<SortDirection>,
	pub search: Option<String>,
}
impl PageRequest {
	/// Trimmed search term, or `None` when the term is missing or blank.
	pub fn search_term(&self) -> Option<&str> {
		self.search.as_deref().map(str::trim).filter(|term| !term.is_empty())
	}

	pub fn direction(&self) -> SortDirection {
		self.direction.unwrap_or_default()
	}

	pub fn window(&self, limits: &Pagination) -> PageWindow {
		PageWindow::sanitize(self.page, self.per_page, limits)
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageWindow {
	pub page: i64,
	pub per_page: i64,
}
impl PageWindow {
	/// `page` is raised to 1. `per_page` falls back to the configured default and is clamped to
	/// `1..=max_per_page`.
	pub fn sanitize(page: Option<i64>, per_page: Option<i64>, limits: &Pagination) -> Self {
		let max = i64::from(limits.max_per_page.max(1));
		let page = page.unwrap_or(1).max(1);
		let per_page = per_page.unwrap_or(i64::from(limits.default_per_page)).clamp(1, max);

		Self { page, per_page }
	}

	pub fn offset(&self) -> i64 {
		(self.page - 1).saturating_mul(self.per_page)
	}

	pub fn limit(&self) -> i64 {
		self.per_page
	}

	pub fn pages_for(&self, total: i64) -> i64 {
		if total <= 0 {
			return 0;
		}

		(total - 1) / self.per_page + 1
	}
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Page<T> {
	pub total: i64,
	pub pages: i64,
	pub page: i64,
	pub per_page: i64,
	pub has_prev: bool,
	pub has_next: bool,
	pub items: Vec<T>,
}
impl<T> Page<T> {
	pub fn new(window: PageWindow, total: i64, items: Vec<T>) -> Self {
		let pages = window.pages_for(total);

		Self {
			total,
			pages,
			page: window.page,
			per_page: window.per_page,
			has_prev: window.page > 1,
			has_next: window.page < pages,
			items,
		}
	}

	pub fn empty(window: PageWindow) -> Self {
		Self::new(window, 0, Vec::new())
	}

	pub fn map<U>(mut self, f: impl FnMut(T) -> U) -> Page<U> {
		let items = std::mem::take(&mut self.items).into_iter().map(f).collect();

		self.with_items(items)
	}

	/// Keeps the counters and swaps the items, for callers that enrich rows asynchronously.
	pub fn with_items<U>(self, items: Vec<U>) -> Page<U> {
		Page {
			total: self.total,
			pages: self.pages,
			page: self.page,
			per_page: self.per_page,
			has_prev: self.has_prev,
			has_next: self.has_next,
			items,
		}
	}
}

/// Allowed sort keys for one listing. Lookups never fail: anything unknown resolves to `id`.
#[derive(Clone, Debug)]
pub struct OrderKeys<C> {
	id: C,
	keys: Vec<(&'static str, C)>,
}
impl<C> OrderKeys<C>
where
	C: Clone,
{
	pub fn new(id: C) -> Self {
		Self { id, keys: Vec::new() }
	}

	pub fn with(mut self, key: &'static str, column: C) -> Self {
		self.keys.push((key, column));

		self
	}

	pub fn resolve(&self, requested: Option<&str>) -> C {
		let Some(requested) = requested.map(str::trim) else {
			return self.id.clone();
		};

		if requested == "id" {
			return self.id.clone();
		}

		self.keys
			.iter()
			.find(|(key, _)| *key == requested)
			.map(|(_, column)| column.clone())
			.unwrap_or_else(|| self.id.clone())
	}
}

/// A comparable projection of one row, used by the in-memory back end.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum SortKey {
	Int(i64),
	Text(String),
	Time(OffsetDateTime),
}

pub type Projection<T> = fn(&T) -> SortKey;

/// Filters, orders and slices `items` in memory.
///
/// The sort is stable, so rows with equal keys keep their input order in both directions.
pub fn paginate<T>(
	items: Vec<T>,
	request: &PageRequest,
	limits: &Pagination,
	search_field: fn(&T) -> &str,
	order: &OrderKeys<Projection<T>>,
) -> Page<T> {
	let window = request.window(limits);
	let needle = request.search_term().map(str::to_lowercase);
	let project = order.resolve(request.order_by.as_deref());
	let mut keyed = items
		.into_iter()
		.filter(|item| match needle.as_deref() {
			Some(needle) => search_field(item).to_lowercase().contains(needle),
			None => true,
		})
		.map(|item| (project(&item), item))
		.collect::<Vec<_>>();
	let total = keyed.len() as i64;

	if total == 0 {
		return Page::empty(window);
	}

	let direction = request.direction();

	keyed.sort_by(|(a, _), (b, _)| match direction {
		SortDirection::Asc => a.cmp(b),
		SortDirection::Desc => b.cmp(a),
	});

	let offset = usize::try_from(window.offset()).unwrap_or(usize::MAX);
	let limit = usize::try_from(window.limit()).unwrap_or(usize::MAX);
	let items = keyed.into_iter().skip(offset).take(limit).map(|(_, item)| item).collect();

	Page::new(window, total, items)
}

/// Escapes `\`, `%` and `_` so `term` matches literally inside an `ILIKE` pattern.
pub fn escape_like(term: &str) -> String {
	let mut out = String::with_capacity(term.len());

	for ch in term.chars() {
		if matches!(ch, '\\' | '%' | '_') {
			out.push('\\');
		}

		out.push(ch);
	}

	out
}

/// `%term%` with the term escaped.
pub fn contains_pattern(term: &str) -> String {
	format!("%{}%", escape_like(term))
}
