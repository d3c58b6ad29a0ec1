//! SQL back end of the pagination engine.
//!
//! A listing runs a `count(*)` first and skips the page query when nothing matches. Ordering always
//! ends with `id ASC` so ties come back in insertion order.

use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, postgres::PgRow};

use crate::Result;
use devinote_config::Pagination;
use devinote_domain::pagination::{self, OrderKeys, Page, PageRequest};

pub(crate) struct SqlListing {
	pub(crate) table: &'static str,
	pub(crate) columns: &'static str,
	pub(crate) search_column: &'static str,
	pub(crate) order: OrderKeys<&'static str>,
	/// Restricts rows to `column = value`, for per-owner listings.
	pub(crate) scope: Option<(&'static str, i64)>,
}
impl SqlListing {
	pub(crate) fn new(
		table: &'static str,
		columns: &'static str,
		search_column: &'static str,
		order: OrderKeys<&'static str>,
	) -> Self {
		Self { table, columns, search_column, order, scope: None }
	}

	pub(crate) fn scoped(mut self, column: &'static str, value: i64) -> Self {
		self.scope = Some((column, value));

		self
	}

	pub(crate) async fn fetch<T>(
		&self,
		pool: &PgPool,
		request: &PageRequest,
		limits: &Pagination,
	) -> Result<Page<T>>
	where
		T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
	{
		let window = request.window(limits);
		let term = request.search_term();
		let mut count = QueryBuilder::<Postgres>::new("SELECT count(*) FROM ");

		count.push(self.table);
		self.push_filters(&mut count, term);

		let total = count.build_query_scalar::<i64>().fetch_one(pool).await?;

		if total == 0 {
			return Ok(Page::empty(window));
		}

		let column = self.order.resolve(request.order_by.as_deref());
		let direction = request.direction().as_sql();
		let mut page = QueryBuilder::<Postgres>::new("SELECT ");

		page.push(self.columns).push(" FROM ").push(self.table);
		self.push_filters(&mut page, term);
		page.push(" ORDER BY ").push(column).push(" ").push(direction);

		if column != "id" {
			page.push(", id ASC");
		}

		page.push(" LIMIT ").push_bind(window.limit()).push(" OFFSET ").push_bind(window.offset());

		let items = page.build_query_as::<T>().fetch_all(pool).await?;

		Ok(Page::new(window, total, items))
	}

	fn push_filters(&self, builder: &mut QueryBuilder<'_, Postgres>, term: Option<&str>) {
		let mut joiner = " WHERE ";

		if let Some((column, value)) = self.scope {
			builder.push(joiner).push(column).push(" = ").push_bind(value);

			joiner = " AND ";
		}
		if let Some(term) = term {
			builder
				.push(joiner)
				.push(self.search_column)
				.push(" ILIKE ")
				.push_bind(pagination::contains_pattern(term));
		}
	}
}
