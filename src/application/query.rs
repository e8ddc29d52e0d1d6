//! Declarative list-query descriptors rendered into parameterized SQL.
//!
//! A [`ListQuery`] captures the table, projection, sortable-column allow-list
//! and filter predicates for one listing; the database layer renders it twice
//! per request, once as a `COUNT(*)` and once as the page window, so both
//! statements are guaranteed to share the same `WHERE` clause.

use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::{PageRequest, PaginationError, SortDirection};

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Uuid(Uuid),
}

/// One `WHERE` conjunct. All column names come from crate-internal
/// descriptors, never from request input; only values are bound.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterPredicate {
    Equals {
        column: &'static str,
        value: FilterValue,
    },
    /// Case-insensitive prefix match, rendered as
    /// `LOWER(column) LIKE 'value%'` with the value lowercased host-side.
    LikePrefix {
        column: &'static str,
        value: String,
    },
    /// Inclusive timestamp range on a single column.
    Between {
        column: &'static str,
        start: OffsetDateTime,
        end: OffsetDateTime,
    },
    IsNull {
        column: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct ListQuery {
    from: &'static str,
    select: &'static str,
    key_column: &'static str,
    sortable: &'static [&'static str],
    filters: Vec<FilterPredicate>,
}

impl ListQuery {
    pub fn new(
        from: &'static str,
        select: &'static str,
        key_column: &'static str,
        sortable: &'static [&'static str],
    ) -> Self {
        Self {
            from,
            select,
            key_column,
            sortable,
            filters: Vec::new(),
        }
    }

    pub fn filter(mut self, predicate: FilterPredicate) -> Self {
        self.filters.push(predicate);
        self
    }

    pub fn filters(&self) -> &[FilterPredicate] {
        &self.filters
    }

    /// Resolve the request's sort selection against the allow-list, falling
    /// back to the stable key column when no sort was asked for.
    pub fn resolve_sort(
        &self,
        request: &PageRequest,
    ) -> Result<(&'static str, SortDirection), PaginationError> {
        match request.sort_field() {
            None => Ok((self.key_column, SortDirection::Asc)),
            Some(field) => match self.sortable.iter().find(|column| **column == field) {
                Some(column) => Ok((column, request.sort_direction())),
                None => Err(PaginationError::UnknownSortField(field.to_owned())),
            },
        }
    }

    pub fn count_builder(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT COUNT(*) FROM {} WHERE 1=1",
            self.from
        ));
        self.push_filters(&mut qb);
        qb
    }

    /// Render the page-window statement: filters, resolved sort and the
    /// limit/offset of the request. The sort column is always suffixed with
    /// the key column so equal-key rows page deterministically.
    pub fn page_builder(
        &self,
        request: &PageRequest,
    ) -> Result<QueryBuilder<'static, Postgres>, PaginationError> {
        let (sort_column, direction) = self.resolve_sort(request)?;

        let mut qb = QueryBuilder::new(format!(
            "SELECT {} FROM {} WHERE 1=1",
            self.select, self.from
        ));
        self.push_filters(&mut qb);

        qb.push(format!(" ORDER BY {} {}", sort_column, direction.as_sql()));
        if sort_column != self.key_column {
            qb.push(format!(", {} ASC", self.key_column));
        }
        qb.push(" LIMIT ");
        qb.push_bind(request.limit());
        qb.push(" OFFSET ");
        qb.push_bind(request.offset());

        Ok(qb)
    }

    fn push_filters(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        for predicate in &self.filters {
            match predicate {
                FilterPredicate::Equals { column, value } => {
                    qb.push(format!(" AND {column} = "));
                    match value {
                        FilterValue::Text(text) => qb.push_bind(text.clone()),
                        FilterValue::Uuid(id) => qb.push_bind(*id),
                    };
                }
                FilterPredicate::LikePrefix { column, value } => {
                    qb.push(format!(" AND LOWER({column}) LIKE "));
                    qb.push_bind(format!("{}%", value.to_lowercase()));
                }
                FilterPredicate::Between { column, start, end } => {
                    qb.push(format!(" AND {column} >= "));
                    qb.push_bind(*start);
                    qb.push(format!(" AND {column} <= "));
                    qb.push_bind(*end);
                }
                FilterPredicate::IsNull { column } => {
                    qb.push(format!(" AND {column} IS NULL"));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn customers_query() -> ListQuery {
        ListQuery::new(
            "customers",
            "customer_id, email",
            "customer_id",
            &["email", "created"],
        )
    }

    #[test]
    fn count_statement_shares_the_where_clause() {
        let query = customers_query()
            .filter(FilterPredicate::LikePrefix {
                column: "email",
                value: "Alice".into(),
            })
            .filter(FilterPredicate::IsNull { column: "deleted_at" });

        let qb = query.count_builder();
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM customers WHERE 1=1 \
             AND LOWER(email) LIKE $1 AND deleted_at IS NULL"
        );
    }

    #[test]
    fn page_statement_appends_sort_and_window() {
        let query = customers_query();
        let request = PageRequest::new(2, 10)
            .expect("valid request")
            .with_sort("email", SortDirection::Desc);

        let qb = query.page_builder(&request).expect("sortable field");
        assert_eq!(
            qb.sql(),
            "SELECT customer_id, email FROM customers WHERE 1=1 \
             ORDER BY email DESC, customer_id ASC LIMIT $1 OFFSET $2"
        );
    }

    #[test]
    fn default_sort_is_the_key_column() {
        let query = customers_query();
        let request = PageRequest::new(1, 10).expect("valid request");

        let qb = query.page_builder(&request).expect("default sort");
        assert_eq!(
            qb.sql(),
            "SELECT customer_id, email FROM customers WHERE 1=1 \
             ORDER BY customer_id ASC LIMIT $1 OFFSET $2"
        );
    }

    #[test]
    fn unknown_sort_field_is_rejected() {
        let query = customers_query();
        let request = PageRequest::new(1, 10)
            .expect("valid request")
            .with_sort("password_hash", SortDirection::Asc);

        assert_eq!(
            query.page_builder(&request).err(),
            Some(PaginationError::UnknownSortField("password_hash".into()))
        );
    }

    #[test]
    fn between_renders_an_inclusive_range() {
        let query = customers_query().filter(FilterPredicate::Between {
            column: "created",
            start: datetime!(2024-01-01 00:00 UTC),
            end: datetime!(2024-12-31 23:59 UTC),
        });

        let qb = query.count_builder();
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM customers WHERE 1=1 \
             AND created >= $1 AND created <= $2"
        );
    }

    #[test]
    fn prefix_filter_lowercases_host_side() {
        let query = customers_query().filter(FilterPredicate::LikePrefix {
            column: "email",
            value: "ALICE".into(),
        });
        // The bind payload is lowercased before it reaches the driver; the
        // statement text itself only carries the placeholder.
        match &query.filters()[0] {
            FilterPredicate::LikePrefix { value, .. } => assert_eq!(value, "ALICE"),
            other => panic!("unexpected predicate {other:?}"),
        }
        assert!(query.count_builder().sql().contains("LOWER(email) LIKE $1"));
    }
}
