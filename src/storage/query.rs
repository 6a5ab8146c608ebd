//! Typed SELECT builder shared by every repository.
//!
//! Columns come from each entity's generated `Column` enum, so the column set
//! is fixed and ordered per table and rows map back through the entity's
//! `FromQueryResult` implementation. Filters carry an explicit `Option`:
//! `None` leaves the column unconstrained, `Some(v)` always constrains it,
//! including `Some(0)` and `Some("")`.
//!
//! Every builder method takes `&self` and returns a new value, so a base
//! query can be shared and refined per request.

use std::marker::PhantomData;
use std::str::FromStr;

use sea_orm::sea_query::{Expr, Order, Query, SelectStatement, SimpleExpr};
use sea_orm::{
    ConnectionTrait, EntityName, EntityTrait, Iterable, PrimaryKeyToColumn, Statement, Value,
};

use super::Dialect;
use crate::error::RepositoryError;

/// SELECT over all columns of entity `E`.
pub struct SelectQuery<E: EntityTrait> {
    filters: Vec<SimpleExpr>,
    order_by: Vec<(E::Column, Order)>,
    limit: Option<u64>,
    offset: Option<u64>,
    entity: PhantomData<E>,
}

impl<E: EntityTrait> Clone for SelectQuery<E> {
    fn clone(&self) -> Self {
        Self {
            filters: self.filters.clone(),
            order_by: self.order_by.clone(),
            limit: self.limit,
            offset: self.offset,
            entity: PhantomData,
        }
    }
}

impl<E: EntityTrait> Default for SelectQuery<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntityTrait> SelectQuery<E> {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            entity: PhantomData,
        }
    }

    /// Adds `column = value` when `value` is set; an unset value is skipped.
    pub fn equals<V: Into<Value>>(&self, column: E::Column, value: Option<V>) -> Self {
        let mut next = self.clone();
        if let Some(value) = value {
            let value: Value = value.into();
            next.filters.push(Expr::col(column).eq(value));
        }
        next
    }

    /// Same as [`equals`](Self::equals) but addresses the column by its SQL name.
    pub fn equals_named<V: Into<Value>>(
        &self,
        column: &str,
        value: Option<V>,
    ) -> Result<Self, RepositoryError> {
        let parsed = E::Column::from_str(column).map_err(|_| RepositoryError::UnknownColumn {
            table: E::default().table_name().to_string(),
            column: column.to_string(),
        })?;
        Ok(self.equals(parsed, value))
    }

    /// Overrides the default primary-key ascending order.
    pub fn order_by(&self, column: E::Column, order: Order) -> Self {
        let mut next = self.clone();
        next.order_by.push((column, order));
        next
    }

    /// Applies LIMIT/OFFSET; a zero limit or offset is skipped.
    pub fn with_paging(&self, limit: u64, offset: u64) -> Self {
        let mut next = self.clone();
        next.limit = (limit > 0).then_some(limit);
        next.offset = (offset > 0).then_some(offset);
        next
    }

    /// Adds `column IN (values)`. An empty `values` matches no row.
    pub fn one_of<V, I>(&self, column: E::Column, values: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        let mut next = self.clone();
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        next.filters.push(Expr::col(column).is_in(values));
        next
    }

    /// Backend-neutral statement.
    pub fn statement(&self) -> SelectStatement {
        let mut select = Query::select();
        select
            .columns(E::Column::iter())
            .from(E::default().table_ref());

        for filter in &self.filters {
            select.and_where(filter.clone());
        }

        if self.order_by.is_empty() {
            for key in E::PrimaryKey::iter() {
                select.order_by(key.into_column(), Order::Asc);
            }
        } else {
            for (column, order) in &self.order_by {
                select.order_by(*column, order.clone());
            }
        }

        if let Some(limit) = self.limit {
            select.limit(limit);
        }
        if let Some(offset) = self.offset {
            select.offset(offset);
        }
        select
    }

    /// Renders the statement with the dialect's placeholder syntax.
    pub fn build(&self, dialect: Dialect) -> Statement {
        dialect.build(&self.statement())
    }

    pub async fn all<C: ConnectionTrait>(
        &self,
        db: &C,
        dialect: Dialect,
    ) -> Result<Vec<E::Model>, RepositoryError> {
        let rows = E::find()
            .from_raw_sql(self.build(dialect))
            .all(db)
            .await?;
        Ok(rows)
    }

    pub async fn one<C: ConnectionTrait>(
        &self,
        db: &C,
        dialect: Dialect,
    ) -> Result<Option<E::Model>, RepositoryError> {
        let limited = SelectQuery {
            limit: Some(1),
            ..self.clone()
        };
        let row = E::find()
            .from_raw_sql(limited.build(dialect))
            .one(db)
            .await?;
        Ok(row)
    }
}
