//! Diesel row structs. Persistence details only; never exposed to the domain.

use diesel::prelude::*;

use super::schema::productos;

/// Row read from `productos`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = productos)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProductRow {
    pub id: i32,
    pub title: String,
    pub price: f64,
    pub thumbnail: String,
}

/// Row written to `productos`.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = productos)]
pub(crate) struct ProductUpsert<'a> {
    pub id: i32,
    pub title: &'a str,
    pub price: f64,
    pub thumbnail: &'a str,
}
