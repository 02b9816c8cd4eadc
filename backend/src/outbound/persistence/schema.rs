//! Diesel table definitions. Must match `backend/migrations` exactly.

diesel::table! {
    /// Product catalogue. Ids are supplied by clients, not generated.
    productos (id) {
        id -> Int4,
        title -> Varchar,
        price -> Float8,
        thumbnail -> Varchar,
    }
}
