use sqlx::SqlitePool;

pub struct Database {
    pub(crate) pool: SqlitePool,
}
