//! SQL dialect selection.
//!
//! The dialect is chosen once, from the configured driver name or the URL
//! scheme, and decides how positional parameters are rendered.

use sea_orm::{DatabaseBackend, Statement, StatementBuilder};

/// SQL engines the controller can run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// SQLite, used for tests and local development. Placeholders are `?`.
    Sqlite,
    /// PostgreSQL, used in production. Placeholders are `$1`, `$2`, ...
    Postgres,
}

impl Dialect {
    /// Maps a driver name as found in deployment configuration.
    pub fn from_driver_name(driver: &str) -> Option<Self> {
        match driver.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => Some(Self::Sqlite),
            "postgres" | "postgresql" | "pgx" | "pq" => Some(Self::Postgres),
            _ => None,
        }
    }

    /// Derives the dialect from a connection URL scheme.
    pub fn from_url(database_url: &str) -> Option<Self> {
        let scheme = database_url.split(':').next()?;
        Self::from_driver_name(scheme)
    }

    pub fn backend(self) -> DatabaseBackend {
        match self {
            Self::Sqlite => DatabaseBackend::Sqlite,
            Self::Postgres => DatabaseBackend::Postgres,
        }
    }

    /// Placeholder for the parameter at 1-based `position`.
    pub fn placeholder(self, position: usize) -> String {
        match self {
            Self::Sqlite => "?".to_string(),
            Self::Postgres => format!("${position}"),
        }
    }

    /// Statement that moves `table`'s id sequence past its highest id, needed
    /// after inserting explicit ids on engines whose sequences do not follow
    /// them. SQLite picks the next rowid from the table itself, so it has none.
    pub fn serial_resync(self, table: &str) -> Option<Statement> {
        match self {
            Self::Sqlite => None,
            Self::Postgres => Some(Statement::from_string(
                self.backend(),
                format!(
                    "SELECT setval(pg_get_serial_sequence('{table}', 'id'), \
                     COALESCE(MAX(id), 0) + 1, false) FROM \"{table}\""
                ),
            )),
        }
    }

    /// Renders a backend-neutral statement into SQL text plus bound values.
    pub fn build<S: StatementBuilder>(self, statement: &S) -> Statement {
        self.backend().build(statement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_names_map_to_dialects() {
        assert_eq!(Dialect::from_driver_name("sqlite3"), Some(Dialect::Sqlite));
        assert_eq!(Dialect::from_driver_name("Postgres"), Some(Dialect::Postgres));
        assert_eq!(Dialect::from_driver_name("pgx"), Some(Dialect::Postgres));
        assert_eq!(Dialect::from_driver_name("mysql"), None);
    }

    #[test]
    fn url_schemes_map_to_dialects() {
        assert_eq!(Dialect::from_url("sqlite::memory:"), Some(Dialect::Sqlite));
        assert_eq!(
            Dialect::from_url("sqlite://controller.db?mode=rwc"),
            Some(Dialect::Sqlite)
        );
        assert_eq!(
            Dialect::from_url("postgresql://user:pw@localhost/controller"),
            Some(Dialect::Postgres)
        );
        assert_eq!(Dialect::from_url("controller.db"), None);
    }

    #[test]
    fn placeholders_follow_dialect() {
        assert_eq!(Dialect::Sqlite.placeholder(3), "?");
        assert_eq!(Dialect::Postgres.placeholder(3), "$3");
    }

    #[test]
    fn only_postgres_resyncs_id_sequences() {
        assert!(Dialect::Sqlite.serial_resync("cluster").is_none());

        let stmt = Dialect::Postgres.serial_resync("cluster").unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT setval(pg_get_serial_sequence('cluster', 'id'), \
             COALESCE(MAX(id), 0) + 1, false) FROM \"cluster\""
        );
        assert!(stmt.values.is_none());
    }
}
