// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! `MariaDB`/`MySQL` connection bootstrap.
//!
//! Always compiled, but only exercised by the opt-in validation tests:
//!
//! ```bash
//! cargo xtask test-mariadb
//! ```
//!
//! The xtask starts a `MariaDB` container, exports `DATABASE_URL` and
//! `VISIT_SCHEDULER_TEST_BACKEND=mariadb`, runs the `#[ignore]` tests and
//! removes the container afterwards.

use diesel::dsl::sql;
use diesel::sql_types::{BigInt, Integer};
use diesel::{Connection, MysqlConnection, QueryableByName, RunQueryDsl};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info};

use crate::error::PersistenceError;

/// Migrations written in `MySQL` dialect (`InnoDB`, `VARCHAR` keys,
/// `AUTO_INCREMENT`).
pub const MYSQL_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations_mysql");

#[derive(QueryableByName)]
struct ForeignKeyChecks {
    #[diesel(sql_type = Integer)]
    fk_checks: i32,
}

/// Returns `LAST_INSERT_ID()` for this connection.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn last_insert_id(conn: &mut MysqlConnection) -> Result<i64, PersistenceError> {
    Ok(diesel::select(sql::<BigInt>("LAST_INSERT_ID()")).get_result(conn)?)
}

/// Connects to `database_url` and applies pending migrations.
///
/// # Errors
///
/// Returns an error if the connection or migrations fail.
pub fn initialize_database(database_url: &str) -> Result<MysqlConnection, PersistenceError> {
    info!("Connecting to MySQL database");

    let mut conn = MysqlConnection::establish(database_url)
        .map_err(|e| PersistenceError::DatabaseConnectionFailed(e.to_string()))?;

    let applied = conn
        .run_pending_migrations(MYSQL_MIGRATIONS)
        .map_err(|e| PersistenceError::MigrationFailed(e.to_string()))?;
    info!(count = applied.len(), "Applied MySQL migrations");

    Ok(conn)
}

/// Fails unless `@@foreign_key_checks` is set.
///
/// # Errors
///
/// Returns `ForeignKeyEnforcementNotEnabled` or a query error.
pub fn verify_foreign_keys(conn: &mut MysqlConnection) -> Result<(), PersistenceError> {
    let checks: ForeignKeyChecks =
        diesel::sql_query("SELECT @@foreign_key_checks AS fk_checks")
            .get_result(conn)
            .map_err(|e| {
                PersistenceError::QueryFailed(format!("foreign key check failed: {e}"))
            })?;

    if checks.fk_checks != 1 {
        return Err(PersistenceError::ForeignKeyEnforcementNotEnabled);
    }

    debug!("MySQL foreign key enforcement is enabled");
    Ok(())
}
