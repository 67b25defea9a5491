//! One dialect per supported SQL target (§6's "SQL output" list).

pub mod generic;
pub mod mysql;
pub mod pgsphere;
pub mod postgres;
pub mod sqlserver;

pub use generic::GenericDialect;
pub use mysql::MysqlDialect;
pub use pgsphere::PgSphereDialect;
pub use postgres::PostgresDialect;
pub use sqlserver::SqlServerDialect;
