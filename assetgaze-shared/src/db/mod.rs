/// Database layer
///
/// - `pool`: PostgreSQL connection pool with health checks
/// - `migrations`: embedded migration runner
///
/// The SQL for each table lives next to its model in [`crate::models`].

pub mod migrations;
pub mod pool;
