//! Database schema definitions using sea-query.
//!
//! These define the table and column identifiers for type-safe query building.

use sea_query::Iden;

/// Activation records table schema.
#[derive(Iden)]
pub enum ActivationRecords {
    #[iden = "sim_card_activation_records"]
    Table,
    #[iden = "id"]
    Id,
    #[iden = "iccid"]
    Iccid,
    #[iden = "customer_email"]
    CustomerEmail,
    #[iden = "active"]
    Active,
    #[iden = "activation_timestamp"]
    ActivationTimestamp,
    #[iden = "actuator_response"]
    ActuatorResponse,
}

/// SQLite DDL for the activation records table.
///
/// The UNIQUE constraint on `iccid` is what makes concurrent first writes for
/// one ICCID resolve to a single authoritative record.
pub const SQLITE_CREATE_ACTIVATION_RECORDS: &[&str] = &[
    r#"
CREATE TABLE IF NOT EXISTS sim_card_activation_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    iccid TEXT NOT NULL UNIQUE,
    customer_email TEXT NOT NULL,
    active INTEGER NOT NULL,
    activation_timestamp TEXT NOT NULL,
    actuator_response TEXT NOT NULL DEFAULT ''
)"#,
    "CREATE INDEX IF NOT EXISTS idx_activation_customer ON sim_card_activation_records(customer_email)",
    "CREATE INDEX IF NOT EXISTS idx_activation_active ON sim_card_activation_records(active)",
];

/// PostgreSQL DDL for the activation records table.
pub const POSTGRES_CREATE_ACTIVATION_RECORDS: &[&str] = &[
    r#"
CREATE TABLE IF NOT EXISTS sim_card_activation_records (
    id BIGSERIAL PRIMARY KEY,
    iccid TEXT NOT NULL UNIQUE,
    customer_email TEXT NOT NULL,
    active BOOLEAN NOT NULL,
    activation_timestamp TEXT NOT NULL,
    actuator_response TEXT NOT NULL DEFAULT ''
)"#,
    "CREATE INDEX IF NOT EXISTS idx_activation_customer ON sim_card_activation_records(customer_email)",
    "CREATE INDEX IF NOT EXISTS idx_activation_active ON sim_card_activation_records(active)",
];
