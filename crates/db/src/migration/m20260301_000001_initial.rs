//! Initial database migration.
//!
//! Creates all enums and tables, and seeds the transaction sequence
//! counter row.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(VENDORS_SQL).await?;
        db.execute_unprepared(TRANSACTIONS_SQL).await?;
        db.execute_unprepared(TRANSACTION_LINES_SQL).await?;
        db.execute_unprepared(COUNTERS_SQL).await?;
        db.execute_unprepared(DOCUMENTS_SQL).await?;
        db.execute_unprepared(SEED_COUNTERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE account_type AS ENUM ('income', 'expense');

CREATE TYPE transaction_state AS ENUM ('draft', 'posted', 'cancel');

CREATE TYPE user_role AS ENUM ('superadmin', 'admin', 'staff');

CREATE TYPE user_status AS ENUM ('active', 'inactive');

CREATE TYPE document_type AS ENUM ('pdf', 'excel');
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL UNIQUE,
    password_hash VARCHAR(255) NOT NULL,
    role user_role NOT NULL DEFAULT 'staff',
    status user_status NOT NULL DEFAULT 'active',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    account_type account_type NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const VENDORS_SQL: &str = r"
CREATE TABLE vendors (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id UUID PRIMARY KEY,
    seq BIGINT NOT NULL,
    name VARCHAR(64) NOT NULL UNIQUE,
    date TIMESTAMPTZ NOT NULL,
    user_id UUID NOT NULL REFERENCES users(id),
    state transaction_state NOT NULL DEFAULT 'posted',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_transactions_date ON transactions(date);
CREATE INDEX idx_transactions_user ON transactions(user_id);
";

const TRANSACTION_LINES_SQL: &str = r"
CREATE TABLE transaction_lines (
    id UUID PRIMARY KEY,
    date TIMESTAMPTZ NOT NULL,
    label VARCHAR(255),
    transaction_id UUID REFERENCES transactions(id),
    account_id UUID NOT NULL REFERENCES accounts(id),
    vendor_id UUID REFERENCES vendors(id),
    user_id UUID NOT NULL REFERENCES users(id),
    debit NUMERIC(19, 4) NOT NULL DEFAULT 0 CHECK (debit >= 0),
    credit NUMERIC(19, 4) NOT NULL DEFAULT 0 CHECK (credit >= 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_lines_transaction ON transaction_lines(transaction_id);
CREATE INDEX idx_lines_account ON transaction_lines(account_id);
CREATE INDEX idx_lines_vendor ON transaction_lines(vendor_id);
CREATE INDEX idx_lines_date ON transaction_lines(date);
";

const COUNTERS_SQL: &str = r"
CREATE TABLE counters (
    id UUID PRIMARY KEY,
    key VARCHAR(64) NOT NULL UNIQUE,
    seq BIGINT NOT NULL DEFAULT 0 CHECK (seq >= 0),
    prefix_width INTEGER NOT NULL DEFAULT 0,
    suffix_width INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const DOCUMENTS_SQL: &str = r"
CREATE TABLE documents (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    document_type document_type NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const SEED_COUNTERS_SQL: &str = r"
INSERT INTO counters (id, key, seq, prefix_width, suffix_width)
VALUES (gen_random_uuid(), 'transaction_seq', 0, 5, 0);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS documents;
DROP TABLE IF EXISTS counters;
DROP TABLE IF EXISTS transaction_lines;
DROP TABLE IF EXISTS transactions;
DROP TABLE IF EXISTS vendors;
DROP TABLE IF EXISTS accounts;
DROP TABLE IF EXISTS users;

DROP TYPE IF EXISTS document_type;
DROP TYPE IF EXISTS user_status;
DROP TYPE IF EXISTS user_role;
DROP TYPE IF EXISTS transaction_state;
DROP TYPE IF EXISTS account_type;
";
