//! Initial database migration.
//!
//! Creates the customer, sales-document and current-account tables,
//! their enums, the document-number sequences and the integrity
//! triggers.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: CUSTOMERS
        // ============================================================
        db.execute_unprepared(CUSTOMERS_SQL).await?;

        // ============================================================
        // PART 3: SALES DOCUMENTS
        // ============================================================
        db.execute_unprepared(SALES_SQL).await?;
        db.execute_unprepared(SALE_ITEMS_SQL).await?;

        // ============================================================
        // PART 4: PAYMENTS & CREDIT NOTES
        // ============================================================
        db.execute_unprepared(PAYMENTS_SQL).await?;
        db.execute_unprepared(CREDIT_NOTES_SQL).await?;

        // ============================================================
        // PART 5: CURRENT-ACCOUNT LEDGER
        // ============================================================
        db.execute_unprepared(LEDGER_ENTRIES_SQL).await?;

        // ============================================================
        // PART 6: DOCUMENT NUMBER SEQUENCES
        // ============================================================
        db.execute_unprepared(SEQUENCES_SQL).await?;

        // ============================================================
        // PART 7: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

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
-- Customer fiscal classification
CREATE TYPE tax_category AS ENUM (
    'registered_responsible',
    'monotax',
    'exempt',
    'final_consumer'
);

-- Sale lifecycle
CREATE TYPE sale_status AS ENUM ('draft', 'confirmed', 'cancelled');

-- Invoice letter
CREATE TYPE invoice_type AS ENUM ('a', 'b', 'c');

-- IVA rate of a sale line
CREATE TYPE iva_rate AS ENUM (
    'zero',
    'ten_half',
    'twenty_one',
    'twenty_seven',
    'exempt',
    'not_taxed'
);

-- Electronic invoicing state of a sale
CREATE TYPE invoicing_state AS ENUM (
    'uninvoiced',
    'invoiced',
    'authorized_unrecorded'
);

-- Payment method
CREATE TYPE payment_method AS ENUM ('cash', 'transfer', 'check', 'other');

-- Current-account movement direction (debe/haber)
CREATE TYPE ledger_direction AS ENUM ('debit', 'credit');
";

const CUSTOMERS_SQL: &str = r"
CREATE TABLE customers (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    tax_id VARCHAR(20),
    tax_category tax_category,
    email VARCHAR(255),
    phone VARCHAR(50),
    address VARCHAR(500),
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_customers_name ON customers(name) WHERE is_active = true;
";

const SALES_SQL: &str = r"
CREATE TABLE sales (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    number VARCHAR(20) NOT NULL UNIQUE,
    customer_id UUID NOT NULL REFERENCES customers(id),
    status sale_status NOT NULL DEFAULT 'draft',
    is_white BOOLEAN NOT NULL DEFAULT true,
    sale_date DATE NOT NULL,
    invoice_type invoice_type NOT NULL,
    point_of_sale INTEGER NOT NULL DEFAULT 1,
    taxed_net NUMERIC(19, 4) NOT NULL DEFAULT 0,
    untaxed_net NUMERIC(19, 4) NOT NULL DEFAULT 0,
    exempt_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    iva_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    gross_income_perception NUMERIC(19, 4) NOT NULL DEFAULT 0,
    total NUMERIC(19, 4) NOT NULL DEFAULT 0,
    invoicing_state invoicing_state NOT NULL DEFAULT 'uninvoiced',
    invoice_number BIGINT,
    invoice_full_number VARCHAR(30),
    cae VARCHAR(20),
    cae_expiry DATE,
    invoicing_note TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_sales_customer ON sales(customer_id, sale_date);
CREATE INDEX idx_sales_needs_invoicing ON sales(invoicing_state, created_at)
    WHERE invoicing_state <> 'invoiced';
";

const SALE_ITEMS_SQL: &str = r"
CREATE TABLE sale_items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    sale_id UUID NOT NULL REFERENCES sales(id) ON DELETE CASCADE,
    description VARCHAR(500) NOT NULL,
    quantity NUMERIC(19, 4) NOT NULL,
    unit_price NUMERIC(19, 4) NOT NULL,
    iva_rate iva_rate NOT NULL,
    net_amount NUMERIC(19, 4) NOT NULL,
    iva_amount NUMERIC(19, 4) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_quantity_positive CHECK (quantity > 0)
);

CREATE INDEX idx_sale_items_sale ON sale_items(sale_id);
";

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    number VARCHAR(20) NOT NULL UNIQUE,
    customer_id UUID NOT NULL REFERENCES customers(id),
    amount NUMERIC(19, 4) NOT NULL,
    method payment_method NOT NULL DEFAULT 'cash',
    payment_date DATE NOT NULL,
    reference VARCHAR(255),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_payment_amount_positive CHECK (amount > 0)
);

CREATE INDEX idx_payments_customer ON payments(customer_id, payment_date);
";

const CREDIT_NOTES_SQL: &str = r"
CREATE TABLE credit_notes (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    number VARCHAR(20) NOT NULL UNIQUE,
    customer_id UUID NOT NULL REFERENCES customers(id),
    sale_id UUID REFERENCES sales(id),
    amount NUMERIC(19, 4) NOT NULL,
    reason TEXT NOT NULL,
    note_date DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_credit_note_amount_positive CHECK (amount > 0)
);

CREATE INDEX idx_credit_notes_customer ON credit_notes(customer_id, note_date);
";

const LEDGER_ENTRIES_SQL: &str = r"
CREATE TABLE ledger_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    customer_id UUID NOT NULL REFERENCES customers(id),
    seq BIGINT NOT NULL,
    direction ledger_direction NOT NULL,
    concept VARCHAR(500) NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    previous_balance NUMERIC(19, 4) NOT NULL,
    running_balance NUMERIC(19, 4) NOT NULL,
    occurred_at DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    reference VARCHAR(100),
    sale_id UUID REFERENCES sales(id),
    payment_id UUID REFERENCES payments(id),
    credit_note_id UUID REFERENCES credit_notes(id),
    reverses_entry_id UUID REFERENCES ledger_entries(id),
    CONSTRAINT chk_entry_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_entry_seq_positive CHECK (seq > 0),
    UNIQUE (customer_id, seq)
);

CREATE INDEX idx_ledger_entries_statement ON ledger_entries(customer_id, occurred_at, seq);
";

const SEQUENCES_SQL: &str = r"
CREATE SEQUENCE sale_number_seq START 1;
CREATE SEQUENCE payment_number_seq START 1;
CREATE SEQUENCE credit_note_number_seq START 1;
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: set_updated_at
-- Keeps updated_at current on every row update
-- ============================================================
CREATE OR REPLACE FUNCTION set_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at := now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_customers_updated_at
BEFORE UPDATE ON customers
FOR EACH ROW
EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_sales_updated_at
BEFORE UPDATE ON sales
FOR EACH ROW
EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_sale_items_updated_at
BEFORE UPDATE ON sale_items
FOR EACH ROW
EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_payments_updated_at
BEFORE UPDATE ON payments
FOR EACH ROW
EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_credit_notes_updated_at
BEFORE UPDATE ON credit_notes
FOR EACH ROW
EXECUTE FUNCTION set_updated_at();

-- ============================================================
-- FUNCTION: enforce_ledger_append_only
-- Ledger entries are never deleted and their movement fields are
-- immutable; the balance-recompute repair may rewrite balances only
-- ============================================================
CREATE OR REPLACE FUNCTION enforce_ledger_append_only()
RETURNS TRIGGER AS $$
BEGIN
    IF TG_OP = 'DELETE' THEN
        RAISE EXCEPTION 'Ledger entries cannot be deleted. Post a reversing entry instead.';
    END IF;

    IF NEW.customer_id <> OLD.customer_id
        OR NEW.seq <> OLD.seq
        OR NEW.direction <> OLD.direction
        OR NEW.amount <> OLD.amount THEN
        RAISE EXCEPTION 'Ledger entry movements are immutable. Post a reversing entry instead.';
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_ledger_append_only
BEFORE UPDATE OR DELETE ON ledger_entries
FOR EACH ROW
EXECUTE FUNCTION enforce_ledger_append_only();
";

const DROP_ALL_SQL: &str = r"
-- ============================================================
-- DROP ALL: Rollback migration
-- Order matters due to foreign key constraints
-- ============================================================

-- Drop triggers
DROP TRIGGER IF EXISTS trg_ledger_append_only ON ledger_entries;
DROP TRIGGER IF EXISTS trg_credit_notes_updated_at ON credit_notes;
DROP TRIGGER IF EXISTS trg_payments_updated_at ON payments;
DROP TRIGGER IF EXISTS trg_sale_items_updated_at ON sale_items;
DROP TRIGGER IF EXISTS trg_sales_updated_at ON sales;
DROP TRIGGER IF EXISTS trg_customers_updated_at ON customers;

-- Drop functions
DROP FUNCTION IF EXISTS enforce_ledger_append_only();
DROP FUNCTION IF EXISTS set_updated_at();

-- Drop sequences
DROP SEQUENCE IF EXISTS credit_note_number_seq;
DROP SEQUENCE IF EXISTS payment_number_seq;
DROP SEQUENCE IF EXISTS sale_number_seq;

-- Drop tables (reverse order of creation)
DROP TABLE IF EXISTS ledger_entries CASCADE;
DROP TABLE IF EXISTS credit_notes CASCADE;
DROP TABLE IF EXISTS payments CASCADE;
DROP TABLE IF EXISTS sale_items CASCADE;
DROP TABLE IF EXISTS sales CASCADE;
DROP TABLE IF EXISTS customers CASCADE;

-- Drop enums
DROP TYPE IF EXISTS ledger_direction CASCADE;
DROP TYPE IF EXISTS payment_method CASCADE;
DROP TYPE IF EXISTS invoicing_state CASCADE;
DROP TYPE IF EXISTS iva_rate CASCADE;
DROP TYPE IF EXISTS invoice_type CASCADE;
DROP TYPE IF EXISTS sale_status CASCADE;
DROP TYPE IF EXISTS tax_category CASCADE;
";
