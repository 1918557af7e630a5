//! SQLite schema definition.

/// Complete database schema for IPD billing.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    uhid TEXT PRIMARY KEY,
    full_name TEXT NOT NULL,
    age INTEGER,
    gender TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_patients_name ON patients(full_name);

-- ============================================================================
-- IPD Admissions
-- ============================================================================

CREATE TABLE IF NOT EXISTS ipd_admissions (
    ipd_no TEXT PRIMARY KEY,
    uhid TEXT NOT NULL REFERENCES patients(uhid),
    opd_no TEXT,
    admission_date TEXT NOT NULL,                -- YYYY-MM-DD
    ward TEXT NOT NULL DEFAULT '',
    bed_number TEXT NOT NULL DEFAULT '',
    admission_reason TEXT,
    deposit_amount TEXT NOT NULL DEFAULT '0',    -- decimal as text
    status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'discharged')),
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_admissions_uhid ON ipd_admissions(uhid);
CREATE INDEX IF NOT EXISTS idx_admissions_status ON ipd_admissions(status);

-- ============================================================================
-- Discharge Summaries (one per admission, immutable once written)
-- ============================================================================

CREATE TABLE IF NOT EXISTS discharge_summaries (
    ipd_no TEXT PRIMARY KEY REFERENCES ipd_admissions(ipd_no),
    date_of_discharge TEXT NOT NULL,             -- YYYY-MM-DD
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TRIGGER IF NOT EXISTS discharge_summaries_immutable
BEFORE UPDATE OF date_of_discharge ON discharge_summaries
BEGIN
    SELECT RAISE(ABORT, 'Discharge date cannot be changed once recorded');
END;

-- ============================================================================
-- Procedure Rate Catalog
-- ============================================================================

CREATE TABLE IF NOT EXISTS procedures (
    procedure_name TEXT PRIMARY KEY,             -- exact, case-sensitive key
    charges_per_day TEXT NOT NULL DEFAULT '0',   -- decimal as text
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Procedure Entries
-- ============================================================================

CREATE TABLE IF NOT EXISTS procedure_entries (
    id TEXT PRIMARY KEY,
    ipd_no TEXT NOT NULL REFERENCES ipd_admissions(ipd_no),
    procedure_name TEXT NOT NULL,
    start_date TEXT NOT NULL,                    -- YYYY-MM-DD
    end_date TEXT NOT NULL,                      -- YYYY-MM-DD
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_procedure_entries_stay ON procedure_entries(ipd_no, start_date);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        assert!(conn.execute_batch(SCHEMA).is_ok());
    }

    #[test]
    fn test_admission_status_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn.execute(
            "INSERT INTO patients (uhid, full_name) VALUES ('U1', 'Test Patient')",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO ipd_admissions (ipd_no, uhid, admission_date, status) VALUES ('IPD-1', 'U1', '2024-01-01', 'archived')",
            [],
        );
        assert!(result.is_err());

        let result = conn.execute(
            "INSERT INTO ipd_admissions (ipd_no, uhid, admission_date) VALUES ('IPD-1', 'U1', '2024-01-01')",
            [],
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_admission_requires_patient() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let result = conn.execute(
            "INSERT INTO ipd_admissions (ipd_no, uhid, admission_date) VALUES ('IPD-1', 'missing', '2024-01-01')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_discharge_date_immutable() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO patients (uhid, full_name) VALUES ('U1', 'Test Patient');
            INSERT INTO ipd_admissions (ipd_no, uhid, admission_date) VALUES ('IPD-1', 'U1', '2024-01-01');
            INSERT INTO discharge_summaries (ipd_no, date_of_discharge) VALUES ('IPD-1', '2024-01-05');
            "#,
        )
        .unwrap();

        let result = conn.execute(
            "UPDATE discharge_summaries SET date_of_discharge = '2024-01-09' WHERE ipd_no = 'IPD-1'",
            [],
        );
        assert!(result.is_err());
    }
}
