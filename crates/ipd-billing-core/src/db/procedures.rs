//! Procedure entry and procedure rate catalog operations.

use rusqlite::{params, OptionalExtension};

use super::{parse_amount, Database, DbError, DbResult};
use crate::models::{ProcedureEntry, ProcedureRate};

impl Database {
    /// Record a procedure course for a stay.
    pub fn insert_procedure_entry(&self, entry: &ProcedureEntry) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO procedure_entries (id, ipd_no, procedure_name, start_date, end_date)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                entry.id,
                entry.ipd_no,
                entry.procedure_name,
                entry.start_date,
                entry.end_date,
            ],
        )?;
        Ok(())
    }

    /// List procedure entries for a stay, earliest start first.
    pub fn list_procedure_entries(&self, ipd_no: &str) -> DbResult<Vec<ProcedureEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, ipd_no, procedure_name, start_date, end_date
            FROM procedure_entries
            WHERE ipd_no = ?
            ORDER BY start_date ASC, created_at ASC, rowid ASC
            "#,
        )?;

        let rows = stmt.query_map([ipd_no], |row| {
            Ok(ProcedureEntry {
                id: row.get(0)?,
                ipd_no: row.get(1)?,
                procedure_name: row.get(2)?,
                start_date: row.get(3)?,
                end_date: row.get(4)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Delete a procedure entry.
    pub fn delete_procedure_entry(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM procedure_entries WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    /// Insert or update a catalog rate.
    pub fn upsert_procedure_rate(&self, rate: &ProcedureRate) -> DbResult<()> {
        if rate.charges_per_day.is_sign_negative() {
            return Err(DbError::InvalidAmount(format!(
                "rate for '{}' is negative: {}",
                rate.procedure_name, rate.charges_per_day
            )));
        }

        self.conn.execute(
            r#"
            INSERT INTO procedures (procedure_name, charges_per_day, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(procedure_name) DO UPDATE SET
                charges_per_day = excluded.charges_per_day,
                updated_at = datetime('now')
            "#,
            params![rate.procedure_name, rate.charges_per_day.to_string()],
        )?;
        Ok(())
    }

    /// Get the catalog rate for an exact (case-sensitive) procedure name.
    pub fn get_procedure_rate(&self, procedure_name: &str) -> DbResult<Option<ProcedureRate>> {
        let result: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT procedure_name, charges_per_day FROM procedures WHERE procedure_name = ?",
                [procedure_name],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        result
            .map(|(name, raw)| -> DbResult<ProcedureRate> {
                Ok(ProcedureRate {
                    charges_per_day: parse_amount("charges_per_day", &raw)?,
                    procedure_name: name,
                })
            })
            .transpose()
    }

    /// List the whole rate catalog, ordered by name.
    pub fn list_procedure_rates(&self) -> DbResult<Vec<ProcedureRate>> {
        let mut stmt = self.conn.prepare(
            "SELECT procedure_name, charges_per_day FROM procedures ORDER BY procedure_name",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut rates = Vec::new();
        for row in rows {
            let (name, raw) = row?;
            rates.push(ProcedureRate {
                charges_per_day: parse_amount("charges_per_day", &raw)?,
                procedure_name: name,
            });
        }
        Ok(rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Admission, Patient};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.insert_patient(&Patient::new("UHID-1".into(), "Test Patient".into()))
            .unwrap();
        let mut admission = Admission::new("UHID-1".into(), date(2024, 1, 1), "W1".into(), "1".into());
        admission.ipd_no = "IPD-1".into();
        db.insert_admission(&admission).unwrap();
        db
    }

    #[test]
    fn test_entries_ordered_by_start_date() {
        let db = setup_db();
        db.insert_procedure_entry(&ProcedureEntry::new(
            "IPD-1".into(),
            "Basti".into(),
            date(2024, 1, 4),
            date(2024, 1, 5),
        ))
        .unwrap();
        db.insert_procedure_entry(&ProcedureEntry::new(
            "IPD-1".into(),
            "Abhyanga".into(),
            date(2024, 1, 2),
            date(2024, 1, 3),
        ))
        .unwrap();

        let entries = db.list_procedure_entries("IPD-1").unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.procedure_name.as_str()).collect();
        assert_eq!(names, vec!["Abhyanga", "Basti"]);
        assert_eq!(entries[0].start_date, date(2024, 1, 2));
    }

    #[test]
    fn test_entries_for_unknown_stay_empty() {
        let db = setup_db();
        assert!(db.list_procedure_entries("IPD-404").unwrap().is_empty());
    }

    #[test]
    fn test_entry_requires_admission() {
        let db = setup_db();
        let entry = ProcedureEntry::new("IPD-404".into(), "Basti".into(), date(2024, 1, 1), date(2024, 1, 1));
        assert!(db.insert_procedure_entry(&entry).is_err());
    }

    #[test]
    fn test_delete_entry() {
        let db = setup_db();
        let entry = ProcedureEntry::new("IPD-1".into(), "Basti".into(), date(2024, 1, 1), date(2024, 1, 2));
        db.insert_procedure_entry(&entry).unwrap();

        assert!(db.delete_procedure_entry(&entry.id).unwrap());
        assert!(!db.delete_procedure_entry(&entry.id).unwrap());
        assert!(db.list_procedure_entries("IPD-1").unwrap().is_empty());
    }

    #[test]
    fn test_upsert_and_get_rate() {
        let db = setup_db();
        db.upsert_procedure_rate(&ProcedureRate::new("Abhyanga".into(), Decimal::from(200)))
            .unwrap();

        let rate = db.get_procedure_rate("Abhyanga").unwrap().unwrap();
        assert_eq!(rate.charges_per_day, Decimal::from(200));

        db.upsert_procedure_rate(&ProcedureRate::new("Abhyanga".into(), Decimal::new(22550, 2)))
            .unwrap();
        let rate = db.get_procedure_rate("Abhyanga").unwrap().unwrap();
        assert_eq!(rate.charges_per_day, Decimal::new(22550, 2));
    }

    #[test]
    fn test_rate_lookup_is_case_sensitive() {
        let db = setup_db();
        db.upsert_procedure_rate(&ProcedureRate::new("Abhyanga".into(), Decimal::from(200)))
            .unwrap();

        assert!(db.get_procedure_rate("abhyanga").unwrap().is_none());
        assert!(db.get_procedure_rate("Abhyanga ").unwrap().is_none());
    }

    #[test]
    fn test_negative_rate_rejected() {
        let db = setup_db();
        let result = db.upsert_procedure_rate(&ProcedureRate::new("Basti".into(), Decimal::from(-1)));
        assert!(matches!(result, Err(DbError::InvalidAmount(_))));
    }

    #[test]
    fn test_list_rates() {
        let db = setup_db();
        db.upsert_procedure_rate(&ProcedureRate::new("Shirodhara".into(), Decimal::from(400)))
            .unwrap();
        db.upsert_procedure_rate(&ProcedureRate::new("Basti".into(), Decimal::from(300)))
            .unwrap();

        let rates = db.list_procedure_rates().unwrap();
        let names: Vec<_> = rates.iter().map(|r| r.procedure_name.as_str()).collect();
        assert_eq!(names, vec!["Basti", "Shirodhara"]);
    }
}
