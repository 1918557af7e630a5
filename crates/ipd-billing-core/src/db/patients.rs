//! Patient database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};
use crate::models::Patient;

impl Database {
    /// Register a new patient.
    pub fn insert_patient(&self, patient: &Patient) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO patients (uhid, full_name, age, gender, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                patient.uhid,
                patient.full_name,
                patient.age,
                patient.gender,
                patient.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get a patient by UHID.
    pub fn get_patient(&self, uhid: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                r#"
                SELECT uhid, full_name, age, gender, created_at
                FROM patients
                WHERE uhid = ?
                "#,
                [uhid],
                |row| {
                    Ok(Patient {
                        uhid: row.get(0)?,
                        full_name: row.get(1)?,
                        age: row.get(2)?,
                        gender: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Search patients by name or UHID (prefix match).
    pub fn search_patients(&self, query: &str, limit: usize) -> DbResult<Vec<Patient>> {
        let pattern = format!("{}%", query);
        let mut stmt = self.conn.prepare(
            r#"
            SELECT uhid, full_name, age, gender, created_at
            FROM patients
            WHERE full_name LIKE ?1 OR uhid LIKE ?1
            ORDER BY full_name
            LIMIT ?2
            "#,
        )?;

        let rows = stmt.query_map(params![pattern, limit as i64], |row| {
            Ok(Patient {
                uhid: row.get(0)?,
                full_name: row.get(1)?,
                age: row.get(2)?,
                gender: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
