//! IPD admission and discharge database operations.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use super::{parse_amount, Database, DbError, DbResult};
use crate::models::{Admission, AdmissionStatus};

const ADMISSION_COLUMNS: &str = r#"
    a.ipd_no, a.uhid, a.opd_no, a.admission_date, d.date_of_discharge,
    a.ward, a.bed_number, a.admission_reason, a.deposit_amount, a.status
"#;

impl Database {
    /// Insert a new admission.
    pub fn insert_admission(&self, admission: &Admission) -> DbResult<()> {
        if admission.deposit_amount.is_sign_negative() {
            return Err(DbError::InvalidAmount(format!(
                "deposit for {} is negative: {}",
                admission.ipd_no, admission.deposit_amount
            )));
        }

        self.conn.execute(
            r#"
            INSERT INTO ipd_admissions (
                ipd_no, uhid, opd_no, admission_date, ward, bed_number,
                admission_reason, deposit_amount, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                admission.ipd_no,
                admission.uhid,
                admission.opd_no,
                admission.admission_date,
                admission.ward,
                admission.bed_number,
                admission.admission_reason,
                admission.deposit_amount.to_string(),
                admission.status.as_str(),
            ],
        )?;
        Ok(())
    }

    /// Get an admission by IPD number, including its discharge date if recorded.
    pub fn get_admission(&self, ipd_no: &str) -> DbResult<Option<Admission>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM ipd_admissions a
            LEFT JOIN discharge_summaries d ON d.ipd_no = a.ipd_no
            WHERE a.ipd_no = ?
            "#,
            ADMISSION_COLUMNS
        );

        let result = self
            .conn
            .query_row(&sql, [ipd_no], AdmissionRow::from_row)
            .optional()?;

        result.map(|row| row.try_into()).transpose()
    }

    /// Search admissions by IPD number (prefix match), newest first.
    pub fn search_admissions(&self, query: &str, limit: usize) -> DbResult<Vec<Admission>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM ipd_admissions a
            LEFT JOIN discharge_summaries d ON d.ipd_no = a.ipd_no
            WHERE a.ipd_no LIKE ?
            ORDER BY a.admission_date DESC, a.ipd_no
            LIMIT ?
            "#,
            ADMISSION_COLUMNS
        );
        let pattern = format!("{}%", query);

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![pattern, limit as i64], AdmissionRow::from_row)?;

        let mut admissions = Vec::new();
        for row in rows {
            admissions.push(row?.try_into()?);
        }
        Ok(admissions)
    }

    /// List admissions that have not been discharged.
    pub fn list_active_admissions(&self) -> DbResult<Vec<Admission>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM ipd_admissions a
            LEFT JOIN discharge_summaries d ON d.ipd_no = a.ipd_no
            WHERE a.status = 'active'
            ORDER BY a.admission_date, a.ipd_no
            "#,
            ADMISSION_COLUMNS
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], AdmissionRow::from_row)?;

        let mut admissions = Vec::new();
        for row in rows {
            admissions.push(row?.try_into()?);
        }
        Ok(admissions)
    }

    /// Record the discharge date for a stay and mark it discharged.
    ///
    /// The discharge date is written once; a second call fails with
    /// [`DbError::Constraint`].
    pub fn record_discharge(&self, ipd_no: &str, date_of_discharge: NaiveDate) -> DbResult<()> {
        let tx = self.conn.unchecked_transaction()?;

        let admitted: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM ipd_admissions WHERE ipd_no = ?)",
            [ipd_no],
            |row| row.get(0),
        )?;
        if !admitted {
            return Err(DbError::NotFound(format!("admission {}", ipd_no)));
        }

        let already_discharged: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM discharge_summaries WHERE ipd_no = ?)",
            [ipd_no],
            |row| row.get(0),
        )?;
        if already_discharged {
            return Err(DbError::Constraint(format!(
                "discharge already recorded for {}",
                ipd_no
            )));
        }

        tx.execute(
            "INSERT INTO discharge_summaries (ipd_no, date_of_discharge) VALUES (?1, ?2)",
            params![ipd_no, date_of_discharge],
        )?;
        tx.execute(
            "UPDATE ipd_admissions SET status = ?1 WHERE ipd_no = ?2",
            params![AdmissionStatus::Discharged.as_str(), ipd_no],
        )?;

        tx.commit()?;
        Ok(())
    }
}

/// Intermediate row struct for database mapping.
struct AdmissionRow {
    ipd_no: String,
    uhid: String,
    opd_no: Option<String>,
    admission_date: NaiveDate,
    discharge_date: Option<NaiveDate>,
    ward: String,
    bed_number: String,
    admission_reason: Option<String>,
    deposit_amount: String,
    status: String,
}

impl AdmissionRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(AdmissionRow {
            ipd_no: row.get(0)?,
            uhid: row.get(1)?,
            opd_no: row.get(2)?,
            admission_date: row.get(3)?,
            discharge_date: row.get(4)?,
            ward: row.get(5)?,
            bed_number: row.get(6)?,
            admission_reason: row.get(7)?,
            deposit_amount: row.get(8)?,
            status: row.get(9)?,
        })
    }
}

impl TryFrom<AdmissionRow> for Admission {
    type Error = DbError;

    fn try_from(row: AdmissionRow) -> Result<Self, Self::Error> {
        let status = AdmissionStatus::parse(&row.status).ok_or_else(|| {
            DbError::Constraint(format!("unknown admission status '{}'", row.status))
        })?;

        Ok(Admission {
            deposit_amount: parse_amount("deposit_amount", &row.deposit_amount)?,
            ipd_no: row.ipd_no,
            uhid: row.uhid,
            opd_no: row.opd_no,
            admission_date: row.admission_date,
            discharge_date: row.discharge_date,
            ward: row.ward,
            bed_number: row.bed_number,
            admission_reason: row.admission_reason,
            status,
        })
    }
}
