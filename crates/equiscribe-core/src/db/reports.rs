//! Report database operations.

use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Database, DbError, DbResult};
use crate::ledger::RegionLedger;
use crate::models::{Report, ReportStatus};

const REPORT_COLUMNS: &str = r#"
    id, horse_name, clinic, veterinary, exam_date, client_id,
    regions, status, created_at, updated_at
"#;

/// Report counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportStats {
    pub total: u32,
    pub draft: u32,
    pub validated: u32,
    pub sent: u32,
}

impl Database {
    /// Insert or replace a report, keyed by id.
    ///
    /// The first creation timestamp survives re-saves.
    pub fn save_report(&self, report: &Report) -> DbResult<()> {
        let regions_json = serde_json::to_string(&report.regions)?;

        self.conn.execute(
            r#"
            INSERT INTO reports (
                id, horse_name, clinic, veterinary, exam_date, client_id,
                regions, total_score, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(id) DO UPDATE SET
                horse_name = excluded.horse_name,
                clinic = excluded.clinic,
                veterinary = excluded.veterinary,
                exam_date = excluded.exam_date,
                client_id = excluded.client_id,
                regions = excluded.regions,
                total_score = excluded.total_score,
                status = excluded.status,
                updated_at = excluded.updated_at
            "#,
            params![
                report.id,
                report.horse_name,
                report.clinic,
                report.veterinary,
                report.exam_date,
                report.client_id,
                regions_json,
                report.total_score(),
                report.status.as_str(),
                report.created_at,
                report.updated_at,
            ],
        )?;

        debug!(
            report_id = report.id.as_str(),
            status = report.status.as_str(),
            total_score = report.total_score(),
            "Report saved"
        );
        Ok(())
    }

    /// Get a report by ID.
    pub fn get_report(&self, id: &str) -> DbResult<Option<Report>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM reports WHERE id = ?", REPORT_COLUMNS),
                [id],
                ReportRow::from_row,
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// List all reports, newest first.
    pub fn list_reports(&self) -> DbResult<Vec<Report>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM reports ORDER BY created_at DESC",
            REPORT_COLUMNS
        ))?;

        let rows = stmt.query_map([], ReportRow::from_row)?;

        let mut reports = Vec::new();
        for row in rows {
            reports.push(row?.try_into()?);
        }
        Ok(reports)
    }

    /// List reports by status, newest first.
    pub fn list_reports_by_status(&self, status: ReportStatus) -> DbResult<Vec<Report>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM reports WHERE status = ? ORDER BY created_at DESC",
            REPORT_COLUMNS
        ))?;

        let rows = stmt.query_map([status.as_str()], ReportRow::from_row)?;

        let mut reports = Vec::new();
        for row in rows {
            reports.push(row?.try_into()?);
        }
        Ok(reports)
    }

    /// List reports linked to a client, newest first.
    pub fn list_reports_for_client(&self, client_id: &str) -> DbResult<Vec<Report>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM reports WHERE client_id = ? ORDER BY created_at DESC",
            REPORT_COLUMNS
        ))?;

        let rows = stmt.query_map([client_id], ReportRow::from_row)?;

        let mut reports = Vec::new();
        for row in rows {
            reports.push(row?.try_into()?);
        }
        Ok(reports)
    }

    /// Search reports by horse or veterinary name (case-insensitive substring).
    pub fn search_reports(&self, query: &str) -> DbResult<Vec<Report>> {
        let query = query.trim();
        let reports = self.list_reports()?;
        if query.is_empty() {
            return Ok(reports);
        }
        Ok(reports
            .into_iter()
            .filter(|report| report.matches_search(query))
            .collect())
    }

    /// Count reports per status.
    pub fn report_stats(&self) -> DbResult<ReportStats> {
        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM reports GROUP BY status")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?)))?;

        let mut stats = ReportStats::default();
        for row in rows {
            let (status, count) = row?;
            match string_to_status(&status)? {
                ReportStatus::Draft => stats.draft = count,
                ReportStatus::Validated => stats.validated = count,
                ReportStatus::Sent => stats.sent = count,
            }
            stats.total += count;
        }
        Ok(stats)
    }

    /// Mark a report as sent. Returns false if it does not exist.
    pub fn mark_report_sent(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE reports SET status = 'sent', updated_at = ?2 WHERE id = ?1",
            params![id, chrono::Utc::now().to_rfc3339()],
        )?;
        if rows_affected > 0 {
            info!(report_id = id, "Report marked as sent");
        }
        Ok(rows_affected > 0)
    }

    /// Mark a selection of reports as sent, all or nothing.
    ///
    /// Returns how many of the ids existed.
    pub fn mark_reports_sent(&mut self, ids: &[String]) -> DbResult<usize> {
        let now = chrono::Utc::now().to_rfc3339();
        let tx = self.transaction()?;
        let mut marked = 0;
        for id in ids {
            marked += tx.execute(
                "UPDATE reports SET status = 'sent', updated_at = ?2 WHERE id = ?1",
                params![id, now],
            )?;
        }
        tx.commit()?;
        info!(requested = ids.len(), marked, "Reports marked as sent");
        Ok(marked)
    }

    /// Delete a report.
    pub fn delete_report(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM reports WHERE id = ?", [id])?;
        if rows_affected > 0 {
            info!(report_id = id, "Report deleted");
        }
        Ok(rows_affected > 0)
    }
}

/// Intermediate row struct for database mapping.
struct ReportRow {
    id: String,
    horse_name: String,
    clinic: String,
    veterinary: String,
    exam_date: String,
    client_id: Option<String>,
    regions: String,
    status: String,
    created_at: String,
    updated_at: String,
}

impl ReportRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ReportRow {
            id: row.get(0)?,
            horse_name: row.get(1)?,
            clinic: row.get(2)?,
            veterinary: row.get(3)?,
            exam_date: row.get(4)?,
            client_id: row.get(5)?,
            regions: row.get(6)?,
            status: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }
}

impl TryFrom<ReportRow> for Report {
    type Error = DbError;

    fn try_from(row: ReportRow) -> Result<Self, Self::Error> {
        let regions: RegionLedger = serde_json::from_str(&row.regions)?;
        let status = string_to_status(&row.status)?;

        Ok(Report {
            id: row.id,
            horse_name: row.horse_name,
            clinic: row.clinic,
            veterinary: row.veterinary,
            exam_date: row.exam_date,
            client_id: row.client_id,
            regions,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn string_to_status(s: &str) -> Result<ReportStatus, DbError> {
    s.parse().map_err(DbError::Constraint)
}
