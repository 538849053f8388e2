//! Client database operations.

use rusqlite::{params, OptionalExtension};
use tracing::info;

use super::{Database, DbResult};
use crate::models::Client;

impl Database {
    /// Insert or update a client, keeping its creation timestamp.
    pub fn save_client(&self, client: &Client) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO clients (id, name, email, phone, address, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, datetime('now'))
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                email = excluded.email,
                phone = excluded.phone,
                address = excluded.address,
                updated_at = datetime('now')
            "#,
            params![
                client.id,
                client.name,
                client.email,
                client.phone,
                client.address,
                client.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get a client by ID.
    pub fn get_client(&self, id: &str) -> DbResult<Option<Client>> {
        self.conn
            .query_row(
                r#"
                SELECT id, name, email, phone, address, created_at
                FROM clients
                WHERE id = ?
                "#,
                [id],
                |row| {
                    Ok(Client {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        email: row.get(2)?,
                        phone: row.get(3)?,
                        address: row.get(4)?,
                        created_at: row.get(5)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// List all clients by name.
    pub fn list_clients(&self) -> DbResult<Vec<Client>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, email, phone, address, created_at
            FROM clients
            ORDER BY name
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(Client {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                phone: row.get(3)?,
                address: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Delete a client. Reports that referenced it are kept, unlinked.
    pub fn delete_client(&self, id: &str) -> DbResult<bool> {
        let tx = self.conn.unchecked_transaction()?;
        let unlinked = tx.execute("UPDATE reports SET client_id = NULL WHERE client_id = ?", [id])?;
        let rows_affected = tx.execute("DELETE FROM clients WHERE id = ?", [id])?;
        tx.commit()?;
        if rows_affected > 0 {
            info!(client_id = id, unlinked, "Client deleted");
        }
        Ok(rows_affected > 0)
    }

    /// Distinct horse names across a client's reports.
    pub fn client_horses(&self, client_id: &str) -> DbResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT DISTINCT horse_name
            FROM reports
            WHERE client_id = ? AND horse_name <> ''
            ORDER BY horse_name
            "#,
        )?;

        let rows = stmt.query_map([client_id], |row| row.get(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Report;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn report_for(client: &Client, horse: &str) -> Report {
        let mut report = Report::new("C".into(), "V".into(), "d".into());
        report.horse_name = horse.into();
        report.client_id = Some(client.id.clone());
        report
    }

    #[test]
    fn test_save_and_get() {
        let db = setup_db();
        let mut client = Client::new("Haras du Pin".into());
        client.email = "contact@haras.fr".into();
        client.phone = "0233000000".into();

        db.save_client(&client).unwrap();

        let retrieved = db.get_client(&client.id).unwrap().unwrap();
        assert_eq!(retrieved, client);
    }

    #[test]
    fn test_update_keeps_created_at() {
        let db = setup_db();
        let mut client = Client::new("Haras".into());
        db.save_client(&client).unwrap();
        let created_at = client.created_at.clone();

        client.address = "Le Pin-au-Haras".into();
        client.created_at = "2099-01-01T00:00:00+00:00".into();
        db.save_client(&client).unwrap();

        let retrieved = db.get_client(&client.id).unwrap().unwrap();
        assert_eq!(retrieved.address, "Le Pin-au-Haras");
        assert_eq!(retrieved.created_at, created_at);
        assert_eq!(db.list_clients().unwrap().len(), 1);
    }

    #[test]
    fn test_list_by_name() {
        let db = setup_db();
        db.save_client(&Client::new("Zoé".into())).unwrap();
        db.save_client(&Client::new("Alice".into())).unwrap();

        let names: Vec<String> = db.list_clients().unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Alice".to_string(), "Zoé".to_string()]);
    }

    #[test]
    fn test_client_horses_distinct() {
        let db = setup_db();
        let client = Client::new("Haras".into());
        db.save_client(&client).unwrap();

        db.save_report(&report_for(&client, "Quaprice")).unwrap();
        db.save_report(&report_for(&client, "Quaprice")).unwrap();
        db.save_report(&report_for(&client, "Jappeloup")).unwrap();

        let horses = db.client_horses(&client.id).unwrap();
        assert_eq!(horses, vec!["Jappeloup".to_string(), "Quaprice".to_string()]);
    }

    #[test]
    fn test_delete_client_keeps_reports() {
        let db = setup_db();
        let client = Client::new("Haras".into());
        db.save_client(&client).unwrap();
        let report = report_for(&client, "Quaprice");
        db.save_report(&report).unwrap();

        assert!(db.delete_client(&client.id).unwrap());

        let retrieved = db.get_report(&report.id).unwrap().unwrap();
        assert_eq!(retrieved.client_id, None);
        assert!(db.get_client(&client.id).unwrap().is_none());
    }

    #[test]
    fn test_report_with_unknown_client_saves() {
        let db = setup_db();
        let mut report = report_for(&Client::new("Fantôme".into()), "Quaprice");
        db.save_report(&report).unwrap();

        report.horse_name = "Ulysse".into();
        db.save_report(&report).unwrap();

        let retrieved = db.get_report(&report.id).unwrap().unwrap();
        assert_eq!(retrieved.horse_name, "Ulysse");
        assert_eq!(retrieved.client_id, report.client_id);
    }
}
