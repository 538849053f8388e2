//! SQLite schema definition.

/// Complete database schema for equiscribe.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Clients
-- ============================================================================

CREATE TABLE IF NOT EXISTS clients (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL DEFAULT '',
    phone TEXT NOT NULL DEFAULT '',
    address TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_clients_name ON clients(name);

-- ============================================================================
-- Reports
-- ============================================================================

CREATE TABLE IF NOT EXISTS reports (
    id TEXT PRIMARY KEY,
    horse_name TEXT NOT NULL DEFAULT '',
    clinic TEXT NOT NULL DEFAULT '',
    veterinary TEXT NOT NULL DEFAULT '',
    exam_date TEXT NOT NULL DEFAULT '',          -- free-form, as typed
    client_id TEXT,                              -- clients(id); may dangle, cleared on client delete
    regions TEXT NOT NULL,                       -- JSON array of RegionEntry, catalog order
    total_score INTEGER NOT NULL DEFAULT 0,      -- derived from regions at save time
    status TEXT NOT NULL DEFAULT 'draft'
        CHECK (status IN ('draft', 'validated', 'sent')),
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_reports_status ON reports(status);
CREATE INDEX IF NOT EXISTS idx_reports_client ON reports(client_id);
CREATE INDEX IF NOT EXISTS idx_reports_created ON reports(created_at);

-- Status only moves forward: draft -> validated -> sent
CREATE TRIGGER IF NOT EXISTS reports_status_forward BEFORE UPDATE OF status ON reports
WHEN new.status <> old.status
BEGIN
    SELECT CASE
        WHEN old.status = 'sent' THEN
            RAISE(ABORT, 'Sent reports cannot change status')
        WHEN old.status = 'validated' AND new.status = 'draft' THEN
            RAISE(ABORT, 'Validated reports cannot return to draft')
    END;
END;
"#;
