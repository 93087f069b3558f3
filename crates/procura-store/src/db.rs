//! Portal database — SQLite schema and the credential store.

use procura_core::{PortalError, Result, VendorStatus};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Portal database manager.
pub struct PortalDb {
    pub(crate) conn: Connection,
}

/// Vendor record. The password hash never leaves the store in a record and
/// is never serialized.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: String,
    pub company_name: String,
    pub email: String,
    pub status: VendorStatus,
    pub profile_photo: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Admin record. Created out-of-band via the `create-admin` CLI, never via
/// the public API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub id: String,
    pub name: String,
    pub email: String,
    pub profile_photo: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Attached document reference on tenders and bids. Stored as a JSON array
/// column; opaque to the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentRef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

impl PortalDb {
    /// Open or create the portal database.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| PortalError::storage(format!("DB open error: {e}")))?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Run schema migrations.
    ///
    /// The UNIQUE(tender_id, vendor_id) constraint makes the one-bid-per-pair
    /// invariant hold at the storage layer, so concurrent submissions cannot
    /// race past the application check.
    fn migrate(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "
            CREATE TABLE IF NOT EXISTS admins (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                profile_photo TEXT DEFAULT '',
                created_at TEXT DEFAULT (datetime('now')),
                updated_at TEXT DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS vendors (
                id TEXT PRIMARY KEY,
                company_name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'Pending',
                profile_photo TEXT DEFAULT '',
                created_at TEXT DEFAULT (datetime('now')),
                updated_at TEXT DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS tenders (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                category TEXT NOT NULL,
                budget REAL NOT NULL,
                deadline TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'Open',
                requirements TEXT,
                documents TEXT DEFAULT '[]',
                created_by TEXT NOT NULL,
                created_at TEXT DEFAULT (datetime('now')),
                updated_at TEXT DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS bids (
                id TEXT PRIMARY KEY,
                tender_id TEXT NOT NULL,
                vendor_id TEXT NOT NULL,
                bid_amount REAL NOT NULL,
                proposal TEXT NOT NULL,
                delivery_time INTEGER NOT NULL,
                status TEXT NOT NULL DEFAULT 'Submitted',
                documents TEXT DEFAULT '[]',
                created_at TEXT DEFAULT (datetime('now')),
                updated_at TEXT DEFAULT (datetime('now')),
                UNIQUE(tender_id, vendor_id)
            );
        ",
            )
            .map_err(|e| PortalError::storage(format!("Migration error: {e}")))?;
        Ok(())
    }

    // ── Vendors ────────────────────────────────────

    /// Register a new vendor. Status is always Pending regardless of what the
    /// client sent; the caller supplies an already-hashed password.
    pub fn register_vendor(
        &self,
        company_name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Vendor> {
        let id = uuid::Uuid::new_v4().to_string();
        self.conn
            .execute(
                "INSERT INTO vendors (id, company_name, email, password_hash) VALUES (?1,?2,?3,?4)",
                params![id, company_name, email, password_hash],
            )
            .map_err(|e| constraint_err(e, "Vendor already exists"))?;
        self.vendor_by_id(&id)
    }

    /// Get a vendor by ID.
    pub fn vendor_by_id(&self, id: &str) -> Result<Vendor> {
        self.conn
            .query_row(
                "SELECT id,company_name,email,status,profile_photo,created_at,updated_at
                 FROM vendors WHERE id=?1",
                params![id],
                vendor_row,
            )
            .map_err(|e| row_err(e, "Vendor not found"))
    }

    /// Look up a vendor by email for login; returns the record and its
    /// password hash.
    pub fn vendor_by_email(&self, email: &str) -> Result<Option<(Vendor, String)>> {
        match self.conn.query_row(
            "SELECT id,company_name,email,status,profile_photo,created_at,updated_at,password_hash
             FROM vendors WHERE email=?1",
            params![email],
            |row| Ok((vendor_row(row)?, row.get::<_, String>(7)?)),
        ) {
            Ok(r) => Ok(Some(r)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(PortalError::storage(format!("Get vendor: {e}"))),
        }
    }

    /// Stored password hash for a vendor.
    pub fn vendor_password_hash(&self, id: &str) -> Result<String> {
        self.conn
            .query_row(
                "SELECT password_hash FROM vendors WHERE id=?1",
                params![id],
                |row| row.get(0),
            )
            .map_err(|e| row_err(e, "Vendor not found"))
    }

    /// List all vendors, newest first.
    pub fn list_vendors(&self) -> Result<Vec<Vendor>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id,company_name,email,status,profile_photo,created_at,updated_at
                 FROM vendors ORDER BY created_at DESC, rowid DESC",
            )
            .map_err(|e| PortalError::storage(format!("Prepare: {e}")))?;

        let vendors = stmt
            .query_map([], vendor_row)
            .map_err(|e| PortalError::storage(format!("Query: {e}")))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(vendors)
    }

    /// Set a vendor's approval status. Approved and Rejected may be toggled
    /// freely; re-approval of a rejected vendor is supported.
    pub fn set_vendor_status(&self, id: &str, status: VendorStatus) -> Result<Vendor> {
        let changed = self
            .conn
            .execute(
                "UPDATE vendors SET status=?1, updated_at=datetime('now') WHERE id=?2",
                params![status.as_str(), id],
            )
            .map_err(|e| PortalError::storage(format!("Update vendor status: {e}")))?;
        if changed == 0 {
            return Err(PortalError::not_found("Vendor not found"));
        }
        self.vendor_by_id(id)
    }

    /// Store a new password hash for a vendor.
    pub fn set_vendor_password(&self, id: &str, password_hash: &str) -> Result<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE vendors SET password_hash=?1, updated_at=datetime('now') WHERE id=?2",
                params![password_hash, id],
            )
            .map_err(|e| PortalError::storage(format!("Update vendor password: {e}")))?;
        if changed == 0 {
            return Err(PortalError::not_found("Vendor not found"));
        }
        Ok(())
    }

    /// Change a vendor's email; fails with Conflict if another vendor holds it.
    pub fn set_vendor_email(&self, id: &str, email: &str) -> Result<Vendor> {
        let changed = self
            .conn
            .execute(
                "UPDATE vendors SET email=?1, updated_at=datetime('now') WHERE id=?2",
                params![email, id],
            )
            .map_err(|e| constraint_err(e, "Email already in use"))?;
        if changed == 0 {
            return Err(PortalError::not_found("Vendor not found"));
        }
        self.vendor_by_id(id)
    }

    /// Store a vendor's profile photo (opaque data URI or URL).
    pub fn set_vendor_photo(&self, id: &str, photo: &str) -> Result<Vendor> {
        let changed = self
            .conn
            .execute(
                "UPDATE vendors SET profile_photo=?1, updated_at=datetime('now') WHERE id=?2",
                params![photo, id],
            )
            .map_err(|e| PortalError::storage(format!("Update vendor photo: {e}")))?;
        if changed == 0 {
            return Err(PortalError::not_found("Vendor not found"));
        }
        self.vendor_by_id(id)
    }

    // ── Admins ────────────────────────────────────

    /// Create an admin account (bootstrap only).
    pub fn create_admin(&self, name: &str, email: &str, password_hash: &str) -> Result<Admin> {
        let id = uuid::Uuid::new_v4().to_string();
        self.conn
            .execute(
                "INSERT INTO admins (id, name, email, password_hash) VALUES (?1,?2,?3,?4)",
                params![id, name, email, password_hash],
            )
            .map_err(|e| constraint_err(e, "Admin already exists"))?;
        self.admin_by_id(&id)
    }

    /// Get an admin by ID.
    pub fn admin_by_id(&self, id: &str) -> Result<Admin> {
        self.conn
            .query_row(
                "SELECT id,name,email,profile_photo,created_at,updated_at FROM admins WHERE id=?1",
                params![id],
                admin_row,
            )
            .map_err(|e| row_err(e, "Admin not found"))
    }

    /// Look up an admin by email for login; returns the record and its
    /// password hash.
    pub fn admin_by_email(&self, email: &str) -> Result<Option<(Admin, String)>> {
        match self.conn.query_row(
            "SELECT id,name,email,profile_photo,created_at,updated_at,password_hash
             FROM admins WHERE email=?1",
            params![email],
            |row| Ok((admin_row(row)?, row.get::<_, String>(6)?)),
        ) {
            Ok(r) => Ok(Some(r)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(PortalError::storage(format!("Get admin: {e}"))),
        }
    }

    /// Stored password hash for an admin.
    pub fn admin_password_hash(&self, id: &str) -> Result<String> {
        self.conn
            .query_row(
                "SELECT password_hash FROM admins WHERE id=?1",
                params![id],
                |row| row.get(0),
            )
            .map_err(|e| row_err(e, "Admin not found"))
    }

    /// Store a new password hash for an admin.
    pub fn set_admin_password(&self, id: &str, password_hash: &str) -> Result<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE admins SET password_hash=?1, updated_at=datetime('now') WHERE id=?2",
                params![password_hash, id],
            )
            .map_err(|e| PortalError::storage(format!("Update admin password: {e}")))?;
        if changed == 0 {
            return Err(PortalError::not_found("Admin not found"));
        }
        Ok(())
    }

    /// Change an admin's email; fails with Conflict if another admin holds it.
    pub fn set_admin_email(&self, id: &str, email: &str) -> Result<Admin> {
        let changed = self
            .conn
            .execute(
                "UPDATE admins SET email=?1, updated_at=datetime('now') WHERE id=?2",
                params![email, id],
            )
            .map_err(|e| constraint_err(e, "Email already in use"))?;
        if changed == 0 {
            return Err(PortalError::not_found("Admin not found"));
        }
        self.admin_by_id(id)
    }

    /// Store an admin's profile photo.
    pub fn set_admin_photo(&self, id: &str, photo: &str) -> Result<Admin> {
        let changed = self
            .conn
            .execute(
                "UPDATE admins SET profile_photo=?1, updated_at=datetime('now') WHERE id=?2",
                params![photo, id],
            )
            .map_err(|e| PortalError::storage(format!("Update admin photo: {e}")))?;
        if changed == 0 {
            return Err(PortalError::not_found("Admin not found"));
        }
        self.admin_by_id(id)
    }
}

fn vendor_row(row: &Row<'_>) -> rusqlite::Result<Vendor> {
    Ok(Vendor {
        id: row.get(0)?,
        company_name: row.get(1)?,
        email: row.get(2)?,
        status: col_status(row, 3)?,
        profile_photo: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn admin_row(row: &Row<'_>) -> rusqlite::Result<Admin> {
    Ok(Admin {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        profile_photo: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

/// Parse a status column into its closed enum.
pub(crate) fn col_status<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = PortalError>,
{
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e: PortalError| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Map a write failure, turning UNIQUE violations into Conflict.
pub(crate) fn constraint_err(e: rusqlite::Error, conflict: &str) -> PortalError {
    match e {
        rusqlite::Error::SqliteFailure(f, _)
            if f.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            PortalError::conflict(conflict)
        }
        other => PortalError::storage(format!("{other}")),
    }
}

/// Map a single-row read failure, turning no-rows into NotFound.
pub(crate) fn row_err(e: rusqlite::Error, missing: &str) -> PortalError {
    match e {
        rusqlite::Error::QueryReturnedNoRows => PortalError::not_found(missing),
        other => PortalError::storage(format!("{other}")),
    }
}

/// Serialize a documents list for storage.
pub(crate) fn docs_to_json(docs: &[DocumentRef]) -> String {
    serde_json::to_string(docs).unwrap_or_else(|_| "[]".into())
}

/// Deserialize a documents column.
pub(crate) fn docs_from_json(raw: Option<String>) -> Vec<DocumentRef> {
    raw.and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_db() -> PortalDb {
        PortalDb::open(&PathBuf::from(":memory:")).unwrap()
    }

    #[test]
    fn test_register_vendor_defaults_pending() {
        let db = temp_db();
        let v = db.register_vendor("Acme", "a@x.com", "hash").unwrap();
        assert_eq!(v.company_name, "Acme");
        assert_eq!(v.status, VendorStatus::Pending);
        assert_eq!(v.profile_photo, "");
    }

    #[test]
    fn test_duplicate_vendor_email_conflicts() {
        let db = temp_db();
        db.register_vendor("Acme", "a@x.com", "hash").unwrap();
        let err = db.register_vendor("Other", "a@x.com", "hash2").unwrap_err();
        assert!(matches!(err, PortalError::Conflict(_)));
    }

    #[test]
    fn test_vendor_status_toggles_freely() {
        let db = temp_db();
        let v = db.register_vendor("Acme", "a@x.com", "hash").unwrap();

        let v = db.set_vendor_status(&v.id, VendorStatus::Approved).unwrap();
        assert_eq!(v.status, VendorStatus::Approved);

        let v = db.set_vendor_status(&v.id, VendorStatus::Rejected).unwrap();
        assert_eq!(v.status, VendorStatus::Rejected);

        // Re-approval of a rejected vendor is supported.
        let v = db.set_vendor_status(&v.id, VendorStatus::Approved).unwrap();
        assert_eq!(v.status, VendorStatus::Approved);
    }

    #[test]
    fn test_set_vendor_status_missing() {
        let db = temp_db();
        let err = db
            .set_vendor_status("nope", VendorStatus::Approved)
            .unwrap_err();
        assert!(matches!(err, PortalError::NotFound(_)));
    }

    #[test]
    fn test_vendor_email_change_conflicts() {
        let db = temp_db();
        let a = db.register_vendor("A", "a@x.com", "h").unwrap();
        db.register_vendor("B", "b@x.com", "h").unwrap();

        let err = db.set_vendor_email(&a.id, "b@x.com").unwrap_err();
        assert!(matches!(err, PortalError::Conflict(_)));

        let a = db.set_vendor_email(&a.id, "a2@x.com").unwrap();
        assert_eq!(a.email, "a2@x.com");
    }

    #[test]
    fn test_vendor_login_lookup() {
        let db = temp_db();
        db.register_vendor("Acme", "a@x.com", "the-hash").unwrap();

        let (vendor, hash) = db.vendor_by_email("a@x.com").unwrap().unwrap();
        assert_eq!(vendor.company_name, "Acme");
        assert_eq!(hash, "the-hash");
        assert!(db.vendor_by_email("missing@x.com").unwrap().is_none());
    }

    #[test]
    fn test_list_vendors_newest_first() {
        let db = temp_db();
        db.register_vendor("First", "1@x.com", "h").unwrap();
        db.register_vendor("Second", "2@x.com", "h").unwrap();

        let vendors = db.list_vendors().unwrap();
        assert_eq!(vendors.len(), 2);
        assert_eq!(vendors[0].company_name, "Second");
    }

    #[test]
    fn test_admin_crud() {
        let db = temp_db();
        let admin = db.create_admin("Admin", "admin@eprocurement.com", "h").unwrap();
        assert_eq!(admin.name, "Admin");

        let err = db
            .create_admin("Again", "admin@eprocurement.com", "h")
            .unwrap_err();
        assert!(matches!(err, PortalError::Conflict(_)));

        let (found, hash) = db.admin_by_email("admin@eprocurement.com").unwrap().unwrap();
        assert_eq!(found.id, admin.id);
        assert_eq!(hash, "h");

        db.set_admin_password(&admin.id, "h2").unwrap();
        assert_eq!(db.admin_password_hash(&admin.id).unwrap(), "h2");

        let admin = db.set_admin_photo(&admin.id, "data:image/png;base64,xyz").unwrap();
        assert_eq!(admin.profile_photo, "data:image/png;base64,xyz");
    }

    #[test]
    fn test_vendor_record_never_serializes_hash() {
        let db = temp_db();
        let v = db.register_vendor("Acme", "a@x.com", "super-secret-hash").unwrap();
        let json = serde_json::to_string(&v).unwrap();
        assert!(!json.contains("super-secret-hash"));
        assert!(json.contains("companyName"));
    }
}
