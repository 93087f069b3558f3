//! Tender registry — creation, retrieval, partial update, deletion, and the
//! internal status force-write used by the bid ledger on acceptance.

use procura_core::{PortalError, Result, TenderStatus};
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};

use crate::db::{col_status, docs_from_json, docs_to_json, row_err, DocumentRef, PortalDb};

/// Tender record as stored.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tender {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub budget: f64,
    pub deadline: String,
    pub status: TenderStatus,
    pub requirements: Option<String>,
    pub documents: Vec<DocumentRef>,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Tender with the creator's public fields resolved, for list/get responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub budget: f64,
    pub deadline: String,
    pub status: TenderStatus,
    pub requirements: Option<String>,
    pub documents: Vec<DocumentRef>,
    pub created_by: Option<CreatorSummary>,
    pub created_at: String,
    pub updated_at: String,
}

/// Public fields of the admin who created a tender.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorSummary {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Fields for tender creation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTender {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub deadline: String,
    pub requirements: Option<String>,
    #[serde(default)]
    pub documents: Vec<DocumentRef>,
}

/// Partial update; absent fields keep their stored values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub budget: Option<f64>,
    pub deadline: Option<String>,
    pub requirements: Option<String>,
    pub status: Option<TenderStatus>,
    pub documents: Option<Vec<DocumentRef>>,
}

impl PortalDb {
    // ── Tender registry ────────────────────────────────────

    /// Create a tender owned by an admin. Status starts Open.
    pub fn create_tender(&self, admin_id: &str, new: &NewTender) -> Result<Tender> {
        let id = uuid::Uuid::new_v4().to_string();
        self.conn
            .execute(
                "INSERT INTO tenders (id, title, description, category, budget, deadline, requirements, documents, created_by)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)",
                params![
                    id,
                    new.title,
                    new.description,
                    new.category,
                    new.budget,
                    new.deadline,
                    new.requirements,
                    docs_to_json(&new.documents),
                    admin_id
                ],
            )
            .map_err(|e| PortalError::storage(format!("Insert tender: {e}")))?;
        self.tender_record(&id)
    }

    /// Get a tender by ID, raw (creator unresolved).
    pub fn tender_record(&self, id: &str) -> Result<Tender> {
        self.conn
            .query_row(
                "SELECT id,title,description,category,budget,deadline,status,requirements,documents,created_by,created_at,updated_at
                 FROM tenders WHERE id=?1",
                params![id],
                tender_row,
            )
            .map_err(|e| row_err(e, "Tender not found"))
    }

    /// Get a tender by ID with the creator's public fields resolved.
    pub fn tender_by_id(&self, id: &str) -> Result<TenderView> {
        self.conn
            .query_row(
                &format!("{TENDER_VIEW_SQL} WHERE t.id=?1"),
                params![id],
                tender_view_row,
            )
            .map_err(|e| row_err(e, "Tender not found"))
    }

    /// List all tenders, newest first, creators resolved.
    pub fn list_tenders(&self) -> Result<Vec<TenderView>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "{TENDER_VIEW_SQL} ORDER BY t.created_at DESC, t.rowid DESC"
            ))
            .map_err(|e| PortalError::storage(format!("Prepare: {e}")))?;

        let tenders = stmt
            .query_map([], tender_view_row)
            .map_err(|e| PortalError::storage(format!("Query: {e}")))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(tenders)
    }

    /// Apply a partial update. Fields absent from the patch keep their
    /// stored values; a status in the patch must already be a member of the
    /// closed enum (validated at deserialization).
    pub fn update_tender(&self, id: &str, patch: &TenderPatch) -> Result<Tender> {
        let current = self.tender_record(id)?;

        let title = patch.title.as_deref().unwrap_or(&current.title);
        let description = patch.description.as_deref().unwrap_or(&current.description);
        let category = patch.category.as_deref().unwrap_or(&current.category);
        let budget = patch.budget.unwrap_or(current.budget);
        let deadline = patch.deadline.as_deref().unwrap_or(&current.deadline);
        let requirements = patch.requirements.as_deref().or(current.requirements.as_deref());
        let status = patch.status.unwrap_or(current.status);
        let documents = patch.documents.as_deref().unwrap_or(&current.documents);

        self.conn
            .execute(
                "UPDATE tenders SET title=?1, description=?2, category=?3, budget=?4, deadline=?5,
                        requirements=?6, status=?7, documents=?8, updated_at=datetime('now')
                 WHERE id=?9",
                params![
                    title,
                    description,
                    category,
                    budget,
                    deadline,
                    requirements,
                    status.as_str(),
                    docs_to_json(documents),
                    id
                ],
            )
            .map_err(|e| PortalError::storage(format!("Update tender: {e}")))?;
        self.tender_record(id)
    }

    /// Delete a tender. Bids referencing it are left in place and become
    /// orphaned; bid views resolve their tender reference as null.
    pub fn delete_tender(&self, id: &str) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tenders WHERE id=?1", params![id])
            .map_err(|e| PortalError::storage(format!("Delete tender: {e}")))?;
        if changed == 0 {
            return Err(PortalError::not_found("Tender not found"));
        }
        Ok(())
    }

    /// Force a tender's status. Internal: invoked by the bid ledger when a
    /// bid is accepted, unconditionally (an already-Awarded tender is
    /// overwritten again; last write wins).
    pub fn force_tender_status(&self, id: &str, status: TenderStatus) -> Result<()> {
        self.conn
            .execute(
                "UPDATE tenders SET status=?1, updated_at=datetime('now') WHERE id=?2",
                params![status.as_str(), id],
            )
            .map_err(|e| PortalError::storage(format!("Force tender status: {e}")))?;
        Ok(())
    }
}

const TENDER_VIEW_SQL: &str = "SELECT t.id,t.title,t.description,t.category,t.budget,t.deadline,t.status,t.requirements,t.documents,t.created_at,t.updated_at,
        a.id,a.name,a.email
 FROM tenders t LEFT JOIN admins a ON a.id = t.created_by";

fn tender_row(row: &Row<'_>) -> rusqlite::Result<Tender> {
    Ok(Tender {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        budget: row.get(4)?,
        deadline: row.get(5)?,
        status: col_status(row, 6)?,
        requirements: row.get(7)?,
        documents: docs_from_json(row.get(8)?),
        created_by: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn tender_view_row(row: &Row<'_>) -> rusqlite::Result<TenderView> {
    let creator = match row.get::<_, Option<String>>(11)? {
        Some(id) => Some(CreatorSummary {
            id,
            name: row.get(12)?,
            email: row.get(13)?,
        }),
        None => None,
    };
    Ok(TenderView {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        budget: row.get(4)?,
        deadline: row.get(5)?,
        status: col_status(row, 6)?,
        requirements: row.get(7)?,
        documents: docs_from_json(row.get(8)?),
        created_by: creator,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_db() -> PortalDb {
        PortalDb::open(&PathBuf::from(":memory:")).unwrap()
    }

    fn admin(db: &PortalDb) -> String {
        db.create_admin("Admin", "admin@eprocurement.com", "h")
            .unwrap()
            .id
    }

    fn roofing() -> NewTender {
        NewTender {
            title: "Roofing".into(),
            description: "d".into(),
            category: "Construction".into(),
            budget: 1000.0,
            deadline: "2099-01-01".into(),
            requirements: Some("ISO 9001".into()),
            documents: vec![],
        }
    }

    #[test]
    fn test_create_and_get_round_trip() {
        let db = temp_db();
        let admin_id = admin(&db);
        let t = db.create_tender(&admin_id, &roofing()).unwrap();

        assert_eq!(t.status, TenderStatus::Open);
        assert_eq!(t.created_by, admin_id);

        let view = db.tender_by_id(&t.id).unwrap();
        assert_eq!(view.title, "Roofing");
        assert_eq!(view.category, "Construction");
        assert_eq!(view.budget, 1000.0);
        assert_eq!(view.deadline, "2099-01-01");
        assert_eq!(view.requirements.as_deref(), Some("ISO 9001"));

        let creator = view.created_by.unwrap();
        assert_eq!(creator.name, "Admin");
        assert_eq!(creator.email, "admin@eprocurement.com");
    }

    #[test]
    fn test_get_missing_tender() {
        let db = temp_db();
        let err = db.tender_by_id("nope").unwrap_err();
        assert!(matches!(err, PortalError::NotFound(_)));
    }

    #[test]
    fn test_list_newest_first() {
        let db = temp_db();
        let admin_id = admin(&db);
        db.create_tender(&admin_id, &roofing()).unwrap();
        let mut second = roofing();
        second.title = "Paving".into();
        db.create_tender(&admin_id, &second).unwrap();

        let all = db.list_tenders().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].title, "Paving");
    }

    #[test]
    fn test_partial_update_keeps_unspecified_fields() {
        let db = temp_db();
        let admin_id = admin(&db);
        let t = db.create_tender(&admin_id, &roofing()).unwrap();

        let patch = TenderPatch {
            budget: Some(2500.0),
            status: Some(TenderStatus::Closed),
            ..TenderPatch::default()
        };
        let updated = db.update_tender(&t.id, &patch).unwrap();

        assert_eq!(updated.budget, 2500.0);
        assert_eq!(updated.status, TenderStatus::Closed);
        assert_eq!(updated.title, "Roofing");
        assert_eq!(updated.requirements.as_deref(), Some("ISO 9001"));
    }

    #[test]
    fn test_update_missing_tender() {
        let db = temp_db();
        let err = db.update_tender("nope", &TenderPatch::default()).unwrap_err();
        assert!(matches!(err, PortalError::NotFound(_)));
    }

    #[test]
    fn test_delete_tender() {
        let db = temp_db();
        let admin_id = admin(&db);
        let t = db.create_tender(&admin_id, &roofing()).unwrap();

        db.delete_tender(&t.id).unwrap();
        assert!(matches!(
            db.tender_by_id(&t.id).unwrap_err(),
            PortalError::NotFound(_)
        ));
        assert!(matches!(
            db.delete_tender(&t.id).unwrap_err(),
            PortalError::NotFound(_)
        ));
    }

    #[test]
    fn test_force_status() {
        let db = temp_db();
        let admin_id = admin(&db);
        let t = db.create_tender(&admin_id, &roofing()).unwrap();

        db.force_tender_status(&t.id, TenderStatus::Awarded).unwrap();
        assert_eq!(
            db.tender_record(&t.id).unwrap().status,
            TenderStatus::Awarded
        );
    }

    #[test]
    fn test_documents_round_trip() {
        let db = temp_db();
        let admin_id = admin(&db);
        let mut new = roofing();
        new.documents = vec![DocumentRef {
            name: "site-plan.pdf".into(),
            url: "https://files.example.com/site-plan.pdf".into(),
        }];
        let t = db.create_tender(&admin_id, &new).unwrap();

        let view = db.tender_by_id(&t.id).unwrap();
        assert_eq!(view.documents.len(), 1);
        assert_eq!(view.documents[0].name, "site-plan.pdf");
    }
}
