//! Enhancement entity model and DTOs.

use pixelift_core::enhancement::{EnhancementStatus, EnhancementType};
use pixelift_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

/// A row from the `enhancements` table.
///
/// Serialized in camelCase because this is exactly what the status and
/// recent-list endpoints return to the browser.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Enhancement {
    pub id: DbId,
    pub original_filename: String,
    pub original_path: String,
    pub enhanced_path: Option<String>,
    pub enhancement_type: EnhancementType,
    pub status: EnhancementStatus,
    /// Seconds from job start until the terminal transition.
    pub processing_time: Option<f64>,
    pub created_at: Timestamp,
    pub user_id: Option<DbId>,
}

impl<'r> FromRow<'r, PgRow> for Enhancement {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let enhancement_type: String = row.try_get("enhancement_type")?;
        let status: String = row.try_get("status")?;

        Ok(Self {
            id: row.try_get("id")?,
            original_filename: row.try_get("original_filename")?,
            original_path: row.try_get("original_path")?,
            enhanced_path: row.try_get("enhanced_path")?,
            enhancement_type: enhancement_type
                .parse()
                .map_err(|e| decode_error("enhancement_type", e))?,
            status: status.parse().map_err(|e| decode_error("status", e))?,
            processing_time: row.try_get("processing_time")?,
            created_at: row.try_get("created_at")?,
            user_id: row.try_get("user_id")?,
        })
    }
}

fn decode_error(column: &str, source: pixelift_core::error::CoreError) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(source),
    }
}

/// DTO for creating a new enhancement.
///
/// Status, timestamps and output fields are assigned by the store.
#[derive(Debug, Clone)]
pub struct CreateEnhancement {
    pub original_filename: String,
    pub original_path: String,
    pub enhancement_type: EnhancementType,
    pub user_id: Option<DbId>,
}

/// Partial update for an enhancement. Only `Some` fields are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateEnhancement {
    pub enhanced_path: Option<String>,
    pub status: Option<EnhancementStatus>,
    pub processing_time: Option<f64>,
}

impl UpdateEnhancement {
    /// Terminal success: output written after `processing_time` seconds.
    pub fn completed(enhanced_path: impl Into<String>, processing_time: f64) -> Self {
        Self {
            enhanced_path: Some(enhanced_path.into()),
            status: Some(EnhancementStatus::Completed),
            processing_time: Some(processing_time),
        }
    }

    /// Terminal failure after `processing_time` seconds. No output path.
    pub fn failed(processing_time: f64) -> Self {
        Self {
            enhanced_path: None,
            status: Some(EnhancementStatus::Failed),
            processing_time: Some(processing_time),
        }
    }

    /// Apply the present fields onto `target`.
    pub fn apply_to(&self, target: &mut Enhancement) {
        if let Some(path) = &self.enhanced_path {
            target.enhanced_path = Some(path.clone());
        }
        if let Some(status) = self.status {
            target.status = status;
        }
        if let Some(secs) = self.processing_time {
            target.processing_time = Some(secs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processing() -> Enhancement {
        Enhancement {
            id: 7,
            original_filename: "cat.png".into(),
            original_path: "uploads/a.png".into(),
            enhanced_path: None,
            enhancement_type: EnhancementType::Sharpen,
            status: EnhancementStatus::Processing,
            processing_time: None,
            created_at: chrono::Utc::now(),
            user_id: None,
        }
    }

    #[test]
    fn completed_update_sets_all_terminal_fields() {
        let mut row = processing();
        UpdateEnhancement::completed("uploads/enhanced_a.png", 2.5).apply_to(&mut row);
        assert_eq!(row.status, EnhancementStatus::Completed);
        assert_eq!(row.enhanced_path.as_deref(), Some("uploads/enhanced_a.png"));
        assert_eq!(row.processing_time, Some(2.5));
    }

    #[test]
    fn failed_update_leaves_path_empty() {
        let mut row = processing();
        UpdateEnhancement::failed(0.1).apply_to(&mut row);
        assert_eq!(row.status, EnhancementStatus::Failed);
        assert!(row.enhanced_path.is_none());
        assert_eq!(row.processing_time, Some(0.1));
    }

    #[test]
    fn empty_update_is_a_no_op() {
        let mut row = processing();
        let before = row.clone();
        UpdateEnhancement::default().apply_to(&mut row);
        assert_eq!(row, before);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(processing()).unwrap();
        assert_eq!(json["originalFilename"], "cat.png");
        assert_eq!(json["enhancementType"], "sharpen");
        assert_eq!(json["status"], "processing");
        assert!(json["enhancedPath"].is_null());
        assert!(json["createdAt"].is_string());
    }
}
