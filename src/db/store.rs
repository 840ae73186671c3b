//! Package record store.
//!
//! Uses prepared statements and transactions for data integrity. Every
//! successful write bumps the catalog revision in the same transaction.

use chrono::Utc;
use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::errors::AppError;
use crate::models::{Package, PackageType, RevisionInfo, TimelineDay};

const PACKAGE_COLUMNS: &str = "city, type, img, days, des, timeline";

/// Persistent collection of package documents, unique by city.
#[derive(Clone)]
pub struct PackageStore {
    pool: SqlitePool,
}

impl PackageStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the current revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }

    /// Get revision info.
    pub async fn get_revision_info(&self) -> Result<RevisionInfo, AppError> {
        let row = sqlx::query("SELECT revision_id, generated_at FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(RevisionInfo {
            revision_id: row.get("revision_id"),
            generated_at: row.get("generated_at"),
        })
    }

    /// List packages in insertion order, optionally restricted to one type.
    pub async fn list(&self, filter: Option<PackageType>) -> Result<Vec<Package>, AppError> {
        let rows = match filter {
            Some(package_type) => {
                let sql = format!(
                    "SELECT {} FROM packages WHERE type = ? ORDER BY seq",
                    PACKAGE_COLUMNS
                );
                sqlx::query(&sql)
                    .bind(package_type.as_str())
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("SELECT {} FROM packages ORDER BY seq", PACKAGE_COLUMNS);
                sqlx::query(&sql).fetch_all(&self.pool).await?
            }
        };

        rows.iter().map(package_from_row).collect()
    }

    /// Get a package by city.
    pub async fn get_by_city(&self, city: &str) -> Result<Option<Package>, AppError> {
        let sql = format!("SELECT {} FROM packages WHERE city = ?", PACKAGE_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(city)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(package_from_row).transpose()
    }

    /// Persist a new package.
    ///
    /// The UNIQUE constraint on `city` is the sole arbiter between racing
    /// writers; the loser gets `DuplicateKey`.
    pub async fn create(&self, package: &Package) -> Result<Package, AppError> {
        package.validate()?;
        let timeline_json = serde_json::to_string(&package.timeline)?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO packages (city, type, img, days, des, timeline) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&package.city)
        .bind(package.package_type.as_str())
        .bind(&package.img)
        .bind(&package.days)
        .bind(&package.des)
        .bind(&timeline_json)
        .execute(&mut *tx)
        .await?;

        bump_revision(&mut *tx).await?;
        tx.commit().await?;

        tracing::info!(city = %package.city, package_type = %package.package_type, "Package created");
        Ok(package.clone())
    }

    /// Replace the whole document stored under `city`.
    ///
    /// The replacement may carry a different city; it keeps the original's
    /// position in the listing.
    pub async fn replace(&self, city: &str, package: &Package) -> Result<Package, AppError> {
        package.validate()?;
        let timeline_json = serde_json::to_string(&package.timeline)?;

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE packages SET city = ?, type = ?, img = ?, days = ?, des = ?, timeline = ? WHERE city = ?",
        )
        .bind(&package.city)
        .bind(package.package_type.as_str())
        .bind(&package.img)
        .bind(&package.days)
        .bind(&package.des)
        .bind(&timeline_json)
        .bind(city)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Package {} not found", city)));
        }

        bump_revision(&mut *tx).await?;
        tx.commit().await?;

        tracing::info!(city = %city, new_city = %package.city, "Package replaced");
        Ok(package.clone())
    }

    /// Delete the package for `city`. Deleting a missing city is a no-op.
    ///
    /// Returns whether a record was removed.
    pub async fn delete_by_city(&self, city: &str) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM packages WHERE city = ?")
            .bind(city)
            .execute(&mut *tx)
            .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            bump_revision(&mut *tx).await?;
        }
        tx.commit().await?;

        if removed {
            tracing::info!(city = %city, "Package deleted");
        } else {
            tracing::debug!(city = %city, "Delete of unknown package ignored");
        }
        Ok(removed)
    }
}

/// Increment the revision ID within an open transaction.
async fn bump_revision(conn: &mut SqliteConnection) -> Result<(), AppError> {
    let now = Utc::now().to_rfc3339();
    sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
        .bind(&now)
        .execute(conn)
        .await?;
    Ok(())
}

fn package_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Package, AppError> {
    let type_str: String = row.get("type");
    let timeline_str: String = row.get("timeline");

    let package_type = type_str.parse::<PackageType>().map_err(|_| {
        AppError::StorageUnavailable(format!("Stored package has unknown type '{}'", type_str))
    })?;
    let timeline: Vec<TimelineDay> = serde_json::from_str(&timeline_str).map_err(|e| {
        tracing::error!("Corrupt timeline column: {:?}", e);
        AppError::StorageUnavailable(format!("Stored timeline is unreadable: {}", e))
    })?;

    Ok(Package {
        city: row.get("city"),
        package_type,
        img: row.get("img"),
        days: row.get("days"),
        des: row.get("des"),
        timeline,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use tempfile::TempDir;

    async fn test_store() -> (PackageStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let pool = init_database(&temp_dir.path().join("test.sqlite"))
            .await
            .expect("Failed to init DB");
        (PackageStore::new(pool), temp_dir)
    }

    fn package(city: &str, package_type: PackageType) -> Package {
        Package {
            city: city.to_string(),
            package_type,
            img: Some(format!("http://img/{}.png", city)),
            days: "3 Days".to_string(),
            des: String::new(),
            timeline: vec![],
        }
    }

    #[tokio::test]
    async fn test_create_twice_is_duplicate_key() {
        let (store, _dir) = test_store().await;

        store
            .create(&package("Goa", PackageType::Domestic))
            .await
            .unwrap();
        let second = store
            .create(&package("Goa", PackageType::International))
            .await;

        assert!(matches!(second, Err(AppError::DuplicateKey(_))));
        assert_eq!(store.list(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_filters_by_type_in_insertion_order() {
        let (store, _dir) = test_store().await;

        for (city, package_type) in [
            ("Manali", PackageType::Domestic),
            ("Paris", PackageType::International),
            ("Goa", PackageType::Domestic),
        ] {
            store.create(&package(city, package_type)).await.unwrap();
        }

        let domestic: Vec<String> = store
            .list(Some(PackageType::Domestic))
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.city)
            .collect();
        assert_eq!(domestic, vec!["Manali", "Goa"]);

        let all = store.list(None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[1].city, "Paris");
    }

    #[tokio::test]
    async fn test_timeline_roundtrips_through_json_column() {
        let (store, _dir) = test_store().await;
        let mut goa = package("Goa", PackageType::Domestic);
        goa.timeline = vec![
            TimelineDay {
                day: 1,
                title: "Arrival".to_string(),
                points: vec!["Check in".to_string(), "Beach walk".to_string()],
            },
            TimelineDay {
                day: 2,
                title: "Old Goa".to_string(),
                points: vec![],
            },
        ];

        store.create(&goa).await.unwrap();
        let stored = store.get_by_city("Goa").await.unwrap().unwrap();

        assert_eq!(stored, goa);
    }

    #[tokio::test]
    async fn test_create_rejects_misnumbered_timeline() {
        let (store, _dir) = test_store().await;
        let mut goa = package("Goa", PackageType::Domestic);
        goa.timeline = vec![TimelineDay::blank(2)];

        assert!(matches!(
            store.create(&goa).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (store, _dir) = test_store().await;
        store
            .create(&package("Goa", PackageType::Domestic))
            .await
            .unwrap();

        assert!(store.delete_by_city("Goa").await.unwrap());
        assert!(!store.delete_by_city("Goa").await.unwrap());
        assert!(!store.delete_by_city("Atlantis").await.unwrap());
        assert!(store.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_replace_keeps_position_and_checks_collisions() {
        let (store, _dir) = test_store().await;
        store
            .create(&package("Goa", PackageType::Domestic))
            .await
            .unwrap();
        store
            .create(&package("Paris", PackageType::International))
            .await
            .unwrap();

        let mut renamed = package("Panaji", PackageType::Domestic);
        renamed.days = "4 Days".to_string();
        store.replace("Goa", &renamed).await.unwrap();

        let all = store.list(None).await.unwrap();
        assert_eq!(all[0].city, "Panaji");
        assert_eq!(all[0].days, "4 Days");

        let collision = store
            .replace("Panaji", &package("Paris", PackageType::Domestic))
            .await;
        assert!(matches!(collision, Err(AppError::DuplicateKey(_))));

        let missing = store
            .replace("Goa", &package("Goa", PackageType::Domestic))
            .await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_revision_bumps_only_on_effective_writes() {
        let (store, _dir) = test_store().await;
        let initial = store.get_revision_id().await.unwrap();

        store
            .create(&package("Goa", PackageType::Domestic))
            .await
            .unwrap();
        assert_eq!(store.get_revision_id().await.unwrap(), initial + 1);

        let _ = store.create(&package("Goa", PackageType::Domestic)).await;
        assert_eq!(store.get_revision_id().await.unwrap(), initial + 1);

        store.delete_by_city("Nowhere").await.unwrap();
        assert_eq!(store.get_revision_id().await.unwrap(), initial + 1);

        store.delete_by_city("Goa").await.unwrap();
        assert_eq!(store.get_revision_id().await.unwrap(), initial + 2);
    }
}
