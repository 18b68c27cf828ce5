//! Exercise library import from an on-disk asset tree.
//!
//! The tree is two levels deep: `<root>/<Category>_Exercises/<Exercise>/`.
//! Import runs in replace mode. The existing library is cleared in one
//! committed step, then every exercise directory is parsed and inserted in
//! its own transaction, so a bad directory only loses itself.

use std::io;
use std::path::{Path, PathBuf};

use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set, TransactionTrait,
};
use tracing::{info, warn};

use crate::content::{self, ParsedExercise};
use crate::entity::exercise::{self, Entity as Exercise};
use crate::error::ImportError;

/// Suffix marking a category directory; stripped before storage.
pub const CATEGORY_SUFFIX: &str = "_Exercises";

/// Outcome of a finished import.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Number of exercises inserted.
    pub imported: usize,
    /// Directories that were skipped, with the reason.
    pub skipped: Vec<SkippedExercise>,
}

#[derive(Debug)]
pub struct SkippedExercise {
    pub path: PathBuf,
    pub reason: String,
}

/// Loads the exercise library from an asset tree.
///
/// The importer must not run concurrently with itself or with a snapshot
/// restore against the same database.
#[derive(Debug, Clone)]
pub struct AssetImporter {
    conn: DatabaseConnection,
    root: PathBuf,
}

impl AssetImporter {
    pub fn new(conn: DatabaseConnection, root: impl Into<PathBuf>) -> Self {
        Self {
            conn,
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Replaces the exercise library with the contents of the asset tree.
    ///
    /// # Errors
    ///
    /// * [`ImportError::MissingRoot`] if the root directory does not exist.
    ///   Nothing is cleared in that case.
    /// * [`ImportError::Clear`] if existing exercises cannot be deleted, for
    ///   instance because templates still reference them.
    /// * [`ImportError::Scan`] if the root cannot be listed.
    ///
    /// Unreadable, missing or malformed content and per-row insert failures
    /// are reported in [`ImportReport::skipped`] instead.
    pub async fn import(&self) -> Result<ImportReport, ImportError> {
        let is_dir = tokio::fs::metadata(&self.root)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(ImportError::MissingRoot(self.root.clone()));
        }

        info!(root = %self.root.display(), "loading exercise assets");

        let cleared = Exercise::delete_many()
            .exec(&self.conn)
            .await
            .map_err(ImportError::Clear)?;
        info!(removed = cleared.rows_affected, "cleared existing exercises");

        let categories = list_dirs(&self.root)
            .await
            .map_err(|source| ImportError::Scan {
                path: self.root.clone(),
                source,
            })?;

        let mut report = ImportReport::default();

        for (category_dir, category_path) in categories {
            let category = category_name(&category_dir);
            info!(%category, "processing category");

            let exercises = match list_dirs(&category_path).await {
                Ok(exercises) => exercises,
                Err(e) => {
                    warn!(path = %category_path.display(), error = %e, "skipping unreadable category");
                    report.skipped.push(SkippedExercise {
                        path: category_path,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            for (_, exercise_path) in exercises {
                let parsed = match content::load_exercise(&category_dir, &exercise_path).await {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        warn!(path = %exercise_path.display(), error = %e, "skipping exercise");
                        report.skipped.push(SkippedExercise {
                            path: exercise_path,
                            reason: e.to_string(),
                        });
                        continue;
                    }
                };

                match self.insert(&category, parsed).await {
                    Ok(model) => {
                        report.imported += 1;
                        info!(id = model.id, title = %model.title, "added exercise");
                    }
                    Err(e) => {
                        warn!(path = %exercise_path.display(), error = %e, "failed to store exercise");
                        report.skipped.push(SkippedExercise {
                            path: exercise_path,
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        info!(
            imported = report.imported,
            skipped = report.skipped.len(),
            "finished loading assets"
        );
        Ok(report)
    }

    /// Inserts one exercise in its own transaction.
    async fn insert(
        &self,
        category: &str,
        parsed: ParsedExercise,
    ) -> Result<exercise::Model, DbErr> {
        let txn = self.conn.begin().await?;

        let row = exercise::ActiveModel {
            title: Set(parsed.title),
            description: Set(parsed.description),
            category: Set(category.to_string()),
            difficulty: Set(parsed.difficulty),
            instructions: Set(parsed.instructions),
            benefits: Set(parsed.benefits),
            muscles_worked: Set(parsed.muscles_worked),
            variations: Set(parsed.variations),
            image_path: Set(parsed.image_path),
            animation_path: Set(parsed.animation_path),
            ..Default::default()
        };

        match row.insert(&txn).await {
            Ok(model) => {
                txn.commit().await?;
                Ok(model)
            }
            Err(e) => {
                if let Err(rollback) = txn.rollback().await {
                    warn!(error = %rollback, "rollback after failed insert also failed");
                }
                Err(e)
            }
        }
    }
}

/// Category name stored for a category directory.
pub fn category_name(dir_name: &str) -> String {
    dir_name
        .strip_suffix(CATEGORY_SUFFIX)
        .unwrap_or(dir_name)
        .trim()
        .to_string()
}

/// Sub-directories of `dir` as `(name, path)`, sorted by name.
async fn list_dirs(dir: &Path) -> io::Result<Vec<(String, PathBuf)>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut dirs = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_dir() {
            dirs.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
        }
    }
    dirs.sort();
    Ok(dirs)
}
