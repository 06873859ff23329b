//! Migrate command - Database migration management.

use sea_orm::DbErr;

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;

/// Execute the migrate command
pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    // No automatic `up` here, the action decides
    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(|e| failed("connect", e))?;

    match args.action {
        MigrateAction::Up => {
            tracing::info!("Running pending migrations");
            db.run_migrations().await.map_err(|e| failed("up", e))?;
        }
        MigrateAction::Down => {
            tracing::info!("Rolling back last migration");
            db.rollback_migration()
                .await
                .map_err(|e| failed("down", e))?;
        }
        MigrateAction::Status => {
            let status = db.migration_status().await.map_err(|e| failed("status", e))?;
            for (name, applied) in status {
                println!("{}: {}", name, if applied { "applied" } else { "pending" });
            }
            return Ok(());
        }
        MigrateAction::Fresh => {
            tracing::warn!("Dropping every table and re-running all migrations");
            db.fresh_migrations().await.map_err(|e| failed("fresh", e))?;
        }
    }

    tracing::info!(action = ?args.action, "Migration command completed");
    Ok(())
}

fn failed(step: &str, e: DbErr) -> AppError {
    AppError::internal(format!("Migration {} failed: {}", step, e))
}
