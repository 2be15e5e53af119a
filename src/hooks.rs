//! Install-lifecycle hooks.
//!
//! `run_post_install` is the standalone analog of a module installer's
//! post-install callback: it runs right after migrations first complete and
//! never again. Its one job is to deactivate the `sales_case_link`
//! companion module when present and active: that module auto-links sales
//! orders to projects, and in a law office projects are cases, so the links
//! it creates are wrong.

use crate::db::Database;
use crate::error::DatabaseError;

/// Companion module that must not stay active alongside case tracking.
pub const CONFLICTING_MODULE: &str = "sales_case_link";

const POST_INSTALL_MARKER: &str = "post_install_done";

/// What the post-install hook did on this invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostInstallOutcome {
    /// The conflicting module was active and has been deactivated.
    DeactivatedConflictingModule,
    /// The conflicting module was absent or already inactive.
    NothingToDo,
    /// The hook already ran on an earlier install.
    AlreadyRan,
}

/// Run the one-time post-install cleanup. Idempotent across restarts.
pub async fn run_post_install(db: &dyn Database) -> Result<PostInstallOutcome, DatabaseError> {
    if db.get_meta(POST_INSTALL_MARKER).await?.is_some() {
        return Ok(PostInstallOutcome::AlreadyRan);
    }

    let outcome = match db.get_module(CONFLICTING_MODULE).await? {
        Some(module) if module.active => {
            db.deactivate_module(CONFLICTING_MODULE).await?;
            tracing::info!(
                module = CONFLICTING_MODULE,
                "deactivated conflicting companion module during post-install"
            );
            PostInstallOutcome::DeactivatedConflictingModule
        }
        Some(_) => {
            tracing::info!(
                module = CONFLICTING_MODULE,
                "companion module already inactive, nothing to do"
            );
            PostInstallOutcome::NothingToDo
        }
        None => {
            tracing::info!(
                module = CONFLICTING_MODULE,
                "companion module not installed, nothing to do"
            );
            PostInstallOutcome::NothingToDo
        }
    };

    db.set_meta(POST_INSTALL_MARKER, "1").await?;
    Ok(outcome)
}
