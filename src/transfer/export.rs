//! Export: source pages into staging

use tracing::{debug, info, warn};

use super::{EntityCounts, Job, JobKind, ResultSummary, RunOutcome, UsersTransfer};
use crate::checkpoint::{Checkpoint, JobStatus};
use crate::error::{PortableError, Result};
use crate::model::{
    Credential, EntityKind, Membership, ProfileProperty, Related, UserAuthentication, UserPortal,
    UserRecord, UserRole,
};
use crate::source::{total_pages, PageQuery, SourceStore};
use crate::staging::{stage, StagingRepository};

/// Kinds reported by an export, in summary order
const EXPORTED_KINDS: [EntityKind; 7] = [
    EntityKind::User,
    EntityKind::UserPortal,
    EntityKind::UserRole,
    EntityKind::ProfileProperty,
    EntityKind::UserAuthentication,
    EntityKind::Credential,
    EntityKind::Membership,
];

/// Records collected for one page, written together once the page is read
#[derive(Debug, Default)]
struct PageBatch {
    users: Vec<UserRecord>,
    roles: Vec<UserRole>,
    profiles: Vec<ProfileProperty>,
    authentications: Vec<UserAuthentication>,
    portals: Vec<UserPortal>,
    credentials: Vec<Credential>,
    memberships: Vec<Membership>,
}

impl PageBatch {
    /// Related kinds first, users last: a staged user implies its records are staged
    async fn write(self, staging: &dyn StagingRepository, counts: &mut EntityCounts) -> Result<()> {
        counts.add(EntityKind::Credential, stage(staging, self.credentials).await?);
        counts.add(EntityKind::Membership, stage(staging, self.memberships).await?);
        counts.add(EntityKind::UserRole, stage(staging, self.roles).await?);
        counts.add(EntityKind::ProfileProperty, stage(staging, self.profiles).await?);
        counts.add(
            EntityKind::UserAuthentication,
            stage(staging, self.authentications).await?,
        );
        counts.add(EntityKind::UserPortal, stage(staging, self.portals).await?);
        counts.add(EntityKind::User, stage(staging, self.users).await?);
        Ok(())
    }
}

fn tagged<T: Related>(mut records: Vec<T>, parent: i32) -> Vec<T> {
    for record in &mut records {
        record.tag(parent);
    }
    records
}

impl UsersTransfer {
    /// Export the users of `job.scope_id` changed within `job.window` into staging
    ///
    /// Re-running a job resumes after the last completed page; re-running a
    /// completed job stages nothing.
    pub async fn export(&self, job: &Job, source: &dyn SourceStore) -> Result<ResultSummary> {
        if job.kind != JobKind::Export {
            return Err(PortableError::Configuration(format!(
                "Job {} is not an export job",
                job.id
            )));
        }
        self.settings.validate()?;

        let mut checkpoint = self.load_checkpoint(job).await?;
        let mut summary = ResultSummary::new(job.id.clone());
        let mut counts = EntityCounts::default();

        let outcome = self
            .export_pages(job, source, &mut checkpoint, &mut counts, &mut summary)
            .await;

        counts.write_to(&mut summary, "Exported", &EXPORTED_KINDS);
        self.finish(checkpoint, summary, outcome).await
    }

    async fn export_pages(
        &self,
        job: &Job,
        source: &dyn SourceStore,
        checkpoint: &mut Checkpoint,
        counts: &mut EntityCounts,
        summary: &mut ResultSummary,
    ) -> Result<RunOutcome> {
        if self.cancel.is_cancelled() {
            return Ok(RunOutcome::Cancelled);
        }

        let page_size = self.settings.page_size;
        let query = PageQuery {
            scope_id: job.scope_id,
            page_index: 0,
            page_size,
            include_deleted: job.include_deleted,
            window: job.window,
        };

        let first = source
            .fetch_users(&query)
            .await
            .map_err(PortableError::Source)?;
        let total_pages = total_pages(first.total_count, page_size);
        checkpoint.set_total_once(first.total_count);

        if checkpoint.stage >= total_pages {
            info!(
                "Export {} has nothing left to do ({} users, {} pages done)",
                job.id, first.total_count, checkpoint.stage
            );
            return Ok(RunOutcome::Completed);
        }

        let resuming = checkpoint.stage > 0;
        let mut page_index = checkpoint.stage;
        let mut records = if resuming {
            info!("Resuming export {} at page {}/{}", job.id, page_index + 1, total_pages);
            self.fetch_page(source, &query, page_index).await?
        } else {
            info!(
                "Starting export {}: {} users in {} pages",
                job.id, first.total_count, total_pages
            );
            first.records
        };

        checkpoint.status = JobStatus::Running;
        checkpoint.stage_data = Default::default();
        checkpoint.set_processed(page_index as u64 * page_size as u64);
        self.save_checkpoint(checkpoint, summary).await;

        let mut first_page = true;

        while page_index < total_pages {
            if self.cancel.is_cancelled() {
                return Ok(RunOutcome::Cancelled);
            }
            if records.is_empty() {
                warn!(
                    "Source returned no users for page {}/{} of export {}",
                    page_index + 1,
                    total_pages,
                    job.id
                );
                break;
            }

            let mut batch = PageBatch::default();
            for user in records {
                if self.cancel.is_cancelled() {
                    return Ok(RunOutcome::Cancelled);
                }

                let already_staged = first_page
                    && resuming
                    && self
                        .staging
                        .contains(EntityKind::User, &user.user_id.to_string())
                        .await?;
                if already_staged {
                    debug!("User {} already staged, skipping", user.user_id);
                } else {
                    self.collect_related(job, source, &user, &mut batch).await?;
                    batch.users.push(user);
                }

                checkpoint.record_processed();
                if self.settings.is_checkpoint_due(checkpoint.processed_items) {
                    self.save_checkpoint(checkpoint, summary).await;
                }
            }

            let staged_users = batch.users.len();
            batch.write(self.staging.as_ref(), counts).await?;
            checkpoint.advance_stage();
            self.save_checkpoint(checkpoint, summary).await;
            info!(
                "Exported page {}/{} ({} users staged, {}%)",
                page_index + 1,
                total_pages,
                staged_users,
                checkpoint.progress
            );

            page_index += 1;
            first_page = false;
            if page_index < total_pages {
                records = self.fetch_page(source, &query, page_index).await?;
            } else {
                records = Vec::new();
            }
        }

        Ok(RunOutcome::Completed)
    }

    async fn fetch_page(
        &self,
        source: &dyn SourceStore,
        query: &PageQuery,
        page_index: u32,
    ) -> Result<Vec<UserRecord>> {
        Ok(source
            .fetch_users(&query.at_page(page_index))
            .await
            .map_err(PortableError::Source)?
            .records)
    }

    async fn collect_related(
        &self,
        job: &Job,
        source: &dyn SourceStore,
        user: &UserRecord,
        batch: &mut PageBatch,
    ) -> Result<()> {
        let parent = user.user_id;
        let window = &job.window;

        if let Some(mut credential) = source
            .credential(&user.username, window)
            .await
            .map_err(PortableError::Source)?
        {
            credential.tag(parent);
            if let Some(mut membership) = source
                .membership(credential.user_id, credential.application_id)
                .await
                .map_err(PortableError::Source)?
            {
                membership.tag(parent);
                batch.memberships.push(membership);
            }
            batch.credentials.push(credential);
        }

        let roles = source
            .user_roles(job.scope_id, parent, window)
            .await
            .map_err(PortableError::Source)?;
        batch.roles.extend(tagged(roles, parent));

        let portal = source
            .user_portal(job.scope_id, parent, window)
            .await
            .map_err(PortableError::Source)?;
        batch.portals.extend(tagged(portal.into_iter().collect(), parent));

        let authentication = source
            .user_authentication(parent, window)
            .await
            .map_err(PortableError::Source)?;
        batch
            .authentications
            .extend(tagged(authentication.into_iter().collect(), parent));

        let profile = source
            .user_profile(job.scope_id, parent, window)
            .await
            .map_err(PortableError::Source)?;
        batch.profiles.extend(tagged(profile, parent));

        debug!("Collected related records of user {} ({})", parent, user.username);
        Ok(())
    }
}
