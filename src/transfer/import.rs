//! Import: staging into the destination

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::reconcile::{
    apply_credential_plan, merge_user, new_user, plan_credential_merge, InsertDefaults,
};
use super::{
    CollisionResolution, EntityCounts, Job, JobKind, ResultSummary, RunOutcome, UsersTransfer,
};
use crate::checkpoint::{Checkpoint, JobStatus, StageData};
use crate::destination::DestinationStore;
use crate::error::{PortableError, Result};
use crate::model::{Credential, EntityKind, Membership, UserId, UserPortal, UserRecord};
use crate::source::total_pages;
use crate::staging::{all_items, first_related};

/// Kinds reported by an import, in summary order
const IMPORTED_KINDS: [EntityKind; 4] = [
    EntityKind::User,
    EntityKind::UserPortal,
    EntityKind::Credential,
    EntityKind::Membership,
];

impl UsersTransfer {
    /// Import staged users into `destination` under `job.scope_id`
    ///
    /// A re-run resumes at the page and record recorded in the checkpoint.
    pub async fn import(
        &self,
        job: &Job,
        destination: &dyn DestinationStore,
    ) -> Result<ResultSummary> {
        let JobKind::Import { collision } = job.kind else {
            return Err(PortableError::Configuration(format!(
                "Job {} is not an import job",
                job.id
            )));
        };
        self.settings.validate()?;

        let mut checkpoint = self.load_checkpoint(job).await?;
        let mut summary = ResultSummary::new(job.id.clone());
        let mut counts = EntityCounts::default();
        let mut done_in_page = checkpoint.stage_data.skip();

        let outcome = self
            .import_pages(
                job,
                collision,
                destination,
                &mut checkpoint,
                &mut done_in_page,
                &mut counts,
                &mut summary,
            )
            .await;

        if !matches!(outcome, Ok(RunOutcome::Completed)) {
            checkpoint.stage_data = StageData::partial(done_in_page);
        }

        counts.write_to(&mut summary, "Imported", &IMPORTED_KINDS);
        summary.add_summary("Ignored Users", counts.ignored_users);
        self.finish(checkpoint, summary, outcome).await
    }

    #[allow(clippy::too_many_arguments)]
    async fn import_pages(
        &self,
        job: &Job,
        collision: CollisionResolution,
        destination: &dyn DestinationStore,
        checkpoint: &mut Checkpoint,
        done_in_page: &mut u32,
        counts: &mut EntityCounts,
        summary: &mut ResultSummary,
    ) -> Result<RunOutcome> {
        if self.cancel.is_cancelled() {
            return Ok(RunOutcome::Cancelled);
        }

        let page_size = self.settings.page_size;
        let total = self.staging.count(EntityKind::User).await? as u64;
        let total_pages = total_pages(total, page_size);
        checkpoint.set_total_once(total);

        if checkpoint.stage >= total_pages && *done_in_page == 0 {
            info!(
                "Import {} has nothing left to do ({} staged users, {} pages done)",
                job.id, total, checkpoint.stage
            );
            return Ok(RunOutcome::Completed);
        }

        let mut page_index = checkpoint.stage;
        info!(
            "Import {}: {} staged users, starting at page {}/{} record {}",
            job.id,
            total,
            page_index + 1,
            total_pages,
            *done_in_page
        );

        checkpoint.status = JobStatus::Running;
        checkpoint.set_processed(page_index as u64 * page_size as u64 + *done_in_page as u64);
        self.save_checkpoint(checkpoint, summary).await;

        while page_index < total_pages {
            if self.cancel.is_cancelled() {
                return Ok(RunOutcome::Cancelled);
            }

            let skip = *done_in_page;
            let take = page_size.saturating_sub(skip);
            if take > 0 {
                let offset = page_index as usize * page_size as usize + skip as usize;
                let users: Vec<UserRecord> =
                    all_items(self.staging.as_ref(), offset, take as usize).await?;
                if users.is_empty() {
                    warn!(
                        "Staging returned no users for page {}/{} of import {}",
                        page_index + 1,
                        total_pages,
                        job.id
                    );
                    break;
                }

                for user in users {
                    if self.cancel.is_cancelled() {
                        return Ok(RunOutcome::Cancelled);
                    }

                    self.import_user(job, collision, destination, &user, counts, summary)
                        .await?;

                    *done_in_page += 1;
                    checkpoint.record_processed();
                    let position = page_index as u64 * page_size as u64 + *done_in_page as u64;
                    if self.settings.is_checkpoint_due(position) {
                        checkpoint.stage_data = StageData::partial(*done_in_page);
                        self.save_checkpoint(checkpoint, summary).await;
                    }
                }
            }

            checkpoint.advance_stage();
            *done_in_page = 0;
            self.save_checkpoint(checkpoint, summary).await;
            info!(
                "Imported page {}/{} ({}%)",
                page_index + 1,
                total_pages,
                checkpoint.progress
            );
            page_index += 1;
        }

        Ok(RunOutcome::Completed)
    }

    async fn import_user(
        &self,
        job: &Job,
        collision: CollisionResolution,
        destination: &dyn DestinationStore,
        user: &UserRecord,
        counts: &mut EntityCounts,
        summary: &mut ResultSummary,
    ) -> Result<()> {
        if user.username.trim().is_empty() {
            warn!("Staged user {} has no username, skipping", user.user_id);
            summary.add_log_entry("Skipped user without username", user.user_id.to_string());
            counts.skipped += 1;
            return Ok(());
        }

        let staging = self.staging.as_ref();
        let credential: Option<Credential> = first_related(staging, user.user_id).await?;
        let membership: Option<Membership> = first_related(staging, user.user_id).await?;
        let portal: Option<UserPortal> = first_related(staging, user.user_id).await?;

        let existing = destination
            .find_user_by_username(&user.username)
            .await
            .map_err(PortableError::Destination)?;

        let user_id = match (existing, collision) {
            (Some(_), CollisionResolution::Ignore) => {
                debug!("User {} exists in destination, ignoring", user.username);
                summary.add_log_entry("Ignored user", user.username.clone());
                counts.ignored_users += 1;
                return Ok(());
            }
            (Some(current), CollisionResolution::Overwrite) => {
                let modified_by =
                    resolve_user_id(destination, user.last_modified_by_user_name.as_deref())
                        .await?;
                let merged = merge_user(
                    &current,
                    user,
                    portal.as_ref(),
                    membership.as_ref(),
                    modified_by,
                    Utc::now(),
                );
                destination
                    .update_user(&merged)
                    .await
                    .map_err(PortableError::Destination)?;
                debug!("Overwrote user {} (id {})", user.username, current.user_id);
                current.user_id
            }
            (None, _) => {
                let created_by =
                    resolve_user_id(destination, user.created_by_user_name.as_deref()).await?;
                let user_id = destination
                    .create_user(new_user(
                        job.scope_id,
                        user,
                        membership.as_ref(),
                        created_by,
                    ))
                    .await
                    .map_err(PortableError::Destination)?;
                debug!("Created user {} (id {})", user.username, user_id);
                user_id
            }
        };
        counts.add(EntityKind::User, 1);

        if portal.is_some() {
            self.import_portal(job, destination, user_id, counts).await?;
        }

        match credential {
            Some(credential) => {
                self.import_credential(destination, credential, membership, counts)
                    .await?;
            }
            None if membership.is_some() => {
                warn!(
                    "Staged membership of {} has no credential, skipping",
                    user.username
                );
                summary.add_log_entry(
                    "Skipped membership without credential",
                    user.username.clone(),
                );
                counts.skipped += 1;
            }
            None => {}
        }

        Ok(())
    }

    async fn import_portal(
        &self,
        job: &Job,
        destination: &dyn DestinationStore,
        user_id: UserId,
        counts: &mut EntityCounts,
    ) -> Result<()> {
        // Portal membership is only ever added; an existing one is left as is
        let existing = destination
            .find_user_portal(job.scope_id, user_id)
            .await
            .map_err(PortableError::Destination)?;
        if existing.is_some() {
            debug!("User {} already in portal {}", user_id, job.scope_id);
            return Ok(());
        }

        destination
            .add_user_portal(job.scope_id, user_id)
            .await
            .map_err(PortableError::Destination)?;
        counts.add(EntityKind::UserPortal, 1);
        Ok(())
    }

    async fn import_credential(
        &self,
        destination: &dyn DestinationStore,
        credential: Credential,
        membership: Option<Membership>,
        counts: &mut EntityCounts,
    ) -> Result<()> {
        let existing = destination
            .find_credential(&credential.username)
            .await
            .map_err(PortableError::Destination)?;
        let existing_membership = match &existing {
            Some(current) => destination
                .find_membership(current.user_id, current.application_id)
                .await
                .map_err(PortableError::Destination)?,
            None => None,
        };
        let defaults = InsertDefaults {
            user_id: Uuid::new_v4(),
            application_id: destination
                .default_application_id()
                .await
                .map_err(PortableError::Destination)?,
            now: Utc::now(),
        };

        let plan = plan_credential_merge(
            credential,
            membership,
            existing.as_ref(),
            existing_membership.as_ref(),
            defaults,
        );
        apply_credential_plan(destination, &plan)
            .await
            .map_err(PortableError::Destination)?;

        counts.add(EntityKind::Credential, 1);
        if plan.membership.is_some() {
            counts.add(EntityKind::Membership, 1);
        }
        Ok(())
    }
}

/// Destination id of the user with this username, if any
async fn resolve_user_id(
    destination: &dyn DestinationStore,
    username: Option<&str>,
) -> Result<Option<UserId>> {
    let Some(username) = username.filter(|name| !name.trim().is_empty()) else {
        return Ok(None);
    };
    Ok(destination
        .find_user_by_username(username)
        .await
        .map_err(PortableError::Destination)?
        .map(|u| u.user_id))
}
