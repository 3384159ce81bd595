//! End-to-end tests over the file-backed stores
//!
//! Every run opens fresh store instances on the same directories, the way
//! separate invocations of the binary would.

mod common;

use anyhow::Result;
use common::*;
use portable::checkpoint::{
    Checkpoint, CheckpointStore, Direction, FileCheckpointStore, JobId, JobStatus,
};
use portable::cli::commands::{
    run_export_command, run_import_command, run_reset_command, run_status_command, ExportArgs,
    ImportArgs,
};
use portable::config::PortableConfig;
use portable::destination::FileDestination;
use portable::model::EntityKind;
use portable::source::MemorySource;
use portable::staging::{FileStagingRepository, StagingRepository};
use portable::transfer::{CollisionResolution, TransferSettings, UsersTransfer};
use portable::PortableError;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

async fn open_transfer(dir: &Path, settings: TransferSettings) -> Result<UsersTransfer> {
    let checkpoints = FileCheckpointStore::new(dir.join("checkpoints"));
    let staging = FileStagingRepository::open(dir.join("staging")).await?;
    Ok(UsersTransfer::new(
        Arc::new(checkpoints),
        Arc::new(staging),
        settings,
    ))
}

#[tokio::test]
async fn test_export_then_import_across_restarts() -> Result<()> {
    let temp = TempDir::new()?;
    let export = export_job("file-export");
    let import = import_job("file-import", CollisionResolution::Overwrite);

    let summary = open_transfer(temp.path(), settings(7, 5))
        .await?
        .export(&export, &MemorySource::new(snapshot(30)))
        .await?;
    assert_eq!(summary.count("Exported Users"), Some(30));

    let staging = FileStagingRepository::open(temp.path().join("staging")).await?;
    assert_eq!(staging.count(EntityKind::User).await?, 30);
    assert_eq!(staging.count(EntityKind::UserAuthentication).await?, 15);

    let destination_path = temp.path().join("destination.json");
    let destination = FileDestination::open(&destination_path).await?;
    let summary = open_transfer(temp.path(), settings(7, 5))
        .await?
        .import(&import, &destination)
        .await?;
    assert_eq!(summary.count("Imported Users"), Some(30));
    assert_eq!(summary.count("Imported Memberships"), Some(30));

    let reopened = FileDestination::open(&destination_path).await?;
    use portable::destination::DestinationStore;
    let user = reopened.find_user_by_username("USER17").await?.unwrap();
    assert_eq!(user.display_name, "User 17");
    assert!(reopened.find_credential("user17").await?.is_some());

    let checkpoints = FileCheckpointStore::new(temp.path().join("checkpoints"));
    let listed = checkpoints.list().await?;
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|c| c.status == JobStatus::Completed));
    Ok(())
}

#[tokio::test]
async fn test_export_resumes_from_file_checkpoint() -> Result<()> {
    let temp = TempDir::new()?;
    let job = export_job("file-resume");
    let source = ScriptedSource::new(snapshot(30)).failing_once_on_page(2);

    let first = open_transfer(temp.path(), settings(10, 100))
        .await?
        .export(&job, &source)
        .await;
    assert!(first.is_err());

    let checkpoint = FileCheckpointStore::new(temp.path().join("checkpoints"))
        .load(&job.id)
        .await?
        .unwrap();
    assert_eq!(checkpoint.stage, 2);
    assert_eq!(checkpoint.status, JobStatus::Failed);

    let summary = open_transfer(temp.path(), settings(10, 100))
        .await?
        .export(&job, &source)
        .await?;
    assert_eq!(summary.count("Exported Users"), Some(10));

    let staging = FileStagingRepository::open(temp.path().join("staging")).await?;
    assert_eq!(staging.count(EntityKind::User).await?, 30);
    Ok(())
}

#[tokio::test]
async fn test_cli_commands_round_trip() -> Result<()> {
    let temp = TempDir::new()?;
    let config = PortableConfig {
        data_dir: Some(temp.path().join("data")),
        page_size: 4,
        checkpoint_interval: 3,
        ..Default::default()
    };
    let snapshot_path = temp.path().join("users.json");
    tokio::fs::write(&snapshot_path, serde_json::to_vec(&snapshot(9))?).await?;

    run_export_command(
        ExportArgs {
            source: snapshot_path,
            job_id: Some("cli-export".to_string()),
            scope: None,
            from: None,
            to: Some(base_time() + chrono::Duration::days(1)),
            include_deleted: false,
        },
        &config,
    )
    .await?;

    run_import_command(
        ImportArgs {
            destination: None,
            job_id: Some("cli-import".to_string()),
            from_job: "cli-export".to_string(),
            scope: Some(0),
            collision: "Overwrite".to_string(),
        },
        &config,
    )
    .await?;
    assert!(config.destination_path().exists());

    run_status_command(None, false, &config).await?;
    run_status_command(Some("cli-export".to_string()), true, &config).await?;
    assert!(run_status_command(Some("missing".to_string()), false, &config)
        .await
        .is_err());

    run_reset_command("cli-export".to_string(), true, &config).await?;
    let checkpoints = FileCheckpointStore::new(config.checkpoint_dir());
    assert!(checkpoints
        .load(&JobId::from_string("cli-export"))
        .await?
        .is_none());
    assert!(checkpoints
        .load(&JobId::from_string("cli-import"))
        .await?
        .is_some());
    assert!(!config.staging_dir(&JobId::from_string("cli-export"))?.exists());
    Ok(())
}

#[tokio::test]
async fn test_import_reads_only_the_named_export() -> Result<()> {
    let temp = TempDir::new()?;
    let config = PortableConfig {
        data_dir: Some(temp.path().join("data")),
        ..Default::default()
    };
    let mut two_scopes = snapshot(3);
    for id in 11..=12 {
        add_user_in_scope(&mut two_scopes, user(id), 1);
    }
    let snapshot_path = temp.path().join("users.json");
    tokio::fs::write(&snapshot_path, serde_json::to_vec(&two_scopes)?).await?;

    for (job_id, scope) in [("export-scope-0", 0), ("export-scope-1", 1)] {
        run_export_command(
            ExportArgs {
                source: snapshot_path.clone(),
                job_id: Some(job_id.to_string()),
                scope: Some(scope),
                from: None,
                to: Some(base_time() + chrono::Duration::days(1)),
                include_deleted: false,
            },
            &config,
        )
        .await?;
    }

    let scope_0_dir = config.staging_dir(&JobId::from_string("export-scope-0"))?;
    let scope_1_dir = config.staging_dir(&JobId::from_string("export-scope-1"))?;
    let scope_0 = FileStagingRepository::open(&scope_0_dir).await?;
    let scope_1 = FileStagingRepository::open(&scope_1_dir).await?;
    assert_eq!(scope_0.count(EntityKind::User).await?, 3);
    assert_eq!(scope_1.count(EntityKind::User).await?, 2);
    assert_eq!(scope_1.count(EntityKind::UserRole).await?, 2);

    run_import_command(
        ImportArgs {
            destination: None,
            job_id: Some("import-scope-1".to_string()),
            from_job: "export-scope-1".to_string(),
            scope: Some(1),
            collision: "Overwrite".to_string(),
        },
        &config,
    )
    .await?;

    use portable::destination::DestinationStore;
    let destination = FileDestination::open(config.destination_path()).await?;
    for id in [11, 12] {
        let name = format!("user{id}");
        let imported = destination.find_user_by_username(&name).await?.unwrap();
        assert!(destination
            .find_user_portal(1, imported.user_id)
            .await?
            .is_some());
    }
    for id in 1..=3 {
        let name = format!("user{id}");
        assert!(destination.find_user_by_username(&name).await?.is_none());
    }

    run_reset_command("export-scope-0".to_string(), true, &config).await?;
    assert!(!scope_0_dir.exists());
    assert!(scope_1_dir.exists());
    Ok(())
}

#[tokio::test]
async fn test_import_needs_a_finished_export_to_read() -> Result<()> {
    let temp = TempDir::new()?;
    let config = PortableConfig {
        data_dir: Some(temp.path().join("data")),
        ..Default::default()
    };
    let import = |from_job: &str| ImportArgs {
        destination: None,
        job_id: Some("import-orphan".to_string()),
        from_job: from_job.to_string(),
        scope: None,
        collision: "ignore".to_string(),
    };

    let err = run_import_command(import("never-exported"), &config)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PortableError>(),
        Some(PortableError::NotFound(_))
    ));
    assert!(!config.destination_path().exists());

    let checkpoints = FileCheckpointStore::new(config.checkpoint_dir());
    checkpoints
        .save(&Checkpoint::new(
            JobId::from_string("earlier-import"),
            Direction::Import,
        ))
        .await?;
    let err = run_import_command(import("earlier-import"), &config)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PortableError>(),
        Some(PortableError::Configuration(_))
    ));
    assert!(!config.destination_path().exists());
    Ok(())
}
