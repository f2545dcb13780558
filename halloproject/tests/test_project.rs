use halloproject::{export_project, import_project, Error, ProjectDocument};
use halloscheduler::{
    AssetId, Bumper, BumperAudio, Logo, MediaFile, MediaSink, PlaybackScheduler, Program,
    RenderError, SchedulerConfig, ViewState,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Sink inerte : l'export/import ne joue rien
struct NullSink;

#[async_trait::async_trait]
impl MediaSink for NullSink {
    async fn play_program(&self, _: &Program, _: ViewState) -> Result<(), RenderError> {
        Ok(())
    }

    async fn play_bumper(
        &self,
        _: &Bumper,
        _: &BumperAudio,
        _: Duration,
    ) -> Result<(), RenderError> {
        Ok(())
    }

    async fn show_logo(&self, _: &Logo, _: Duration) -> Result<(), RenderError> {
        Ok(())
    }

    fn stop(&self) {}
    fn show_done_screen(&self) {}
    fn clear_done_screen(&self) {}
    fn set_paused(&self, _: bool) {}
    fn jump_forward(&self, _: Duration) {}
    fn set_scale(&self, _: f64) {}
}

fn new_scheduler() -> PlaybackScheduler {
    PlaybackScheduler::new(Arc::new(NullSink), SchedulerConfig::default())
}

fn write_media(dir: &Path, name: &str, content: &str) -> MediaFile {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    MediaFile::new(path)
}

/// Scheduler avec deux programmes, un bumper, une piste audio et un logo
fn populated_scheduler(media_dir: &Path) -> PlaybackScheduler {
    let scheduler = new_scheduler();
    scheduler.add_program(write_media(media_dir, "nosferatu.mp4", "program one"));
    scheduler.add_program(write_media(media_dir, "carnival.mkv", "program two"));
    scheduler.add_bumper(write_media(media_dir, "bats.webm", "bumper"));
    scheduler.add_bumper_audio(write_media(media_dir, "howl.mp3", "audio"));
    scheduler.add_logo(write_media(media_dir, "pumpkin.png", "logo"));
    scheduler
        .set_program_position(&AssetId::from("program-2"), ViewState::with_scale(1.8))
        .unwrap();
    scheduler.set_auto_restart(true);
    scheduler
}

#[tokio::test]
async fn test_export_writes_document_and_media() {
    let media_dir = TempDir::new().unwrap();
    let project_dir = TempDir::new().unwrap();
    let scheduler = populated_scheduler(media_dir.path());

    let summary = export_project(&scheduler, "fright", project_dir.path())
        .await
        .unwrap();

    assert_eq!(summary.document, project_dir.path().join("fright-config.json"));
    assert_eq!(summary.counts.programs, 2);
    assert_eq!(summary.counts.bumpers, 1);
    assert_eq!(summary.counts.bumper_audios, 1);
    assert_eq!(summary.counts.logos, 1);

    for name in [
        "fright-program-1.mp4",
        "fright-program-2.mkv",
        "fright-bumper-1-video.webm",
        "fright-bumper-audio-1.mp3",
        "fright-logo-1.png",
    ] {
        assert!(project_dir.path().join(name).is_file(), "missing {}", name);
    }
    let copied = std::fs::read_to_string(project_dir.path().join("fright-program-1.mp4")).unwrap();
    assert_eq!(copied, "program one");

    let json = std::fs::read_to_string(&summary.document).unwrap();
    let document = ProjectDocument::from_json(&json).unwrap();
    assert_eq!(document.name, "fright");
    assert!(document.auto_restart);
    assert!(document.exported_at.is_some());
    assert_eq!(document.programs[1].position, ViewState::with_scale(1.8));
    assert_eq!(document.programs[0].position, ViewState::default());
}

#[tokio::test]
async fn test_round_trip_keeps_ids_positions_and_flag() {
    let media_dir = TempDir::new().unwrap();
    let project_dir = TempDir::new().unwrap();
    let source = populated_scheduler(media_dir.path());
    export_project(&source, "fright", project_dir.path())
        .await
        .unwrap();

    let target = new_scheduler();
    let summary = import_project(&target, project_dir.path()).await.unwrap();

    assert!(summary.missing_files.is_empty());
    assert_eq!(summary.rejected, 0);
    assert_eq!(summary.counts.programs, 2);

    let ids: Vec<_> = target.programs().into_iter().map(|p| p.id).collect();
    assert_eq!(
        ids,
        vec![AssetId::from("program-1"), AssetId::from("program-2")]
    );
    assert_eq!(target.bumpers()[0].id, AssetId::from("bumper-1"));
    assert_eq!(target.bumper_audios()[0].id, AssetId::from("bumper-audio-1"));
    assert_eq!(target.logos()[0].id, AssetId::from("logo-1"));
    assert_eq!(
        target.view_state(&AssetId::from("program-2")),
        Some(ViewState::with_scale(1.8))
    );
    assert!(target.auto_restart());

    // Les médias importés pointent dans le répertoire du projet
    let program = &target.programs()[0];
    assert_eq!(
        program.media.path(),
        project_dir.path().join("fright-program-1.mp4").as_path()
    );

    // Un id généré après import ne réutilise pas un id importé
    let next = target.add_program(MediaFile::new("other.mp4"));
    assert_eq!(next, AssetId::from("program-3"));
}

#[tokio::test]
async fn test_missing_files_are_skipped() {
    let media_dir = TempDir::new().unwrap();
    let project_dir = TempDir::new().unwrap();
    let source = populated_scheduler(media_dir.path());
    export_project(&source, "fright", project_dir.path())
        .await
        .unwrap();
    std::fs::remove_file(project_dir.path().join("fright-program-1.mp4")).unwrap();

    let target = new_scheduler();
    let summary = import_project(&target, project_dir.path()).await.unwrap();

    assert_eq!(summary.missing_files, vec!["fright-program-1.mp4".to_string()]);
    assert_eq!(summary.counts.programs, 1);
    assert_eq!(target.programs()[0].id, AssetId::from("program-2"));
    assert_eq!(target.logos().len(), 1);
}

#[tokio::test]
async fn test_import_replaces_existing_pools() {
    let media_dir = TempDir::new().unwrap();
    let project_dir = TempDir::new().unwrap();
    let source = populated_scheduler(media_dir.path());
    export_project(&source, "fright", project_dir.path())
        .await
        .unwrap();

    let target = new_scheduler();
    for i in 0..5 {
        target.add_logo(MediaFile::new(format!("old-{}.png", i)));
    }
    target
        .set_program_position(&AssetId::from("program-9"), ViewState::with_scale(3.0))
        .unwrap();

    import_project(&target, project_dir.path()).await.unwrap();

    assert_eq!(target.logos().len(), 1);
    assert!(target.view_state(&AssetId::from("program-9")).is_none());
}

#[tokio::test]
async fn test_import_without_document() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("movie.mp4"), "data").unwrap();
    let scheduler = new_scheduler();
    scheduler.add_logo(MediaFile::new("keep.png"));

    let result = import_project(&scheduler, dir.path()).await;

    assert!(matches!(result, Err(Error::MissingDocument(_))));
    // Rien n'est effacé si le document manque
    assert_eq!(scheduler.logos().len(), 1);
}

#[tokio::test]
async fn test_import_with_two_documents() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a-config.json"), "{}").unwrap();
    std::fs::write(dir.path().join("b-config.json"), "{}").unwrap();

    let result = import_project(&new_scheduler(), dir.path()).await;

    match result {
        Err(Error::AmbiguousDocument { found, .. }) => assert_eq!(found.len(), 2),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_export_rejects_bad_name() {
    let project_dir = TempDir::new().unwrap();
    let result = export_project(&new_scheduler(), "../escape", project_dir.path()).await;
    assert!(matches!(result, Err(Error::InvalidName(_))));
}

#[tokio::test]
async fn test_export_with_vanished_media() {
    let project_dir = TempDir::new().unwrap();
    let scheduler = new_scheduler();
    scheduler.add_program(MediaFile::new("/nonexistent/ghost.mp4"));

    let result = export_project(&scheduler, "fright", project_dir.path()).await;

    assert!(matches!(result, Err(Error::Io { .. })));
}

#[tokio::test]
async fn test_reexport_into_import_directory_keeps_media() {
    let media_dir = TempDir::new().unwrap();
    let project_dir = TempDir::new().unwrap();
    let source = populated_scheduler(media_dir.path());
    export_project(&source, "halloweeny", project_dir.path())
        .await
        .unwrap();

    let target = new_scheduler();
    import_project(&target, project_dir.path()).await.unwrap();
    let summary = export_project(&target, "halloweeny", project_dir.path())
        .await
        .unwrap();

    assert_eq!(summary.counts.programs, 2);
    let program = std::fs::read_to_string(project_dir.path().join("halloweeny-program-1.mp4"))
        .unwrap();
    assert_eq!(program, "program one");
    let bumper =
        std::fs::read_to_string(project_dir.path().join("halloweeny-bumper-1-video.webm"))
            .unwrap();
    assert_eq!(bumper, "bumper");
}

#[tokio::test]
async fn test_import_rejects_file_names_outside_the_project() {
    let root = TempDir::new().unwrap();
    let project_dir = root.path().join("project");
    std::fs::create_dir(&project_dir).unwrap();
    let outside = root.path().join("outside.png");
    std::fs::write(&outside, "secret").unwrap();
    std::fs::write(project_dir.join("fine-logo-2.png"), "logo").unwrap();

    let document = format!(
        r#"{{
            "name": "fine",
            "programs": [{{"id": "program-1", "filename": {:?}}}],
            "logos": [
                {{"id": "logo-1", "filename": "../outside.png"}},
                {{"id": "logo-2", "filename": "fine-logo-2.png"}}
            ]
        }}"#,
        outside.display().to_string()
    );
    std::fs::write(project_dir.join("fine-config.json"), document).unwrap();

    let scheduler = new_scheduler();
    let summary = import_project(&scheduler, &project_dir).await.unwrap();

    assert_eq!(summary.rejected, 2);
    assert!(summary.missing_files.is_empty());
    assert!(scheduler.programs().is_empty());
    let logos = scheduler.logos();
    assert_eq!(logos.len(), 1);
    assert_eq!(logos[0].id, AssetId::from("logo-2"));
}

#[tokio::test]
async fn test_positions_only_for_imported_programs() {
    let project_dir = TempDir::new().unwrap();
    std::fs::write(project_dir.path().join("x-program-2.mp4"), "two").unwrap();
    std::fs::write(
        project_dir.path().join("x-config.json"),
        r#"{
            "name": "x",
            "programs": [
                {"id": "program-1", "filename": "x-program-1.mp4"},
                {"id": "program-2", "filename": "x-program-2.mp4"}
            ],
            "positions": {
                "program-1": {"scale": 2.0},
                "program-2": {"scale": 1.5},
                "program-7": {"scale": 3.0}
            }
        }"#,
    )
    .unwrap();

    let scheduler = new_scheduler();
    let summary = import_project(&scheduler, project_dir.path()).await.unwrap();

    assert_eq!(summary.missing_files, vec!["x-program-1.mp4".to_string()]);
    assert_eq!(
        scheduler.view_state(&AssetId::from("program-2")),
        Some(ViewState::with_scale(1.5))
    );
    assert!(scheduler.view_state(&AssetId::from("program-1")).is_none());
    assert!(scheduler.view_state(&AssetId::from("program-7")).is_none());
    assert_eq!(scheduler.view_states().iter().count(), 1);
}
