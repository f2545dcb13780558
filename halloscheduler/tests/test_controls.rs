//! Commandes opérateur : skip, pause, jump, zoom, stop, gestion des pools

mod common;

use common::{scheduler_with, wait_until, Call, RecordingSink, TIMEOUT};
use halloscheduler::{
    AssetId, Error, MediaFile, PlaybackStatus, PoolKind, Program, Stage, ViewState, MIN_SCALE,
};
use std::time::Duration;

async fn wait_for_program(scheduler: &halloscheduler::PlaybackScheduler) {
    assert!(
        wait_until(
            || scheduler.current_stage().map(|s| s.stage) == Some(Stage::Program),
            TIMEOUT
        )
        .await
    );
}

#[tokio::test]
async fn test_skip_continues_with_bumper() {
    let sink = RecordingSink::new();
    let scheduler = scheduler_with(&sink, 1, false);
    sink.hold_programs(true);

    assert!(!scheduler.skip_to_next_program());

    scheduler.start_playback().unwrap();
    wait_for_program(&scheduler).await;
    assert!(scheduler.skip_to_next_program());
    scheduler.join().await;

    assert_eq!(scheduler.status(), PlaybackStatus::Done);
    let renders = sink.renders();
    assert_eq!(renders.len(), 3);
    assert!(matches!(renders[1], Call::Bumper { .. }));
    assert!(matches!(renders[2], Call::Logo { .. }));
    assert!(sink.calls().contains(&Call::Stop));
}

#[tokio::test]
async fn test_cancel_current_stage_needs_an_active_stage() {
    let sink = RecordingSink::new();
    let scheduler = scheduler_with(&sink, 1, false);
    sink.hold_programs(true);

    assert!(!scheduler.cancel_current_stage());

    scheduler.start_playback().unwrap();
    wait_for_program(&scheduler).await;
    assert!(scheduler.cancel_current_stage());
    scheduler.join().await;

    assert_eq!(sink.count(|c| matches!(c, Call::Logo { .. })), 1);
    assert!(scheduler.current_stage().is_none());
}

#[tokio::test]
async fn test_pause_and_jump_only_during_a_program() {
    let sink = RecordingSink::new();
    let scheduler = scheduler_with(&sink, 1, false);
    sink.hold_programs(true);

    assert!(!scheduler.toggle_pause());
    assert!(!scheduler.jump_forward(Duration::from_secs(10)));
    assert!(sink.calls().is_empty());

    scheduler.start_playback().unwrap();
    wait_for_program(&scheduler).await;

    assert!(scheduler.toggle_pause());
    assert!(scheduler.is_paused());
    assert!(!scheduler.toggle_pause());
    assert!(!scheduler.is_paused());
    assert!(scheduler.jump_forward(Duration::from_secs(10)));

    let calls = sink.calls();
    assert!(calls.contains(&Call::Paused(true)));
    assert!(calls.contains(&Call::Paused(false)));
    assert!(calls.contains(&Call::Jump(Duration::from_secs(10))));

    scheduler.stop_playback();
    scheduler.join().await;
}

#[tokio::test]
async fn test_zoom_updates_active_program() {
    let sink = RecordingSink::new();
    let scheduler = scheduler_with(&sink, 1, false);
    sink.hold_programs(true);
    let id = AssetId::from("program-1");

    assert_eq!(scheduler.set_current_scale(1.5).unwrap(), None);

    scheduler.start_playback().unwrap();
    wait_for_program(&scheduler).await;

    assert_eq!(scheduler.set_current_scale(1.5).unwrap(), Some(id.clone()));
    assert_eq!(scheduler.view_state(&id).unwrap().scale, 1.5);

    let scale = scheduler.scale_current_by(0.5).unwrap().unwrap();
    assert!((scale - 2.0).abs() < 1e-9);

    // Jamais en dessous du minimum
    assert_eq!(scheduler.scale_current_by(-10.0).unwrap(), Some(MIN_SCALE));
    assert!(matches!(
        scheduler.set_current_scale(0.0),
        Err(Error::InvalidScale(_))
    ));
    assert!(matches!(
        scheduler.scale_current_by(f64::NAN),
        Err(Error::InvalidScale(_))
    ));

    assert!(sink.calls().contains(&Call::Scale(1.5)));
    assert_eq!(scheduler.view_state(&id).unwrap().scale, MIN_SCALE);

    scheduler.stop_playback();
    scheduler.join().await;
}

#[tokio::test]
async fn test_stop_during_program() {
    let sink = RecordingSink::new();
    let scheduler = scheduler_with(&sink, 2, false);
    sink.hold_programs(true);

    scheduler.start_playback().unwrap();
    wait_for_program(&scheduler).await;
    scheduler.stop_playback();
    scheduler.join().await;

    assert_eq!(scheduler.status(), PlaybackStatus::Idle);
    assert!(scheduler.current_stage().is_none());
    assert_eq!(sink.renders().len(), 1);
    assert!(sink.calls().contains(&Call::Stop));

    // Idempotent
    scheduler.stop_playback();
    assert_eq!(scheduler.status(), PlaybackStatus::Idle);
}

#[tokio::test]
async fn test_set_program_position_rejects_bad_scale() {
    let sink = RecordingSink::new();
    let scheduler = scheduler_with(&sink, 1, false);
    let id = AssetId::from("program-1");

    assert!(matches!(
        scheduler.set_program_position(&id, ViewState::with_scale(-1.0)),
        Err(Error::InvalidScale(_))
    ));
    assert!(scheduler.view_state(&id).is_none());

    scheduler
        .set_program_position(
            &id,
            ViewState {
                scale: 3.0,
                x: 4.0,
                y: 5.0,
            },
        )
        .unwrap();
    assert_eq!(scheduler.view_states().len(), 1);
}

#[test]
fn test_remove_and_insert() {
    let sink = RecordingSink::new();
    let scheduler = scheduler_with(&sink, 2, false);
    let first = AssetId::from("program-1");

    scheduler
        .set_program_position(&first, ViewState::with_scale(2.0))
        .unwrap();
    let removed = scheduler.remove_program(&first).unwrap();
    assert_eq!(removed.id, first);
    assert_eq!(scheduler.programs().len(), 1);
    assert!(scheduler.view_state(&first).is_none());

    assert!(matches!(
        scheduler.remove_program(&first),
        Err(Error::UnknownAsset {
            pool: PoolKind::Programs,
            ..
        })
    ));

    let restored = Program {
        id: AssetId::from("program-7"),
        media: MediaFile::new("programs/restored.mp4"),
    };
    scheduler.insert_program(restored.clone()).unwrap();
    assert!(matches!(
        scheduler.insert_program(restored),
        Err(Error::DuplicateAsset { .. })
    ));
    assert_eq!(scheduler.programs().len(), 2);
}

#[tokio::test]
async fn test_remove_drops_asset_from_working_deck() {
    let sink = RecordingSink::new();
    let scheduler = scheduler_with(&sink, 2, false);
    sink.hold_programs(true);

    scheduler.start_playback().unwrap();
    wait_for_program(&scheduler).await;
    assert_eq!(scheduler.deck_sizes().programs, 1);

    let playing = sink.program_ids()[0].clone();
    let waiting = if playing == "program-1" {
        "program-2"
    } else {
        "program-1"
    };
    scheduler.remove_program(&AssetId::from(waiting)).unwrap();
    assert_eq!(scheduler.deck_sizes().programs, 0);

    // Le programme en cours va au bout de son stage
    assert_eq!(
        scheduler.current_stage().map(|s| s.asset_id),
        Some(AssetId::from(playing.as_str()))
    );

    scheduler.stop_playback();
    scheduler.join().await;
}

#[tokio::test]
async fn test_clear_all_keeps_id_counters() {
    let sink = RecordingSink::new();
    let scheduler = scheduler_with(&sink, 2, true);

    scheduler.clear_all();

    assert!(scheduler.programs().is_empty());
    assert!(scheduler.bumpers().is_empty());
    assert!(scheduler.bumper_audios().is_empty());
    assert!(scheduler.logos().is_empty());
    assert!(scheduler.view_states().is_empty());
    assert!(scheduler.auto_restart());
    assert_eq!(scheduler.status(), PlaybackStatus::Idle);

    let id = scheduler.add_program(MediaFile::new("programs/new.mp4"));
    assert_eq!(id, AssetId::from("program-3"));
}
