use crate::{
    AmplitudeSample, CommandOutcome, CompletionDelivery, CoreError, FinishNotice, Permission,
    RecorderEvent, Rejection, SessionState,
    tests::support::{
        FakeController, FakePlayer, FakeRecorder, OUTPUT, PlayerCall, RecorderCall,
        controller_with, granted_controller,
    },
};

use std::path::PathBuf;

#[derive(Debug, Clone, Copy)]
enum Step {
    Record,
    Pause,
    Resume,
    Stop,
    Play,
    Finish,
}

const STEPS: [Step; 6] = [
    Step::Record,
    Step::Pause,
    Step::Resume,
    Step::Stop,
    Step::Play,
    Step::Finish,
];

/// Transition table written out independently of `SessionState::apply`.
/// Commands that are not legal leave the state unchanged.
fn reference(state: SessionState, step: Step) -> SessionState {
    use SessionState::*;

    match (step, state) {
        (Step::Record, Idle | Stopped | Finished) => Recording,
        (Step::Pause, Recording) => Paused,
        (Step::Resume, Paused) => Recording,
        (Step::Stop, Recording | Paused) => Stopped,
        (Step::Finish, Stopped | Finished) => Finished,
        (Step::Play, Recording | Paused) => Stopped,
        (_, state) => state,
    }
}

fn finish_notice() -> FinishNotice {
    FinishNotice {
        succeeded: true,
        path: PathBuf::from(OUTPUT),
        size_bytes: Some(2048),
    }
}

async fn run(controller: &mut FakeController, step: Step) {
    match step {
        Step::Record => {
            controller.record().await;
        }
        Step::Pause => {
            controller.pause().await;
        }
        Step::Resume => {
            controller.resume().await;
        }
        Step::Stop => {
            controller.stop().await;
        }
        Step::Play => {
            controller.play().await;
        }
        Step::Finish => {
            controller.finish(finish_notice());
        }
    }
}

fn sequences(len: u32) -> impl Iterator<Item = Vec<Step>> {
    let base = STEPS.len();
    (0..base.pow(len)).map(move |mut n| {
        (0..len)
            .map(|_| {
                let step = STEPS[n % base];
                n /= base;
                step
            })
            .collect()
    })
}

/// WHAT: Every command sequence ends in the state the transition table predicts
/// WHY: Invalid commands must be ignored, never half-applied
#[tokio::test]
async fn given_any_command_sequence_when_replayed_then_matches_table_fold() {
    for sequence in sequences(4) {
        // Given: A granted, initialized controller
        let mut controller = granted_controller().await;
        let mut expected = SessionState::Idle;

        // When: Replaying the sequence
        for &step in &sequence {
            run(&mut controller, step).await;
            expected = reference(expected, step);

            // Then: State matches the fold after every step
            assert_eq!(controller.state(), expected, "sequence {:?}", sequence);
        }
    }
}

/// WHAT: Without permission no sequence leaves Idle
/// WHY: Record is the only way out of Idle and requires permission
#[tokio::test]
async fn given_denied_permission_when_any_sequence_replayed_then_state_stays_idle() {
    for sequence in sequences(3) {
        let mut controller = controller_with(FakeRecorder::denied(), FakePlayer::default());
        assert_eq!(controller.initialize().await, Permission::Denied);

        for &step in &sequence {
            run(&mut controller, step).await;
        }

        assert_eq!(controller.state(), SessionState::Idle, "sequence {:?}", sequence);
        assert_eq!(controller.recorder().count(&RecorderCall::Start), 0);
    }
}

/// WHAT: Record before authorization resolves is rejected
/// WHY: Unknown permission is not a grant
#[tokio::test]
async fn given_unresolved_permission_when_recording_then_rejected_and_idle() {
    // Given: A controller that never requested authorization
    let mut controller = controller_with(FakeRecorder::granted(), FakePlayer::default());

    // When: Recording
    let outcome = controller.record().await;

    // Then: Rejected, still Idle, recorder untouched
    assert!(matches!(
        outcome,
        CommandOutcome::Rejected(Rejection::PermissionNotGranted)
    ));
    assert_eq!(controller.state(), SessionState::Idle);
    assert!(controller.recorder().calls.is_empty());
}

/// WHAT: Initialization prepares the output once permission is granted
/// WHY: The first take must not pay for preparation
#[tokio::test]
async fn given_granted_permission_when_initializing_then_output_prepared() {
    let controller = granted_controller().await;

    assert_eq!(controller.session().permission(), Permission::Granted);
    assert_eq!(
        controller.recorder().calls,
        vec![
            RecorderCall::RequestAuthorization,
            RecorderCall::Prepare(PathBuf::from(OUTPUT)),
        ]
    );
}

/// WHAT: Stop from Idle is a logged no-op
/// WHY: Guard violations are recoverable and never reach the recorder
#[tokio::test]
async fn given_idle_when_stopping_then_rejected_and_still_idle() {
    let mut controller = granted_controller().await;

    let outcome = controller.stop().await;

    assert!(matches!(
        outcome,
        CommandOutcome::Rejected(Rejection::NothingToStop)
    ));
    assert_eq!(controller.state(), SessionState::Idle);
    assert_eq!(controller.recorder().count(&RecorderCall::Stop), 0);
}

/// WHAT: Samples observed while paused are dropped
/// WHY: The waveform shows only audio that is being recorded
#[tokio::test]
async fn given_paused_take_when_observing_then_only_live_samples_kept() {
    // Given: A recording take
    let mut controller = granted_controller().await;
    assert!(controller.record().await.is_applied());

    // When: Pause, observe x, resume, observe y
    assert!(controller.pause().await.is_applied());
    let kept_x = controller.observe(AmplitudeSample::new(0.5, 10.0));
    assert!(controller.resume().await.is_applied());
    let kept_y = controller.observe(AmplitudeSample::new(0.75, 20.0));

    // Then: Only y is in the window
    assert!(!kept_x);
    assert!(kept_y);
    assert_eq!(controller.waveform().snapshot(), vec![20.0]);
}

/// WHAT: A second take starts with an empty window and zero elapsed time
/// WHY: The previous waveform is only kept until the next recording begins
#[tokio::test]
async fn given_stopped_take_when_recording_again_then_window_and_elapsed_reset() {
    // Given: A take with samples and elapsed time, then stopped
    let mut controller = granted_controller().await;
    controller.record().await;
    controller.on_progress(2.6, -10.0);
    controller.on_progress(3.1, -12.0);
    controller.stop().await;
    assert_eq!(controller.waveform().len(), 2);
    assert_eq!(controller.session().elapsed_seconds(), 3);

    // When: Recording again
    let outcome = controller.record().await;

    // Then: Fresh window, elapsed reset
    assert!(outcome.is_applied());
    assert!(controller.waveform().is_empty());
    assert_eq!(controller.session().elapsed_seconds(), 0);
}

/// WHAT: The waveform is frozen, not cleared, when recording stops
/// WHY: The last waveform stays visible until the next take
#[tokio::test]
async fn given_recording_with_samples_when_stopped_then_waveform_frozen() {
    let mut controller = granted_controller().await;
    controller.record().await;
    controller.on_progress(0.1, -20.0);
    controller.stop().await;

    // When: Late progress arrives after stop
    let kept = controller.on_progress(0.2, -5.0);

    // Then: Ignored; the earlier bar is retained
    assert!(!kept);
    assert_eq!(controller.waveform().snapshot(), vec![45.0]);
}

/// WHAT: Output is prepared again before a take that follows a stop
/// WHY: The recorder releases its destination when a take is stopped
#[tokio::test]
async fn given_previous_take_stopped_when_recording_then_output_reprepared() {
    let mut controller = granted_controller().await;
    let prepare = RecorderCall::Prepare(PathBuf::from(OUTPUT));

    controller.record().await;
    assert_eq!(controller.recorder().count(&prepare), 1);

    controller.stop().await;
    controller.record().await;

    assert_eq!(controller.recorder().count(&prepare), 2);
    assert_eq!(controller.recorder().calls.last(), Some(&RecorderCall::Start));
}

/// WHAT: Each take gets its own id
/// WHY: Log lines from consecutive takes must be distinguishable
#[tokio::test]
async fn given_two_takes_when_recording_then_take_ids_differ() {
    let mut controller = granted_controller().await;

    controller.record().await;
    let first = controller.session().take_id();
    controller.stop().await;
    controller.record().await;
    let second = controller.session().take_id();

    assert!(first.is_some());
    assert_ne!(first, second);
}

/// WHAT: A failed start keeps the optimistic Recording state
/// WHY: State is not rolled back on collaborator failure
#[tokio::test]
async fn given_failing_recorder_when_recording_then_failed_but_recording() {
    let recorder = FakeRecorder {
        fail_start: true,
        ..FakeRecorder::granted()
    };
    let mut controller = controller_with(recorder, FakePlayer::default());
    controller.initialize().await;

    let outcome = controller.record().await;

    assert!(matches!(
        outcome,
        CommandOutcome::Failed(CoreError::DeviceError { .. })
    ));
    assert_eq!(controller.state(), SessionState::Recording);
}

/// WHAT: A failed stop still leaves the session Stopped
/// WHY: Stop clears the recording flags before the recorder answers
#[tokio::test]
async fn given_failing_recorder_when_stopping_then_failed_but_stopped() {
    let recorder = FakeRecorder {
        fail_stop: true,
        ..FakeRecorder::granted()
    };
    let mut controller = controller_with(recorder, FakePlayer::default());
    controller.initialize().await;
    controller.record().await;

    let outcome = controller.stop().await;

    assert!(matches!(outcome, CommandOutcome::Failed(_)));
    assert_eq!(controller.state(), SessionState::Stopped);
}

/// WHAT: A failed pause keeps the take Recording
/// WHY: Pause only takes effect once the recorder confirms it
#[tokio::test]
async fn given_failing_recorder_when_pausing_then_still_recording() {
    let recorder = FakeRecorder {
        fail_pause: true,
        ..FakeRecorder::granted()
    };
    let mut controller = controller_with(recorder, FakePlayer::default());
    controller.initialize().await;
    controller.record().await;

    let outcome = controller.pause().await;

    assert!(matches!(outcome, CommandOutcome::Failed(_)));
    assert_eq!(controller.state(), SessionState::Recording);
    assert_eq!(controller.view().pause_label, "PAUSE");
}

/// WHAT: A failed resume keeps the take Paused
/// WHY: Resume only takes effect once the recorder confirms it
#[tokio::test]
async fn given_failing_recorder_when_resuming_then_still_paused() {
    let recorder = FakeRecorder {
        fail_resume: true,
        ..FakeRecorder::granted()
    };
    let mut controller = controller_with(recorder, FakePlayer::default());
    controller.initialize().await;
    controller.record().await;
    controller.pause().await;

    let outcome = controller.resume().await;

    assert!(matches!(outcome, CommandOutcome::Failed(_)));
    assert_eq!(controller.state(), SessionState::Paused);
    assert_eq!(controller.view().pause_label, "RESUME");
}

/// WHAT: The pause control toggles between pause and resume
/// WHY: A single button drives both commands
#[tokio::test]
async fn given_recording_when_toggling_pause_twice_then_back_to_recording() {
    let mut controller = granted_controller().await;
    controller.record().await;

    controller.toggle_pause().await;
    assert_eq!(controller.state(), SessionState::Paused);

    controller.toggle_pause().await;
    assert_eq!(controller.state(), SessionState::Recording);
    assert_eq!(
        controller.recorder().calls[2..],
        [
            RecorderCall::Start,
            RecorderCall::Pause,
            RecorderCall::Resume
        ]
    );
}

/// WHAT: Recorders completing through the stop result finish immediately
/// WHY: Both completion styles must reach the same Finished transition
#[tokio::test]
async fn given_stop_result_delivery_when_stopping_then_finished() {
    let recorder = FakeRecorder {
        delivery: CompletionDelivery::StopResult,
        ..FakeRecorder::granted()
    };
    let mut controller = controller_with(recorder, FakePlayer::default());
    controller.initialize().await;
    controller.record().await;

    controller.stop().await;

    assert_eq!(controller.state(), SessionState::Finished);
    let finish = controller.session().last_finish().cloned();
    assert_eq!(finish.map(|f| (f.succeeded, f.size_bytes)), Some((true, None)));
}

/// WHAT: Event-delivered completion finishes the take when it arrives
/// WHY: Until then the file is not confirmed
#[tokio::test]
async fn given_event_delivery_when_finished_event_arrives_then_finished() {
    // Given: A stopped take on an event-delivering recorder
    let mut controller = granted_controller().await;
    controller.record().await;
    controller.stop().await;
    assert_eq!(controller.state(), SessionState::Stopped);

    // When: The completion event is dispatched twice
    controller.handle_event(RecorderEvent::Finished(finish_notice()));
    controller.handle_event(RecorderEvent::Finished(finish_notice()));

    // Then: Finished, with size recorded
    assert_eq!(controller.state(), SessionState::Finished);
    assert_eq!(
        controller.session().last_finish().and_then(|f| f.size_bytes),
        Some(2048)
    );
}

/// WHAT: A failed completion keeps the take Stopped but records the failure
/// WHY: Finished must only advertise playable files
#[tokio::test]
async fn given_stopped_take_when_completion_fails_then_stopped_with_failure_recorded() {
    let mut controller = granted_controller().await;
    controller.record().await;
    controller.stop().await;

    let outcome = controller.finish(FinishNotice {
        succeeded: false,
        path: PathBuf::from(OUTPUT),
        size_bytes: None,
    });

    assert!(outcome.is_applied());
    assert_eq!(controller.state(), SessionState::Stopped);
    assert_eq!(
        controller.session().last_finish().map(|f| f.succeeded),
        Some(false)
    );
}

/// WHAT: A late completion from a superseded take does not end the new one
/// WHY: A new record supersedes the previous take
#[tokio::test]
async fn given_new_take_when_late_completion_arrives_then_still_recording() {
    let mut controller = granted_controller().await;
    controller.record().await;
    controller.stop().await;
    controller.record().await;
    controller.on_progress(0.1, -30.0);

    let outcome = controller.finish(finish_notice());

    assert!(matches!(
        outcome,
        CommandOutcome::Rejected(Rejection::NotStopped)
    ));
    assert_eq!(controller.state(), SessionState::Recording);
    assert_eq!(controller.waveform().snapshot(), vec![35.0]);
    assert!(controller.session().last_finish().is_some());
}

/// WHAT: Play during a take stops it, then loads and plays the output
/// WHY: Playback must never run against a file still being written
#[tokio::test]
async fn given_recording_when_playing_then_stop_load_play_in_order() {
    let mut controller = granted_controller().await;
    controller.record().await;

    let outcome = controller.play().await;

    assert!(outcome.is_applied());
    assert_eq!(controller.state(), SessionState::Stopped);
    assert_eq!(controller.recorder().calls.last(), Some(&RecorderCall::Stop));
    assert_eq!(
        controller.player().calls,
        vec![PlayerCall::Load(PathBuf::from(OUTPUT)), PlayerCall::Play]
    );
}

/// WHAT: Play from a paused take also stops it first
/// WHY: A paused take is still an open recording
#[tokio::test]
async fn given_paused_when_playing_then_take_stopped() {
    let mut controller = granted_controller().await;
    controller.record().await;
    controller.pause().await;

    controller.play().await;

    assert_eq!(controller.state(), SessionState::Stopped);
    assert_eq!(controller.recorder().count(&RecorderCall::Stop), 1);
}

/// WHAT: Play is never issued when loading fails
/// WHY: Load and play are sequential steps
#[tokio::test]
async fn given_failing_load_when_playing_then_play_not_issued() {
    let player = FakePlayer {
        fail_load: true,
        ..FakePlayer::default()
    };
    let mut controller = controller_with(FakeRecorder::granted(), player);
    controller.initialize().await;

    let outcome = controller.play().await;

    assert!(matches!(outcome, CommandOutcome::Failed(_)));
    assert_eq!(
        controller.player().calls,
        vec![PlayerCall::Load(PathBuf::from(OUTPUT))]
    );
    assert_eq!(controller.state(), SessionState::Idle);
}

/// WHAT: Unsuccessful playback is reported as a failure
/// WHY: Decoding errors surface only through the play result
#[tokio::test]
async fn given_player_reports_failure_when_playing_then_playback_failed() {
    let player = FakePlayer {
        play_result: false,
        ..FakePlayer::default()
    };
    let mut controller = controller_with(FakeRecorder::granted(), player);
    controller.initialize().await;

    let outcome = controller.play().await;

    assert!(matches!(
        outcome,
        CommandOutcome::Failed(CoreError::PlaybackFailed { .. })
    ));
}

/// WHAT: Elapsed seconds follow the floor of live sample timestamps
/// WHY: Elapsed time only advances while recording
#[tokio::test]
async fn given_progress_events_when_recording_and_paused_then_elapsed_tracks_live_only() {
    let mut controller = granted_controller().await;
    controller.record().await;

    controller.handle_event(RecorderEvent::Progress {
        current_time: 1.9,
        current_metering: -40.0,
    });
    assert_eq!(controller.view().elapsed_seconds, 1);

    controller.pause().await;
    controller.handle_event(RecorderEvent::Progress {
        current_time: 5.2,
        current_metering: -40.0,
    });
    assert_eq!(controller.view().elapsed_seconds, 1);

    controller.resume().await;
    controller.handle_event(RecorderEvent::Progress {
        current_time: 2.4,
        current_metering: -40.0,
    });
    assert_eq!(controller.view().elapsed_seconds, 2);
}

/// WHAT: The view projects state, label, bars and capacity
/// WHY: Rendering reads only the view
#[tokio::test]
async fn given_recording_with_bars_when_viewing_then_projection_complete() {
    let mut controller = granted_controller().await;
    controller.record().await;
    controller.on_progress(0.25, -100.0);
    controller.on_progress(0.5, -15.0);

    let view = controller.view();

    assert_eq!(view.state, SessionState::Recording);
    assert_eq!(view.pause_label, "PAUSE");
    assert_eq!(view.permission, Permission::Granted);
    assert_eq!(view.bars, vec![1.0, 50.0]);
    assert_eq!(view.capacity, 30);
    assert!(view.last_finish.is_none());
}
