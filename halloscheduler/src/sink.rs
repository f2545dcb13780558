//! The rendering surface the scheduler drives.

use crate::asset::{Bumper, BumperAudio, Logo, Program};
use crate::error::RenderError;
use crate::view_state::ViewState;
use std::time::Duration;

/// Capability that actually presents programs, bumpers and logos.
///
/// The scheduler issues at most one `play_*`/`show_*` call at a time and
/// awaits it before the next one. The render futures must be cancel safe:
/// when a stage is cancelled the scheduler drops the future and then calls
/// [`MediaSink::stop`], which must release whatever the dropped render had
/// opened.
///
/// The synchronous control methods may be called at any moment, including
/// while a render future is pending, and sometimes under the scheduler's
/// state lock: they must not call back into the scheduler.
#[async_trait::async_trait]
pub trait MediaSink: Send + Sync {
    /// Plays `program` to its natural end.
    ///
    /// # Errors
    ///
    /// Returns an error when the asset cannot be opened or decoded.
    async fn play_program(&self, program: &Program, view: ViewState) -> Result<(), RenderError>;

    /// Plays `bumper` with `audio` for exactly `duration`, looping both to
    /// fill it whatever their native length.
    async fn play_bumper(
        &self,
        bumper: &Bumper,
        audio: &BumperAudio,
        duration: Duration,
    ) -> Result<(), RenderError>;

    /// Shows `logo` for `duration`.
    async fn show_logo(&self, logo: &Logo, duration: Duration) -> Result<(), RenderError>;

    /// Hard stop: pauses and clears every active source.
    fn stop(&self);

    /// Presents the terminal screen shown once every program has played.
    fn show_done_screen(&self);

    /// Removes the terminal screen, if shown.
    fn clear_done_screen(&self);

    /// Pauses or resumes the active media. A paused bumper or logo does not
    /// consume its fixed duration.
    fn set_paused(&self, paused: bool);

    /// Seeks the active program forward by `by`.
    fn jump_forward(&self, by: Duration);

    /// Applies a new zoom scale to the active program.
    fn set_scale(&self, scale: f64);
}
