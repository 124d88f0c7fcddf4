use std::{sync::Arc, time::Duration};

use tokio::{sync::mpsc, task::JoinHandle, time::Instant};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::{
    capture::{
        frame::{CapturedPhoto, capture_frame},
        machine::{CaptureMachine, Input, Phase, Step},
        source::{ReadyState, VideoSource},
    },
    config::settings::VisualAdjustments,
    foundation::{
        core::{COUNTDOWN_SECONDS, FLASH_DURATION_MS},
        error::{BoothError, BoothResult},
    },
};

/// Delays driving one capture session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureTiming {
    /// Pause before the first countdown.
    pub ready_pause: Duration,
    /// Length of one countdown step.
    pub tick: Duration,
    /// Countdown start value.
    pub countdown: u32,
    /// Full flash duration; the photo is taken at its midpoint.
    pub flash: Duration,
    /// Extra wait after the flash before the next slot.
    pub post_flash_margin: Duration,
    /// Wait between the last advance and handing the photos over.
    pub settle: Duration,
    /// How often a missing camera is polled.
    pub source_poll: Duration,
}

impl Default for CaptureTiming {
    fn default() -> Self {
        Self {
            ready_pause: Duration::from_millis(1000),
            tick: Duration::from_millis(1000),
            countdown: COUNTDOWN_SECONDS,
            flash: Duration::from_millis(FLASH_DURATION_MS),
            post_flash_margin: Duration::from_millis(300),
            settle: Duration::from_millis(500),
            source_poll: Duration::from_millis(100),
        }
    }
}

impl CaptureTiming {
    /// Offset of the capture instant from flash start.
    pub fn capture_offset(&self) -> Duration {
        self.flash / 2
    }

    /// Offset of the advance from flash start.
    pub fn advance_offset(&self) -> Duration {
        self.flash + self.post_flash_margin
    }
}

/// Progress notifications for the screen layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SequencerEvent {
    /// The ready pause started.
    ReadyPause,
    /// Countdown now shows this value.
    Countdown(u32),
    /// Flash raised for slot `i`.
    FlashOn(usize),
    /// Slot `i` holds a photo.
    Captured(usize),
    /// Capturing slot `i` failed; the slot will be counted down again.
    CaptureSkipped(usize, String),
    /// Flash lowered for slot `i`.
    FlashOff(usize),
    /// Moved on; the value is the next slot to fill.
    Advanced(usize),
    /// No camera attached; the sequence is suspended until one appears.
    WaitingForSource,
    /// Photos handed over.
    Complete,
}

/// How a sequence ended.
#[derive(Debug)]
pub enum SequenceOutcome {
    /// All photos, ordered by index.
    Completed(Vec<CapturedPhoto>),
    /// Torn down before completion; no photos are returned.
    Cancelled,
}

impl SequenceOutcome {
    /// Photos, if the sequence completed.
    pub fn into_photos(self) -> Option<Vec<CapturedPhoto>> {
        match self {
            Self::Completed(photos) => Some(photos),
            Self::Cancelled => None,
        }
    }
}

enum Flow {
    Continue,
    Cancelled,
}

/// Drives a [`CaptureMachine`] on the tokio clock and collects the photos.
pub struct CaptureSequencer {
    source: Arc<dyn VideoSource>,
    adjustments: VisualAdjustments,
    timing: CaptureTiming,
    machine: CaptureMachine,
    photos: Vec<CapturedPhoto>,
    events: Option<mpsc::UnboundedSender<SequencerEvent>>,
    cancel: CancellationToken,
}

impl CaptureSequencer {
    /// Sequencer with default timing.
    pub fn new(source: Arc<dyn VideoSource>, adjustments: VisualAdjustments) -> Self {
        Self::with_timing(source, adjustments, CaptureTiming::default())
    }

    /// Sequencer with explicit timing.
    pub fn with_timing(
        source: Arc<dyn VideoSource>,
        adjustments: VisualAdjustments,
        timing: CaptureTiming,
    ) -> Self {
        Self {
            source,
            adjustments,
            timing,
            machine: CaptureMachine::new(timing.countdown),
            photos: Vec::new(),
            events: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Send progress events to `tx`. A closed receiver is ignored.
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<SequencerEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Token that tears the sequence down when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run on a background task; dropping the handle cancels the sequence.
    pub fn spawn(self) -> CaptureHandle {
        let token = self.cancel.clone();
        let guard = token.clone().drop_guard();
        let join = tokio::spawn(self.run());
        CaptureHandle {
            join,
            token,
            _guard: guard,
        }
    }

    /// Run the whole session to completion or cancellation.
    #[tracing::instrument(name = "capture_sequence", skip_all)]
    pub async fn run(mut self) -> SequenceOutcome {
        match self.drive().await {
            Flow::Continue => {
                let photos = std::mem::take(&mut self.photos);
                tracing::info!(photos = photos.len(), "capture sequence complete");
                self.emit(SequencerEvent::Complete);
                SequenceOutcome::Completed(photos)
            }
            Flow::Cancelled => {
                tracing::info!(
                    captured = self.photos.len(),
                    "capture sequence cancelled"
                );
                self.photos.clear();
                SequenceOutcome::Cancelled
            }
        }
    }

    async fn drive(&mut self) -> Flow {
        self.emit(SequencerEvent::ReadyPause);
        if let Flow::Cancelled = self.wait_for_source().await {
            return Flow::Cancelled;
        }
        if !self.sleep(self.timing.ready_pause).await {
            return Flow::Cancelled;
        }
        self.machine.apply(Input::ReadyElapsed);

        loop {
            match self.machine.phase() {
                Phase::Counting { remaining } => {
                    self.emit(SequencerEvent::Countdown(remaining));
                    let flow = if remaining == 0 {
                        self.flash_cycle().await
                    } else {
                        self.count_down_once().await
                    };
                    if let Flow::Cancelled = flow {
                        return Flow::Cancelled;
                    }
                }
                Phase::Complete => break,
                phase => {
                    // Cycles run to Advancing -> Counting/Complete inside flash_cycle.
                    tracing::warn!(?phase, "unexpected phase between cycles");
                    return Flow::Cancelled;
                }
            }
        }

        if !self.sleep(self.timing.settle).await {
            return Flow::Cancelled;
        }
        Flow::Continue
    }

    async fn count_down_once(&mut self) -> Flow {
        if let Flow::Cancelled = self.wait_for_source().await {
            return Flow::Cancelled;
        }
        if !self.sleep(self.timing.tick).await {
            return Flow::Cancelled;
        }
        self.machine.apply(Input::Tick);
        Flow::Continue
    }

    // Every sub-event is scheduled relative to the same flash start.
    async fn flash_cycle(&mut self) -> Flow {
        let flash_start = Instant::now();
        if let Step::Ignored = self.machine.apply(Input::StartFlash) {
            return Flow::Continue;
        }
        let index = self.machine.photo_index();
        self.emit(SequencerEvent::FlashOn(index));

        if !self.sleep_until(flash_start + self.timing.capture_offset()).await {
            return Flow::Cancelled;
        }
        let captured = self.capture_slot(index);
        self.machine.apply(Input::FlashPeak { captured });

        if !self.sleep_until(flash_start + self.timing.flash).await {
            return Flow::Cancelled;
        }
        self.machine.apply(Input::FlashEnd);
        self.emit(SequencerEvent::FlashOff(index));

        if !self.sleep_until(flash_start + self.timing.advance_offset()).await {
            return Flow::Cancelled;
        }
        self.machine.apply(Input::AdvanceDue);
        if let Phase::Counting { .. } = self.machine.phase() {
            self.emit(SequencerEvent::Advanced(self.machine.photo_index()));
        }
        Flow::Continue
    }

    fn capture_slot(&mut self, index: usize) -> bool {
        let result = capture_frame(self.source.as_ref(), &self.adjustments)
            .and_then(|image| CapturedPhoto::new(image, index));
        match result {
            Ok(photo) => {
                self.photos.push(photo);
                self.emit(SequencerEvent::Captured(index));
                true
            }
            Err(err) => {
                if err.is_capture_recoverable() {
                    tracing::warn!(index, %err, "capture failed, retrying slot");
                } else {
                    tracing::error!(index, %err, "unexpected capture error, retrying slot");
                }
                self.emit(SequencerEvent::CaptureSkipped(index, err.to_string()));
                false
            }
        }
    }

    async fn wait_for_source(&mut self) -> Flow {
        if self.source.ready_state() != ReadyState::NoSource {
            return Flow::Continue;
        }
        tracing::warn!("no camera source, suspending capture sequence");
        self.emit(SequencerEvent::WaitingForSource);
        while self.source.ready_state() == ReadyState::NoSource {
            if !self.sleep(self.timing.source_poll).await {
                return Flow::Cancelled;
            }
        }
        tracing::info!("camera source available, resuming");
        Flow::Continue
    }

    async fn sleep(&self, delay: Duration) -> bool {
        self.sleep_until(Instant::now() + delay).await
    }

    // `false` when cancelled first.
    async fn sleep_until(&self, deadline: Instant) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep_until(deadline) => true,
        }
    }

    fn emit(&self, event: SequencerEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}

/// Handle onto a spawned [`CaptureSequencer`].
///
/// Dropping the handle cancels the sequence.
pub struct CaptureHandle {
    join: JoinHandle<SequenceOutcome>,
    token: CancellationToken,
    _guard: DropGuard,
}

impl CaptureHandle {
    /// Tear the sequence down. Pending timers are dropped and no further capture happens.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// `true` once the sequence has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait for the sequence to finish.
    pub async fn wait(self) -> BoothResult<SequenceOutcome> {
        let Self {
            join,
            _guard: guard,
            ..
        } = self;
        let outcome = join
            .await
            .map_err(|e| BoothError::Other(anyhow::Error::new(e).context("capture task failed")))?;
        drop(guard);
        Ok(outcome)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/sequencer.rs"]
mod tests;
