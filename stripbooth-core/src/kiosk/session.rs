use chrono::{DateTime, Utc};

use crate::{
    capture::{
        frame::CapturedPhoto,
        sequencer::{CaptureSequencer, SequenceOutcome},
    },
    compose::strip::{PhotoStrip, StripCompositor},
    config::settings::AppSettings,
    foundation::error::{BoothError, BoothResult},
    persist::bridge::{DownloadFallback, PersistenceBridge, PrintReceipt, print_photo_strip},
};

/// Kiosk screen flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    /// Attract screen; waiting for a guest.
    Welcome,
    /// Countdown and capture.
    Capture,
    /// Photos taken; strip not yet built.
    Processing,
    /// Strip shown for print or redo.
    Review,
    /// Printed; about to return to welcome.
    ThankYou,
}

/// Per-guest state: the photos, the strip and which screen is showing.
///
/// Reset replaces the photo list and strip wholesale, releasing the previous session's
/// image buffers.
#[derive(Debug)]
pub struct KioskSession {
    screen: Screen,
    photos: Vec<CapturedPhoto>,
    strip: Option<PhotoStrip>,
    did_print: bool,
    compositor: StripCompositor,
    settings: AppSettings,
}

impl KioskSession {
    /// Session on the welcome screen.
    pub fn new(compositor: StripCompositor, settings: AppSettings) -> Self {
        Self {
            screen: Screen::Welcome,
            photos: Vec::new(),
            strip: None,
            did_print: false,
            compositor,
            settings,
        }
    }

    /// Current screen.
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Photos of the current session.
    pub fn photos(&self) -> &[CapturedPhoto] {
        &self.photos
    }

    /// Strip of the current session, once built.
    pub fn strip(&self) -> Option<&PhotoStrip> {
        self.strip.as_ref()
    }

    /// Whether the current session has printed.
    pub fn did_print(&self) -> bool {
        self.did_print
    }

    /// Settings in effect.
    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Replace the settings; takes effect for the next strip and print.
    pub fn set_settings(&mut self, settings: AppSettings) {
        self.settings = settings;
    }

    fn expect_screen(&self, want: Screen, action: &str) -> BoothResult<()> {
        if self.screen != want {
            return Err(BoothError::validation(format!(
                "cannot {action} on {:?} screen",
                self.screen
            )));
        }
        Ok(())
    }

    /// Guest tapped start.
    pub fn start(&mut self) -> BoothResult<()> {
        self.expect_screen(Screen::Welcome, "start")?;
        self.screen = Screen::Capture;
        tracing::info!("session started");
        Ok(())
    }

    /// The capture sequence handed over its photos.
    pub fn photos_complete(&mut self, photos: Vec<CapturedPhoto>) -> BoothResult<()> {
        self.expect_screen(Screen::Capture, "accept photos")?;
        self.photos = photos;
        self.screen = Screen::Processing;
        Ok(())
    }

    /// Run `sequencer` and accept its photos. A cancelled capture resets the session and
    /// returns `false`.
    pub async fn capture(&mut self, sequencer: CaptureSequencer) -> BoothResult<bool> {
        self.expect_screen(Screen::Capture, "capture")?;
        match sequencer.run().await {
            SequenceOutcome::Completed(photos) => {
                self.photos_complete(photos)?;
                Ok(true)
            }
            SequenceOutcome::Cancelled => {
                self.reset();
                Ok(false)
            }
        }
    }

    /// Composite the strip and move to review.
    ///
    /// Any compositing failure resets the whole session to the welcome screen before the
    /// error is returned.
    pub async fn generate_strip(&mut self) -> BoothResult<&PhotoStrip> {
        self.expect_screen(Screen::Processing, "generate a strip")?;
        let background = self.settings.background();
        match self
            .compositor
            .generate_strip(self.photos.clone(), background)
            .await
        {
            Ok(strip) => {
                self.screen = Screen::Review;
                let strip: &PhotoStrip = self.strip.insert(strip);
                Ok(strip)
            }
            Err(err) => {
                tracing::error!(%err, "strip generation failed, resetting session");
                self.reset();
                Err(err)
            }
        }
    }

    /// Print the strip and move to the thank-you screen.
    pub fn print(
        &mut self,
        bridge: &dyn PersistenceBridge,
        fallback: &dyn DownloadFallback,
        now: DateTime<Utc>,
    ) -> BoothResult<PrintReceipt> {
        self.expect_screen(Screen::Review, "print")?;
        let strip = self
            .strip
            .as_ref()
            .ok_or_else(|| BoothError::validation("no strip to print"))?;
        let receipt = print_photo_strip(strip, &self.settings, bridge, fallback, now)?;
        self.did_print = true;
        self.screen = Screen::ThankYou;
        Ok(receipt)
    }

    /// Guest chose to start over from review.
    pub fn redo(&mut self) {
        self.reset();
    }

    /// Thank-you screen finished.
    pub fn finish(&mut self) {
        self.reset();
    }

    /// Drop everything and return to the welcome screen. Idempotent.
    pub fn reset(&mut self) {
        self.photos = Vec::new();
        self.strip = None;
        self.did_print = false;
        self.screen = Screen::Welcome;
        tracing::debug!("session reset");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kiosk/session.rs"]
mod tests;
