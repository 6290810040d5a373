//! Presentation shell: two mutually exclusive views cross-faded on the
//! requested flag.
//!
//! No state lives here beyond the animation parameters; the view is a
//! pure function of the flag the session controller publishes.

pub mod crossfade;

use tokio::sync::watch;

pub use crossfade::Crossfade;

/// The two visual states of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppView {
    /// Pre-session surface: welcome copy, language picker, start action.
    Welcome,
    /// In-session surface shown while a session is requested.
    Live,
}

impl AppView {
    fn from_requested(requested: bool) -> Self {
        if requested { AppView::Live } else { AppView::Welcome }
    }
}

/// Observes the requested flag and reports the current view.
pub struct Shell {
    requested: watch::Receiver<bool>,
    crossfade: Crossfade,
}

impl Shell {
    pub fn new(requested: watch::Receiver<bool>) -> Self {
        Self {
            requested,
            crossfade: Crossfade::default(),
        }
    }

    /// The view that should currently be visible.
    pub fn view(&self) -> AppView {
        AppView::from_requested(*self.requested.borrow())
    }

    /// Transition parameters for the fade between the two views.
    pub fn crossfade(&self) -> Crossfade {
        self.crossfade
    }

    /// Wait for the next flag change and return the view it selects.
    /// Returns `None` once the controller side is gone.
    pub async fn changed(&mut self) -> Option<AppView> {
        self.requested.changed().await.ok()?;
        Some(AppView::from_requested(*self.requested.borrow()))
    }
}
