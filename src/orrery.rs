use std::collections::HashMap;
use std::sync::Mutex;

/// NASA's interactive 3D view of the Solar System.
pub const ORRERY_URL: &str = "https://eyes.nasa.gov/apps/orrery/";
pub const ORRERY_TITLE: &str = "NASA Eyes on the Solar System";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewerState {
    #[default]
    Pending,
    Loaded,
}

/// An opaque external viewer. All we track is whether it has been handed
/// to the reader yet, to decide between a placeholder and the real link.
#[derive(Debug, Clone)]
pub struct Orrery {
    url: &'static str,
    state: ViewerState,
}

impl Default for Orrery {
    fn default() -> Self {
        Self {
            url: ORRERY_URL,
            state: ViewerState::Pending,
        }
    }
}

impl Orrery {
    pub fn url(&self) -> &'static str {
        self.url
    }

    pub fn state(&self) -> ViewerState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state == ViewerState::Loaded
    }

    pub fn mark_loaded(&mut self) {
        self.state = ViewerState::Loaded;
    }
}

/// Viewer state per chat. A chat that already has the link gets it again
/// without the loading placeholder.
#[derive(Debug, Default)]
pub struct OrreryBook {
    viewers: Mutex<HashMap<i64, Orrery>>,
}

impl OrreryBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, chat: i64) -> Orrery {
        self.viewers
            .lock()
            .map(|viewers| viewers.get(&chat).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    pub fn mark_loaded(&self, chat: i64) {
        let mut viewers = match self.viewers.lock() {
            Ok(viewers) => viewers,
            Err(poisoned) => poisoned.into_inner(),
        };
        viewers.entry(chat).or_default().mark_loaded();
    }
}
