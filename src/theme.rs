use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ThemeKey {
    #[default]
    Classic,
    Midnight,
    Sunset,
    Forest,
}

impl ThemeKey {
    pub const ALL: [ThemeKey; 4] = [
        ThemeKey::Classic,
        ThemeKey::Midnight,
        ThemeKey::Sunset,
        ThemeKey::Forest,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ThemeKey::Classic => "classic",
            ThemeKey::Midnight => "midnight",
            ThemeKey::Sunset => "sunset",
            ThemeKey::Forest => "forest",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ThemeKey::Classic => "Classic",
            ThemeKey::Midnight => "Midnight",
            ThemeKey::Sunset => "Sunset",
            ThemeKey::Forest => "Forest",
        }
    }

    /// Accepts either the key or the display name.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.key().eq_ignore_ascii_case(value) || t.display_name() == value)
    }
}

/// Accents a message is decorated with. `primary` marks headings, `text`
/// marks list items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeColors {
    pub primary: &'static str,
    pub text: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub display_name: &'static str,
    pub colors: ThemeColors,
}

fn colors(key: ThemeKey, dark: bool) -> ThemeColors {
    match (key, dark) {
        (ThemeKey::Classic, false) => ThemeColors { primary: "⚪", text: "▫️" },
        (ThemeKey::Classic, true) => ThemeColors { primary: "⚫", text: "▪️" },
        (ThemeKey::Midnight, false) => ThemeColors { primary: "🔵", text: "🔹" },
        (ThemeKey::Midnight, true) => ThemeColors { primary: "🌌", text: "🔷" },
        (ThemeKey::Sunset, false) => ThemeColors { primary: "🟠", text: "🔸" },
        (ThemeKey::Sunset, true) => ThemeColors { primary: "🌇", text: "🔶" },
        (ThemeKey::Forest, false) => ThemeColors { primary: "🟢", text: "🌱" },
        (ThemeKey::Forest, true) => ThemeColors { primary: "🌲", text: "🍃" },
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThemeStore {
    dark_mode: bool,
    current: ThemeKey,
}

impl ThemeStore {
    pub fn is_dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
    }

    pub fn current_theme(&self) -> ThemeKey {
        self.current
    }

    pub fn set_current_theme(&mut self, key: ThemeKey) {
        self.current = key;
    }

    /// Every theme with its colors for the current dark-mode setting.
    pub fn available_themes(&self) -> Vec<(ThemeKey, Theme)> {
        ThemeKey::ALL
            .into_iter()
            .map(|key| {
                (
                    key,
                    Theme {
                        display_name: key.display_name(),
                        colors: colors(key, self.dark_mode),
                    },
                )
            })
            .collect()
    }

    pub fn theme_colors(&self) -> ThemeColors {
        colors(self.current, self.dark_mode)
    }
}

/// Theme preferences per chat. Handed to handlers as a dispatcher dependency.
#[derive(Debug, Default)]
pub struct ThemeBook {
    stores: Mutex<HashMap<i64, ThemeStore>>,
}

impl ThemeBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, chat: i64) -> ThemeStore {
        self.stores
            .lock()
            .map(|stores| stores.get(&chat).copied().unwrap_or_default())
            .unwrap_or_default()
    }

    pub fn colors(&self, chat: i64) -> ThemeColors {
        self.get(chat).theme_colors()
    }

    /// Applies `f` to the chat's store and returns the result.
    pub fn update(&self, chat: i64, f: impl FnOnce(&mut ThemeStore)) -> ThemeStore {
        let mut stores = match self.stores.lock() {
            Ok(stores) => stores,
            Err(poisoned) => poisoned.into_inner(),
        };
        let store = stores.entry(chat).or_default();
        f(store);
        *store
    }
}
