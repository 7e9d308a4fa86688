//! Shared contract types between the window instance registry, the terminal interpreter and the
//! assistant reconciler.
//!
//! Application kinds are a closed set with canonical kebab-case identifiers (`textedit`,
//! `internet-explorer`, ...). Those identifiers are what the control mini-language and persisted
//! window geometry use on the wire.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Application kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppId {
    /// File browser.
    Finder,
    /// Sound effect recorder and player.
    Soundboard,
    /// Retro web browser.
    InternetExplorer,
    /// Chat client.
    Chats,
    /// Rich text editor.
    #[serde(rename = "textedit")]
    TextEdit,
    /// Bitmap painting app.
    Paint,
    /// Camera booth.
    PhotoBooth,
    /// Minesweeper game.
    Minesweeper,
    /// Video player.
    Videos,
    /// Music player.
    #[serde(rename = "ipod")]
    IPod,
    /// Synthesizer.
    Synth,
    /// Terminal emulator.
    Terminal,
    /// System settings.
    ControlPanels,
}

impl AppId {
    /// Every application kind, in catalog order.
    pub const ALL: [AppId; 13] = [
        AppId::Finder,
        AppId::Soundboard,
        AppId::InternetExplorer,
        AppId::Chats,
        AppId::TextEdit,
        AppId::Paint,
        AppId::PhotoBooth,
        AppId::Minesweeper,
        AppId::Videos,
        AppId::IPod,
        AppId::Synth,
        AppId::Terminal,
        AppId::ControlPanels,
    ];

    /// Canonical wire identifier.
    pub fn canonical_id(self) -> &'static str {
        match self {
            Self::Finder => "finder",
            Self::Soundboard => "soundboard",
            Self::InternetExplorer => "internet-explorer",
            Self::Chats => "chats",
            Self::TextEdit => "textedit",
            Self::Paint => "paint",
            Self::PhotoBooth => "photo-booth",
            Self::Minesweeper => "minesweeper",
            Self::Videos => "videos",
            Self::IPod => "ipod",
            Self::Synth => "synth",
            Self::Terminal => "terminal",
            Self::ControlPanels => "control-panels",
        }
    }

    /// Parses a canonical identifier; unknown identifiers yield `None`.
    pub fn from_canonical_id(raw: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|app_id| app_id.canonical_id() == raw)
    }

    /// Human-readable application name.
    pub fn title(self) -> &'static str {
        app_descriptor(self).title
    }
}

impl std::fmt::Display for AppId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.canonical_id())
    }
}

/// Window position in desktop pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPosition {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
}

impl WindowPosition {
    /// Returns the position shifted by `delta` on both axes.
    pub fn offset(self, delta: i32) -> Self {
        Self {
            x: self.x + delta,
            y: self.y + delta,
        }
    }
}

/// Window size in desktop pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    /// Width.
    pub width: i32,
    /// Height.
    pub height: i32,
}

impl WindowSize {
    /// Grows the size to at least `min` on each axis.
    pub fn clamped_min(self, min: WindowSize) -> Self {
        Self {
            width: self.width.max(min.width),
            height: self.height.max(min.height),
        }
    }
}

/// Persisted window geometry for one application kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowGeometry {
    /// Last known position.
    pub position: WindowPosition,
    /// Last known size.
    pub size: WindowSize,
}

/// Static catalog metadata for an application kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppDescriptor {
    /// Application kind.
    pub app_id: AppId,
    /// Display name.
    pub title: &'static str,
    /// Size used when no geometry has been persisted.
    pub default_size: WindowSize,
    /// Smallest size the window may be resized to.
    pub min_size: WindowSize,
    /// Whether launching always opens a fresh instance.
    pub multi_instance: bool,
}

const fn size(width: i32, height: i32) -> WindowSize {
    WindowSize { width, height }
}

const fn descriptor(
    app_id: AppId,
    title: &'static str,
    default_size: WindowSize,
    min_size: WindowSize,
    multi_instance: bool,
) -> AppDescriptor {
    AppDescriptor {
        app_id,
        title,
        default_size,
        min_size,
        multi_instance,
    }
}

const APP_REGISTRY: [AppDescriptor; 13] = [
    descriptor(AppId::Finder, "Finder", size(400, 300), size(300, 200), true),
    descriptor(AppId::Soundboard, "Soundboard", size(650, 475), size(550, 375), false),
    descriptor(
        AppId::InternetExplorer,
        "Internet Explorer",
        size(730, 600),
        size(400, 300),
        false,
    ),
    descriptor(AppId::Chats, "Chats", size(560, 360), size(300, 320), false),
    descriptor(AppId::TextEdit, "TextEdit", size(430, 475), size(430, 200), true),
    descriptor(AppId::Paint, "MacPaint", size(713, 480), size(400, 400), false),
    descriptor(AppId::PhotoBooth, "Photo Booth", size(644, 510), size(644, 510), false),
    descriptor(AppId::Minesweeper, "Minesweeper", size(305, 400), size(305, 400), false),
    descriptor(AppId::Videos, "Videos", size(400, 420), size(400, 340), false),
    descriptor(AppId::IPod, "iPod", size(300, 480), size(300, 480), false),
    descriptor(AppId::Synth, "Synth", size(720, 400), size(720, 290), false),
    descriptor(AppId::Terminal, "Terminal", size(600, 400), size(400, 300), false),
    descriptor(
        AppId::ControlPanels,
        "Control Panels",
        size(365, 415),
        size(320, 415),
        false,
    ),
];

/// Returns the full application catalog.
pub fn app_registry() -> &'static [AppDescriptor] {
    &APP_REGISTRY
}

/// Returns catalog metadata for `app_id`.
pub fn app_descriptor(app_id: AppId) -> &'static AppDescriptor {
    // APP_REGISTRY is declared in `AppId::ALL` order.
    &APP_REGISTRY[app_id as usize]
}

/// Seam through which the terminal and the assistant reconciler drive the window registry.
pub trait AppControl {
    /// Launches `app_id`, or focuses its open instance for single-instance kinds.
    fn launch_app(&mut self, app_id: AppId, initial_data: Option<Value>);

    /// Closes every open instance of `app_id`.
    fn close_app(&mut self, app_id: AppId);
}
