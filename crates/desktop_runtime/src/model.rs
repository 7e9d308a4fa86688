use desktop_app_contract::{AppId, WindowGeometry, WindowPosition, WindowSize};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub u64);

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInstance {
    pub instance_id: InstanceId,
    pub app_id: AppId,
    pub is_open: bool,
    pub is_foreground: bool,
    pub position: WindowPosition,
    pub size: WindowSize,
    pub title: Option<String>,
    pub initial_data: Option<Value>,
    pub created_at: u64,
}

impl AppInstance {
    pub fn geometry(&self) -> WindowGeometry {
        WindowGeometry {
            position: self.position,
            size: self.size,
        }
    }

    /// Title shown in window chrome: the explicit title, else the app name.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or_else(|| self.app_id.title())
    }
}

/// Placement rules for newly created instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Position of the first window when no geometry is persisted.
    pub base_position: WindowPosition,
    /// Pixels each additional open window is shifted by.
    pub stagger_step: i32,
    /// Number of stagger steps before placement wraps back to the base.
    pub stagger_cycle: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_position: WindowPosition { x: 16, y: 40 },
            stagger_step: 32,
            stagger_cycle: 8,
        }
    }
}

/// Side-effect intents queued by the registry for the host to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryEffect {
    /// Persist the last known geometry of an application kind.
    PersistGeometry {
        app_id: AppId,
        geometry: WindowGeometry,
    },
    /// Move keyboard focus into the newly foregrounded instance.
    FocusInstanceInput(InstanceId),
}
