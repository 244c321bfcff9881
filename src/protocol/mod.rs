//! Wire types exchanged with the host extension platform.
//!
//! Every type serializes to the exact JSON shape the browser APIs use, so
//! the wasm binding can pass them through `JSON.parse`/`JSON.stringify`
//! unchanged.
//!
//! # Messages
//!
//! | Type | Direction | Purpose |
//! |------|-----------|---------|
//! | `ContentMessage` | Background → Page | Preference push notification |
//! | `MessageAck` | Page → Background | Receipt acknowledgement |
//! | `MenuItem` / `MenuItemUpdate` | Background → Host | Menu rendering |
//! | `ClickInfo` / `TabInfo` | Host → Background | Menu click |
//! | `StorageChanges` | Host → Both | Storage change notification |
//! | `InstalledDetails` | Host → Background | Lifecycle |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `menu` | Context-menu items and clicks |
//! | `message` | Runtime messages |
//! | `storage` | Storage areas and changes |
//! | `tab` | Tab and lifecycle payloads |

// ============================================================================
// Submodules
// ============================================================================

/// Context-menu item and click types.
pub mod menu;

/// Runtime message types.
pub mod message;

/// Storage area and change types.
pub mod storage;

/// Tab and lifecycle types.
pub mod tab;

// ============================================================================
// Re-exports
// ============================================================================

pub use menu::{ClickInfo, MenuContext, MenuItem, MenuItemType, MenuItemUpdate};
pub use message::{ContentMessage, MessageAck};
pub use storage::{StorageArea, StorageChange, StorageChanges, StorageItems};
pub use tab::{InstallReason, InstalledDetails, TabInfo};
