pub mod session;
pub mod tools;
pub mod audio;
pub mod events;
mod content;

pub use session::{SessionConfig, SessionConfigurator, SessionIdentity};
pub use content::items::{FunctionCallItem, FunctionCallOutputItem, Item, ItemMeta, ItemStatus};
pub use content::message::*;
pub use content::parts::{AudioTranscriptPart, ContentPart, TextPart};
pub use events::{ClientEvent, ServerEvent, ServerEventKind};
