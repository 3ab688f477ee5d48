// Library crate: the editor core plus the headless harness and command
// protocol used by the CLI runner and the integration tests.

pub mod command;
pub mod error;
pub mod fixtures;
pub mod harness;
pub mod serialization;
pub mod session;
pub mod state;
pub mod viewport;

pub use error::{EditError, EditResult, ExportError, ImportError};
pub use session::EditorSession;
