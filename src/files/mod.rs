mod changes;
mod file;
mod state;

pub use changes::{ChangeSet, Files};
pub use file::File;
pub use state::{Content, FileState, LineWindow};

pub(crate) use state::numbered_lines;
