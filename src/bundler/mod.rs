//! Mapping between local skill directories and flat remote bundles.

pub mod codec;
pub mod primary;
pub mod publish;

pub use codec::{KEY_SEPARATOR, expand, flatten};
pub use primary::{SKILL_FILE, SKILL_SUFFIX, find_primary, is_skill_file};
pub use publish::{PublishBundle, collect, fork_files, tagged_description};
