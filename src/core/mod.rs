//! Core skill logic: front matter, trust, and the installed-skill registry.

pub mod frontmatter;
pub mod gate;
pub mod registry;
pub mod trust;

pub use frontmatter::FrontMatter;
pub use gate::{GateOutcome, TrustGate};
pub use registry::{Download, InstallPlan, InstalledSkill, SkillRegistry, download};
pub use trust::{TRUST_STORE_FILE, TrustStore, TrustedAuthor};
