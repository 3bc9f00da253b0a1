//! AI systems (FixedUpdate, порядок задаёт AIPlugin)

pub mod movement;
pub mod reactions;
pub mod think;

// Re-export all systems
pub use movement::*;
pub use reactions::*;
pub use think::*;
