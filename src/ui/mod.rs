pub mod icons;
pub mod progress;

pub use progress::{GenerationUI, summary_lines};
