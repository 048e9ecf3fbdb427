//! CLI command handlers.
//!
//! | Module     | Commands                         |
//! |------------|----------------------------------|
//! | `generate` | `scientific-writer generate`     |
//! | `papers`   | `scientific-writer papers`       |
//! | `scan`     | `scientific-writer scan`         |
//! | `chat`     | `scientific-writer chat`         |

mod chat;
mod generate;
mod papers;
mod scan;

pub use chat::cmd_chat;
pub use generate::{GenerateArgs, cmd_generate};
pub use papers::cmd_papers;
pub use scan::cmd_scan;
