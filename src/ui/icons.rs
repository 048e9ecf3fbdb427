//! Shared UI icons and emojis.

use console::Emoji;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[WARN]");
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "*");

// Artifact indicators
pub static FOLDER: Emoji<'_, '_> = Emoji("📁 ", "");
pub static DOCUMENT: Emoji<'_, '_> = Emoji("📄 ", "+");
pub static BOOKS: Emoji<'_, '_> = Emoji("📚 ", "[BIB]");
pub static IMAGE: Emoji<'_, '_> = Emoji("🖼️  ", "[FIG]");

// Progress indicators
pub static PROGRESS: Emoji<'_, '_> = Emoji("📊 ", "[PROG]");
pub static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "[?]");
pub static PACKAGE: Emoji<'_, '_> = Emoji("📦 ", "[DATA]");
