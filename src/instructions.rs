//! System prompt and user prompt assembly for the generation agent.

use std::path::Path;

pub const INSTRUCTIONS_FILE: &str = "CLAUDE.md";

pub const FALLBACK_INSTRUCTIONS: &str = "You are a scientific writing assistant. Follow best practices for \
scientific communication and always present a plan before execution.";

/// Contents of `CLAUDE.md` in the working directory, or a built-in default.
pub fn load_system_instructions(work_dir: &Path) -> String {
    let path = work_dir.join(INSTRUCTIONS_FILE);
    match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            if path.exists() {
                tracing::warn!(path = %path.display(), error = %e, "failed to read instructions, using default");
            }
            FALLBACK_INSTRUCTIONS.to_string()
        }
    }
}

/// System prompt for a one-shot run that must create a fresh output
/// directory under `output_root`.
pub fn new_run_instructions(base: &str, work_dir: &Path, output_root: &Path) -> String {
    format!(
        r#"{base}

IMPORTANT - WORKING DIRECTORY:
- Your working directory is: {work_dir}
- ALWAYS create the output folder in this directory: {output_root}/
- NEVER write to /tmp/ or any other temporary directory
- All paper outputs MUST go to: {output_root}/<timestamp>_<description>/

IMPORTANT - CONVERSATION CONTINUITY:
- This is a NEW paper request - create a new paper directory
- Create a unique timestamped directory in the output folder
- Do NOT assume there's an existing paper unless explicitly told in the prompt context
"#,
        work_dir = work_dir.display(),
        output_root = output_root.display(),
    )
}

/// System prompt for an interactive session, where continuation context is
/// carried in each user prompt.
pub fn session_instructions(base: &str) -> String {
    format!(
        r#"{base}

IMPORTANT - CONVERSATION CONTINUITY:
- The user will provide context in their prompt if they want to continue working on an existing paper
- If the prompt includes [CONTEXT: You are currently working on a paper in: ...], continue editing that paper
- If no such context is provided, this is a NEW paper request - create a new paper directory
- Do NOT assume there's an existing paper unless explicitly told in the prompt context
- Each new chat session should start with a new paper unless context says otherwise
"#
    )
}

/// Prompt that pins the agent to an existing paper directory.
pub fn continuation_prompt(paper_path: &Path, data_context: &str, user_input: &str) -> String {
    format!(
        "[CONTEXT: You are currently working on a paper in: {}]\n\
         [INSTRUCTION: Continue editing this existing paper. Do NOT create a new paper directory.]\n\
         {}\n\
         User request: {}",
        paper_path.display(),
        data_context,
        user_input
    )
}
