// Prompt templates for the roast pipeline. `{resume}` is replaced with the extracted text.

/// Satirical critique, comedic and sarcastic in tone.
pub const ROAST_PROMPT_TEMPLATE: &str =
    "Roast this resume with funny, sarcastic humor like a comedian: {resume}";

/// Exactly three concrete, bulleted suggestions.
pub const TIPS_PROMPT_TEMPLATE: &str =
    "Provide three specific improvement tips for this resume in a bulleted list: {resume}";

/// Builds `(roast_prompt, tips_prompt)` with the resume embedded verbatim.
pub fn build_prompts(resume_text: &str) -> (String, String) {
    (
        ROAST_PROMPT_TEMPLATE.replace("{resume}", resume_text),
        TIPS_PROMPT_TEMPLATE.replace("{resume}", resume_text),
    )
}
