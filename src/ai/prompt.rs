use crate::config::Period;
use crate::github::ActivityData;
use crate::report::format_structured;

/// Maximum number of commit messages included in a summary prompt
const MAX_PROMPT_COMMITS: usize = 50;

/// A named set of instructions for the summarizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptPreset {
    /// Human-readable name
    pub name: &'static str,
    /// Value accepted by `--prompt` and `prompt_preset`
    pub value: &'static str,
    /// Instructions sent to the model
    pub prompt: &'static str,
}

pub const PROMPT_PRESETS: &[PromptPreset] = &[
    PromptPreset {
        name: "Sprint summary (for managers / stakeholders)",
        value: "sprint",
        prompt: "Write a concise, professional summary of this developer's work that could be \
shared with a manager or presented at the end of a sprint. Focus on what was accomplished, \
key deliverables, and any notable contributions. Use clear, non-technical language where \
possible. Structure it as a brief status update with sections for accomplishments, \
in-progress work (if any PRs are still open), and collaboration highlights.",
    },
    PromptPreset {
        name: "Performance review starter",
        value: "review",
        prompt: "Write a summary of this developer's work that can serve as the starting point \
for a performance review. Cover: key accomplishments and impact, technical growth signals, \
collaboration and code review patterns, consistency and reliability of output, and areas of \
strength. Frame everything in terms of observable evidence from the activity data. Use a \
professional, constructive tone suitable for an official review document.",
    },
    PromptPreset {
        name: "Unbiased engineering review",
        value: "unbiased",
        prompt: "You are an engineering manager reviewing a developer's GitHub activity. Provide \
an unbiased, honest engineering review of this person's work. This should NOT be a simple \
recap; it should be a fair evaluation.

Your review should cover:
1. **What they worked on**: briefly summarize the themes and areas of contribution.
2. **Quality signals**: based on PR titles, commit messages, review activity, and volume, \
assess the quality and thoughtfulness of their work. Note any red flags (e.g. sloppy commit \
messages, no reviews, only trivial changes) or green flags (e.g. meaningful reviews, \
well-scoped PRs, cross-cutting work).
3. **Scope & impact**: evaluate the scope of the work relative to the time period. Is this a \
reasonable amount of output? Above or below expectations?
4. **Collaboration**: assess their review activity and engagement with others' work.
5. **Pros**: list specific strengths demonstrated in this period.
6. **Areas for improvement**: list concrete areas where they could do better.
7. **Estimated engineer level**: based solely on the evidence in this activity, classify this \
person into one of these levels: Junior, SE2, Senior, Principal, or Senior Principal. Explain \
your reasoning.

Be direct and honest. Don't sugarcoat, but be fair. If there's not enough data to assess \
something, say so.",
    },
    PromptPreset {
        name: "Roast me",
        value: "roast",
        prompt: "You are a brutally honest (but funny) code reviewer who has been asked to roast \
this developer's GitHub activity. Go all in and point out anything that could be seen as lazy, \
sloppy, or questionable. Tiny PRs? Call them out. Vague commit messages? Drag them. No reviews? \
Roast them for being a lone wolf. Too many reviews? Ask if they actually write code. Be savage \
but keep it entertaining. End with a final verdict / burn. Remember: this is all in good fun, \
but the observations should be grounded in the actual data.",
    },
];

/// Look up a preset by its value
pub fn find_preset(value: &str) -> Option<&'static PromptPreset> {
    PROMPT_PRESETS.iter().find(|p| p.value == value)
}

/// Interpret `--prompt`: a preset value selects that preset, anything else is taken verbatim
pub fn resolve_instructions(prompt: &str) -> String {
    match find_preset(prompt) {
        Some(preset) => preset.prompt.to_string(),
        None => prompt.to_string(),
    }
}

/// Build the full prompt handed to the summarizer
pub fn generate_summary_prompt(data: &ActivityData, period: Period, instructions: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "Below is {}'s GitHub activity for {} ({} to {}).\n\n",
        data.username,
        period.describe(),
        data.date_range.since,
        data.date_range.until
    ));

    prompt.push_str(instructions);
    prompt.push_str("\n\n");
    prompt.push_str(&format_structured(data));
    prompt.push_str("\n\n");

    prompt.push_str("PRs Created:\n");
    if data.prs_created.is_empty() {
        prompt.push_str("(none)\n");
    }
    for pr in &data.prs_created {
        prompt.push_str(&format!(
            "- {} (#{}) [{}]\n",
            pr.title,
            pr.number,
            pr.status_label()
        ));
    }

    prompt.push_str(&format!("\nCommits (first {}):\n", MAX_PROMPT_COMMITS));
    if data.commits.is_empty() {
        prompt.push_str("(none)\n");
    }
    for commit in data.commits.iter().take(MAX_PROMPT_COMMITS) {
        prompt.push_str(&format!("- {} ({})\n", commit.message, commit.repo));
    }

    prompt
}
