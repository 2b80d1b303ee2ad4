//! Instruction text sent to the generation service.
//!
//! Everything here is a pure string transformation so the exact prompt for a
//! given post, mood and length can be asserted in tests.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder instruction used when the composer is empty
pub const DEFAULT_USER_INSTRUCTION: &str = "Generate a comment based on the post content";

const SHORT_DIRECTIVE: &str = "Keep the comment concise and to the point (1-2 lines, approximately 50-100 characters). Focus on the most impactful insight or question.";
const MEDIUM_DIRECTIVE: &str = "Create a balanced comment (2-4 lines, approximately 100-200 characters). Provide context and add meaningful value.";
const LONG_DIRECTIVE: &str = "Write a comprehensive comment (5+ lines, approximately 200+ characters). Include detailed insights, examples, or multiple points of discussion.";

/// Preferred comment length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Option<String>")]
pub enum LengthPreference {
    Short,
    #[default]
    Medium,
    Long,
}

impl LengthPreference {
    /// Parse a stored value; anything unrecognized means medium
    pub fn from_setting(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "short" => Self::Short,
            "long" => Self::Long,
            _ => Self::Medium,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }

    /// Natural-language length directive for the prompt
    pub fn directive(self) -> &'static str {
        match self {
            Self::Short => SHORT_DIRECTIVE,
            Self::Medium => MEDIUM_DIRECTIVE,
            Self::Long => LONG_DIRECTIVE,
        }
    }
}

/// Stored values are lenient: `null` or anything unrecognized means medium
impl From<Option<String>> for LengthPreference {
    fn from(value: Option<String>) -> Self {
        value.as_deref().map_or(Self::Medium, Self::from_setting)
    }
}

impl fmt::Display for LengthPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the prompt is built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub user_instruction: Option<String>,
    pub post_content: String,
    pub mood: String,
    pub length: LengthPreference,
}

impl GenerationRequest {
    pub fn build_prompt(&self) -> String {
        build_prompt(
            self.user_instruction.as_deref(),
            &self.post_content,
            &self.mood,
            self.length,
        )
    }
}

/// Whether the composer held a real instruction rather than the placeholder
pub fn is_meaningful_instruction(instruction: Option<&str>) -> bool {
    instruction.is_some_and(|text| {
        let text = text.trim();
        !text.is_empty() && !text.eq_ignore_ascii_case(DEFAULT_USER_INSTRUCTION)
    })
}

/// Build the generation instruction
pub fn build_prompt(
    user_instruction: Option<&str>,
    post_content: &str,
    mood: &str,
    length: LengthPreference,
) -> String {
    let user_section = match user_instruction {
        Some(text) if is_meaningful_instruction(Some(text)) => format!(
            "\n## USER INPUT\nIncorporate the following user-provided instruction or key point: \"{}\"\n",
            text.trim()
        ),
        _ => String::new(),
    };
    let length_directive = length.directive();

    let prompt = format!(
        r#"
You are BuzzBlast, the sassiest LinkedIn wingperson in the game. You specialize in crafting engaging, value-driven LinkedIn comments that have personality and flair. Your goal is to help users build their professional brand by adding thoughtful contributions that stand out from the crowd.

## TASK
Analyze the provided Post Content, Desired Mood, Comment Length preference, and optional User Input. Then, generate a single, high-quality LinkedIn comment that meets all the requirements.

## EXAMPLES OF EXCELLENT COMMENTS BY LENGTH

### Short Comment Example (1-2 lines)
- **Post Content:** "Just launched my new open-source project, 'DataWeave'! It's a Python library for simplifying data cleaning pipelines."
- **Desired Mood:** Supportive
- **Generated Comment:** "This is fantastic! Looking forward to trying out DataWeave in my next data project. Congratulations on the launch!"

### Medium Comment Example (2-4 lines)
- **Post Content:** "Our new report shows a 30% increase in remote job postings for the tech sector in Q2 2025 compared to last year."
- **Desired Mood:** Analytical
- **Generated Comment:** "That's a significant jump that reflects the evolving workplace landscape. It would be interesting to see the correlation between this trend and employee retention rates. Has the data shown if companies with a remote-first policy are retaining talent more effectively?"

### Long Comment Example (5+ lines)
- **Post Content:** "After 200 applications and 15 rejections in the final round, I'm thrilled to announce I've accepted a position as a Product Manager."
- **Desired Mood:** Inspirational
- **User Input:** "Mention that perseverance is key"
- **Generated Comment:** "What a powerful reminder of the importance of perseverance in the job search journey. Your story resonates with so many professionals who face similar challenges in today's competitive market. The fact that you persisted through 200 applications and 15 final-round rejections shows incredible resilience and determination. Your journey is truly inspiring and a testament to staying focused on the goal despite setbacks. This kind of persistence often separates successful candidates from others. Huge congratulations on the new role!"

---

## YOUR TASK & CONTEXT

First, silently analyze the key message of the post. Second, consider the desired mood and length preference. Third, if user input exists, determine how to naturally weave it in. Finally, craft the comment according to the specified length.

## POST CONTENT
"{post_content}"

## DESIRED MOOD/TONE
"{mood}"

## COMMENT LENGTH PREFERENCE
{length_directive}
{user_section}
## REQUIREMENTS & CONSTRAINTS
- **Add Value:** The comment must add value. Ask a thoughtful question, share a relevant insight, or offer a unique perspective.
- **Natural Tone:** Seamlessly integrate the "{mood}" mood. It should feel authentic and sassy, not forced.
- **Professional Sass:** Maintain a professional tone suitable for LinkedIn while adding personality and flair.
- **Length Compliance:** Strictly follow the specified length requirement: {length_directive}
- **Engaging:** Encourage a response or further discussion.
- **No Generic Phrases:** Do not use clichés like "Great post!", "Thanks for sharing!", or "Interesting read."
- **No Hashtags:** Do not include hashtags.
- **Plain Text Only:** Do not use markdown, bullet points, or any other formatting markup.
- **Single Comment:** Reply with exactly one comment and nothing else.
- **BuzzBlast Style:** Add personality and sass while staying professional. Make it memorable!

Generate the LinkedIn comment now.
"#
    );

    prompt.trim().to_string()
}
