//! Four-facet comment classification.

use schemars::JsonSchema;
use serde::Deserialize;

/// Model output for one comment. Four independent booleans; no sanitization
/// is applied downstream.
#[derive(Debug, Clone, Copy, Deserialize, JsonSchema)]
pub struct CommentJudgment {
    /// The commenter points out an editing mistake in the video.
    pub is_editing_mistake: bool,
    /// The commenter mentions the video's sponsor.
    pub is_sponsor_mention: bool,
    /// The comment asks the creator a question.
    pub is_question: bool,
    /// Overall positive sentiment.
    pub is_positive_comment: bool,
}

/// Everything the classifier sees about one comment.
#[derive(Debug, Clone, Copy)]
pub struct CommentContext<'a> {
    pub video_title: &'a str,
    pub video_description: &'a str,
    pub author: &'a str,
    pub text: &'a str,
}

pub(crate) fn classification_prompt(ctx: &CommentContext<'_>) -> String {
    format!(
        "Video title: {}\n\nVideo description:\n{}\n\nComment by {}:\n{}",
        ctx.video_title, ctx.video_description, ctx.author, ctx.text
    )
}

pub(crate) const CLASSIFY_SYSTEM_PROMPT: &str = "You classify a single viewer comment \
on a video. Judge each facet independently: whether the comment reports an editing \
mistake, whether it mentions the video's sponsor, whether it asks the creator a \
question, and whether its overall sentiment is positive.";
