//! Interview prompt construction and reply post-processing.

/// Question the interviewer opens with before any reply has been parsed.
pub const DEFAULT_FIRST_QUESTION: &str = "Tell me about yourself";

/// Used when a reply carries no parsable final question line.
pub const FALLBACK_QUESTION: &str = "Can you elaborate?";

/// Shown in place of a reply when the completion response has no text part.
pub const EMPTY_REPLY_PLACEHOLDER: &str = "No response from AI.";

/// Bot bubble text when the completion request fails outright.
pub const COMPLETION_ERROR_TEXT: &str = "Error fetching response. Please try again.";

/// Build the single-turn interviewer prompt.
///
/// All four values are embedded verbatim; the fixed instructional text asks
/// the model to return feedback followed by the next question.
pub fn build_interview_prompt(
    job_role: &str,
    job_description: &str,
    previous_question: &str,
    candidate_answer: &str,
) -> String {
    format!(
        r#"You are an AI interviewer conducting a structured job interview.
Job Role: {job_role}
Job Description: {job_description}

You will ask interview questions one by one.
After each question, the candidate provides an answer.
You must analyze the answer and provide brief constructive feedback (mention strengths and areas for improvement).
Then, ask the next relevant question.

Previous Question: {previous_question}
Candidate's Answer: {candidate_answer}

Provide feedback in a professional yet conversational tone.
Format the response like this:

Feedback: [Provide feedback here]
Next Question: [Ask the next relevant interview question]"#
    )
}

/// Strip the two bold markers the model tends to wrap its section labels in.
pub fn clean_reply(raw: &str) -> String {
    raw.replace("**Feedback:**", "Feedback:")
        .replace("**Next Question:**", "Next Question:")
}

/// Extract the question that primes the next turn: the final non-empty
/// trimmed line of the reply, or the fixed fallback if there is none.
pub fn next_question_from_reply(reply: &str) -> String {
    reply
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or(FALLBACK_QUESTION)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_all_values() {
        let prompt = build_interview_prompt(
            "Backend Engineer",
            "REST APIs",
            "Tell me about yourself",
            "I build APIs",
        );
        assert!(prompt.contains("Job Role: Backend Engineer"));
        assert!(prompt.contains("Job Description: REST APIs"));
        assert!(prompt.contains("Previous Question: Tell me about yourself"));
        assert!(prompt.contains("Candidate's Answer: I build APIs"));
        assert!(prompt.contains("Feedback:"));
        assert!(prompt.contains("Next Question:"));
    }

    #[test]
    fn test_clean_reply_strips_bold_markers() {
        let raw = "**Feedback:** Solid answer.\n**Next Question:** Why Rust?";
        assert_eq!(
            clean_reply(raw),
            "Feedback: Solid answer.\nNext Question: Why Rust?"
        );
    }

    #[test]
    fn test_clean_reply_leaves_other_markup() {
        let raw = "Feedback: your *emphasis* stays";
        assert_eq!(clean_reply(raw), raw);
    }

    #[test]
    fn test_next_question_takes_final_nonempty_line() {
        let reply = "Feedback: nice.\n\nNext Question: What is ownership?\n\n";
        assert_eq!(
            next_question_from_reply(reply),
            "Next Question: What is ownership?"
        );
    }

    #[test]
    fn test_next_question_trims_whitespace() {
        let reply = "Feedback: ok.\n   Next Question: Why?   \n";
        assert_eq!(next_question_from_reply(reply), "Next Question: Why?");
    }

    #[test]
    fn test_next_question_falls_back_when_blank() {
        assert_eq!(next_question_from_reply(""), FALLBACK_QUESTION);
        assert_eq!(next_question_from_reply("  \n \n"), FALLBACK_QUESTION);
    }
}
