//! Prompt assembly
//!
//! Builds the textual agent description passed as generation context: the
//! persona's self-description, either its private information (survey-style
//! tasks) or its speech pattern (dialogue tasks), and the contents of up to
//! [`RETRIEVAL_COUNT`] memories retrieved for the task's anchor. Assembly
//! is read-only; the retrieval call is its only side effect.

use elicit_agent::{Agent, AgentError};

/// Memories retrieved per anchor when assembling a description
pub const RETRIEVAL_COUNT: usize = 8;

/// Space-joined anchor over a task's question texts
#[must_use]
pub fn question_anchor<'a>(texts: impl IntoIterator<Item = &'a str>) -> String {
    texts.into_iter().collect::<Vec<_>>().join(" ")
}

/// Render a dialogue as `[speaker]: text` lines with a trailing
/// fill-in placeholder for the responding agent
#[must_use]
pub fn render_dialogue(dialogue: &[(String, String)], respondent: &str) -> String {
    let mut rendered = String::new();
    for (speaker, text) in dialogue {
        rendered.push_str(&format!("[{speaker}]: {text}\n"));
    }
    rendered.push_str(&format!("[{respondent}]: [Fill in]\n"));
    rendered
}

/// Agent description for survey-style tasks
///
/// Self-description, private information, then retrieved observations.
///
/// # Errors
/// Propagates memory subsystem failures.
pub async fn main_agent_desc(agent: &Agent, anchor: &str) -> Result<String, AgentError> {
    let mut desc = String::new();
    desc.push_str(&format!(
        "Self description: {}\n==\n",
        agent.scratch.self_description
    ));
    desc.push_str(&format!(
        "Private information: {}\n==\n",
        agent.scratch.private_self_description
    ));
    append_observations(agent, anchor, &mut desc).await?;
    Ok(desc)
}

/// Agent description for dialogue tasks
///
/// Speech pattern replaces private information, which stays out of
/// spoken context.
///
/// # Errors
/// Propagates memory subsystem failures.
pub async fn utterance_agent_desc(agent: &Agent, anchor: &str) -> Result<String, AgentError> {
    let mut desc = String::new();
    desc.push_str(&format!(
        "Self description: {}\n==\n",
        agent.scratch.self_description
    ));
    desc.push_str(&format!(
        "Speech pattern: {}\n==\n",
        agent.scratch.speech_pattern
    ));
    append_observations(agent, anchor, &mut desc).await?;
    Ok(desc)
}

async fn append_observations(
    agent: &Agent,
    anchor: &str,
    desc: &mut String,
) -> Result<(), AgentError> {
    desc.push_str("Other observations about the subject:\n\n");

    let retrieved = agent
        .retrieve(&[anchor.to_string()], 0, RETRIEVAL_COUNT)
        .await?;
    if let Some(nodes) = retrieved.into_values().next() {
        for node in nodes {
            desc.push_str(&node.content);
            desc.push('\n');
        }
    }
    Ok(())
}
