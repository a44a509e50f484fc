//! The roast pipeline: one resume in, a roast and a tips list out.

use tracing::info;

use crate::llm_client::{Generation, LlmClient};
use crate::roast::prompts::build_prompts;

/// Both generations for one resume. Each side succeeds or fails on its own.
#[derive(Debug)]
pub struct RoastOutcome {
    pub roast: Generation,
    pub tips: Generation,
}

/// Builds both prompts and runs the two independent generation calls concurrently.
pub async fn roast_resume(llm: &LlmClient, resume_text: &str) -> RoastOutcome {
    let (roast_prompt, tips_prompt) = build_prompts(resume_text);

    info!("Generating roast and tips with {}", llm.model());
    let (roast, tips) = tokio::join!(llm.generate(&roast_prompt), llm.generate(&tips_prompt));

    info!(
        "Generation finished: roast_ok={}, tips_ok={}",
        roast.result.is_ok(),
        tips.result.is_ok()
    );
    RoastOutcome { roast, tips }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::{LlmError, Provider};
    use crate::test_support::{generation_config, MockServer};

    #[tokio::test]
    async fn test_both_prompts_are_sent() {
        let server =
            MockServer::start(vec![(200, r#"[{"generated_text": "generated"}]"#)]).await;
        let llm = LlmClient::new(&generation_config(&server.url, Provider::HuggingFace, 3))
            .unwrap();

        let outcome = roast_resume(&llm, "Jane Doe, Rust").await;

        assert_eq!(outcome.roast.result.unwrap(), "generated");
        assert_eq!(outcome.tips.result.unwrap(), "generated");
        assert_eq!(server.calls(), 2);

        let mut inputs: Vec<String> = server
            .requests()
            .iter()
            .map(|r| r["inputs"].as_str().unwrap_or_default().to_string())
            .collect();
        inputs.sort();
        assert!(inputs[0].starts_with("Provide three specific improvement tips"));
        assert!(inputs[1].starts_with("Roast this resume"));
        assert!(inputs.iter().all(|i| i.ends_with("Jane Doe, Rust")));
    }

    #[tokio::test]
    async fn test_failure_of_one_side_is_reported_per_side() {
        let server = MockServer::start(vec![(400, r#"{"error": "Input validation error"}"#)])
            .await;
        let llm = LlmClient::new(&generation_config(&server.url, Provider::HuggingFace, 3))
            .unwrap();

        let outcome = roast_resume(&llm, "resume").await;

        assert!(matches!(outcome.roast.result, Err(LlmError::Api { status: 400, .. })));
        assert!(matches!(outcome.tips.result, Err(LlmError::Api { status: 400, .. })));
        assert_eq!(server.calls(), 2);
    }
}
