//! End-to-end continuation loop scenarios against a scripted backend.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use codemorph::domain::models::config::EngineConfig;
use codemorph::domain::models::generation::GenerationRequest;
use codemorph::domain::ports::{BackendError, CompletionRequest, GenerationBackend};
use codemorph::services::RetryOrchestrator;

/// Replays a fixed list of responses and records every request it sees.
struct RecordingBackend {
    responses: Mutex<Vec<Result<String, BackendError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl RecordingBackend {
    fn new(responses: Vec<Result<String, BackendError>>) -> Arc<Self> {
        let mut responses = responses;
        responses.reverse();
        Arc::new(Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationBackend for RecordingBackend {
    async fn complete(&self, request: CompletionRequest) -> Result<String, BackendError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(BackendError::Unknown("script exhausted".to_string())))
    }
}

fn request(prompt: &str) -> GenerationRequest {
    GenerationRequest::new(prompt, "gpt-4o")
}

#[tokio::test]
async fn overlapping_continuation_is_stitched_without_duplication() {
    // The continuation restates the tail of the truncated response.
    let backend = RecordingBackend::new(vec![
        Ok("public int add(int a, int b) {\n    return".to_string()),
        Ok("    return a + b;\n}".to_string()),
    ]);
    let orchestrator = RetryOrchestrator::new(backend.clone(), EngineConfig::default());

    let completion = orchestrator
        .run(&request("translate add() to Java"))
        .await
        .unwrap();

    assert!(completion.complete);
    assert_eq!(completion.attempts, 1);
    assert_eq!(
        completion.text,
        "public int add(int a, int b) {\n    return a + b;\n}"
    );
}

#[tokio::test]
async fn continuation_prompts_carry_context_and_history() {
    let backend = RecordingBackend::new(vec![
        Ok("void render() {\nint frame = 0;".to_string()),
        Ok("frame += 1;\nflush(frame);\n}".to_string()),
    ]);
    let orchestrator = RetryOrchestrator::new(backend.clone(), EngineConfig::default());

    orchestrator
        .run(&request("write the render loop"))
        .await
        .unwrap();

    let requests = backend.requests();
    assert_eq!(requests.len(), 2);

    // First call is the untouched base prompt with no history.
    assert_eq!(requests[0].prompt, "write the render loop");
    assert!(requests[0].history.is_empty());

    // The continuation restates trailing text, reports open blocks, and
    // carries the previous exchange as history.
    assert!(requests[1].prompt.contains("int frame = 0;"));
    assert!(requests[1].prompt.contains("Open blocks: 1"));
    assert_eq!(requests[1].history.len(), 1);
    assert_eq!(requests[1].history[0].prompt, "write the render loop");
}

#[tokio::test]
async fn rejected_continuation_retries_with_the_base_prompt() {
    let backend = RecordingBackend::new(vec![
        Ok("select total from orders where status = 'OPEN' and".to_string()),
        // Pure echo of recent text: rejected by the duplicate gate.
        Ok("where status = 'OPEN' and".to_string()),
        Ok("and total > 100 order by total desc".to_string()),
    ]);
    let orchestrator = RetryOrchestrator::new(backend.clone(), EngineConfig::default());

    let completion = orchestrator
        .run(&request("finish the orders query"))
        .await
        .unwrap();

    let requests = backend.requests();
    assert_eq!(requests.len(), 3);
    // The recovery call goes back to the original prompt verbatim.
    assert_eq!(requests[2].prompt, "finish the orders query");
    assert!(completion.text.ends_with("order by total desc"));
}

#[tokio::test]
async fn exhausted_budget_closes_open_blocks() {
    // Every response opens another block and never closes one.
    let backend = RecordingBackend::new(vec![
        Ok("module top level opens {".to_string()),
        Ok("first nested section opens {".to_string()),
        Ok("second nested section opens {".to_string()),
        Ok("third nested section opens {".to_string()),
    ]);
    let orchestrator = RetryOrchestrator::new(backend.clone(), EngineConfig::default());

    let completion = orchestrator.run(&request("generate the module")).await.unwrap();

    assert!(!completion.complete);
    assert_eq!(completion.attempts, 3);
    assert_eq!(backend.requests().len(), 4);
    // Four blocks were opened; finalization appends a closer for each.
    assert!(completion.text.ends_with("    }    }    }    }"));
}

#[tokio::test]
async fn repeated_echoes_finish_best_effort() {
    // Continuation and its recovery call both echo recent text, so the
    // session settles on what it already has after three calls total.
    let backend = RecordingBackend::new(vec![
        Ok("counting up: one, two, three,".to_string()),
        Ok("one, two, three,".to_string()),
        Ok("two, three,".to_string()),
        Ok("never requested".to_string()),
    ]);
    let orchestrator = RetryOrchestrator::new(backend.clone(), EngineConfig::default());

    let completion = orchestrator.run(&request("keep counting")).await.unwrap();

    assert!(!completion.complete);
    assert_eq!(completion.attempts, 1);
    assert_eq!(backend.requests().len(), 3);
    assert_eq!(completion.text, "counting up: one, two, three,");
}

#[tokio::test]
async fn transient_failure_mid_session_recovers_once() {
    let backend = RecordingBackend::new(vec![
        Ok("begin listing {".to_string()),
        Err(BackendError::Overloaded),
        Ok("item one, item two, item three }".to_string()),
    ]);
    let orchestrator = RetryOrchestrator::new(backend.clone(), EngineConfig::default());

    let completion = orchestrator.run(&request("list the items")).await.unwrap();

    assert!(completion.complete);
    assert_eq!(backend.requests().len(), 3);
    // The recovery call reuses the base prompt.
    assert_eq!(backend.requests()[2].prompt, "list the items");
    assert!(completion.text.ends_with("}"));
}
