use super::*;

#[test]
fn test_default_endpoint_and_model() {
    let client = OpenAiVision::new("sk-test".to_string());
    assert_eq!(client.api_url, DEFAULT_API_URL);
    assert_eq!(client.model, "gpt-4o");
    assert_eq!(client.max_tokens, 300);
}

#[test]
fn test_builder_overrides() {
    let client = OpenAiVision::new("sk-test".to_string())
        .with_url("https://proxy.local/v1/chat/completions".to_string())
        .with_model("gpt-4o-mini".to_string())
        .with_max_tokens(128);
    assert_eq!(client.api_url, "https://proxy.local/v1/chat/completions");
    assert_eq!(client.model, "gpt-4o-mini");
    assert_eq!(client.max_tokens, 128);
}

#[test]
fn test_prompt_selection() {
    assert_eq!(OpenAiVision::prompt_for(AnalysisMode::Describe), DESCRIBE_PROMPT);
    assert_eq!(OpenAiVision::prompt_for(AnalysisMode::Content), CONTENT_PROMPT);
}

#[test]
fn test_build_request_embeds_image() {
    let client = OpenAiVision::new("sk-test".to_string());
    let request = client.build_request(b"fake-png", AnalysisMode::Describe);
    let json = serde_json::to_value(&request).unwrap();

    assert_eq!(json["messages"][0]["content"][0]["text"], DESCRIBE_PROMPT);
    let url = json["messages"][0]["content"][1]["image_url"]["url"]
        .as_str()
        .unwrap();
    assert!(url.starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn test_analyze_rejects_empty_image() {
    let client = OpenAiVision::new("sk-test".to_string());
    let result = client.analyze(b"", AnalysisMode::Describe).await;
    assert!(matches!(result, Err(VisionError::Image(_))));
}

mod http_tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_client(server: &MockServer) -> OpenAiVision {
        OpenAiVision::new("sk-test".to_string()).with_url(format!("{}/v1/chat", server.uri()))
    }

    #[tokio::test]
    async fn test_analyze_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat"))
            .and(header("Authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "A login page."}}]
            })))
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        let text = client
            .analyze(b"fake-png", AnalysisMode::Describe)
            .await
            .unwrap();
        assert_eq!(text, "A login page.");
    }

    #[tokio::test]
    async fn test_analyze_sends_content_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat"))
            .and(body_partial_json(serde_json::json!({
                "messages": [{"content": [{"type": "text", "text": CONTENT_PROMPT}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "Summary."}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        let text = client
            .analyze(b"fake-png", AnalysisMode::Content)
            .await
            .unwrap();
        assert_eq!(text, "Summary.");
    }

    #[tokio::test]
    async fn test_analyze_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "Incorrect API key", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        let result = client.analyze(b"fake-png", AnalysisMode::Describe).await;
        match result {
            Err(VisionError::AuthenticationFailed(msg)) => {
                assert!(msg.contains("Incorrect API key"));
            }
            other => panic!("Expected AuthenticationFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_analyze_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        let result = client.analyze(b"fake-png", AnalysisMode::Describe).await;
        assert!(matches!(result, Err(VisionError::RateLimited)));
    }

    #[tokio::test]
    async fn test_analyze_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        let result = client.analyze(b"fake-png", AnalysisMode::Describe).await;
        match result {
            Err(VisionError::ApiError { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("Expected ApiError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_analyze_empty_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": ""}}]
            })))
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        let result = client.analyze(b"fake-png", AnalysisMode::Describe).await;
        assert!(matches!(result, Err(VisionError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_analyze_trims_whitespace() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "  A museum homepage.\n"}}]
            })))
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        let text = client
            .analyze(b"fake-png", AnalysisMode::Describe)
            .await
            .unwrap();
        assert_eq!(text, "A museum homepage.");
    }
}
