use async_trait::async_trait;
use luaclear_transform::deobfuscator::{deobfuscate_source, polish, presets};
use luaclear_transform::polish::{NoopPolisher, Polisher};
use luaclear_utils::errors::PolishError;

/// Stands in for a remote completion service.
struct Scripted {
    reply: Option<&'static str>,
}

#[async_trait]
impl Polisher for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn polish(&self, _text: &str) -> Result<String, PolishError> {
        self.reply
            .map(str::to_string)
            .ok_or(PolishError::EmptyResponse)
    }
}

#[tokio::test]
async fn test_noop_polish_returns_output() {
    let result = deobfuscate_source("local a = 1", &presets::full()).unwrap();
    let polished = polish(&result, &NoopPolisher).await.unwrap();
    assert_eq!(polished, result.output);
}

#[tokio::test]
async fn test_polish_replaces_text() {
    let result = deobfuscate_source("local a = 1", &presets::full()).unwrap();
    let scripted = Scripted {
        reply: Some("local count = 1\n"),
    };
    assert_eq!(polish(&result, &scripted).await.unwrap(), "local count = 1\n");
}

#[tokio::test]
async fn test_polish_failure_keeps_pipeline_output() {
    let result = deobfuscate_source("local a = 1", &presets::full()).unwrap();
    let err = polish(&result, &Scripted { reply: None }).await.unwrap_err();

    assert!(matches!(err, PolishError::EmptyResponse));
    assert_eq!(result.output, "local var_1 = 1\n");
}
