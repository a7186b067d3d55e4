//! Prompt rendering and the backend call.

use std::time::Instant;

use tracing::{debug, info};

use crate::backend::{GenerationBackend, GenerationRequest};
use crate::error::{TestgenError, TestgenResult};
use crate::spec::model::SpecKind;
use crate::template::TemplateRegistry;

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Default output budget in tokens.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Model settings sent with every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorSettings {
    pub model: String,
    pub max_tokens: u32,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Render the prompt for `kind` without contacting any backend.
pub fn render_prompt(registry: &TemplateRegistry, text: &str, kind: SpecKind) -> TestgenResult<String> {
    registry.lookup(kind)?.render(text)
}

/// Renders the template for a spec kind and asks the backend for code.
pub struct Generator {
    registry: TemplateRegistry,
    backend: Box<dyn GenerationBackend>,
    settings: GeneratorSettings,
}

impl Generator {
    pub fn new(
        registry: TemplateRegistry,
        backend: Box<dyn GenerationBackend>,
        settings: GeneratorSettings,
    ) -> Self {
        Self {
            registry,
            backend,
            settings,
        }
    }

    /// Generate raw output for a spec. The result is untrusted text.
    pub async fn generate(&self, text: &str, kind: SpecKind) -> TestgenResult<String> {
        let prompt = render_prompt(&self.registry, text, kind)?;
        let request = GenerationRequest {
            prompt,
            model: self.settings.model.clone(),
            max_tokens: self.settings.max_tokens,
        };

        info!(
            backend = self.backend.name(),
            model = %request.model,
            template = %kind,
            "Requesting generation"
        );
        let start = Instant::now();

        let segments = self.backend.generate(&request).await?;

        debug!(
            segments = segments.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            prompt_bytes = request.prompt.len(),
            "Backend responded"
        );

        segments.into_iter().next().ok_or(TestgenError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendError;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Backend stub that records requests and replays a fixed reply.
    struct StubBackend {
        reply: Result<Vec<String>, u16>,
        seen: Arc<Mutex<Vec<GenerationRequest>>>,
    }

    #[async_trait]
    impl GenerationBackend for StubBackend {
        fn name(&self) -> &str {
            "stub"
        }

        async fn generate(&self, request: &GenerationRequest) -> Result<Vec<String>, BackendError> {
            self.seen.lock().unwrap().push(request.clone());
            match &self.reply {
                Ok(segments) => Ok(segments.clone()),
                Err(status) => Err(BackendError::Api {
                    status: *status,
                    body: "overloaded".into(),
                }),
            }
        }
    }

    fn generator(
        registry: TemplateRegistry,
        reply: Result<Vec<String>, u16>,
    ) -> (Generator, Arc<Mutex<Vec<GenerationRequest>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let backend = StubBackend {
            reply,
            seen: Arc::clone(&seen),
        };
        let generator = Generator::new(registry, Box::new(backend), GeneratorSettings::default());
        (generator, seen)
    }

    #[tokio::test]
    async fn test_returns_first_segment() {
        let (generator, seen) = generator(
            TemplateRegistry::builtin().unwrap(),
            Ok(vec!["first".into(), "second".into()]),
        );

        let out = generator.generate("Function: add", SpecKind::Generic).await.unwrap();
        assert_eq!(out, "first");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].model, DEFAULT_MODEL);
        assert_eq!(seen[0].max_tokens, DEFAULT_MAX_TOKENS);
        assert!(seen[0].prompt.contains("Function: add"));
    }

    #[tokio::test]
    async fn test_unregistered_kind_never_calls_backend() {
        let registry = TemplateRegistry::builder()
            .register(SpecKind::Generic, "{{ spec }}")
            .unwrap()
            .build();
        let (generator, seen) = generator(registry, Ok(vec!["code".into()]));

        let err = generator.generate("x", SpecKind::Register).await.unwrap_err();
        assert!(matches!(err, TestgenError::UnknownTemplateKind { .. }));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_response() {
        let (generator, _) = generator(TemplateRegistry::builtin().unwrap(), Ok(Vec::new()));

        let err = generator.generate("x", SpecKind::Generic).await.unwrap_err();
        assert!(matches!(err, TestgenError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_backend_error_propagates_once() {
        let (generator, seen) = generator(TemplateRegistry::builtin().unwrap(), Err(529));

        let err = generator.generate("x", SpecKind::Generic).await.unwrap_err();
        match err {
            TestgenError::Backend(BackendError::Api { status, .. }) => assert_eq!(status, 529),
            other => panic!("unexpected error: {other}"),
        }
        // No retry.
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_render_prompt_uses_synthetic_template() {
        let registry = TemplateRegistry::builder()
            .register(SpecKind::Interface, "BUS<{{ spec }}>")
            .unwrap()
            .build();

        assert_eq!(
            render_prompt(&registry, "spi", SpecKind::Interface).unwrap(),
            "BUS<spi>"
        );
        assert!(matches!(
            render_prompt(&registry, "spi", SpecKind::Generic).unwrap_err(),
            TestgenError::UnknownTemplateKind { .. }
        ));
    }
}
