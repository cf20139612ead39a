use crate::{
    backend::GenerativeBackend,
    data_uri::{is_supported_image_type, ImageDataUri},
    error::{GenerationError, Operation, OperationError, Result},
    logger,
    models::{
        normalize_feedback, GenerationRequest, GenerationResult, ImageGenerationRequest,
        InlineImage, ReferenceImageRequest, StructuredTextRequest, TextGenerationRequest,
    },
    prompts,
};
use futures::future::{try_join, try_join_all};
use serde_json::Value;
use std::sync::Arc;

/// Number of post and image variants every generation produces.
pub const VARIANT_COUNT: usize = 3;
pub const OUTPUT_MIME_TYPE: &str = "image/jpeg";
pub const ASPECT_RATIO: &str = "1:1";
const POST_ITEM_DESCRIPTION: &str = "A social media post.";

/// Produces post text and image variants for a [`GenerationRequest`].
///
/// Every call is independent: feedback only shapes the call it is passed
/// to and the request is never modified.
pub struct SocialPostGenerator<B: GenerativeBackend + ?Sized> {
    backend: Arc<B>,
}

impl<B: GenerativeBackend + ?Sized> Clone for SocialPostGenerator<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: GenerativeBackend + ?Sized> SocialPostGenerator<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn generate_posts(
        &self,
        request: &GenerationRequest,
        feedback: Option<&str>,
    ) -> std::result::Result<Vec<String>, OperationError> {
        let _timer = logger::timer("generate posts");
        self.posts(request, feedback)
            .await
            .map_err(|e| OperationError::wrap(Operation::Posts, e))
    }

    pub async fn generate_images(
        &self,
        request: &GenerationRequest,
        feedback: Option<&str>,
    ) -> std::result::Result<Vec<String>, OperationError> {
        let _timer = logger::timer("generate images");
        self.images(request, feedback)
            .await
            .map_err(|e| OperationError::wrap(Operation::Images, e))
    }

    /// Posts and images together, without feedback. Fails as a whole if
    /// either half fails.
    pub async fn generate_social_post(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<GenerationResult, OperationError> {
        let _timer = logger::timer("generate social post");
        let (posts, images) = try_join(
            self.generate_posts(request, None),
            self.generate_images(request, None),
        )
        .await
        .map_err(|e| {
            log::error!("Error in generate social post: {}", e);
            OperationError::new(Operation::SocialPost, e.kind)
        })?;

        Ok(GenerationResult { posts, images })
    }

    async fn posts(&self, request: &GenerationRequest, feedback: Option<&str>) -> Result<Vec<String>> {
        request.validate()?;
        let prompt = prompts::posts_prompt(
            &request.content,
            request.platform,
            request.tone,
            normalize_feedback(feedback),
        );

        let raw = self
            .backend
            .generate_structured(StructuredTextRequest {
                prompt,
                model_id: None,
                item_description: POST_ITEM_DESCRIPTION.to_string(),
            })
            .await?;

        parse_posts(&raw)
    }

    async fn images(&self, request: &GenerationRequest, feedback: Option<&str>) -> Result<Vec<String>> {
        request.validate()?;
        let feedback = normalize_feedback(feedback);

        match request.reference_image.as_deref() {
            Some(uri) => {
                let reference = ImageDataUri::parse(uri)?;
                self.images_from_reference(request, reference, feedback).await
            }
            None => self.images_from_prompt(request, feedback).await,
        }
    }

    async fn images_from_reference(
        &self,
        request: &GenerationRequest,
        reference: ImageDataUri,
        feedback: Option<&str>,
    ) -> Result<Vec<String>> {
        let single = ReferenceImageRequest {
            image: InlineImage::new(reference.mime_type, reference.data),
            instruction: prompts::reference_instruction(
                &request.content,
                request.image_style,
                feedback,
            ),
            model_id: None,
        };

        // Dropping the joined futures on the first error abandons the
        // requests still in flight.
        try_join_all((0..VARIANT_COUNT).map(|_| self.reference_variant(single.clone()))).await
    }

    async fn reference_variant(&self, request: ReferenceImageRequest) -> Result<String> {
        let image = self
            .backend
            .generate_from_reference(request)
            .await?
            .ok_or(GenerationError::EmptyImagePayload)?;
        to_data_uri(image)
    }

    async fn images_from_prompt(
        &self,
        request: &GenerationRequest,
        feedback: Option<&str>,
    ) -> Result<Vec<String>> {
        let image_prompt = self
            .backend
            .generate_text(TextGenerationRequest {
                prompt: prompts::image_prompt_request(
                    &request.content,
                    request.image_style,
                    feedback,
                ),
                model_id: None,
            })
            .await?;

        let image_prompt = image_prompt.trim();
        if image_prompt.is_empty() {
            return Err(GenerationError::PromptGenerationFailed);
        }
        log::debug!("Image prompt: {}", image_prompt);

        let images = self
            .backend
            .generate_images(ImageGenerationRequest {
                prompt: image_prompt.to_string(),
                model_id: None,
                num_images: VARIANT_COUNT as u32,
                output_mime_type: OUTPUT_MIME_TYPE.to_string(),
                aspect_ratio: ASPECT_RATIO.to_string(),
            })
            .await?;

        if images.len() < VARIANT_COUNT {
            return Err(GenerationError::InsufficientResults {
                expected: VARIANT_COUNT,
                actual: images.len(),
            });
        }

        images
            .into_iter()
            .take(VARIANT_COUNT)
            .map(|image| {
                if image.mime_type.trim().is_empty() {
                    to_data_uri(InlineImage {
                        mime_type: OUTPUT_MIME_TYPE.to_string(),
                        ..image
                    })
                } else {
                    to_data_uri(image)
                }
            })
            .collect()
    }
}

fn to_data_uri(image: InlineImage) -> Result<String> {
    let data = image.data.ok_or(GenerationError::EmptyImagePayload)?;
    let mime_type = image.mime_type.trim().to_ascii_lowercase();
    if !is_supported_image_type(&mime_type) {
        return Err(GenerationError::MalformedResponse(format!(
            "generated image has unsupported mime type '{}'",
            image.mime_type
        )));
    }
    Ok(ImageDataUri::new(mime_type, data).to_string())
}

/// Decodes the structured post response, checking its shape rather than
/// trusting the schema the backend was given.
pub fn parse_posts(raw: &str) -> Result<Vec<String>> {
    let value: Value = serde_json::from_str(strip_code_fence(raw)).map_err(|e| {
        GenerationError::MalformedResponse(format!("post variations are not JSON: {}", e))
    })?;

    let items = value
        .as_array()
        .ok_or_else(|| GenerationError::MalformedResponse("expected a JSON array".into()))?;
    if items.is_empty() {
        return Err(GenerationError::MalformedResponse(
            "no post variations returned".into(),
        ));
    }

    let mut posts = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_str()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .ok_or_else(|| {
                    GenerationError::MalformedResponse(format!(
                        "post variation {} is not a non-empty string",
                        i
                    ))
                })
        })
        .collect::<Result<Vec<_>>>()?;

    if posts.len() < VARIANT_COUNT {
        return Err(GenerationError::MalformedResponse(format!(
            "expected {} post variations, got {}",
            VARIANT_COUNT,
            posts.len()
        )));
    }
    posts.truncate(VARIANT_COUNT);
    Ok(posts)
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::{ImageStyle, Platform, Tone};
    use crate::testing::{jpeg, posts_json, ScriptedBackend};

    const PNG_REFERENCE: &str = "data:image/png;base64,iVBORw0KGgo=";

    fn generator(backend: ScriptedBackend) -> SocialPostGenerator<ScriptedBackend> {
        SocialPostGenerator::new(Arc::new(backend))
    }

    fn bottle_request() -> GenerationRequest {
        GenerationRequest::new("Launching our new eco-friendly water bottle")
            .with_platform(Platform::Instagram)
            .with_tone(Tone::Casual)
    }

    #[test]
    fn test_parse_posts_accepts_three_strings() {
        let posts = parse_posts(r#"["one #eco", " two ", "three"]"#).unwrap();
        assert_eq!(posts, vec!["one #eco", "two", "three"]);
    }

    #[test]
    fn test_parse_posts_truncates_extra_variants() {
        let posts = parse_posts(r#"["a","b","c","d"]"#).unwrap();
        assert_eq!(posts.len(), VARIANT_COUNT);
    }

    #[test]
    fn test_parse_posts_strips_code_fence() {
        let posts = parse_posts("```json\n[\"a\",\"b\",\"c\"]\n```").unwrap();
        assert_eq!(posts, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_posts_rejects_bad_shapes() {
        for raw in [
            "[]",
            "",
            "Here are your posts!",
            r#"{"posts":["a","b","c"]}"#,
            r#"["a","b"]"#,
            r#"["a",2,"c"]"#,
            r#"["a","","c"]"#,
        ] {
            let err = parse_posts(raw).unwrap_err();
            assert!(
                matches!(err, GenerationError::MalformedResponse(_)),
                "{:?} should be malformed",
                raw
            );
        }
    }

    #[tokio::test]
    async fn test_generate_posts_returns_three_variants() {
        let backend = ScriptedBackend::new().with_structured(Ok(posts_json(&[
            "New bottle just dropped 🌱 #EcoFriendly",
            "Hydration, but make it green 💧 #Sustainable",
            "Say bye to plastic! #ZeroWaste",
        ])));
        let generator = generator(backend);

        let posts = generator.generate_posts(&bottle_request(), None).await.unwrap();
        assert_eq!(posts.len(), 3);
        assert!(posts.iter().all(|p| p.contains('#')));

        let requests = generator.backend().structured_requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].prompt.contains("for Instagram in a Casual tone"));
        assert_eq!(requests[0].item_description, "A social media post.");
    }

    #[tokio::test]
    async fn test_generate_posts_empty_array_is_malformed() {
        let generator = generator(ScriptedBackend::new().with_structured(Ok("[]".into())));

        let err = generator.generate_posts(&bottle_request(), None).await.unwrap_err();
        assert_eq!(err.operation, Operation::Posts);
        assert_eq!(err.kind, ErrorKind::MalformedResponse);
        assert_eq!(
            err.message,
            "Failed to parse the generated post variations. The format was unexpected."
        );
    }

    #[tokio::test]
    async fn test_generate_posts_backend_failure() {
        let generator = generator(ScriptedBackend::new().with_structured(Err(
            GenerationError::BackendFailure("connection reset".into()),
        )));

        let err = generator.generate_posts(&bottle_request(), None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::BackendFailure);
        assert_eq!(err.message, "Failed to generate posts. Please try again.");
    }

    #[tokio::test]
    async fn test_blank_content_never_reaches_backend() {
        let generator = generator(ScriptedBackend::new());
        let request = GenerationRequest::new("   ");

        let err = generator.generate_posts(&request, None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidRequest);
        let err = generator.generate_images(&request, None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidRequest);
        assert_eq!(generator.backend().call_count(), 0);
    }

    #[tokio::test]
    async fn test_text_to_image_path() {
        let backend = ScriptedBackend::new()
            .with_text(Ok("  A frosted steel bottle on moss, soft morning light  ".into()))
            .with_images(Ok(vec![jpeg("AAAA"), jpeg("BBBB"), jpeg("CCCC")]));
        let generator = generator(backend);

        let images = generator.generate_images(&bottle_request(), None).await.unwrap();
        assert_eq!(
            images,
            vec![
                "data:image/jpeg;base64,AAAA",
                "data:image/jpeg;base64,BBBB",
                "data:image/jpeg;base64,CCCC",
            ]
        );

        let image_requests = generator.backend().image_requests();
        assert_eq!(image_requests.len(), 1);
        assert_eq!(
            image_requests[0].prompt,
            "A frosted steel bottle on moss, soft morning light"
        );
        assert_eq!(image_requests[0].num_images, 3);
        assert_eq!(image_requests[0].output_mime_type, "image/jpeg");
        assert_eq!(image_requests[0].aspect_ratio, "1:1");
        assert!(generator.backend().reference_requests().is_empty());
    }

    #[tokio::test]
    async fn test_text_to_image_feedback_reaches_prompt_request() {
        let backend = ScriptedBackend::new()
            .with_text(Ok("prompt".into()))
            .with_images(Ok(vec![jpeg("A"), jpeg("B"), jpeg("C")]));
        let generator = generator(backend);
        let request = bottle_request().with_image_style(ImageStyle::Minimalist);

        generator
            .generate_images(&request, Some("more greenery"))
            .await
            .unwrap();

        let text_requests = generator.backend().text_requests();
        assert!(text_requests[0].prompt.contains("Minimalist style"));
        assert!(text_requests[0].prompt.contains("\"more greenery\""));
    }

    #[tokio::test]
    async fn test_empty_image_prompt_fails() {
        let generator = generator(ScriptedBackend::new().with_text(Ok(" \n ".into())));

        let err = generator.generate_images(&bottle_request(), None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::PromptGenerationFailed);
        assert_eq!(err.message, "Failed to generate images. Please try again.");
        assert!(generator.backend().image_requests().is_empty());
    }

    #[tokio::test]
    async fn test_too_few_images_fails() {
        let backend = ScriptedBackend::new()
            .with_text(Ok("prompt".into()))
            .with_images(Ok(vec![jpeg("A"), jpeg("B")]));
        let generator = generator(backend);

        let err = generator.generate_images(&bottle_request(), None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InsufficientResults);
    }

    #[tokio::test]
    async fn test_image_without_bytes_fails() {
        let backend = ScriptedBackend::new()
            .with_text(Ok("prompt".into()))
            .with_images(Ok(vec![
                jpeg("A"),
                InlineImage {
                    mime_type: "image/jpeg".into(),
                    data: None,
                },
                jpeg("C"),
            ]));
        let generator = generator(backend);

        let err = generator.generate_images(&bottle_request(), None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::EmptyImagePayload);
    }

    #[tokio::test]
    async fn test_reference_path_sends_same_instruction_three_times() {
        let backend = ScriptedBackend::new()
            .with_reference(Ok(Some(InlineImage::new("image/png", "AAAA"))))
            .with_reference(Ok(Some(InlineImage::new("image/png", "BBBB"))))
            .with_reference(Ok(Some(InlineImage::new("image/png", "CCCC"))));
        let generator = generator(backend);
        let request = bottle_request()
            .with_image_style(ImageStyle::Vintage)
            .with_reference_image(PNG_REFERENCE);

        let images = generator
            .generate_images(&request, Some("warmer colors"))
            .await
            .unwrap();
        assert_eq!(images.len(), 3);
        assert!(images.iter().all(|uri| uri.starts_with("data:image/png;base64,")));

        let requests = generator.backend().reference_requests();
        assert_eq!(requests.len(), 3);
        for sent in &requests {
            assert_eq!(sent.instruction, requests[0].instruction);
            assert_eq!(sent.image, InlineImage::new("image/png", "iVBORw0KGgo="));
        }
        assert!(requests[0].instruction.contains("warmer colors"));
        assert!(requests[0].instruction.contains("Vintage style"));
        assert!(generator.backend().text_requests().is_empty());
    }

    #[tokio::test]
    async fn test_reference_path_fails_if_any_variant_fails() {
        let backend = ScriptedBackend::new()
            .with_reference(Ok(Some(InlineImage::new("image/png", "AAAA"))))
            .with_reference(Err(GenerationError::BackendFailure("HTTP 500".into())))
            .with_reference(Ok(Some(InlineImage::new("image/png", "CCCC"))));
        let generator = generator(backend);
        let request = bottle_request().with_reference_image(PNG_REFERENCE);

        let err = generator.generate_images(&request, None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::BackendFailure);
    }

    #[tokio::test]
    async fn test_reference_path_without_image_in_response() {
        let backend = ScriptedBackend::new()
            .with_reference(Ok(None))
            .with_reference(Ok(None))
            .with_reference(Ok(None));
        let generator = generator(backend);
        let request = bottle_request().with_reference_image(PNG_REFERENCE);

        let err = generator.generate_images(&request, None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::EmptyImagePayload);
    }

    #[tokio::test]
    async fn test_reference_variants_are_dispatched_together() {
        // Each call waits until all three have started; sequential dispatch
        // would never finish.
        let backend = ScriptedBackend::new()
            .with_reference_barrier(VARIANT_COUNT)
            .with_reference(Ok(Some(InlineImage::new("image/png", "AAAA"))))
            .with_reference(Ok(Some(InlineImage::new("image/png", "BBBB"))))
            .with_reference(Ok(Some(InlineImage::new("image/png", "CCCC"))));
        let generator = generator(backend);
        let request = bottle_request().with_reference_image(PNG_REFERENCE);

        let images = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            generator.generate_images(&request, None),
        )
        .await
        .expect("reference calls did not run concurrently")
        .unwrap();
        assert_eq!(images.len(), 3);
    }

    #[tokio::test]
    async fn test_reference_image_without_mime_type_is_rejected() {
        let backend = ScriptedBackend::new()
            .with_reference(Ok(Some(InlineImage::new("", "AAAA"))))
            .with_reference(Ok(Some(InlineImage::new("", "AAAA"))))
            .with_reference(Ok(Some(InlineImage::new("", "AAAA"))));
        let generator = generator(backend);
        let request = bottle_request().with_reference_image(PNG_REFERENCE);

        let err = generator.generate_images(&request, None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedResponse);
        assert_eq!(err.message, "Failed to generate images. Please try again.");
    }

    #[tokio::test]
    async fn test_non_image_mime_type_is_rejected() {
        let backend = ScriptedBackend::new()
            .with_text(Ok("prompt".into()))
            .with_images(Ok(vec![
                jpeg("A"),
                InlineImage::new("text/plain", "B"),
                jpeg("C"),
            ]));
        let generator = generator(backend);

        let err = generator.generate_images(&bottle_request(), None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedResponse);
    }

    #[tokio::test]
    async fn test_text_to_image_blank_mime_falls_back_to_jpeg() {
        let backend = ScriptedBackend::new()
            .with_text(Ok("prompt".into()))
            .with_images(Ok(vec![
                InlineImage::new("", "AAAA"),
                jpeg("BBBB"),
                InlineImage::new("  ", "CCCC"),
            ]));
        let generator = generator(backend);

        let images = generator.generate_images(&bottle_request(), None).await.unwrap();
        assert_eq!(
            images,
            vec![
                "data:image/jpeg;base64,AAAA",
                "data:image/jpeg;base64,BBBB",
                "data:image/jpeg;base64,CCCC",
            ]
        );
    }

    #[tokio::test]
    async fn test_malformed_reference_fails_without_network() {
        let generator = generator(ScriptedBackend::new());
        let request = bottle_request().with_reference_image("data:;base64,iVBORw0KGgo=");

        let err = generator.generate_images(&request, None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidReferenceImage);
        assert_eq!(generator.backend().call_count(), 0);
    }

    #[tokio::test]
    async fn test_generate_social_post_combines_halves() {
        let backend = ScriptedBackend::new()
            .with_structured(Ok(posts_json(&["a", "b", "c"])))
            .with_text(Ok("prompt".into()))
            .with_images(Ok(vec![jpeg("A"), jpeg("B"), jpeg("C")]));
        let generator = generator(backend);

        let result = generator.generate_social_post(&bottle_request()).await.unwrap();
        assert_eq!(result.posts, vec!["a", "b", "c"]);
        assert_eq!(result.images.len(), 3);

        // No feedback goes into either half.
        assert!(!generator.backend().structured_requests()[0]
            .prompt
            .contains("feedback"));
        assert!(!generator.backend().text_requests()[0].prompt.contains("feedback"));
    }

    #[tokio::test]
    async fn test_generate_social_post_hides_failing_half() {
        let backend = ScriptedBackend::new()
            .with_structured(Ok(posts_json(&["a", "b", "c"])))
            .with_text(Ok("".into()));
        let generator = generator(backend);

        let err = generator.generate_social_post(&bottle_request()).await.unwrap_err();
        assert_eq!(err.operation, Operation::SocialPost);
        assert_eq!(
            err.message,
            "Failed to generate social post. Please try again later."
        );
    }

    #[tokio::test]
    async fn test_works_behind_trait_object() {
        let backend: Arc<dyn GenerativeBackend> = Arc::new(
            ScriptedBackend::new().with_structured(Ok(posts_json(&["a", "b", "c"]))),
        );
        let generator = SocialPostGenerator::new(backend);

        let posts = generator.generate_posts(&bottle_request(), None).await.unwrap();
        assert_eq!(posts.len(), 3);
    }
}
