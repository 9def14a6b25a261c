use super::{
    GeneratedImage, ImageGenerationService, SpeechService, TextGenerationService, TextRequest,
    VideoGenerationService,
};
use crate::operation::{GenerationRequest, Operation, ResultPart};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Text mock that replays queued responses in order, cycling when exhausted.
#[derive(Clone)]
pub struct MockTextClient {
    responses: Arc<Mutex<Vec<Result<String>>>>,
    requests: Arc<Mutex<Vec<TextRequest>>>,
}

impl MockTextClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_response(self, response: String) -> Self {
        self.responses.lock().unwrap().push(Ok(response));
        self
    }

    pub fn with_error(self, message: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(Err(Error::AiProvider(message.to_string())));
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn get_requests(&self) -> Vec<TextRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockTextClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerationService for MockTextClient {
    async fn generate_text(&self, request: &TextRequest) -> Result<String> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Ok(format!("Mock reply to: {}", request.prompt));
        }
        match &responses[(requests.len() - 1) % responses.len()] {
            Ok(text) => Ok(text.clone()),
            Err(e) => Err(Error::AiProvider(e.to_string())),
        }
    }
}

#[derive(Clone)]
pub struct MockImageGenerationClient {
    image_responses: Arc<Mutex<Vec<Vec<u8>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockImageGenerationClient {
    pub fn new() -> Self {
        Self {
            image_responses: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_image_response(self, response: Vec<u8>) -> Self {
        self.image_responses.lock().unwrap().push(response);
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn get_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Default for MockImageGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerationService for MockImageGenerationClient {
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage> {
        let mut prompts = self.prompts.lock().unwrap();
        prompts.push(prompt.to_string());

        if *self.should_fail.lock().unwrap() {
            return Err(Error::AiProvider("Mock image failure".to_string()));
        }

        let responses = self.image_responses.lock().unwrap();
        let data = if responses.is_empty() {
            // PNG signature only
            vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]
        } else {
            responses[(prompts.len() - 1) % responses.len()].clone()
        };

        Ok(GeneratedImage {
            mime_type: super::mime::detect_image_mime(&data).to_string(),
            data,
        })
    }
}

enum Outcome {
    Parts(Vec<ResultPart>),
    Failure(String),
}

struct VideoScript {
    returns_operation: bool,
    done_on_submit: bool,
    /// `None` keeps the operation pending forever.
    pending_polls: Option<usize>,
    outcome: Outcome,
    check_error: Option<String>,
}

/// Scripted long-running video service.
///
/// `submit` hands out a pending operation; the first `pending_polls` status
/// checks report it still running and the next one reports the outcome.
#[derive(Clone)]
pub struct MockVideoClient {
    script: Arc<Mutex<VideoScript>>,
    submitted: Arc<Mutex<Vec<GenerationRequest>>>,
    check_count: Arc<Mutex<usize>>,
}

pub const MOCK_VIDEO_URL: &str = "https://mock-video.example.com/advertisement.mp4";
const MOCK_OPERATION_NAME: &str = "models/mock-veo/operations/mock-op";

impl MockVideoClient {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VideoScript {
                returns_operation: true,
                done_on_submit: false,
                pending_polls: Some(0),
                outcome: Outcome::Parts(vec![video_part(MOCK_VIDEO_URL)]),
                check_error: None,
            })),
            submitted: Arc::new(Mutex::new(Vec::new())),
            check_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_pending_polls(self, polls: usize) -> Self {
        self.script.lock().unwrap().pending_polls = Some(polls);
        self
    }

    pub fn never_completes(self) -> Self {
        self.script.lock().unwrap().pending_polls = None;
        self
    }

    pub fn with_video(self, url: &str) -> Self {
        self.with_parts(vec![video_part(url)])
    }

    pub fn with_parts(self, parts: Vec<ResultPart>) -> Self {
        self.script.lock().unwrap().outcome = Outcome::Parts(parts);
        self
    }

    pub fn with_failure(self, message: &str) -> Self {
        self.script.lock().unwrap().outcome = Outcome::Failure(message.to_string());
        self
    }

    pub fn with_check_error(self, message: &str) -> Self {
        self.script.lock().unwrap().check_error = Some(message.to_string());
        self
    }

    pub fn without_operation(self) -> Self {
        self.script.lock().unwrap().returns_operation = false;
        self
    }

    pub fn completed_on_submit(self) -> Self {
        self.script.lock().unwrap().done_on_submit = true;
        self
    }

    pub fn get_submit_count(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }

    pub fn get_submitted(&self) -> Vec<GenerationRequest> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn get_check_count(&self) -> usize {
        *self.check_count.lock().unwrap()
    }
}

impl Default for MockVideoClient {
    fn default() -> Self {
        Self::new()
    }
}

fn video_part(url: &str) -> ResultPart {
    ResultPart::Media {
        content_type: "video/mp4".to_string(),
        url: url.to_string(),
    }
}

fn finished(script: &VideoScript) -> Operation {
    match &script.outcome {
        Outcome::Parts(parts) => Operation::succeeded(MOCK_OPERATION_NAME, parts.clone()),
        Outcome::Failure(message) => {
            Operation::failed(MOCK_OPERATION_NAME, Some(13), message.clone())
        }
    }
}

#[async_trait]
impl VideoGenerationService for MockVideoClient {
    async fn submit(&self, request: &GenerationRequest) -> Result<Option<Operation>> {
        self.submitted.lock().unwrap().push(request.clone());

        let script = self.script.lock().unwrap();
        if !script.returns_operation {
            return Ok(None);
        }
        if script.done_on_submit {
            return Ok(Some(finished(&script)));
        }
        Ok(Some(Operation::pending(MOCK_OPERATION_NAME)))
    }

    async fn check_operation(&self, operation: &Operation) -> Result<Operation> {
        let mut count = self.check_count.lock().unwrap();
        *count += 1;

        let script = self.script.lock().unwrap();
        if let Some(message) = &script.check_error {
            return Err(Error::AiProvider(message.clone()));
        }

        match script.pending_polls {
            Some(pending) if *count > pending => Ok(finished(&script)),
            _ => Ok(Operation::pending(operation.name.clone())),
        }
    }
}

/// Speech mock returning queued PCM buffers, or a short silent clip.
#[derive(Clone)]
pub struct MockSpeechClient {
    pcm_responses: Arc<Mutex<VecDeque<Vec<u8>>>>,
    texts: Arc<Mutex<Vec<String>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockSpeechClient {
    pub fn new() -> Self {
        Self {
            pcm_responses: Arc::new(Mutex::new(VecDeque::new())),
            texts: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_pcm_response(self, pcm: Vec<u8>) -> Self {
        self.pcm_responses.lock().unwrap().push_back(pcm);
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

impl Default for MockSpeechClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechService for MockSpeechClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        self.texts.lock().unwrap().push(text.to_string());

        if *self.should_fail.lock().unwrap() {
            return Err(Error::AiProvider("Mock speech failure".to_string()));
        }

        Ok(self
            .pcm_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| vec![0; 480]))
    }
}
