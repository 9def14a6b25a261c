pub mod client;
pub mod image;
pub mod speech;
pub mod text;
pub mod types;
pub mod video;

pub use image::GeminiImageClient;
pub use speech::GeminiSpeechClient;
pub use text::GeminiTextClient;
pub use video::GeminiVideoClient;

/// Adds a test-only `with_base_url` to a client wrapping `http: GeminiHttpClient`.
#[cfg(test)]
macro_rules! impl_with_gemini_base_url {
    ($client:ty) => {
        impl $client {
            fn with_base_url(mut self, base_url: String) -> Self {
                self.http = self.http.with_base_url(base_url);
                self
            }
        }
    };
}

#[cfg(test)]
pub(crate) use impl_with_gemini_base_url;

#[cfg(test)]
pub(crate) mod test_support {
    use wiremock::matchers::{method, path_regex};
    use wiremock::MockBuilder;

    pub const GENERATE_CONTENT_PATH_REGEX: &str = r"^/v1beta/models/[^/]+:generateContent$";
    pub const PREDICT_PATH_REGEX: &str = r"^/v1beta/models/[^/]+:predict$";
    pub const PREDICT_LONG_RUNNING_PATH_REGEX: &str =
        r"^/v1beta/models/[^/]+:predictLongRunning$";

    pub fn post_path_regex(regex: &str) -> MockBuilder {
        wiremock::Mock::given(method("POST")).and(path_regex(regex))
    }
}
