//! Translation client with bounded retry and backoff.
//!
//! Wraps a [`CompletionBackend`] and drives an explicit retry loop:
//! transient failures back off exponentially from the base delay,
//! rate-limit responses wait a fixed interval, anything else fails
//! immediately.

use crate::config::Config;
use crate::console::Console;
use crate::error::{RemoteError, TranslationError};
use crate::gemini::GeminiBackend;
use async_trait::async_trait;
use std::time::Duration;

/// Retry settings, fixed for the lifetime of a client.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    /// First backoff delay for transient failures; doubles per retry.
    pub base_delay: Duration,
    /// Fixed wait after a rate-limit response.
    pub rate_limit_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            rate_limit_wait: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Backoff before the retry that follows `transient_retries` earlier transient retries.
    pub fn backoff(&self, transient_retries: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(transient_retries))
    }
}

/// A remote text-generation capability.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Sends one prompt and returns the generated text.
    async fn complete(&self, prompt: &str) -> Result<String, RemoteError>;
}

/// Waits between retry attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Translates text through a remote backend, retrying per [`RetryPolicy`].
pub struct TranslationClient {
    /// Remote capability.
    backend: Box<dyn CompletionBackend>,
    /// Waits between attempts.
    sleeper: Box<dyn Sleeper>,
    /// Retry settings.
    policy: RetryPolicy,
    /// Prompt template; `{language}` is replaced by the target language.
    prompt_template: String,
    /// Console for retry warnings.
    console: Console,
}

impl TranslationClient {
    /// Creates a client talking to Gemini with the given API key.
    pub fn new(api_key: &str, config: &Config) -> Result<Self, TranslationError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(TranslationError::MissingCredential);
        }

        let policy = config
            .retry_policy()
            .map_err(|e| TranslationError::InvalidConfig(e.to_string()))?;
        let backend = GeminiBackend::new(api_key, &config.api)?;
        Ok(Self::with_backend(
            Box::new(backend),
            policy,
            config.prompts.translation.clone(),
        ))
    }

    /// Creates a client over an arbitrary backend, sleeping with tokio.
    pub fn with_backend(
        backend: Box<dyn CompletionBackend>,
        policy: RetryPolicy,
        prompt_template: String,
    ) -> Self {
        Self {
            backend,
            sleeper: Box::new(TokioSleeper),
            policy,
            prompt_template,
            console: Console::new(),
        }
    }

    /// Replaces the sleeper used between attempts.
    pub fn with_sleeper(mut self, sleeper: Box<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Returns the retry policy in effect.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Builds the full prompt for one request.
    pub fn build_prompt(&self, text: &str, target_language: &str) -> String {
        format!(
            "{}\n\n{}",
            self.prompt_template.replace("{language}", target_language),
            text
        )
    }

    /// Translate text into `target_language`.
    ///
    /// Makes at most `max_retries + 1` remote calls. Returns as soon as one
    /// succeeds. Whitespace-only input is returned as is without a call.
    pub async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let prompt = self.build_prompt(text, target_language);
        let max_attempts = self.policy.max_retries.saturating_add(1);
        let mut attempt: u32 = 0;
        let mut transient_retries: u32 = 0;

        loop {
            attempt += 1;
            let failure = match self.backend.complete(&prompt).await {
                Ok(translated) => return Ok(translated),
                Err(RemoteError::Fatal(message)) => {
                    return Err(TranslationError::Remote(message));
                }
                Err(failure) => failure,
            };

            if attempt >= max_attempts {
                self.console.error(&format!(
                    "Giving up after {} attempts: {}",
                    attempt, failure
                ));
                return Err(match failure {
                    RemoteError::RateLimited(last_error) => TranslationError::RateLimitExceeded {
                        attempts: attempt,
                        last_error,
                    },
                    RemoteError::Transient(last_error) | RemoteError::Fatal(last_error) => {
                        TranslationError::Unavailable {
                            attempts: attempt,
                            last_error,
                        }
                    }
                });
            }

            let delay = match failure {
                RemoteError::RateLimited(_) => {
                    self.console.warning(&format!(
                        "Rate limit reached, waiting {:?} before retry (attempt {}/{})",
                        self.policy.rate_limit_wait,
                        attempt + 1,
                        max_attempts
                    ));
                    self.policy.rate_limit_wait
                }
                _ => {
                    let delay = self.policy.backoff(transient_retries);
                    transient_retries += 1;
                    self.console.warning(&format!(
                        "Translation failed ({}), retrying in {:?} (attempt {}/{})",
                        failure,
                        delay,
                        attempt + 1,
                        max_attempts
                    ));
                    delay
                }
            };

            self.sleeper.sleep(delay).await;
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{ScriptedBackend, client};
    use super::*;

    fn transient() -> Result<String, RemoteError> {
        Err(RemoteError::Transient("connection reset".to_string()))
    }

    fn rate_limited() -> Result<String, RemoteError> {
        Err(RemoteError::RateLimited("HTTP 429".to_string()))
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let backend = ScriptedBackend::from_fn(|_| Ok("こんにちは".to_string()));
        let calls = backend.calls();
        let (client, waits) = client(backend, 3);

        let result = client.translate("Hello", "Japanese").await.unwrap();

        assert_eq!(result, "こんにちは");
        assert_eq!(calls.lock().unwrap().len(), 1);
        assert!(waits.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_prompt_names_language_and_carries_text() {
        let backend = ScriptedBackend::from_fn(|_| Ok("ok".to_string()));
        let calls = backend.calls();
        let (client, _) = client(backend, 0);

        client.translate("Hello world", "German").await.unwrap();

        let prompt = calls.lock().unwrap()[0].clone();
        assert_eq!(prompt, "Translate to German.\n\nHello world");
    }

    #[tokio::test]
    async fn test_transient_retries_exhausted_after_k_plus_one_attempts() {
        let backend = ScriptedBackend::from_fn(|_| transient());
        let calls = backend.calls();
        let (client, waits) = client(backend, 3);

        let err = client.translate("Hello", "Japanese").await.unwrap_err();

        assert!(matches!(err, TranslationError::Unavailable { attempts: 4, .. }));
        assert_eq!(calls.lock().unwrap().len(), 4);
        assert_eq!(
            *waits.lock().unwrap(),
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4)
            ]
        );
    }

    #[tokio::test]
    async fn test_zero_retries_means_single_attempt() {
        let backend = ScriptedBackend::from_fn(|_| transient());
        let calls = backend.calls();
        let (client, waits) = client(backend, 0);

        assert!(client.translate("Hello", "Japanese").await.is_err());
        assert_eq!(calls.lock().unwrap().len(), 1);
        assert!(waits.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failures() {
        let backend =
            ScriptedBackend::scripted(vec![transient(), transient()], Ok("Success".to_string()));
        let calls = backend.calls();
        let (client, _) = client(backend, 3);

        let result = client.translate("Hello", "Japanese").await.unwrap();

        assert_eq!(result, "Success");
        assert_eq!(calls.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_rate_limit_waits_fixed_interval() {
        let backend = ScriptedBackend::scripted(
            vec![rate_limited(), rate_limited()],
            Ok("Success".to_string()),
        );
        let (client, waits) = client(backend, 3);

        client.translate("Hello", "Japanese").await.unwrap();

        assert_eq!(
            *waits.lock().unwrap(),
            vec![Duration::from_secs(60), Duration::from_secs(60)]
        );
    }

    #[tokio::test]
    async fn test_rate_limit_exhausted() {
        let backend = ScriptedBackend::from_fn(|_| rate_limited());
        let calls = backend.calls();
        let (client, _) = client(backend, 2);

        let err = client.translate("Hello", "Japanese").await.unwrap_err();

        assert!(matches!(
            err,
            TranslationError::RateLimitExceeded { attempts: 3, .. }
        ));
        assert_eq!(calls.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_fatal_error_is_not_retried() {
        let backend = ScriptedBackend::from_fn(|_| Err(RemoteError::Fatal("HTTP 400".into())));
        let calls = backend.calls();
        let (client, waits) = client(backend, 3);

        let err = client.translate("Hello", "Japanese").await.unwrap_err();

        assert!(matches!(err, TranslationError::Remote(ref m) if m == "HTTP 400"));
        assert_eq!(calls.lock().unwrap().len(), 1);
        assert!(waits.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rate_limit_does_not_advance_backoff() {
        let backend = ScriptedBackend::scripted(
            vec![transient(), rate_limited(), transient()],
            Ok("done".to_string()),
        );
        let (client, waits) = client(backend, 3);

        client.translate("Hello", "Japanese").await.unwrap();

        assert_eq!(
            *waits.lock().unwrap(),
            vec![
                Duration::from_secs(1),
                Duration::from_secs(60),
                Duration::from_secs(2)
            ]
        );
    }

    #[tokio::test]
    async fn test_whitespace_input_skips_backend() {
        let backend = ScriptedBackend::from_fn(|_| Ok("unused".to_string()));
        let calls = backend.calls();
        let (client, _) = client(backend, 3);

        assert_eq!(client.translate("", "Japanese").await.unwrap(), "");
        assert_eq!(client.translate("  \n", "Japanese").await.unwrap(), "  \n");
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_missing_credential() {
        let config = Config::default();
        assert!(matches!(
            TranslationClient::new("   ", &config),
            Err(TranslationError::MissingCredential)
        ));
    }

    #[test]
    fn test_oversized_delay_is_a_config_error() {
        let mut config = Config::default();
        config.translation.retry_delay_sec = 1e30;
        assert!(matches!(
            TranslationClient::new("secret", &config),
            Err(TranslationError::InvalidConfig(ref m)) if m.contains("retry_delay_sec")
        ));

        let mut config = Config::default();
        config.api.request_timeout_sec = 1e30;
        assert!(matches!(
            TranslationClient::new("secret", &config),
            Err(TranslationError::InvalidConfig(ref m)) if m.contains("request_timeout_sec")
        ));
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy {
            base_delay: Duration::from_millis(500),
            ..RetryPolicy::default()
        };
        assert_eq!(policy.backoff(0), Duration::from_millis(500));
        assert_eq!(policy.backoff(1), Duration::from_secs(1));
        assert_eq!(policy.backoff(3), Duration::from_secs(4));
    }
}
