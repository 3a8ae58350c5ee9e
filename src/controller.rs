use crate::backend::ChatRecord;
use crate::model::{JobContext, Message, TurnPhase};
use crate::prompts;
use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, error, warn};

/// Single-shot text-generation endpoint invoked once per turn.
#[async_trait]
pub trait CompletionService {
    async fn request_reply(&self, prompt: &str) -> Result<String>;
}

/// External store of conversation transcripts keyed by user and chat id.
#[async_trait]
pub trait TranscriptStore {
    async fn fetch_chat(&self, user_id: &str, chat_id: &str) -> Result<ChatRecord>;

    async fn append_messages(
        &self,
        user_id: &str,
        chat_id: &str,
        messages: &[Message],
    ) -> Result<()>;
}

/// Result of asking the controller to start a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnStart {
    /// Input was empty or whitespace-only; nothing happened.
    Ignored,
    /// A completion request was already in flight.
    Rejected,
    /// The user message was appended and the prompt is ready to send.
    Started {
        prompt: String,
        user_message: Message,
    },
}

/// What happened to a completed turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Input was empty or whitespace-only; nothing happened.
    Ignored,
    /// A completion request was already in flight.
    Rejected,
    /// Bot reply appended.
    Replied,
    /// Completion failed; the fixed error bubble was appended instead.
    Failed,
}

/// Drives one interview-practice conversation end-to-end.
///
/// Owns the transcript, the "last question" cursor priming the next
/// completion request, and the idle/awaiting turn state. The user and chat
/// identifiers are passed explicitly at construction; there is no ambient
/// user context.
pub struct ConversationController<C, S> {
    completion: C,
    store: S,
    user_id: String,
    chat_id: String,
    job: JobContext,
    messages: Vec<Message>,
    unsynced: Vec<Message>,
    last_question: String,
    phase: TurnPhase,
}

impl<C: CompletionService, S: TranscriptStore> ConversationController<C, S> {
    pub fn new(
        completion: C,
        store: S,
        user_id: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Self {
        Self {
            completion,
            store,
            user_id: user_id.into(),
            chat_id: chat_id.into(),
            job: JobContext::default(),
            messages: Vec::new(),
            unsynced: Vec::new(),
            last_question: prompts::DEFAULT_FIRST_QUESTION.to_string(),
            phase: TurnPhase::Idle,
        }
    }

    /// Hydrate the transcript and job context from the backend.
    ///
    /// A fetch failure is logged and leaves state unchanged; the view opens
    /// with an empty transcript.
    pub async fn load_history(&mut self) {
        match self.store.fetch_chat(&self.user_id, &self.chat_id).await {
            Ok(record) => {
                self.messages = record.chat;
                self.job = JobContext {
                    job_role: record.job_role,
                    job_description: record.job_description,
                };
            }
            Err(err) => warn!("failed to fetch chat history: {err:#}"),
        }
    }

    /// Guarded idle → awaiting transition.
    ///
    /// Appends the user message optimistically and builds the prompt from
    /// the job context and the current "last question" cursor. Concurrent
    /// triggers are rejected here, not just at the input affordance.
    pub fn begin_turn(&mut self, user_text: &str) -> TurnStart {
        if user_text.trim().is_empty() {
            return TurnStart::Ignored;
        }
        if self.phase != TurnPhase::Idle {
            warn!("completion already in flight, rejecting turn");
            return TurnStart::Rejected;
        }

        let user_message = Message::user(user_text);
        self.messages.push(user_message.clone());

        let prompt = prompts::build_interview_prompt(
            &self.job.job_role,
            &self.job.job_description,
            &self.last_question,
            user_text,
        );

        self.phase = TurnPhase::AwaitingReply;
        TurnStart::Started {
            prompt,
            user_message,
        }
    }

    /// Awaiting → idle transition, applied whatever the completion result.
    ///
    /// On success the bot message is appended and persisted and the cursor
    /// advances to the reply's final non-empty line. On failure the fixed
    /// error bubble is appended and the cursor stays put.
    pub async fn finish_turn(&mut self, result: Result<String>) -> TurnOutcome {
        let outcome = match result {
            Ok(reply) => {
                let bot_message = Message::bot(reply.clone());
                self.messages.push(bot_message.clone());
                self.persist(std::slice::from_ref(&bot_message)).await;
                self.last_question = prompts::next_question_from_reply(&reply);
                TurnOutcome::Replied
            }
            Err(err) => {
                error!("completion request failed: {err:#}");
                self.messages.push(Message::bot(prompts::COMPLETION_ERROR_TEXT));
                TurnOutcome::Failed
            }
        };

        self.phase = TurnPhase::Idle;
        outcome
    }

    /// Run one full turn inline: append the user message, persist it,
    /// request feedback, append the bot reply, and persist that too.
    ///
    /// The phase returns to `Idle` on every path.
    pub async fn send_turn(&mut self, user_text: &str) -> TurnOutcome {
        let (prompt, user_message) = match self.begin_turn(user_text) {
            TurnStart::Ignored => return TurnOutcome::Ignored,
            TurnStart::Rejected => return TurnOutcome::Rejected,
            TurnStart::Started {
                prompt,
                user_message,
            } => (prompt, user_message),
        };

        self.persist(std::slice::from_ref(&user_message)).await;
        let result = self.completion.request_reply(&prompt).await;
        self.finish_turn(result).await
    }

    /// Queue messages whose persistence write failed elsewhere (for turns
    /// driven through `begin_turn` the user-side write happens off the
    /// controller).
    pub fn note_unsynced(&mut self, messages: &[Message]) {
        debug!("queued {} message(s) for retry", messages.len());
        self.unsynced.extend_from_slice(messages);
    }

    /// Re-send messages whose persistence write failed earlier.
    ///
    /// Returns how many messages were flushed; the queue is kept intact when
    /// the retry fails too.
    pub async fn retry_unsynced(&mut self) -> usize {
        if self.unsynced.is_empty() {
            return 0;
        }

        match self
            .store
            .append_messages(&self.user_id, &self.chat_id, &self.unsynced)
            .await
        {
            Ok(()) => {
                let flushed = self.unsynced.len();
                self.unsynced.clear();
                flushed
            }
            Err(err) => {
                warn!("retry of unsynced messages failed: {err:#}");
                0
            }
        }
    }

    async fn persist(&mut self, new_messages: &[Message]) {
        if let Err(err) = self
            .store
            .append_messages(&self.user_id, &self.chat_id, new_messages)
            .await
        {
            warn!(
                "failed to persist {} message(s): {err:#}",
                new_messages.len()
            );
            self.note_unsynced(new_messages);
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_busy(&self) -> bool {
        self.phase == TurnPhase::AwaitingReply
    }

    pub fn last_question(&self) -> &str {
        &self.last_question
    }

    pub fn job(&self) -> &JobContext {
        &self.job
    }

    pub fn unsynced_count(&self) -> usize {
        self.unsynced.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Sender;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedCompletion {
        reply: Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl FixedCompletion {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompletionService for FixedCompletion {
        async fn request_reply(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(reply) => Ok(reply.clone()),
                Err(message) => Err(anyhow::anyhow!("{message}")),
            }
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        record: ChatRecord,
        fetch_fails: bool,
        append_fails: bool,
        appended: Mutex<Vec<Message>>,
        append_calls: AtomicUsize,
    }

    #[async_trait]
    impl TranscriptStore for MemoryStore {
        async fn fetch_chat(&self, _user_id: &str, _chat_id: &str) -> Result<ChatRecord> {
            if self.fetch_fails {
                anyhow::bail!("backend unreachable");
            }
            Ok(self.record.clone())
        }

        async fn append_messages(
            &self,
            _user_id: &str,
            _chat_id: &str,
            messages: &[Message],
        ) -> Result<()> {
            self.append_calls.fetch_add(1, Ordering::SeqCst);
            if self.append_fails {
                anyhow::bail!("write rejected");
            }
            self.appended.lock().unwrap().extend_from_slice(messages);
            Ok(())
        }
    }

    fn controller(
        completion: FixedCompletion,
        store: MemoryStore,
    ) -> ConversationController<FixedCompletion, MemoryStore> {
        ConversationController::new(completion, store, "user-1", "chat-1")
    }

    #[tokio::test]
    async fn test_send_turn_appends_user_then_bot() {
        let reply = "Feedback: good.\nNext Question: Why Rust?";
        let mut ctrl = controller(FixedCompletion::replying(reply), MemoryStore::default());

        let outcome = ctrl.send_turn("I build APIs").await;

        assert_eq!(outcome, TurnOutcome::Replied);
        assert_eq!(ctrl.messages().len(), 2);
        assert_eq!(ctrl.messages()[0].sender, Sender::User);
        assert_eq!(ctrl.messages()[0].text, "I build APIs");
        assert_eq!(ctrl.messages()[1].sender, Sender::Bot);
        assert_eq!(ctrl.messages()[1].text, reply);
        assert!(!ctrl.is_busy());
    }

    #[tokio::test]
    async fn test_blank_input_is_a_noop() {
        let mut ctrl = controller(
            FixedCompletion::replying("unused"),
            MemoryStore::default(),
        );

        assert_eq!(ctrl.send_turn("").await, TurnOutcome::Ignored);
        assert_eq!(ctrl.send_turn("   \n\t").await, TurnOutcome::Ignored);

        assert!(ctrl.messages().is_empty());
        assert_eq!(ctrl.completion.call_count(), 0);
        assert_eq!(ctrl.store.append_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_concurrent_turn_is_rejected() {
        let mut ctrl = controller(
            FixedCompletion::replying("Next Question: Why?"),
            MemoryStore::default(),
        );

        assert!(matches!(
            ctrl.begin_turn("first answer"),
            TurnStart::Started { .. }
        ));
        // Still awaiting the first reply.
        assert_eq!(ctrl.begin_turn("second answer"), TurnStart::Rejected);
        assert_eq!(ctrl.send_turn("second answer").await, TurnOutcome::Rejected);
        assert_eq!(ctrl.messages().len(), 1);

        ctrl.finish_turn(Ok("Next Question: Go on?".to_string())).await;
        assert!(!ctrl.is_busy());
        assert!(matches!(
            ctrl.begin_turn("second answer"),
            TurnStart::Started { .. }
        ));
    }

    #[tokio::test]
    async fn test_last_question_primes_the_next_prompt() {
        let reply = "Feedback: fine.\n\nNext Question: What is borrowing?  \n";
        let mut ctrl = controller(FixedCompletion::replying(reply), MemoryStore::default());

        ctrl.send_turn("first answer").await;
        assert_eq!(ctrl.last_question(), "Next Question: What is borrowing?");

        ctrl.send_turn("second answer").await;
        let prompts = ctrl.completion.prompts.lock().unwrap();
        assert!(prompts[1].contains("Previous Question: Next Question: What is borrowing?"));
    }

    #[tokio::test]
    async fn test_completion_failure_appends_error_bubble() {
        let mut ctrl = controller(
            FixedCompletion::failing("timed out"),
            MemoryStore::default(),
        );

        let outcome = ctrl.send_turn("my answer").await;

        assert_eq!(outcome, TurnOutcome::Failed);
        assert_eq!(ctrl.messages().len(), 2);
        assert_eq!(ctrl.messages()[1].text, prompts::COMPLETION_ERROR_TEXT);
        assert_eq!(ctrl.messages()[1].sender, Sender::Bot);
        // Cursor untouched by the failed turn.
        assert_eq!(ctrl.last_question(), prompts::DEFAULT_FIRST_QUESTION);
        assert!(!ctrl.is_busy());
    }

    #[tokio::test]
    async fn test_load_history_hydrates_transcript_and_job() {
        let store = MemoryStore {
            record: ChatRecord {
                chat: vec![
                    Message::user("hello"),
                    Message::bot("Feedback: hi.\nNext Question: Go on?"),
                    Message::user("sure"),
                ],
                job_role: "Backend Engineer".to_string(),
                job_description: "REST APIs".to_string(),
            },
            ..MemoryStore::default()
        };
        let mut ctrl = controller(FixedCompletion::replying("unused"), store);

        ctrl.load_history().await;

        assert_eq!(ctrl.messages().len(), 3);
        assert_eq!(ctrl.messages()[0].text, "hello");
        assert_eq!(ctrl.job().job_role, "Backend Engineer");
        assert_eq!(ctrl.job().job_description, "REST APIs");
    }

    #[tokio::test]
    async fn test_load_history_failure_leaves_state_unchanged() {
        let store = MemoryStore {
            fetch_fails: true,
            ..MemoryStore::default()
        };
        let mut ctrl = controller(FixedCompletion::replying("unused"), store);

        ctrl.load_history().await;

        assert!(ctrl.messages().is_empty());
        assert_eq!(ctrl.job(), &JobContext::default());
    }

    #[tokio::test]
    async fn test_failed_writes_queue_and_retry_flushes() {
        let store = MemoryStore {
            append_fails: true,
            ..MemoryStore::default()
        };
        let mut ctrl = controller(FixedCompletion::replying("Next Question: Why?"), store);

        ctrl.send_turn("my answer").await;
        // Both the user turn and the bot turn failed to persist.
        assert_eq!(ctrl.unsynced_count(), 2);

        ctrl.store.append_fails = false;
        let flushed = ctrl.retry_unsynced().await;
        assert_eq!(flushed, 2);
        assert_eq!(ctrl.unsynced_count(), 0);
        assert_eq!(ctrl.store.appended.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_retry_with_empty_queue_does_nothing() {
        let mut ctrl = controller(
            FixedCompletion::replying("unused"),
            MemoryStore::default(),
        );

        assert_eq!(ctrl.retry_unsynced().await, 0);
        assert_eq!(ctrl.store.append_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_prompt_embeds_job_context_verbatim() {
        let store = MemoryStore {
            record: ChatRecord {
                chat: Vec::new(),
                job_role: "Backend Engineer".to_string(),
                job_description: "REST APIs".to_string(),
            },
            ..MemoryStore::default()
        };
        let mut ctrl = controller(FixedCompletion::replying("Next Question: Why?"), store);
        ctrl.load_history().await;

        ctrl.send_turn("I build APIs").await;

        let prompts = ctrl.completion.prompts.lock().unwrap();
        assert!(prompts[0].contains("Job Role: Backend Engineer"));
        assert!(prompts[0].contains("Job Description: REST APIs"));
        assert!(prompts[0].contains("Previous Question: Tell me about yourself"));
        assert!(prompts[0].contains("Candidate's Answer: I build APIs"));
    }
}
