use crate::controller::{
    CompletionService, ConversationController, TranscriptStore, TurnStart,
};
use crate::model::Message;
use crate::ui::conversation::commands::{ParsedCommand, SlashCommand, get_help_text};
use crate::ui::conversation::composer::{ConversationComposer, ConversationResult};
use crate::ui::conversation::history::ConversationHistory;
use crate::ui::conversation::thinking::ThinkingIndicator;
use crate::ui::gradient::GradientText;
use crossterm::event::KeyEvent;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use tokio::sync::oneshot;
use tracing::warn;

/// Actions that can be requested by the conversation manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationAction {
    None,
    Exit,
}

/// Outcome of the detached turn task, applied back on the UI loop.
struct TurnTask {
    user_message: Message,
    user_persisted: bool,
    reply: anyhow::Result<String>,
}

/// Manages the conversation flow and UI components.
///
/// The completion request runs on a detached task so the view keeps
/// animating; its result is polled from the event loop and applied through
/// the controller's awaiting → idle transition.
pub struct ConversationManager<C, S> {
    controller: ConversationController<C, S>,
    completion: C,
    store: S,
    user_id: String,
    chat_id: String,
    composer: ConversationComposer,
    pending: Option<oneshot::Receiver<TurnTask>>,
    notice: Option<String>,
    tick: u64,
}

impl<C, S> ConversationManager<C, S>
where
    C: CompletionService + Clone + Send + Sync + 'static,
    S: TranscriptStore + Clone + Send + Sync + 'static,
{
    pub fn new(
        completion: C,
        store: S,
        user_id: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Self {
        let user_id = user_id.into();
        let chat_id = chat_id.into();

        Self {
            controller: ConversationController::new(
                completion.clone(),
                store.clone(),
                user_id.clone(),
                chat_id.clone(),
            ),
            completion,
            store,
            user_id,
            chat_id,
            composer: ConversationComposer::new("Ask me an interview question..."),
            pending: None,
            notice: None,
            tick: 0,
        }
    }

    /// Hydrate the transcript before the first draw.
    pub async fn load(&mut self) {
        self.controller.load_history().await;
    }

    /// Handle key input
    pub async fn handle_key(&mut self, key: KeyEvent) -> ConversationAction {
        match self.composer.handle_key(key) {
            ConversationResult::Submitted(input) => {
                self.notice = None;
                self.submit(input).await;
                ConversationAction::None
            }
            ConversationResult::Command(command) => self.handle_slash_command(command).await,
            ConversationResult::None => ConversationAction::None,
        }
    }

    /// Advance animations.
    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    /// Start a turn: guarded transition on the controller, then the user
    /// persistence write and the completion request on a detached task.
    async fn submit(&mut self, input: String) {
        let TurnStart::Started {
            prompt,
            user_message,
        } = self.controller.begin_turn(&input)
        else {
            return;
        };

        self.composer.set_enabled(false);

        let completion = self.completion.clone();
        let store = self.store.clone();
        let user_id = self.user_id.clone();
        let chat_id = self.chat_id.clone();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let user_persisted = match store
                .append_messages(&user_id, &chat_id, std::slice::from_ref(&user_message))
                .await
            {
                Ok(()) => true,
                Err(err) => {
                    warn!("failed to persist user message: {err:#}");
                    false
                }
            };

            let reply = completion.request_reply(&prompt).await;
            let _ = tx.send(TurnTask {
                user_message,
                user_persisted,
                reply,
            });
        });

        self.pending = Some(rx);
    }

    /// Apply a finished turn task, if any (called from the event loop).
    pub async fn poll_turn(&mut self) {
        let Some(rx) = self.pending.as_mut() else {
            return;
        };

        let task = match rx.try_recv() {
            Ok(task) => task,
            Err(oneshot::error::TryRecvError::Empty) => return,
            Err(oneshot::error::TryRecvError::Closed) => {
                self.pending = None;
                self.controller
                    .finish_turn(Err(anyhow::anyhow!("completion task dropped")))
                    .await;
                self.composer.set_enabled(true);
                return;
            }
        };

        self.pending = None;
        if !task.user_persisted {
            self.controller
                .note_unsynced(std::slice::from_ref(&task.user_message));
        }
        self.controller.finish_turn(task.reply).await;
        self.composer.set_enabled(true);
    }

    /// Handle slash commands
    async fn handle_slash_command(&mut self, command: ParsedCommand) -> ConversationAction {
        match command.command {
            SlashCommand::Retry => {
                let queued = self.controller.unsynced_count();
                let flushed = self.controller.retry_unsynced().await;
                self.notice = Some(if queued == 0 {
                    "Nothing to re-send.".to_string()
                } else if flushed == 0 {
                    "Re-send failed; messages still queued.".to_string()
                } else {
                    format!("Re-sent {flushed} message(s).")
                });
                ConversationAction::None
            }
            SlashCommand::Help => {
                self.notice = Some(get_help_text());
                ConversationAction::None
            }
            SlashCommand::Bye => ConversationAction::Exit,
        }
    }

    /// Render the conversation view
    pub fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title banner
                Constraint::Min(5),    // History
                Constraint::Length(1), // Status line
                Constraint::Length(3), // Composer
                Constraint::Length(1), // Disclaimer
            ])
            .split(frame.size());

        frame.render_widget(
            GradientText::new("Interview Practice").tick(self.tick),
            chunks[0],
        );
        frame.render_widget(
            ConversationHistory::new(self.controller.messages()),
            chunks[1],
        );

        if self.controller.is_busy() {
            frame.render_widget(ThinkingIndicator::new(self.tick), chunks[2]);
        } else if let Some(notice) = &self.notice {
            frame.render_widget(
                Paragraph::new(Line::from(vec![Span::styled(
                    notice.as_str(),
                    Style::default().fg(Color::Gray),
                )])),
                chunks[2],
            );
        } else if self.controller.unsynced_count() > 0 {
            frame.render_widget(
                Paragraph::new(Line::from(vec![Span::styled(
                    format!(
                        "{} message(s) not saved yet — /retry to re-send",
                        self.controller.unsynced_count()
                    ),
                    Style::default().fg(Color::Yellow),
                )])),
                chunks[2],
            );
        }

        frame.render_widget(&self.composer, chunks[3]);

        frame.render_widget(
            Paragraph::new(Line::from(vec![Span::styled(
                "AI-generated responses may need review.",
                Style::default().fg(Color::DarkGray),
            )]))
            .alignment(Alignment::Center),
            chunks[4],
        );
    }

    pub fn is_busy(&self) -> bool {
        self.controller.is_busy()
    }
}
