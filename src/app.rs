//! Terminal lifecycle and the event loop driving the conversation view.

use crate::controller::{CompletionService, TranscriptStore};
use crate::ui::conversation::{ConversationAction, ConversationManager};
use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use tokio::time::{Duration, interval};

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

fn init() -> Result<Tui> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(io::stdout());
    Ok(Terminal::new(backend)?)
}

fn restore() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

/// Run the conversation view until the user exits.
pub async fn run<C, S>(mut manager: ConversationManager<C, S>) -> Result<()>
where
    C: CompletionService + Clone + Send + Sync + 'static,
    S: TranscriptStore + Clone + Send + Sync + 'static,
{
    let mut terminal = init()?;
    let result = event_loop(&mut terminal, &mut manager).await;
    restore()?;
    result
}

async fn event_loop<C, S>(
    terminal: &mut Tui,
    manager: &mut ConversationManager<C, S>,
) -> Result<()>
where
    C: CompletionService + Clone + Send + Sync + 'static,
    S: TranscriptStore + Clone + Send + Sync + 'static,
{
    let mut events = EventStream::new();
    let mut ticker = interval(Duration::from_millis(150));

    loop {
        manager.poll_turn().await;
        terminal.draw(|frame| manager.render(frame))?;

        tokio::select! {
            _ = ticker.tick() => {
                manager.on_tick();
            }
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        let ctrl_c = key.code == KeyCode::Char('c')
                            && key.modifiers.contains(KeyModifiers::CONTROL);
                        if ctrl_c {
                            return Ok(());
                        }
                        if manager.handle_key(key).await == ConversationAction::Exit {
                            return Ok(());
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => return Err(err.into()),
                    None => return Ok(()),
                }
            }
        }
    }
}
