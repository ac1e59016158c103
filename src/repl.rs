//! Interactive chat session (plain-text presentation layer)
//!
//! Drives a [`Conversation`] from stdin while listening for async reply
//! resolutions on the service's broadcast channel.

use anyhow::Result;
use std::io::Write;
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;

use crate::conversation::Conversation;
use crate::models::Role;
use crate::service::ChatService;

pub async fn run(service: Arc<ChatService>) -> Result<()> {
    let mut resolutions = service.subscribe();
    let mut conversation = Conversation::new(Arc::clone(&service));

    conversation.initialize().await;

    println!(
        "Chatting with {} (/quit to exit, /retry to re-initialize)",
        conversation.chatbot_name()
    );
    if let Some(hint) = &conversation.state().settings.placeholder_text {
        println!("({})", hint);
    }
    render_from(&conversation, 0);
    render_error(&conversation);

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    "" => {}
                    "/quit" => break,
                    "/retry" => {
                        conversation.initialize().await;
                        render_from(&conversation, 0);
                        render_error(&conversation);
                    }
                    input => {
                        let before = conversation.state().messages.len();
                        conversation.send_chat_message(input).await;
                        // Skip echoing the user's own line.
                        render_from(&conversation, before + 1);
                        render_error(&conversation);
                    }
                }
            }
            resolution = resolutions.recv() => {
                if let Ok(message) = resolution {
                    let content = message.content.clone();
                    conversation.handle_resolution(message);
                    println!("\n{}: {}", conversation.chatbot_name(), content);
                }
            }
        }
    }

    Ok(())
}

fn render_from(conversation: &Conversation, start: usize) {
    for message in conversation.state().messages.iter().skip(start) {
        let speaker = match message.role {
            Role::User => "you",
            _ => conversation.chatbot_name(),
        };
        println!("{}: {}", speaker, message.content);
    }
}

fn render_error(conversation: &Conversation) {
    if let Some(error) = &conversation.state().error {
        println!("! {}", error);
    }
}
