use thiserror::Error;
use tracing::{debug, warn};

use banter_content::ContentPipeline;
use banter_store::{StoreError, Stores};
use banter_types::models::Message;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unknown author '{0}'")]
    UnknownAuthor(String),

    #[error("unknown conversation '{0}'")]
    UnknownConversation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Accept a new chat message.
///
/// Author and conversation are resolved before anything else, so an unknown
/// one leaves every store untouched. The raw body is cleaned, stored as a
/// message, and announced on the activity feed, in that order.
pub fn ingest_message(
    stores: &Stores,
    pipeline: &ContentPipeline,
    author_name: &str,
    conversation_title: &str,
    raw: &str,
) -> Result<Message, IngestError> {
    let author = stores
        .users
        .get_user(author_name)
        .ok_or_else(|| IngestError::UnknownAuthor(author_name.to_string()))?;
    let conversation = stores
        .conversations
        .get_conversation_with_title(conversation_title)
        .ok_or_else(|| IngestError::UnknownConversation(conversation_title.to_string()))?;

    let content = pipeline.clean(raw);
    let message = Message::new(conversation.id, author.id, content);

    stores.messages.add_message(message.clone())?;

    // The message is already durable at this point; a feed failure is
    // reported but does not take the message back.
    if let Err(e) = stores
        .activity
        .record_message_sent(&message, &author, &conversation)
    {
        warn!("Message {} stored but its activity was not: {}", message.id, e);
        return Err(e.into());
    }

    debug!(
        "Message {} from {} in {} ({} bytes)",
        message.id,
        author.name,
        conversation.title,
        message.content.len()
    );
    Ok(message)
}
