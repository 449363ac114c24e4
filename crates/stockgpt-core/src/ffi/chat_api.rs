use super::*;

use crate::assistant::ChatStatus;

#[uniffi::export]
impl StockGptCore {
    /// Stored conversations, most recent first
    pub fn list_threads(&self) -> Result<Vec<FfiThread>, StockGptError> {
        let conversation = self.conversation()?;
        Ok(conversation.threads().into_iter().map(FfiThread::from).collect())
    }

    pub fn active_thread_id(&self) -> Option<String> {
        self.session.lock().active_thread_id.clone()
    }

    /// Start an empty conversation and make it active. Returns its id.
    pub fn new_conversation(&self) -> Result<String, StockGptError> {
        let conversation = self.conversation()?;
        let _guard = self.chat_lock.try_lock().ok_or(StockGptError::Busy)?;

        let mut session = self.session.lock().clone();
        let thread_id = get_tokio_runtime().block_on(conversation.new_conversation(&mut session))?;
        *self.session.lock() = session;
        Ok(thread_id)
    }

    /// Open a stored conversation and load its history.
    pub fn select_thread(&self, thread_id: String) -> Result<(), StockGptError> {
        let conversation = self.conversation()?;
        let _guard = self.chat_lock.try_lock().ok_or(StockGptError::Busy)?;

        let mut session = self.session.lock().clone();
        get_tokio_runtime().block_on(conversation.select_thread(&mut session, &thread_id))?;
        *self.session.lock() = session;
        Ok(())
    }

    pub fn delete_thread(&self, thread_id: String) -> Result<(), StockGptError> {
        let conversation = self.conversation()?;
        let _guard = self.chat_lock.try_lock().ok_or(StockGptError::Busy)?;

        let mut session = self.session.lock().clone();
        let result = get_tokio_runtime().block_on(conversation.delete_thread(&mut session, &thread_id));
        *self.session.lock() = session;
        result.map_err(StockGptError::from)
    }

    /// Send a message on the active conversation and block until the reply.
    ///
    /// Returns `None` for blank text or when a send is already in flight.
    /// While waiting, `messages()` already includes the user's message and
    /// `is_awaiting_reply()` is true. On failure the error is returned and
    /// the session shows an error message in place of the reply.
    pub fn send_message(&self, text: String) -> Result<Option<FfiMessage>, StockGptError> {
        let conversation = self.conversation()?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        let Some(_guard) = self.chat_lock.try_lock() else {
            return Ok(None);
        };

        let cancel = CancellationToken::new();
        *self.pending.lock() = Some(cancel.clone());

        let mut working = {
            let mut shared = self.session.lock();
            let working = shared.clone();
            shared.messages.push(Message::user(text.trim()));
            shared.status = ChatStatus::AwaitingReply;
            working
        };

        let result = get_tokio_runtime().block_on(conversation.send_message(&mut working, &text, &cancel));

        *self.pending.lock() = None;
        *self.session.lock() = working;

        let reply = result?;
        Ok(reply.map(|r| FfiMessage::from(r.message)))
    }

    /// Abort the in-flight send, if any. Returns whether there was one.
    pub fn cancel_pending(&self) -> bool {
        match self.pending.lock().as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Messages of the active conversation, oldest first
    pub fn messages(&self) -> Vec<FfiMessage> {
        self.session
            .lock()
            .messages
            .iter()
            .cloned()
            .map(FfiMessage::from)
            .collect()
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.session.lock().is_awaiting_reply()
    }
}
