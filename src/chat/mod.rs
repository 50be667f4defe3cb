// Chat module
// Session history, completion client, and the retrieval-augmented answer flow


pub mod completion;
pub mod session;

use tracing::warn;

use crate::Result;
use crate::context::ContextAssembler;

pub use completion::CompletionClient;
pub use session::{ChatMessage, ChatSession, Role};

/// Render the instruction prompt for one question
#[inline]
pub fn render_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a game strategy informant.\n\
         Answer the question based on the context below.\n\
         If the context does not contain the information, answer \"I don't know\".\n\
         Context:\n{context}\n\n---\nQuestion: {question}\nAnswer:"
    )
}

/// Successful outcome of one answered question
#[derive(Debug, Clone)]
pub struct Answer {
    /// The model's reply text
    pub text: String,
    /// The retrieval context the reply was grounded on
    pub context: String,
}

/// Runs the full question pipeline: assemble context, prompt the model,
/// and keep the session history consistent
pub struct AnswerGenerator {
    assembler: ContextAssembler,
    completion: CompletionClient,
}

impl AnswerGenerator {
    #[inline]
    pub fn new(assembler: ContextAssembler, completion: CompletionClient) -> Self {
        Self {
            assembler,
            completion,
        }
    }

    /// Answer a question in the context of an ongoing session.
    ///
    /// On success the session gains a `user` and an `assistant` message.
    /// On failure the session is left exactly as it was.
    #[inline]
    pub async fn answer(&self, session: &mut ChatSession, question: &str) -> Result<Answer> {
        let context = self.assembler.build_context(question).await?;
        if context.is_empty() {
            warn!("No context passages fit the word budget for this question");
        }

        let prompt = render_prompt(&context, question);
        session.push_user(prompt);

        match self.completion.complete(session.messages()) {
            Ok(text) => {
                session.push_assistant(text.clone());
                Ok(Answer { text, context })
            }
            Err(e) => {
                // A failed turn must not leave a dangling user prompt
                session.pop_last();
                Err(e)
            }
        }
    }
}
