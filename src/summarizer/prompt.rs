//! Summarization instructions

use crate::generation::ChatMessage;
use serde::{Deserialize, Serialize};

/// Language the summarization instruction is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptLanguage {
    #[default]
    English,
    French,
}

/// Build the system and user messages asking for a rewrite of `text` in
/// roughly `target_tokens` tokens.
pub fn build_messages(
    text: &str,
    target_tokens: usize,
    remove_percent: f64,
    language: PromptLanguage,
) -> Vec<ChatMessage> {
    let percent = remove_percent.round() as i64;

    match language {
        PromptLanguage::English => vec![
            ChatMessage::system(
                "You are a summarizer. Rewrite the input text as a concise summary that keeps \
                 every essential fact, in a neutral and informative tone. Reply with the summary only.",
            ),
            ChatMessage::user(format!(
                "Summarize the following text to approximately {} tokens \
                 (about {}% shorter than the original):\n\n{}",
                target_tokens, percent, text
            )),
        ],
        PromptLanguage::French => vec![
            ChatMessage::system(
                "Tu es un assistant journaliste. Tu résumes des textes en français de manière \
                 informative et neutre, en conservant l'essentiel. Réponds uniquement par le résumé.",
            ),
            ChatMessage::user(format!(
                "Résume le texte suivant en environ {} tokens, \
                 soit une réduction d'environ {}% :\n\nTexte:\n{}",
                target_tokens, percent, text
            )),
        ],
    }
}
