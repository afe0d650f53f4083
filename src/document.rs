//! Whole-document translation with footnote preservation.

use crate::client::TranslationClient;
use crate::error::TranslationError;
use crate::footnotes;

/// Re-applies the leading and trailing whitespace of `original` to `translated`.
///
/// Backends trim their output, which would otherwise drop a document's
/// final newline.
fn keep_outer_whitespace(original: &str, translated: &str) -> String {
    let body = original.trim();
    if body.is_empty() {
        return translated.to_string();
    }
    let start = original.len() - original.trim_start().len();
    let end = start + body.len();
    format!("{}{}{}", &original[..start], translated.trim(), &original[end..])
}

/// Translates documents while keeping footnotes byte-identical.
pub struct DocumentTranslator {
    client: TranslationClient,
}

impl DocumentTranslator {
    pub fn new(client: TranslationClient) -> Self {
        Self { client }
    }

    /// Translate one document into `target_language`.
    ///
    /// Footnote definitions are lifted out before the remote call and put
    /// back afterwards; only the remaining prose is sent. Client and
    /// footnote errors are returned unchanged. No remote call is made for
    /// blank documents or documents that consist only of footnotes.
    pub async fn translate_document(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let extraction = footnotes::extract(text);
        let translated = if extraction.body_is_empty() {
            extraction.text.clone()
        } else {
            let translated = self.client.translate(&extraction.text, target_language).await?;
            keep_outer_whitespace(&extraction.text, &translated)
        };

        Ok(footnotes::restore(&translated, &extraction.footnotes)?)
    }
}
