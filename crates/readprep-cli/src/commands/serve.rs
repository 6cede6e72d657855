//! Serve command - Telegram bot that answers reading PDFs with practice pages.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use console::style;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use readprep_core::error::GenerationError;
use readprep_core::{HtmlArtifact, PracticeConverter, ReadprepError};

use super::load_config;
use crate::telegram::{BotClient, Message, MAX_DOWNLOAD_BYTES};

pub const NO_TEXT_REPLY: &str = "❗ PDFdan matn topilmadi.";
pub const MALFORMED_HTML_REPLY: &str = "❌ HTML tarkibda xatolik bor. Gemini noto‘g‘ri javob berdi.";
pub const SUCCESS_CAPTION: &str = "✅ HTML fayl tayyor! Agar sizga bu html sahifa yo'qmasa pdf fayilingizni qayta yuboring, chunki html sahifa AI tomonidan qilinadi";
pub const ERROR_REPLY_PREFIX: &str = "❌ Xatolik yuz berdi: ";
pub const USAGE_REPLY: &str = "📄 Iltimos, IELTS reading PDF faylini yuboring.";

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Bot token (overrides BOT_TOKEN and the config file)
    #[arg(long)]
    token: Option<String>,

    /// Documents converted at the same time
    #[arg(short = 'j', long)]
    jobs: Option<usize>,
}

/// The reply sent when converting a document failed.
pub fn error_reply(err: &ReadprepError) -> String {
    match err {
        ReadprepError::NoText => NO_TEXT_REPLY.to_string(),
        ReadprepError::Generation(GenerationError::MalformedHtml) => MALFORMED_HTML_REPLY.to_string(),
        other => format!("{}{}", ERROR_REPLY_PREFIX, other),
    }
}

pub async fn run(args: ServeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let token = args
        .token
        .or_else(|| config.bot.token.clone())
        .ok_or_else(|| anyhow::anyhow!("Bot token is missing. Set BOT_TOKEN or bot.token."))?;

    let converter = PracticeConverter::from_config(&config)?;
    let bot = BotClient::new(&config.bot.api_base, &token)?;
    let jobs = args.jobs.unwrap_or(config.bot.max_concurrent_jobs).max(1);
    let permits = Arc::new(Semaphore::new(jobs));

    println!(
        "{} Bot is running ({} concurrent jobs). Press Ctrl+C to stop.",
        style("✓").green(),
        jobs
    );

    let mut offset = 0;
    loop {
        let updates = tokio::select! {
            result = bot.get_updates(offset, config.bot.poll_timeout_secs) => result,
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                return Ok(());
            }
        };

        let updates = match updates {
            Ok(updates) => updates,
            Err(e) => {
                warn!("Polling failed: {:#}", e);
                tokio::time::sleep(Duration::from_secs(3)).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            let Some(message) = update.message else {
                continue;
            };

            let bot = bot.clone();
            let converter = converter.clone();
            let permits = permits.clone();
            tokio::spawn(async move {
                if let Err(e) = handle_message(&bot, &converter, &permits, message).await {
                    error!("Failed to answer message: {:#}", e);
                }
            });
        }
    }
}

async fn handle_message(
    bot: &BotClient,
    converter: &PracticeConverter,
    permits: &Semaphore,
    message: Message,
) -> anyhow::Result<()> {
    let chat_id = message.chat.id;
    let Some(document) = message.document.filter(|d| d.is_pdf()) else {
        debug!("Message {} is not a PDF, sending usage hint", message.message_id);
        return bot.send_message(chat_id, USAGE_REPLY).await;
    };

    info!(
        "Received {} from chat {}",
        document.file_name.as_deref().unwrap_or("document"),
        chat_id
    );

    if document.file_size.is_some_and(|size| size > MAX_DOWNLOAD_BYTES) {
        let reply = format!("{}file exceeds {} bytes", ERROR_REPLY_PREFIX, MAX_DOWNLOAD_BYTES);
        return bot.send_message(chat_id, &reply).await;
    }

    let _permit = permits.acquire().await?;

    let data = match bot.download(&document.file_id).await {
        Ok(data) => data,
        Err(e) => {
            warn!("Download failed: {:#}", e);
            return bot
                .send_message(chat_id, &format!("{}{}", ERROR_REPLY_PREFIX, e))
                .await;
        }
    };

    match converter.convert(data).await {
        Ok(artifact) => send_artifact(bot, chat_id, artifact).await,
        Err(e) => {
            warn!("Conversion failed for chat {}: {}", chat_id, e);
            bot.send_message(chat_id, &error_reply(&e)).await
        }
    }
}

async fn send_artifact(bot: &BotClient, chat_id: i64, artifact: HtmlArtifact) -> anyhow::Result<()> {
    let HtmlArtifact { html, file_name } = artifact;
    bot.send_document(chat_id, &file_name, html.into_bytes(), SUCCESS_CAPTION)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telegram::{Chat, Document};
    use async_trait::async_trait;
    use lopdf::{dictionary, Object, Stream};
    use pretty_assertions::assert_eq;
    use readprep_core::{Generator, ReadprepConfig};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug)]
    struct CannedPage;

    #[async_trait]
    impl Generator for CannedPage {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            Ok("<html><body>practice</body></html>".to_string())
        }
    }

    fn converter() -> PracticeConverter {
        let mut config = ReadprepConfig::default();
        config.ocr.enabled = false;
        PracticeConverter::new(&config, Arc::new(CannedPage)).unwrap()
    }

    fn pdf(lines: &[&str]) -> Vec<u8> {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });

        let mut content = String::new();
        for (i, line) in lines.iter().enumerate() {
            content.push_str(&format!("BT /F1 12 Tf 72 {} Td ({}) Tj ET\n", 720 - 20 * i, line));
        }
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);

        let mut data = Vec::new();
        doc.save_to(&mut data).unwrap();
        data
    }

    fn message(document: Option<Document>) -> Message {
        Message {
            message_id: 1,
            chat: Chat { id: 42 },
            text: None,
            document,
        }
    }

    fn pdf_document(file_size: Option<u64>) -> Document {
        Document {
            file_id: "abc".to_string(),
            file_name: Some("reading.pdf".to_string()),
            mime_type: Some("application/pdf".to_string()),
            file_size,
        }
    }

    fn sent() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": { "message_id": 9, "chat": { "id": 42 } }
        }))
    }

    async fn serve_file(server: &MockServer, data: Vec<u8>) {
        Mock::given(method("POST"))
            .and(path("/botTOKEN/getFile"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": { "file_id": "abc", "file_path": "documents/reading.pdf" }
            })))
            .expect(1)
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/file/botTOKEN/documents/reading.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(data))
            .mount(server)
            .await;
    }

    async fn expect_reply(server: &MockServer, text: &str) {
        Mock::given(method("POST"))
            .and(path("/botTOKEN/sendMessage"))
            .and(body_partial_json(json!({ "chat_id": 42, "text": text })))
            .respond_with(sent())
            .expect(1)
            .mount(server)
            .await;
    }

    #[test]
    fn test_error_replies() {
        assert_eq!(error_reply(&ReadprepError::NoText), NO_TEXT_REPLY);
        assert_eq!(
            error_reply(&ReadprepError::Generation(GenerationError::MalformedHtml)),
            MALFORMED_HTML_REPLY
        );
        assert_eq!(
            error_reply(&ReadprepError::Generation(GenerationError::EmptyResponse)),
            "❌ Xatolik yuz berdi: generation error: generation API returned no content"
        );
    }

    #[tokio::test]
    async fn test_non_pdf_gets_usage_hint() {
        let server = MockServer::start().await;
        expect_reply(&server, USAGE_REPLY).await;

        let bot = BotClient::new(&server.uri(), "TOKEN").unwrap();
        let permits = Semaphore::new(1);
        handle_message(&bot, &converter(), &permits, message(None))
            .await
            .unwrap();

        let image = Document {
            mime_type: Some("image/png".to_string()),
            ..pdf_document(None)
        };
        let server = MockServer::start().await;
        expect_reply(&server, USAGE_REPLY).await;
        let bot = BotClient::new(&server.uri(), "TOKEN").unwrap();
        handle_message(&bot, &converter(), &permits, message(Some(image)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_oversized_file_is_not_downloaded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botTOKEN/getFile"))
            .respond_with(sent())
            .expect(0)
            .mount(&server)
            .await;
        let reply = format!("{}file exceeds {} bytes", ERROR_REPLY_PREFIX, MAX_DOWNLOAD_BYTES);
        expect_reply(&server, &reply).await;

        let bot = BotClient::new(&server.uri(), "TOKEN").unwrap();
        let document = pdf_document(Some(MAX_DOWNLOAD_BYTES + 1));
        handle_message(&bot, &converter(), &Semaphore::new(1), message(Some(document)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_pdf_is_answered_with_page() {
        let server = MockServer::start().await;
        serve_file(
            &server,
            pdf(&[
                "Bees live in large colonies.",
                "Questions 1-2",
                "1. Bees live alone.",
                "FALSE",
            ]),
        )
        .await;
        Mock::given(method("POST"))
            .and(path("/botTOKEN/sendDocument"))
            .and(body_string_contains(SUCCESS_CAPTION))
            .and(body_string_contains("<html><body>practice</body></html>"))
            .respond_with(sent())
            .expect(1)
            .mount(&server)
            .await;

        let bot = BotClient::new(&server.uri(), "TOKEN").unwrap();
        handle_message(&bot, &converter(), &Semaphore::new(1), message(Some(pdf_document(Some(900)))))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_pdf_without_text_gets_no_text_reply() {
        let server = MockServer::start().await;
        serve_file(&server, pdf(&[])).await;
        expect_reply(&server, NO_TEXT_REPLY).await;

        let bot = BotClient::new(&server.uri(), "TOKEN").unwrap();
        handle_message(&bot, &converter(), &Semaphore::new(1), message(Some(pdf_document(None))))
            .await
            .unwrap();
    }
}
