use anyhow::Result;
use clap::Parser;
use duotalk::{
    CaptionEvent, Config, NoopTranslator, ScriptedLine, ScriptedRecognizer, SessionConfig,
    SessionController, TranslationRelay,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Runs a scripted two-language exchange through the segmentation engine and
/// prints caption events as JSON lines.
#[derive(Debug, Parser)]
#[command(name = "duotalk", about = "Streaming utterance segmentation demo")]
struct Args {
    /// Config file (without extension; TOML/YAML/JSON resolved by name)
    #[arg(short, long, default_value = "config/duotalk")]
    config: String,

    /// How long to let the scripted exchange run before stopping
    #[arg(long, default_value_t = 9)]
    run_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let session_config = match Config::load(&args.config) {
        Ok(cfg) => {
            info!("Loaded config: {}", cfg.service.name);
            cfg.session_config()
        }
        Err(err) => {
            warn!("No config file loaded ({}); using built-in defaults", err);
            SessionConfig::default()
        }
    };

    let pair = (
        session_config.languages[0].code.clone(),
        session_config.languages[1].code.clone(),
    );
    info!(
        "duotalk v0.1.0 — session {} ({} <-> {})",
        session_config.session_id, pair.0, pair.1
    );

    // A canned conversation: a complete Vietnamese sentence, a burst of
    // Japanese that forces a language switch, then Japanese speech with no
    // terminator that only the pause timer can finalize.
    let recognizer = ScriptedRecognizer::new()
        .with_script(
            "vi-VN",
            vec![
                ScriptedLine::interim(Duration::from_millis(300), "xin chào"),
                ScriptedLine::final_fragment(Duration::from_millis(200), "xin chào các bạn."),
                ScriptedLine::final_fragment(Duration::from_millis(400), "こんにちは"),
                ScriptedLine::final_fragment(Duration::from_millis(150), "こんにちは"),
                ScriptedLine::final_fragment(Duration::from_millis(150), "元気です"),
            ],
        )
        .with_script(
            "ja-JP",
            vec![
                ScriptedLine::final_fragment(Duration::from_millis(300), "お会いできて"),
                ScriptedLine::final_fragment(Duration::from_millis(300), "嬉しいです。"),
                ScriptedLine::interim(Duration::from_millis(500), "また明日"),
            ],
        );

    let session = SessionController::new(session_config, Box::new(recognizer))?;
    let events = session.start().await?;

    let (relay_handle, mut captions) =
        TranslationRelay::spawn(events, Arc::new(NoopTranslator), pair);

    let printer = tokio::spawn(async move {
        while let Some(event) = captions.recv().await {
            match &event {
                CaptionEvent::Interim(update) => {
                    info!("[interim {}] {}", update.language, update.text);
                }
                CaptionEvent::Final(out) => match serde_json::to_string(out) {
                    Ok(line) => println!("{}", line),
                    Err(err) => warn!("Failed to encode caption: {}", err),
                },
            }
        }
    });

    tokio::time::sleep(Duration::from_secs(args.run_secs)).await;

    let stats = session.stop().await?;
    relay_handle.await?;
    printer.await?;

    println!("{}", serde_json::to_string_pretty(&stats)?);

    Ok(())
}
