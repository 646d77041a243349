// Integration tests for the segmentation building blocks and configuration
// loading: detection feeding the hysteresis window, join-rule accumulation,
// and file-based config turning into a runtime session configuration.

use anyhow::Result;
use duotalk::{
    Config, LanguageCode, LanguageDetector, LanguageProfile, StabilityFilter, UtteranceBuffer,
};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_detection_feeds_hysteresis_window() {
    let profiles = [LanguageProfile::vietnamese(), LanguageProfile::japanese()];
    let detector = LanguageDetector::new(&profiles);
    let mut filter = StabilityFilter::new(5, 3);
    let active = LanguageCode::new("vi");

    // A noisy stream: ambiguous fragments fall back to the active language,
    // and the window bound holds after every push
    let stream = [
        "xin chào",
        "123",
        "こんにちは",
        "!?",
        "こんにちは",
        "元気です",
        "こんにちは",
    ];
    let mut verdicts = Vec::new();
    for text in stream {
        filter.push(detector.detect_or(text, &active));
        assert!(filter.len() <= 5, "window exceeded its capacity");
        verdicts.push(filter.evaluate());
    }

    // The single Japanese detection in the middle is not enough...
    assert_eq!(verdicts[2], None);
    // ...but by the end the window holds a clear Japanese majority
    assert_eq!(verdicts[6], Some(LanguageCode::new("ja")));
}

#[test]
fn test_finalized_text_equals_joined_pieces() {
    let profiles = [LanguageProfile::vietnamese(), LanguageProfile::japanese()];
    let mut buffer = UtteranceBuffer::new(&profiles);
    let vi = LanguageCode::new("vi");
    let ja = LanguageCode::new("ja");

    let vi_pieces = ["xin ", " chào", "các bạn."];
    for piece in vi_pieces {
        buffer.append(&vi, piece);
    }
    assert_eq!(buffer.snapshot(&vi), "xin chào các bạn.");

    let ja_pieces = ["こんにちは", "元気", "ですか。"];
    for piece in ja_pieces {
        buffer.append(&ja, piece);
    }
    assert_eq!(buffer.snapshot(&ja), "こんにちは元気ですか。");

    // Clearing is idempotent: a second finalize of the same buffer would
    // have nothing to emit
    buffer.clear(&vi);
    assert_eq!(buffer.snapshot(&vi), "");
    buffer.clear(&vi);
    assert_eq!(buffer.snapshot(&vi), "");
}

#[test]
fn test_config_file_to_session_config() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("duotalk.toml");
    fs::write(
        &config_path,
        r#"
[service]
name = "duotalk-test"

[engine]
detection_window = 7
switch_threshold = 4
min_switch_interval_ms = 2000
max_utterance_ms = 8000
settle_delay_ms = 100

[languages.first]
code = "en"
script = "ascii_latin"
spacing = "spaced"
terminators = ".!?"
pause_ms = 1500

[languages.second]
code = "ja"
recognizer_tag = "ja-JP"
script = "japanese"
spacing = "unspaced"
terminators = "。！？"
pause_ms = 2500
"#,
    )?;

    let config = Config::load(config_path.to_str().unwrap())?;
    assert_eq!(config.service.name, "duotalk-test");

    let session = config.session_config();
    session.validate()?;
    assert_eq!(session.detection_window, 7);
    assert_eq!(session.switch_threshold, 4);
    assert_eq!(session.min_switch_interval.as_millis(), 2000);
    assert_eq!(session.max_utterance.as_millis(), 8000);

    let en = &session.languages[0];
    assert_eq!(en.code, LanguageCode::new("en"));
    assert_eq!(en.recognizer_tag, "en-US", "tag derived from the code");
    assert_eq!(en.pause_timeout.as_millis(), 1500);

    let ja = &session.languages[1];
    assert_eq!(ja.recognizer_tag, "ja-JP");
    assert_eq!(ja.pause_timeout.as_millis(), 2500);
    Ok(())
}

#[test]
fn test_config_rejects_unknown_script_class() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("duotalk.toml");
    fs::write(
        &config_path,
        r#"
[service]
name = "bad"

[engine]
detection_window = 5
switch_threshold = 3
min_switch_interval_ms = 1200
max_utterance_ms = 10000
settle_delay_ms = 80

[languages.first]
code = "xx"
script = "runes"
spacing = "spaced"
terminators = "."
pause_ms = 1000

[languages.second]
code = "ja"
script = "japanese"
spacing = "unspaced"
terminators = "。"
pause_ms = 3000
"#,
    )?;

    assert!(Config::load(config_path.to_str().unwrap()).is_err());
    Ok(())
}
