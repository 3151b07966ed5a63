use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::filter::threshold::ThresholdFilter;

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {h({l})} {t} - {m}{n}";

/// Console logging at `LOG_LEVEL` (default info), plus everything at debug
/// into `LOG_FILE` when set.
pub fn init() -> anyhow::Result<()> {
    let level = dotenvy::var("LOG_LEVEL")
        .ok()
        .and_then(|l| l.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info);

    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build();

    let mut config = Config::builder().appender(
        Appender::builder()
            .filter(Box::new(ThresholdFilter::new(level)))
            .build("stdout", Box::new(stdout)),
    );
    let mut root = Root::builder().appender("stdout");
    let mut root_level = level;

    if let Ok(path) = dotenvy::var("LOG_FILE") {
        let file = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(PATTERN)))
            .build(&path)?;
        config = config.appender(Appender::builder().build("file", Box::new(file)));
        root = root.appender("file");
        root_level = root_level.max(LevelFilter::Debug);
    }

    let config = config.build(root.build(root_level))?;
    log4rs::init_config(config)?;

    Ok(())
}
