use std::sync::Arc;

use teloxide::Bot;
use tracing::{error, info};

use hwb_core::{config::Config, domain::ChatId, poller::Poller};
use hwb_practicum::PracticumClient;
use hwb_telegram::TelegramNotifier;

#[tokio::main]
async fn main() -> Result<(), hwb_core::Error> {
    hwb_core::logging::init("hwb");

    // Preflight: incomplete credentials are fatal, never retried.
    let cfg = match Config::load() {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            error!("configuration is incomplete, refusing to start: {e}");
            return Err(e);
        }
    };

    let bot = Bot::new(cfg.telegram_token.clone());
    let api = Arc::new(PracticumClient::new(&cfg)?);
    let notifier = Arc::new(TelegramNotifier::new(bot, ChatId(cfg.telegram_chat_id)));

    let mut poller = Poller::new(&cfg, api, notifier);

    // The loop only ends on Ctrl-C, which is a clean exit.
    tokio::select! {
        _ = poller.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, shutting down");
        }
    }

    Ok(())
}
