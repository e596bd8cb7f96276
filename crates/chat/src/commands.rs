/// Top-level bot commands. Anything the parser does not recognize keeps
/// its verb for the fallback help reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Help,
    Stats,
    Ranking,
    NewSale,
    QuickSale { args: String },
    Unknown { verb: String },
}

/// Splits a leading `/verb` from a message. Returns `None` for plain text.
/// A `@botname` suffix on the verb is tolerated.
pub fn parse_command(text: &str) -> Option<BotCommand> {
    let trimmed = text.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let raw_verb = parts.next().unwrap_or_default();
    let args = parts.next().unwrap_or_default().trim().to_string();

    let verb = raw_verb
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    Some(match verb.as_str() {
        "start" => BotCommand::Start,
        "help" => BotCommand::Help,
        "stats" | "sales" => BotCommand::Stats,
        "ranking" => BotCommand::Ranking,
        "newsale" => BotCommand::NewSale,
        "sale" => BotCommand::QuickSale { args },
        _ => BotCommand::Unknown { verb },
    })
}
