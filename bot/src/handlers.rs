//! Telegram update handlers.
//!
//! Two entry points: typed commands and plain-text quick conversions
//! ("100 USD RUB"). Everything rate-related is delegated to the
//! conversion engine; handlers only parse input and render replies.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::ParseMode;
use teloxide::utils::command::BotCommands;
use teloxide::utils::html;
use tracing::{debug, warn};

use kursbot_common::{CurrencyCode, SourceKind};
use kursbot_rates::{ConversionEngine, ConversionResult, ConvertError};

use crate::format::{fmt_amount, fmt_usd_price};

/// Bot commands.
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "welcome and quick usage")]
    Start,
    #[command(description = "how to use the bot")]
    Help,
    #[command(description = "current rates: /rates crypto or /rates fiat")]
    Rates(String),
    #[command(description = "supported currency codes")]
    Codes,
    #[command(description = "current Bitcoin price")]
    Btc,
    #[command(description = "current Ethereum price")]
    Eth,
    #[command(description = "current Toncoin price")]
    Ton,
    #[command(description = "current Solana price")]
    Sol,
    #[command(description = "current BNB price")]
    Bnb,
}

/// Outcome of scanning a plain-text message for a quick conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum QuickInput {
    /// A well-formed `<amount> <FROM> <TO>` request.
    Convert { amount: f64, from: String, to: String },
    /// Conversion-shaped text whose amount is not a positive number.
    BadAmount,
    /// Not a conversion request; the message is ignored.
    Unrecognized,
}

/// Parse a quick-conversion line like `100 USD RUB` or `0.5 btc eur`.
/// A decimal comma is tolerated.
pub fn parse_quick(text: &str) -> QuickInput {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() != 3 {
        return QuickInput::Unrecognized;
    }

    let (amount_raw, from, to) = (tokens[0], tokens[1], tokens[2]);
    if !is_code_like(from) || !is_code_like(to) {
        return QuickInput::Unrecognized;
    }

    let amount_chars_ok = amount_raw
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | '+'));
    if !amount_chars_ok {
        return QuickInput::Unrecognized;
    }

    match amount_raw.replace(',', ".").parse::<f64>() {
        Ok(amount) if amount > 0.0 && amount.is_finite() => QuickInput::Convert {
            amount,
            from: from.to_uppercase(),
            to: to.to_uppercase(),
        },
        _ => QuickInput::BadAmount,
    }
}

fn is_code_like(token: &str) -> bool {
    (2..=6).contains(&token.len()) && token.chars().all(|c| c.is_ascii_alphabetic())
}

/// Build the dispatcher and run long polling until shutdown.
pub async fn dispatch(bot: Bot, engine: Arc<ConversionEngine>) {
    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!(error = %e, "Failed to register command menu");
    }

    let handler = Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(dptree::endpoint(handle_text));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![engine])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

/// Handle a typed command.
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    engine: Arc<ConversionEngine>,
) -> ResponseResult<()> {
    let reply = match cmd {
        Command::Start => start_text(),
        Command::Help => help_text(),
        Command::Rates(arg) => rates_text(&engine, &arg).await,
        Command::Codes => codes_text(&engine),
        Command::Btc => crypto_price_text(&engine, "BTC").await,
        Command::Eth => crypto_price_text(&engine, "ETH").await,
        Command::Ton => crypto_price_text(&engine, "TON").await,
        Command::Sol => crypto_price_text(&engine, "SOL").await,
        Command::Bnb => crypto_price_text(&engine, "BNB").await,
    };

    bot.send_message(msg.chat.id, reply)
        .parse_mode(ParseMode::Html)
        .await?;

    Ok(())
}

/// Handle plain text: quick conversions, everything else ignored.
pub async fn handle_text(
    bot: Bot,
    msg: Message,
    engine: Arc<ConversionEngine>,
) -> ResponseResult<()> {
    let text = match msg.text() {
        Some(text) => text,
        None => return Ok(()),
    };

    let reply = match parse_quick(text) {
        QuickInput::Convert { amount, from, to } => {
            match engine.convert(amount, &from, &to).await {
                Ok(result) => conversion_card(&engine, &result),
                Err(e) => convert_error_text(&e),
            }
        }
        QuickInput::BadAmount => {
            "\u{274C} Enter a valid positive amount\nExample: <code>100 USD RUB</code>".to_string()
        }
        QuickInput::Unrecognized => {
            debug!("Ignoring unrecognized text");
            return Ok(());
        }
    };

    bot.send_message(msg.chat.id, reply)
        .parse_mode(ParseMode::Html)
        .await?;

    Ok(())
}

fn start_text() -> String {
    "\u{2728} <b>Currency Converter Bot</b>\n\n\
     Real-time conversion between:\n\
     \u{2022} \u{1F4B5} 12 fiat currencies (USD, EUR, RUB...)\n\
     \u{2022} \u{1FA99} 12 crypto assets (BTC, ETH, TON...)\n\n\
     Type <code>100 USD RUB</code> to convert, or see /help"
        .to_string()
}

fn help_text() -> String {
    "<b>\u{2753} How to use</b>\n\n\
     Send a message like:\n\
     <code>100 USD RUB</code>\n\
     <code>0.5 BTC EUR</code>\n\
     <code>1000 RUB TON</code>\n\n\
     <b>Commands:</b>\n\
     /rates crypto \u{2014} crypto prices\n\
     /rates fiat \u{2014} fiat rates per USD\n\
     /codes \u{2014} supported currencies\n\
     /btc /eth /ton /sol /bnb \u{2014} spot price"
        .to_string()
}

/// Render a completed conversion.
fn conversion_card(engine: &ConversionEngine, result: &ConversionResult) -> String {
    let from_symbol = symbol_for(engine, &result.from_code);
    let to_symbol = symbol_for(engine, &result.to_code);

    format!(
        "\u{1F4B1} <b>Conversion</b>\n\n\
         {from_symbol} <b>{amount} {from}</b> \u{279C} {to_symbol} <b>{result} {to}</b>\n\n\
         \u{1F4CA} <b>Rate:</b> 1 {from} = {rate} {to}\n\
         \u{1F4B5} <b>USD price:</b>\n   1 {from} = ${from_usd}\n   1 {to} = ${to_usd}",
        from_symbol = from_symbol,
        to_symbol = to_symbol,
        amount = fmt_amount(result.amount),
        result = fmt_amount(result.result_amount),
        from = result.from_code,
        to = result.to_code,
        rate = fmt_amount(result.rate),
        from_usd = fmt_amount(result.from_unit_usd),
        to_usd = fmt_amount(result.to_unit_usd),
    )
}

fn convert_error_text(error: &ConvertError) -> String {
    match error {
        ConvertError::UnsupportedCurrency(code) => {
            format!(
                "\u{274C} Currency <b>{}</b> is not supported. See /codes",
                code
            )
        }
        ConvertError::RateUnavailable { .. } => {
            "\u{274C} Could not fetch the rate. Try again later.".to_string()
        }
    }
}

/// Render the rate listing for one source kind.
async fn rates_text(engine: &ConversionEngine, arg: &str) -> String {
    let kind = match arg.trim().to_lowercase().as_str() {
        "" | "crypto" => SourceKind::Crypto,
        "fiat" => SourceKind::Fiat,
        other => {
            return format!(
                "\u{274C} Unknown rate type <b>{}</b>. Use /rates crypto or /rates fiat",
                html::escape(other)
            );
        }
    };

    let snapshot = match engine.snapshot(kind).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(source = %kind, error = %e, "Rates listing failed");
            return "\u{274C} Could not fetch the rates. Try again later.".to_string();
        }
    };

    let mut lines = vec![
        match kind {
            SourceKind::Crypto => "<b>\u{1F4C8} Crypto prices</b>".to_string(),
            SourceKind::Fiat => "<b>\u{1F4B5} Rates per 1 USD</b>".to_string(),
        },
        String::new(),
    ];

    for code in engine.supported_codes(kind) {
        // The fiat listing quotes against USD, so USD itself says nothing
        if kind == SourceKind::Fiat && code.is_usd() {
            continue;
        }

        if let Some(price) = snapshot.price(&code) {
            let line = match kind {
                SourceKind::Crypto => format!(
                    "{} <b>{}</b>: {}",
                    symbol_for(engine, &code),
                    code,
                    fmt_usd_price(price)
                ),
                SourceKind::Fiat => format!(
                    "{} <b>{}</b>: {:.4}",
                    symbol_for(engine, &code),
                    code,
                    price
                ),
            };
            lines.push(line);
        }
    }

    lines.join("\n")
}

/// Render the supported-currency listing.
fn codes_text(engine: &ConversionEngine) -> String {
    let mut lines = vec!["<b>Supported currencies</b>".to_string()];

    for (kind, header) in [
        (SourceKind::Fiat, "<b>\u{1F4B5} Fiat</b>"),
        (SourceKind::Crypto, "<b>\u{1FA99} Crypto</b>"),
    ] {
        lines.push(String::new());
        lines.push(header.to_string());

        for code in engine.supported_codes(kind) {
            if let Some(descriptor) = engine.describe(&code) {
                lines.push(format!(
                    "{} <code>{}</code> {}",
                    descriptor.symbol, descriptor.code, descriptor.display_name
                ));
            }
        }
    }

    lines.join("\n")
}

/// Render a single crypto price, for the /btc style shortcuts.
async fn crypto_price_text(engine: &ConversionEngine, code: &str) -> String {
    let code = CurrencyCode::new(code);

    let snapshot = match engine.snapshot(SourceKind::Crypto).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(code = %code, error = %e, "Price lookup failed");
            return "\u{274C} Could not fetch the rate. Try again later.".to_string();
        }
    };

    match (engine.describe(&code), snapshot.price(&code)) {
        (Some(descriptor), Some(price)) => format!(
            "{} <b>{}</b>\n\n\u{1F4B5} {}",
            descriptor.symbol,
            descriptor.display_name,
            fmt_usd_price(price)
        ),
        _ => "\u{274C} Could not fetch the rate. Try again later.".to_string(),
    }
}

fn symbol_for(engine: &ConversionEngine, code: &CurrencyCode) -> String {
    engine
        .describe(code)
        .map(|d| d.symbol.clone())
        .unwrap_or_else(|| "\u{1F4B0}".to_string())
}
