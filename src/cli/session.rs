//! Interactive conversion form. One `ConverterForm` lives for the whole
//! session and every line of input is one user action.

use super::convert::form_table;
use super::favorites::favorites_table;
use super::history::history_table;
use super::{fetch_rates_for, ui};
use crate::core::config::FormDefaults;
use crate::core::{
    ConverterForm, CurrencyCode, FavoritePair, KeyValueStorage, RateProvider, RateUpdate,
};
use anyhow::{Context, Result, anyhow, bail};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

const HELP: &str = "\
Commands:
  amount <value>        set the amount to convert
  from <code>           change the base currency (refetches rates)
  to <row> <code>       change the target currency of a row
  add                   add another target currency
  remove <row>          remove a target row (not the first)
  swap                  swap the base with the first target
  fav <row|from_to>     toggle a favorite pair
  convert               convert and record in history
  show                  show the form
  favorites             list favorite pairs
  history               list past conversions
  options               list available currencies
  help                  show this help
  quit                  leave the session";

#[derive(Debug, Clone, PartialEq)]
pub enum FavoriteTarget {
    /// Zero-based target row; the pair is `from_<target>`.
    Row(usize),
    Pair(FavoritePair),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Amount(f64),
    From(CurrencyCode),
    To { index: usize, code: CurrencyCode },
    Add,
    Remove(usize),
    Swap,
    Favorite(FavoriteTarget),
    Convert,
    Show,
    Favorites,
    History,
    Options,
    Help,
    Quit,
}

/// Rows are numbered from 1 on screen.
fn parse_row(arg: &str) -> Result<usize> {
    let row: usize = arg
        .parse()
        .with_context(|| format!("Invalid row number: '{arg}'"))?;
    row.checked_sub(1)
        .ok_or_else(|| anyhow!("Rows are numbered from 1"))
}

fn expect_arg<'a>(args: &[&'a str], index: usize, usage: &str) -> Result<&'a str> {
    args.get(index)
        .copied()
        .ok_or_else(|| anyhow!("Usage: {usage}"))
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<SessionCommand>> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((name, args)) = words.split_first() else {
        return Ok(None);
    };

    let command = match name.to_lowercase().as_str() {
        "amount" => {
            let arg = expect_arg(args, 0, "amount <value>")?;
            let value: f64 = arg
                .parse()
                .with_context(|| format!("Invalid amount: '{arg}'"))?;
            if !value.is_finite() {
                bail!("Invalid amount: '{arg}'");
            }
            SessionCommand::Amount(value)
        }
        "from" => SessionCommand::From(CurrencyCode::new(expect_arg(args, 0, "from <code>")?)?),
        "to" => SessionCommand::To {
            index: parse_row(expect_arg(args, 0, "to <row> <code>")?)?,
            code: CurrencyCode::new(expect_arg(args, 1, "to <row> <code>")?)?,
        },
        "add" => SessionCommand::Add,
        "remove" | "rm" => SessionCommand::Remove(parse_row(expect_arg(args, 0, "remove <row>")?)?),
        "swap" => SessionCommand::Swap,
        "fav" => {
            let arg = expect_arg(args, 0, "fav <row|from_to>")?;
            let target = if arg.contains('_') {
                FavoriteTarget::Pair(FavoritePair::parse(arg)?)
            } else {
                FavoriteTarget::Row(parse_row(arg)?)
            };
            SessionCommand::Favorite(target)
        }
        "convert" => SessionCommand::Convert,
        "show" => SessionCommand::Show,
        "favorites" | "favs" => SessionCommand::Favorites,
        "history" => SessionCommand::History,
        "options" => SessionCommand::Options,
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" | "q" => SessionCommand::Quit,
        other => bail!("Unknown command '{other}', type 'help' for a list"),
    };
    Ok(Some(command))
}

fn report_rates<W: Write>(out: &mut W, form: &ConverterForm, update: &RateUpdate) -> Result<()> {
    match update {
        RateUpdate::Applied => {
            let count = form.rates().map_or(0, |r| r.len());
            writeln!(
                out,
                "{}",
                ui::style_text(
                    &format!("Loaded {count} rates for {}", form.from()),
                    ui::StyleType::Subtle
                )
            )?;
        }
        RateUpdate::Failed(e) => {
            writeln!(
                out,
                "{}",
                ui::style_text(
                    &format!("Could not fetch rates: {e}. Keeping previous rates."),
                    ui::StyleType::Error
                )
            )?;
        }
        RateUpdate::Stale => debug!("Ignored a stale rate response"),
    }
    Ok(())
}

/// Applies one command. Returns `false` when the session should end.
async fn execute<W: Write>(
    form: &mut ConverterForm,
    provider: &dyn RateProvider,
    command: SessionCommand,
    out: &mut W,
) -> Result<bool> {
    match command {
        SessionCommand::Amount(value) => form.change_amount(value)?,
        SessionCommand::From(code) => {
            let request = form.change_from(code);
            let update = fetch_rates_for(form, provider, request).await;
            report_rates(out, form, &update)?;
        }
        SessionCommand::To { index, code } => form.change_target_currency(index, code)?,
        SessionCommand::Add => form.add_target(),
        SessionCommand::Remove(index) => form.remove_target(index)?,
        SessionCommand::Swap => {
            form.swap();
            let request = form.request_rates();
            let update = fetch_rates_for(form, provider, request).await;
            report_rates(out, form, &update)?;
        }
        SessionCommand::Favorite(target) => {
            let pair = match target {
                FavoriteTarget::Row(index) => form.pair_for(index)?,
                FavoriteTarget::Pair(pair) => pair,
            };
            let verb = if form.toggle_favorite(pair.clone()) {
                "Added"
            } else {
                "Removed"
            };
            writeln!(out, "{verb} favorite {pair}")?;
            return Ok(true);
        }
        SessionCommand::Convert => {
            form.submit_convert()?;
            writeln!(
                out,
                "{}",
                ui::style_text(&form.submit_label(), ui::StyleType::TotalValue)
            )?;
        }
        SessionCommand::Show => {}
        SessionCommand::Favorites => {
            writeln!(out, "{}", favorites_table(form.favorites()))?;
            return Ok(true);
        }
        SessionCommand::History => {
            writeln!(out, "{}", history_table(form.history()))?;
            return Ok(true);
        }
        SessionCommand::Options => {
            let options: Vec<String> = form
                .currency_options()
                .iter()
                .map(|c| c.to_string())
                .collect();
            if options.is_empty() {
                writeln!(out, "No currencies available")?;
            } else {
                writeln!(out, "{}", options.join(" "))?;
            }
            return Ok(true);
        }
        SessionCommand::Help => {
            writeln!(out, "{HELP}")?;
            return Ok(true);
        }
        SessionCommand::Quit => return Ok(false),
    }

    // Every form-changing command re-renders the form
    writeln!(out, "{}", form_table(form))?;
    Ok(true)
}

/// Runs the session over arbitrary input and output until `quit` or end of input.
pub async fn run_with_io<R, W>(
    form: &mut ConverterForm,
    provider: &dyn RateProvider,
    input: R,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let request = form.request_rates();
    let update = fetch_rates_for(form, provider, request).await;
    report_rates(out, form, &update)?;
    writeln!(out, "{}", form_table(form))?;
    writeln!(out, "Type 'help' for commands.")?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                writeln!(out, "{}", ui::style_text(&e.to_string(), ui::StyleType::Error))?;
                continue;
            }
        };
        debug!(?command, "Session command");

        match execute(form, provider, command, out).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                writeln!(out, "{}", ui::style_text(&e.to_string(), ui::StyleType::Error))?;
            }
        }
        out.flush()?;
    }
    Ok(())
}

pub async fn run(
    defaults: &FormDefaults,
    storage: Arc<dyn KeyValueStorage>,
    provider: &dyn RateProvider,
) -> Result<()> {
    let mut form = ConverterForm::new(defaults, storage);
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    run_with_io(&mut form, provider, stdin, &mut stdout).await
}
