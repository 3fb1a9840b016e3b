use std::{env, path::PathBuf, process};

use chrono::{Datelike, NaiveDate};
use tally::{
    export::{backup_csv, export_csv_file},
    init_with_filter, TallyError, Workspace,
};
use tally_config::{Config, ConfigManager};
use tally_core::{
    category_name, CategoryLookup, ErrorKind, LedgerError, StatisticsService, ValidationPolicy,
};
use tally_domain::{
    end_of_day, now, start_of_day, CategoryId, Displayable, Transaction, TransactionFilter,
    TransactionKind, DATE_FORMAT,
};

const CONFIG_ENV: &str = "TALLY_CONFIG";

fn main() {
    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            process::exit(1);
        }
    };
    init_with_filter(&config.log_filter);

    let args: Vec<String> = env::args().skip(1).collect();
    if let Err(err) = run(config, &args) {
        eprintln!("{}", describe(&err));
        process::exit(1);
    }
}

fn load_config() -> Result<Config, TallyError> {
    let path = env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(ConfigManager::default_location);
    Ok(ConfigManager::new(path).load()?)
}

fn run(config: Config, args: &[String]) -> Result<(), TallyError> {
    let Some((command, rest)) = args.split_first() else {
        print_usage();
        return Err(TallyError::usage("missing command"));
    };
    if matches!(command.as_str(), "help" | "--help" | "-h") {
        print_usage();
        return Ok(());
    }

    let workspace = Workspace::open(config)?;
    match command.as_str() {
        "summary" => summary(&workspace, rest.first()),
        "latest" => latest(&workspace, rest.first()),
        "add" => add(&workspace, rest),
        "delete" => delete(&workspace, rest.first()),
        "query" => query(&workspace, rest),
        "export" => export(&workspace, rest),
        "categories" => categories(&workspace, rest.first()),
        "backup" => backup(&workspace),
        other => {
            print_usage();
            Err(TallyError::usage(format!("unknown command `{other}`")))
        }
    }
}

fn summary(workspace: &Workspace, month: Option<&String>) -> Result<(), TallyError> {
    let (year, month) = match month {
        Some(raw) => parse_month(raw)?,
        None => {
            let today = now().date();
            (today.year(), today.month())
        }
    };
    let stats = StatisticsService::monthly(&workspace.ledger, year, month)
        .ok_or_else(|| TallyError::usage(format!("invalid month {year}-{month:02}")))?;

    println!("Summary for {year}-{month:02}");
    println!("  Income:   {:>12.2} ({} entries)", stats.total_income, stats.income_count);
    println!("  Expense:  {:>12.2} ({} entries)", stats.total_expense, stats.expense_count);
    println!("  Balance:  {:>12.2}", stats.balance);
    if stats.expense_count > 0 {
        println!("  Avg. expense: {:.2}", stats.average_expense());
    }
    for row in StatisticsService::category_breakdown(&stats, &workspace.categories) {
        println!(
            "    {:<16} {:>12.2} {:>5.1}%",
            row.name,
            row.amount,
            row.share * 100.0
        );
    }
    Ok(())
}

fn latest(workspace: &Workspace, count: Option<&String>) -> Result<(), TallyError> {
    let n = match count {
        Some(raw) => parse_value::<usize>("count", raw)?,
        None => workspace.config.latest_limit,
    };
    print_rows(&workspace.ledger.latest(n), &workspace.categories);
    Ok(())
}

fn add(workspace: &Workspace, args: &[String]) -> Result<(), TallyError> {
    let [kind, amount, flags @ ..] = args else {
        return Err(TallyError::usage(
            "usage: add <income|expense> <amount> [--category ID] [--note TEXT] [--date YYYY-MM-DD]",
        ));
    };
    let kind: TransactionKind = kind.parse().map_err(|err| TallyError::usage(format!("{err}")))?;
    let mut candidate = Transaction::new(kind, parse_value("amount", amount)?);
    for (flag, value) in flag_pairs(flags)? {
        match flag {
            "--category" => candidate.category_id = category_reference(value)?,
            "--note" => candidate = candidate.with_note(value),
            "--date" => candidate = candidate.with_date(start_of_day(parse_date(value)?)),
            other => return Err(TallyError::usage(format!("unknown option `{other}`"))),
        }
    }
    let id = workspace.ledger.add(candidate)?;
    println!("Added transaction #{id}");
    Ok(())
}

fn delete(workspace: &Workspace, id: Option<&String>) -> Result<(), TallyError> {
    let raw = id.ok_or_else(|| TallyError::usage("usage: delete <ID>"))?;
    let id = parse_value("id", raw)?;
    if workspace.ledger.delete(id)? {
        println!("Deleted transaction #{id}");
    } else {
        println!("No transaction #{id}; nothing deleted");
    }
    Ok(())
}

fn query(workspace: &Workspace, args: &[String]) -> Result<(), TallyError> {
    let rows = workspace.ledger.query(&parse_filter(args)?);
    print_rows(&rows, &workspace.categories);
    println!("{} transaction(s)", rows.len());
    Ok(())
}

/// Builds a filter from `--from/--to/--category/--min/--max/--keyword/--type` pairs.
fn parse_filter(args: &[String]) -> Result<TransactionFilter, TallyError> {
    let mut filter = TransactionFilter::new();
    for (flag, value) in flag_pairs(args)? {
        filter = match flag {
            "--from" => filter.with_start_date(start_of_day(parse_date(value)?)),
            "--to" => filter.with_end_date(end_of_day(parse_date(value)?)),
            "--category" => match category_reference(value)? {
                Some(id) => filter.with_category(id),
                None => filter,
            },
            "--min" => filter.with_min_amount(parse_value("min", value)?),
            "--max" => filter.with_max_amount(parse_value("max", value)?),
            "--keyword" => filter.with_keyword(value),
            "--type" => filter.with_kind(
                value
                    .parse()
                    .map_err(|err| TallyError::usage(format!("{err}")))?,
            ),
            other => return Err(TallyError::usage(format!("unknown option `{other}`"))),
        };
    }
    Ok(filter)
}

/// Exports the transactions matching the optional filter flags.
fn export(workspace: &Workspace, args: &[String]) -> Result<(), TallyError> {
    let Some((path, flags)) = args.split_first() else {
        return Err(TallyError::usage("usage: export <PATH> [query options]"));
    };
    let path = PathBuf::from(path);
    let rows = export_csv_file(
        &path,
        &workspace.ledger.query(&parse_filter(flags)?),
        &workspace.categories,
    )?;
    println!("Exported {rows} transaction(s) to {}", path.display());
    Ok(())
}

fn categories(workspace: &Workspace, kind: Option<&String>) -> Result<(), TallyError> {
    let kind = kind
        .map(|raw| raw.parse::<TransactionKind>())
        .transpose()
        .map_err(|err| TallyError::usage(format!("{err}")))?;
    let listed = workspace.categories.list(kind);
    for category in &listed {
        println!(
            "#{:<5} {}",
            category.id.unwrap_or_default(),
            category.display_label()
        );
    }
    println!("{} categor{}", listed.len(), if listed.len() == 1 { "y" } else { "ies" });
    Ok(())
}

fn backup(workspace: &Workspace) -> Result<(), TallyError> {
    let path = backup_csv(
        &workspace.config.resolve_backup_dir(),
        &workspace.ledger.transactions(),
        &workspace.categories,
    )?;
    println!("Backup written to {}", path.display());
    Ok(())
}

fn print_rows(rows: &[Transaction], categories: &dyn CategoryLookup) {
    for txn in rows {
        println!(
            "{}  [{}]",
            txn.display_label(),
            category_name(categories, txn.category_id)
        );
    }
}

fn flag_pairs(args: &[String]) -> Result<Vec<(&str, &str)>, TallyError> {
    let mut pairs = Vec::new();
    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .ok_or_else(|| TallyError::usage(format!("option `{flag}` needs a value")))?;
        pairs.push((flag.as_str(), value.as_str()));
    }
    Ok(pairs)
}

fn parse_value<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, TallyError> {
    raw.trim()
        .parse()
        .map_err(|_| TallyError::usage(format!("invalid {name}: `{raw}`")))
}

/// A non-integer `--category` is a validation failure, not a usage error.
fn category_reference(raw: &str) -> Result<Option<CategoryId>, TallyError> {
    ValidationPolicy::category_reference(raw).map_err(|err| LedgerError::from(err).into())
}

fn parse_date(raw: &str) -> Result<NaiveDate, TallyError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| TallyError::usage(format!("invalid date `{raw}`, expected YYYY-MM-DD")))
}

fn parse_month(raw: &str) -> Result<(i32, u32), TallyError> {
    let invalid = || TallyError::usage(format!("invalid month `{raw}`, expected YYYY-MM"));
    let (year, month) = raw.trim().split_once('-').ok_or_else(invalid)?;
    let year = year.parse().map_err(|_| invalid())?;
    let month = month.parse().map_err(|_| invalid())?;
    Ok((year, month))
}

fn describe(err: &TallyError) -> String {
    match err.kind() {
        Some(
            ErrorKind::InvalidAmount | ErrorKind::AmountExceedsLimit | ErrorKind::InvalidCategory,
        ) => format!("Rejected: {err}"),
        Some(ErrorKind::NotFound) => format!("Not found: {err}"),
        Some(ErrorKind::StorageError) => format!("Storage failure, nothing was changed: {err}"),
        None => format!("Error: {err}"),
    }
}

fn print_usage() {
    println!("Usage: tally <command> [args]");
    println!();
    println!("Commands:");
    println!("  summary [YYYY-MM]            Totals and category breakdown for a month");
    println!("  latest [N]                   Most recent transactions");
    println!("  add <income|expense> <amount> [--category ID] [--note TEXT] [--date YYYY-MM-DD]");
    println!("  delete <ID>                  Remove a transaction");
    println!("  query [--from D] [--to D] [--category ID] [--min X] [--max X] [--keyword K] [--type T]");
    println!("  export <PATH> [query options] Write matching transactions to a CSV file");
    println!("  categories [income|expense]  List categories and their ids");
    println!("  backup                       Write a timestamped CSV into the backup directory");
    println!();
    println!("Set {CONFIG_ENV} to use a config file other than the default location.");
}
