// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn date_arg(help: &'static str) -> Arg {
    Arg::new("date").long("date").help(help)
}

fn tx_fields(cmd: Command, required: bool) -> Command {
    cmd.arg(
        Arg::new("kind")
            .long("kind")
            .required(required)
            .value_parser(["income", "expense", "transfer"]),
    )
    .arg(
        Arg::new("date")
            .long("date")
            .required(required)
            .help("YYYY-MM-DD"),
    )
    .arg(
        Arg::new("amount")
            .long("amount")
            .required(required)
            .allow_hyphen_values(true)
            .help("Rupiah amount, e.g. 125000 or 1.250.000"),
    )
    .arg(Arg::new("account").long("account").required(required))
    .arg(
        Arg::new("to-account")
            .long("to-account")
            .help("Destination account for transfers"),
    )
    .arg(Arg::new("category").long("category"))
    .arg(Arg::new("note").long("note"))
}

pub fn build_cli() -> Command {
    Command::new("dompet")
        .about("Household income, expense and budget tracker in rupiah")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(false)
        .subcommand(Command::new("init").about("Create the database if missing"))
        .subcommand(
            Command::new("settings")
                .about("Household settings")
                .subcommand(json_args(Command::new("show")))
                .subcommand(
                    Command::new("set-start-day")
                        .about("First day of each billing period (1-31)")
                        .arg(Arg::new("day").required(true)),
                )
                .subcommand(
                    Command::new("clear-start-day").about("Use plain calendar months again"),
                )
                .subcommand(
                    Command::new("set-household").arg(Arg::new("name").required(true)),
                ),
        )
        .subcommand(
            Command::new("account")
                .about("Manage accounts")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(
                            Arg::new("initial")
                                .long("initial")
                                .allow_hyphen_values(true)
                                .default_value("0"),
                        ),
                )
                .subcommand(json_args(Command::new("list")))
                .subcommand(
                    Command::new("rm").arg(Arg::new("name").long("name").required(true)),
                ),
        )
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(
                            Arg::new("kind")
                                .long("kind")
                                .required(true)
                                .value_parser(["income", "expense"]),
                        )
                        .arg(Arg::new("parent").long("parent")),
                )
                .subcommand(
                    Command::new("move")
                        .about("Change or clear a category's parent")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("parent").long("parent")),
                )
                .subcommand(json_args(
                    Command::new("list").arg(date_arg("Totals for the period containing this date")),
                ))
                .subcommand(
                    Command::new("rm").arg(Arg::new("name").long("name").required(true)),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and list transactions")
                .subcommand(tx_fields(Command::new("add"), true))
                .subcommand(tx_fields(
                    Command::new("edit")
                        .about("Replace fields of a transaction; unspecified ones are kept")
                        .arg(
                            Arg::new("id")
                                .long("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(
                            Arg::new("clear-note")
                                .long("clear-note")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("note"),
                        ),
                    false,
                ))
                .subcommand(
                    Command::new("rm").arg(
                        Arg::new("id")
                            .long("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                )
                .subcommand(json_args(
                    Command::new("list")
                        .arg(
                            Arg::new("period")
                                .long("period")
                                .help("'current' or a YYYY-MM-DD inside the wanted period"),
                        )
                        .arg(Arg::new("account").long("account"))
                        .arg(Arg::new("category").long("category"))
                        .arg(
                            Arg::new("kind")
                                .long("kind")
                                .value_parser(["income", "expense", "transfer"]),
                        )
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                )),
        )
        .subcommand(
            Command::new("budget")
                .about("Per-category budgets for each billing period")
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(
                            Arg::new("period-start")
                                .long("period-start")
                                .help("Any date inside the period; defaults to today"),
                        )
                        .arg(
                            Arg::new("rollover")
                                .long("rollover")
                                .action(ArgAction::SetTrue),
                        ),
                )
                .subcommand(json_args(Command::new("list")))
                .subcommand(json_args(
                    Command::new("status").arg(date_arg("Any date inside the period")),
                )),
        )
        .subcommand(
            Command::new("report")
                .about("Summaries and reports")
                .subcommand(json_args(
                    Command::new("summary").arg(date_arg("Any date inside the period")),
                ))
                .subcommand(json_args(Command::new("balances")))
                .subcommand(json_args(
                    Command::new("cashflow").arg(
                        Arg::new("periods")
                            .long("periods")
                            .value_parser(value_parser!(u64).range(1..=1200))
                            .default_value("6"),
                    ),
                ))
                .subcommand(json_args(
                    Command::new("by-category").arg(date_arg("Any date inside the period")),
                )),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand(
                    Command::new("transactions")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .required(true)
                                .value_parser(["csv", "json"]),
                        )
                        .arg(Arg::new("out").long("out").required(true))
                        .arg(Arg::new("period").long("period")),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Import data")
                .subcommand(
                    Command::new("transactions")
                        .arg(Arg::new("path").long("path").required(true)),
                ),
        )
        .subcommand(json_args(
            Command::new("doctor").about("Check stored data for inconsistencies"),
        ))
}
