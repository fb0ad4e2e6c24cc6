// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use dompet::context::Session;
use dompet::{cli, commands, db};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let mut conn = db::open_or_init()?;
    let session = Session::load(&conn, chrono::Local::now().date_naive())?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("settings", sub)) => commands::settings::handle(&conn, &session, sub)?,
        Some(("account", sub)) => commands::accounts::handle(&conn, &session, sub)?,
        Some(("category", sub)) => commands::categories::handle(&conn, &session, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&conn, &session, sub)?,
        Some(("budget", sub)) => commands::budgets::handle(&conn, &session, sub)?,
        Some(("report", sub)) => commands::reports::handle(&conn, &session, sub)?,
        Some(("import", sub)) => commands::importer::handle(&mut conn, &session, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, &session, sub)?,
        Some(("doctor", sub)) => commands::doctor::handle(&conn, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
