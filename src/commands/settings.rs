// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::context::Session;
use crate::notify::ChangeKind;
use crate::utils::{
    clear_period_start_day, maybe_print_json, parse_start_day, pretty_table, required,
    set_household, set_period_start_day,
};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

#[derive(Serialize)]
struct SettingsView {
    household: String,
    period_start_day: Option<u32>,
    current_period_from: String,
    current_period_to: String,
}

pub fn handle(conn: &Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => {
            let period = session.current_period();
            let view = SettingsView {
                household: session.household.clone(),
                period_start_day: session.period_start_day,
                current_period_from: period.from.to_string(),
                current_period_to: period.to.to_string(),
            };
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &view)? {
                let start = view
                    .period_start_day
                    .map_or_else(|| "calendar month".to_string(), |d| d.to_string());
                println!(
                    "{}",
                    pretty_table(
                        &["Setting", "Value"],
                        vec![
                            vec!["household".into(), view.household.clone()],
                            vec!["period_start_day".into(), start],
                            vec![
                                "current period".into(),
                                format!("{} .. {}", view.current_period_from, view.current_period_to),
                            ],
                        ],
                    )
                );
            }
        }
        Some(("set-start-day", sub)) => {
            let day = parse_start_day(required(sub, "day")?)?;
            set_period_start_day(conn, day)?;
            session.notify(conn, ChangeKind::Settings)?;
            println!("Billing periods now start on day {}", day);
        }
        Some(("clear-start-day", _)) => {
            clear_period_start_day(conn)?;
            session.notify(conn, ChangeKind::Settings)?;
            println!("Billing periods now follow calendar months");
        }
        Some(("set-household", sub)) => {
            let name = required(sub, "name")?;
            set_household(conn, name)?;
            // the old household's cache goes stale with its name
            session.notify(conn, ChangeKind::Settings)?;
            println!("Household set to '{}'", name.trim());
        }
        _ => {}
    }
    Ok(())
}
