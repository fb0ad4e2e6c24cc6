// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use dompet::cache::SummaryCache;
use dompet::cli::build_cli;
use dompet::commands::{categories, reports, settings, transactions};
use dompet::context::Session;
use dompet::models::CategoryKind;
use dompet::store::{insert_account, insert_category};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn setup(start_day: Option<u32>) -> (Connection, Session) {
    let conn = dompet::db::open_in_memory().unwrap();
    insert_account(&conn, "Bank", Decimal::ZERO).unwrap();
    insert_account(&conn, "Wallet", Decimal::ZERO).unwrap();
    insert_category(&conn, "Salary", CategoryKind::Income, None).unwrap();
    let home = insert_category(&conn, "Home", CategoryKind::Expense, None).unwrap();
    insert_category(&conn, "Power", CategoryKind::Expense, Some(home)).unwrap();
    insert_category(&conn, "Food", CategoryKind::Expense, None).unwrap();
    (conn, Session::new("home", start_day, day(2025, 6, 15)))
}

fn run(conn: &Connection, session: &Session, args: &[&str]) -> anyhow::Result<()> {
    let argv: Vec<&str> = std::iter::once("dompet").chain(args.iter().copied()).collect();
    let m = build_cli().get_matches_from(argv);
    match m.subcommand() {
        Some(("tx", sub)) => transactions::handle(conn, session, sub),
        Some(("report", sub)) => reports::handle(conn, session, sub),
        Some(("settings", sub)) => settings::handle(conn, session, sub),
        Some(("category", sub)) => categories::handle(conn, session, sub),
        other => panic!("unexpected command {:?}", other.map(|o| o.0)),
    }
}

fn add(conn: &Connection, session: &Session, kind: &str, date: &str, amount: &str, cat: &str) {
    run(conn, session, &[
        "tx", "add", "--kind", kind, "--date", date, "--amount", amount, "--account", "Bank",
        "--category", cat,
    ])
    .unwrap();
}

#[test]
fn summary_is_cached_until_transactions_change() {
    let (conn, session) = setup(None);
    add(&conn, &session, "income", "2025-06-01", "5000000", "Salary");
    add(&conn, &session, "expense", "2025-06-02", "1250000", "Food");
    run(&conn, &session, &[
        "tx", "add", "--kind", "transfer", "--date", "2025-06-03", "--amount", "100000",
        "--account", "Bank", "--to-account", "Wallet",
    ])
    .unwrap();

    let period = session.current_period();
    let s = reports::period_summary(&conn, &session, &period).unwrap();
    assert_eq!(s.total_income, Decimal::from(5_000_000));
    assert_eq!(s.total_expense, Decimal::from(1_250_000));
    assert_eq!(s.net_balance, Decimal::from(3_750_000));
    assert_eq!(s.count, 2);
    assert_eq!(s.transfer_count, 1);
    assert_eq!(
        SummaryCache.get(&conn, &session.household, &period).unwrap(),
        Some(s.clone())
    );

    add(&conn, &session, "expense", "2025-06-04", "250000", "Food");
    assert_eq!(SummaryCache.get(&conn, &session.household, &period).unwrap(), None);
    let s = reports::period_summary(&conn, &session, &period).unwrap();
    assert_eq!(s.total_expense, Decimal::from(1_500_000));
    assert_eq!(s.count, 3);
}

#[test]
fn changing_start_day_drops_cached_summaries() {
    let (conn, session) = setup(None);
    add(&conn, &session, "expense", "2025-06-02", "1000", "Food");
    let period = session.current_period();
    reports::period_summary(&conn, &session, &period).unwrap();
    assert!(SummaryCache.get(&conn, "home", &period).unwrap().is_some());

    run(&conn, &session, &["settings", "set-start-day", "25"]).unwrap();
    assert!(SummaryCache.get(&conn, "home", &period).unwrap().is_none());
    assert_eq!(dompet::utils::get_period_start_day(&conn).unwrap(), Some(25));

    assert!(run(&conn, &session, &["settings", "set-start-day", "32"]).is_err());
    run(&conn, &session, &["settings", "clear-start-day"]).unwrap();
    assert_eq!(dompet::utils::get_period_start_day(&conn).unwrap(), None);
}

#[test]
fn cashflow_walks_back_over_custom_periods() {
    let (conn, session) = setup(Some(25));
    add(&conn, &session, "income", "2025-05-25", "3000000", "Salary");
    add(&conn, &session, "expense", "2025-06-24", "1000000", "Food");
    add(&conn, &session, "expense", "2025-05-24", "400000", "Food");

    let rows = reports::cashflow_rows(&conn, &session, 3).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].from, "2025-05-25");
    assert_eq!(rows[0].to, "2025-06-24");
    assert_eq!(rows[0].net, Decimal::from(2_000_000));
    assert_eq!(rows[1].from, "2025-04-25");
    assert_eq!(rows[1].expense, Decimal::from(400_000));
    assert_eq!(rows[2].income, Decimal::ZERO);
}

#[test]
fn category_totals_roll_up_into_parents() {
    let (conn, session) = setup(None);
    add(&conn, &session, "expense", "2025-06-02", "300000", "Power");
    add(&conn, &session, "expense", "2025-06-03", "50000", "Home");
    add(&conn, &session, "expense", "2025-06-04", "150000", "Food");
    add(&conn, &session, "expense", "2025-05-04", "999", "Food");

    let rows = categories::tree_rows(&conn, &session.current_period()).unwrap();
    let names: Vec<(usize, &str)> = rows.iter().map(|r| (r.depth, r.name.as_str())).collect();
    assert_eq!(names, vec![(0, "Food"), (0, "Home"), (1, "Power"), (0, "Salary")]);
    let home = &rows[1];
    assert_eq!(home.own_total, Decimal::from(50_000));
    assert_eq!(home.total, Decimal::from(350_000));
    assert_eq!(rows[0].total, Decimal::from(150_000));

    let shares = reports::category_shares(&conn, &session.current_period()).unwrap();
    assert_eq!(shares[0].category, "Power");
    assert_eq!(shares[0].share, Decimal::new(600, 1));
    assert_eq!(shares[1].category, "Food");
}

#[test]
fn category_parent_rules_are_enforced() {
    let (conn, session) = setup(None);
    let cycle = run(&conn, &session, &["category", "move", "--name", "Home", "--parent", "Power"]);
    assert!(cycle.is_err());
    let kinds = run(&conn, &session, &["category", "add", "--name", "Bonus", "--kind", "income", "--parent", "Home"]);
    assert!(kinds.is_err());
    run(&conn, &session, &["category", "move", "--name", "Power"]).unwrap();
    let tree = dompet::store::load_categories(&conn).unwrap();
    assert!(tree.values().all(|c| c.parent_id.is_none()));
}

#[test]
fn category_in_use_cannot_be_removed() {
    let (conn, session) = setup(None);
    add(&conn, &session, "expense", "2025-06-02", "45000", "Food");
    let err = run(&conn, &session, &["category", "rm", "--name", "Food"]).unwrap_err();
    assert!(format!("{:#}", err).contains("used by 1 transaction"), "{:#}", err);

    let rows = dompet::store::load_transactions(&conn, &dompet::store::TxFilter::default()).unwrap();
    let food = dompet::utils::id_for_category(&conn, "Food").unwrap();
    assert_eq!(rows[0].category_id, Some(food));
    assert!(dompet::commands::doctor::diagnose(&conn).unwrap().is_empty());

    // an unused parent goes, its child moves to the top level
    run(&conn, &session, &["category", "rm", "--name", "Home"]).unwrap();
    let tree = dompet::store::load_categories(&conn).unwrap();
    let power = tree.values().find(|c| c.name == "Power").unwrap();
    assert_eq!(power.parent_id, None);
    assert!(run(&conn, &session, &["category", "rm", "--name", "Home"]).is_err());
}
