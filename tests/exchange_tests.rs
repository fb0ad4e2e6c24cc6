// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use dompet::cli::build_cli;
use dompet::commands::{exporter, importer};
use dompet::context::Session;
use dompet::models::{CategoryKind, TxKind};
use dompet::store::{TxFilter, insert_account, insert_category, load_transactions};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::fs;
use tempfile::tempdir;

fn setup() -> (Connection, Session) {
    let conn = dompet::db::open_in_memory().unwrap();
    insert_account(&conn, "Bank", Decimal::ZERO).unwrap();
    insert_account(&conn, "Wallet", Decimal::ZERO).unwrap();
    insert_category(&conn, "Salary", CategoryKind::Income, None).unwrap();
    insert_category(&conn, "Food", CategoryKind::Expense, None).unwrap();
    let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
    (conn, Session::new("home", None, today))
}

const SAMPLE: &str = "\
date,kind,amount,amount_display,account,to_account,category,note
2025-06-01,income,5000000,Rp 5.000.000,Bank,,Salary,june pay
2025-06-02,expense,45000.50,Rp 45.001,Wallet,,Food,
2025-06-03,transfer,500000,Rp 500.000,Bank,Wallet,,top up
";

#[test]
fn import_then_export_keeps_rows() {
    let (mut conn, session) = setup();
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.csv");
    fs::write(&input, SAMPLE).unwrap();

    let n = importer::import_transactions(&mut conn, input.to_str().unwrap()).unwrap();
    assert_eq!(n, 3);
    let all = load_transactions(&conn, &TxFilter::default()).unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].kind, TxKind::Transfer);
    assert_eq!(all[1].amount, "45000.50".parse::<Decimal>().unwrap());
    assert_eq!(all[2].note.as_deref(), Some("june pay"));

    let out = dir.path().join("out.csv");
    let m = build_cli().get_matches_from([
        "dompet", "export", "transactions", "--format", "csv", "--out", out.to_str().unwrap(),
    ]);
    let (_, sub) = m.subcommand().unwrap();
    exporter::handle(&conn, &session, sub).unwrap();

    let written = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines[0], exporter::CSV_HEADER.join(","));
    assert_eq!(lines[1], "2025-06-01,income,5000000,Rp 5.000.000,Bank,,Salary,june pay");
    assert_eq!(lines[2], "2025-06-02,expense,45000.50,Rp 45.001,Wallet,,Food,");
    assert_eq!(lines[3], "2025-06-03,transfer,500000,Rp 500.000,Bank,Wallet,,top up");
}

#[test]
fn json_export_filters_by_period() {
    let (mut conn, session) = setup();
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.csv");
    fs::write(&input, SAMPLE.replace("2025-06-01", "2025-05-31")).unwrap();
    importer::import_transactions(&mut conn, input.to_str().unwrap()).unwrap();

    let out = dir.path().join("out.json");
    let m = build_cli().get_matches_from([
        "dompet", "export", "transactions", "--format", "json", "--out",
        out.to_str().unwrap(), "--period", "current",
    ]);
    let (_, sub) = m.subcommand().unwrap();
    exporter::handle(&conn, &session, sub).unwrap();

    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let items = v.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["kind"], "expense");
    assert_eq!(items[0]["amount_display"], "Rp 45.001");
    assert_eq!(items[1]["to_account"], "Wallet");
}

#[test]
fn bad_row_rolls_back_whole_import() {
    let (mut conn, _session) = setup();
    let dir = tempdir().unwrap();
    let input = dir.path().join("bad.csv");
    let bad = format!("{}2025-06-04,income,1000,,Bank,,Food,\n", SAMPLE);
    fs::write(&input, bad).unwrap();

    let err = importer::import_transactions(&mut conn, input.to_str().unwrap()).unwrap_err();
    assert!(format!("{:#}", err).contains("Line 5"), "{:#}", err);
    assert!(load_transactions(&conn, &TxFilter::default()).unwrap().is_empty());
}

#[test]
fn unknown_account_is_reported() {
    let (mut conn, _session) = setup();
    let dir = tempdir().unwrap();
    let input = dir.path().join("bad.csv");
    fs::write(
        &input,
        "date,kind,amount,account,category\n2025-06-01,expense,1000,Savings,Food\n",
    )
    .unwrap();
    let err = importer::import_transactions(&mut conn, input.to_str().unwrap()).unwrap_err();
    assert!(format!("{:#}", err).contains("Savings"));
}

#[test]
fn fractional_amounts_survive_export_and_import() {
    let (conn, session) = setup();
    let food = dompet::utils::id_for_category(&conn, "Food").unwrap();
    let bank = dompet::utils::id_for_account(&conn, "Bank").unwrap();
    for amount in ["1.500", "0.250", "2.125"] {
        dompet::store::insert_transaction(
            &conn,
            &dompet::models::Transaction {
                id: 0,
                kind: TxKind::Expense,
                amount: amount.parse().unwrap(),
                date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
                category_id: Some(food),
                account_id: bank,
                to_account_id: None,
                note: None,
            },
        )
        .unwrap();
    }
    let dir = tempdir().unwrap();
    let out = dir.path().join("out.csv");
    let m = build_cli().get_matches_from([
        "dompet", "export", "transactions", "--format", "csv", "--out", out.to_str().unwrap(),
    ]);
    let (_, sub) = m.subcommand().unwrap();
    exporter::handle(&conn, &session, sub).unwrap();

    let (mut fresh, _) = setup();
    importer::import_transactions(&mut fresh, out.to_str().unwrap()).unwrap();
    let mut before: Vec<Decimal> = load_transactions(&conn, &TxFilter::default())
        .unwrap()
        .into_iter()
        .map(|t| t.amount)
        .collect();
    let mut after: Vec<Decimal> = load_transactions(&fresh, &TxFilter::default())
        .unwrap()
        .into_iter()
        .map(|t| t.amount)
        .collect();
    before.sort();
    after.sort();
    assert_eq!(after, before);
    assert_eq!(after[0].to_string(), "0.250");
    assert_eq!(after[2], "2.125".parse::<Decimal>().unwrap());
}

#[test]
fn amount_column_rejects_negative_values() {
    let (mut conn, _session) = setup();
    let dir = tempdir().unwrap();
    let input = dir.path().join("neg.csv");
    fs::write(
        &input,
        "date,kind,amount,account,category\n2025-06-01,expense,-1000,Bank,Food\n",
    )
    .unwrap();
    assert!(importer::import_transactions(&mut conn, input.to_str().unwrap()).is_err());
    assert!(load_transactions(&conn, &TxFilter::default()).unwrap().is_empty());
}
