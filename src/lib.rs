// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod cache;
pub mod cli;
pub mod commands;
pub mod context;
pub mod currency;
pub mod db;
pub mod errors;
pub mod models;
pub mod notify;
pub mod period;
pub mod store;
pub mod summary;
pub mod tree;
pub mod utils;
pub mod validation;
