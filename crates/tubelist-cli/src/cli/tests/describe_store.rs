//! Tests for describe and store subcommands.

use super::parse;
use crate::cli::{Cli, CliCommand, StoreAction};
use clap::Parser;

#[test]
fn cli_parse_describe_many() {
    match parse(&["tubelist", "describe", "dQw4w9WgXcQ", "abc-_123"]) {
        CliCommand::Describe { ids } => assert_eq!(ids, ["dQw4w9WgXcQ", "abc-_123"]),
        _ => panic!("expected Describe"),
    }
}

#[test]
fn cli_parse_describe_requires_an_id() {
    assert!(Cli::try_parse_from(["tubelist", "describe"]).is_err());
}

#[test]
fn cli_parse_store_actions() {
    for (arg, want) in [
        ("stats", StoreAction::Stats),
        ("prune", StoreAction::Prune),
        ("clear", StoreAction::Clear),
    ] {
        match parse(&["tubelist", "store", arg]) {
            CliCommand::Store { action } => assert_eq!(action, want),
            _ => panic!("expected Store"),
        }
    }
    assert!(Cli::try_parse_from(["tubelist", "store", "vacuum"]).is_err());
}
