// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! `guardrail`: fails a CI run when a graph's degree distribution drifts from its baseline.

mod commands;

use std::process::ExitCode;

use clap::Parser;
use clap::Subcommand;
use shapedrift::drift::DriftStatus;
use shapedrift::error::Error;
use shapedrift::error::ErrorKind;
use tracing_subscriber::EnvFilter;

use crate::commands::BaselineArgs;
use crate::commands::CompareArgs;
use crate::commands::SummarizeArgs;

const EXIT_OK: u8 = 0;
const EXIT_DRIFT: u8 = 1;
// 2 is left to clap for usage errors.
const EXIT_INSUFFICIENT_DATA: u8 = 3;
const EXIT_MALFORMED_INPUT: u8 = 4;
const EXIT_INVALID_ARGUMENT: u8 = 5;
const EXIT_CANCELLED: u8 = 6;
const EXIT_IO: u8 = 7;
const EXIT_INTERNAL: u8 = 8;

#[derive(Parser, Debug)]
#[command(name = "guardrail", version, about)]
struct Command {
    /// Increase log verbosity on stderr (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    sub: SubCommand,
}

#[derive(Subcommand, Debug)]
enum SubCommand {
    /// Compare a window against a baseline and print the verdict as JSON.
    Compare(CompareArgs),
    /// Build a baseline sketch artifact from a degree stream.
    Baseline(BaselineArgs),
    /// Print sample, hubs and shape metrics of a degree stream as JSON.
    Summarize(SummarizeArgs),
}

fn main() -> ExitCode {
    let cmd = Command::parse();
    init_logging(cmd.verbose);

    let mut out = std::io::stdout().lock();
    let outcome = match cmd.sub {
        SubCommand::Compare(args) => match commands::compare(args, &mut out) {
            Ok(DriftStatus::Ok) => Ok(EXIT_OK),
            Ok(DriftStatus::Drift) => Ok(EXIT_DRIFT),
            Err(err) => Err(err),
        },
        SubCommand::Baseline(args) => commands::baseline(args, &mut out).map(|()| EXIT_OK),
        SubCommand::Summarize(args) => commands::summarize(args, &mut out).map(|()| EXIT_OK),
    };

    match outcome {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("guardrail: {err}");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn init_logging(verbose: u8) {
    let default_directive = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(default_directive),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn exit_code(err: &Error) -> u8 {
    match err.kind() {
        ErrorKind::InsufficientData => EXIT_INSUFFICIENT_DATA,
        ErrorKind::MalformedRecord | ErrorKind::InvalidData => EXIT_MALFORMED_INPUT,
        ErrorKind::InvalidThreshold | ErrorKind::InvalidArgument => EXIT_INVALID_ARGUMENT,
        ErrorKind::Cancelled => EXIT_CANCELLED,
        ErrorKind::Io => EXIT_IO,
        _ => EXIT_INTERNAL,
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_command_definition() {
        Command::command().debug_assert();
    }

    #[test]
    fn test_parse_compare() {
        let args = [
            "guardrail",
            "compare",
            "--baseline",
            "base.sketch",
            "--window",
            "window.jsonl",
            "--threshold-d",
            "0.2",
            "--threshold-p",
            "0.01",
        ];
        let cmd = Command::try_parse_from(args).unwrap();
        let SubCommand::Compare(args) = cmd.sub else {
            panic!("expected compare");
        };
        assert_eq!(args.threshold_d, 0.2);
        assert_eq!(args.threshold_p, 0.01);
        assert!(!args.gate_on_p);
    }

    #[test]
    fn test_log_base_below_two_rejected() {
        let result = Command::try_parse_from([
            "guardrail",
            "baseline",
            "--input",
            "a.jsonl",
            "--output",
            "a.sketch",
            "--log-base",
            "1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_summarize_reservoir() {
        let args = ["guardrail", "summarize", "--input", "a.jsonl"];
        let SubCommand::Summarize(summarize) = Command::try_parse_from(args).unwrap().sub else {
            panic!("expected summarize");
        };
        assert_eq!(summarize.reservoir_size, 0);

        let args = ["guardrail", "summarize", "--input", "a.jsonl", "--reservoir-size", "8"];
        let SubCommand::Summarize(summarize) = Command::try_parse_from(args).unwrap().sub else {
            panic!("expected summarize");
        };
        assert_eq!(summarize.reservoir_size, 8);
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let kinds = [
            ErrorKind::InsufficientData,
            ErrorKind::MalformedRecord,
            ErrorKind::InvalidThreshold,
            ErrorKind::Cancelled,
            ErrorKind::Io,
        ];
        let mut codes: Vec<u8> = kinds
            .iter()
            .map(|&kind| exit_code(&Error::new(kind, "x")))
            .collect();
        assert!(!codes.contains(&EXIT_OK));
        assert!(!codes.contains(&EXIT_DRIFT));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len());
    }
}
