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

use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use clap::ValueEnum;
use serde::Serialize;
use shapedrift::aggregate::AggregatorConfig;
use shapedrift::aggregate::StreamSummary;
use shapedrift::aggregate::process_degree_stream;
use shapedrift::cancel::CancelToken;
use shapedrift::drift::DEFAULT_THRESHOLD_D;
use shapedrift::drift::DEFAULT_THRESHOLD_P;
use shapedrift::drift::DriftDetector;
use shapedrift::drift::DriftStatus;
use shapedrift::drift::GateMode;
use shapedrift::error::Error;
use shapedrift::error::ErrorKind;
use shapedrift::hash::DEFAULT_SAMPLING_SEED;
use shapedrift::histogram::DEFAULT_LOG_BASE;
use shapedrift::histogram::LogBinSketch;
use shapedrift::record::DegreeRecord;
use shapedrift::record::DegreeRecordReader;
use shapedrift::record::KeyPolicy;
use shapedrift::sampling::Sample;
use shapedrift::shape::ShapeMetrics;
use tracing::info;

/// On-disk representation of a baseline or window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// A serialized LogBinSketch.
    Sketch,
    /// JSON lines with a `degree` field per record.
    Records,
}

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Baseline artifact.
    #[arg(long)]
    pub baseline: PathBuf,
    /// Current observation window.
    #[arg(long)]
    pub window: PathBuf,
    /// Maximum tolerated KS distance, in (0, 1].
    #[arg(long, default_value_t = DEFAULT_THRESHOLD_D)]
    pub threshold_d: f64,
    /// Significance level, in (0, 1]. Informational unless --gate-on-p is set.
    #[arg(long, default_value_t = DEFAULT_THRESHOLD_P)]
    pub threshold_p: f64,
    /// Also require p-value < threshold-p for a DRIFT verdict.
    #[arg(long)]
    pub gate_on_p: bool,
    /// How the baseline file is encoded.
    #[arg(long, value_enum, default_value_t = InputFormat::Sketch)]
    pub baseline_format: InputFormat,
    /// How the window file is encoded.
    #[arg(long, value_enum, default_value_t = InputFormat::Records)]
    pub window_format: InputFormat,
    /// Histogram base for record inputs. A sketch baseline's own base wins for the window.
    #[arg(long, default_value_t = DEFAULT_LOG_BASE)]
    #[arg(value_parser = clap::value_parser!(u32).range(2..))]
    pub log_base: u32,
    /// Abort stream passes after this many seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

#[derive(Args, Debug)]
pub struct BaselineArgs {
    /// Degree stream (JSON lines).
    #[arg(long)]
    pub input: PathBuf,
    /// Where to write the serialized sketch.
    #[arg(long)]
    pub output: PathBuf,
    /// Histogram base stored in the artifact, at least 2.
    #[arg(long, default_value_t = DEFAULT_LOG_BASE)]
    #[arg(value_parser = clap::value_parser!(u32).range(2..))]
    pub log_base: u32,
    /// Abort the stream pass after this many seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

#[derive(Args, Debug)]
pub struct SummarizeArgs {
    /// Degree stream (JSON lines).
    #[arg(long)]
    pub input: PathBuf,
    /// Bottom-k sample size.
    #[arg(long, default_value_t = 1024)]
    pub sample_size: usize,
    /// Number of top hubs to report.
    #[arg(long, default_value_t = 10)]
    pub hubs: usize,
    /// Seed for the sampling hash and the reservoir.
    #[arg(long, default_value_t = DEFAULT_SAMPLING_SEED)]
    pub seed: u64,
    /// Fraction of largest degrees used for the mass concentration metric.
    #[arg(long, default_value_t = 0.01)]
    pub top_percent: f64,
    /// Histogram base, at least 2.
    #[arg(long, default_value_t = DEFAULT_LOG_BASE)]
    #[arg(value_parser = clap::value_parser!(u32).range(2..))]
    pub log_base: u32,
    /// Size of an extra uniform reservoir sample. Depends on record order; 0 disables it.
    #[arg(long, default_value_t = 0)]
    pub reservoir_size: usize,
    /// Accept records without a key, keyed by line number instead.
    #[arg(long)]
    pub allow_missing_keys: bool,
    /// Abort the stream pass after this many seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

pub fn compare(args: CompareArgs, out: &mut dyn Write) -> Result<DriftStatus, Error> {
    let gate = if args.gate_on_p {
        GateMode::DistanceAndSignificance
    } else {
        GateMode::DistanceOnly
    };
    // Thresholds are validated before any input is read.
    let detector = DriftDetector::builder()
        .threshold_d(args.threshold_d)
        .threshold_p(args.threshold_p)
        .gate(gate)
        .build()?;
    let cancel = cancel_token(args.timeout_secs);

    let baseline_format = args.baseline_format;
    let baseline = load_sketch(&args.baseline, baseline_format, args.log_base, &cancel)?;
    let window_base = baseline.log_base();
    let window = load_sketch(&args.window, args.window_format, window_base, &cancel)?;
    info!(
        baseline_n = baseline.n(),
        window_n = window.n(),
        "comparing degree distributions"
    );

    let result = detector.check(&baseline, &window)?;
    emit(out, &result)?;
    Ok(result.status)
}

pub fn baseline(args: BaselineArgs, out: &mut dyn Write) -> Result<(), Error> {
    let cancel = cancel_token(args.timeout_secs);
    let sketch = load_sketch(&args.input, InputFormat::Records, args.log_base, &cancel)?;
    if let Err(err) = fs::write(&args.output, sketch.serialize()) {
        let err = Error::new(ErrorKind::Io, "failed to write baseline").set_source(err);
        return Err(err.with_context("path", args.output.display()));
    }
    info!(path = %args.output.display(), n = sketch.n(), "baseline written");
    let report = BaselineReport {
        output: &args.output,
        n: sketch.n(),
        bins: sketch.num_bins(),
        log_base: sketch.log_base(),
    };
    emit(out, &report)
}

pub fn summarize(args: SummarizeArgs, out: &mut dyn Write) -> Result<(), Error> {
    let cancel = cancel_token(args.timeout_secs);
    let config = AggregatorConfig::builder()
        .sample_size(args.sample_size)
        .hub_count(args.hubs)
        .seed(args.seed)
        .log_base(args.log_base)
        .reservoir_size(args.reservoir_size)
        .build();
    let policy = if args.allow_missing_keys {
        KeyPolicy::LineOrdinal
    } else {
        KeyPolicy::Required
    };
    let summary = aggregate_file(&args.input, policy, &config, &cancel)?;
    emit(out, &SummaryReport::new(&summary, args.top_percent))
}

#[derive(Serialize)]
struct BaselineReport<'a> {
    output: &'a Path,
    n: u64,
    bins: usize,
    log_base: u32,
}

#[derive(Serialize)]
struct SummaryReport<'a> {
    count: u64,
    total_degree_sum: u128,
    mean_degree: f64,
    sample_shape: ShapeMetrics,
    sketch_shape: ShapeMetrics,
    cdf: Vec<(u32, f64)>,
    top_hubs: &'a [DegreeRecord],
    sample: &'a Sample,
    reservoir: &'a [DegreeRecord],
}

impl<'a> SummaryReport<'a> {
    fn new(summary: &'a StreamSummary, top_percent: f64) -> Self {
        Self {
            count: summary.count(),
            total_degree_sum: summary.total_degree_sum(),
            mean_degree: summary.mean_degree(),
            sample_shape: ShapeMetrics::from_sample(summary.sample(), top_percent),
            sketch_shape: ShapeMetrics::from_sketch(summary.sketch(), top_percent),
            cdf: summary.sketch().cdf(),
            top_hubs: summary.top_hubs(),
            sample: summary.sample(),
            reservoir: summary.reservoir(),
        }
    }
}

fn cancel_token(timeout_secs: Option<u64>) -> CancelToken {
    match timeout_secs {
        Some(secs) => CancelToken::with_timeout(Duration::from_secs(secs)),
        None => CancelToken::new(),
    }
}

fn load_sketch(
    path: &Path,
    format: InputFormat,
    log_base: u32,
    cancel: &CancelToken,
) -> Result<LogBinSketch, Error> {
    match format {
        InputFormat::Sketch => {
            let bytes = match fs::read(path) {
                Ok(bytes) => bytes,
                Err(err) => {
                    let err = Error::new(ErrorKind::Io, "failed to read sketch").set_source(err);
                    return Err(err.with_context("path", path.display()));
                }
            };
            let sketch = LogBinSketch::deserialize(&bytes);
            sketch.map_err(|err| err.with_context("path", path.display()))
        }
        InputFormat::Records => {
            // Identity is irrelevant for the histogram, so keys are optional here.
            let config = AggregatorConfig::builder()
                .sample_size(0)
                .hub_count(0)
                .log_base(log_base)
                .build();
            let summary = aggregate_file(path, KeyPolicy::LineOrdinal, &config, cancel)?;
            Ok(summary.into_sketch())
        }
    }
}

fn aggregate_file(
    path: &Path,
    policy: KeyPolicy,
    config: &AggregatorConfig,
    cancel: &CancelToken,
) -> Result<StreamSummary, Error> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            let err = Error::new(ErrorKind::Io, "failed to open degree stream").set_source(err);
            return Err(err.with_context("path", path.display()));
        }
    };
    let reader = DegreeRecordReader::with_policy(BufReader::new(file), policy);
    process_degree_stream(reader, config, cancel)
        .map_err(|err| err.with_context("path", path.display()))
}

fn emit<T: Serialize>(out: &mut dyn Write, value: &T) -> Result<(), Error> {
    let json = serde_json::to_string(value).map_err(|err| {
        Error::new(ErrorKind::InvalidData, "failed to encode output").set_source(err)
    })?;
    writeln!(out, "{json}")
        .map_err(|err| Error::new(ErrorKind::Io, "failed to write output").set_source(err))
}

#[cfg(test)]
mod tests {
    use std::io;

    use serde_json::Value;
    use tempfile::TempDir;

    use super::*;
    use crate::exit_code;

    fn write_records(dir: &TempDir, name: &str, degrees: &[u64]) -> PathBuf {
        let mut lines = String::new();
        for (i, degree) in degrees.iter().enumerate() {
            let line = format!("{{\"key\": \"n{i}\", \"degree\": {degree}}}\n");
            lines.push_str(&line);
        }
        write_file(dir, name, lines.as_bytes())
    }

    fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn compare_args(baseline: &Path, window: &Path) -> CompareArgs {
        CompareArgs {
            baseline: baseline.to_path_buf(),
            window: window.to_path_buf(),
            threshold_d: DEFAULT_THRESHOLD_D,
            threshold_p: DEFAULT_THRESHOLD_P,
            gate_on_p: false,
            baseline_format: InputFormat::Records,
            window_format: InputFormat::Records,
            log_base: DEFAULT_LOG_BASE,
            timeout_secs: None,
        }
    }

    fn sketch_of(degrees: &[u64], log_base: u32) -> LogBinSketch {
        let mut sketch = LogBinSketch::builder().log_base(log_base).build();
        for &degree in degrees {
            sketch.update(degree);
        }
        sketch
    }

    fn output_json(out: Vec<u8>) -> Value {
        serde_json::from_slice(&out).unwrap()
    }

    #[test]
    fn test_compare_reports_drift() {
        let dir = tempfile::tempdir().unwrap();
        let baseline = write_records(&dir, "base.jsonl", &[1; 200]);
        let window = write_records(&dir, "window.jsonl", &[5_000; 200]);

        let mut out = Vec::new();
        let status = compare(compare_args(&baseline, &window), &mut out).unwrap();
        assert_eq!(status, DriftStatus::Drift);
        let json = output_json(out);
        assert_eq!(json["status"], "DRIFT");
        assert_eq!(json["d"], 1.0);

        let mut out = Vec::new();
        let status = compare(compare_args(&baseline, &baseline), &mut out).unwrap();
        assert_eq!(status, DriftStatus::Ok);
        assert_eq!(output_json(out)["status"], "OK");
    }

    #[test]
    fn test_compare_empty_window_is_insufficient_data() {
        let dir = tempfile::tempdir().unwrap();
        let baseline = write_records(&dir, "base.jsonl", &[1, 2, 3]);
        let window = write_file(&dir, "window.jsonl", b"\n\n");

        let mut out = Vec::new();
        let err = compare(compare_args(&baseline, &window), &mut out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
        assert_eq!(exit_code(&err), 3);
        assert!(out.is_empty());
    }

    #[test]
    fn test_compare_bad_input_exits_four() {
        let dir = tempfile::tempdir().unwrap();
        let baseline = write_records(&dir, "base.jsonl", &[1, 2, 3]);
        let window = write_file(&dir, "window.jsonl", b"{\"degree\": 1}\n{\"degree\": -2}\n");
        let err = compare(compare_args(&baseline, &window), &mut io::sink()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedRecord);
        assert_eq!(exit_code(&err), 4);

        let corrupt = write_file(&dir, "base.sketch", b"not a sketch");
        let mut args = compare_args(&corrupt, &baseline);
        args.baseline_format = InputFormat::Sketch;
        let err = compare(args, &mut io::sink()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
        assert_eq!(exit_code(&err), 4);
    }

    #[test]
    fn test_compare_rejects_threshold_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.jsonl");
        for (threshold_d, threshold_p) in [(0.0, 0.05), (1.5, 0.05), (0.1, f64::NAN)] {
            let mut args = compare_args(&missing, &missing);
            args.threshold_d = threshold_d;
            args.threshold_p = threshold_p;
            let err = compare(args, &mut io::sink()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidThreshold);
            assert_eq!(exit_code(&err), 5);
        }
    }

    #[test]
    fn test_compare_missing_file_is_io() {
        let dir = tempfile::tempdir().unwrap();
        let baseline = write_records(&dir, "base.jsonl", &[1, 2, 3]);
        let missing = dir.path().join("missing.jsonl");
        let err = compare(compare_args(&baseline, &missing), &mut io::sink()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(exit_code(&err), 7);
    }

    #[test]
    fn test_sketch_baseline_base_wins_for_window() {
        let dir = tempfile::tempdir().unwrap();
        let degrees = [0, 3, 9, 27, 99, 1_000, 12, 12, 48];
        let base_ten = sketch_of(&degrees, 10);
        let baseline = write_file(&dir, "base.sketch", &base_ten.serialize());
        let window = write_records(&dir, "window.jsonl", &degrees);

        let mut args = compare_args(&baseline, &window);
        args.baseline_format = InputFormat::Sketch;
        args.log_base = 2;
        let mut out = Vec::new();
        let status = compare(args, &mut out).unwrap();
        assert_eq!(status, DriftStatus::Ok);
        assert_eq!(output_json(out)["d"], 0.0);
    }

    #[test]
    fn test_baseline_artifact_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let degrees = [4, 8, 15, 16, 23, 42];
        let input = write_records(&dir, "base.jsonl", &degrees);
        let output = dir.path().join("base.sketch");
        let args = BaselineArgs {
            input,
            output: output.clone(),
            log_base: 3,
            timeout_secs: None,
        };

        let mut out = Vec::new();
        baseline(args, &mut out).unwrap();
        let report = output_json(out);
        assert_eq!(report["n"], 6);
        assert_eq!(report["log_base"], 3);

        let bytes = fs::read(&output).unwrap();
        let restored = LogBinSketch::deserialize(&bytes).unwrap();
        assert_eq!(restored, sketch_of(&degrees, 3));
    }

    #[test]
    fn test_summarize_reports_reservoir() {
        let dir = tempfile::tempdir().unwrap();
        let degrees: Vec<u64> = (1..=300).collect();
        let input = write_records(&dir, "window.jsonl", &degrees);
        let args = SummarizeArgs {
            input,
            sample_size: 50,
            hubs: 3,
            seed: DEFAULT_SAMPLING_SEED,
            top_percent: 0.01,
            log_base: DEFAULT_LOG_BASE,
            reservoir_size: 25,
            allow_missing_keys: false,
            timeout_secs: None,
        };

        let mut out = Vec::new();
        summarize(args, &mut out).unwrap();
        let report = output_json(out);
        assert_eq!(report["count"], 300);
        assert_eq!(report["top_hubs"][0]["degree"], 300);
        assert_eq!(report["reservoir"].as_array().unwrap().len(), 25);
    }
}
