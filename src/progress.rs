//! Run progress reporting on stderr.
//!
//! `forge run` reports discovery and each finished source so long runs are
//! observable. Output goes to stderr; stdout carries only the summary.

use std::io::Write;

#[derive(Clone, Debug)]
pub enum RunProgressEvent {
    /// Walking the input directory. Total unknown.
    Discovering { input_dir: String },
    /// `n` of `total` sources finished.
    Processed {
        n: u64,
        total: u64,
        source_name: String,
        status: &'static str,
    },
}

/// Receives progress events from the pipeline. Called from worker threads.
pub trait RunProgressReporter: Send + Sync {
    fn report(&self, event: RunProgressEvent);
}

/// `forge framework  12 / 1,204  guide.md  ok`
pub struct HumanProgress;

impl RunProgressReporter for HumanProgress {
    fn report(&self, event: RunProgressEvent) {
        let line = match &event {
            RunProgressEvent::Discovering { input_dir } => {
                format!("forge {}  discovering...\n", input_dir)
            }
            RunProgressEvent::Processed {
                n,
                total,
                source_name,
                status,
            } => format!(
                "forge  {} / {}  {}  {}\n",
                format_number(*n),
                format_number(*total),
                source_name,
                status
            ),
        };
        let mut err = std::io::stderr().lock();
        let _ = err.write_all(line.as_bytes());
        let _ = err.flush();
    }
}

/// One JSON object per line.
pub struct JsonProgress;

impl RunProgressReporter for JsonProgress {
    fn report(&self, event: RunProgressEvent) {
        let obj = match &event {
            RunProgressEvent::Discovering { input_dir } => serde_json::json!({
                "event": "progress",
                "phase": "discovering",
                "input_dir": input_dir,
            }),
            RunProgressEvent::Processed {
                n,
                total,
                source_name,
                status,
            } => serde_json::json!({
                "event": "progress",
                "phase": "processing",
                "n": n,
                "total": total,
                "source_name": source_name,
                "status": status,
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let mut err = std::io::stderr().lock();
            let _ = writeln!(err, "{}", line);
            let _ = err.flush();
        }
    }
}

pub struct NoProgress;

impl RunProgressReporter for NoProgress {
    fn report(&self, _event: RunProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Human when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn RunProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(HumanProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
