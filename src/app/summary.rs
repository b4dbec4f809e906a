//! End-of-run summary

use crate::app::host::HostOutcome;
use crate::app::simulator::ProducerTally;
use crate::core::version::{callback_abi_version, git_hash};
use crate::queue::api::QueueStats;
use colored::Colorize;
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub version: &'static str,
    pub callback_abi: u32,
    pub git_hash: &'static str,
    pub interrupted: bool,
    pub library: ProducerTally,
    pub host: HostOutcome,
}

impl RunSummary {
    pub fn new(library: ProducerTally, host: HostOutcome, interrupted: bool) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            callback_abi: callback_abi_version(),
            git_hash: git_hash(),
            interrupted,
            library,
            host,
        }
    }

    /// Delivery reports that were queued but never reached the host
    pub fn reports_lost(&self) -> usize {
        let dispatched = self.host.dispatch.delivered + self.host.dispatch.failed;
        self.library.with_token.saturating_sub(dispatched)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn render_text(&self, use_color: bool) -> String {
        let heading = |text: &str| {
            if use_color {
                text.bold().to_string()
            } else {
                text.to_string()
            }
        };
        let mut out = String::new();

        let _ = writeln!(
            out,
            "{} (abi {}, {})",
            heading(&format!("kafka-bridge {}", self.version)),
            self.callback_abi,
            self.git_hash
        );
        if self.interrupted {
            let note = "run interrupted by signal";
            let _ = writeln!(out, "{}", if use_color { note.yellow().to_string() } else { note.to_string() });
        }

        let _ = writeln!(out, "{}", heading("Library"));
        let _ = writeln!(out, "  produced        {}", self.library.produced);
        let _ = writeln!(out, "  with token      {}", self.library.with_token);
        let _ = writeln!(out, "  failed reports  {}", self.library.failed_reports);
        let _ = writeln!(out, "  errors raised   {}", self.library.errors_raised);

        let dispatch = &self.host.dispatch;
        let _ = writeln!(out, "{}", heading("Host"));
        let _ = writeln!(out, "  polls           {}", dispatch.polls);
        let _ = writeln!(out, "  logs            {}", dispatch.logs);
        let _ = writeln!(out, "  errors          {}", dispatch.errors);
        let _ = writeln!(out, "  delivered       {}", dispatch.delivered);
        let failed = dispatch.failed.to_string();
        let _ = writeln!(
            out,
            "  failed          {}",
            if use_color && dispatch.failed > 0 { failed.red().to_string() } else { failed }
        );
        let _ = writeln!(out, "  unclaimed       {}", dispatch.unclaimed);

        let _ = writeln!(out, "{}", heading("Queues"));
        for (name, stats) in [
            ("log", self.host.log_queue),
            ("error", self.host.error_queue),
            ("delivery", self.host.delivery_queue),
        ] {
            let _ = writeln!(out, "  {:<9} {}", name, describe_queue(stats));
        }

        let teardown = &self.host.teardown;
        let _ = writeln!(out, "{}", heading("Teardown"));
        let _ = writeln!(out, "  events dropped  {}", teardown.events_dropped());
        let _ = write!(out, "  callbacks freed {}", teardown.callbacks_released);
        out
    }
}

fn describe_queue(stats: Option<QueueStats>) -> String {
    match stats {
        Some(stats) => format!(
            "pushed {}, popped {}, rejected {}, drained {}",
            stats.pushed, stats.popped, stats.rejected, stats.drained
        ),
        None => "disabled".to_string(),
    }
}
