//! Process-local metrics, rendered in Prometheus text exposition format.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

/// Terminal outcome of one pass through the request gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Admitted,
    RateLimited,
    InvalidInput,
    BotRejected,
    Conflict,
}

impl GateOutcome {
    fn as_str(self) -> &'static str {
        match self {
            Self::Admitted => "admitted",
            Self::RateLimited => "rate_limited",
            Self::InvalidInput => "invalid_input",
            Self::BotRejected => "bot_rejected",
            Self::Conflict => "conflict",
        }
    }
}

#[derive(Default)]
struct ActionCounters {
    admitted: AtomicU64,
    rate_limited: AtomicU64,
    invalid_input: AtomicU64,
    bot_rejected: AtomicU64,
    conflict: AtomicU64,
}

impl ActionCounters {
    fn bump(&self, outcome: GateOutcome) {
        let counter = match outcome {
            GateOutcome::Admitted => &self.admitted,
            GateOutcome::RateLimited => &self.rate_limited,
            GateOutcome::InvalidInput => &self.invalid_input,
            GateOutcome::BotRejected => &self.bot_rejected,
            GateOutcome::Conflict => &self.conflict,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn get(&self, outcome: GateOutcome) -> u64 {
        let counter = match outcome {
            GateOutcome::Admitted => &self.admitted,
            GateOutcome::RateLimited => &self.rate_limited,
            GateOutcome::InvalidInput => &self.invalid_input,
            GateOutcome::BotRejected => &self.bot_rejected,
            GateOutcome::Conflict => &self.conflict,
        };
        counter.load(Ordering::Relaxed)
    }
}

const OUTCOMES: [GateOutcome; 5] = [
    GateOutcome::Admitted,
    GateOutcome::RateLimited,
    GateOutcome::InvalidInput,
    GateOutcome::BotRejected,
    GateOutcome::Conflict,
];

/// Metrics collector shared across handlers.
#[derive(Default)]
pub struct Metrics {
    gate: DashMap<&'static str, ActionCounters>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one gate outcome for an action.
    pub fn record_gate(&self, action: &'static str, outcome: GateOutcome) {
        self.gate.entry(action).or_default().bump(outcome);
    }

    pub fn gate_count(&self, action: &str, outcome: GateOutcome) -> u64 {
        self.gate.get(action).map_or(0, |c| c.get(outcome))
    }

    /// Renders the Prometheus text format body for `/metrics`.
    pub fn render(
        &self,
        users: usize,
        subscribers: usize,
        posts: usize,
        ratings: usize,
        active_sessions: usize,
        uptime_secs: u64,
    ) -> String {
        let mut out = String::with_capacity(1024);

        out.push_str("# HELP rankandplay_gate_requests_total Request gate outcomes per action\n");
        out.push_str("# TYPE rankandplay_gate_requests_total counter\n");
        let mut actions: Vec<_> = self.gate.iter().map(|e| *e.key()).collect();
        actions.sort_unstable();
        for action in actions {
            if let Some(counters) = self.gate.get(action) {
                for outcome in OUTCOMES {
                    out.push_str(&format!(
                        "rankandplay_gate_requests_total{{action=\"{}\",outcome=\"{}\"}} {}\n",
                        action,
                        outcome.as_str(),
                        counters.get(outcome),
                    ));
                }
            }
        }

        for (name, help, value) in [
            ("rankandplay_users", "Registered users", users),
            ("rankandplay_subscribers", "Newsletter subscribers", subscribers),
            ("rankandplay_posts", "Stored posts", posts),
            ("rankandplay_ratings", "Stored game ratings", ratings),
            ("rankandplay_active_sessions", "Active sessions", active_sessions),
        ] {
            out.push_str(&format!("# HELP {name} {help}\n# TYPE {name} gauge\n"));
            out.push_str(&format!("{name} {value}\n"));
        }

        out.push_str("# HELP rankandplay_uptime_seconds Server uptime\n");
        out.push_str("# TYPE rankandplay_uptime_seconds gauge\n");
        out.push_str(&format!("rankandplay_uptime_seconds {uptime_secs}\n"));

        out
    }
}
