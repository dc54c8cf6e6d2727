use std::cmp::Ordering;

use super::snapshot::{ProcessStats, ProcessTotals};

const BYTES_PER_MB: f64 = 1_048_576.0;
const EXECUTABLE_SUFFIX: &str = ".exe";

/// Kernel and idle pseudo-processes that would only inflate the totals.
pub const DEFAULT_DENYLIST: [&str; 3] = ["system", "system idle process", "system interrupts"];

/// A process as collected, before normalization.
#[derive(Clone, Debug, PartialEq)]
pub struct RawProcess {
    pub pid: u32,
    pub name: String,
    pub cpu_busy_percent: f64,
    pub rss_bytes: u64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ranking {
    pub top: Vec<ProcessStats>,
    /// Sums over every process that survived filtering, not just `top`.
    pub totals: ProcessTotals,
    pub considered: usize,
}

#[derive(Clone, Debug)]
pub struct ProcessRanker {
    denylist: Vec<String>,
}

impl Default for ProcessRanker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRanker {
    pub fn new() -> Self {
        Self::with_hidden(std::iter::empty::<&str>())
    }

    /// Ranker that also hides `extra` names, matched like the built-in denylist.
    pub fn with_hidden<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut denylist: Vec<String> = DEFAULT_DENYLIST.iter().map(|s| s.to_string()).collect();
        for name in extra {
            let name = name.as_ref().trim().to_lowercase();
            if !name.is_empty() && !denylist.contains(&name) {
                denylist.push(name);
            }
        }
        ProcessRanker { denylist }
    }

    pub fn is_hidden(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.denylist.iter().any(|d| *d == lower)
    }

    pub fn rank(&self, raw: Vec<RawProcess>, limit: usize) -> Ranking {
        let _span = tracing::debug_span!("ranker.rank").entered();

        let mut ranked: Vec<ProcessStats> = raw
            .into_iter()
            .map(normalize)
            .filter(|p| !self.is_hidden(&p.name))
            .collect();

        let totals = ranked.iter().fold(ProcessTotals::default(), |acc, p| ProcessTotals {
            cpu_percent: acc.cpu_percent + p.cpu_percent,
            memory_mb: acc.memory_mb + p.memory_mb,
        });
        let considered = ranked.len();

        ranked.sort_by(compare_rank);
        ranked.truncate(limit);

        Ranking {
            top: ranked,
            totals,
            considered,
        }
    }
}

fn normalize(raw: RawProcess) -> ProcessStats {
    ProcessStats {
        pid: raw.pid,
        name: strip_executable_suffix(&raw.name).to_string(),
        cpu_percent: round_1(raw.cpu_busy_percent),
        memory_mb: round_1(raw.rss_bytes as f64 / BYTES_PER_MB),
    }
}

fn strip_executable_suffix(name: &str) -> &str {
    let cut = name.len().saturating_sub(EXECUTABLE_SUFFIX.len());
    match name.get(cut..) {
        Some(tail) if cut > 0 && tail.eq_ignore_ascii_case(EXECUTABLE_SUFFIX) => &name[..cut],
        _ => name,
    }
}

/// CPU descending, then pid ascending so equal loads order deterministically.
fn compare_rank(a: &ProcessStats, b: &ProcessStats) -> Ordering {
    b.cpu_percent
        .total_cmp(&a.cpu_percent)
        .then_with(|| a.pid.cmp(&b.pid))
}

fn round_1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pid: u32, name: &str, cpu: f64, rss: u64) -> RawProcess {
        RawProcess {
            pid,
            name: name.to_string(),
            cpu_busy_percent: cpu,
            rss_bytes: rss,
        }
    }

    #[test]
    fn normalizes_names_memory_and_cpu() {
        let ranking = ProcessRanker::new().rank(
            vec![raw(4, "chrome.EXE", 12.34, 3 * 1_048_576 + 524_288)],
            10,
        );
        let p = &ranking.top[0];
        assert_eq!(p.name, "chrome");
        assert_eq!(p.cpu_percent, 12.3);
        assert_eq!(p.memory_mb, 3.5);
    }

    #[test]
    fn bare_suffix_is_not_stripped_to_nothing() {
        assert_eq!(strip_executable_suffix(".exe"), ".exe");
        assert_eq!(strip_executable_suffix("bash"), "bash");
        assert_eq!(strip_executable_suffix("ls"), "ls");
        assert_eq!(strip_executable_suffix("naïve.exe"), "naïve");
    }

    #[test]
    fn denylisted_names_are_excluded_from_top_and_totals() {
        let ranking = ProcessRanker::new().rank(
            vec![
                raw(0, "System Idle Process", 95.0, 0),
                raw(4, "System", 3.0, 1_048_576),
                raw(8, "SYSTEM INTERRUPTS", 1.0, 0),
                raw(100, "editor", 2.0, 2 * 1_048_576),
            ],
            10,
        );
        assert_eq!(ranking.top.len(), 1);
        assert_eq!(ranking.top[0].pid, 100);
        assert_eq!(ranking.totals.cpu_percent, 2.0);
        assert_eq!(ranking.totals.memory_mb, 2.0);
        assert_eq!(ranking.considered, 1);
    }

    #[test]
    fn configured_names_extend_the_denylist() {
        let ranker = ProcessRanker::with_hidden(["  Kworker ", ""]);
        assert!(ranker.is_hidden("kworker"));
        assert!(ranker.is_hidden("System"));
        assert!(!ranker.is_hidden(""));
    }

    #[test]
    fn totals_cover_processes_beyond_the_limit() {
        let ranking = ProcessRanker::new().rank(
            vec![
                raw(1, "a", 10.0, 1_048_576),
                raw(2, "b", 20.0, 1_048_576),
                raw(3, "c", 30.0, 1_048_576),
            ],
            1,
        );
        assert_eq!(ranking.top.len(), 1);
        assert_eq!(ranking.top[0].pid, 3);
        assert!((ranking.totals.cpu_percent - 60.0).abs() < 1e-9);
        assert!((ranking.totals.memory_mb - 3.0).abs() < 1e-9);
    }

    #[test]
    fn ties_break_on_ascending_pid() {
        let ranking = ProcessRanker::new().rank(
            vec![
                raw(30, "c", 5.0, 0),
                raw(10, "a", 5.0, 0),
                raw(20, "b", 5.04, 0),
                raw(5, "z", 7.5, 0),
            ],
            10,
        );
        let pids: Vec<u32> = ranking.top.iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![5, 10, 20, 30]);
    }

    #[test]
    fn zero_limit_keeps_totals() {
        let ranking = ProcessRanker::new().rank(vec![raw(1, "a", 1.0, 0)], 0);
        assert!(ranking.top.is_empty());
        assert_eq!(ranking.totals.cpu_percent, 1.0);
    }
}
