use std::fmt::Write;

use unicode_width::UnicodeWidthStr;

use crate::format::{format_bytes, or_unknown, truncate_unicode};
use crate::system::snapshot::{CpuStats, DiskStats, MemoryStats, ProcessStats, Snapshot};

const RULE_WIDTH: usize = 60;
const NAME_COLUMN: usize = 25;
const NAME_MAX_WIDTH: usize = 22;

/// Renders the human-readable report. No trailing newline.
pub fn render_text(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    render_header(&mut out, snapshot);
    render_cpu(&mut out, &snapshot.cpu);
    render_memory(&mut out, &snapshot.memory);
    render_disks(&mut out, &snapshot.disks);
    render_processes(&mut out, snapshot);
    let _ = write!(out, "{}", "=".repeat(RULE_WIDTH));
    out
}

pub fn render_json(snapshot: &Snapshot) -> serde_json::Result<String> {
    serde_json::to_string_pretty(snapshot)
}

fn render_header(out: &mut String, snapshot: &Snapshot) {
    let rule = "=".repeat(RULE_WIDTH);
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "SYSTEM RESOURCE MONITOR");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(
        out,
        "Platform: {}",
        or_unknown(snapshot.host.os.clone(), |os| os)
    );
    if let Some(hostname) = &snapshot.host.hostname {
        let _ = writeln!(out, "Host: {hostname}");
    }
    let _ = writeln!(out, "Architecture: {}", snapshot.host.arch);
    let _ = writeln!(
        out,
        "Captured: {}",
        snapshot.timestamp.format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(out, "{rule}");
}

fn render_cpu(out: &mut String, cpu: &CpuStats) {
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "CPU Usage: {} ({} physical, {} logical cores)",
        or_unknown(cpu.usage_percent, |v| format!("{v:.1}%")),
        cpu.physical_cores,
        cpu.logical_cores
    );
    if let Some(temp) = cpu.temperature_c {
        let _ = writeln!(out, "Temperature: {temp:.0}°C");
    }
    let _ = writeln!(
        out,
        "Frequency: {}",
        or_unknown(cpu.frequency_mhz, |mhz| format!("{mhz:.0} MHz"))
    );
}

fn render_memory(out: &mut String, memory: &MemoryStats) {
    let bytes = |v: Option<u64>| or_unknown(v, format_bytes);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Memory: {} / {} ({})",
        bytes(memory.used_bytes),
        bytes(memory.total_bytes),
        or_unknown(memory.percent, |p| format!("{p:.1}%"))
    );
    let _ = writeln!(out, "Available: {}", bytes(memory.available_bytes));
    if let Some(swap_total) = memory.swap_total_bytes.filter(|&t| t > 0) {
        let _ = writeln!(
            out,
            "Swap: {} / {} ({})",
            bytes(memory.swap_used_bytes),
            format_bytes(swap_total),
            or_unknown(memory.swap_percent, |p| format!("{p:.1}%"))
        );
    }
}

fn render_disks(out: &mut String, disks: &[DiskStats]) {
    let _ = writeln!(out);
    let _ = writeln!(out, "Disk Usage:");
    if disks.is_empty() {
        let _ = writeln!(out, "   Unknown");
    }
    for disk in disks {
        let _ = writeln!(out, "   {} ({})", disk.device, disk.mountpoint);
        let _ = writeln!(
            out,
            "   {} / {} ({:.1}%)",
            format_bytes(disk.used_bytes),
            format_bytes(disk.total_bytes),
            disk.percent
        );
    }
}

fn render_processes(out: &mut String, snapshot: &Snapshot) {
    let _ = writeln!(out);
    if snapshot.processes.is_empty() {
        let _ = writeln!(out, "No active processes found!");
        return;
    }

    let _ = writeln!(
        out,
        "{:<4}{}{:>8}{:>12}{:>10}",
        "",
        pad_display("Process", NAME_COLUMN),
        "CPU %",
        "Memory (MB)",
        "PID"
    );
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
    for (rank, process) in snapshot.processes.iter().enumerate() {
        render_process_row(out, rank + 1, process);
    }
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
    let _ = writeln!(
        out,
        "{:>29}{:>7.1}%{:>12.1} MB",
        "Total:", snapshot.process_totals.cpu_percent, snapshot.process_totals.memory_mb
    );
    if snapshot.process_count > snapshot.processes.len() {
        let _ = writeln!(
            out,
            "Top {} of {} processes shown",
            snapshot.processes.len(),
            snapshot.process_count
        );
    }
}

fn render_process_row(out: &mut String, rank: usize, process: &ProcessStats) {
    let name = truncate_unicode(&process.name, NAME_MAX_WIDTH);
    let _ = writeln!(
        out,
        "{rank:2}. {}{:>7.1}%{:>12.1}{:>10}",
        pad_display(&name, NAME_COLUMN),
        process.cpu_percent,
        process.memory_mb,
        process.pid
    );
}

/// Left-aligns by display width, which `{:<n}` does not account for.
fn pad_display(s: &str, width: usize) -> String {
    let pad = width.saturating_sub(s.width());
    format!("{s}{}", " ".repeat(pad))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_names_are_padded_by_display_width() {
        let padded = pad_display("日本", 6);
        assert_eq!(padded.width(), 6);
        assert_eq!(padded, "日本  ");
    }
}
