use std::collections::{BTreeMap, HashMap};
use std::io::{self, Write};
use std::path::Path;

use crate::config::abbreviate_home;
use crate::transcript::record::SessionRecord;
use crate::transcript::truncate;

const RULE_WIDTH: usize = 60;
const TOP_SESSIONS: usize = 5;
const SAMPLES_PER_SESSION: usize = 2;
const SAMPLE_DISPLAY_LEN: usize = 80;
const UNKNOWN_PROJECT: &str = "unknown";

/// Cross-session statistics, ready to print.
#[derive(Debug, Default, PartialEq)]
pub struct SummaryReport {
    pub session_count: usize,
    pub total_duration_minutes: f64,
    pub total_tool_calls: u64,
    pub total_errors: u64,
    pub tool_usage: Vec<(String, u64)>,
    pub projects: Vec<ProjectGroup>,
    pub longest: Vec<SessionLine>,
    pub most_errors: Vec<ErrorLine>,
}

#[derive(Debug, PartialEq)]
pub struct ProjectGroup {
    pub label: String,
    pub sessions: usize,
    pub duration_minutes: f64,
}

#[derive(Debug, PartialEq)]
pub struct SessionLine {
    pub duration_minutes: f64,
    pub project: String,
}

#[derive(Debug, PartialEq)]
pub struct ErrorLine {
    pub count: u64,
    pub project: String,
    pub samples: Vec<String>,
}

impl SummaryReport {
    /// Aggregate records. `home` is abbreviated to `~` in project labels.
    pub fn build(records: &[SessionRecord], home: Option<&Path>) -> Self {
        let display = |project: &Option<String>| {
            project
                .as_deref()
                .map(|p| abbreviate_home(p, home))
                .unwrap_or_default()
        };

        let mut all_tools: BTreeMap<&str, u64> = BTreeMap::new();
        for record in records {
            for (tool, count) in &record.tool_counts {
                *all_tools.entry(tool.as_str()).or_insert(0) += count;
            }
        }
        let mut tool_usage: Vec<(String, u64)> = all_tools
            .into_iter()
            .map(|(tool, count)| (tool.to_string(), count))
            .collect();
        tool_usage.sort_by(|a, b| b.1.cmp(&a.1));

        let mut projects: Vec<ProjectGroup> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for record in records {
            let label = match record.project.as_deref() {
                Some(p) if !p.is_empty() => abbreviate_home(p, home),
                _ => UNKNOWN_PROJECT.to_string(),
            };
            let slot = *index.entry(label.clone()).or_insert_with(|| {
                projects.push(ProjectGroup {
                    label,
                    sessions: 0,
                    duration_minutes: 0.0,
                });
                projects.len() - 1
            });
            projects[slot].sessions += 1;
            projects[slot].duration_minutes += record.minutes();
        }
        projects.sort_by(|a, b| b.sessions.cmp(&a.sessions));

        let mut by_duration: Vec<&SessionRecord> = records.iter().collect();
        by_duration.sort_by(|a, b| b.minutes().total_cmp(&a.minutes()));
        let longest = by_duration
            .into_iter()
            .take(TOP_SESSIONS)
            .map(|r| SessionLine {
                duration_minutes: r.minutes(),
                project: display(&r.project),
            })
            .collect();

        let mut by_errors: Vec<&SessionRecord> = records.iter().collect();
        by_errors.sort_by(|a, b| b.errors.count.cmp(&a.errors.count));
        let most_errors = by_errors
            .into_iter()
            .take(TOP_SESSIONS)
            .take_while(|r| r.errors.count > 0)
            .map(|r| ErrorLine {
                count: r.errors.count,
                project: display(&r.project),
                samples: r
                    .errors
                    .samples
                    .iter()
                    .take(SAMPLES_PER_SESSION)
                    .map(|s| truncate(s, SAMPLE_DISPLAY_LEN))
                    .collect(),
            })
            .collect();

        Self {
            session_count: records.len(),
            total_duration_minutes: records
                .iter()
                .map(SessionRecord::minutes)
                .fold(0.0, |total, m| total + m),
            total_tool_calls: records.iter().map(|r| r.total_tool_calls).sum(),
            total_errors: records.iter().map(|r| r.errors.count).sum(),
            tool_usage,
            projects,
            longest,
            most_errors,
        }
    }

    pub fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(out, "{}", rule)?;
        writeln!(out, "CLAUDE CODE SESSION ANALYSIS")?;
        writeln!(out, "{}", rule)?;

        writeln!(out)?;
        writeln!(out, "Sessions analyzed: {}", self.session_count)?;
        writeln!(
            out,
            "Total duration: {:.0} minutes ({:.1} hours)",
            self.total_duration_minutes,
            self.total_duration_minutes / 60.0
        )?;
        writeln!(out, "Total tool calls: {}", self.total_tool_calls)?;
        writeln!(out, "Total errors detected: {}", self.total_errors)?;

        writeln!(out)?;
        writeln!(out, "--- Tool Usage ---")?;
        for (tool, count) in &self.tool_usage {
            writeln!(out, "  {}: {}", tool, count)?;
        }

        writeln!(out)?;
        writeln!(out, "--- Sessions by Project ---")?;
        for group in &self.projects {
            writeln!(
                out,
                "  {}: {} sessions, {:.0} min",
                group.label, group.sessions, group.duration_minutes
            )?;
        }

        writeln!(out)?;
        writeln!(out, "--- Longest Sessions ---")?;
        for line in &self.longest {
            writeln!(out, "  {:.0} min - {}", line.duration_minutes, line.project)?;
        }

        writeln!(out)?;
        writeln!(out, "--- Sessions with Most Errors ---")?;
        for line in &self.most_errors {
            writeln!(out, "  {} errors - {}", line.count, line.project)?;
            for sample in &line.samples {
                writeln!(out, "    → {}...", sample)?;
            }
        }

        Ok(())
    }
}
