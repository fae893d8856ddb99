use std::io::Write;
use std::path::Path;

use crate::error::ExportError;
use crate::model::{ProcessedSchedule, ProcessedTask};

fn percent(value: f64) -> String {
    format!("{:.1}", value)
}

fn write_nodes<W: Write>(
    wtr: &mut csv::Writer<W>,
    nodes: &[ProcessedTask],
    prefix: &str,
    written: &mut usize,
) -> Result<(), ExportError> {
    for (i, node) in nodes.iter().enumerate() {
        let code = if prefix.is_empty() {
            format!("{}", i + 1)
        } else {
            format!("{}.{}", prefix, i + 1)
        };
        let start = node.task.start.format("%d/%m/%Y").to_string();
        let end = node.task.end.format("%d/%m/%Y").to_string();
        let planned = percent(node.planned_progress);
        let actual = percent(node.actual_progress);
        let variance = percent(node.variance);
        wtr.write_record([
            code.as_str(),
            node.task.name.as_str(),
            start.as_str(),
            end.as_str(),
            planned.as_str(),
            actual.as_str(),
            variance.as_str(),
            node.variance_band().label(),
        ])?;
        *written += 1;
        write_nodes(wtr, &node.children, &code, written)?;
    }
    Ok(())
}

/// Write a semicolon-delimited progress report.
///
/// Columns: WBS ; Task ; Start ; End ; Planned % ; Actual % ; Variance ; Status
/// One row per node in outline order, then a project total row.
/// Returns the number of task rows written.
pub fn export_progress_csv<W: Write>(
    schedule: &ProcessedSchedule,
    project_name: &str,
    writer: W,
) -> Result<usize, ExportError> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record([
        "WBS",
        "Task",
        "Start",
        "End",
        "Planned %",
        "Actual %",
        "Variance",
        "Status",
    ])?;

    let mut written = 0usize;
    write_nodes(&mut wtr, &schedule.roots, "", &mut written)?;

    let summary = &schedule.summary;
    let status_date = schedule.status_date.format("%d/%m/%Y").to_string();
    let planned = percent(summary.planned);
    let executed = percent(summary.executed);
    let variance = percent(summary.variance);
    wtr.write_record([
        "",
        project_name,
        "",
        status_date.as_str(),
        planned.as_str(),
        executed.as_str(),
        variance.as_str(),
        summary.variance_band().label(),
    ])?;

    wtr.flush()?;
    Ok(written)
}

/// Write the progress report to a file.
pub fn export_progress_csv_file(
    schedule: &ProcessedSchedule,
    project_name: &str,
    path: &Path,
) -> Result<usize, ExportError> {
    let file = std::fs::File::create(path)?;
    let count = export_progress_csv(schedule, project_name, file)?;
    tracing::info!(rows = count, path = %path.display(), "Exported progress report");
    Ok(count)
}
