use std::io::Write;

use super::{StoreError, SubmissionSink};

/// Write the `limit` most recent submissions as CSV, one row per submission
/// with answers joined as `Q1=Q1R2;Q2=Q2R1`.
pub fn export_csv<S, W>(sink: &S, writer: W, limit: usize) -> Result<usize, StoreError>
where
    S: SubmissionSink + ?Sized,
    W: Write,
{
    let submissions = sink.recent(limit)?;
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([
        "id",
        "session_id",
        "submitted_at",
        "pre_modern",
        "modern",
        "post_modern",
        "plot_x",
        "plot_y",
        "source",
        "browser",
        "version",
        "answers",
    ])?;

    for submission in &submissions {
        let record = &submission.record;
        let answers = record
            .choices
            .iter()
            .map(|choice| format!("{}={}", choice.question_id, choice.response_id))
            .collect::<Vec<_>>()
            .join(";");
        csv_writer.write_record([
            submission.id.to_string(),
            record.session_id.clone(),
            record.submitted_at.to_rfc3339(),
            record.normalized.pre_modern.to_string(),
            record.normalized.modern.to_string(),
            record.normalized.post_modern.to_string(),
            format!("{:.4}", record.plot_x),
            format!("{:.4}", record.plot_y),
            record.source.clone(),
            record.browser.clone().unwrap_or_default(),
            record.version.clone(),
            answers,
        ])?;
    }

    csv_writer.flush()?;
    Ok(submissions.len())
}
