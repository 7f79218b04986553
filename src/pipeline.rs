//! One report run, start to finish.
//!
//! ```text
//! copy aside ──▶ load snapshot ──▶ extract ──▶ render ──▶ export
//!                                                            │
//!                  deliver ◀── truncate source ◀── compose ◀─┘
//! ```
//!
//! Every file the run creates is owned by an [`ArtifactSet`], so it is removed
//! on every exit path unless a failed delivery is configured to keep it.

use std::fmt;
use std::path::PathBuf;

use lettre::Transport;

use crate::artifacts::ArtifactSet;
use crate::config::Settings;
use crate::data::extract_readings;
use crate::error::PipelineError;
use crate::export::export_dataset;
use crate::notify::{compose_message, deliver, smtp_transport, DeliveryOutcome, Mail};
use crate::render::{plan_series, render_chart, ChartOptions};
use crate::source::{copy_aside, truncate_source, PerfdataFile};

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Lines loaded from the snapshot.
    pub records: usize,
    /// Readings with a temperature.
    pub readings_with_temperature: usize,
    /// Lines drawn on the chart.
    pub series_plotted: usize,
    /// Data rows exported, `None` when export is disabled.
    pub exported_rows: Option<usize>,
    pub delivery: DeliveryOutcome,
    /// Artifacts kept after a failed delivery.
    pub retained: Vec<PathBuf>,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} records, {} temperatures, {} series, delivery {}",
            self.records, self.readings_with_temperature, self.series_plotted, self.delivery
        )
    }
}

/// Run the report against the configured SMTP relay.
pub fn run(settings: &Settings) -> Result<RunReport, PipelineError> {
    let transport = smtp_transport(
        &settings.email.smtp_server,
        settings.email.smtp_port,
        settings.email.timeout,
    );
    run_with_transport(settings, &transport)
}

/// Run the report, delivering through `transport`.
pub fn run_with_transport<T>(settings: &Settings, transport: &T) -> Result<RunReport, PipelineError>
where
    T: Transport,
    T::Error: fmt::Display,
{
    let paths = &settings.paths;
    let mut artifacts = ArtifactSet::new();

    let snapshot = copy_aside(&paths.original_file, &paths.copied_file)?;
    artifacts.track(&snapshot.path);
    let records = PerfdataFile::new(&snapshot.path).load()?;
    tracing::info!(records = records.len(), "perfdata loaded");

    let readings = extract_readings(&records);
    let readings_with_temperature = readings.iter().filter(|r| r.has_temperature()).count();
    tracing::info!(
        readings = readings.len(),
        with_temperature = readings_with_temperature,
        "temperatures extracted"
    );

    let timezone = settings.report.timezone;
    let plans = plan_series(
        &readings,
        &settings.hosts.list,
        &settings.hosts.colors,
        &timezone,
    );
    let options = ChartOptions {
        title: settings.report.title.clone(),
        timezone,
        ..ChartOptions::default()
    };
    let graph_path = artifacts.track(&paths.graph_file).to_path_buf();
    let series_plotted = render_chart(&graph_path, &plans, &options)?;

    let mut attachments = vec![graph_path];
    let exported_rows = match &paths.excel_file {
        Some(path) => {
            let export_path = artifacts.track(path).to_path_buf();
            let rows = export_dataset(&export_path, &records, &readings, &timezone)?;
            attachments.push(export_path);
            Some(rows)
        }
        None => {
            tracing::debug!("no export path configured, export skipped");
            None
        }
    };
    attachments.push(snapshot.path.clone());

    let message = compose_message(&Mail {
        from: settings.email.from_email.clone(),
        to: settings.email.to_email.clone(),
        subject: settings.report.subject.clone(),
        body: settings.report.body.clone(),
        attachments,
    })?;

    // The live file is only emptied once the whole report exists
    truncate_source(&snapshot)?;

    let delivery = deliver(transport, &message);
    let mut retained = Vec::new();
    if let DeliveryOutcome::Failed { reason } = &delivery {
        if settings.report.retain_on_failure {
            retained = artifacts.retain();
            for path in &retained {
                tracing::warn!(path = %path.display(), "artifact kept after failed delivery");
            }
        }
        if settings.email.require_delivery {
            return Err(PipelineError::Delivery {
                reason: reason.clone(),
            });
        }
    }

    Ok(RunReport {
        records: records.len(),
        readings_with_temperature,
        series_plotted,
        exported_rows,
        delivery,
        retained,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EmailSettings, HostSettings, PathSettings, ReportSettings};
    use crate::error::{exit_code, LoadError};
    use chrono_tz::Tz;
    use lettre::transport::stub::StubTransport;
    use std::fs;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;

    const INPUT: &str = "\
1700000000\tsrv1\tXClarity\tOK\t0\tHARD\t1\t0\tOK\tAmbient_temperatureC=20.0;;;;
1700000300\tsrv1\tXClarity\tOK\t0\tHARD\t1\t0\tOK\tAmbient_temperatureC=21.0;;;;
1700000600\tsrv1\tXClarity\tOK\t0\tHARD\t1\t0\tOK\tCPU1_temperatureC=40;;;;
";

    fn settings(dir: &Path) -> Settings {
        Settings {
            paths: PathSettings {
                original_file: dir.join("service-perfdata"),
                copied_file: dir.join("perfdata.copy"),
                graph_file: dir.join("graph.svg"),
                excel_file: Some(dir.join("report.csv")),
            },
            email: EmailSettings {
                smtp_server: "localhost".to_string(),
                smtp_port: 25,
                from_email: "nagios@example.com".to_string(),
                to_email: "team@example.com".to_string(),
                timeout: Duration::from_secs(5),
                require_delivery: false,
            },
            hosts: HostSettings {
                list: vec!["srv1".to_string()],
                colors: vec!["blue".parse().unwrap()],
            },
            report: ReportSettings {
                timezone: Tz::UTC,
                title: "CED Temperature".to_string(),
                subject: "CED Temperature Report".to_string(),
                body: "Hello Team".to_string(),
                retain_on_failure: false,
            },
        }
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_full_run_plots_exports_delivers_and_cleans_up() {
        let dir = TempDir::new().unwrap();
        let settings = settings(dir.path());
        fs::write(&settings.paths.original_file, INPUT).unwrap();
        let transport = StubTransport::new_ok();

        let report = run_with_transport(&settings, &transport).unwrap();

        assert_eq!(report.records, 3);
        assert_eq!(report.readings_with_temperature, 2);
        assert_eq!(report.series_plotted, 1);
        assert_eq!(report.exported_rows, Some(3));
        assert_eq!(report.delivery, DeliveryOutcome::Delivered);
        assert!(report.retained.is_empty());

        // Only the truncated live file is left
        assert_eq!(dir_entries(dir.path()), ["service-perfdata"]);
        assert_eq!(fs::read(&settings.paths.original_file).unwrap(), b"");
    }

    #[test]
    fn test_export_is_skipped_without_a_path() {
        let dir = TempDir::new().unwrap();
        let mut settings = settings(dir.path());
        settings.paths.excel_file = None;
        fs::write(&settings.paths.original_file, INPUT).unwrap();

        let report = run_with_transport(&settings, &StubTransport::new_ok()).unwrap();

        assert_eq!(report.exported_rows, None);
        assert_eq!(dir_entries(dir.path()), ["service-perfdata"]);
    }

    #[test]
    fn test_failed_delivery_is_best_effort_by_default() {
        let dir = TempDir::new().unwrap();
        let settings = settings(dir.path());
        fs::write(&settings.paths.original_file, INPUT).unwrap();

        let report = run_with_transport(&settings, &StubTransport::new_error()).unwrap();

        assert!(!report.delivery.is_delivered());
        assert_eq!(dir_entries(dir.path()), ["service-perfdata"]);
    }

    #[test]
    fn test_required_delivery_failure_fails_the_run_and_cleans_up() {
        let dir = TempDir::new().unwrap();
        let mut settings = settings(dir.path());
        settings.email.require_delivery = true;
        fs::write(&settings.paths.original_file, INPUT).unwrap();

        let err = run_with_transport(&settings, &StubTransport::new_error()).unwrap_err();

        assert!(matches!(err, PipelineError::Delivery { .. }));
        assert_eq!(err.exit_code(), exit_code::DELIVERY);
        assert_eq!(dir_entries(dir.path()), ["service-perfdata"]);
    }

    #[test]
    fn test_retain_on_failure_keeps_artifacts() {
        let dir = TempDir::new().unwrap();
        let mut settings = settings(dir.path());
        settings.report.retain_on_failure = true;
        fs::write(&settings.paths.original_file, INPUT).unwrap();

        let report = run_with_transport(&settings, &StubTransport::new_error()).unwrap();

        assert_eq!(report.retained.len(), 3);
        assert_eq!(
            dir_entries(dir.path()),
            ["graph.svg", "perfdata.copy", "report.csv", "service-perfdata"]
        );
        assert_eq!(
            fs::read_to_string(&settings.paths.copied_file).unwrap(),
            INPUT
        );
    }

    #[test]
    fn test_malformed_input_leaves_the_source_untouched() {
        let dir = TempDir::new().unwrap();
        let settings = settings(dir.path());
        let input = format!("{INPUT}1700000900\tsrv1\tbroken\n");
        fs::write(&settings.paths.original_file, &input).unwrap();

        let err = run_with_transport(&settings, &StubTransport::new_ok()).unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Load(LoadError::ColumnCount { line: 4, .. })
        ));
        assert_eq!(err.exit_code(), exit_code::INPUT);
        assert_eq!(fs::read_to_string(&settings.paths.original_file).unwrap(), input);
        assert_eq!(dir_entries(dir.path()), ["service-perfdata"]);
    }

    #[test]
    fn test_missing_source_is_an_input_error() {
        let dir = TempDir::new().unwrap();
        let settings = settings(dir.path());

        let err = run_with_transport(&settings, &StubTransport::new_ok()).unwrap_err();

        assert!(matches!(err, PipelineError::Rotate(_)));
        assert_eq!(err.exit_code(), exit_code::INPUT);
        assert!(dir_entries(dir.path()).is_empty());
    }

    #[test]
    fn test_render_failure_keeps_the_live_file() {
        let dir = TempDir::new().unwrap();
        let mut settings = settings(dir.path());
        settings.paths.graph_file = dir.path().join("missing-dir").join("graph.svg");
        fs::write(&settings.paths.original_file, INPUT).unwrap();

        let err = run_with_transport(&settings, &StubTransport::new_ok()).unwrap_err();

        assert_eq!(err.exit_code(), exit_code::ARTIFACT);
        assert_eq!(fs::read_to_string(&settings.paths.original_file).unwrap(), INPUT);
        assert_eq!(dir_entries(dir.path()), ["service-perfdata"]);
    }

    #[test]
    fn test_export_failure_keeps_the_live_file() {
        let dir = TempDir::new().unwrap();
        let mut settings = settings(dir.path());
        settings.paths.excel_file = Some(dir.path().join("missing-dir").join("report.csv"));
        fs::write(&settings.paths.original_file, INPUT).unwrap();

        let err = run_with_transport(&settings, &StubTransport::new_ok()).unwrap_err();

        assert!(matches!(err, PipelineError::Export(_)));
        assert_eq!(fs::read_to_string(&settings.paths.original_file).unwrap(), INPUT);
        assert_eq!(dir_entries(dir.path()), ["service-perfdata"]);
    }

    #[test]
    fn test_failed_copy_leaves_an_existing_snapshot_file_alone() {
        let dir = TempDir::new().unwrap();
        let settings = settings(dir.path());
        fs::write(&settings.paths.copied_file, "kept from an earlier run").unwrap();

        let err = run_with_transport(&settings, &StubTransport::new_ok()).unwrap_err();

        assert!(matches!(err, PipelineError::Rotate(_)));
        assert_eq!(
            fs::read_to_string(&settings.paths.copied_file).unwrap(),
            "kept from an earlier run"
        );
    }

    #[test]
    fn test_hosts_without_temperatures_produce_an_empty_chart() {
        let dir = TempDir::new().unwrap();
        let mut settings = settings(dir.path());
        settings.hosts.list = vec!["srv9".to_string()];
        fs::write(&settings.paths.original_file, INPUT).unwrap();

        let report = run_with_transport(&settings, &StubTransport::new_ok()).unwrap();

        assert_eq!(report.series_plotted, 0);
        assert_eq!(report.delivery, DeliveryOutcome::Delivered);
    }
}
