use chrono::TimeZone;
use pretty_assertions::assert_eq;
use serde_json::json;
use sqlrun_core::{
    render_report, summarize_rows, write_report, ReportMeta, RowSet, Summarizer, SummaryKind, SummaryRequest,
    SqlrunError, TextGenerator,
};
use std::cell::RefCell;

#[derive(Default)]
struct EchoModel {
    prompts: RefCell<Vec<String>>,
}

impl TextGenerator for EchoModel {
    fn generate(&self, prompt: &str) -> Result<String, String> {
        self.prompts.borrow_mut().push(prompt.to_string());
        Ok("[Weekly summary]\nVolume is up.".to_string())
    }
}

struct DownModel;

impl TextGenerator for DownModel {
    fn generate(&self, _prompt: &str) -> Result<String, String> {
        Err("429 quota exceeded".into())
    }
}

fn volume_rows() -> RowSet {
    RowSet::new(
        vec!["date".into(), "tx_count".into(), "avg_fee".into()],
        (1..=7)
            .map(|d| vec![json!(format!("2024-01-0{d}")), json!(d * 100), if d == 3 { json!(null) } else { json!(0.5) }])
            .collect(),
    )
}

#[test]
fn summary_of_empty_rows_is_a_message() {
    assert_eq!(summarize_rows(&RowSet::default()), json!({"message": "no rows returned"}));
}

#[test]
fn summary_computes_numeric_statistics() {
    let summary = summarize_rows(&volume_rows());
    assert_eq!(summary["total_rows"], json!(7));
    assert_eq!(summary["columns"], json!(["date", "tx_count", "avg_fee"]));
    assert_eq!(summary["sample_data"].as_array().unwrap().len(), 5);
    assert_eq!(summary["sample_data"][0], json!({"date": "2024-01-01", "tx_count": 100, "avg_fee": 0.5}));

    let tx = &summary["statistics"]["tx_count"];
    assert_eq!(tx["sum"], json!(2800.0));
    assert_eq!(tx["avg"], json!(400.0));
    assert_eq!(tx["min"], json!(100.0));
    assert_eq!(tx["max"], json!(700.0));
    assert_eq!(tx["count"], json!(7));

    // null 单元格不计入
    assert_eq!(summary["statistics"]["avg_fee"]["count"], json!(6));
    assert!(summary["statistics"].get("date").is_none());
}

#[test]
fn weekly_prompt_embeds_data() {
    let model = EchoModel::default();
    let text = Summarizer::new(&model).summarize(&SummaryRequest::new(SummaryKind::Weekly), &[volume_rows()]).unwrap();
    assert_eq!(text, "[Weekly summary]\nVolume is up.");
    let prompts = model.prompts.borrow();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("## Data summary"));
    assert!(prompts[0].contains("\"total_rows\": 7"));
}

#[test]
fn comparison_needs_two_inputs_and_uses_labels() {
    let model = EchoModel::default();
    let summarizer = Summarizer::new(&model);
    let mut req = SummaryRequest::new(SummaryKind::Comparison);

    let err = summarizer.summarize(&req, &[volume_rows()]).unwrap_err();
    assert!(matches!(err, SqlrunError::InvalidArgs(_)));
    assert!(model.prompts.borrow().is_empty());

    req.labels = ("Bitcoin".into(), "Tron".into());
    summarizer.summarize(&req, &[volume_rows(), RowSet::default()]).unwrap();
    let prompts = model.prompts.borrow();
    let prompt = &prompts[0];
    assert!(prompt.contains("## Bitcoin data"));
    assert!(prompt.contains("## Tron data"));
    assert!(prompt.contains("no rows returned"));
}

#[test]
fn custom_prompt_is_required_and_prepended() {
    let mut req = SummaryRequest::new(SummaryKind::Custom);
    assert!(req.validate(1).is_err());
    req.custom_prompt = Some("Summarize in three lines".into());
    let prompt = req.build_prompt(&[json!({"k": 1})]).unwrap();
    assert!(prompt.starts_with("Summarize in three lines\n\n## Data\n"));
}

#[test]
fn summary_kind_names_round_trip() {
    for kind in [SummaryKind::Weekly, SummaryKind::Comparison, SummaryKind::Anomalies, SummaryKind::Custom] {
        assert_eq!(kind.as_str().parse::<SummaryKind>().unwrap(), kind);
    }
    assert!("monthly".parse::<SummaryKind>().is_err());
}

#[test]
fn generator_failure_is_reported() {
    let err = Summarizer::new(DownModel)
        .summarize(&SummaryRequest::new(SummaryKind::Anomalies), &[volume_rows()])
        .unwrap_err();
    assert!(matches!(err, SqlrunError::Generation(ref m) if m.contains("quota")));
}

#[test]
fn report_file_has_header_and_body() {
    let meta = ReportMeta {
        generated_at: chrono::Local.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap(),
        sources: vec!["eth.sql".into(), "sol.sql".into()],
        kind: SummaryKind::Comparison,
    };
    let expected = "# Summary report\n\nGenerated at: 2024-03-01 09:30:00\n\nQuery files: eth.sql, sol.sql\n\
Summary type: comparison\n\n---\n\nETH leads.";
    assert_eq!(render_report(&meta, "ETH leads."), expected);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("summary.txt");
    write_report(&path, &meta, "ETH leads.").unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), expected);
}

#[test]
fn boolean_columns_count_as_numeric() {
    let rows = RowSet::new(
        vec!["day".into(), "congested".into()],
        vec![
            vec![json!("mon"), json!(true)],
            vec![json!("tue"), json!(false)],
            vec![json!("wed"), json!(true)],
        ],
    );
    let summary = summarize_rows(&rows);
    let stats = &summary["statistics"]["congested"];
    assert_eq!(stats["sum"], json!(2.0));
    assert_eq!(stats["min"], json!(0.0));
    assert_eq!(stats["max"], json!(1.0));
    assert_eq!(stats["count"], json!(3));
}
