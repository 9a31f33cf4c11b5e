mod common;

use common::{evaluation, execute_count, fault, new_ids, MockConnection};
use k12_evaluation::models::load_import_file;
use k12_evaluation::{process_import_file, App, Config};
use std::path::Path;

const IMPORT: &str = r#"
name = "112學年度第1學期 第一次段考"

[[exams]]
name = "第一次段考"
display_order = 1

[[sce_takes]]
ref_sc_attend_id = "901"
ref_exam_id = "3"
score = 88.5

[[sce_takes]]
id = "4410"
ref_sc_attend_id = "902"
ref_exam_id = "3"
score = 71

[[grad_scores]]
ref_student_id = "15"
learn_domain_score = 80
"#;

/// 新增回传编号，更新/删除回传笔数
fn writable_service() -> std::sync::Arc<MockConnection> {
    MockConnection::new(|service, request| {
        if service.contains(".Insert") {
            Ok(new_ids(request, "AttendID", "new-"))
        } else {
            Ok(execute_count(request))
        }
    })
}

fn write_import(dir: &Path, file_name: &str) -> std::path::PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, IMPORT).unwrap();
    path
}

#[tokio::test]
async fn test_import_upserts_in_order_and_marks_file_done() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_import(dir.path(), "exam1.toml");
    let connection = writable_service();
    let evaluation = evaluation(connection.clone(), 100);

    let file = load_import_file(&path).await.unwrap();
    let stats = process_import_file(&evaluation, file, 1).await.unwrap();

    assert_eq!(stats.get("exam").inserted, 1);
    assert_eq!(stats.get("sce_take").inserted, 1);
    assert_eq!(stats.get("sce_take").updated, 1);
    assert_eq!(stats.get("grad_score").updated, 1);
    assert_eq!(stats.get("moral_score").total(), 0);
    assert_eq!(stats.total(), 4);

    assert_eq!(connection.calls_to("SmartSchool.Exam.InsertExam").len(), 1);
    assert_eq!(connection.calls_to("SmartSchool.Course.InsertSCETake").len(), 1);
    assert_eq!(connection.calls_to("SmartSchool.Course.UpdateSCETake").len(), 1);
    assert_eq!(connection.calls_to("SmartSchool.Score.UpdateGradScore").len(), 1);
    assert!(connection
        .calls_to("SmartSchool.Score.InsertGradScore")
        .is_empty());

    assert!(!path.exists());
    assert!(dir.path().join("exam1.toml.done").exists());
}

#[tokio::test]
async fn test_failed_import_keeps_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_import(dir.path(), "exam1.toml");
    let connection = MockConnection::new(|service, request| {
        if service == "SmartSchool.Course.UpdateSCETake" {
            Err(fault(service))
        } else if service.contains(".Insert") {
            Ok(new_ids(request, "AttendID", "new-"))
        } else {
            Ok(execute_count(request))
        }
    });
    let evaluation = evaluation(connection, 100);

    let file = load_import_file(&path).await.unwrap();
    let err = process_import_file(&evaluation, file, 1).await.unwrap_err();

    assert!(format!("{:#}", err).contains("考试成绩"));
    assert!(path.exists());
}

#[tokio::test]
async fn test_app_run_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    let import_dir = dir.path().join("import");
    std::fs::create_dir(&import_dir).unwrap();
    write_import(&import_dir, "a.toml");
    write_import(&import_dir, "b.toml");

    let config = Config {
        import_folder: import_dir.to_string_lossy().to_string(),
        report_file: dir.path().join("report.json").to_string_lossy().to_string(),
        output_log_file: dir.path().join("log.txt").to_string_lossy().to_string(),
        max_concurrent_files: 1,
        ..Config::default()
    };
    let report_path = config.report_file.clone();
    let app = App::with_evaluation(config, evaluation(writable_service(), 100));

    let report = app.run().await.unwrap();

    assert_eq!(report.success, 2);
    assert_eq!(report.failed, 0);
    assert_eq!(report.records_written, 8);
    assert_eq!(report.files[0].index, 1);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(report_path).unwrap()).unwrap();
    assert_eq!(json["success"], 2);
    assert_eq!(json["files"][1]["stats"]["entities"]["grad_score"]["updated"], 1);
}

#[tokio::test]
async fn test_app_run_with_empty_folder() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        import_folder: dir.path().to_string_lossy().to_string(),
        report_file: dir.path().join("report.json").to_string_lossy().to_string(),
        ..Config::default()
    };
    let app = App::with_evaluation(config, evaluation(writable_service(), 100));

    let report = app.run().await.unwrap();

    assert!(report.files.is_empty());
    let json: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("report.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(json["success"], 0);
    assert_eq!(json["files"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_blank_id_is_inserted_not_updated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blank.toml");
    std::fs::write(
        &path,
        r#"
[[exams]]
id = ""
name = "期中考"

[[exams]]
id = "  "
name = "期末考"
"#,
    )
    .unwrap();
    let connection = writable_service();
    let evaluation = evaluation(connection.clone(), 100);

    let file = load_import_file(&path).await.unwrap();
    let stats = process_import_file(&evaluation, file, 1).await.unwrap();

    assert_eq!(stats.get("exam").inserted, 2);
    assert_eq!(stats.get("exam").updated, 0);
    assert_eq!(connection.calls_to("SmartSchool.Exam.InsertExam").len(), 1);
    assert!(connection
        .calls_to("SmartSchool.Exam.UpdateExam")
        .is_empty());
}
