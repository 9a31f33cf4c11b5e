use k12_evaluation::config::Config;
use k12_evaluation::infrastructure::BatchOptions;
use k12_evaluation::models::load_all_import_files;
use k12_evaluation::utils::logging;
use k12_evaluation::{DsaClient, Evaluation};
use std::sync::Arc;

/// 连接真实服务，需要设置 DSA_ACCESS_POINT / DSA_SESSION_TOKEN
fn live_evaluation() -> Evaluation {
    let config = Config::from_env();
    let client = DsaClient::from_config(&config).expect("建立客户端失败");
    Evaluation::new(Arc::new(client), BatchOptions::from_config(&config))
}

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_select_all_exams() {
    // 初始化日志
    logging::init(true);

    let evaluation = live_evaluation();

    let exams = evaluation.exam.select_all().await.expect("查询考试别失败");
    println!("找到 {} 个考试别", exams.len());
    for exam in &exams {
        println!("  {:?} {}", exam.id, exam.name);
    }
}

#[tokio::test]
#[ignore]
async fn test_assessment_setup_with_exams() {
    logging::init(true);

    let evaluation = live_evaluation();

    let setups = evaluation
        .assessment_setup
        .select_all()
        .await
        .expect("查询评量设定失败");
    let ids: Vec<String> = setups.iter().filter_map(|s| s.id.clone()).collect();

    let includes = evaluation
        .ae_include
        .select_by_assessment_setup_ids(&ids)
        .await
        .expect("查询评量包含考试失败");

    assert!(includes
        .iter()
        .all(|i| ids.contains(&i.ref_assessment_setup_id)));
}

#[tokio::test]
#[ignore]
async fn test_load_import_files() {
    logging::init(true);

    let config = Config::from_env();

    // 测试加载所有 TOML 文件
    let result = load_all_import_files(&config.import_folder).await;

    assert!(result.is_ok(), "应该能够加载 TOML 文件");

    let files = result.unwrap();
    println!("找到 {} 个导入文件", files.len());
}
