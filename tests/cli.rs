use std::fs;
use std::process::Command;

use anyhow::Result;
use assert_cmd::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;
use rstest::*;
use vladeval::codec;

macro_rules! cargo_run {
    ($cmd:expr, $($args:expr),*) => {
        {
            let mut cmd = Command::cargo_bin($cmd)?;
            $(cmd.arg($args);)*
            cmd.assert()
        }
    };
}

/// 创建一个包含 4 张图片的数据集，其中 `4` 没有缓存文件
#[fixture]
fn dataset() -> TempDir {
    let dir = TempDir::new().unwrap();
    let vlad_dir = dir.path().join("vlad");
    fs::create_dir(&vlad_dir).unwrap();

    codec::write_file(vlad_dir.join("1.isat_vlad"), &[0.0, 0.0]).unwrap();
    codec::write_file(vlad_dir.join("2.isat_vlad"), &[1.0, 0.0]).unwrap();
    codec::write_file(vlad_dir.join("3.isat_vlad"), &[3.0, 4.0]).unwrap();

    fs::write(
        dir.path().join("images.json"),
        r#"{"images": [
            {"id": 1, "path": "/photos/one.jpg"},
            {"id": 2, "path": "/photos/two.jpg"},
            {"id": 3, "path": "/photos/three.jpg"},
            {"id": 4, "path": "/photos/four.jpg"}
        ]}"#,
    )
    .unwrap();
    dir
}

#[rstest]
fn report_html(dataset: TempDir) -> Result<()> {
    let output = dataset.path().join("report.html");
    cargo_run!(
        "vladeval",
        "report",
        "--vlad-dir",
        dataset.path().join("vlad"),
        "--images",
        dataset.path().join("images.json"),
        "--output",
        &output,
        "--top-k",
        "2"
    )
    .success();

    let html = fs::read_to_string(&output)?;
    assert!(html.contains("查询 #1: 1"));
    assert!(html.contains("查询 #3: 3"));
    assert!(!html.contains("查询 #4"));
    assert!(html.contains("5.0000"));
    assert!(html.contains("file:///photos/two.jpg"));
    Ok(())
}

#[rstest]
fn report_json_max_queries(dataset: TempDir) -> Result<()> {
    let output = dataset.path().join("report.json");
    cargo_run!(
        "vladeval",
        "-q",
        "report",
        "--vlad-dir",
        dataset.path().join("vlad"),
        "--images",
        dataset.path().join("images.json"),
        "--output",
        &output,
        "-k",
        "2",
        "--max-queries",
        "1",
        "--format",
        "json"
    )
    .success();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output)?)?;
    assert_eq!(
        json,
        serde_json::json!([{
            "query": {"id": "1", "path": "/photos/one.jpg"},
            "matches": [
                {"id": "2", "path": "/photos/two.jpg", "distance": 1.0},
                {"id": "3", "path": "/photos/three.jpg", "distance": 5.0}
            ]
        }])
    );
    Ok(())
}

#[rstest]
#[case::missing_vlad_dir("missing", "images.json")]
#[case::missing_image_list("vlad", "missing.json")]
fn report_missing_input(
    dataset: TempDir,
    #[case] vlad_dir: &str,
    #[case] images: &str,
) -> Result<()> {
    cargo_run!(
        "vladeval",
        "report",
        "--vlad-dir",
        dataset.path().join(vlad_dir),
        "--images",
        dataset.path().join(images),
        "--output",
        dataset.path().join("report.html")
    )
    .failure()
    .stderr(predicate::str::contains("不存在"));
    assert!(!dataset.path().join("report.html").exists());
    Ok(())
}

#[rstest]
fn report_no_usable_vector(dataset: TempDir) -> Result<()> {
    let empty = dataset.path().join("empty");
    fs::create_dir(&empty)?;
    cargo_run!(
        "vladeval",
        "report",
        "--vlad-dir",
        &empty,
        "--images",
        dataset.path().join("images.json"),
        "--output",
        dataset.path().join("report.html")
    )
    .failure()
    .stderr(predicate::str::contains("no usable data"));
    Ok(())
}

#[rstest]
fn search_table(dataset: TempDir) -> Result<()> {
    cargo_run!(
        "vladeval",
        "search",
        "--vlad-dir",
        dataset.path().join("vlad"),
        "--images",
        dataset.path().join("images.json"),
        "-k",
        "1",
        "3"
    )
    .success()
    .stdout(predicate::str::contains("2\t/photos/two.jpg"))
    .stdout(predicate::str::contains("one.jpg").not());
    Ok(())
}

#[rstest]
#[case::unknown("42")]
#[case::without_vector("4")]
fn search_invalid_query(dataset: TempDir, #[case] id: &str) -> Result<()> {
    cargo_run!(
        "vladeval",
        "search",
        "--vlad-dir",
        dataset.path().join("vlad"),
        "--images",
        dataset.path().join("images.json"),
        id
    )
    .failure();
    Ok(())
}

#[rstest]
fn show_file(dataset: TempDir) -> Result<()> {
    cargo_run!("vladeval", "show", dataset.path().join("vlad").join("3.isat_vlad"))
        .success()
        .stdout(predicate::str::contains("dimension: 2"))
        .stdout(predicate::str::contains("norm     : 5.000000"));
    Ok(())
}

#[rstest]
fn show_invalid_file(dataset: TempDir) -> Result<()> {
    let path = dataset.path().join("bad.isat_vlad");
    fs::write(&path, 0xDEADBEEFu32.to_le_bytes())?;
    cargo_run!("vladeval", "show", &path).failure().stderr(predicate::str::contains("invalid magic"));
    Ok(())
}
