use std::fmt::Write;
use std::path::Path;

use clap::ValueEnum;
use serde::Serialize;

use crate::session::QueryResult;
use crate::store::ImageEntry;

/// 报告格式
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Html,
    Json,
}

impl ReportFormat {
    pub fn render(&self, results: &[QueryResult], top_k: usize) -> anyhow::Result<String> {
        match self {
            Self::Html => Ok(render_html(results, top_k)),
            Self::Json => render_json(results),
        }
    }
}

/// 根据距离划分的匹配质量
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchQuality {
    Good,
    Medium,
    Poor,
}

impl MatchQuality {
    pub fn from_distance(distance: f32) -> Self {
        if distance < 0.5 {
            Self::Good
        } else if distance < 1.0 {
            Self::Medium
        } else {
            Self::Poor
        }
    }

    fn css_class(&self) -> &'static str {
        match self {
            Self::Good => "good-match",
            Self::Medium => "medium-match",
            Self::Poor => "poor-match",
        }
    }
}

#[derive(Serialize)]
struct JsonImage<'a> {
    id: &'a str,
    path: &'a str,
}

#[derive(Serialize)]
struct JsonMatch<'a> {
    id: &'a str,
    path: &'a str,
    distance: f32,
}

#[derive(Serialize)]
struct JsonResult<'a> {
    query: JsonImage<'a>,
    matches: Vec<JsonMatch<'a>>,
}

/// 渲染为 JSON 数组，每个查询一项
pub fn render_json(results: &[QueryResult]) -> anyhow::Result<String> {
    let results = results
        .iter()
        .map(|r| JsonResult {
            query: JsonImage { id: &r.query.id, path: &r.query.path },
            matches: r
                .matches
                .iter()
                .map(|m| JsonMatch { id: &m.entry.id, path: &m.entry.path, distance: m.distance })
                .collect(),
        })
        .collect::<Vec<_>>();
    Ok(serde_json::to_string_pretty(&results)?)
}

const STYLE: &str = r#"
        body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; margin: 20px; background-color: #f5f5f5; }
        h1 { color: #333; text-align: center; margin-bottom: 30px; }
        .summary, .retrieval-result { background: white; padding: 20px; border-radius: 8px; margin-bottom: 30px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
        .summary h2, .query-section h2, .legend h3 { margin-top: 0; color: #2c3e50; }
        .query-section { border-bottom: 3px solid #3498db; padding-bottom: 15px; margin-bottom: 20px; }
        .image-container { display: flex; flex-wrap: wrap; gap: 15px; }
        .query-image-box { flex: 0 0 auto; border: 3px solid #3498db; border-radius: 8px; padding: 10px; background: #ecf0f1; }
        .result-image-box { flex: 0 0 auto; border: 2px solid #95a5a6; border-radius: 8px; padding: 10px; background: white; transition: transform 0.2s, box-shadow 0.2s; }
        .result-image-box:hover { transform: translateY(-5px); box-shadow: 0 4px 8px rgba(0,0,0,0.2); }
        .good-match { border-color: #27ae60; }
        .medium-match { border-color: #f39c12; }
        .poor-match { border-color: #e74c3c; }
        .image-box img { display: block; max-width: 280px; max-height: 280px; width: auto; height: auto; border-radius: 4px; }
        .query-image-box img { max-width: 350px; max-height: 350px; }
        .image-info { margin-top: 10px; font-size: 12px; color: #555; }
        .image-id { font-weight: bold; color: #2c3e50; margin-bottom: 5px; }
        .distance { color: #7f8c8d; }
        .distance-value { font-weight: bold; }
        .file-name { font-size: 10px; color: #999; margin-top: 5px; }
        .rank { display: inline-block; background: #3498db; color: white; padding: 2px 8px; border-radius: 4px; font-size: 11px; font-weight: bold; }
        .results-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(300px, 1fr)); gap: 15px; margin-top: 20px; }
        .legend { margin-bottom: 30px; padding: 15px; background: #ecf0f1; border-radius: 8px; }
        .legend-item { display: inline-block; margin-right: 20px; padding: 5px 10px; border-radius: 4px; border: 2px solid; }
"#;

// 图片加载失败时显示的灰色占位图
const PLACEHOLDER: &str = "data:image/svg+xml,%3Csvg xmlns=%22http://www.w3.org/2000/svg%22 width=%22280%22 height=%22280%22%3E%3Crect fill=%22%23ddd%22 width=%22280%22 height=%22280%22/%3E%3C/svg%3E";

/// 渲染为可以直接在浏览器中打开的 HTML 报告
pub fn render_html(results: &[QueryResult], top_k: usize) -> String {
    let mut html = String::with_capacity(8192);
    let total_pairs: usize = results.iter().map(|r| r.matches.len()).sum();

    // 写入 String 不会失败，下面忽略 write! 的返回值
    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>VLAD 检索结果</title>
    <style>{STYLE}    </style>
</head>
<body>
    <h1>VLAD 检索结果</h1>
    <div class="summary">
        <h2>检索统计</h2>
        <p><strong>查询图像数量:</strong> {}</p>
        <p><strong>每个查询的检索结果:</strong> Top-{top_k}</p>
        <p><strong>总计检索对数:</strong> {total_pairs}</p>
    </div>
    <div class="legend">
        <h3>距离颜色编码</h3>
        <span class="legend-item good-match">距离 &lt; 0.5 (优秀匹配)</span>
        <span class="legend-item medium-match">0.5 ≤ 距离 &lt; 1.0 (中等匹配)</span>
        <span class="legend-item poor-match">距离 ≥ 1.0 (较差匹配)</span>
    </div>
"#,
        results.len(),
    );

    for (idx, result) in results.iter().enumerate() {
        write_query(&mut html, idx + 1, result);
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn write_query(html: &mut String, idx: usize, result: &QueryResult) {
    let query = result.query;
    let id = escape(&query.id);
    let _ = write!(
        html,
        r#"    <div class="retrieval-result">
        <div class="query-section">
            <h2>查询 #{idx}: {id}</h2>
        </div>
        <div class="image-container">
            <div class="query-image-box image-box">
                {}
                <div class="image-info">
                    <div class="image-id">查询图像</div>
                    <div>ID: {id}</div>
                    <div class="file-name">{}</div>
                </div>
            </div>
        </div>
        <div class="results-grid">
"#,
        image_tag(query),
        escape(&query.path),
    );

    for (rank, m) in result.matches.iter().enumerate() {
        let quality = MatchQuality::from_distance(m.distance);
        let _ = write!(
            html,
            r#"            <div class="result-image-box image-box {}">
                {}
                <div class="image-info">
                    <span class="rank">#{}</span>
                    <div class="image-id">{}</div>
                    <div class="distance">距离: <span class="distance-value">{:.4}</span></div>
                    <div class="file-name">{}</div>
                </div>
            </div>
"#,
            quality.css_class(),
            image_tag(m.entry),
            rank + 1,
            escape(&m.entry.id),
            m.distance,
            escape(&file_name(&m.entry.path)),
        );
    }

    html.push_str("        </div>\n    </div>\n");
}

fn image_tag(entry: &ImageEntry) -> String {
    format!(
        r#"<img src="file://{}" alt="{}" onerror="this.src='{PLACEHOLDER}'">"#,
        escape(&entry.path),
        escape(&entry.id),
    )
}

fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_owned())
}

/// 转义 HTML 文本和属性值中的特殊字符
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::FeatureRecord;
    use crate::retrieval::RankedMatch;

    fn entry(id: &str, path: &str) -> ImageEntry {
        ImageEntry {
            id: id.to_string(),
            path: path.to_string(),
            record: Some(FeatureRecord::new(vec![0.0])),
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;");
        assert_eq!(escape("普通文本"), "普通文本");
    }

    #[test]
    fn test_match_quality() {
        assert_eq!(MatchQuality::from_distance(0.0), MatchQuality::Good);
        assert_eq!(MatchQuality::from_distance(0.4999), MatchQuality::Good);
        assert_eq!(MatchQuality::from_distance(0.5), MatchQuality::Medium);
        assert_eq!(MatchQuality::from_distance(0.99), MatchQuality::Medium);
        assert_eq!(MatchQuality::from_distance(1.0), MatchQuality::Poor);
        assert_eq!(MatchQuality::from_distance(f32::NAN), MatchQuality::Poor);
    }

    #[test]
    fn test_render_html() {
        let q = entry("q<1>", "/data/q.jpg");
        let a = entry("a", "/data/sub/a.jpg");
        let b = entry("b", "/data/b.jpg");
        let results = vec![QueryResult {
            query: &q,
            matches: vec![
                RankedMatch { entry: &a, distance: 0.25 },
                RankedMatch { entry: &b, distance: 1.5 },
            ],
        }];
        let html = render_html(&results, 2);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("查询 #1: q&lt;1&gt;"));
        assert!(!html.contains("q<1>"));
        assert!(html.contains("Top-2"));
        assert!(html.contains(r#"src="file:///data/sub/a.jpg""#));
        assert!(html.contains("<div class=\"file-name\">a.jpg</div>"));
        assert!(html.contains("0.2500"));
        assert!(html.contains("1.5000"));
        assert!(html.contains("result-image-box image-box good-match"));
        assert!(html.contains("result-image-box image-box poor-match"));
        assert!(html.contains("<strong>总计检索对数:</strong> 2"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_render_json() {
        let q = entry("q", "q.jpg");
        let a = entry("a", "a.jpg");
        let results = vec![QueryResult { query: &q, matches: vec![RankedMatch { entry: &a, distance: 1.0 }] }];
        let json: serde_json::Value = serde_json::from_str(&render_json(&results).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "query": {"id": "q", "path": "q.jpg"},
                "matches": [{"id": "a", "path": "a.jpg", "distance": 1.0}]
            }])
        );
    }

    #[test]
    fn test_format_dispatch() {
        let q = entry("q", "q.jpg");
        let results = vec![QueryResult { query: &q, matches: vec![] }];
        assert!(ReportFormat::Html.render(&results, 3).unwrap().contains("<html"));
        assert!(ReportFormat::Json.render(&results, 3).unwrap().starts_with('['));
    }
}
