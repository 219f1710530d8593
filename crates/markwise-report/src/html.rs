//! HTML results page generator.
//!
//! Produces a self-contained HTML file with the CSS inlined, so it can be
//! mailed around or dropped into a shared drive as-is.

use std::path::Path;

use anyhow::Result;

use markwise_core::model::{Module, Student};

const CSS: &str = "\
body { font-family: -apple-system, 'Segoe UI', Roboto, sans-serif; margin: 2rem auto; max-width: 70rem; color: #1a1a2e; }
header h1 { margin-bottom: 0.2rem; }
p.meta { color: #666; margin-top: 0; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid #ddd; padding: 0.4rem 0.7rem; text-align: left; }
th { background: #f4f4f8; }
tr:nth-child(even) { background: #fafafa; }
td.total { font-weight: 600; }
";

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Render graded results as a self-contained HTML page.
pub fn render_html_results(module: &Module, students: &[Student]) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>Results — {}</title>\n",
        html_escape(&module.module_name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n");
    html.push_str(&format!(
        "<h1>{}</h1>\n",
        html_escape(&module.module_name)
    ));
    html.push_str(&format!(
        "<p class=\"meta\">{} | {} | Semester {} | Batch {} | {} students | generated {}</p>\n",
        html_escape(&module.module_code),
        html_escape(&module.academic_year),
        html_escape(&module.semester),
        html_escape(&module.batch),
        students.len(),
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    html.push_str("<table>\n<thead><tr><th>Student ID</th>");
    for question in &module.questions {
        html.push_str(&format!(
            "<th>Q{} ({})</th>",
            question.question_no, question.allocated_marks
        ));
    }
    html.push_str("<th>Total</th></tr></thead>\n<tbody>\n");

    for student in students {
        html.push_str(&format!(
            "<tr><td>{}</td>",
            html_escape(&student.student_id)
        ));
        for question in &module.questions {
            let marks = student
                .answers
                .iter()
                .find(|a| a.question_no == question.question_no)
                .map(|a| a.student_marks.to_string())
                .unwrap_or_else(|| "-".to_string());
            html.push_str(&format!("<td>{marks}</td>"));
        }
        html.push_str(&format!(
            "<td class=\"total\">{}</td></tr>\n",
            student.total_marks
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</body>\n</html>");
    html
}

/// Write the HTML results page to a file.
pub fn write_html_results(module: &Module, students: &[Student], path: &Path) -> Result<()> {
    let html = render_html_results(module, students);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}
