//! HTML views for the connection manager and ad-hoc query pages.

use std::fmt::Write;

use serde_json::Value;

use crate::database::ResultRow;

pub struct PageView<'a> {
    pub connections: &'a [&'a str],
    pub selected: Option<&'a str>,
    pub rows: Option<&'a [ResultRow]>,
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

pub fn render_page(view: &PageView<'_>) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>hopgraph</title>\n</head>\n<body>\n<h1>Connections</h1>\n",
    );

    render_connections(&mut html, view.connections, view.selected);
    render_forms(&mut html);

    if let Some(rows) = view.rows {
        html.push_str("<h2>Results</h2>\n");
        render_rows(&mut html, rows);
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_connections(html: &mut String, connections: &[&str], selected: Option<&str>) {
    match selected {
        Some(name) => {
            let _ = writeln!(
                html,
                "<p>Active connection: <strong id=\"selected\">{}</strong></p>",
                escape_html(name)
            );
        }
        None => html.push_str("<p>No active connection</p>\n"),
    }

    html.push_str("<ul id=\"connections\">\n");
    for name in connections {
        let name = escape_html(name);
        let _ = writeln!(
            html,
            "<li>{name} \
             <form method=\"post\" action=\"/connections/select\" style=\"display:inline\">\
             <input type=\"hidden\" name=\"name\" value=\"{name}\"><button>Select</button></form> \
             <form method=\"post\" action=\"/connections/delete\" style=\"display:inline\">\
             <input type=\"hidden\" name=\"name\" value=\"{name}\"><button>Delete</button></form></li>"
        );
    }
    html.push_str("</ul>\n");
}

fn render_forms(html: &mut String) {
    html.push_str(
        "<h2>Add connection</h2>\n\
         <form method=\"post\" action=\"/connections/add\">\
         <input name=\"name\" placeholder=\"name\" required> \
         <input name=\"server\" placeholder=\"server\" required> \
         <input name=\"db_name\" placeholder=\"database\" required> \
         <button>Add</button></form>\n\
         <h2>Query</h2>\n\
         <form method=\"post\" action=\"/query\">\
         <textarea name=\"sql\" rows=\"6\" cols=\"80\" required></textarea><br>\
         <button>Run</button></form>\n\
         <h2>Hops</h2>\n\
         <form method=\"get\" action=\"/hops\">\
         <input name=\"by_v_id\" placeholder=\"vertex id\"> \
         <input name=\"by_v_label_en\" placeholder=\"exact label\"> \
         <input name=\"by_like_v_label_en\" placeholder=\"label contains\"> \
         <input name=\"limit\" type=\"number\" min=\"1\" value=\"50\"> \
         <button>Fetch</button></form>\n",
    );
}

fn render_rows(html: &mut String, rows: &[ResultRow]) {
    let Some(first) = rows.first() else {
        html.push_str("<p>No rows</p>\n");
        return;
    };

    let columns: Vec<&String> = first.keys().collect();

    html.push_str("<table id=\"rows\">\n<tr>");
    for column in &columns {
        let _ = write!(html, "<th>{}</th>", escape_html(column));
    }
    html.push_str("</tr>\n");

    for row in rows {
        html.push_str("<tr>");
        for column in &columns {
            let cell = row.get(column.as_str()).map(cell_text).unwrap_or_default();
            let _ = write!(html, "<td>{}</td>", escape_html(&cell));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n");
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
