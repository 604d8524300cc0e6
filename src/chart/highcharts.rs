//! Highcharts options tree and HTML page.

use crate::chart::{ChartMeta, ChartSeries, Scale};
use crate::config::ChartConfig;
use crate::error::RenderError;
use crate::models::TranscriptWindow;
use serde_json::{json, Value};

fn px(size: u32) -> String {
    format!("{}px", size)
}

/// Build the options object for a two-series bar chart.
pub fn chart_options(
    first: &ChartSeries,
    second: &ChartSeries,
    meta: &ChartMeta,
    window: &TranscriptWindow,
    style: &ChartConfig,
) -> Value {
    let subtitle = format!(
        "{}+{} messages analyzed between {}",
        first.total_messages, second.total_messages, window
    );

    json!({
        "chart": {
            "type": "bar",
            "height": px(style.height_px),
        },
        "title": {
            "text": meta.title,
            "style": { "fontSize": px(style.title_font_px) },
        },
        "subtitle": {
            "text": subtitle,
            "style": { "fontSize": px(style.subtitle_font_px) },
        },
        "xAxis": {
            "type": "category",
            "reversed": false,
            "title": {
                "enabled": true,
                "text": meta.x_label,
                "style": { "fontSize": px(style.axis_title_font_px) },
            },
            "labels": {
                "style": { "fontSize": px(style.label_font_px) },
            },
            "showLastLabel": true,
        },
        "yAxis": {
            "allowDecimals": meta.scale == Scale::Relative,
            "title": {
                "text": meta.y_label,
                "style": { "fontSize": px(style.label_font_px) },
            },
            "labels": {
                "style": { "fontSize": px(style.label_font_px) },
            },
            "lineWidth": 2,
        },
        "legend": {
            "enabled": true,
            "itemStyle": { "fontSize": px(style.legend_font_px) },
        },
        "tooltip": {
            "headerFormat": "<b>{point.key}</b><br/>",
            "pointFormat": format!("{{series.name}}<br/>{{point.y}} {}", meta.unit),
            "style": { "fontSize": px(style.tooltip_font_px) },
        },
        "series": [series_json(first, meta.scale), series_json(second, meta.scale)],
    })
}

fn series_json(series: &ChartSeries, scale: Scale) -> Value {
    let data: Vec<Value> = series
        .points
        .iter()
        .map(|(category, value)| match scale {
            Scale::Absolute => json!([category, value.round() as u64]),
            Scale::Relative => json!([category, value]),
        })
        .collect();

    json!({
        "type": "bar",
        "name": series.name,
        "data": data,
    })
}

/// Wrap chart options in a standalone HTML page.
pub fn render_page(title: &str, options: &Value, script_url: &str) -> Result<String, RenderError> {
    // A literal "</" inside the inline script would end it early
    let options = serde_json::to_string(options)?.replace("</", "<\\/");

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{script}"></script>
</head>
<body>
<div id="container"></div>
<script>
Highcharts.chart('container', {options});
</script>
</body>
</html>
"#,
        title = escape_html(title),
        script = escape_html(script_url),
        options = options,
    ))
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
